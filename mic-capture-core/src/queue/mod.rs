pub mod block_queue;
