pub mod block_sink;
pub mod recording_device;
pub mod stream_provider;
