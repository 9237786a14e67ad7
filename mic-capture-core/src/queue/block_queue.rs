use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::models::block::SampleBlock;

/// Thread-safe FIFO queue of captured sample blocks.
///
/// The hardware callback pushes (never blocks), the writer task or the
/// caller pops. Clones share the same underlying channel, so a clone
/// can be moved into the stream callback while the device keeps its
/// own handle.
///
/// Unbounded on purpose: the durability contract forbids dropping
/// blocks, so backpressure is the consumer's problem, not the
/// callback's.
#[derive(Debug, Clone)]
pub struct BlockQueue {
    tx: Sender<SampleBlock>,
    rx: Receiver<SampleBlock>,
}

impl BlockQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Enqueue a block. Never blocks.
    pub fn push(&self, block: SampleBlock) {
        // Cannot fail: the queue holds its own receiver for its whole lifetime.
        let _ = self.tx.send(block);
    }

    /// Dequeue a block, suspending until one is available.
    pub fn pop(&self) -> SampleBlock {
        match self.rx.recv() {
            Ok(block) => block,
            Err(_) => unreachable!("queue holds its own sender"),
        }
    }

    /// Dequeue a block, waiting at most `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<SampleBlock> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Dequeue a block if one is immediately available.
    pub fn try_pop(&self) -> Option<SampleBlock> {
        self.rx.try_recv().ok()
    }

    /// Number of blocks currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for BlockQueue {
    fn default() -> Self {
        Self::new()
    }
}
