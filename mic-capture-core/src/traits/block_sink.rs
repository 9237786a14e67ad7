use crate::models::block::SampleBlock;
use crate::models::error::CaptureError;

/// Destination for captured sample blocks.
///
/// The writer task appends blocks in arrival order and finalizes the
/// sink exactly once when the session ends. `WavBlockWriter` is the
/// file-backed implementation; tests substitute an in-memory sink.
pub trait BlockSink: Send {
    /// Append one block. May block on I/O.
    fn append(&mut self, block: &SampleBlock) -> Result<(), CaptureError>;

    /// Flush and close the sink.
    fn finalize(self: Box<Self>) -> Result<(), CaptureError>;
}
