use std::path::Path;

use crate::models::error::CaptureError;

/// Lifecycle contract of a recording device.
///
/// Strictly ordered: construct → `connect` → (`start_recording` →
/// `stop_recording`)* → `disconnect`. A disconnected device may be
/// reconnected; negotiated parameters are re-resolved on reconnect.
pub trait RecordingDevice {
    fn is_connected(&self) -> bool;
    fn is_recording(&self) -> bool;

    /// Resolve capture parameters against the hardware and open the
    /// input stream (idle, no callbacks yet).
    fn connect(&mut self) -> Result<(), CaptureError>;

    /// Start the hardware stream. With a path, spawn a writer task
    /// persisting captured blocks there; without one, blocks accumulate
    /// for the caller to drain.
    fn start_recording(&mut self, output_path: Option<&Path>) -> Result<(), CaptureError>;

    /// Stop the stream and join the writer task, flushing every block
    /// enqueued up to the stop signal.
    fn stop_recording(&mut self) -> Result<(), CaptureError>;

    /// Close the stream resource, stopping a live recording first.
    fn disconnect(&mut self) -> Result<(), CaptureError>;
}
