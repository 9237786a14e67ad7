use std::sync::Arc;

use crate::models::block::StreamStatus;
use crate::models::device_info::InputDeviceInfo;
use crate::models::error::CaptureError;

/// Callback invoked when the hardware delivers a block of input audio.
///
/// Parameters:
/// - `samples`: interleaved f32 samples, variable length per delivery.
/// - `channels`: number of interleaved channels in `samples`.
/// - `status`: hardware status flags for this delivery (overrun etc.).
///
/// The callback fires on a backend-owned thread — it must not block on
/// I/O; keep processing minimal.
pub type AudioBlockCallback = Arc<dyn Fn(&[f32], u16, StreamStatus) + Send + Sync + 'static>;

/// Parameters for opening an input stream, resolved by the device at
/// connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub device_index: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Width of the delivered interleaved frames. Wide enough to cover
    /// the highest selected channel; the device slices out the rest.
    pub channel_count: u16,
}

/// Interface to the host audio subsystem.
///
/// Implemented by:
/// - `CpalStreamProvider` (mic-capture-cpal)
/// - `MockStreamProvider` (tests, hardware-free operation)
pub trait StreamProvider: Send + Sync {
    /// List the devices the backend knows about, inputs and outputs
    /// alike. Output-only devices report `max_input_channels == 0`.
    fn enumerate_input_devices(&self) -> Result<Vec<InputDeviceInfo>, CaptureError>;

    /// Open a callback-driven input stream on the given device.
    ///
    /// The stream is returned idle: no callbacks fire until `start`.
    fn open_input_stream(
        &self,
        request: StreamRequest,
        callback: AudioBlockCallback,
    ) -> Result<Box<dyn InputStream>, CaptureError>;
}

impl std::fmt::Debug for dyn InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputStream")
            .field("is_active", &self.is_active())
            .finish()
    }
}

/// A live input stream handle.
///
/// Dropping the handle closes the stream. Not `Send`: host stream
/// handles are thread-bound on some platforms, and the device only
/// ever drives the stream from its owning thread.
pub trait InputStream {
    /// Start delivering callbacks.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop delivering callbacks, waiting for in-flight buffers to be
    /// processed. Graceful: buffered audio is delivered, not dropped.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Whether the stream is currently delivering callbacks.
    fn is_active(&self) -> bool;
}
