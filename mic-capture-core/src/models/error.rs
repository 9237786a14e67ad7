use thiserror::Error;

/// Errors that can occur during microphone capture operations.
///
/// Every lifecycle precondition violation maps to its own variant so
/// callers can match on the exact failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("microphone {0} is already connected")]
    AlreadyConnected(usize),

    #[error("microphone {0} is not connected")]
    NotConnected(usize),

    #[error("microphone {0} is not recording")]
    NotRecording(usize),

    #[error("microphone {0} is already recording")]
    AlreadyRecording(usize),

    #[error("no input device at index {0}")]
    DeviceNotFound(usize),

    #[error("device {index} has no input channels, available input devices: {available:?}")]
    NotAnInputDevice { index: usize, available: Vec<usize> },

    #[error("requested sample rate {requested} Hz exceeds the device rate {supported} Hz")]
    UnsupportedSampleRate { requested: u32, supported: u32 },

    #[error("channel {channel} is outside the device input range 1..={max}")]
    ChannelOutOfRange { channel: u16, max: u16 },

    #[error("output path error: {0}")]
    OutputPath(String),

    #[error("no input devices found")]
    NoDevicesFound,

    #[error("stream backend error: {0}")]
    Backend(String),
}
