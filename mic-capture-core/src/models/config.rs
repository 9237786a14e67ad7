use serde::{Deserialize, Serialize};

/// Configuration for one microphone device.
///
/// The device is identified by its backend enumeration index. Sample
/// rate and channels are optional: unset values are resolved against
/// the hardware at connect time (device default rate, all input
/// channels). Channel numbers are 1-based here; the device converts
/// them to 0-based indices when it connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrophoneConfig {
    /// Backend index of the input device.
    pub microphone_index: usize,

    /// Requested sample rate in Hz, or None for the device default.
    #[serde(default)]
    pub sample_rate: Option<u32>,

    /// 1-based channel numbers to capture, or None for all.
    #[serde(default)]
    pub channels: Option<Vec<u16>>,
}

impl MicrophoneConfig {
    pub fn new(microphone_index: usize) -> Self {
        Self {
            microphone_index,
            sample_rate: None,
            channels: None,
        }
    }
}
