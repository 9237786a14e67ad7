use serde::{Deserialize, Serialize};

/// An input device as reported by a `StreamProvider`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDeviceInfo {
    /// Backend enumeration index.
    pub index: usize,
    /// Human-readable device name.
    pub name: String,
    /// Number of capturable channels (0 = not an input device).
    pub max_input_channels: u16,
    /// Sample rate the device runs at by default, in Hz.
    pub default_sample_rate: u32,
}

impl InputDeviceInfo {
    /// Whether the device can capture audio at all.
    pub fn is_input(&self) -> bool {
        self.max_input_channels > 0
    }
}
