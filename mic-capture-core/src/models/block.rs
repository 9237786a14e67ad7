use std::fmt;

/// One delivery of captured samples from the hardware layer.
///
/// Samples are interleaved frame by frame: `samples[frame * channels + ch]`.
/// Blocks are variable-length; the backend delivers whatever the host
/// hands it rather than forcing a fixed block size (which would add
/// latency).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    samples: Vec<f32>,
    channels: usize,
}

impl SampleBlock {
    /// Wrap an interleaved sample slice delivered by a stream callback.
    pub fn from_interleaved(samples: &[f32], channels: usize) -> Self {
        debug_assert!(channels > 0);
        debug_assert_eq!(samples.len() % channels.max(1), 0);
        Self {
            samples: samples.to_vec(),
            channels,
        }
    }

    /// Number of frames in the block.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The raw interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// One frame as a channel slice.
    pub fn frame(&self, index: usize) -> &[f32] {
        let start = index * self.channels;
        &self.samples[start..start + self.channels]
    }

    /// Extract the given 0-based channels into a narrower block,
    /// preserving frame order.
    pub fn select_channels(&self, picks: &[usize]) -> SampleBlock {
        let frames = self.frames();
        let mut samples = Vec::with_capacity(frames * picks.len());
        for frame in 0..frames {
            let base = frame * self.channels;
            for &ch in picks {
                samples.push(self.samples[base + ch]);
            }
        }
        SampleBlock {
            samples,
            channels: picks.len(),
        }
    }
}

/// Status flags attached to a callback delivery.
///
/// Hardware notifications are advisory: the device logs them and keeps
/// capturing, it never fails a recording over an overrun.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStatus {
    /// The host dropped input data before the callback could run.
    pub input_overflow: bool,
}

impl StreamStatus {
    pub fn is_ok(&self) -> bool {
        !self.input_overflow
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.input_overflow {
            write!(f, "input overflow")
        } else {
            write!(f, "ok")
        }
    }
}
