use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::models::block::SampleBlock;
use crate::models::error::CaptureError;
use crate::traits::block_sink::BlockSink;

/// WAV file sink for captured sample blocks.
///
/// Opens the file in exclusive-create mode: the caller is responsible
/// for removing any stale file first, so a collision here means two
/// writers raced for the same path. Samples are stored as 32-bit float
/// PCM at the negotiated rate and channel count.
pub struct WavBlockWriter {
    path: PathBuf,
    writer: WavWriter<BufWriter<File>>,
}

impl std::fmt::Debug for WavBlockWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavBlockWriter")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl WavBlockWriter {
    pub fn create(path: &Path, sample_rate: u32, channels: u16) -> Result<Self, CaptureError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => {}
            _ => {
                return Err(CaptureError::OutputPath(format!(
                    "{}: unsupported container format, expected a .wav extension",
                    path.display()
                )))
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| CaptureError::OutputPath(format!("{}: {}", path.display(), e)))?;

        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::new(BufWriter::new(file), spec)
            .map_err(|e| CaptureError::OutputPath(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlockSink for WavBlockWriter {
    fn append(&mut self, block: &SampleBlock) -> Result<(), CaptureError> {
        for &sample in block.samples() {
            self.writer
                .write_sample(sample)
                .map_err(|e| CaptureError::OutputPath(format!("{}: {}", self.path.display(), e)))?;
        }
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<(), CaptureError> {
        let me = *self;
        me.writer
            .finalize()
            .map_err(|e| CaptureError::OutputPath(format!("{}: {}", me.path.display(), e)))
    }
}
