//! `StreamProvider` implementation over the cpal host audio API.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use mic_capture_core::models::block::StreamStatus;
use mic_capture_core::models::device_info::InputDeviceInfo;
use mic_capture_core::models::error::CaptureError;
use mic_capture_core::traits::stream_provider::{
    AudioBlockCallback, InputStream, StreamProvider, StreamRequest,
};

/// Stream provider backed by the host's default cpal backend.
///
/// Device indices follow cpal's enumeration order over all devices
/// (inputs and outputs); output-only devices report zero input
/// channels. Enumeration order is stable while the device set does
/// not change.
#[derive(Debug, Default)]
pub struct CpalStreamProvider;

impl CpalStreamProvider {
    pub fn new() -> Self {
        Self
    }

    fn device_at(index: usize) -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .devices()
            .map_err(|e| CaptureError::Backend(format!("device enumeration failed: {}", e)))?
            .nth(index)
            .ok_or(CaptureError::DeviceNotFound(index))
    }
}

impl StreamProvider for CpalStreamProvider {
    fn enumerate_input_devices(&self) -> Result<Vec<InputDeviceInfo>, CaptureError> {
        let devices = cpal::default_host()
            .devices()
            .map_err(|e| CaptureError::Backend(format!("device enumeration failed: {}", e)))?;

        let mut infos = Vec::new();
        for (index, device) in devices.enumerate() {
            let name = device.name().unwrap_or_else(|_| format!("device {}", index));
            let max_input_channels = device
                .supported_input_configs()
                .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
                .unwrap_or(0);
            let default_sample_rate = device
                .default_input_config()
                .map(|config| config.sample_rate().0)
                .unwrap_or(0);

            infos.push(InputDeviceInfo {
                index,
                name,
                max_input_channels,
                default_sample_rate,
            });
        }
        Ok(infos)
    }

    fn open_input_stream(
        &self,
        request: StreamRequest,
        callback: AudioBlockCallback,
    ) -> Result<Box<dyn InputStream>, CaptureError> {
        let device = Self::device_at(request.device_index)?;

        let config = cpal::StreamConfig {
            channels: request.channel_count,
            sample_rate: cpal::SampleRate(request.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let channel_count = request.channel_count;
        let device_index = request.device_index;
        let data_callback = move |data: &[f32], _info: &cpal::InputCallbackInfo| {
            callback(data, channel_count, StreamStatus::default());
        };
        // Stream errors are advisory to the capture session: log, never raise.
        let error_callback = move |err: cpal::StreamError| {
            log::warn!("input stream {}: {}", device_index, err);
        };

        let stream = device
            .build_input_stream(&config, data_callback, error_callback, None)
            .map_err(|e| CaptureError::Backend(format!("failed to open input stream: {}", e)))?;

        // Some hosts start streams eagerly; hold the stream idle until
        // the device asks for callbacks.
        stream
            .pause()
            .map_err(|e| CaptureError::Backend(format!("failed to idle input stream: {}", e)))?;

        Ok(Box::new(CpalInputStream {
            stream,
            active: false,
        }))
    }
}

/// Input stream handle backed by a `cpal::Stream`.
///
/// Dropping the handle closes the host stream.
pub struct CpalInputStream {
    stream: cpal::Stream,
    active: bool,
}

impl InputStream for CpalInputStream {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.stream
            .play()
            .map_err(|e| CaptureError::Backend(format!("failed to start input stream: {}", e)))?;
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.stream
            .pause()
            .map_err(|e| CaptureError::Backend(format!("failed to stop input stream: {}", e)))?;
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
