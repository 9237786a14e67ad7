//! Fake stream provider for tests and hardware-free operation.
//!
//! Two delivery modes:
//! - manual: the test calls [`MockStreamProvider::deliver`] to push a
//!   block through every active stream's callback;
//! - synthesized: streams opened by a provider built with
//!   [`MockStreamProvider::with_synthesized_input`] spawn a generator
//!   thread emitting silence blocks while started (used by the CLI's
//!   `--mock` flag).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::block::StreamStatus;
use crate::models::device_info::InputDeviceInfo;
use crate::models::error::CaptureError;
use crate::traits::stream_provider::{
    AudioBlockCallback, InputStream, StreamProvider, StreamRequest,
};

/// Description of one fake input device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub name: String,
    pub max_input_channels: u16,
    pub default_sample_rate: u32,
}

impl MockDevice {
    pub fn new(name: &str, max_input_channels: u16, default_sample_rate: u32) -> Self {
        Self {
            name: name.to_string(),
            max_input_channels,
            default_sample_rate,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SynthConfig {
    frames: usize,
    interval: Duration,
}

/// State shared between a stream handle, its generator thread, and the
/// provider's delivery path.
struct StreamShared {
    callback: AudioBlockCallback,
    channel_count: u16,
    active: AtomicBool,
}

/// Fake host audio subsystem.
pub struct MockStreamProvider {
    devices: Vec<MockDevice>,
    streams: Arc<Mutex<Vec<Arc<StreamShared>>>>,
    closed_streams: Arc<AtomicUsize>,
    synth: Option<SynthConfig>,
}

impl MockStreamProvider {
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self {
            devices,
            streams: Arc::new(Mutex::new(Vec::new())),
            closed_streams: Arc::new(AtomicUsize::new(0)),
            synth: None,
        }
    }

    /// Provider whose streams emit silence blocks of `frames` frames
    /// every `interval` while started.
    pub fn with_synthesized_input(
        devices: Vec<MockDevice>,
        frames: usize,
        interval: Duration,
    ) -> Self {
        Self {
            synth: Some(SynthConfig { frames, interval }),
            ..Self::new(devices)
        }
    }

    /// Invoke every active stream's callback with the given interleaved
    /// samples, as if the hardware had delivered them.
    pub fn deliver(&self, samples: &[f32]) {
        self.deliver_with_status(samples, StreamStatus::default());
    }

    pub fn deliver_with_status(&self, samples: &[f32], status: StreamStatus) {
        for stream in self.streams.lock().iter() {
            if stream.active.load(Ordering::Acquire) {
                (stream.callback)(samples, stream.channel_count, status);
            }
        }
    }

    /// Streams opened so far (including closed ones).
    pub fn opened_stream_count(&self) -> usize {
        self.streams.lock().len()
    }

    /// Stream handles dropped so far.
    pub fn closed_stream_count(&self) -> usize {
        self.closed_streams.load(Ordering::Acquire)
    }
}

impl StreamProvider for MockStreamProvider {
    fn enumerate_input_devices(&self) -> Result<Vec<InputDeviceInfo>, CaptureError> {
        Ok(self
            .devices
            .iter()
            .enumerate()
            .map(|(index, device)| InputDeviceInfo {
                index,
                name: device.name.clone(),
                max_input_channels: device.max_input_channels,
                default_sample_rate: device.default_sample_rate,
            })
            .collect())
    }

    fn open_input_stream(
        &self,
        request: StreamRequest,
        callback: AudioBlockCallback,
    ) -> Result<Box<dyn InputStream>, CaptureError> {
        if request.device_index >= self.devices.len() {
            return Err(CaptureError::DeviceNotFound(request.device_index));
        }

        let shared = Arc::new(StreamShared {
            callback,
            channel_count: request.channel_count,
            active: AtomicBool::new(false),
        });
        self.streams.lock().push(Arc::clone(&shared));

        Ok(Box::new(MockInputStream {
            shared,
            closed: Arc::clone(&self.closed_streams),
            synth: self.synth,
            generator: None,
        }))
    }
}

/// Stream handle issued by [`MockStreamProvider`].
pub struct MockInputStream {
    shared: Arc<StreamShared>,
    closed: Arc<AtomicUsize>,
    synth: Option<SynthConfig>,
    generator: Option<thread::JoinHandle<()>>,
}

impl MockInputStream {
    fn quiesce(&mut self) {
        self.shared.active.store(false, Ordering::Release);
        if let Some(handle) = self.generator.take() {
            let _ = handle.join();
        }
    }
}

impl InputStream for MockInputStream {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.shared.active.store(true, Ordering::Release);

        if let Some(synth) = self.synth {
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name("mock-input".into())
                .spawn(move || {
                    let samples = vec![0.0f32; synth.frames * shared.channel_count as usize];
                    while shared.active.load(Ordering::Acquire) {
                        (shared.callback)(&samples, shared.channel_count, StreamStatus::default());
                        thread::sleep(synth.interval);
                    }
                })
                .map_err(|e| {
                    CaptureError::Backend(format!("failed to spawn mock input thread: {}", e))
                })?;
            self.generator = Some(handle);
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.quiesce();
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }
}

impl Drop for MockInputStream {
    fn drop(&mut self) {
        self.quiesce();
        self.closed.fetch_add(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::block_queue::BlockQueue;
    use crate::models::block::SampleBlock;

    fn capture_callback(queue: &BlockQueue) -> AudioBlockCallback {
        let queue = queue.clone();
        Arc::new(move |samples: &[f32], channels: u16, _status: StreamStatus| {
            queue.push(SampleBlock::from_interleaved(samples, channels as usize));
        })
    }

    #[test]
    fn delivery_requires_an_active_stream() {
        let provider = MockStreamProvider::new(vec![MockDevice::new("fake", 2, 44100)]);
        let queue = BlockQueue::new();
        let request = StreamRequest {
            device_index: 0,
            sample_rate: 44100,
            channel_count: 2,
        };
        let mut stream = provider
            .open_input_stream(request, capture_callback(&queue))
            .unwrap();

        provider.deliver(&[0.1, 0.2]);
        assert!(queue.is_empty());

        stream.start().unwrap();
        provider.deliver(&[0.1, 0.2]);
        assert_eq!(queue.len(), 1);

        stream.stop().unwrap();
        provider.deliver(&[0.3, 0.4]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn drop_counts_as_close() {
        let provider = MockStreamProvider::new(vec![MockDevice::new("fake", 1, 16000)]);
        let queue = BlockQueue::new();
        let request = StreamRequest {
            device_index: 0,
            sample_rate: 16000,
            channel_count: 1,
        };
        let stream = provider
            .open_input_stream(request, capture_callback(&queue))
            .unwrap();

        assert_eq!(provider.opened_stream_count(), 1);
        assert_eq!(provider.closed_stream_count(), 0);
        drop(stream);
        assert_eq!(provider.closed_stream_count(), 1);
    }

    #[test]
    fn unknown_index_is_rejected() {
        let provider = MockStreamProvider::new(vec![MockDevice::new("fake", 1, 16000)]);
        let queue = BlockQueue::new();
        let request = StreamRequest {
            device_index: 3,
            sample_rate: 16000,
            channel_count: 1,
        };
        let err = provider
            .open_input_stream(request, capture_callback(&queue))
            .unwrap_err();
        assert_eq!(err, CaptureError::DeviceNotFound(3));
    }

    #[test]
    fn synthesized_stream_produces_blocks_while_started() {
        let provider = MockStreamProvider::with_synthesized_input(
            vec![MockDevice::new("fake", 1, 16000)],
            64,
            Duration::from_millis(1),
        );
        let queue = BlockQueue::new();
        let request = StreamRequest {
            device_index: 0,
            sample_rate: 16000,
            channel_count: 1,
        };
        let mut stream = provider
            .open_input_stream(request, capture_callback(&queue))
            .unwrap();

        stream.start().unwrap();
        let block = queue.pop_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(block.frames(), 64);
        stream.stop().unwrap();
        assert!(!stream.is_active());
    }
}
