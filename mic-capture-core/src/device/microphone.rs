//! The microphone device model.
//!
//! Data flow while recording:
//! ```text
//! hardware → StreamProvider callback → BlockQueue → writer thread → BlockSink
//! ```
//! The callback only pushes to the queue (bounded latency, no audio
//! dropouts); the writer thread owns all file I/O and is joined on
//! stop, so captured audio is durable by the time `stop_recording`
//! returns.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;

use crate::models::block::{SampleBlock, StreamStatus};
use crate::models::config::MicrophoneConfig;
use crate::models::device_info::InputDeviceInfo;
use crate::models::error::CaptureError;
use crate::models::state::{ConnectionState, SessionLog};
use crate::queue::block_queue::BlockQueue;
use crate::storage::wav_writer::WavBlockWriter;
use crate::traits::block_sink::BlockSink;
use crate::traits::recording_device::RecordingDevice;
use crate::traits::stream_provider::{
    AudioBlockCallback, InputStream, StreamProvider, StreamRequest,
};

/// How long the writer loop waits on the queue before re-checking the
/// stop flag.
const WRITER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// List the input-capable devices known to `provider`.
///
/// With `require_nonempty`, an empty result is `NoDevicesFound` —
/// usually an unplugged microphone or a misconfigured host.
pub fn find_input_devices(
    provider: &dyn StreamProvider,
    require_nonempty: bool,
) -> Result<Vec<InputDeviceInfo>, CaptureError> {
    let devices: Vec<InputDeviceInfo> = provider
        .enumerate_input_devices()?
        .into_iter()
        .filter(InputDeviceInfo::is_input)
        .collect();

    if require_nonempty && devices.is_empty() {
        return Err(CaptureError::NoDevicesFound);
    }
    Ok(devices)
}

/// Capture parameters negotiated at connect time, fixed for one
/// connected period.
#[derive(Debug, Clone)]
struct ResolvedParams {
    sample_rate: u32,
    /// 0-based indices into the delivered interleaved frames.
    channels: Vec<usize>,
}

/// Background consumer persisting queued blocks to a sink.
struct WriterTask {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<Result<(), CaptureError>>,
}

/// A single input device wrapping a host-provided audio stream.
///
/// Lifecycle: `connect` → (`start_recording` → `stop_recording`)* →
/// `disconnect`. Dropping a connected device disconnects it.
///
/// ```no_run
/// use std::sync::Arc;
/// use mic_capture_core::{Microphone, MicrophoneConfig, MockStreamProvider, MockDevice};
///
/// let provider = Arc::new(MockStreamProvider::new(vec![MockDevice::new("mic", 1, 16000)]));
/// let mut microphone = Microphone::new(MicrophoneConfig::new(0), provider);
/// microphone.connect()?;
/// microphone.start_recording(Some("take_1.wav".as_ref()))?;
/// // ...
/// microphone.stop_recording()?;
/// microphone.disconnect()?;
/// # Ok::<(), mic_capture_core::CaptureError>(())
/// ```
pub struct Microphone {
    config: MicrophoneConfig,
    provider: Arc<dyn StreamProvider>,
    state: ConnectionState,
    resolved: Option<ResolvedParams>,
    stream: Option<Box<dyn InputStream>>,
    queue: BlockQueue,
    writer: Option<WriterTask>,
    recording: bool,
    session: SessionLog,
}

impl Microphone {
    pub fn new(config: MicrophoneConfig, provider: Arc<dyn StreamProvider>) -> Self {
        Self {
            config,
            provider,
            state: ConnectionState::Disconnected,
            resolved: None,
            stream: None,
            queue: BlockQueue::new(),
            writer: None,
            recording: false,
            session: SessionLog::default(),
        }
    }

    pub fn device_index(&self) -> usize {
        self.config.microphone_index
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Sample rate negotiated at connect time, in Hz.
    pub fn sample_rate(&self) -> Option<u32> {
        self.resolved.as_ref().map(|r| r.sample_rate)
    }

    /// 0-based channel indices negotiated at connect time.
    pub fn channels(&self) -> Option<&[usize]> {
        self.resolved.as_ref().map(|r| r.channels.as_slice())
    }

    /// Timestamps of the most recent recording session.
    pub fn session(&self) -> &SessionLog {
        &self.session
    }

    /// Blocking pop of the next captured block, for sessions started
    /// without an output path. Suspends until a block arrives.
    pub fn next_block(&self) -> SampleBlock {
        self.queue.pop()
    }

    /// Non-blocking variant of [`next_block`](Self::next_block).
    pub fn try_next_block(&self) -> Option<SampleBlock> {
        self.queue.try_pop()
    }

    /// Resolve capture parameters against the hardware and open the
    /// input stream. The stream is idle until `start_recording`.
    pub fn connect(&mut self) -> Result<(), CaptureError> {
        let index = self.config.microphone_index;
        if self.state.is_connected() {
            return Err(CaptureError::AlreadyConnected(index));
        }

        let devices = self.provider.enumerate_input_devices()?;
        let device = devices
            .iter()
            .find(|d| d.index == index)
            .ok_or(CaptureError::DeviceNotFound(index))?;

        if !device.is_input() {
            let available = devices
                .iter()
                .filter(|d| d.is_input())
                .map(|d| d.index)
                .collect();
            return Err(CaptureError::NotAnInputDevice { index, available });
        }

        let sample_rate = match self.config.sample_rate {
            None => device.default_sample_rate,
            Some(requested) if requested > device.default_sample_rate => {
                return Err(CaptureError::UnsupportedSampleRate {
                    requested,
                    supported: device.default_sample_rate,
                });
            }
            Some(requested) => {
                if requested < device.default_sample_rate {
                    log::warn!(
                        "microphone {}: requested sample rate {} Hz is below the device rate {} Hz, capture quality may degrade",
                        index,
                        requested,
                        device.default_sample_rate
                    );
                }
                requested
            }
        };

        let requested_channels: Vec<u16> = match &self.config.channels {
            Some(list) if !list.is_empty() => list.clone(),
            _ => (1..=device.max_input_channels).collect(),
        };
        for &channel in &requested_channels {
            if channel == 0 || channel > device.max_input_channels {
                return Err(CaptureError::ChannelOutOfRange {
                    channel,
                    max: device.max_input_channels,
                });
            }
        }
        // 1-based channel numbers become 0-based slice indices.
        let channels: Vec<usize> = requested_channels.iter().map(|&c| (c - 1) as usize).collect();
        // The stream is opened just wide enough to cover the highest
        // selected channel; the callback slices out the rest.
        let channel_count = channels.iter().max().map(|&c| c as u16 + 1).unwrap_or(1);

        let request = StreamRequest {
            device_index: index,
            sample_rate,
            channel_count,
        };
        let stream = self
            .provider
            .open_input_stream(request, self.block_callback(channels.clone()))?;

        self.resolved = Some(ResolvedParams {
            sample_rate,
            channels,
        });
        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Start capturing. With `output_path`, a writer task persists
    /// blocks there; without, blocks accumulate for manual reads.
    pub fn start_recording(&mut self, output_path: Option<&Path>) -> Result<(), CaptureError> {
        let index = self.config.microphone_index;
        if !self.state.is_connected() {
            return Err(CaptureError::NotConnected(index));
        }
        if self.recording {
            return Err(CaptureError::AlreadyRecording(index));
        }
        let Some(resolved) = self.resolved.clone() else {
            return Err(CaptureError::NotConnected(index));
        };

        // A session owns the queue: leftovers from a previous session
        // must not end up in this one's output.
        while self.queue.try_pop().is_some() {}

        if let Some(path) = output_path {
            remove_stale_output(path)?;
            let sink = WavBlockWriter::create(path, resolved.sample_rate, resolved.channels.len() as u16)?;
            self.writer = Some(self.spawn_writer(Box::new(sink))?);
        }

        self.session.begin(Utc::now());

        // The writer (if any) is already consuming, so the first
        // callback after this point cannot be dropped for lack of a
        // consumer.
        let start_result = match self.stream.as_mut() {
            Some(stream) => stream.start(),
            None => Err(CaptureError::NotConnected(index)),
        };
        if let Err(e) = start_result {
            // Unwind the writer so the failed call leaks no task.
            if let Some(task) = self.writer.take() {
                task.stop.store(true, Ordering::Release);
                let _ = task.handle.join();
            }
            return Err(e);
        }

        self.recording = true;
        Ok(())
    }

    /// Stop capturing. Joins the writer task (flushing every block
    /// enqueued up to the stop signal) and gracefully stops the stream.
    pub fn stop_recording(&mut self) -> Result<(), CaptureError> {
        let index = self.config.microphone_index;
        if !self.state.is_connected() {
            return Err(CaptureError::NotConnected(index));
        }
        if !self.recording {
            return Err(CaptureError::NotRecording(index));
        }

        // Stamp the stop time before any blocking wait so the duration
        // reflects the recording span, not writer-drain time.
        let stopped_at = Utc::now();

        let writer_result = match self.writer.take() {
            Some(task) => {
                task.stop.store(true, Ordering::Release);
                match task.handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(CaptureError::Backend("writer thread panicked".into())),
                }
            }
            None => Ok(()),
        };

        // Graceful stop: in-flight buffers are processed, not aborted.
        let stream_result = match self.stream.as_mut() {
            Some(stream) if stream.is_active() => stream.stop(),
            _ => Ok(()),
        };

        self.recording = false;
        self.session.finish(stopped_at);

        writer_result?;
        stream_result
    }

    /// Close the stream resource. A live recording is stopped first,
    /// and the stream is released even if that stop fails.
    pub fn disconnect(&mut self) -> Result<(), CaptureError> {
        let index = self.config.microphone_index;
        if !self.state.is_connected() {
            return Err(CaptureError::NotConnected(index));
        }

        let stop_result = if self.recording {
            self.stop_recording()
        } else {
            Ok(())
        };

        // Dropping the handle closes the hardware stream.
        self.stream = None;
        self.resolved = None;
        self.state = ConnectionState::Disconnected;

        stop_result
    }

    fn block_callback(&self, picks: Vec<usize>) -> AudioBlockCallback {
        let queue = self.queue.clone();
        let index = self.config.microphone_index;
        Arc::new(move |samples: &[f32], channels: u16, status: StreamStatus| {
            if !status.is_ok() {
                log::warn!("microphone {}: {}", index, status);
            }
            let block =
                SampleBlock::from_interleaved(samples, channels as usize).select_channels(&picks);
            queue.push(block);
        })
    }

    fn spawn_writer(&self, sink: Box<dyn BlockSink>) -> Result<WriterTask, CaptureError> {
        let stop = Arc::new(AtomicBool::new(false));
        let queue = self.queue.clone();
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(format!("mic-{}-writer", self.config.microphone_index))
            .spawn(move || drain_loop(queue, sink, flag))
            .map_err(|e| CaptureError::Backend(format!("failed to spawn writer thread: {}", e)))?;

        Ok(WriterTask { stop, handle })
    }
}

impl RecordingDevice for Microphone {
    fn is_connected(&self) -> bool {
        Microphone::is_connected(self)
    }

    fn is_recording(&self) -> bool {
        Microphone::is_recording(self)
    }

    fn connect(&mut self) -> Result<(), CaptureError> {
        Microphone::connect(self)
    }

    fn start_recording(&mut self, output_path: Option<&Path>) -> Result<(), CaptureError> {
        Microphone::start_recording(self, output_path)
    }

    fn stop_recording(&mut self) -> Result<(), CaptureError> {
        Microphone::stop_recording(self)
    }

    fn disconnect(&mut self) -> Result<(), CaptureError> {
        Microphone::disconnect(self)
    }
}

impl Drop for Microphone {
    fn drop(&mut self) {
        if self.state.is_connected() {
            if let Err(e) = self.disconnect() {
                log::warn!(
                    "microphone {}: disconnect during drop failed: {}",
                    self.config.microphone_index,
                    e
                );
            }
        }
    }
}

/// Writer loop: timed pop so the stop flag is observed between drains.
///
/// The stop signal never aborts a partially drained queue: once the
/// flag is seen, one final drain-until-empty pass writes out every
/// block enqueued up to (and just past) the signal, then the sink is
/// finalized.
fn drain_loop(
    queue: BlockQueue,
    mut sink: Box<dyn BlockSink>,
    stop: Arc<AtomicBool>,
) -> Result<(), CaptureError> {
    loop {
        if stop.load(Ordering::Acquire) {
            while let Some(block) = queue.try_pop() {
                sink.append(&block)?;
            }
            break;
        }
        if let Some(block) = queue.pop_timeout(WRITER_POLL_INTERVAL) {
            sink.append(&block)?;
        }
    }
    sink.finalize()
}

fn remove_stale_output(path: &Path) -> Result<(), CaptureError> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else if path.exists() {
        fs::remove_file(path)
    } else {
        return Ok(());
    };
    result.map_err(|e| CaptureError::OutputPath(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDevice, MockStreamProvider};
    use parking_lot::Mutex;
    use std::path::PathBuf;

    fn stereo_provider() -> Arc<MockStreamProvider> {
        Arc::new(MockStreamProvider::new(vec![MockDevice::new(
            "stereo mic",
            2,
            44100,
        )]))
    }

    fn connected(provider: &Arc<MockStreamProvider>, config: MicrophoneConfig) -> Microphone {
        let mut microphone = Microphone::new(config, Arc::clone(provider) as Arc<dyn StreamProvider>);
        microphone.connect().unwrap();
        microphone
    }

    fn temp_wav_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("microphone_test_{}.wav", name));
        std::fs::remove_file(&path).ok();
        path
    }

    #[test]
    fn connect_resolves_requested_channels_and_default_rate() {
        let provider = stereo_provider();
        let mut config = MicrophoneConfig::new(0);
        config.channels = Some(vec![1, 2]);
        let microphone = connected(&provider, config);

        assert!(microphone.is_connected());
        assert_eq!(microphone.sample_rate(), Some(44100));
        assert_eq!(microphone.channels(), Some(&[0usize, 1][..]));
    }

    #[test]
    fn connect_defaults_to_all_channels() {
        let provider = Arc::new(MockStreamProvider::new(vec![MockDevice::new(
            "quad mic", 4, 48000,
        )]));
        let microphone = connected(&provider, MicrophoneConfig::new(0));

        assert_eq!(microphone.sample_rate(), Some(48000));
        assert_eq!(microphone.channels(), Some(&[0usize, 1, 2, 3][..]));
    }

    #[test]
    fn connect_twice_fails_and_leaves_state_unchanged() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));

        assert_eq!(microphone.connect(), Err(CaptureError::AlreadyConnected(0)));
        assert!(microphone.is_connected());
        assert_eq!(provider.opened_stream_count(), 1);
    }

    #[test]
    fn connect_unknown_index() {
        let provider = stereo_provider();
        let mut microphone =
            Microphone::new(MicrophoneConfig::new(7), Arc::clone(&provider) as Arc<dyn StreamProvider>);
        assert_eq!(microphone.connect(), Err(CaptureError::DeviceNotFound(7)));
        assert!(!microphone.is_connected());
    }

    #[test]
    fn connect_output_only_device() {
        let provider = Arc::new(MockStreamProvider::new(vec![
            MockDevice::new("speakers", 0, 48000),
            MockDevice::new("mic", 1, 16000),
        ]));
        let mut microphone =
            Microphone::new(MicrophoneConfig::new(0), Arc::clone(&provider) as Arc<dyn StreamProvider>);

        assert_eq!(
            microphone.connect(),
            Err(CaptureError::NotAnInputDevice {
                index: 0,
                available: vec![1],
            })
        );
    }

    #[test]
    fn sample_rate_above_device_rate_is_rejected() {
        let provider = stereo_provider();
        let mut config = MicrophoneConfig::new(0);
        config.sample_rate = Some(96000);
        let mut microphone =
            Microphone::new(config, Arc::clone(&provider) as Arc<dyn StreamProvider>);

        assert_eq!(
            microphone.connect(),
            Err(CaptureError::UnsupportedSampleRate {
                requested: 96000,
                supported: 44100,
            })
        );
        assert!(!microphone.is_connected());
        assert_eq!(provider.opened_stream_count(), 0);
    }

    #[test]
    fn sample_rate_below_device_rate_proceeds() {
        let provider = stereo_provider();
        let mut config = MicrophoneConfig::new(0);
        config.sample_rate = Some(16000);
        let microphone = connected(&provider, config);
        assert_eq!(microphone.sample_rate(), Some(16000));
    }

    #[test]
    fn channel_out_of_range_leaves_no_partial_connection() {
        let provider = stereo_provider();
        let mut config = MicrophoneConfig::new(0);
        config.channels = Some(vec![1, 3]);
        let mut microphone =
            Microphone::new(config, Arc::clone(&provider) as Arc<dyn StreamProvider>);

        assert_eq!(
            microphone.connect(),
            Err(CaptureError::ChannelOutOfRange { channel: 3, max: 2 })
        );
        assert!(!microphone.is_connected());
        assert!(microphone.sample_rate().is_none());
        assert_eq!(provider.opened_stream_count(), 0);
    }

    #[test]
    fn lifecycle_calls_require_connection() {
        let provider = stereo_provider();
        let mut microphone =
            Microphone::new(MicrophoneConfig::new(0), Arc::clone(&provider) as Arc<dyn StreamProvider>);

        assert_eq!(
            microphone.start_recording(None),
            Err(CaptureError::NotConnected(0))
        );
        assert_eq!(microphone.stop_recording(), Err(CaptureError::NotConnected(0)));
        assert_eq!(microphone.disconnect(), Err(CaptureError::NotConnected(0)));
    }

    #[test]
    fn stop_without_start_is_not_recording() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));
        assert_eq!(microphone.stop_recording(), Err(CaptureError::NotRecording(0)));
    }

    #[test]
    fn double_stop_is_not_recording() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));
        microphone.start_recording(None).unwrap();
        microphone.stop_recording().unwrap();
        assert_eq!(microphone.stop_recording(), Err(CaptureError::NotRecording(0)));
    }

    #[test]
    fn double_start_is_already_recording() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));
        microphone.start_recording(None).unwrap();
        assert_eq!(
            microphone.start_recording(None),
            Err(CaptureError::AlreadyRecording(0))
        );
        microphone.stop_recording().unwrap();
    }

    #[test]
    fn manual_reads_deliver_selected_channels_in_fifo_order() {
        let provider = stereo_provider();
        let mut config = MicrophoneConfig::new(0);
        config.channels = Some(vec![2]);
        let mut microphone = connected(&provider, config);

        microphone.start_recording(None).unwrap();
        assert!(microphone.is_recording());

        provider.deliver(&[0.1, 0.2, 0.3, 0.4]);
        provider.deliver(&[0.5, 0.6]);

        assert_eq!(microphone.next_block().samples(), &[0.2, 0.4]);
        assert_eq!(microphone.next_block().samples(), &[0.6]);
        assert!(microphone.try_next_block().is_none());

        microphone.stop_recording().unwrap();
        assert!(!microphone.is_recording());
    }

    #[test]
    fn overruns_are_logged_not_raised() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));
        microphone.start_recording(None).unwrap();

        let overflow = StreamStatus {
            input_overflow: true,
        };
        provider.deliver_with_status(&[0.1, 0.2], overflow);
        assert_eq!(microphone.next_block().samples(), &[0.1, 0.2]);

        microphone.stop_recording().unwrap();
    }

    #[test]
    fn file_recording_persists_every_delivered_block_in_order() {
        let provider = stereo_provider();
        let mut config = MicrophoneConfig::new(0);
        config.channels = Some(vec![1, 2]);
        let mut microphone = connected(&provider, config);

        let path = temp_wav_path("full_session");
        microphone.start_recording(Some(&path)).unwrap();

        provider.deliver(&[0.1, 0.2, 0.3, 0.4]);
        provider.deliver(&[0.5, 0.6]);
        provider.deliver(&[0.7, 0.8]);

        microphone.stop_recording().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]);

        let session = microphone.session();
        assert!(session.started_at.is_some());
        assert!(session.stopped_at.is_some());
        assert!(session.duration.unwrap() >= chrono::Duration::zero());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn start_recording_replaces_a_stale_file() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));

        let path = temp_wav_path("stale");
        std::fs::write(&path, b"not a wav file").unwrap();

        microphone.start_recording(Some(&path)).unwrap();
        provider.deliver(&[0.1, 0.2]);
        microphone.stop_recording().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.1, 0.2]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn bad_output_path_fails_before_the_stream_starts() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));

        let path = std::env::temp_dir().join("microphone_test_bad.ogg");
        let err = microphone.start_recording(Some(&path)).unwrap_err();
        assert!(matches!(err, CaptureError::OutputPath(_)));
        assert!(!microphone.is_recording());

        // The idle stream discards nothing because nothing is delivered.
        provider.deliver(&[0.1, 0.2]);
        assert!(microphone.try_next_block().is_none());
    }

    #[test]
    fn disconnect_while_recording_stops_and_flushes() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));

        let path = temp_wav_path("disconnect_flush");
        microphone.start_recording(Some(&path)).unwrap();
        provider.deliver(&[0.1, 0.2]);
        provider.deliver(&[0.3, 0.4]);

        microphone.disconnect().unwrap();
        assert!(!microphone.is_connected());
        assert!(!microphone.is_recording());
        assert_eq!(provider.closed_stream_count(), 1);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.1, 0.2, 0.3, 0.4]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn a_new_session_does_not_inherit_queue_residue() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));

        // Manual session leaves an undrained block behind.
        microphone.start_recording(None).unwrap();
        provider.deliver(&[0.9, 0.9]);
        microphone.stop_recording().unwrap();

        let path = temp_wav_path("residue");
        microphone.start_recording(Some(&path)).unwrap();
        provider.deliver(&[0.1, 0.2]);
        microphone.stop_recording().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.1, 0.2]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn drop_disconnects_a_connected_device() {
        let provider = stereo_provider();
        {
            let _microphone = connected(&provider, MicrophoneConfig::new(0));
            assert_eq!(provider.closed_stream_count(), 0);
        }
        assert_eq!(provider.closed_stream_count(), 1);
    }

    #[test]
    fn reconnect_after_disconnect_re_resolves() {
        let provider = stereo_provider();
        let mut microphone = connected(&provider, MicrophoneConfig::new(0));

        microphone.disconnect().unwrap();
        assert!(microphone.sample_rate().is_none());

        microphone.connect().unwrap();
        assert_eq!(microphone.sample_rate(), Some(44100));
        assert_eq!(provider.opened_stream_count(), 2);
    }

    #[test]
    fn find_input_devices_filters_and_requires() {
        let provider = MockStreamProvider::new(vec![
            MockDevice::new("speakers", 0, 48000),
            MockDevice::new("mic", 2, 44100),
        ]);
        let devices = find_input_devices(&provider, true).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].index, 1);

        let empty = MockStreamProvider::new(vec![MockDevice::new("speakers", 0, 48000)]);
        assert_eq!(
            find_input_devices(&empty, true),
            Err(CaptureError::NoDevicesFound)
        );
        assert_eq!(find_input_devices(&empty, false), Ok(vec![]));
    }

    // In-memory sink used to pin down the writer loop's drain contract.
    struct MemorySink {
        blocks: Arc<Mutex<Vec<SampleBlock>>>,
        finalized: Arc<AtomicBool>,
    }

    impl BlockSink for MemorySink {
        fn append(&mut self, block: &SampleBlock) -> Result<(), CaptureError> {
            self.blocks.lock().push(block.clone());
            Ok(())
        }

        fn finalize(self: Box<Self>) -> Result<(), CaptureError> {
            self.finalized.store(true, Ordering::Release);
            Ok(())
        }
    }

    #[test]
    fn drain_loop_flushes_everything_enqueued_before_the_signal() {
        let queue = BlockQueue::new();
        let blocks = Arc::new(Mutex::new(Vec::new()));
        let finalized = Arc::new(AtomicBool::new(false));
        let sink = Box::new(MemorySink {
            blocks: Arc::clone(&blocks),
            finalized: Arc::clone(&finalized),
        });

        for i in 0..100 {
            queue.push(SampleBlock::from_interleaved(&[i as f32], 1));
        }

        // Signal before the loop even starts: the final drain pass must
        // still write out all 100 queued blocks.
        let stop = Arc::new(AtomicBool::new(true));
        drain_loop(queue, sink, stop).unwrap();

        let written = blocks.lock();
        assert_eq!(written.len(), 100);
        assert_eq!(written[0].samples(), &[0.0]);
        assert_eq!(written[99].samples(), &[99.0]);
        assert!(finalized.load(Ordering::Acquire));
    }
}
