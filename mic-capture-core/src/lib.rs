//! # mic-capture-core
//!
//! Platform-agnostic microphone capture core library.
//!
//! Models a single input device with a strict
//! connect → record → stop → disconnect lifecycle. Host audio backends
//! (cpal, mocks) implement the `StreamProvider` trait and plug into the
//! generic `Microphone` device model.
//!
//! ## Architecture
//!
//! ```text
//! mic-capture-core (this crate)
//! ├── traits/    ← StreamProvider, InputStream, RecordingDevice, BlockSink
//! ├── models/    ← CaptureError, MicrophoneConfig, InputDeviceInfo, SampleBlock, SessionLog
//! ├── queue/     ← BlockQueue (callback → writer handoff)
//! ├── storage/   ← WavBlockWriter
//! ├── device/    ← Microphone (lifecycle orchestrator)
//! └── mock       ← MockStreamProvider (tests, hardware-free capture)
//! ```
//!
//! Data flow while recording:
//! ```text
//! hardware → StreamProvider callback → BlockQueue → writer thread → WAV file
//! ```

pub mod device;
pub mod mock;
pub mod models;
pub mod queue;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use device::microphone::{find_input_devices, Microphone};
pub use mock::{MockDevice, MockStreamProvider};
pub use models::block::{SampleBlock, StreamStatus};
pub use models::config::MicrophoneConfig;
pub use models::device_info::InputDeviceInfo;
pub use models::error::CaptureError;
pub use models::state::{ConnectionState, SessionLog};
pub use queue::block_queue::BlockQueue;
pub use storage::wav_writer::WavBlockWriter;
pub use traits::block_sink::BlockSink;
pub use traits::recording_device::RecordingDevice;
pub use traits::stream_provider::{AudioBlockCallback, InputStream, StreamProvider, StreamRequest};
