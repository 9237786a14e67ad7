//! # mic-capture-cpal
//!
//! cpal host-audio backend for mic-capture-core.
//!
//! Provides:
//! - `CpalStreamProvider` — device enumeration and callback-driven
//!   input streams over the host's default cpal backend (ALSA,
//!   CoreAudio, WASAPI, ...)
//! - `mic-record` — CLI binary recording a WAV snippet from each
//!   selected microphone
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use mic_capture_core::{Microphone, MicrophoneConfig};
//! use mic_capture_cpal::CpalStreamProvider;
//!
//! let provider = Arc::new(CpalStreamProvider::new());
//! let mut microphone = Microphone::new(MicrophoneConfig::new(0), provider);
//! microphone.connect().unwrap();
//! ```

pub mod provider;

pub use provider::CpalStreamProvider;
