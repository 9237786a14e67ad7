//! Record a WAV snippet from each selected microphone.
//!
//! Connects every requested device (or all discovered input devices),
//! records for the given duration into
//! `<output-dir>/microphone_<index>.wav`, then stops and disconnects.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use mic_capture_core::{
    find_input_devices, CaptureError, Microphone, MicrophoneConfig, MockDevice,
    MockStreamProvider, StreamProvider,
};
use mic_capture_cpal::CpalStreamProvider;

#[derive(Parser, Debug)]
#[command(
    name = "mic-record",
    about = "Record an audio snippet from each selected microphone"
)]
struct Args {
    /// Device indices to record from. Defaults to every input device.
    #[arg(long, num_args = 0..)]
    microphone_ids: Vec<usize>,

    /// Directory the snippets are written to. Recreated from scratch.
    #[arg(long, default_value = "outputs/audio_from_microphones")]
    output_dir: PathBuf,

    /// Recording duration in seconds.
    #[arg(long, default_value_t = 4.0)]
    record_time_s: f64,

    /// Capture from a synthesized device instead of real hardware.
    #[arg(long)]
    mock: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CaptureError> {
    let provider: Arc<dyn StreamProvider> = if args.mock {
        Arc::new(MockStreamProvider::with_synthesized_input(
            vec![MockDevice::new("mock microphone", 1, 16000)],
            256,
            Duration::from_millis(10),
        ))
    } else {
        Arc::new(CpalStreamProvider::new())
    };

    let microphone_ids: Vec<usize> = if args.microphone_ids.is_empty() {
        find_input_devices(provider.as_ref(), true)?
            .into_iter()
            .map(|device| device.index)
            .collect()
    } else {
        args.microphone_ids.clone()
    };

    let mut microphones = Vec::new();
    for id in microphone_ids {
        let mut microphone = Microphone::new(MicrophoneConfig::new(id), Arc::clone(&provider));
        microphone.connect()?;
        log::info!(
            "recording microphone {} for {} s at {} Hz",
            id,
            args.record_time_s,
            microphone.sample_rate().unwrap_or(0)
        );
        microphones.push(microphone);
    }

    if args.output_dir.exists() {
        std::fs::remove_dir_all(&args.output_dir)
            .map_err(|e| CaptureError::OutputPath(format!("{}: {}", args.output_dir.display(), e)))?;
    }
    std::fs::create_dir_all(&args.output_dir)
        .map_err(|e| CaptureError::OutputPath(format!("{}: {}", args.output_dir.display(), e)))?;
    log::info!("saving audio to {}", args.output_dir.display());

    for microphone in &mut microphones {
        let path = args
            .output_dir
            .join(format!("microphone_{}.wav", microphone.device_index()));
        microphone.start_recording(Some(&path))?;
    }

    thread::sleep(Duration::from_secs_f64(args.record_time_s));

    for microphone in &mut microphones {
        microphone.stop_recording()?;
    }

    // Recording could be resumed here; disconnect releases the streams.
    for microphone in &mut microphones {
        microphone.disconnect()?;
    }

    log::info!("audio saved to {}", args.output_dir.display());
    Ok(())
}
