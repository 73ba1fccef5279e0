//! Speech and lip-sync adapters for the avatar pipeline.
//!
//! Two leaf adapters live here:
//!
//! - the speech synthesizer, which turns text into an audio file either
//!   through the ElevenLabs HTTP API or a local Piper binary, and
//! - the transcoder, a two-stage pipeline that converts the synthesized audio
//!   into a waveform (ffmpeg) and extracts a viseme track from it (Rhubarb
//!   Lip Sync).
//!
//! Each stage sits behind a trait so the segment builder never depends on a
//! concrete tool, and tests can swap in fakes.

pub mod config;
pub mod elevenlabs;
pub mod error;
mod process;
pub mod synth;
pub mod transcode;
pub mod tts;

pub use config::{ElevenLabsConfig, PiperConfig, TranscoderConfig};
pub use elevenlabs::ElevenLabsSynthesizer;
pub use error::VoiceError;
pub use synth::SpeechSynthesizer;
pub use transcode::{
    read_viseme_track, AudioConverter, FfmpegConverter, RhubarbExtractor, VisemeExtractor,
};
pub use tts::PiperSynthesizer;
