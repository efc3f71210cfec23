//! Scorewave - render MIDI scores to WAV with an additive synthesizer
//!
//! A Standard MIDI File is decoded into absolute-time notes, every note is
//! played through a bank of detuned oscillators under a shared ADSR
//! envelope, and the summed buffer is written as 16-bit PCM.

pub mod config;
pub mod engine;
pub mod error;
pub mod midi;
pub mod synth;

pub use config::PatchConfig;
pub use engine::{Engine, Recorder};
pub use error::{Error, FormatError, ParameterError};
pub use midi::{Decoder, NoteEvent};
pub use synth::SynthConfig;
