//! Patch schema definitions

use crate::error::ParameterError;
use crate::synth::{Waveform, MAX_DETUNE_VOICES};
use serde::{Deserialize, Serialize};

/// A synth patch: global settings plus the oscillator bank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Master gain and transpose
    #[serde(default)]
    pub master: MasterConfig,

    /// Envelope shared by every oscillator and note
    #[serde(default)]
    pub envelope: EnvelopeConfig,

    /// Oscillator bank, rendered in order for every note
    #[serde(default)]
    pub oscillators: Vec<OscillatorSettings>,
}

impl PatchConfig {
    /// Validate the patch
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(8000..=192000).contains(&self.audio.sample_rate) {
            return Err(ParameterError::OutOfRange {
                parameter: "sample rate".to_string(),
                value: f64::from(self.audio.sample_rate),
                range: "8000..=192000",
            });
        }

        non_negative("master gain", self.master.gain)?;
        finite("global transpose", self.master.transpose)?;

        non_negative("attack", self.envelope.attack)?;
        non_negative("decay", self.envelope.decay)?;
        unit("sustain", self.envelope.sustain)?;
        non_negative("release", self.envelope.release)?;

        if self.oscillators.is_empty() {
            return Err(ParameterError::NoOscillators);
        }
        for (i, osc) in self.oscillators.iter().enumerate() {
            let n = i + 1;
            if Waveform::from_name(&osc.waveform).is_none() {
                return Err(ParameterError::UnknownWaveform {
                    oscillator: n,
                    name: osc.waveform.clone(),
                });
            }
            if osc.detune_voices > MAX_DETUNE_VOICES {
                return Err(ParameterError::TooManyDetuneVoices {
                    oscillator: n,
                    count: osc.detune_voices,
                    max: MAX_DETUNE_VOICES,
                });
            }
            non_negative(&format!("oscillator {} gain", n), osc.gain)?;
            finite(&format!("oscillator {} transpose", n), osc.transpose)?;
            finite(&format!("oscillator {} detune amount", n), osc.detune_amount)?;
            unit(
                &format!("oscillator {} phase randomization", n),
                osc.phase_randomization,
            )?;
        }

        Ok(())
    }
}

fn non_negative(parameter: &str, value: f64) -> Result<(), ParameterError> {
    check(parameter, value, value >= 0.0 && value.is_finite(), ">= 0")
}

fn unit(parameter: &str, value: f64) -> Result<(), ParameterError> {
    check(parameter, value, (0.0..=1.0).contains(&value), "0.0..=1.0")
}

fn finite(parameter: &str, value: f64) -> Result<(), ParameterError> {
    check(parameter, value, value.is_finite(), "finite values")
}

fn check(parameter: &str, value: f64, ok: bool, range: &'static str) -> Result<(), ParameterError> {
    if ok {
        Ok(())
    } else {
        Err(ParameterError::OutOfRange {
            parameter: parameter.to_string(),
            value,
            range,
        })
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }

/// Master settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MasterConfig {
    /// Gain applied to every sample (default: 0.5)
    #[serde(default = "default_master_gain")]
    pub gain: f64,

    /// Semitones added to every note (default: 0)
    #[serde(default)]
    pub transpose: f64,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            gain: default_master_gain(),
            transpose: 0.0,
        }
    }
}

fn default_master_gain() -> f64 { 0.5 }

/// ADSR times in seconds and the sustain level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvelopeConfig {
    #[serde(default = "default_attack")]
    pub attack: f64,
    #[serde(default = "default_decay")]
    pub decay: f64,
    #[serde(default = "default_sustain")]
    pub sustain: f64,
    #[serde(default = "default_release")]
    pub release: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: default_attack(),
            decay: default_decay(),
            sustain: default_sustain(),
            release: default_release(),
        }
    }
}

fn default_attack() -> f64 { 0.01 }
fn default_decay() -> f64 { 0.1 }
fn default_sustain() -> f64 { 0.7 }
fn default_release() -> f64 { 0.3 }

/// One oscillator of the bank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OscillatorSettings {
    /// Peak level of this oscillator (default: 1.0)
    #[serde(default = "default_gain")]
    pub gain: f64,

    /// Semitones added on top of the global transpose
    #[serde(default)]
    pub transpose: f64,

    /// One of sine, sine8, square, saw (default: sine)
    #[serde(default = "default_waveform")]
    pub waveform: String,

    /// Extra detuned copies of the base voice, at most 16
    #[serde(default)]
    pub detune_voices: usize,

    /// Total semitone spread of the detuned voices
    #[serde(default)]
    pub detune_amount: f64,

    /// 0.0-1.0, how far detuned voices start out of phase
    #[serde(default)]
    pub phase_randomization: f64,
}

impl Default for OscillatorSettings {
    fn default() -> Self {
        Self {
            gain: default_gain(),
            transpose: 0.0,
            waveform: default_waveform(),
            detune_voices: 0,
            detune_amount: 0.0,
            phase_randomization: 0.0,
        }
    }
}

fn default_gain() -> f64 { 1.0 }
fn default_waveform() -> String { "sine".to_string() }
