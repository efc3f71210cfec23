//! Synthesis building blocks
//!
//! Waveforms, the detuned oscillator bank and the ADSR envelope, plus the
//! immutable [`SynthConfig`] the engine renders with.

mod envelope;
mod oscillator;

pub use envelope::{EnvelopeStage, EnvelopeTiming, StageSpan};
pub use oscillator::{frequency, OscillatorConfig, Waveform, MAX_DETUNE_VOICES};

use crate::config::PatchConfig;
use crate::error::ParameterError;
use rand::Rng;

/// Everything the engine needs, resolved once from a patch
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub master_gain: f64,
    /// Semitones added to every note before oscillator transpose
    pub global_transpose: f64,
    pub envelope: EnvelopeTiming,
    pub oscillators: Vec<OscillatorConfig>,
}

impl SynthConfig {
    /// Validate a patch and resolve it. Phase offsets for detuned voices are
    /// drawn from `rng` here and stay fixed for the whole render.
    pub fn from_patch<R: Rng>(
        patch: &PatchConfig,
        rng: &mut R,
    ) -> Result<Self, ParameterError> {
        patch.validate()?;

        let sample_rate = patch.audio.sample_rate;
        let env = &patch.envelope;
        let envelope = EnvelopeTiming::from_seconds(
            env.attack,
            env.decay,
            env.sustain,
            env.release,
            sample_rate,
        );

        let mut oscillators = Vec::with_capacity(patch.oscillators.len());
        for (i, settings) in patch.oscillators.iter().enumerate() {
            let waveform = Waveform::from_name(&settings.waveform).ok_or_else(|| {
                ParameterError::UnknownWaveform {
                    oscillator: i + 1,
                    name: settings.waveform.clone(),
                }
            })?;
            let mut osc = OscillatorConfig {
                gain: settings.gain,
                transpose: settings.transpose,
                waveform,
                detune_voices: settings.detune_voices,
                detune_amount: settings.detune_amount,
                phase_randomization: settings.phase_randomization,
                detune_phase_offsets: [0.0; MAX_DETUNE_VOICES],
            };
            osc.randomize_phases(rng);
            oscillators.push(osc);
        }

        Ok(Self {
            sample_rate,
            master_gain: patch.master.gain,
            global_transpose: patch.master.transpose,
            envelope,
            oscillators,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AudioConfig, EnvelopeConfig, MasterConfig, OscillatorSettings, PatchConfig,
    };
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn patch() -> PatchConfig {
        PatchConfig {
            audio: AudioConfig { sample_rate: 48000 },
            master: MasterConfig {
                gain: 0.25,
                transpose: -12.0,
            },
            envelope: EnvelopeConfig {
                attack: 0.01,
                decay: 0.02,
                sustain: 0.6,
                release: 0.5,
            },
            oscillators: vec![
                OscillatorSettings {
                    gain: 0.8,
                    transpose: 7.0,
                    waveform: "saw".to_string(),
                    detune_voices: 4,
                    detune_amount: 0.2,
                    phase_randomization: 1.0,
                },
                OscillatorSettings::default(),
            ],
        }
    }

    #[test]
    fn test_from_patch() {
        let config = SynthConfig::from_patch(&patch(), &mut SmallRng::seed_from_u64(3)).unwrap();

        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.master_gain, 0.25);
        assert_eq!(config.global_transpose, -12.0);
        assert_eq!(config.envelope.attack, 480);
        assert_eq!(config.envelope.decay, 960);
        assert_eq!(config.envelope.release, 24000);
        assert_eq!(config.envelope.sustain_level, 0.6);

        let saw = &config.oscillators[0];
        assert_eq!(saw.waveform, Waveform::Saw);
        assert_eq!(saw.detune_voices, 4);
        assert!(saw.detune_phase_offsets[..4].iter().any(|&o| o > 0.0));
        assert!(saw.detune_phase_offsets[4..].iter().all(|&o| o == 0.0));

        assert_eq!(config.oscillators[1].waveform, Waveform::Sine);
    }

    #[test]
    fn test_from_patch_is_reproducible() {
        let a = SynthConfig::from_patch(&patch(), &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = SynthConfig::from_patch(&patch(), &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_patch_rejects_unknown_waveform() {
        let mut patch = patch();
        patch.oscillators[1].waveform = "noise".to_string();

        let err = SynthConfig::from_patch(&patch, &mut SmallRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            ParameterError::UnknownWaveform { oscillator: 2, .. }
        ));
    }
}
