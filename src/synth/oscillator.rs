//! Waveforms and the detuned oscillator bank

use rand::Rng;
use std::f64::consts::PI;
use std::fmt;

/// Upper bound on detuned sub-voices per oscillator
pub const MAX_DETUNE_VOICES: usize = 16;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    /// First eight harmonics at equal amplitude
    Sine8,
    Square,
    Saw,
}

impl Waveform {
    /// Look up a waveform by its parameter-file name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sine" => Some(Waveform::Sine),
            "sine8" => Some(Waveform::Sine8),
            "square" => Some(Waveform::Square),
            "saw" => Some(Waveform::Saw),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Sine8 => "sine8",
            Waveform::Square => "square",
            Waveform::Saw => "saw",
        }
    }

    /// Evaluate at `phase`, measured in cycles
    pub fn sample(&self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => sine(phase),
            Waveform::Sine8 => sine8(phase),
            Waveform::Square => square(phase),
            Waveform::Saw => saw(phase),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn sine(x: f64) -> f64 {
    (2.0 * PI * x).sin()
}

fn sine8(x: f64) -> f64 {
    (1..=8).map(|k| sine(x * k as f64)).sum::<f64>() / 2.0
}

fn square(x: f64) -> f64 {
    ((x * 2.0).trunc().rem_euclid(2.0)) * 2.0 - 1.0
}

fn saw(x: f64) -> f64 {
    2.0 * (x - x.floor()) - 1.0
}

/// Frequency in Hz of a (possibly fractional) MIDI pitch.
///
/// The reference sits at twice A440, so pitch 69 sounds at 880 Hz.
pub fn frequency(pitch: f64) -> f64 {
    2.0 * 440.0 * 2f64.powf((pitch - 69.0) / 12.0)
}

/// One oscillator of the bank: a base voice plus `detune_voices` detuned copies
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorConfig {
    pub gain: f64,
    /// Semitones added to every note
    pub transpose: f64,
    pub waveform: Waveform,
    pub detune_voices: usize,
    /// Total semitone spread shared among the detuned voices
    pub detune_amount: f64,
    /// Scales the random phase offsets (0 keeps every voice in phase)
    pub phase_randomization: f64,
    /// Phase offset of detuned voice `i` (1-based) at index `i - 1`
    pub detune_phase_offsets: [f64; MAX_DETUNE_VOICES],
}

impl OscillatorConfig {
    /// Unity-gain oscillator without detune
    pub fn new(waveform: Waveform) -> Self {
        Self {
            gain: 1.0,
            transpose: 0.0,
            waveform,
            detune_voices: 0,
            detune_amount: 0.0,
            phase_randomization: 0.0,
            detune_phase_offsets: [0.0; MAX_DETUNE_VOICES],
        }
    }

    /// Draw fresh phase offsets for the detuned voices
    pub fn randomize_phases<R: Rng>(&mut self, rng: &mut R) {
        let scale = 2.0 * PI * self.phase_randomization;
        for (i, offset) in self.detune_phase_offsets.iter_mut().enumerate() {
            *offset = if i < self.detune_voices {
                rng.random::<f64>() * scale
            } else {
                0.0
            };
        }
    }

    /// Semitone offset of sub-voice `index`; odd voices go up, even voices go down
    pub fn detune_offset(&self, index: usize) -> f64 {
        if index == 0 || self.detune_voices == 0 {
            return 0.0;
        }
        let step = self.detune_amount / self.detune_voices as f64 * index as f64;
        if index % 2 == 1 {
            step
        } else {
            -step
        }
    }

    pub fn phase_offset(&self, index: usize) -> f64 {
        match index {
            0 => 0.0,
            i => self.detune_phase_offsets[i - 1],
        }
    }

    /// Unscaled sum of all sub-voices at sample `x` for a note at `pitch`
    pub fn oscillate(&self, x: u64, pitch: f64, sample_rate: f64) -> f64 {
        let base = pitch + self.transpose;
        (0..=self.detune_voices)
            .map(|i| {
                let freq = frequency(base + self.detune_offset(i));
                self.waveform
                    .sample(x as f64 * freq / sample_rate + self.phase_offset(i))
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_waveform_names() {
        for waveform in [Waveform::Sine, Waveform::Sine8, Waveform::Square, Waveform::Saw] {
            assert_eq!(Waveform::from_name(waveform.name()), Some(waveform));
        }
        assert_eq!(Waveform::from_name("triangle"), None);
        assert_eq!(Waveform::Sine8.to_string(), "sine8");
    }

    #[test]
    fn test_sine() {
        assert!(close(Waveform::Sine.sample(0.0), 0.0));
        assert!(close(Waveform::Sine.sample(0.25), 1.0));
        assert!(close(Waveform::Sine.sample(0.75), -1.0));
    }

    #[test]
    fn test_sine8_sums_partials() {
        assert!(close(Waveform::Sine8.sample(0.0), 0.0));
        // At a quarter cycle harmonics 1,5 give +1 and 3,7 give -1
        assert!(close(Waveform::Sine8.sample(0.25), 0.0));
        let x = 0.1;
        let expected: f64 = (1..=8).map(|k| (2.0 * PI * x * k as f64).sin()).sum::<f64>() / 2.0;
        assert!(close(Waveform::Sine8.sample(x), expected));
    }

    #[test]
    fn test_square() {
        assert_eq!(Waveform::Square.sample(0.0), -1.0);
        assert_eq!(Waveform::Square.sample(0.25), -1.0);
        assert_eq!(Waveform::Square.sample(0.5), 1.0);
        assert_eq!(Waveform::Square.sample(0.75), 1.0);
        assert_eq!(Waveform::Square.sample(1.0), -1.0);
    }

    #[test]
    fn test_saw() {
        assert_eq!(Waveform::Saw.sample(0.0), -1.0);
        assert_eq!(Waveform::Saw.sample(0.25), -0.5);
        assert_eq!(Waveform::Saw.sample(0.5), 0.0);
        assert_eq!(Waveform::Saw.sample(1.75), 0.5);
    }

    #[test]
    fn test_frequency_reference() {
        assert!(close(frequency(69.0), 880.0));
        assert!(close(frequency(57.0), 440.0));
        assert!(close(frequency(81.0), 1760.0));
    }

    #[test]
    fn test_detune_offsets_alternate() {
        let mut osc = OscillatorConfig::new(Waveform::Sine);
        osc.detune_voices = 2;
        osc.detune_amount = 0.4;

        assert_eq!(osc.detune_offset(0), 0.0);
        assert!(close(osc.detune_offset(1), 0.2));
        assert!(close(osc.detune_offset(2), -0.4));

        osc.detune_voices = 4;
        assert!(close(osc.detune_offset(3), 0.3));
        assert!(close(osc.detune_offset(4), -0.4));
    }

    #[test]
    fn test_randomize_phases() {
        let mut osc = OscillatorConfig::new(Waveform::Saw);
        osc.detune_voices = 3;
        osc.phase_randomization = 0.5;
        let mut rng = SmallRng::seed_from_u64(7);
        osc.randomize_phases(&mut rng);

        for offset in &osc.detune_phase_offsets[..3] {
            assert!((0.0..PI).contains(offset));
        }
        assert!(osc.detune_phase_offsets[3..].iter().all(|&o| o == 0.0));
        assert_eq!(osc.phase_offset(0), 0.0);
        assert_eq!(osc.phase_offset(2), osc.detune_phase_offsets[1]);

        // Same seed, same offsets
        let mut again = osc.clone();
        again.randomize_phases(&mut SmallRng::seed_from_u64(7));
        assert_eq!(again.detune_phase_offsets, osc.detune_phase_offsets);
    }

    #[test]
    fn test_zero_randomization_keeps_phase() {
        let mut osc = OscillatorConfig::new(Waveform::Sine);
        osc.detune_voices = 4;
        osc.randomize_phases(&mut SmallRng::seed_from_u64(1));
        assert!(osc.detune_phase_offsets.iter().all(|&o| o == 0.0));
    }

    #[test]
    fn test_oscillate_sums_voices() {
        let sample_rate = 44100.0;
        let mut osc = OscillatorConfig::new(Waveform::Sine);
        let single = osc.oscillate(10, 60.0, sample_rate);
        let expected = (2.0 * PI * 10.0 * frequency(60.0) / sample_rate).sin();
        assert!(close(single, expected));

        // Zero spread stacks identical in-phase voices
        osc.detune_voices = 2;
        assert!(close(osc.oscillate(10, 60.0, sample_rate), 3.0 * expected));

        osc.transpose = 12.0;
        osc.detune_voices = 0;
        let octave_up = (2.0 * PI * 10.0 * frequency(72.0) / sample_rate).sin();
        assert!(close(osc.oscillate(10, 60.0, sample_rate), octave_up));
    }
}
