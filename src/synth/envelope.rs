//! ADSR envelope
//!
//! Attack-Decay-Sustain-Release amplitude shaping laid out over absolute
//! sample indices. Every note uses the same timing; only the peak (the
//! oscillator gain) changes between oscillators.

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
}

/// A stage placed on the output timeline, `start..end` in samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpan {
    pub stage: EnvelopeStage,
    pub start: usize,
    pub end: usize,
}

impl StageSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Stage lengths in samples plus the sustain level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeTiming {
    pub attack: usize,
    pub decay: usize,
    /// Absolute level, in the same units as the oscillator gain
    pub sustain_level: f64,
    pub release: usize,
}

impl EnvelopeTiming {
    /// Convert stage times in seconds, truncating to whole samples
    pub fn from_seconds(
        attack: f64,
        decay: f64,
        sustain_level: f64,
        release: f64,
        sample_rate: u32,
    ) -> Self {
        let rate = f64::from(sample_rate);
        Self {
            attack: (attack * rate) as usize,
            decay: (decay * rate) as usize,
            sustain_level,
            release: (release * rate) as usize,
        }
    }

    /// Place the four stages of a note starting at `start` whose key is
    /// released at `nominal_end`.
    ///
    /// Sustain is empty when attack and decay outlast the note; release
    /// always begins at `nominal_end`.
    pub fn spans(&self, start: usize, nominal_end: usize) -> [StageSpan; 4] {
        let attack_end = start + self.attack;
        let decay_end = attack_end + self.decay;
        [
            StageSpan {
                stage: EnvelopeStage::Attack,
                start,
                end: attack_end,
            },
            StageSpan {
                stage: EnvelopeStage::Decay,
                start: attack_end,
                end: decay_end,
            },
            StageSpan {
                stage: EnvelopeStage::Sustain,
                start: decay_end,
                end: nominal_end.max(decay_end),
            },
            StageSpan {
                stage: EnvelopeStage::Release,
                start: nominal_end,
                end: nominal_end + self.release,
            },
        ]
    }

    /// Envelope value `step` samples into `stage` for an oscillator peaking
    /// at `gain`. A `step` equal to the stage length gives the stage's end
    /// value, which is also where the next stage starts.
    pub fn level(&self, stage: EnvelopeStage, step: usize, gain: f64) -> f64 {
        match stage {
            EnvelopeStage::Attack => ramp(0.0, gain, step, self.attack),
            EnvelopeStage::Decay => ramp(gain, self.sustain_level, step, self.decay),
            EnvelopeStage::Sustain => self.sustain_level,
            EnvelopeStage::Release => ramp(self.sustain_level, 0.0, step, self.release),
        }
    }
}

/// Linear ramp, exact at both ends
fn ramp(from: f64, to: f64, step: usize, len: usize) -> f64 {
    if len == 0 {
        return to;
    }
    let t = step as f64 / len as f64;
    from * (1.0 - t) + to * t
}
