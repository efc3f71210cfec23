//! Offline render engine
//!
//! Renders every note through every oscillator of the bank and sums the
//! results into one mono buffer.

mod recorder;

pub use recorder::{to_pcm, write_wav, Recorder};

use crate::error::{Error, Result};
use crate::midi::{latest_moment, NoteEvent};
use crate::synth::{OscillatorConfig, SynthConfig};

/// Mono output samples, unclamped
pub type SampleBuffer = Vec<f64>;

/// Most samples a 16-bit mono WAV data chunk can hold
pub const MAX_RENDER_SAMPLES: usize = (u32::MAX / 2) as usize;

/// The additive synthesis engine
pub struct Engine {
    config: SynthConfig,
    max_samples: usize,
}

impl Engine {
    /// Create a new engine with the given configuration
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            max_samples: MAX_RENDER_SAMPLES,
        }
    }

    /// Refuse to render buffers longer than `max_samples`
    pub fn with_sample_limit(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn sample_limit(&self) -> usize {
        self.max_samples
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> f64 {
        f64::from(self.config.sample_rate)
    }

    /// Samples needed to hold every note plus the last release tail
    pub fn buffer_len(&self, notes: &[NoteEvent]) -> usize {
        ((self.sample_rate() * latest_moment(notes)) as usize)
            .saturating_add(self.config.envelope.release)
    }

    /// Render all notes into a freshly sized buffer
    pub fn render(&self, notes: &[NoteEvent]) -> Result<SampleBuffer> {
        let samples = self.buffer_len(notes);
        if samples > self.max_samples {
            return Err(Error::RenderTooLong {
                samples,
                limit: self.max_samples,
            });
        }

        let mut buffer = SampleBuffer::new();
        buffer
            .try_reserve_exact(samples)
            .map_err(|_| Error::Allocation { samples })?;
        buffer.resize(samples, 0.0);

        self.render_into(&mut buffer, notes);
        Ok(buffer)
    }

    /// Add all notes into an existing buffer
    pub fn render_into(&self, buffer: &mut [f64], notes: &[NoteEvent]) {
        log::debug!(
            "rendering {} notes x {} oscillators into {} samples",
            notes.len(),
            self.config.oscillators.len(),
            buffer.len()
        );
        for note in notes {
            for osc in &self.config.oscillators {
                self.render_note(buffer, note, osc);
            }
        }
    }

    /// Add one note through one oscillator. Samples past the end of
    /// `buffer` are dropped.
    pub fn render_note(&self, buffer: &mut [f64], note: &NoteEvent, osc: &OscillatorConfig) {
        let sample_rate = self.sample_rate();
        let start = (note.start_time * sample_rate) as usize;
        let nominal_end = (start as f64 + note.duration * sample_rate) as usize;
        let pitch = f64::from(note.pitch) + self.config.global_transpose;
        let gain = osc.gain * self.config.master_gain;
        let envelope = &self.config.envelope;

        // Phase runs continuously across all four stages
        let mut x: u64 = 0;
        for span in envelope.spans(start, nominal_end) {
            for (step, index) in (span.start..span.end).enumerate() {
                let phase = x;
                x += 1;
                let Some(sample) = buffer.get_mut(index) else {
                    continue;
                };
                let level = envelope.level(span.stage, step, osc.gain);
                *sample += osc.oscillate(phase, pitch, sample_rate) * level * gain;
            }
        }
    }
}
