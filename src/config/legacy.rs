//! Plain-text patch format
//!
//! Six global `Key: value` lines followed by one or more blocks of six
//! oscillator lines. Blank lines are ignored, keys must appear in order.
//!
//! ```text
//! Master Volume: 0.3
//! Attack: 0.01
//! Decay: 0.1
//! Sustain: 0.6
//! Release: 0.3
//! Global Transpose: 0
//!
//! Volume: 1
//! Transpose: 0
//! Waveform: saw
//! Detune Voices: 4
//! Detune Amount: 0.2
//! Phase Randomization: 1
//! ```

use std::str::FromStr;

use super::schema::{AudioConfig, EnvelopeConfig, MasterConfig, OscillatorSettings, PatchConfig};
use crate::error::ParameterError;

const GLOBAL_KEYS: [&str; 6] = [
    "Master Volume",
    "Attack",
    "Decay",
    "Sustain",
    "Release",
    "Global Transpose",
];

const OSCILLATOR_KEYS: [&str; 6] = [
    "Volume",
    "Transpose",
    "Waveform",
    "Detune Voices",
    "Detune Amount",
    "Phase Randomization",
];

/// Parse the text format into a patch. Validation is left to the caller.
pub fn parse(text: &str) -> Result<PatchConfig, ParameterError> {
    let mut lines = Lines::new(text);

    let mut globals = [0.0; 6];
    for (i, value) in globals.iter_mut().enumerate() {
        let param = Param::global(i);
        *value = param.parse(lines.value_for(&param)?)?;
    }
    let [gain, attack, decay, sustain, release, transpose] = globals;

    let mut oscillators = Vec::new();
    while lines.has_more() {
        let n = oscillators.len() + 1;
        let mut block = Vec::with_capacity(OSCILLATOR_KEYS.len());
        for i in 0..OSCILLATOR_KEYS.len() {
            let param = Param::oscillator(i, n);
            let value = lines.value_for(&param)?;
            block.push((param, value));
        }
        let number = |i: usize| -> Result<f64, ParameterError> { block[i].0.parse(block[i].1) };

        oscillators.push(OscillatorSettings {
            gain: number(0)?,
            transpose: number(1)?,
            waveform: block[2].1.to_string(),
            detune_voices: block[3].0.parse(block[3].1)?,
            detune_amount: number(4)?,
            phase_randomization: number(5)?,
        });
    }

    if oscillators.is_empty() {
        return Err(ParameterError::NoOscillators);
    }

    Ok(PatchConfig {
        audio: AudioConfig::default(),
        master: MasterConfig { gain, transpose },
        envelope: EnvelopeConfig {
            attack,
            decay,
            sustain,
            release,
        },
        oscillators,
    })
}

/// A key we expect next, with a human description for errors
#[derive(Debug)]
struct Param {
    key: &'static str,
    description: String,
}

impl Param {
    fn global(index: usize) -> Self {
        Self {
            key: GLOBAL_KEYS[index],
            description: format!("global parameter {} ({})", index + 1, GLOBAL_KEYS[index]),
        }
    }

    fn oscillator(index: usize, oscillator: usize) -> Self {
        Self {
            key: OSCILLATOR_KEYS[index],
            description: format!(
                "parameter {} ({}) of oscillator {}",
                index + 1,
                OSCILLATOR_KEYS[index],
                oscillator
            ),
        }
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ParameterError> {
        value.parse().map_err(|_| ParameterError::InvalidValue {
            parameter: self.description.clone(),
            value: value.to_string(),
        })
    }
}

/// Non-blank, trimmed lines with 1-based line numbers
struct Lines<'a> {
    lines: Vec<(usize, &'a str)>,
    next: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();
        Self { lines, next: 0 }
    }

    fn has_more(&self) -> bool {
        self.next < self.lines.len()
    }

    /// Consume the next line, which must be `<key>: <value>`
    fn value_for(&mut self, param: &Param) -> Result<&'a str, ParameterError> {
        let Some(&(line, text)) = self.lines.get(self.next) else {
            let last_line = self.lines.last().map_or(0, |&(line, _)| line);
            return Err(ParameterError::Syntax {
                line: last_line + 1,
                expected: param.description.clone(),
                found: "end of file".to_string(),
            });
        };
        self.next += 1;

        match text.split_once(':') {
            Some((key, value)) if key.trim() == param.key => Ok(value.trim()),
            _ => Err(ParameterError::Syntax {
                line,
                expected: param.description.clone(),
                found: text.to_string(),
            }),
        }
    }
}
