//! Error types
//!
//! Decoding and parameter loading each have their own error enum so callers
//! can tell a broken score apart from a broken patch.

use std::path::PathBuf;
use thiserror::Error;

/// The score file does not match the Standard MIDI File structure we accept
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("expected header tag \"MThd\", found {found:?}")]
    BadHeaderMagic { found: [u8; 4] },

    #[error("header length must be 6, found {length}")]
    BadHeaderLength { length: u32 },

    #[error("SMPTE time division 0x{division:04x} is not supported")]
    SmpteDivision { division: u16 },

    #[error("time division of zero ticks per quarter note")]
    ZeroDivision,

    #[error("track {track}: expected tag \"MTrk\", found {found:?}")]
    BadTrackMagic { track: usize, found: [u8; 4] },

    #[error("unexpected end of file at offset {offset} while reading {context}")]
    UnexpectedEof { offset: usize, context: &'static str },

    #[error("data byte at offset {offset} with no running status")]
    MissingRunningStatus { offset: usize },

    #[error("data byte 0x{value:02x} at offset {offset} has its high bit set")]
    DataByteOutOfRange { offset: usize, value: u8 },

    #[error("unknown status byte 0x{status:02x} at offset {offset}")]
    UnknownStatus { status: u8, offset: usize },
}

/// The patch (synth parameter) file is malformed or out of range
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("syntax error at line {line}: expected {expected}, found {found:?}")]
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("invalid value {value:?} for {parameter}")]
    InvalidValue { parameter: String, value: String },

    #[error("invalid waveform '{name}' specified in oscillator {oscillator}")]
    UnknownWaveform { oscillator: usize, name: String },

    #[error("oscillator {oscillator}: {count} detune voices exceeds the maximum of {max}")]
    TooManyDetuneVoices {
        oscillator: usize,
        count: usize,
        max: usize,
    },

    #[error("{parameter} = {value} is outside {range}")]
    OutOfRange {
        parameter: String,
        value: f64,
        range: &'static str,
    },

    #[error("at least one oscillator is required")]
    NoOscillators,

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Top-level error for the render pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed score: {0}")]
    Format(#[from] FormatError),

    #[error("bad parameters: {0}")]
    Parameter(#[from] ParameterError),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("render needs {samples} samples, more than the limit of {limit}")]
    RenderTooLong { samples: usize, limit: usize },

    #[error("memory allocation failed for a buffer of {samples} samples")]
    Allocation { samples: usize },

    #[error("WAV error on {path:?}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_messages() {
        let err = FormatError::UnknownStatus {
            status: 0xF4,
            offset: 31,
        };
        assert_eq!(err.to_string(), "unknown status byte 0xf4 at offset 31");

        let err = FormatError::SmpteDivision { division: 0xE728 };
        assert!(err.to_string().contains("0xe728"));
    }

    #[test]
    fn test_parameter_error_names_oscillator() {
        let err = ParameterError::UnknownWaveform {
            oscillator: 2,
            name: "triangle".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid waveform 'triangle' specified in oscillator 2"
        );
    }

    #[test]
    fn test_error_wraps_format() {
        let err: Error = FormatError::ZeroDivision.into();
        assert!(matches!(err, Error::Format(FormatError::ZeroDivision)));
        assert!(err.to_string().starts_with("malformed score"));
    }
}
