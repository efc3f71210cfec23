//! Score input
//!
//! Reads Standard MIDI Files into a flat, time-resolved note list.

mod decoder;
mod reader;

#[cfg(test)]
pub(crate) mod smf;

pub use decoder::{
    decode, latest_moment, DecodedScore, Decoder, NoteEvent, TempoMap, MAX_CHANNELS, MAX_NOTES,
    MAX_PITCHES,
};
pub use reader::ByteReader;
