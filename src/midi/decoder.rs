//! Standard MIDI File decoder
//!
//! Flattens every track into a single list of notes with absolute start
//! times and durations in seconds. Only note on/off and tempo changes carry
//! meaning; every other event is skipped by length.

use std::path::Path;

use super::reader::ByteReader;
use crate::error::{Error, FormatError, Result};

/// Default cap on the number of decoded notes
pub const MAX_NOTES: usize = 1024;

pub const MAX_CHANNELS: usize = 16;
pub const MAX_PITCHES: usize = 128;

/// 120 BPM
const DEFAULT_US_PER_QUARTER: u32 = 500_000;

const META: u8 = 0xFF;
const META_TEMPO: u8 = 0x51;
const SYSEX: u8 = 0xF0;
const SYSEX_ESCAPE: u8 = 0xF7;

/// A resolved note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// MIDI key number (0-127)
    pub pitch: u8,
    /// Note-on velocity (1-127)
    pub velocity: u8,
    /// Seconds from the start of the file
    pub start_time: f64,
    /// Seconds between note-on and note-off
    pub duration: f64,
}

impl NoteEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Latest `start + duration` over all notes, or 0 when there are none
pub fn latest_moment(notes: &[NoteEvent]) -> f64 {
    notes.iter().map(NoteEvent::end_time).fold(0.0, f64::max)
}

/// Current tempo and the file's tick resolution
#[derive(Debug, Clone)]
pub struct TempoMap {
    division: u16,
    bpm: f64,
    seconds_per_tick: f64,
}

impl TempoMap {
    /// Start at the default 120 BPM
    pub fn new(division: u16) -> Self {
        let mut map = Self {
            division,
            bpm: 0.0,
            seconds_per_tick: 0.0,
        };
        map.set_tempo(DEFAULT_US_PER_QUARTER);
        map
    }

    /// Apply a Set Tempo meta event
    pub fn set_tempo(&mut self, us_per_quarter: u32) {
        self.bpm = 60_000_000.0 / f64::from(us_per_quarter);
        self.seconds_per_tick = (60.0 / self.bpm) / f64::from(self.division);
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn division(&self) -> u16 {
        self.division
    }

    pub fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_tick
    }

    /// Convert an absolute tick count using the tempo currently in effect
    pub fn seconds_at(&self, ticks: u64) -> f64 {
        ticks as f64 * self.seconds_per_tick
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ActiveNote {
    sounding: bool,
    velocity: u8,
    start_time: f64,
}

/// Sounding notes keyed by (channel, pitch)
struct ActiveNotes {
    slots: [[ActiveNote; MAX_PITCHES]; MAX_CHANNELS],
}

impl ActiveNotes {
    fn new() -> Self {
        Self {
            slots: [[ActiveNote::default(); MAX_PITCHES]; MAX_CHANNELS],
        }
    }

    fn open(&mut self, channel: u8, pitch: u8, velocity: u8, start_time: f64) {
        self.slots[usize::from(channel)][usize::from(pitch)] = ActiveNote {
            sounding: true,
            velocity,
            start_time,
        };
    }

    /// Close a slot, returning what was sounding. Stray note-offs return `None`.
    fn close(&mut self, channel: u8, pitch: u8) -> Option<ActiveNote> {
        let slot = &mut self.slots[usize::from(channel)][usize::from(pitch)];
        if !slot.sounding {
            return None;
        }
        slot.sounding = false;
        Some(*slot)
    }
}

/// Result of decoding one file
#[derive(Debug, Clone)]
pub struct DecodedScore {
    /// Notes in the order their note-off was seen
    pub notes: Vec<NoteEvent>,
    pub format: u16,
    pub tracks: u16,
    pub division: u16,
    /// Notes completed after the capacity was reached
    pub dropped: usize,
}

impl DecodedScore {
    /// True when notes were discarded because of the capacity limit
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    pub fn latest_moment(&self) -> f64 {
        latest_moment(&self.notes)
    }
}

/// Event decoder with a fixed note capacity
#[derive(Debug, Clone)]
pub struct Decoder {
    capacity: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            capacity: MAX_NOTES,
        }
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that keeps at most `capacity` notes
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read and decode a file from disk
    pub fn decode_file(&self, path: &Path) -> Result<DecodedScore> {
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.decode(&bytes)?)
    }

    /// Decode an in-memory file
    pub fn decode(&self, data: &[u8]) -> Result<DecodedScore, FormatError> {
        let mut reader = ByteReader::new(data);

        let found = reader.read_tag("header tag")?;
        if &found != b"MThd" {
            return Err(FormatError::BadHeaderMagic { found });
        }
        let length = reader.read_be32("header length")?;
        if length != 6 {
            return Err(FormatError::BadHeaderLength { length });
        }
        let format = reader.read_be16("format")?;
        let tracks = reader.read_be16("track count")?;
        let division = reader.read_be16("time division")?;
        if division & 0x8000 != 0 {
            return Err(FormatError::SmpteDivision { division });
        }
        if division == 0 {
            return Err(FormatError::ZeroDivision);
        }
        log::debug!(
            "SMF format {} with {} tracks, {} ticks per quarter",
            format,
            tracks,
            division
        );

        let mut state = DecodeState {
            tempo: TempoMap::new(division),
            active: ActiveNotes::new(),
            notes: Vec::with_capacity(self.capacity.min(MAX_NOTES)),
            capacity: self.capacity,
            dropped: 0,
        };

        for track in 0..usize::from(tracks) {
            let found = reader.read_tag("track tag")?;
            if &found != b"MTrk" {
                return Err(FormatError::BadTrackMagic { track, found });
            }
            let length = reader.read_be32("track length")?;
            let track_end = reader.position() + length as usize;
            let before = state.notes.len();
            state.decode_track(&mut reader, track_end)?;
            log::debug!(
                "track {}: {} bytes, {} notes",
                track,
                length,
                state.notes.len() - before
            );
        }

        Ok(DecodedScore {
            notes: state.notes,
            format,
            tracks,
            division,
            dropped: state.dropped,
        })
    }
}

/// Decode a file with the default capacity
pub fn decode(data: &[u8]) -> Result<DecodedScore, FormatError> {
    Decoder::default().decode(data)
}

/// State shared by all tracks of one file
struct DecodeState {
    tempo: TempoMap,
    active: ActiveNotes,
    notes: Vec<NoteEvent>,
    capacity: usize,
    dropped: usize,
}

impl DecodeState {
    fn decode_track(
        &mut self,
        reader: &mut ByteReader,
        track_end: usize,
    ) -> Result<(), FormatError> {
        let mut ticks: u64 = 0;
        let mut running_status: Option<u8> = None;

        while reader.position() < track_end {
            ticks += u64::from(reader.read_vlq("delta time")?);

            let offset = reader.position();
            let status = match reader.peek_u8("status byte")? {
                // Data byte: leave it in the stream and reuse the last status
                byte if byte < 0x80 => {
                    running_status.ok_or(FormatError::MissingRunningStatus { offset })?
                }
                // Every status byte is remembered, meta and sysex included
                byte => {
                    reader.read_u8("status byte")?;
                    running_status = Some(byte);
                    byte
                }
            };

            let channel = status & 0x0F;
            match status {
                META => self.meta_event(reader)?,
                SYSEX | SYSEX_ESCAPE => {
                    let len = reader.read_vlq("sysex length")?;
                    reader.skip(len as usize, "sysex data")?;
                }
                0x80..=0x9F => {
                    let pitch = data_byte(reader, "note pitch")?;
                    let velocity = data_byte(reader, "note velocity")?;
                    let now = self.tempo.seconds_at(ticks);
                    if status & 0xF0 == 0x90 && velocity > 0 {
                        self.active.open(channel, pitch, velocity, now);
                    } else if let Some(slot) = self.active.close(channel, pitch) {
                        self.push(NoteEvent {
                            pitch,
                            velocity: slot.velocity,
                            start_time: slot.start_time,
                            duration: (now - slot.start_time).max(0.0),
                        });
                    }
                }
                // Aftertouch, control change, pitch bend
                0xA0..=0xBF | 0xE0..=0xEF => reader.skip(2, "channel event data")?,
                // Program change, channel pressure
                0xC0..=0xDF => reader.skip(1, "channel event data")?,
                _ => return Err(FormatError::UnknownStatus { status, offset }),
            }
        }

        Ok(())
    }

    fn meta_event(&mut self, reader: &mut ByteReader) -> Result<(), FormatError> {
        let meta_type = reader.read_u8("meta type")?;
        let len = reader.read_vlq("meta length")?;

        if meta_type == META_TEMPO && len == 3 {
            let us_per_quarter = reader.read_be24("tempo")?;
            self.tempo.set_tempo(us_per_quarter);
            log::debug!("tempo change to {:.3} BPM", self.tempo.bpm());
        } else {
            reader.skip(len as usize, "meta data")?;
        }
        Ok(())
    }

    fn push(&mut self, note: NoteEvent) {
        if self.notes.len() < self.capacity {
            self.notes.push(note);
        } else {
            self.dropped += 1;
        }
    }
}

fn data_byte(reader: &mut ByteReader, context: &'static str) -> Result<u8, FormatError> {
    let offset = reader.position();
    let value = reader.read_u8(context)?;
    if value >= 0x80 {
        return Err(FormatError::DataByteOutOfRange { offset, value });
    }
    Ok(value)
}
