//! Builders for Standard MIDI File bytes used by the tests

/// Encode a variable-length quantity
pub fn vlq(mut value: u32) -> Vec<u8> {
    let mut out = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        out.push(((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }
    out.reverse();
    out
}

/// Raw header chunk; `length` is normally 6
pub fn header(length: u32, format: u16, tracks: u16, division: u16) -> Vec<u8> {
    let mut out = b"MThd".to_vec();
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&format.to_be_bytes());
    out.extend_from_slice(&tracks.to_be_bytes());
    out.extend_from_slice(&division.to_be_bytes());
    out
}

/// Accumulates `(delta, event)` pairs for one track chunk
#[derive(Default)]
pub struct TrackBuilder {
    events: Vec<u8>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta time followed by arbitrary event bytes
    pub fn raw(mut self, delta: u32, bytes: &[u8]) -> Self {
        self.events.extend(vlq(delta));
        self.events.extend_from_slice(bytes);
        self
    }

    pub fn note_on(self, delta: u32, channel: u8, pitch: u8, velocity: u8) -> Self {
        self.raw(delta, &[0x90 | channel, pitch, velocity])
    }

    pub fn note_off(self, delta: u32, channel: u8, pitch: u8) -> Self {
        self.raw(delta, &[0x80 | channel, pitch, 0x40])
    }

    pub fn tempo(self, delta: u32, us_per_quarter: u32) -> Self {
        let b = us_per_quarter.to_be_bytes();
        self.raw(delta, &[0xFF, 0x51, 0x03, b[1], b[2], b[3]])
    }

    pub fn end_of_track(self, delta: u32) -> Self {
        self.raw(delta, &[0xFF, 0x2F, 0x00])
    }

    /// `MTrk` chunk with its declared length
    pub fn build(self) -> Vec<u8> {
        let mut out = b"MTrk".to_vec();
        out.extend_from_slice(&(self.events.len() as u32).to_be_bytes());
        out.extend(self.events);
        out
    }
}

/// Format-1 file with a standard header and the given track chunks
pub fn file(division: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = header(6, 1, tracks.len() as u16, division);
    for track in tracks {
        out.extend_from_slice(track);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlq_encoding() {
        assert_eq!(vlq(0), vec![0x00]);
        assert_eq!(vlq(127), vec![0x7F]);
        assert_eq!(vlq(128), vec![0x81, 0x00]);
        assert_eq!(vlq(480), vec![0x83, 0x60]);
    }
}
