//! Big-endian byte cursor for SMF chunks

use byteorder::{BigEndian, ByteOrder};

use crate::error::FormatError;

/// Reads fixed-width and variable-length values from an in-memory file.
///
/// Every read is bounds-checked; running off the end yields
/// [`FormatError::UnexpectedEof`] naming what was being read.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the file
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], FormatError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(FormatError::UnexpectedEof {
                offset: self.pos,
                context,
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&self, context: &'static str) -> Result<u8, FormatError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(FormatError::UnexpectedEof {
                offset: self.pos,
                context,
            })
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, FormatError> {
        Ok(self.take(1, context)?[0])
    }

    pub fn read_be16(&mut self, context: &'static str) -> Result<u16, FormatError> {
        Ok(BigEndian::read_u16(self.take(2, context)?))
    }

    pub fn read_be24(&mut self, context: &'static str) -> Result<u32, FormatError> {
        Ok(BigEndian::read_u24(self.take(3, context)?))
    }

    pub fn read_be32(&mut self, context: &'static str) -> Result<u32, FormatError> {
        Ok(BigEndian::read_u32(self.take(4, context)?))
    }

    /// Four-byte chunk tag such as `MThd`
    pub fn read_tag(&mut self, context: &'static str) -> Result<[u8; 4], FormatError> {
        let b = self.take(4, context)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// Variable-length quantity: 7 bits per byte, high bit flags continuation.
    ///
    /// Values wider than 32 bits wrap, which only happens on garbage input.
    pub fn read_vlq(&mut self, context: &'static str) -> Result<u32, FormatError> {
        let mut value: u32 = 0;
        loop {
            let byte = self.read_u8(context)?;
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
    }

    pub fn skip(&mut self, len: usize, context: &'static str) -> Result<(), FormatError> {
        self.take(len, context).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_reads() {
        let data = [0x00, 0x00, 0x00, 0x06, 0x01, 0xE0, 0x07, 0xA1, 0x20];
        let mut r = ByteReader::new(&data);

        assert_eq!(r.read_be32("len").unwrap(), 6);
        assert_eq!(r.read_be16("div").unwrap(), 0x01E0);
        assert_eq!(r.read_be24("tempo").unwrap(), 500_000);
        assert_eq!(r.position(), 9);
    }

    #[test]
    fn test_vlq() {
        let cases: &[(&[u8], u32)] = &[
            (&[0x00], 0),
            (&[0x7F], 127),
            (&[0x81, 0x00], 128),
            (&[0x83, 0x60], 480),
            (&[0xFF, 0xFF, 0x7F], 0x1F_FFFF),
            (&[0x81, 0x80, 0x80, 0x00], 0x20_0000),
        ];
        for (bytes, expected) in cases {
            let mut r = ByteReader::new(bytes);
            assert_eq!(r.read_vlq("delta").unwrap(), *expected);
            assert_eq!(r.position(), bytes.len());
        }
    }

    #[test]
    fn test_truncated_vlq() {
        let mut r = ByteReader::new(&[0x81, 0x80]);
        assert_eq!(
            r.read_vlq("delta time"),
            Err(FormatError::UnexpectedEof {
                offset: 2,
                context: "delta time"
            })
        );
    }

    #[test]
    fn test_skip_past_end() {
        let mut r = ByteReader::new(&[1, 2, 3]);
        r.skip(2, "meta").unwrap();
        assert!(r.skip(2, "meta").is_err());
        // Failed reads leave the cursor in place
        assert_eq!(r.position(), 2);
        assert_eq!(r.read_u8("x").unwrap(), 3);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut r = ByteReader::new(&[0x3C, 0x64]);
        assert_eq!(r.peek_u8("status").unwrap(), 0x3C);
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u8("pitch").unwrap(), 0x3C);
        assert_eq!(r.peek_u8("status").unwrap(), 0x64);
    }

    #[test]
    fn test_read_tag() {
        let mut r = ByteReader::new(b"MTrk");
        assert_eq!(&r.read_tag("track tag").unwrap(), b"MTrk");
        assert!(r.read_tag("track tag").is_err());
    }
}
