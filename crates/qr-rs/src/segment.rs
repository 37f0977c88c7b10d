use crate::bit_buffer::BitBuffer;
use crate::bit_reader::BitReader;
use crate::error::DecodeError;
use crate::segment_mode::SegmentMode;
use crate::version::Version;
use crate::ALPHANUMERIC_CHARSET;

/// A segment of character/binary/control data in a QR Code symbol.
///
/// Instances of this struct are immutable.
///
/// The mid-level way to create a segment is to take the payload data
/// and call a static factory function such as `Segment::make_numeric()`.
/// The low-level way to create a segment is to custom-make the bit buffer
/// and call the `Segment::new()` constructor with appropriate values.
///
/// This segment struct imposes no length restrictions, but QR Codes have restrictions.
/// Even in the most favorable conditions, a QR Code can only hold 7089 characters of data.
/// Any segment longer than this is meaningless for the purpose of generating QR Codes.
#[derive(Clone, PartialEq, Eq)]
pub struct Segment {
    // The mode indicator of this segment. Accessed through mode().
    pub mode: SegmentMode,

    // The length of this segment's unencoded data. Measured in characters for
    // numeric/alphanumeric/kanji mode, bytes for byte mode, and 0 for ECI mode.
    // Not the same as the data's bit length. Accessed through num_chars().
    pub numchars: usize,

    // The data bits of this segment. Accessed through data().
    pub data: Vec<bool>,
}

impl Segment {
    /*---- Static factory functions (mid level) ----*/

    /// Returns a segment representing the given binary data encoded in byte mode.
    ///
    /// All input byte slices are acceptable.
    ///
    /// Any text string can be converted to UTF-8 bytes and encoded as a byte mode segment.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(data.len() * 8));
        for &b in data {
            bb.append_bits(u32::from(b), 8);
        }
        Segment::new(SegmentMode::Byte, data.len(), bb.0)
    }

    /// Returns a segment representing the given string of decimal digits encoded in numeric mode.
    ///
    /// Panics if the string contains non-digit characters.
    pub fn make_numeric(text: &str) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(text.len() * 3 + (text.len() + 2) / 3));
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for b in text.bytes() {
            assert!(
                (b'0'..=b'9').contains(&b),
                "String contains non-numeric characters"
            );
            accumdata = accumdata * 10 + u32::from(b - b'0');
            accumcount += 1;
            if accumcount == 3 {
                bb.append_bits(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            // 1 or 2 digits remaining
            bb.append_bits(accumdata, accumcount * 3 + 1);
        }
        Segment::new(SegmentMode::Numeric, text.len(), bb.0)
    }

    /// Returns a segment representing the given text string encoded in alphanumeric mode.
    ///
    /// The characters allowed are: 0 to 9, A to Z (uppercase only), space,
    /// dollar, percent, asterisk, plus, hyphen, period, slash, colon.
    ///
    /// Panics if the string contains non-encodable characters.
    pub fn make_alphanumeric(text: &str) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(text.len() * 5 + (text.len() + 1) / 2));
        let mut accumdata: u32 = 0;
        let mut accumcount: u32 = 0;
        for c in text.chars() {
            let i: usize = ALPHANUMERIC_CHARSET
                .find(c)
                .expect("String contains unencodable characters in alphanumeric mode");
            accumdata = accumdata * 45 + u32::try_from(i).unwrap();
            accumcount += 1;
            if accumcount == 2 {
                bb.append_bits(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            // 1 character remaining
            bb.append_bits(accumdata, 6);
        }
        Segment::new(SegmentMode::Alphanumeric, text.len(), bb.0)
    }

    /// Returns a list of zero or more segments to represent the given Unicode text string.
    ///
    /// The result may use various segment modes and switch
    /// modes to optimize the length of the bit stream.
    pub fn make_segments(text: &str) -> Vec<Self> {
        if text.is_empty() {
            vec![]
        } else {
            vec![if Segment::is_numeric(text) {
                Segment::make_numeric(text)
            } else if Segment::is_alphanumeric(text) {
                Segment::make_alphanumeric(text)
            } else {
                Segment::make_bytes(text.as_bytes())
            }]
        }
    }

    /// Returns a segment representing an Extended Channel Interpretation
    /// (ECI) designator with the given assignment value.
    pub fn make_eci(assignval: u32) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(24));
        if assignval < (1 << 7) {
            bb.append_bits(assignval, 8);
        } else if assignval < (1 << 14) {
            bb.append_bits(0b10, 2);
            bb.append_bits(assignval, 14);
        } else if assignval < 1_000_000 {
            bb.append_bits(0b110, 3);
            bb.append_bits(assignval, 21);
        } else {
            panic!("ECI assignment value out of range");
        }
        Segment::new(SegmentMode::Eci, 0, bb.0)
    }

    /*---- Constructor (low level) ----*/

    /// Creates a new QR Code segment with the given attributes and data.
    ///
    /// The character count (numchars) must agree with the mode and
    /// the bit buffer length, but the constraint isn't checked.
    pub fn new(mode: SegmentMode, numchars: usize, data: Vec<bool>) -> Self {
        Self {
            mode,
            numchars,
            data,
        }
    }

    /*---- Instance field getters ----*/

    /// Returns the mode indicator of this segment.
    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    /// Returns the character count field of this segment.
    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Returns the data bits of this segment.
    pub fn data(&self) -> &Vec<bool> {
        &self.data
    }

    /*---- Other static functions ----*/

    // Calculates and returns the number of bits needed to encode the given
    // segments at the given version. The result is None if a segment has too many
    // characters to fit its length field, or the total bits exceeds usize::MAX.
    pub fn get_total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            // ccbits can be as large as 16, but usize can be as small as 16
            if let Some(limit) = 1usize.checked_shl(ccbits.into()) {
                if seg.numchars >= limit {
                    return None; // The segment's length doesn't fit the field's bit width
                }
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len())?;
        }
        Some(result)
    }

    /// Tests whether the given string can be encoded as a segment in numeric mode.
    ///
    /// A string is encodable iff each character is in the range 0 to 9.
    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| ('0'..='9').contains(&c))
    }

    /// Tests whether the given string can be encoded as a segment in alphanumeric mode.
    ///
    /// A string is encodable iff each character is in the following set: 0 to 9, A to Z
    /// (uppercase only), space, dollar, percent, asterisk, plus, hyphen, period, slash, colon.
    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }

    /*---- Decode-side parsing ----*/

    /// Reads segments out of a de-interleaved, error-corrected codeword array
    /// until a terminator or the end of the stream, concatenating their
    /// decoded text/binary payload into one byte vector. Returns the last
    /// ECI assignment seen, if any (a symbol carries at most one in practice,
    /// but nothing here enforces that beyond "last one wins").
    ///
    /// Kanji and any mode indicator outside {Numeric, Alphanumeric, Byte, Eci}
    /// surface as `DecodeError::UnsupportedMode`, matching the encoder's
    /// Non-goal of never emitting them.
    pub fn parse(data: &[u8], version: Version) -> Result<(Vec<u8>, Option<u32>), DecodeError> {
        let mut reader = BitReader::new(data);
        let mut out = Vec::new();
        let mut eci = None;

        loop {
            if reader.remaining() < 4 {
                break;
            }
            let mode_bits = reader.read(4)?;
            if mode_bits == 0 {
                break; // terminator
            }
            let mode = SegmentMode::from_bits(mode_bits).ok_or(DecodeError::UnsupportedMode)?;
            if mode == SegmentMode::Kanji {
                return Err(DecodeError::UnsupportedMode);
            }

            match mode {
                SegmentMode::Eci => eci = Some(Self::parse_eci(&mut reader)?),
                SegmentMode::Numeric => Self::parse_numeric(&mut reader, version, &mut out)?,
                SegmentMode::Alphanumeric => {
                    Self::parse_alphanumeric(&mut reader, version, &mut out)?
                }
                SegmentMode::Byte => Self::parse_byte(&mut reader, version, &mut out)?,
                SegmentMode::Kanji => unreachable!("rejected above"),
            }
        }
        Ok((out, eci))
    }

    fn parse_eci(reader: &mut BitReader) -> Result<u32, DecodeError> {
        let first = reader.read(8)?;
        if first & 0x80 == 0 {
            Ok(first)
        } else if first & 0xC0 == 0x80 {
            let rest = reader.read(8)?;
            Ok(((first & 0x3F) << 8) | rest)
        } else if first & 0xE0 == 0xC0 {
            let rest = reader.read(16)?;
            Ok(((first & 0x1F) << 16) | rest)
        } else {
            Err(DecodeError::UnsupportedMode)
        }
    }

    fn parse_numeric(
        reader: &mut BitReader,
        version: Version,
        out: &mut Vec<u8>,
    ) -> Result<(), DecodeError> {
        let ccbits = SegmentMode::Numeric.num_char_count_bits(version);
        let mut remaining = reader.read(ccbits)? as usize;
        while remaining >= 3 {
            let v = reader.read(10)?;
            out.push(b'0' + (v / 100) as u8);
            out.push(b'0' + (v / 10 % 10) as u8);
            out.push(b'0' + (v % 10) as u8);
            remaining -= 3;
        }
        if remaining == 2 {
            let v = reader.read(7)?;
            out.push(b'0' + (v / 10) as u8);
            out.push(b'0' + (v % 10) as u8);
        } else if remaining == 1 {
            let v = reader.read(4)?;
            out.push(b'0' + v as u8);
        }
        Ok(())
    }

    fn parse_alphanumeric(
        reader: &mut BitReader,
        version: Version,
        out: &mut Vec<u8>,
    ) -> Result<(), DecodeError> {
        let charset = ALPHANUMERIC_CHARSET.as_bytes();
        let ccbits = SegmentMode::Alphanumeric.num_char_count_bits(version);
        let mut remaining = reader.read(ccbits)? as usize;
        while remaining >= 2 {
            let v = reader.read(11)? as usize;
            if v >= 45 * 45 {
                return Err(DecodeError::UnsupportedMode);
            }
            out.push(charset[v / 45]);
            out.push(charset[v % 45]);
            remaining -= 2;
        }
        if remaining == 1 {
            let v = reader.read(6)? as usize;
            if v >= 45 {
                return Err(DecodeError::UnsupportedMode);
            }
            out.push(charset[v]);
        }
        Ok(())
    }

    fn parse_byte(
        reader: &mut BitReader,
        version: Version,
        out: &mut Vec<u8>,
    ) -> Result<(), DecodeError> {
        let ccbits = SegmentMode::Byte.num_char_count_bits(version);
        let count = reader.read(ccbits)?;
        for _ in 0..count {
            out.push(reader.read(8)? as u8);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_buffer::BitBuffer;

    fn pack(seg: &Segment, version: Version) -> Vec<u8> {
        let mut bb = BitBuffer(Vec::new());
        bb.append_bits(seg.mode().mode_bits(), 4);
        bb.append_bits(
            seg.num_chars() as u32,
            seg.mode().num_char_count_bits(version),
        );
        for &bit in seg.data() {
            bb.append_bits(u32::from(bit), 1);
        }
        let mut bytes = vec![0u8; (bb.0.len() + 7) / 8];
        for (i, &bit) in bb.0.iter().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        bytes
    }

    #[test]
    fn parses_alphanumeric_segment() {
        let version = Version::new(1);
        let seg = Segment::make_alphanumeric("HELLO WORLD");
        let bytes = pack(&seg, version);
        let (payload, eci) = Segment::parse(&bytes, version).unwrap();
        assert_eq!(payload, b"HELLO WORLD");
        assert_eq!(eci, None);
    }

    #[test]
    fn parses_numeric_segment_with_remainder() {
        let version = Version::new(1);
        let seg = Segment::make_numeric("12345");
        let bytes = pack(&seg, version);
        let (payload, _) = Segment::parse(&bytes, version).unwrap();
        assert_eq!(payload, b"12345");
    }

    #[test]
    fn parses_byte_segment() {
        let version = Version::new(1);
        let seg = Segment::make_bytes(&[0xC3, 0x9C]);
        let bytes = pack(&seg, version);
        let (payload, _) = Segment::parse(&bytes, version).unwrap();
        assert_eq!(payload, vec![0xC3, 0x9C]);
    }

    #[test]
    fn parses_eci_then_byte() {
        let version = Version::new(1);
        let eci_seg = Segment::make_eci(26);
        let byte_seg = Segment::make_bytes(&[0xC3, 0x9C]);
        let mut bb = BitBuffer(Vec::new());
        for seg in [&eci_seg, &byte_seg] {
            bb.append_bits(seg.mode().mode_bits(), 4);
            bb.append_bits(seg.num_chars() as u32, seg.mode().num_char_count_bits(version));
            for &bit in seg.data() {
                bb.append_bits(u32::from(bit), 1);
            }
        }
        let mut bytes = vec![0u8; (bb.0.len() + 7) / 8];
        for (i, &bit) in bb.0.iter().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        let (payload, eci) = Segment::parse(&bytes, version).unwrap();
        assert_eq!(payload, vec![0xC3, 0x9C]);
        assert_eq!(eci, Some(26));
    }

    #[test]
    fn rejects_kanji_mode() {
        let version = Version::new(1);
        let mut bb = BitBuffer(Vec::new());
        bb.append_bits(SegmentMode::Kanji.mode_bits(), 4);
        bb.append_bits(0, SegmentMode::Kanji.num_char_count_bits(version));
        let mut bytes = vec![0u8; (bb.0.len() + 7) / 8];
        for (i, &bit) in bb.0.iter().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        assert_eq!(
            Segment::parse(&bytes, version),
            Err(crate::error::DecodeError::UnsupportedMode)
        );
    }
}
