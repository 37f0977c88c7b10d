/// The error correction level used by a QR Code symbol.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum EcLevel {
    /// The QR Code can tolerate about  7% erroneous codewords.
    Low,
    /// The QR Code can tolerate about 15% erroneous codewords.
    Medium,
    /// The QR Code can tolerate about 25% erroneous codewords.
    Quartile,
    /// The QR Code can tolerate about 30% erroneous codewords.
    High,
}

impl EcLevel {
    pub const ALL: [EcLevel; 4] = [Self::Low, Self::Medium, Self::Quartile, Self::High];

    // Returns an unsigned 2-bit integer (in the range 0 to 3), used to index ECC tables.
    pub fn ordinal(self) -> usize {
        use EcLevel::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    // Returns the 2-bit field stamped into the format info. Note that this is
    // *not* the same as `ordinal()`: `format_bits() ^ 0b01 == ordinal()`.
    pub fn format_bits(self) -> u8 {
        use EcLevel::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }

    /// Inverse of `format_bits()`. Returns `None` for an out-of-range input.
    pub fn from_format_bits(bits: u8) -> Option<Self> {
        use EcLevel::*;
        match bits & 0b11 {
            1 => Some(Low),
            0 => Some(Medium),
            3 => Some(Quartile),
            2 => Some(High),
            _ => None,
        }
    }

    /// The fraction of codewords per block this level is guaranteed to recover, as a percent.
    pub fn recoverable_percent(self) -> u32 {
        use EcLevel::*;
        match self {
            Low => 7,
            Medium => 15,
            Quartile => 25,
            High => 30,
        }
    }
}
