use crate::bit_reader::PrematureEnd;
use crate::rs::RsError;

/// The error type when the supplied data does not fit any QR Code version.
///
/// Ways to handle this exception include:
///
/// - Decrease the error correction level if it was greater than `EcLevel::Low`.
/// - If `Symbol::encode_segments_advanced()` was called, then increase the maxversion
///   argument if it was less than `Version::MAX`. (This advice does not apply to the
///   other factory functions because they search all versions up to `Version::MAX`.)
/// - Split the text data into better or optimal segments in order to reduce the number of bits required.
/// - Change the text or binary data to be shorter.
/// - Change the text to fit the character set of a particular segment mode (e.g. alphanumeric).
/// - Propagate the error upward to the caller/user.
#[derive(Debug, Clone)]
pub enum QrError {
    SegmentTooLong,
    /// No version up to `Version::MAX` has enough capacity for the segments at the
    /// requested error correction level.
    InputTooLarge,
}

impl std::error::Error for QrError {}

impl std::fmt::Display for QrError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::SegmentTooLong => write!(f, "Segment too long"),
            Self::InputTooLarge => write!(f, "Data too long for any version at this EC level"),
        }
    }
}

/// Per-corner decode failure. Every variant is recoverable at the scan-loop
/// level: the loop logs it and moves on to the next finder triple. None of
/// these ever escape `decode()` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    NoFinders,
    NoCornerPasses,
    FormatInfoUnreadable,
    VersionInfoUnreadable,
    FixedModulesCorrupt,
    Uncorrectable,
    PrematureEndOfBits,
    UnsupportedMode,
}

impl std::error::Error for DecodeError {}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = match self {
            Self::NoFinders => "no finder patterns located",
            Self::NoCornerPasses => "no finder triple passed corner assembly checks",
            Self::FormatInfoUnreadable => "format info unreadable past BCH correction",
            Self::VersionInfoUnreadable => "version info unreadable past BCH correction",
            Self::FixedModulesCorrupt => "too many fixed modules disagree with their known value",
            Self::Uncorrectable => "a codeword block has more errors than its EC length can fix",
            Self::PrematureEndOfBits => "bit stream ended before a segment finished parsing",
            Self::UnsupportedMode => "segment used an unsupported or reserved mode indicator",
        };
        f.write_str(msg)
    }
}

impl From<PrematureEnd> for DecodeError {
    fn from(_: PrematureEnd) -> Self {
        Self::PrematureEndOfBits
    }
}

impl From<RsError> for DecodeError {
    fn from(_: RsError) -> Self {
        Self::Uncorrectable
    }
}
