//! Encodes and decodes QR Code Model 2 symbols, conforming to ISO/IEC 18004.
//!
//! This crate is the codec core only: it works over `Vec<bool>`/`Vec<u8>`
//! and raw pixel buffers, independent of any image file format. The
//! `qr-rs-image` crate adapts it to PNG raster data.
//!
//! # Examples
//!
//! Simple encode:
//!
//! ```
//! use qr_rs::{encode, EcLevel, Payload};
//!
//! let symbol = encode(Payload::Text("HELLO WORLD"), EcLevel::Quartile, None).unwrap();
//! assert_eq!(symbol.version().value(), 1);
//! ```
//!
//! Decode a raw RGB24 buffer:
//!
//! ```no_run
//! use qr_rs::decode::{decode, PixelFormat};
//!
//! # let pixels: Vec<u8> = vec![];
//! # let (width, height, stride) = (0, 0, 0);
//! let symbols = decode(&pixels, width, height, stride, PixelFormat::Rgb24);
//! for symbol in &symbols {
//!     println!("{:?}", symbol.payload);
//! }
//! ```

// The set of all legal characters in alphanumeric mode,
// where each character value maps to the index in the string.
pub static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

mod bit_buffer;
mod bit_reader;
pub mod decode;
mod ec_level;
mod error;
mod finder_penalty;
mod gf256;
mod mask;
mod matrix;
mod rs;
mod segment;
mod segment_mode;
mod symbol;
mod tables;
mod version;

pub use ec_level::*;
pub use error::*;
pub use mask::*;
pub use rs::RsError;
pub use segment::*;
pub use segment_mode::*;
pub use symbol::*;
pub use tables::BlockLayout;
pub use version::*;

/// The payload an `encode()` call is given: either text (auto-segmented
/// into numeric/alphanumeric/byte runs) or an opaque byte string (always
/// byte mode). Mirrors the external interface's `payload: bytes | text`.
pub enum Payload<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

/// Encoder entry point. Selects the smallest version whose capacity fits
/// the segmented payload at `level`, optionally prefixed with an ECI
/// segment naming `eci`'s character-encoding assignment value.
pub fn encode(payload: Payload, level: EcLevel, eci: Option<u32>) -> Result<Symbol, QrError> {
    let mut segs = Vec::new();
    if let Some(assignval) = eci {
        segs.push(segment::Segment::make_eci(assignval));
    }
    match payload {
        Payload::Text(text) => segs.extend(segment::Segment::make_segments(text)),
        Payload::Bytes(data) => segs.push(segment::Segment::make_bytes(data)),
    }
    Symbol::encode_segments(&segs, level)
}

/*---- Constants and tables ----*/

// For use in get_penalty_score(), when evaluating which mask is best.
pub const PENALTY_N1: i32 = 3;
pub const PENALTY_N2: i32 = 3;
pub const PENALTY_N3: i32 = 40;
pub const PENALTY_N4: i32 = 10;

pub(crate) static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    // Version: (note that index 0 is for padding, and is set to an illegal value)
    //0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40    Error correction level
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

pub(crate) static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    // Version: (note that index 0 is for padding, and is set to an illegal value)
    //0, 1, 2, 3, 4, 5, 6, 7, 8, 9,10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40    Error correction level
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_text_round_trips() {
        let symbol = encode(Payload::Text("HELLO WORLD"), EcLevel::Quartile, None).unwrap();
        assert_eq!(symbol.version().value(), 1);
        assert_eq!(symbol.size(), 21);
    }

    #[test]
    fn encode_with_eci_sets_assignment_segment() {
        let symbol = encode(Payload::Bytes(&[0xC3, 0x9C]), EcLevel::Medium, Some(26)).unwrap();
        assert!(symbol.size() >= 21);
    }
}
