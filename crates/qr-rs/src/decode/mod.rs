//! Decoder entry point and the `DecodeEvent` sink the ambient (image/CLI)
//! layers can forward into their own logging, per spec §9 "in-place file
//! I/O for tracing — not part of the core". The core never opens a file or
//! logs directly; it only calls into whatever sink the caller passed.

pub mod binarize;
pub mod finder;
pub mod reader;
pub mod transform;

pub use binarize::PixelFormat;

use crate::ec_level::EcLevel;
use crate::error::DecodeError;
use crate::version::Version;

/// One successfully decoded symbol.
#[derive(Debug, Clone)]
pub struct DecodedSymbol {
    pub payload: Vec<u8>,
    pub version: Version,
    pub level: EcLevel,
    pub eci_assignment: Option<u32>,
}

/// Structured events a caller can observe during a `decode()` call without
/// the core taking a logging dependency of its own.
pub trait DecodeEvent {
    /// The whole image was abandoned before any corner was attempted
    /// (currently only `DecodeError::NoFinders`).
    fn image_failed(&mut self, _err: DecodeError) {}
    fn corner_attempted(&mut self) {}
    fn corner_failed(&mut self, _err: DecodeError) {}
    fn symbol_decoded(&mut self, _symbol: &DecodedSymbol) {}
}

/// A sink that does nothing; used by `decode()` so callers who don't care
/// about diagnostics don't have to provide one.
struct NullEvents;
impl DecodeEvent for NullEvents {}

/// Binarizes `pixels` (a `width x height` image with the given row
/// `stride` in bytes, in `format`), locates finder patterns, assembles
/// corner triples, and attempts the full per-corner decode state machine on
/// each. Returns every symbol recovered, in corner-scan order; an empty
/// list means no symbol was found or none survived decoding.
pub fn decode(
    pixels: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
) -> Vec<DecodedSymbol> {
    decode_with_events(pixels, width, height, stride, format, &mut NullEvents)
}

/// Same as `decode()`, but reports structured progress events to `sink` as
/// it goes — the hook the image/CLI adapter layers use to forward into
/// their own logging.
pub fn decode_with_events(
    pixels: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    sink: &mut dyn DecodeEvent,
) -> Vec<DecodedSymbol> {
    let img = match binarize::binarize(pixels, width, height, stride, format) {
        Some(img) => img,
        None => return Vec::new(),
    };

    let finders = finder::locate_finders(&img);
    if finders.is_empty() {
        sink.image_failed(DecodeError::NoFinders);
        return Vec::new();
    }

    let corners = finder::assemble_corners(&finders);
    let mut results = Vec::new();
    for corner in &corners {
        sink.corner_attempted();
        match reader::decode_corner(&img, corner) {
            Ok(symbol) => {
                sink.symbol_decoded(&symbol);
                results.push(symbol);
            }
            Err(err) => sink.corner_failed(err),
        }
    }
    results
}
