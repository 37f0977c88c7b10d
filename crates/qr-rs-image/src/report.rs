//! A `serde`-describable record of a `decode()` call, for callers that want
//! to log or persist decode results as JSON rather than match on
//! `DecodedSymbol` directly.

use qr_rs::decode::{DecodedSymbol, PixelFormat};
use serde::Serialize;

use crate::{load_rgb24, QrImageError};
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub text: String,
    pub version: u8,
    pub level: String,
    pub eci_assignment: Option<u32>,
}

impl From<&DecodedSymbol> for SymbolReport {
    fn from(symbol: &DecodedSymbol) -> Self {
        Self {
            text: String::from_utf8_lossy(&symbol.payload).into_owned(),
            version: symbol.version.value(),
            level: format!("{:?}", symbol.level),
            eci_assignment: symbol.eci_assignment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    pub symbols: Vec<SymbolReport>,
}

impl DecodeReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Loads `path`, decodes every symbol in it, and summarizes the result as a
/// `DecodeReport`.
pub fn decode_report(path: &Path) -> Result<DecodeReport, QrImageError> {
    let grid = load_rgb24(path)?;
    let symbols = qr_rs::decode::decode(&grid.pixels, grid.width, grid.height, grid.stride, PixelFormat::Rgb24);
    Ok(DecodeReport {
        symbols: symbols.iter().map(SymbolReport::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_serializes_to_an_empty_list() {
        let report = DecodeReport { symbols: Vec::new() };
        assert_eq!(report.to_json().unwrap(), r#"{"symbols":[]}"#);
    }
}
