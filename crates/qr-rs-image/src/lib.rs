//! Raster adapter for `qr-rs`: renders a `Symbol` to a PNG byte buffer, and
//! loads an image file into the raw RGB24 pixel grid the decoder wants.
//! The core codec crate never touches a file or an image format; this
//! crate is the only place that does.

mod error;
mod report;

pub use error::QrImageError;
pub use report::{decode_report, DecodeReport, SymbolReport};

use image::imageops::resize;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qr_rs::Symbol;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Render knobs: the pixel width of one module, and the number of
/// quiet-zone modules of light border surrounding the symbol.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub module_size: u32,
    pub quiet_zone: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_size: 8,
            quiet_zone: 4,
        }
    }
}

/// Rasterizes `symbol` into a grayscale image at 1 pixel per module, then
/// nearest-neighbor upscales to `module_size` pixels per module and pads
/// with `quiet_zone` modules of light border on every side.
pub fn render(symbol: &Symbol, options: RenderOptions) -> GrayImage {
    let size = symbol.size();
    let base: GrayImage = GrayImage::from_fn(size as u32, size as u32, |x, y| {
        if symbol.get_module(x as i32, y as i32) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });

    let scaled = resize(
        &base,
        size as u32 * options.module_size,
        size as u32 * options.module_size,
        image::imageops::FilterType::Nearest,
    );

    let quiet_px = options.quiet_zone * options.module_size;
    let out_side = scaled.width() + 2 * quiet_px;
    debug!(size, out_side, "rendered symbol to raster");
    GrayImage::from_fn(out_side, out_side, |x, y| {
        if x < quiet_px || y < quiet_px || x >= quiet_px + scaled.width() || y >= quiet_px + scaled.height() {
            Luma([255u8])
        } else {
            *scaled.get_pixel(x - quiet_px, y - quiet_px)
        }
    })
}

/// Same as `render`, but encodes straight to a PNG byte buffer.
pub fn render_png(symbol: &Symbol, options: RenderOptions) -> Result<Vec<u8>, QrImageError> {
    let img = render(symbol, options);
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img).write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Same as `render_png`, but writes directly to `path`.
pub fn save_png(symbol: &Symbol, options: RenderOptions, path: &Path) -> Result<(), QrImageError> {
    let img = render(symbol, options);
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// The pixel buffer shape `qr_rs::decode::decode` expects: RGB24, row-major,
/// `stride` bytes per row (equal to `width * 3` for a tightly packed image).
pub struct PixelGrid {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

/// Loads any image format the `image` crate supports and converts it to a
/// tightly packed RGB24 pixel grid.
pub fn load_rgb24(path: &Path) -> Result<PixelGrid, QrImageError> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    let stride = width as usize * 3;
    debug!(?path, width, height, "loaded image for decode");
    Ok(PixelGrid {
        pixels: img.into_raw(),
        width: width as usize,
        height: height as usize,
        stride,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qr_rs::EcLevel;

    #[test]
    fn render_pads_quiet_zone_on_every_side() {
        let symbol = Symbol::encode_text("HELLO", EcLevel::Medium).unwrap();
        let options = RenderOptions {
            module_size: 2,
            quiet_zone: 4,
        };
        let img = render(&symbol, options);
        let expected = (symbol.size() as u32 + 8) * 2;
        assert_eq!(img.width(), expected);
        assert_eq!(img.height(), expected);
        assert_eq!(img.get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn render_png_produces_a_valid_png_signature() {
        let symbol = Symbol::encode_text("A", EcLevel::Low).unwrap();
        let bytes = render_png(&symbol, RenderOptions::default()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
