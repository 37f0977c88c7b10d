use image::ImageError;
use qr_rs::QrError;
use thiserror::Error;

/// Errors the raster adapter layer can produce, on top of whatever the
/// core codec reports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QrImageError {
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    #[error("qr encode error: {0}")]
    Encode(#[from] QrError),
}
