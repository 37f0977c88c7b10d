//! RGB24 -> grayscale -> monochrome bit grid.

/// Pixel source format the decoder understands. Only RGB24 is named in the
/// external interface; kept as an enum (rather than a bare constant) so a
/// second format can be added without breaking callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb24,
}

/// A monochrome grid produced by global thresholding. `true` means dark.
pub struct BinaryImage {
    pub width: usize,
    pub height: usize,
    bits: Vec<bool>,
}

impl BinaryImage {
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get_signed(&self, x: i64, y: i64) -> bool {
        self.in_bounds(x, y) && self.get(x as usize, y as usize)
    }
}

/// Converts RGB24 pixels to grayscale and binarizes with a histogram
/// midpoint threshold. Fails if the image is a flat color (fewer than 2
/// populated histogram bins) since no threshold could separate it.
pub fn binarize(
    pixels: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
) -> Option<BinaryImage> {
    let PixelFormat::Rgb24 = format;
    let mut gray = vec![0u8; width * height];
    let mut histogram = [0u32; 256];
    for y in 0..height {
        let row_start = y * stride;
        for x in 0..width {
            let p = row_start + x * 3;
            let (r, g, b) = (
                u32::from(pixels[p]),
                u32::from(pixels[p + 1]),
                u32::from(pixels[p + 2]),
            );
            let value = ((30 * r + 59 * g + 11 * b) / 100) as u8;
            gray[y * width + x] = value;
            histogram[value as usize] += 1;
        }
    }

    let first = histogram.iter().position(|&c| c > 0)?;
    let last = histogram.iter().rposition(|&c| c > 0)?;
    if first == last {
        return None;
    }
    let cutoff = ((first + last + 1) / 2) as u8;

    let bits = gray.iter().map(|&v| v < cutoff).collect();
    Some(BinaryImage {
        width,
        height,
        bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Vec<u8> {
        let mut out = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            out.extend_from_slice(&rgb);
        }
        out
    }

    #[test]
    fn flat_image_fails_to_binarize() {
        let pixels = solid(4, 4, [128, 128, 128]);
        assert!(binarize(&pixels, 4, 4, 12, PixelFormat::Rgb24).is_none());
    }

    #[test]
    fn half_black_half_white_splits_down_the_middle() {
        let mut pixels = Vec::new();
        for y in 0..4 {
            for x in 0..4 {
                let _ = y;
                if x < 2 {
                    pixels.extend_from_slice(&[0, 0, 0]);
                } else {
                    pixels.extend_from_slice(&[255, 255, 255]);
                }
            }
        }
        let img = binarize(&pixels, 4, 4, 12, PixelFormat::Rgb24).unwrap();
        assert!(img.get(0, 0));
        assert!(!img.get(3, 0));
    }
}
