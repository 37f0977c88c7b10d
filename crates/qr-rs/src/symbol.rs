//! Encode-only QR symbol construction. Replaces the teacher's monolithic
//! `QrCode::encode_segments_advanced` with the same algorithm split across
//! `tables`, `rs`, and `matrix`, and renamed to `Symbol` to leave `QrCode`
//! free for nothing in particular — just avoiding a clash with the
//! workspace-level `DecodedSymbol` the decoder returns.

use crate::ec_level::EcLevel;
use crate::error::QrError;
use crate::mask::Mask;
use crate::matrix::Matrix;
use crate::rs;
use crate::segment::Segment;
use crate::tables::BlockLayout;
use crate::bit_buffer::BitBuffer;
use crate::version::Version;

/// An immutable `D x D` grid of dark/light modules plus the version, EC
/// level, and mask that produced it.
#[derive(Clone)]
pub struct Symbol {
    version: Version,
    level: EcLevel,
    mask: Mask,
    matrix: Matrix,
}

impl Symbol {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn error_correction_level(&self) -> EcLevel {
        self.level
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    pub fn size(&self) -> i32 {
        self.matrix.size
    }

    /// Returns the color of the module at `(x, y)`; false (light) for any
    /// coordinate outside `0..size`.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let size = self.matrix.size;
        (0..size).contains(&x) && (0..size).contains(&y) && self.matrix.get_module(x, y)
    }

    /// Encodes a Unicode text string, auto-segmenting into numeric,
    /// alphanumeric, and byte runs, and auto-selecting the smallest version.
    pub fn encode_text(text: &str, level: EcLevel) -> Result<Self, QrError> {
        let segs = Segment::make_segments(text);
        Self::encode_segments(&segs, level)
    }

    /// Encodes arbitrary binary data as a single byte-mode segment.
    pub fn encode_binary(data: &[u8], level: EcLevel) -> Result<Self, QrError> {
        let segs = vec![Segment::make_bytes(data)];
        Self::encode_segments(&segs, level)
    }

    /// Encodes a list of pre-built segments, auto-selecting version and mask
    /// and allowing EC level boosting.
    pub fn encode_segments(segs: &[Segment], level: EcLevel) -> Result<Self, QrError> {
        Self::encode_segments_advanced(segs, level, Version::MIN, Version::MAX, None, true)
    }

    /// Full control: version range, explicit mask (`None` = auto-select by
    /// penalty), and whether to boost the EC level when a higher level still
    /// fits the chosen version.
    pub fn encode_segments_advanced(
        segs: &[Segment],
        mut level: EcLevel,
        minversion: Version,
        maxversion: Version,
        mask: Option<Mask>,
        boostecl: bool,
    ) -> Result<Self, QrError> {
        assert!(minversion.value() <= maxversion.value());

        let mut chosen: Option<(Version, usize)> = None;
        for v in minversion.value()..=maxversion.value() {
            let version = Version::new(v);
            let layout = BlockLayout::for_version_level(version, level);
            let cap_bits = layout.num_data_codewords() * 8;
            if let Some(n) = Segment::get_total_bits(segs, version) {
                if n <= cap_bits {
                    chosen = Some((version, n));
                    break;
                }
            }
        }
        let (version, databits) = match chosen {
            Some(x) => x,
            None => {
                return Err(match Segment::get_total_bits(segs, maxversion) {
                    None => QrError::SegmentTooLong,
                    Some(_) => QrError::InputTooLarge,
                });
            }
        };

        if boostecl {
            for &newlevel in &EcLevel::ALL {
                if newlevel > level {
                    let cap = BlockLayout::for_version_level(version, newlevel).num_data_codewords() * 8;
                    if databits <= cap {
                        level = newlevel;
                    }
                }
            }
        }

        let mut bb = BitBuffer(Vec::new());
        for seg in segs {
            bb.append_bits(seg.mode().mode_bits(), 4);
            bb.append_bits(
                seg.num_chars() as u32,
                seg.mode().num_char_count_bits(version),
            );
            bb.0.extend_from_slice(seg.data());
        }

        let layout = BlockLayout::for_version_level(version, level);
        let data_capacity_bits = layout.num_data_codewords() * 8;
        assert!(bb.0.len() <= data_capacity_bits);

        let num_zero_bits = (data_capacity_bits - bb.0.len()).min(4);
        bb.append_bits(0, num_zero_bits as u8);
        let pad = (8 - bb.0.len() % 8) % 8;
        bb.append_bits(0, pad as u8);
        let pad_bytes = [0xECu32, 0x11u32];
        let mut pad_idx = 0;
        while bb.0.len() < data_capacity_bits {
            bb.append_bits(pad_bytes[pad_idx % 2], 8);
            pad_idx += 1;
        }

        let mut data_codewords = vec![0u8; bb.0.len() / 8];
        for (i, &bit) in bb.0.iter().enumerate() {
            if bit {
                data_codewords[i >> 3] |= 1 << (7 - (i & 7));
            }
        }

        let all_codewords = Self::interleave_with_ecc(&data_codewords, layout);
        Ok(Self::assemble(version, level, &all_codewords, mask))
    }

    /// Splits `data` into blocks per `layout`, computes each block's ECC via
    /// `rs::encode`, and interleaves data then ECC columns in wire order.
    fn interleave_with_ecc(data: &[u8], layout: BlockLayout) -> Vec<u8> {
        let divisor = rs::generator(layout.ecc_len);
        let lens = layout.block_data_lens();
        let mut blocks: Vec<(&[u8], Vec<u8>)> = Vec::with_capacity(lens.len());
        let mut offset = 0;
        for &len in &lens {
            let chunk = &data[offset..offset + len];
            let ecc = rs::encode(chunk, &divisor);
            blocks.push((chunk, ecc));
            offset += len;
        }

        let max_data_len = lens.iter().copied().max().unwrap_or(0);
        let mut result = Vec::with_capacity(data.len() + layout.ecc_len * layout.num_blocks());
        for i in 0..max_data_len {
            for (chunk, _) in &blocks {
                if i < chunk.len() {
                    result.push(chunk[i]);
                }
            }
        }
        for i in 0..layout.ecc_len {
            for (_, ecc) in &blocks {
                result.push(ecc[i]);
            }
        }
        result
    }

    /// Lays out the interleaved codewords, then either applies the caller's
    /// chosen mask or tries all 8 and keeps the one with the lowest penalty.
    fn assemble(version: Version, level: EcLevel, all_codewords: &[u8], mask: Option<Mask>) -> Self {
        let mut base = Matrix::new(version.size());
        base.draw_function_patterns(version);
        base.draw_codewords(all_codewords);

        let (chosen_mask, matrix) = match mask {
            Some(m) => {
                let mut mat = base.clone();
                mat.apply_mask(m);
                mat.draw_format_bits(level, m);
                (m, mat)
            }
            None => {
                let mut best: Option<(Mask, Matrix, i32)> = None;
                for i in 0..8u8 {
                    let m = Mask::new(i);
                    let mut mat = base.clone();
                    mat.apply_mask(m);
                    mat.draw_format_bits(level, m);
                    let penalty = mat.get_penalty_score();
                    if best.as_ref().map_or(true, |&(_, _, p)| penalty < p) {
                        best = Some((m, mat, penalty));
                    }
                }
                let (m, mat, _) = best.expect("8 masks always yield a candidate");
                (m, mat)
            }
        };

        Self {
            version,
            level,
            mask: chosen_mask,
            matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_fits_version_1() {
        let qr = Symbol::encode_text("HELLO WORLD", EcLevel::Quartile).unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.size(), 21);
    }

    #[test]
    fn single_byte_fits_version_1_high() {
        let qr = Symbol::encode_binary(&[0x00], EcLevel::High).unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.size(), 21);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let data = vec![0u8; 3000];
        let err = Symbol::encode_binary(&data, EcLevel::High).unwrap_err();
        assert!(matches!(err, QrError::InputTooLarge));
    }

    #[test]
    fn out_of_bounds_module_is_light() {
        let qr = Symbol::encode_text("A", EcLevel::Medium).unwrap();
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(qr.size(), 0));
    }
}
