//! Per-corner decode state machine: `SampleMeta -> SampleData -> Demask ->
//! Deinterleave -> ECC -> ParseSegments`, per spec §4.F. Any stage failing
//! is surfaced as a `DecodeError` and the caller moves on to the next
//! corner triple; nothing here unwinds across corners.

use crate::decode::binarize::BinaryImage;
use crate::decode::finder::{euclid_dist, find_alignment_center, Corner};
use crate::decode::transform::Transform;
use crate::decode::DecodedSymbol;
use crate::ec_level::EcLevel;
use crate::error::DecodeError;
use crate::mask::Mask;
use crate::matrix::Matrix;
use crate::rs;
use crate::segment::Segment;
use crate::tables::{self, BlockLayout};
use crate::version::Version;

fn round_half_away(x: f64) -> i64 {
    if x >= 0.0 {
        (x + 0.5).floor() as i64
    } else {
        (x - 0.5).ceil() as i64
    }
}

fn sample_bit(img: &BinaryImage, transform: &Transform, row: i32, col: i32) -> bool {
    let (px, py) = transform.sample(f64::from(row), f64::from(col));
    img.get_signed(round_half_away(px), round_half_away(py))
}

/// Samples the format-info copy stamped near the top-left finder (the
/// first `set_function_module` block in `Matrix::draw_format_bits`).
fn sample_format_bits_copy1(img: &BinaryImage, transform: &Transform, _size: i32) -> u32 {
    let mut bits = 0u32;
    for i in 0..6 {
        if sample_bit(img, transform, i, 8) {
            bits |= 1 << i;
        }
    }
    if sample_bit(img, transform, 7, 8) {
        bits |= 1 << 6;
    }
    if sample_bit(img, transform, 8, 8) {
        bits |= 1 << 7;
    }
    if sample_bit(img, transform, 8, 7) {
        bits |= 1 << 8;
    }
    for i in 9..15 {
        if sample_bit(img, transform, 8, 14 - i) {
            bits |= 1 << i;
        }
    }
    bits
}

/// Samples the format-info copy stamped along the top-right/bottom-left
/// timing-adjacent strips (the second `set_function_module` block in
/// `Matrix::draw_format_bits`).
fn sample_format_bits_copy2(img: &BinaryImage, transform: &Transform, size: i32) -> u32 {
    let mut bits = 0u32;
    for i in 0..8 {
        if sample_bit(img, transform, 8, size - 1 - i) {
            bits |= 1 << i;
        }
    }
    for i in 8..15 {
        if sample_bit(img, transform, size - 15 + i, 8) {
            bits |= 1 << i;
        }
    }
    bits
}

/// Reads both redundant format-info regions and returns the first one that
/// BCH-corrects to a valid `(level, mask)` pair, per spec §4.F's "sample
/// both 15-bit format regions" robustness requirement.
fn read_format_info(img: &BinaryImage, transform: &Transform, size: i32) -> Option<(EcLevel, Mask)> {
    tables::decode_format_bits(sample_format_bits_copy1(img, transform, size))
        .or_else(|| tables::decode_format_bits(sample_format_bits_copy2(img, transform, size)))
}

/// Samples the version-info copy stamped in the top-right strip (the
/// `set_function_module(a, b, ...)` half of `Matrix::draw_version`).
fn sample_version_bits_copy1(img: &BinaryImage, transform: &Transform, size: i32) -> u32 {
    let mut bits = 0u32;
    for i in 0..18 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        if sample_bit(img, transform, b, a) {
            bits |= 1 << i;
        }
    }
    bits
}

/// Samples the mirrored version-info copy stamped in the bottom-left strip
/// (the `set_function_module(b, a, ...)` half of `Matrix::draw_version`).
fn sample_version_bits_copy2(img: &BinaryImage, transform: &Transform, size: i32) -> u32 {
    let mut bits = 0u32;
    for i in 0..18 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        if sample_bit(img, transform, a, b) {
            bits |= 1 << i;
        }
    }
    bits
}

/// Reads both mirrored version-info regions and returns the first one that
/// BCH-corrects to a valid version, per spec §4.F's "sample two 6x3
/// BCH-coded version-info regions" robustness requirement.
fn read_version_info(img: &BinaryImage, transform: &Transform, size: i32) -> Option<Version> {
    tables::decode_version_bits(sample_version_bits_copy1(img, transform, size))
        .or_else(|| tables::decode_version_bits(sample_version_bits_copy2(img, transform, size)))
}

/// Splits a de-interleaved codeword stream back into per-block (data + ECC)
/// buffers, inverting `Symbol::interleave_with_ecc`'s column-major layout.
fn deinterleave(stream: &[u8], lens: &[usize], ecc_len: usize) -> Vec<Vec<u8>> {
    let max_len = lens.iter().copied().max().unwrap_or(0);
    let mut blocks: Vec<Vec<u8>> = lens.iter().map(|&l| Vec::with_capacity(l + ecc_len)).collect();
    let mut idx = 0usize;
    for i in 0..max_len {
        for (b, &len) in lens.iter().enumerate() {
            if i < len {
                blocks[b].push(stream[idx]);
                idx += 1;
            }
        }
    }
    for _ in 0..ecc_len {
        for block in blocks.iter_mut() {
            block.push(stream[idx]);
            idx += 1;
        }
    }
    blocks
}

fn module_points(size: i32) -> [(f64, f64); 3] {
    [
        (3.0, 3.0),
        (3.0, f64::from(size - 4)),
        (f64::from(size - 4), 3.0),
    ]
}

fn finder_pixel_points(corner: &Corner) -> [(f64, f64); 3] {
    [
        (corner.top_left.center_col, corner.top_left.center_row),
        (corner.top_right.center_col, corner.top_right.center_row),
        (corner.bottom_left.center_col, corner.bottom_left.center_row),
    ]
}

/// Samples every module through `transform`, checks fixed modules agree
/// closely enough with their known pattern, de-masks, de-interleaves,
/// RS-corrects each block, and parses the resulting codeword stream into a
/// payload. This is the part of the pipeline retried once with a
/// perspective transform if the affine attempt fails.
fn attempt_decode(
    img: &BinaryImage,
    transform: &Transform,
    version: Version,
    level: EcLevel,
    mask: Mask,
) -> Result<DecodedSymbol, DecodeError> {
    let size = version.size();
    let mut matrix = Matrix::new(size);
    matrix.draw_function_patterns(version);

    // Sample every module, including the function ones: the fixed-module
    // check just below needs the pixel-sampled values, not the synthetic
    // ones `draw_function_patterns` stamped in to reserve the region.
    for row in 0..size {
        for col in 0..size {
            let dark = sample_bit(img, transform, row, col);
            matrix.set_module(col, row, dark);
        }
    }

    let mismatch = matrix.fixed_module_mismatch_fraction(version);
    if mismatch > f64::from(level.recoverable_percent()) / 100.0 {
        return Err(DecodeError::FixedModulesCorrupt);
    }

    matrix.apply_mask(mask);
    let raw = matrix.read_codewords();

    let layout = BlockLayout::for_version_level(version, level);
    let lens = layout.block_data_lens();
    let mut blocks = deinterleave(&raw, &lens, layout.ecc_len);

    let mut data_stream = Vec::with_capacity(layout.num_data_codewords());
    for (block, &len) in blocks.iter_mut().zip(lens.iter()) {
        rs::decode(block, layout.ecc_len)?;
        data_stream.extend_from_slice(&block[..len]);
    }

    let (payload, eci_assignment) = Segment::parse(&data_stream, version)?;
    Ok(DecodedSymbol {
        payload,
        version,
        level,
        eci_assignment,
    })
}

/// Builds a perspective transform from the three finder centers plus a
/// located bottom-right alignment center, searching a box scaled to the
/// corner's leg lengths per spec §4.F (the `0.3 * (top_leg + left_leg)`
/// search-radius rule; widening the search on failure is left as future
/// work, per §9's open question).
fn refine_with_alignment(
    img: &BinaryImage,
    corner: &Corner,
    affine: &Transform,
    version: Version,
) -> Option<Transform> {
    let size = version.size();
    let (est_x, est_y) = affine.sample(f64::from(size - 7), f64::from(size - 7));
    let top_leg = euclid_dist(&corner.top_left, &corner.top_right);
    let left_leg = euclid_dist(&corner.top_left, &corner.bottom_left);
    let half_box = 0.15 * (top_leg + left_leg);

    let (align_x, align_y) = find_alignment_center(img, est_x, est_y, half_box)?;

    let module_pts = [
        (3.0, 3.0),
        (3.0, f64::from(size - 4)),
        (f64::from(size - 4), 3.0),
        (f64::from(size - 7), f64::from(size - 7)),
    ];
    let mut pixel_pts = [(0.0, 0.0); 4];
    let finder_pts = finder_pixel_points(corner);
    pixel_pts[..3].copy_from_slice(&finder_pts);
    pixel_pts[3] = (align_x, align_y);

    Transform::solve_perspective(module_pts, pixel_pts)
}

/// Runs the full per-corner state machine once for `corner`, retrying with
/// a perspective transform (if an alignment center can be located) when the
/// first affine-only attempt fails.
pub fn decode_corner(img: &BinaryImage, corner: &Corner) -> Result<DecodedSymbol, DecodeError> {
    let top_leg = euclid_dist(&corner.top_left, &corner.top_right);
    let left_leg = euclid_dist(&corner.top_left, &corner.bottom_left);
    let module_size =
        (corner.top_left.module_size + corner.top_right.module_size + corner.bottom_left.module_size) / 3.0;
    if module_size <= 0.0 {
        return Err(DecodeError::NoCornerPasses);
    }

    let size_estimate = (top_leg + left_leg) / 2.0 / module_size + 7.0;
    let version_estimate = (((size_estimate - 17.0) / 4.0).round() as i32).clamp(1, 40) as u8;
    let mut version = Version::new(version_estimate);

    let pixel_pts = finder_pixel_points(corner);
    let mut transform =
        Transform::solve_affine(module_points(version.size()), pixel_pts).ok_or(DecodeError::NoCornerPasses)?;

    // Below v7 there is no stamped version info at all, so the leg-length
    // estimate is trusted outright. At v7 and above it must be confirmed by
    // BCH-correcting at least one of the two mirrored version-info copies;
    // if both are unreadable the leg-length estimate is not trusted at this
    // size (it's exactly the regime version info exists to disambiguate),
    // so the corner is abandoned rather than guessing.
    if version.value() >= 7 {
        version =
            read_version_info(img, &transform, version.size()).ok_or(DecodeError::VersionInfoUnreadable)?;
        transform = Transform::solve_affine(module_points(version.size()), pixel_pts)
            .ok_or(DecodeError::NoCornerPasses)?;
    }

    let (level, mask) = read_format_info(img, &transform, version.size()).ok_or(DecodeError::FormatInfoUnreadable)?;

    match attempt_decode(img, &transform, version, level, mask) {
        Ok(symbol) => Ok(symbol),
        Err(first_err) if version.value() >= 2 => {
            match refine_with_alignment(img, corner, &transform, version) {
                Some(perspective) => attempt_decode(img, &perspective, version, level, mask),
                None => Err(first_err),
            }
        }
        Err(e) => Err(e),
    }
}
