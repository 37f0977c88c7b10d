//! Finder pattern localization: horizontal run-length scan, vertical
//! refinement, and three-finder corner assembly, per spec §4.F. Tolerances
//! for the 1:1:3:1:1 signature and the corner checks are named constants
//! since the source material names them (`SignatureMaxDeviation`,
//! `CornerSideLengthDev`, `CornerRightAngleDev`) without giving exact
//! values; the ones below are the conventional ZXing-family tolerances.

use crate::decode::binarize::BinaryImage;

/// Fraction of the estimated module size a 1:1:3:1:1 run is allowed to
/// deviate by and still count as a signature match.
const SIGNATURE_MAX_DEVIATION: f64 = 0.35;
/// Fraction by which a corner's two legs may differ in length.
const CORNER_SIDE_LENGTH_DEV: f64 = 0.15;
/// Radians a corner's enclosed angle may deviate from a right angle.
const CORNER_RIGHT_ANGLE_DEV: f64 = 0.30;

#[derive(Debug, Clone)]
pub struct FinderCandidate {
    pub center_row: f64,
    pub center_col: f64,
    pub col_span_start: usize,
    pub col_span_end: usize,
    pub module_size: f64,
    pub match_distance: f64,
}

#[derive(Debug, Clone)]
pub struct Corner {
    pub top_left: FinderCandidate,
    pub top_right: FinderCandidate,
    pub bottom_left: FinderCandidate,
}

fn runs_in_row(img: &BinaryImage, y: usize) -> Vec<(bool, usize, usize)> {
    let mut runs = Vec::new();
    let mut color = img.get(0, y);
    let mut start = 0usize;
    for x in 1..img.width {
        let c = img.get(x, y);
        if c != color {
            runs.push((color, start, x - start));
            start = x;
            color = c;
        }
    }
    runs.push((color, start, img.width - start));
    runs
}

fn runs_in_column(img: &BinaryImage, x: usize) -> Vec<(bool, usize, usize)> {
    let mut runs = Vec::new();
    let mut color = img.get(x, 0);
    let mut start = 0usize;
    for y in 1..img.height {
        let c = img.get(x, y);
        if c != color {
            runs.push((color, start, y - start));
            start = y;
            color = c;
        }
    }
    runs.push((color, start, img.height - start));
    runs
}

/// Tests a window of 5 consecutive runs against the 1:1:3:1:1 signature
/// with the middle run dark. Returns the estimated module size on match.
fn check_signature(window: &[(bool, usize, usize)]) -> Option<f64> {
    if !window[2].0 {
        return None;
    }
    let lens = [
        window[0].2 as f64,
        window[1].2 as f64,
        window[2].2 as f64,
        window[3].2 as f64,
        window[4].2 as f64,
    ];
    let total: f64 = lens.iter().sum();
    let module = total / 7.0;
    let tol = SIGNATURE_MAX_DEVIATION * module;
    let expected = [1.0, 1.0, 3.0, 1.0, 1.0];
    for i in 0..5 {
        if (lens[i] - expected[i] * module).abs() > tol {
            return None;
        }
    }
    Some(module)
}

fn horizontal_scan(img: &BinaryImage) -> Vec<FinderCandidate> {
    let mut candidates = Vec::new();
    for y in 0..img.height {
        let runs = runs_in_row(img, y);
        if runs.len() < 5 {
            continue;
        }
        for w in runs.windows(5) {
            if let Some(module) = check_signature(w) {
                let (_, mid_start, mid_len) = w[2];
                candidates.push(FinderCandidate {
                    center_row: y as f64,
                    center_col: mid_start as f64 + mid_len as f64 / 2.0,
                    col_span_start: mid_start,
                    col_span_end: mid_start + mid_len,
                    module_size: module,
                    match_distance: f64::INFINITY,
                });
            }
        }
    }
    candidates
}

/// Refines each horizontal candidate with a vertical scan through its
/// estimated center column, keeping the best 2D match and collapsing
/// overlapping survivors.
fn vertical_scan(img: &BinaryImage, horiz: &[FinderCandidate]) -> Vec<FinderCandidate> {
    let mut columns: Vec<usize> = horiz.iter().map(|c| c.center_col.round() as usize).collect();
    columns.sort_unstable();
    columns.dedup();

    let mut hits: Vec<(usize, f64, f64)> = Vec::new();
    for col in columns {
        if col >= img.width {
            continue;
        }
        let runs = runs_in_column(img, col);
        if runs.len() < 5 {
            continue;
        }
        for w in runs.windows(5) {
            if let Some(module) = check_signature(w) {
                let (_, mid_start, mid_len) = w[2];
                hits.push((col, mid_start as f64 + mid_len as f64 / 2.0, module));
            }
        }
    }

    let mut best: Vec<Option<(f64, FinderCandidate)>> = vec![None; horiz.len()];
    for &(col, vrow, vmodule) in &hits {
        for (i, h) in horiz.iter().enumerate() {
            if !(h.col_span_start..h.col_span_end).contains(&col) {
                continue;
            }
            let dcenter = (h.center_row - vrow).powi(2) + (h.center_col - col as f64).powi(2);
            let dmodule = (h.module_size - vmodule).powi(2);
            let dist = dcenter + dmodule;
            let better = best[i].as_ref().map_or(true, |&(d, _)| dist < d);
            if better {
                best[i] = Some((
                    dist,
                    FinderCandidate {
                        center_row: vrow,
                        center_col: h.center_col,
                        col_span_start: h.col_span_start,
                        col_span_end: h.col_span_end,
                        module_size: (h.module_size + vmodule) / 2.0,
                        match_distance: dist,
                    },
                ));
            }
        }
    }

    let mut survivors: Vec<FinderCandidate> = best.into_iter().filter_map(|o| o.map(|(_, c)| c)).collect();
    survivors.sort_by(|a, b| a.match_distance.partial_cmp(&b.match_distance).unwrap());

    let mut deduped: Vec<FinderCandidate> = Vec::new();
    for cand in survivors {
        let overlaps = deduped.iter().any(|d: &FinderCandidate| {
            (d.center_row - cand.center_row).abs() < d.module_size.max(1.0)
                && (d.center_col - cand.center_col).abs() < d.module_size.max(1.0)
        });
        if !overlaps {
            deduped.push(cand);
        }
    }
    deduped
}

/// Runs the horizontal scan, then the vertical refinement pass. Empty
/// result means the image has no finder-like regions at all.
pub fn locate_finders(img: &BinaryImage) -> Vec<FinderCandidate> {
    let horiz = horizontal_scan(img);
    vertical_scan(img, &horiz)
}

pub(crate) fn euclid_dist(a: &FinderCandidate, b: &FinderCandidate) -> f64 {
    ((a.center_row - b.center_row).powi(2) + (a.center_col - b.center_col).powi(2)).sqrt()
}

fn angle_at(vertex: &FinderCandidate, p1: &FinderCandidate, p2: &FinderCandidate) -> f64 {
    let v1 = (
        p1.center_row - vertex.center_row,
        p1.center_col - vertex.center_col,
    );
    let v2 = (
        p2.center_row - vertex.center_row,
        p2.center_col - vertex.center_col,
    );
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let m1 = v1.0.hypot(v1.1);
    let m2 = v2.0.hypot(v2.1);
    if m1 == 0.0 || m2 == 0.0 {
        return 0.0;
    }
    (dot / (m1 * m2)).clamp(-1.0, 1.0).acos()
}

fn try_corner(trio: [&FinderCandidate; 3]) -> Option<Corner> {
    let angles = [
        angle_at(trio[0], trio[1], trio[2]),
        angle_at(trio[1], trio[0], trio[2]),
        angle_at(trio[2], trio[0], trio[1]),
    ];
    let (tl_idx, &best_angle) = angles
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())?;
    let others: Vec<usize> = (0..3).filter(|&i| i != tl_idx).collect();
    let tl = trio[tl_idx];
    let a = trio[others[0]];
    let b = trio[others[1]];

    let leg_a = euclid_dist(tl, a);
    let leg_b = euclid_dist(tl, b);
    if leg_a == 0.0 || leg_b == 0.0 {
        return None;
    }
    let ratio = (leg_a / leg_b).max(leg_b / leg_a);
    if ratio - 1.0 > CORNER_SIDE_LENGTH_DEV {
        return None;
    }

    let angle_dev = (best_angle - std::f64::consts::FRAC_PI_2).abs();
    if angle_dev > CORNER_RIGHT_ANGLE_DEV {
        return None;
    }

    let horiz_a = (a.center_row - tl.center_row).abs();
    let horiz_b = (b.center_row - tl.center_row).abs();
    let (top_right, bottom_left) = if horiz_a < horiz_b { (a, b) } else { (b, a) };

    Some(Corner {
        top_left: tl.clone(),
        top_right: top_right.clone(),
        bottom_left: bottom_left.clone(),
    })
}

/// Every 3-subset of surviving finders that passes the side-length and
/// right-angle checks becomes one `Corner` candidate.
pub fn assemble_corners(finders: &[FinderCandidate]) -> Vec<Corner> {
    let mut corners = Vec::new();
    let n = finders.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                if let Some(corner) = try_corner([&finders[i], &finders[j], &finders[k]]) {
                    corners.push(corner);
                }
            }
        }
    }
    corners
}

/// Searches a pixel-space box around `(est_x, est_y)` of half-width
/// `half_box` for an alignment pattern's 1:1:1:1:1 signature, returning its
/// pixel center `(x, y)` on success. Used only to upgrade an affine fit to
/// a perspective one after the affine-only decode attempt fails.
pub fn find_alignment_center(
    img: &BinaryImage,
    est_x: f64,
    est_y: f64,
    half_box: f64,
) -> Option<(f64, f64)> {
    let x0 = (est_x - half_box).max(0.0) as usize;
    let x1 = ((est_x + half_box).min(img.width as f64 - 1.0)) as usize;
    let y0 = (est_y - half_box).max(0.0) as usize;
    let y1 = ((est_y + half_box).min(img.height as f64 - 1.0)) as usize;
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let mut best: Option<((f64, f64), f64)> = None;
    for y in y0..=y1 {
        let runs = runs_in_row(img, y);
        for w in runs.windows(5) {
            if w[0].1 < x0 || w[4].1 + w[4].2 > x1 + 1 {
                continue;
            }
            if let Some(module) = check_alignment_signature(w) {
                let (_, mid_start, mid_len) = w[2];
                let cx = mid_start as f64 + mid_len as f64 / 2.0;
                let cy = y as f64;
                let dist = (cx - est_x).powi(2) + (cy - est_y).powi(2);
                if best.as_ref().map_or(true, |&(_, d)| dist < d) {
                    best = Some(((cx, cy), dist));
                    let _ = module;
                }
            }
        }
    }
    best.map(|(p, _)| p)
}

/// Like `check_signature`, but expects all five runs roughly equal (the
/// alignment pattern's 1:1:1:1:1 cross-section) rather than 1:1:3:1:1.
fn check_alignment_signature(window: &[(bool, usize, usize)]) -> Option<f64> {
    if !window[2].0 {
        return None;
    }
    let lens = [
        window[0].2 as f64,
        window[1].2 as f64,
        window[2].2 as f64,
        window[3].2 as f64,
        window[4].2 as f64,
    ];
    let total: f64 = lens.iter().sum();
    let module = total / 5.0;
    let tol = SIGNATURE_MAX_DEVIATION * module;
    for &len in &lens {
        if (len - module).abs() > tol {
            return None;
        }
    }
    Some(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(row: f64, col: f64) -> FinderCandidate {
        FinderCandidate {
            center_row: row,
            center_col: col,
            col_span_start: 0,
            col_span_end: 1,
            module_size: 1.0,
            match_distance: 0.0,
        }
    }

    #[test]
    fn right_triangle_assembles_into_a_corner() {
        let finders = vec![candidate(0.0, 0.0), candidate(0.0, 20.0), candidate(20.0, 0.0)];
        let corners = assemble_corners(&finders);
        assert_eq!(corners.len(), 1);
        assert_eq!(corners[0].top_left.center_row, 0.0);
        assert_eq!(corners[0].top_left.center_col, 0.0);
    }

    #[test]
    fn collinear_points_never_assemble() {
        let finders = vec![candidate(0.0, 0.0), candidate(0.0, 10.0), candidate(0.0, 20.0)];
        assert!(assemble_corners(&finders).is_empty());
    }
}
