//! Module-coordinate -> pixel-coordinate mapping, solved by in-place
//! Gaussian elimination on a small augmented matrix. Affine uses three
//! finder centers; perspective uses those plus the refined alignment
//! center, correcting for the skew an affine fit can't capture.

/// A tagged coordinate transform. Sampling dispatches once on the variant
/// instead of going through a trait object, matching the "tagged variant,
/// not a hierarchy" design used for masks.
#[derive(Debug, Clone, Copy)]
pub enum Transform {
    Affine {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    },
    Perspective {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
        g: f64,
        h: f64,
    },
}

impl Transform {
    /// Maps a module coordinate `(row, col)` to a pixel coordinate `(px, py)`.
    pub fn sample(&self, row: f64, col: f64) -> (f64, f64) {
        match *self {
            Transform::Affine { a, b, c, d, e, f } => (a * col + b * row + e, c * col + d * row + f),
            Transform::Perspective {
                a,
                b,
                c,
                d,
                e,
                f,
                g,
                h,
            } => {
                let denom = g * col + h * row + 1.0;
                ((a * col + b * row + e) / denom, (c * col + d * row + f) / denom)
            }
        }
    }

    /// Solves the 3x3 system mapping three module coordinates to three pixel
    /// coordinates (the finder centers). Returns `None` if the points are
    /// collinear in module space (singular matrix).
    pub fn solve_affine(module_pts: [(f64, f64); 3], pixel_pts: [(f64, f64); 3]) -> Option<Self> {
        let build = |rhs: [f64; 3]| -> Vec<Vec<f64>> {
            (0..3)
                .map(|i| {
                    let (row, col) = module_pts[i];
                    vec![col, row, 1.0, rhs[i]]
                })
                .collect()
        };
        let sol_x = solve_linear(build([pixel_pts[0].0, pixel_pts[1].0, pixel_pts[2].0]), 3)?;
        let sol_y = solve_linear(build([pixel_pts[0].1, pixel_pts[1].1, pixel_pts[2].1]), 3)?;
        Some(Transform::Affine {
            a: sol_x[0],
            b: sol_x[1],
            e: sol_x[2],
            c: sol_y[0],
            d: sol_y[1],
            f: sol_y[2],
        })
    }

    /// Solves the 8x8 system mapping four module coordinates to four pixel
    /// coordinates, with projective denominator `g*col + h*row + 1`.
    pub fn solve_perspective(
        module_pts: [(f64, f64); 4],
        pixel_pts: [(f64, f64); 4],
    ) -> Option<Self> {
        // Unknown order: a b c d e f g h
        let mut aug = Vec::with_capacity(8);
        for i in 0..4 {
            let (row, col) = module_pts[i];
            let (px, py) = pixel_pts[i];
            aug.push(vec![
                col, row, 0.0, 0.0, 1.0, 0.0, -px * col, -px * row, px,
            ]);
            aug.push(vec![
                0.0, 0.0, col, row, 0.0, 1.0, -py * col, -py * row, py,
            ]);
        }
        let sol = solve_linear(aug, 8)?;
        Some(Transform::Perspective {
            a: sol[0],
            b: sol[1],
            c: sol[2],
            d: sol[3],
            e: sol[4],
            f: sol[5],
            g: sol[6],
            h: sol[7],
        })
    }
}

/// Gauss-Jordan elimination with partial pivoting on an `n x (n+1)`
/// augmented matrix. Returns `None` on a (near-)singular pivot.
fn solve_linear(mut aug: Vec<Vec<f64>>, n: usize) -> Option<Vec<f64>> {
    for col in 0..n {
        let mut pivot = col;
        for r in (col + 1)..n {
            if aug[r][col].abs() > aug[pivot][col].abs() {
                pivot = r;
            }
        }
        if aug[pivot][col].abs() < 1e-9 {
            return None;
        }
        aug.swap(col, pivot);
        let pivot_val = aug[col][col];
        for c in col..=n {
            aug[col][c] /= pivot_val;
        }
        for r in 0..n {
            if r != col {
                let factor = aug[r][col];
                if factor != 0.0 {
                    for c in col..=n {
                        aug[r][c] -= factor * aug[col][c];
                    }
                }
            }
        }
    }
    Some((0..n).map(|r| aug[r][n]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_recovers_pure_scale_and_offset() {
        // px = 4*col + 10, py = 4*row + 10
        let module_pts = [(0.0, 0.0), (0.0, 10.0), (10.0, 0.0)];
        let pixel_pts = [(10.0, 10.0), (10.0, 50.0), (50.0, 10.0)];
        let t = Transform::solve_affine(module_pts, pixel_pts).unwrap();
        let (px, py) = t.sample(5.0, 5.0);
        assert!((px - 30.0).abs() < 1e-6);
        assert!((py - 30.0).abs() < 1e-6);
    }

    #[test]
    fn perspective_recovers_affine_as_special_case() {
        let module_pts = [(0.0, 0.0), (0.0, 10.0), (10.0, 0.0), (10.0, 10.0)];
        let pixel_pts = [(10.0, 10.0), (10.0, 50.0), (50.0, 10.0), (50.0, 50.0)];
        let t = Transform::solve_perspective(module_pts, pixel_pts).unwrap();
        let (px, py) = t.sample(5.0, 5.0);
        assert!((px - 30.0).abs() < 1e-6);
        assert!((py - 30.0).abs() < 1e-6);
    }
}
