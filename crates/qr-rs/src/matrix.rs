//! Shared base-matrix construction, data placement, masking, and penalty
//! scoring. Grounded in the teacher's `QrCode` drawing methods
//! (`draw_function_patterns`, `draw_finder_pattern`, `draw_alignment_pattern`,
//! `draw_format_bits`, `draw_version`, `draw_codewords`, `apply_mask`,
//! `get_penalty_score`), generalized so the decoder can reuse the exact same
//! function-pattern/isfunction layout and the exact same serpentine
//! traversal order, just reading bits back out instead of writing them.

use crate::ec_level::EcLevel;
use crate::finder_penalty::FinderPenalty;
use crate::mask::Mask;
use crate::tables;
use crate::version::Version;
use crate::{PENALTY_N1, PENALTY_N2, PENALTY_N3, PENALTY_N4};

fn get_bit(x: u32, i: i32) -> bool {
    (x >> i) & 1 != 0
}

/// A `D x D` grid of modules plus a parallel "is this a function/fixed
/// module" flag grid. Built once per encode (from scratch) or per decode
/// attempt (from sampled pixels), then walked with the same traversal
/// either to write codeword bits or to read them back.
#[derive(Clone)]
pub struct Matrix {
    pub size: i32,
    modules: Vec<bool>,
    isfunction: Vec<bool>,
}

impl Matrix {
    pub fn new(size: i32) -> Self {
        let len = (size * size) as usize;
        Self {
            size,
            modules: vec![false; len],
            isfunction: vec![false; len],
        }
    }

    fn index(&self, x: i32, y: i32) -> usize {
        assert!(0 <= x && x < self.size && 0 <= y && y < self.size, "module out of range");
        (y * self.size + x) as usize
    }

    pub fn get_module(&self, x: i32, y: i32) -> bool {
        self.modules[self.index(x, y)]
    }

    pub fn set_module(&mut self, x: i32, y: i32, is_dark: bool) {
        let i = self.index(x, y);
        self.modules[i] = is_dark;
    }

    pub fn is_function(&self, x: i32, y: i32) -> bool {
        self.isfunction[self.index(x, y)]
    }

    fn set_function_module(&mut self, x: i32, y: i32, is_dark: bool) {
        let x = x.rem_euclid(self.size);
        let y = y.rem_euclid(self.size);
        let i = self.index(x, y);
        self.modules[i] = is_dark;
        self.isfunction[i] = true;
    }

    /// Stamps finders, separators, timing, alignment, the dark module, and
    /// reserves (but does not yet fill with real values) the format/version
    /// regions. Shared verbatim between encode (which then overwrites format
    /// with the real mask/level) and decode (which marks these modules as
    /// non-data before sampling).
    pub fn draw_function_patterns(&mut self, version: Version) {
        for i in 0..self.size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(self.size - 4, 3);
        self.draw_finder_pattern(3, self.size - 4);

        let alignpatpos = tables::alignment_pattern_positions(version);
        let numalign = alignpatpos.len();
        for i in 0..numalign {
            for j in 0..numalign {
                if !((i == 0 && j == 0)
                    || (i == 0 && j == numalign - 1)
                    || (i == numalign - 1 && j == 0))
                {
                    self.draw_alignment_pattern(alignpatpos[i], alignpatpos[j]);
                }
            }
        }

        // Dummy format bits (level Low, mask 0); reserves the region, real
        // value is stamped later via draw_format_bits with the chosen mask.
        self.draw_format_bits(EcLevel::Low, Mask::new(0));
        self.draw_version(version);
    }

    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4..=4 {
            for dx in -4..=4 {
                let dist = dx.abs().max(dy.abs());
                let (xx, yy) = (x + dx, y + dy);
                if 0 <= xx && xx < self.size && 0 <= yy && yy < self.size {
                    self.set_function_module(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.set_function_module(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    /// Stamps both 15-bit copies of the format info for `(level, mask)`.
    pub fn draw_format_bits(&mut self, level: EcLevel, mask: Mask) {
        let data = (u32::from(level.format_bits()) << 3) | u32::from(mask.value());
        let bits = tables::format_bits(data);
        assert!(bits >> 15 == 0);

        for i in 0..=5 {
            self.set_function_module(8, i, get_bit(bits, i));
        }
        self.set_function_module(8, 7, get_bit(bits, 6));
        self.set_function_module(8, 8, get_bit(bits, 7));
        self.set_function_module(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, get_bit(bits, i));
        }

        for i in 0..8 {
            self.set_function_module(self.size - 1 - i, 8, get_bit(bits, i));
        }
        for i in 8..15 {
            self.set_function_module(8, self.size - 15 + i, get_bit(bits, i));
        }
        self.set_function_module(8, self.size - 8, true);
    }

    /// Stamps both 18-bit copies of the version info. No-op below v7.
    pub fn draw_version(&mut self, version: Version) {
        if version.value() < 7 {
            return;
        }
        let bits = tables::version_bits(u32::from(version.value()));
        assert!(bits >> 18 == 0);

        for i in 0..18 {
            let bit = get_bit(bits, i);
            let a = self.size - 11 + i % 3;
            let b = i / 3;
            self.set_function_module(a, b, bit);
            self.set_function_module(b, a, bit);
        }
    }

    /// Serpentine codeword placement: writes `data`'s bits MSB-first into
    /// every non-function module, in the up/down zig-zag 2-column strip
    /// order mandated by ISO 18004, skipping the timing column.
    pub fn draw_codewords(&mut self, data: &[u8]) {
        let mut i: usize = 0;
        let mut right = self.size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..self.size {
                for j in 0..2 {
                    let x = right - j;
                    let upward = (right + 1) & 2 == 0;
                    let y = if upward { self.size - 1 - vert } else { vert };
                    if !self.is_function(x, y) && i < data.len() * 8 {
                        let bit = get_bit(u32::from(data[i >> 3]), 7 - (i & 7) as i32);
                        self.set_module(x, y, bit);
                        i += 1;
                    }
                }
            }
            right -= 2;
        }
    }

    /// Decode-side counterpart of `draw_codewords`: reads bits back out of
    /// every non-function module in the identical traversal order, packing
    /// them MSB-first into bytes. The last byte is zero-padded if the module
    /// count isn't a multiple of 8 (it never is exactly, but callers only
    /// look at the first `num_raw_data_modules/8` bytes).
    pub fn read_codewords(&self) -> Vec<u8> {
        let capacity_bits = tables::num_raw_data_modules(Version::from_size(self.size).unwrap());
        let mut out = vec![0u8; (capacity_bits + 7) / 8];
        let mut i: usize = 0;
        let mut right = self.size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..self.size {
                for j in 0..2 {
                    let x = right - j;
                    let upward = (right + 1) & 2 == 0;
                    let y = if upward { self.size - 1 - vert } else { vert };
                    if !self.is_function(x, y) {
                        if self.get_module(x, y) {
                            out[i >> 3] |= 1 << (7 - (i & 7));
                        }
                        i += 1;
                    }
                }
            }
            right -= 2;
        }
        out
    }

    /// XORs the given mask's predicate into every data module. Applying the
    /// same mask twice is the identity, so this function serves both encode
    /// (apply) and decode (remove).
    pub fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                if !self.is_function(x, y) && mask.invert_at(x, y) {
                    let i = self.index(x, y);
                    self.modules[i] ^= true;
                }
            }
        }
    }

    /// Samples the fixed (function) modules only and compares them against
    /// a freshly built reference matrix of the same version, returning the
    /// fraction that disagree. Used by the decoder to bail out of a corner
    /// before wasting RS-decode effort on a misaligned sample.
    pub fn fixed_module_mismatch_fraction(&self, version: Version) -> f64 {
        let mut reference = Matrix::new(self.size);
        reference.draw_function_patterns(version);
        let mut mismatches = 0u32;
        let mut total = 0u32;
        for y in 0..self.size {
            for x in 0..self.size {
                if reference.is_function(x, y) {
                    total += 1;
                    if reference.get_module(x, y) != self.get_module(x, y) {
                        mismatches += 1;
                    }
                }
            }
        }
        if total == 0 {
            0.0
        } else {
            f64::from(mismatches) / f64::from(total)
        }
    }

    /// ISO 18004 penalty score (lower is better): N1 runs, N2 2x2 blocks,
    /// N3 finder-like patterns, N4 dark/light balance.
    pub fn get_penalty_score(&self) -> i32 {
        let mut result: i32 = 0;

        for y in 0..self.size {
            let mut runcolor = false;
            let mut runx: i32 = 0;
            let mut runhistory = FinderPenalty::new(self.size);
            for x in 0..self.size {
                if self.get_module(x, y) == runcolor {
                    runx += 1;
                    if runx == 5 {
                        result += PENALTY_N1;
                    } else if runx > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runx);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = self.get_module(x, y);
                    runx = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runx) * PENALTY_N3;
        }

        for x in 0..self.size {
            let mut runcolor = false;
            let mut runy: i32 = 0;
            let mut runhistory = FinderPenalty::new(self.size);
            for y in 0..self.size {
                if self.get_module(x, y) == runcolor {
                    runy += 1;
                    if runy == 5 {
                        result += PENALTY_N1;
                    } else if runy > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runy);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = self.get_module(x, y);
                    runy = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runy) * PENALTY_N3;
        }

        for y in 0..self.size - 1 {
            for x in 0..self.size - 1 {
                let color = self.get_module(x, y);
                if color == self.get_module(x + 1, y)
                    && color == self.get_module(x, y + 1)
                    && color == self.get_module(x + 1, y + 1)
                {
                    result += PENALTY_N2;
                }
            }
        }

        let dark: i32 = self.modules.iter().filter(|&&b| b).count() as i32;
        let total: i32 = self.size * self.size;
        let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
        result += k * PENALTY_N4;

        result
    }
}
