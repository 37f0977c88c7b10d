//! Arithmetic over GF(256) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
//! (0x11D) and generator `alpha = 2`. Shared by the Reed-Solomon encoder and
//! decoder so there is exactly one log/antilog table in this crate instead of
//! the teacher's runtime Russian-peasant multiply recomputed on every call.

use std::sync::OnceLock;

pub struct Tables {
    // Doubled to length 512 so `exp[log[a] + log[b]]` never needs a modulo.
    pub exp: [u8; 512],
    pub log: [u8; 256],
}

fn build() -> Tables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u32 = 1;
    for i in 0..255usize {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= 0x11D;
        }
    }
    for i in 255..512 {
        exp[i] = exp[i - 255];
    }
    Tables { exp, log }
}

pub fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(build)
}

/// Multiplies two field elements. Zero operands short-circuit.
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    t.exp[usize::from(t.log[a as usize]) + usize::from(t.log[b as usize])]
}

/// Divides `a` by `b`. Panics if `b` is zero.
pub fn div(a: u8, b: u8) -> u8 {
    assert!(b != 0, "division by zero in GF(256)");
    if a == 0 {
        return 0;
    }
    let t = tables();
    t.exp[usize::from(t.log[a as usize]) + 255 - usize::from(t.log[b as usize])]
}

/// Raises `a` to the given power.
pub fn pow(a: u8, n: u32) -> u8 {
    if n == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }
    let t = tables();
    t.exp[(usize::from(t.log[a as usize]) * (n as usize)) % 255]
}

/// Returns `alpha^e` for `e` taken modulo 255 (negative exponents wrap).
pub fn alpha_pow(e: i32) -> u8 {
    let t = tables();
    let m = e.rem_euclid(255) as usize;
    t.exp[m]
}

/// Multiplies two polynomials (coefficients highest-degree first), XOR-accumulating
/// into a result of length `p1.len() + p2.len() - 1`.
pub fn poly_mul(p1: &[u8], p2: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; p1.len() + p2.len() - 1];
    for (i, &a) in p1.iter().enumerate() {
        if a == 0 {
            continue;
        }
        for (j, &b) in p2.iter().enumerate() {
            result[i + j] ^= mul(a, b);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_log_roundtrip() {
        for a in 1..=255u8 {
            assert_eq!(tables().exp[usize::from(tables().log[a as usize])], a);
        }
    }

    #[test]
    fn mul_div_identity() {
        for a in 1..=255u8 {
            for b in 1..=255u8 {
                assert_eq!(div(mul(a, b), b), a);
            }
        }
    }

    #[test]
    fn exp_is_multiplicative() {
        for i in 0..255i32 {
            for j in 0..255i32 {
                assert_eq!(
                    mul(alpha_pow(i), alpha_pow(j)),
                    alpha_pow((i + j) % 255)
                );
            }
        }
    }
}
