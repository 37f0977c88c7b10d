//! Reed-Solomon encoding and decoding over GF(256), the way the teacher's
//! `reed_solomon_compute_divisor`/`reed_solomon_compute_remainder` do for
//! encoding; decoding (syndromes, Berlekamp-Massey, Chien search, Forney
//! correction) is new, grounded in the standard QR/ISO-18004 algorithm.

use crate::gf256;

/// The valid ECC lengths per ISO/IEC 18004 Table 9 (the only generator
/// polynomial degrees a QR Code ever asks for).
pub const VALID_ECC_LENGTHS: [usize; 31] = [
    7, 10, 13, 15, 16, 17, 18, 20, 22, 24, 26, 28, 30, 32, 34, 36, 40, 42, 44, 46, 48, 50, 52, 54,
    56, 58, 60, 62, 64, 66, 68,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsError {
    /// More errors were detected than this block's ECC length can correct.
    Uncorrectable,
}

/// Returns the Reed-Solomon generator (divisor) polynomial for the given
/// degree, highest power first, omitting the always-1 leading coefficient.
pub fn generator(degree: usize) -> Vec<u8> {
    assert!((1..=255).contains(&degree), "degree out of range");
    let mut result = vec![0u8; degree - 1];
    result.push(1); // x^0 coefficient

    let mut root: u8 = 1;
    for _ in 0..degree {
        for j in 0..degree {
            result[j] = gf256::mul(result[j], root);
            if j + 1 < result.len() {
                result[j] ^= result[j + 1];
            }
        }
        root = gf256::mul(root, 0x02);
    }
    result
}

/// Computes the `divisor.len()` ECC bytes for `data` via synthetic polynomial division.
pub fn encode(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; divisor.len()];
    for &b in data {
        let factor = b ^ result.remove(0);
        result.push(0);
        for (x, &y) in result.iter_mut().zip(divisor.iter()) {
            *x ^= gf256::mul(y, factor);
        }
    }
    result
}

/// Computes the syndromes `S_j = sum_i block[i] * alpha^(i*j)` for `j in 0..ecc_len`,
/// treating `block[0]` as the highest-degree coefficient (matches wire order).
fn syndromes(block: &[u8], ecc_len: usize) -> Vec<u8> {
    let n = block.len();
    (0..ecc_len)
        .map(|j| {
            let mut acc = 0u8;
            for (i, &b) in block.iter().enumerate() {
                // exponent of the i'th codeword (counted from the end) times j
                let exp = ((n - 1 - i) as i32) * (j as i32);
                acc ^= gf256::mul(b, gf256::alpha_pow(exp));
            }
            acc
        })
        .collect()
}

/// Modified Berlekamp-Massey: finds the error locator `sigma(x)` (lowest
/// degree first, sigma[0] == 1) from the syndrome sequence. Returns `None`
/// if the degree ever exceeds `ecc_len/2`, per spec's "bail with
/// uncorrectable" rule.
fn berlekamp_massey(syn: &[u8]) -> Option<Vec<u8>> {
    let ecc_len = syn.len();
    let mut sigma = vec![1u8];
    let mut prev_sigma = vec![1u8];
    let mut l = 0usize;
    let mut m = 1i32;
    let mut b = 1u8;

    for n in 0..ecc_len {
        let mut delta = syn[n];
        for i in 1..=l {
            delta ^= gf256::mul(sigma[i], syn[n - i]);
        }
        if delta == 0 {
            m += 1;
        } else if 2 * l <= n {
            let t = prev_sigma.clone();
            let coeff = gf256::div(delta, b);
            let shift = m as usize;
            if sigma.len() < t.len() + shift {
                sigma.resize(t.len() + shift, 0);
            }
            for (i, &ti) in t.iter().enumerate() {
                sigma[i + shift] ^= gf256::mul(coeff, ti);
            }
            l = n + 1 - l;
            prev_sigma = sigma.clone();
            b = delta;
            m = 1;
        } else {
            let coeff = gf256::div(delta, b);
            let shift = m as usize;
            if sigma.len() < prev_sigma.len() + shift {
                sigma.resize(prev_sigma.len() + shift, 0);
            }
            for (i, &ti) in prev_sigma.iter().enumerate() {
                sigma[i + shift] ^= gf256::mul(coeff, ti);
            }
            m += 1;
        }
        if l > ecc_len / 2 {
            return None;
        }
    }
    if l > ecc_len / 2 {
        return None;
    }
    Some(sigma)
}

/// Chien search: finds roots of `sigma` among `alpha^-i` for `i in 0..n`,
/// returning the error positions (index from the start of `block`, where
/// `block[0]` is the highest-degree coefficient).
fn chien_search(sigma: &[u8], n: usize, expected: usize) -> Option<Vec<usize>> {
    let mut positions = Vec::new();
    for i in 0..n {
        let x = gf256::alpha_pow(-(i as i32));
        let mut acc = 0u8;
        for (j, &coeff) in sigma.iter().enumerate() {
            acc ^= gf256::mul(coeff, gf256::pow(x, j as u32));
        }
        if acc == 0 {
            // Root alpha^-i corresponds to error at position (n-1-i) from the start.
            positions.push(n - 1 - i);
        }
    }
    (positions.len() == expected).then_some(positions)
}

/// Evaluator polynomial `omega = sigma * S mod x^ecc_len`.
fn evaluator(sigma: &[u8], syn: &[u8]) -> Vec<u8> {
    let ecc_len = syn.len();
    let mut omega = vec![0u8; ecc_len];
    for i in 0..ecc_len {
        for j in 0..=i {
            if j < sigma.len() {
                omega[i] ^= gf256::mul(sigma[j], syn[i - j]);
            }
        }
    }
    omega
}

/// Formal derivative of `sigma`, kept as the sparse list of odd-degree
/// coefficients `[sigma[1], sigma[3], sigma[5], ...]`; since char(GF(256)) == 2,
/// d/dx(c * x^j) is `c * x^(j-1)` for odd j and 0 for even j, so
/// `sigma'(x) = sum_m sigma[2m+1] * x^(2m)`.
fn derivative(sigma: &[u8]) -> Vec<u8> {
    sigma
        .iter()
        .enumerate()
        .skip(1)
        .step_by(2)
        .map(|(_, &c)| c)
        .collect()
}

/// Corrects `block` in place. Returns the number of corrected codewords, or
/// `RsError::Uncorrectable` if the block has more errors than it can fix.
/// `block[0]` is the highest-degree (first transmitted) codeword.
pub fn decode(block: &mut [u8], ecc_len: usize) -> Result<u32, RsError> {
    let syn = syndromes(block, ecc_len);
    if syn.iter().all(|&s| s == 0) {
        return Ok(0);
    }

    let sigma = berlekamp_massey(&syn).ok_or(RsError::Uncorrectable)?;
    let num_errors = sigma.len() - 1;
    if num_errors == 0 {
        return Err(RsError::Uncorrectable);
    }

    let positions = chien_search(&sigma, block.len(), num_errors).ok_or(RsError::Uncorrectable)?;
    let omega = evaluator(&sigma, &syn);
    let sigma_prime = derivative(&sigma);

    for &pos in &positions {
        // Location number X_k = alpha^e for the error at codeword `pos`
        // (codeword i contributes the x^(n-1-i) term in the syndrome definition above).
        let e = (block.len() - 1 - pos) as i32;
        let x_k = gf256::alpha_pow(e);
        let root = gf256::alpha_pow(-e); // X_k^-1, the Chien-search root

        let mut omega_val = 0u8;
        for (i, &c) in omega.iter().enumerate() {
            omega_val ^= gf256::mul(c, gf256::pow(root, i as u32));
        }
        let mut sigma_prime_val = 0u8;
        for (m, &c) in sigma_prime.iter().enumerate() {
            sigma_prime_val ^= gf256::mul(c, gf256::pow(root, 2 * m as u32));
        }
        if sigma_prime_val == 0 {
            return Err(RsError::Uncorrectable);
        }
        // Forney: Y_k = X_k * omega(X_k^-1) / sigma'(X_k^-1) (sign-free in char 2).
        let magnitude = gf256::mul(x_k, gf256::div(omega_val, sigma_prime_val));
        block[pos] ^= magnitude;
    }

    // Verify: a wrong correction must not be reported as success.
    let check = syndromes(block, ecc_len);
    if check.iter().any(|&s| s != 0) {
        return Err(RsError::Uncorrectable);
    }
    Ok(num_errors as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_block_is_free() {
        let mut block = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let divisor = generator(4);
        let ecc = encode(&block[..6], &divisor);
        block[6..10].copy_from_slice(&ecc);
        assert_eq!(decode(&mut block, 4).unwrap(), 0);
    }

    #[test]
    fn corrects_flipped_codewords() {
        let data = b"HELLO WORLD ABCDEFGHIJKLMNOPQRSTUVWXYZ0123".to_vec();
        let ecc_len = 16;
        let divisor = generator(ecc_len);
        let ecc = encode(&data, &divisor);
        let mut block = data.clone();
        block.extend_from_slice(&ecc);

        // Flip floor(ecc_len/2) = 8 codewords.
        let corrupted_positions = [0usize, 3, 7, 10, 15, 20, 25, 30];
        let mut corrupted = block.clone();
        for &p in &corrupted_positions {
            corrupted[p] ^= 0xFF;
        }
        let corrected_count = decode(&mut corrupted, ecc_len).unwrap();
        assert_eq!(corrected_count as usize, corrupted_positions.len());
        assert_eq!(corrupted, block);
    }

    #[test]
    fn too_many_errors_is_uncorrectable() {
        let data = vec![0u8; 20];
        let ecc_len = 10;
        let divisor = generator(ecc_len);
        let ecc = encode(&data, &divisor);
        let mut block = data;
        block.extend_from_slice(&ecc);
        for b in block.iter_mut().take(8) {
            *b ^= 0xFF;
        }
        assert_eq!(decode(&mut block, ecc_len), Err(RsError::Uncorrectable));
    }
}
