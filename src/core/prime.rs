//! Primality Oracle
//!
//! O(1) primality lookup for the bounded range `[0, PRIME_LIMIT)`.

use thiserror::Error;

/// Exclusive upper bound of the supported range.
pub const PRIME_LIMIT: u64 = 100;

/// Lookup table: `PRIME_LUT[n]` is true iff `n` is prime.
///
/// Built at compile time by trial division, so 0 and 1 come out false.
pub static PRIME_LUT: [bool; PRIME_LIMIT as usize] = {
    let mut lut = [false; PRIME_LIMIT as usize];
    let mut n = 2usize;
    while n < PRIME_LIMIT as usize {
        let mut prime = true;
        let mut d = 2usize;
        while d * d <= n {
            if n % d == 0 {
                prime = false;
                break;
            }
            d += 1;
        }
        lut[n] = prime;
        n += 1;
    }
    lut
};

/// Value outside the supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is outside the primality range [0, 100)")]
pub struct OutOfRange(pub u64);

/// Is `n` prime? Defined only for `n < PRIME_LIMIT`.
#[inline]
pub fn is_prime(n: u64) -> Result<bool, OutOfRange> {
    if n < PRIME_LIMIT {
        Ok(PRIME_LUT[n as usize])
    } else {
        Err(OutOfRange(n))
    }
}
