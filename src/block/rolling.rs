use std::collections::HashMap;

use super::encode::Token;

/// Base of the polynomial rolling hash
///
/// Shared by every candidate length. All arithmetic is modulo 2^64 via
/// natural unsigned wraparound, so no explicit modulus is ever taken.
pub const HASH_BASE: u64 = 1_000_003;

/// `base^exp mod 2^64` by binary exponentiation
fn pow_wrapping(base: u64, mut exp: u64) -> u64 {
    let mut result: u64 = 1;
    let mut acc = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(acc);
        }
        acc = acc.wrapping_mul(acc);
        exp >>= 1;
    }
    result
}

/// Hash every length-`length` window of `tokens` in one left-to-right pass
///
/// Returns a map from hash value to the ascending list of window starts that
/// produced it. Equal token windows always land in the same bucket; unequal
/// windows can collide, so buckets must be re-verified by exact comparison
/// before any match is trusted.
///
/// O(n) time and space for one length: the first window is hashed directly,
/// every subsequent start removes the outgoing token's weighted contribution
/// and appends the incoming token.
pub fn hash_windows(tokens: &[Token], length: usize) -> HashMap<u64, Vec<usize>> {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    if length == 0 || tokens.len() < length {
        return buckets;
    }

    let pow_out = pow_wrapping(HASH_BASE, (length - 1) as u64);

    let mut h: u64 = 0;
    for &token in &tokens[..length] {
        h = h.wrapping_mul(HASH_BASE).wrapping_add(token);
    }
    buckets.entry(h).or_default().push(0);

    for start in 1..=(tokens.len() - length) {
        let outgoing = tokens[start - 1];
        let incoming = tokens[start + length - 1];
        h = h.wrapping_sub(outgoing.wrapping_mul(pow_out));
        h = h.wrapping_mul(HASH_BASE).wrapping_add(incoming);
        buckets.entry(h).or_default().push(start);
    }

    buckets
}
