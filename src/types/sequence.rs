//! 16-bit RTP sequence arithmetic

/// Forward distance from `expected` to `seq`, modulo 2^16.
pub fn sequence_delta(seq: u16, expected: u16) -> u16 {
    seq.wrapping_sub(expected)
}

/// Compare sequence numbers in u16 space with wraparound using the half-range rule.
/// Returns true if `a` is considered newer than `b`.
pub fn sequence_after(a: u16, b: u16) -> bool {
    if a == b {
        return false;
    }
    a.wrapping_sub(b) < 0x8000
}

/// Number of sequence numbers spanned by `first..=last`, modulo 2^16.
///
/// A span covering the entire space reports 0.
pub fn sequence_span(first: u16, last: u16) -> u16 {
    last.wrapping_sub(first).wrapping_add(1)
}
