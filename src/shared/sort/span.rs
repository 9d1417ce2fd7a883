//! Comparison of parameter spans.

use std::cmp::Ordering;

/// Byte-wise order: common prefix first, then the shorter span sorts first.
#[inline]
pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Byte-equal and same length.
#[inline]
pub fn is_equal(a: &[u8], b: &[u8]) -> bool {
    a == b
}
