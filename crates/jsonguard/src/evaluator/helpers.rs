use ahash::{AHashMap, AHashSet};

use crate::value::JsonValue;

/// Whether `value` is a multiple of `multiple`.
///
/// Integral operands are checked exactly. Otherwise the quotient must be within a few ulps of
/// the nearest integer, relative to the quotient's magnitude (at least 1).
#[allow(clippy::float_cmp)]
pub(super) fn is_multiple_of(value: f64, multiple: f64) -> bool {
    if value.fract() == 0.0 && multiple.fract() == 0.0 {
        return value % multiple == 0.0;
    }
    let quotient = value / multiple;
    if !quotient.is_finite() {
        return false;
    }
    let tolerance = 4.0 * f64::EPSILON * quotient.abs().max(1.0);
    (quotient - quotient.round()).abs() <= tolerance
}

/// String length in Unicode scalar values.
pub(super) fn char_count(value: &str) -> u64 {
    bytecount::num_chars(value.as_bytes()) as u64
}

// Below this size a quadratic scan beats hashing
const ITEMS_SIZE_THRESHOLD: usize = 9;

pub(super) fn is_unique(items: &[JsonValue]) -> bool {
    let size = items.len();
    if size <= 1 {
        true
    } else if size <= ITEMS_SIZE_THRESHOLD {
        for (idx, item) in items.iter().enumerate() {
            if items[idx + 1..].contains(item) {
                return false;
            }
        }
        true
    } else {
        let mut seen = AHashSet::with_capacity(size);
        items.iter().all(move |item| seen.insert(item))
    }
}

/// Pairs of `(first occurrence, duplicate)` indices, ordered by first occurrence.
pub(super) fn duplicates(items: &[JsonValue]) -> Vec<(usize, usize)> {
    let mut first_seen: AHashMap<&JsonValue, usize> = AHashMap::with_capacity(items.len());
    let mut duplicates = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        if let Some(first) = first_seen.get(item) {
            duplicates.push((*first, idx));
        } else {
            first_seen.insert(item, idx);
        }
    }
    duplicates.sort_by_key(|(first, _)| *first);
    duplicates
}
