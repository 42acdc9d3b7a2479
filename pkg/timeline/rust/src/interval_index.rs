// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Binary search over sorted arrays and sorted, disjoint interval sets.
//!
//! All functions take key-extraction closures instead of requiring a trait on
//! the element type, so the same helpers serve spans, object instances,
//! snapshots and series samples. Absence is signalled with sentinels, never
//! with an error: these sit on the hot hit-testing path.

/// Result of locating a value among sorted half-open intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalLookup {
    /// The value precedes every interval.
    Before,
    /// The interval at this index contains the value.
    At(usize),
    /// The value follows every interval, or falls in a gap between two.
    After,
}

impl IntervalLookup {
    /// Historical index encoding: `-1`, the index, or `len`. Indices past
    /// `isize::MAX` saturate.
    pub fn to_sentinel(self, len: usize) -> isize {
        match self {
            IntervalLookup::Before => -1,
            IntervalLookup::At(i) => isize::try_from(i).unwrap_or(isize::MAX),
            IntervalLookup::After => isize::try_from(len).unwrap_or(isize::MAX),
        }
    }
}

/// Returns the leftmost index whose key is `>= value`, or `array.len()` when
/// every key is smaller.
///
/// `array` must be sorted ascending by `key_of`. An empty array yields `1`,
/// not `0`; callers that index with the result must check emptiness first.
pub fn find_low_index<T, K>(array: &[T], key_of: K, value: f64) -> usize
where
    K: Fn(&T) -> f64,
{
    if array.is_empty() {
        return 1;
    }
    array.partition_point(|element| key_of(element) < value)
}

/// Locates the interval `[start_of(e), start_of(e) + width_of(e))` that
/// contains `value`. `array` must hold disjoint intervals sorted by start.
pub fn find_interval_containing<T, S, W>(
    array: &[T],
    start_of: S,
    width_of: W,
    value: f64,
) -> IntervalLookup
where
    S: Fn(&T) -> f64,
    W: Fn(&T) -> f64,
{
    let contains = |index: usize| {
        array.get(index).is_some_and(|element| {
            let lo = start_of(element);
            value >= lo && value < lo + width_of(element)
        })
    };

    let first = find_low_index(array, &start_of, value);
    if first == 0 {
        if contains(0) {
            IntervalLookup::At(0)
        } else {
            IntervalLookup::Before
        }
    } else if first <= array.len() {
        // `first - 1` starts before `value`; `first` (if any) starts at or after it.
        if contains(first) {
            IntervalLookup::At(first)
        } else if contains(first - 1) {
            IntervalLookup::At(first - 1)
        } else {
            IntervalLookup::After
        }
    } else {
        IntervalLookup::After
    }
}

/// Visits, in ascending order, every interval intersecting `[lo, hi)`.
///
/// The interval immediately before `lo` is visited too when it extends past
/// `lo`, so a caller walking adjoining windows sees a straddling interval in
/// both windows.
pub fn iterate_intersecting<T, S, W, V>(
    array: &[T],
    start_of: S,
    width_of: W,
    lo: f64,
    hi: f64,
    mut visit: V,
) where
    S: Fn(&T) -> f64,
    W: Fn(&T) -> f64,
    V: FnMut(&T, usize),
{
    if array.is_empty() || lo > hi {
        return;
    }

    let first = find_low_index(array, &start_of, lo);
    if let Some(previous) = first.checked_sub(1).and_then(|i| array.get(i)) {
        if start_of(previous) + width_of(previous) > lo {
            visit(previous, first - 1);
        }
    }

    for (index, element) in array.iter().enumerate().skip(first) {
        if start_of(element) >= hi {
            break;
        }
        visit(element, index);
    }
}

/// Returns the index of the element whose key is nearest to `value`, if it
/// lies within `max_diff`. Equidistant neighbours resolve to the later one.
pub fn find_closest_element<T, K>(array: &[T], key_of: K, value: f64, max_diff: f64) -> Option<usize>
where
    K: Fn(&T) -> f64,
{
    if array.is_empty() {
        return None;
    }

    let mut after = find_low_index(array, &key_of, value);
    let before = after.saturating_sub(1);
    if after == array.len() {
        after -= 1;
    }

    let diff = |index: usize| array.get(index).map(|e| (value - key_of(e)).abs());
    let (before_diff, after_diff) = (diff(before)?, diff(after)?);
    if before_diff > max_diff && after_diff > max_diff {
        return None;
    }
    Some(if before_diff < after_diff { before } else { after })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ident(x: &f64) -> f64 {
        *x
    }

    #[derive(Debug)]
    struct Interval {
        start: f64,
        width: f64,
    }

    fn intervals(ranges: &[(f64, f64)]) -> Vec<Interval> {
        ranges
            .iter()
            .map(|&(start, width)| Interval { start, width })
            .collect()
    }

    fn lookup(array: &[Interval], value: f64) -> IntervalLookup {
        find_interval_containing(array, |i| i.start, |i| i.width, value)
    }

    #[test]
    fn test_find_low_index_basic() {
        let array = [1.0, 3.0, 5.0, 7.0];
        assert_eq!(find_low_index(&array, ident, 0.0), 0);
        assert_eq!(find_low_index(&array, ident, 1.0), 0);
        assert_eq!(find_low_index(&array, ident, 2.0), 1);
        assert_eq!(find_low_index(&array, ident, 7.0), 3);
        assert_eq!(find_low_index(&array, ident, 8.0), 4);
    }

    #[test]
    fn test_find_low_index_ties_resolve_leftmost() {
        let array = [1.0, 2.0, 2.0, 2.0, 3.0];
        assert_eq!(find_low_index(&array, ident, 2.0), 1);
    }

    #[test]
    fn test_find_low_index_empty_returns_one() {
        let array: [f64; 0] = [];
        assert_eq!(find_low_index(&array, ident, 42.0), 1);
    }

    #[test]
    fn test_find_interval_containing() {
        let array = intervals(&[(0.0, 10.0), (10.0, 5.0), (20.0, 5.0)]);
        assert_eq!(lookup(&array, -1.0), IntervalLookup::Before);
        assert_eq!(lookup(&array, 0.0), IntervalLookup::At(0));
        assert_eq!(lookup(&array, 9.5), IntervalLookup::At(0));
        assert_eq!(lookup(&array, 10.0), IntervalLookup::At(1));
        assert_eq!(lookup(&array, 22.0), IntervalLookup::At(2));
        assert_eq!(lookup(&array, 25.0), IntervalLookup::After);
        assert_eq!(lookup(&array, 30.0).to_sentinel(array.len()), 3);
        assert_eq!(lookup(&array, -5.0).to_sentinel(array.len()), -1);
    }

    #[test]
    fn test_find_interval_containing_gap_reports_after() {
        let array = intervals(&[(0.0, 5.0), (10.0, 5.0)]);
        assert_eq!(lookup(&array, 7.0), IntervalLookup::After);
    }

    #[test]
    fn test_find_interval_containing_open_ended() {
        let array = intervals(&[(0.0, 5.0), (10.0, f64::INFINITY)]);
        assert_eq!(lookup(&array, 1e12), IntervalLookup::At(1));
    }

    #[test]
    fn test_find_interval_containing_empty() {
        let array: Vec<Interval> = Vec::new();
        assert_eq!(lookup(&array, 1.0), IntervalLookup::After);
        assert_eq!(lookup(&array, 1.0).to_sentinel(0), 0);
    }

    #[test]
    fn test_iterate_intersecting_includes_lookback() {
        let array = intervals(&[(0.0, 4.0), (5.0, 10.0), (16.0, 2.0), (30.0, 1.0)]);
        let mut seen = Vec::new();
        iterate_intersecting(&array, |i| i.start, |i| i.width, 10.0, 20.0, |_, idx| {
            seen.push(idx)
        });
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_iterate_intersecting_skips_interval_ending_at_lo() {
        let array = intervals(&[(0.0, 10.0), (12.0, 1.0)]);
        let mut seen = Vec::new();
        iterate_intersecting(&array, |i| i.start, |i| i.width, 10.0, 20.0, |_, idx| {
            seen.push(idx)
        });
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn test_iterate_intersecting_inverted_window_is_noop() {
        let array = intervals(&[(0.0, 10.0)]);
        let mut called = false;
        iterate_intersecting(&array, |i| i.start, |i| i.width, 5.0, 1.0, |_, _| {
            called = true
        });
        assert!(!called);
    }

    #[test]
    fn test_sentinel_saturates_instead_of_wrapping() {
        assert_eq!(IntervalLookup::At(4).to_sentinel(9), 4);
        assert_eq!(IntervalLookup::After.to_sentinel(9), 9);
        assert_eq!(IntervalLookup::At(usize::MAX).to_sentinel(1), isize::MAX);
        assert_eq!(IntervalLookup::After.to_sentinel(usize::MAX), isize::MAX);
    }

    #[test]
    fn test_find_closest_element() {
        let array = [0.0, 10.0, 20.0];
        assert_eq!(find_closest_element(&array, ident, 4.0, 5.0), Some(0));
        assert_eq!(find_closest_element(&array, ident, 5.0, 5.0), Some(1));
        assert_eq!(find_closest_element(&array, ident, 26.0, 10.0), Some(2));
        assert_eq!(find_closest_element(&array, ident, 50.0, 10.0), None);
        assert_eq!(find_closest_element(&[] as &[f64], ident, 1.0, 10.0), None);
    }
}
