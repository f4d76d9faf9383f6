//! Union and difference over sets of same-day intervals.
//!
//! # Algorithm Summary
//!
//! - [`unite`] merges two intervals after ordering them by `begin`.
//! - [`unite_all`] sorts by `begin` and sweeps, extending the open interval
//!   while the next one starts at or before its end. Invalid input is dropped.
//! - [`subtract`] removes the second interval from the first, where the first
//!   starts no later than the second. Touching intervals are pulled apart by
//!   one quantum each so the shared instant never becomes a zero-length piece.
//! - [`subtract_all`] left-folds [`subtract`] over a list.
//!
//! Invalid operands never fail: the valid operand (if any) is passed through.

use serde::{Deserialize, Serialize};

use crate::time::{TimeInterval, TimeSpan};

/// Default quantization step used to separate touching intervals (one minute).
pub const DEFAULT_QUANTUM_MS: i64 = 60_000;

/// Configuration for interval subtraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// Step by which touching intervals are shrunk/grown before subtracting.
    /// Zero or negative disables the adjustment.
    /// Default: 60000 (1 minute).
    pub quantum_ms: i64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            quantum_ms: DEFAULT_QUANTUM_MS,
        }
    }
}

/// Handles the cases where at least one operand is invalid.
fn pass_through_invalid(r1: TimeInterval, r2: TimeInterval) -> Option<Vec<TimeInterval>> {
    match (r1.is_valid(), r2.is_valid()) {
        (true, true) => None,
        (true, false) => Some(vec![r1]),
        (false, true) => Some(vec![r2]),
        (false, false) => Some(Vec::new()),
    }
}

/// Union of two intervals, ordered by `begin`.
pub fn unite(r1: TimeInterval, r2: TimeInterval) -> Vec<TimeInterval> {
    if let Some(result) = pass_through_invalid(r1, r2) {
        return result;
    }

    let (first, second) = if r2.begin < r1.begin { (r2, r1) } else { (r1, r2) };
    if !first.intersects(&second) {
        return vec![first, second];
    }

    let end = first
        .end
        .max(second.end)
        .max(first.begin)
        .max(second.begin);
    vec![TimeInterval::new(first.begin, end)]
}

/// Minimal ordered set of intervals covering the union of all valid inputs.
///
/// Intervals that overlap or share an endpoint are merged.
pub fn unite_all(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted: Vec<TimeInterval> = intervals
        .iter()
        .filter(|interval| interval.is_valid())
        .copied()
        .collect();
    sorted.sort_by_key(|interval| interval.begin);

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.begin <= last.end => last.end = last.end.max(interval.end),
            _ => merged.push(interval),
        }
    }
    merged
}

/// `r1 \ r2` using the default one-minute quantum.
pub fn subtract(r1: TimeInterval, r2: TimeInterval) -> Vec<TimeInterval> {
    subtract_with(r1, r2, &IntervalConfig::default())
}

/// `r1 \ r2`, where `r1` starts no later than `r2`.
///
/// Returns 0, 1 or 2 pieces. Identical operands cancel to a single invalid
/// interval; non-intersecting operands are both returned unchanged.
pub fn subtract_with(
    r1: TimeInterval,
    r2: TimeInterval,
    config: &IntervalConfig,
) -> Vec<TimeInterval> {
    if let Some(result) = pass_through_invalid(r1, r2) {
        return result;
    }

    if r1 == r2 {
        return vec![TimeInterval::INVALID];
    }

    if !r1.intersects(&r2) {
        return vec![r1, r2];
    }

    // [8:00,9:00] - [8:00,8:30] = [8:30,9:00]
    if r1.begin == r2.begin {
        let (low, high) = min_max(r1.end, r2.end);
        return vec![TimeInterval::new(low, high)];
    }

    // [8:00,9:00] - [8:30,9:00] = [8:00,8:30]
    if r1.end == r2.end {
        let (low, high) = min_max(r1.begin, r2.begin);
        return vec![TimeInterval::new(low, high)];
    }

    // [8:00,9:00] - [9:00,9:30] = [8:00,8:59] and [9:01,9:30]
    if r1.end == r2.begin && config.quantum_ms > 0 {
        let shrunk = forward(TimeInterval::new(
            r1.begin,
            r1.end.add_millis(-config.quantum_ms),
        ));
        let grown = forward(TimeInterval::new(
            r2.begin.add_millis(config.quantum_ms),
            r2.end,
        ));
        // Operands no longer than the quantum vanish entirely.
        match (shrunk, grown) {
            // A quantum of half a day wraps both endpoints onto each other again.
            (Some(shrunk), Some(grown)) if shrunk.end != grown.begin => {
                return subtract_with(shrunk, grown, config);
            }
            (Some(_), Some(_)) => {}
            (Some(piece), None) | (None, Some(piece)) => return vec![piece],
            (None, None) => return Vec::new(),
        }
    }

    let mut points = [r1.begin, r2.begin, r1.end, r2.end];
    points.sort();

    let mut result = Vec::with_capacity(2);
    if points[0] == r1.begin {
        result.push(TimeInterval::new(points[0], points[1]));
    }
    if points[3] == r1.end {
        result.push(TimeInterval::new(points[2], points[3]));
    }
    result
}

/// Subtracts every later interval from the first, using the default quantum.
pub fn subtract_all(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    subtract_all_with(intervals, &IntervalConfig::default())
}

/// Left fold of [`subtract_with`]: the first interval is the running set and
/// each later valid interval is removed from every piece of it.
///
/// Lists with fewer than two intervals are returned unchanged.
pub fn subtract_all_with(intervals: &[TimeInterval], config: &IntervalConfig) -> Vec<TimeInterval> {
    let Some((first, rest)) = intervals.split_first() else {
        return Vec::new();
    };

    rest.iter()
        .filter(|interval| interval.is_valid())
        .fold(vec![*first], |pieces, removed| {
            pieces
                .into_iter()
                .flat_map(|piece| subtract_with(piece, *removed, config))
                .collect()
        })
}

/// Sum of the signed spans of `intervals`.
pub fn total_span(intervals: &[TimeInterval]) -> TimeSpan {
    intervals.iter().map(TimeInterval::span).sum()
}

/// `interval` if it runs forward, i.e. `begin < end`.
fn forward(interval: TimeInterval) -> Option<TimeInterval> {
    (interval.is_valid() && !interval.is_inverted()).then_some(interval)
}

fn min_max<T: Ord>(a: T, b: T) -> (T, T) {
    if b < a { (b, a) } else { (a, b) }
}
