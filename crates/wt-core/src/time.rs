//! Time-of-day primitives: clock points, same-day intervals and signed spans.
//!
//! None of these types carry a date. Operations on them are total: an invalid
//! operand produces an invalid (or zero) result instead of an error, so the
//! interval algebra in [`crate::interval`] can compose freely.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MILLIS_PER_DAY: i64 = 86_400_000;
const NANOS_PER_MILLI: u32 = 1_000_000;

/// Error returned when a string is not a recognizable time of day.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid time of day: {0:?} (expected HH:MM or HH:MM:SS)")]
pub struct ParseTimeError(String);

/// A point on a 24-hour clock with millisecond resolution.
///
/// [`TimeOfDay::INVALID`] is a distinguishable sentinel. It orders before
/// every valid time, so sorting never has to special-case it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(Option<NaiveTime>);

impl TimeOfDay {
    /// The invalid sentinel.
    pub const INVALID: Self = Self(None);

    /// Creates a time from hours and minutes, or [`Self::INVALID`] when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Self {
        Self::from_hms(hour, minute, 0)
    }

    /// Creates a time from hours, minutes and seconds, or [`Self::INVALID`] when out of range.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Self {
        Self(NaiveTime::from_hms_opt(hour, minute, second))
    }

    /// Creates a time with millisecond precision, or [`Self::INVALID`] when out of range.
    pub fn from_hms_milli(hour: u32, minute: u32, second: u32, milli: u32) -> Self {
        if milli >= 1000 {
            return Self::INVALID;
        }
        Self(NaiveTime::from_hms_milli_opt(hour, minute, second, milli))
    }

    /// Wraps a chrono time, truncating it to millisecond resolution.
    pub fn from_naive(time: NaiveTime) -> Self {
        let millis = (time.nanosecond() / NANOS_PER_MILLI).min(999);
        Self(time.with_nanosecond(millis * NANOS_PER_MILLI))
    }

    /// Creates a time from milliseconds since midnight; anything outside one day is invalid.
    pub fn from_millis_since_midnight(millis: i64) -> Self {
        if !(0..MILLIS_PER_DAY).contains(&millis) {
            return Self::INVALID;
        }
        let Ok(seconds) = u32::try_from(millis / 1000) else {
            return Self::INVALID;
        };
        let Ok(sub_millis) = u32::try_from(millis % 1000) else {
            return Self::INVALID;
        };
        Self(NaiveTime::from_num_seconds_from_midnight_opt(
            seconds,
            sub_millis * NANOS_PER_MILLI,
        ))
    }

    /// The current local wall-clock time.
    pub fn now() -> Self {
        Self::from_naive(Local::now().time())
    }

    /// Returns true unless this is the invalid sentinel.
    pub const fn is_valid(self) -> bool {
        self.0.is_some()
    }

    /// Returns the underlying chrono time if valid.
    pub const fn as_naive(self) -> Option<NaiveTime> {
        self.0
    }

    /// Milliseconds elapsed since midnight, if valid.
    pub fn millis_since_midnight(self) -> Option<i64> {
        self.0.map(|time| {
            i64::from(time.num_seconds_from_midnight()) * 1000
                + i64::from(time.nanosecond() / NANOS_PER_MILLI)
        })
    }

    /// Shifts the time by `millis`, wrapping around midnight.
    ///
    /// The invalid sentinel stays invalid.
    #[must_use]
    pub fn add_millis(self, millis: i64) -> Self {
        match self.millis_since_midnight() {
            Some(current) => {
                let shifted = (current + millis.rem_euclid(MILLIS_PER_DAY)) % MILLIS_PER_DAY;
                Self::from_millis_since_midnight(shifted)
            }
            None => Self::INVALID,
        }
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self::from_naive(time)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(time) if time.nanosecond() == 0 => write!(f, "{}", time.format("%H:%M:%S")),
            Some(time) => write!(f, "{}", time.format("%H:%M:%S%.3f")),
            None => f.write_str("--:--:--"),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(Self::from_naive)
            .map_err(|_| ParseTimeError(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        // Empty strings round-trip the invalid sentinel.
        if value.trim().is_empty() {
            return Ok(Self::INVALID);
        }
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        if time.is_valid() {
            time.to_string()
        } else {
            Self::new()
        }
    }
}

/// A span between two times of the same day.
///
/// An interval is valid when both endpoints are valid and differ. A valid
/// interval may still be inverted (`begin > end`); inversion is informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub begin: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeInterval {
    /// An interval with both endpoints invalid.
    pub const INVALID: Self = Self {
        begin: TimeOfDay::INVALID,
        end: TimeOfDay::INVALID,
    };

    pub const fn new(begin: TimeOfDay, end: TimeOfDay) -> Self {
        Self { begin, end }
    }

    /// Shorthand for `[begin_hour:begin_minute, end_hour:end_minute]`.
    pub fn from_hm(begin_hour: u32, begin_minute: u32, end_hour: u32, end_minute: u32) -> Self {
        Self::new(
            TimeOfDay::from_hm(begin_hour, begin_minute),
            TimeOfDay::from_hm(end_hour, end_minute),
        )
    }

    pub fn is_valid(&self) -> bool {
        self.begin.is_valid() && self.end.is_valid() && self.begin != self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.begin.is_valid() && self.end.is_valid() && self.begin > self.end
    }

    /// One-sided overlap test: assumes `self` starts no later than `other`.
    ///
    /// Touching endpoints count as intersecting. Callers that need a symmetric
    /// test must order the pair by `begin` first.
    pub fn intersects(&self, other: &Self) -> bool {
        self.is_valid() && other.is_valid() && self.end >= other.begin
    }

    /// Returns true when both endpoints of `other` lie within `[begin, end]`.
    pub fn contains(&self, other: &Self) -> bool {
        let within = |time: TimeOfDay| self.begin <= time && time <= self.end;
        self.intersects(other) && within(other.begin) && within(other.end)
    }

    /// Signed length of the interval (`end - begin`).
    pub fn span(&self) -> TimeSpan {
        TimeSpan::between(self.begin, self.end)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.begin, self.end)
    }
}

/// A signed duration in whole seconds.
///
/// Hour and minute components keep the sign of the whole span:
/// -5410 s is -1 h -30 m, never -1 h +30 m.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSpan {
    seconds: i64,
}

impl TimeSpan {
    pub const ZERO: Self = Self { seconds: 0 };

    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds }
    }

    /// Seconds from `begin` to `end`; zero when either endpoint is invalid.
    pub fn between(begin: TimeOfDay, end: TimeOfDay) -> Self {
        match (begin.millis_since_midnight(), end.millis_since_midnight()) {
            (Some(begin), Some(end)) => Self::from_seconds((end - begin) / 1000),
            _ => Self::ZERO,
        }
    }

    pub const fn seconds(self) -> i64 {
        self.seconds
    }

    pub const fn hours(self) -> i64 {
        self.seconds / 3600
    }

    pub const fn minutes(self) -> i64 {
        (self.seconds % 3600) / 60
    }

    pub const fn is_negative(self) -> bool {
        self.seconds < 0
    }
}

impl From<TimeInterval> for TimeSpan {
    fn from(interval: TimeInterval) -> Self {
        interval.span()
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{sign}{}:{:02}",
            self.hours().unsigned_abs(),
            self.minutes().unsigned_abs()
        )
    }
}

impl Add for TimeSpan {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_seconds(self.seconds + rhs.seconds)
    }
}

impl AddAssign for TimeSpan {
    fn add_assign(&mut self, rhs: Self) {
        self.seconds += rhs.seconds;
    }
}

impl Sub for TimeSpan {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_seconds(self.seconds - rhs.seconds)
    }
}

impl SubAssign for TimeSpan {
    fn sub_assign(&mut self, rhs: Self) {
        self.seconds -= rhs.seconds;
    }
}

impl Neg for TimeSpan {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from_seconds(-self.seconds)
    }
}

impl Sum for TimeSpan {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::from_hm(hour, minute)
    }

    #[test]
    fn time_of_day_rejects_out_of_range() {
        assert!(hm(8, 30).is_valid());
        assert!(!hm(24, 0).is_valid());
        assert!(!hm(8, 60).is_valid());
        assert!(!TimeOfDay::from_hms_milli(8, 0, 0, 1000).is_valid());
        assert!(!TimeOfDay::from_millis_since_midnight(-1).is_valid());
        assert!(!TimeOfDay::from_millis_since_midnight(MILLIS_PER_DAY).is_valid());
    }

    #[test]
    fn invalid_orders_before_valid() {
        assert!(TimeOfDay::INVALID < hm(0, 0));
        assert_eq!(TimeOfDay::default(), TimeOfDay::INVALID);
    }

    #[test]
    fn from_naive_truncates_to_millis() {
        let time = NaiveTime::from_hms_nano_opt(8, 0, 0, 123_456_789).unwrap();
        assert_eq!(
            TimeOfDay::from_naive(time),
            TimeOfDay::from_hms_milli(8, 0, 0, 123)
        );
    }

    #[test]
    fn add_millis_wraps_around_midnight() {
        assert_eq!(hm(9, 0).add_millis(-60_000), hm(8, 59));
        assert_eq!(hm(23, 59).add_millis(120_000), hm(0, 1));
        assert_eq!(hm(0, 0).add_millis(-60_000), hm(23, 59));
        assert_eq!(TimeOfDay::INVALID.add_millis(60_000), TimeOfDay::INVALID);
    }

    #[test]
    fn parses_and_formats() {
        assert_eq!("08:30".parse::<TimeOfDay>().unwrap(), hm(8, 30));
        assert_eq!("17:00:05".parse::<TimeOfDay>().unwrap(), TimeOfDay::from_hms(17, 0, 5));
        assert_eq!(
            "17:00:05.250".parse::<TimeOfDay>().unwrap(),
            TimeOfDay::from_hms_milli(17, 0, 5, 250)
        );
        assert!("8h".parse::<TimeOfDay>().is_err());
        assert!("25:00".parse::<TimeOfDay>().is_err());

        assert_eq!(hm(8, 5).to_string(), "08:05:00");
        assert_eq!(TimeOfDay::from_hms_milli(8, 5, 0, 7).to_string(), "08:05:00.007");
        assert_eq!(TimeOfDay::INVALID.to_string(), "--:--:--");
    }

    #[test]
    fn time_of_day_serde_roundtrip() {
        let json = serde_json::to_string(&hm(12, 15)).unwrap();
        assert_eq!(json, "\"12:15:00\"");
        let parsed: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hm(12, 15));

        let invalid: TimeOfDay = serde_json::from_str("\"\"").unwrap();
        assert_eq!(invalid, TimeOfDay::INVALID);
        assert!(serde_json::from_str::<TimeOfDay>("\"noon\"").is_err());
    }

    #[test]
    fn interval_validity() {
        assert!(TimeInterval::from_hm(8, 0, 8, 30).is_valid());
        // Inverted but still valid
        assert!(TimeInterval::from_hm(12, 0, 8, 30).is_valid());
        assert!(!TimeInterval::from_hm(8, 0, 8, 0).is_valid());
        assert!(!TimeInterval::new(TimeOfDay::INVALID, hm(8, 0)).is_valid());
        assert!(!TimeInterval::new(hm(8, 0), TimeOfDay::INVALID).is_valid());
        assert!(!TimeInterval::INVALID.is_valid());
    }

    #[test]
    fn interval_inversion() {
        assert!(TimeInterval::from_hm(8, 30, 8, 0).is_inverted());
        assert!(!TimeInterval::from_hm(8, 0, 8, 30).is_inverted());
        assert!(!TimeInterval::new(TimeOfDay::INVALID, hm(8, 0)).is_inverted());
        assert!(!TimeInterval::new(hm(8, 0), TimeOfDay::INVALID).is_inverted());
    }

    #[test]
    fn interval_intersects_is_one_sided() {
        let base = TimeInterval::from_hm(8, 0, 8, 30);
        assert!(base.intersects(&TimeInterval::from_hm(8, 30, 9, 0)));
        assert!(base.intersects(&TimeInterval::from_hm(8, 15, 9, 0)));
        assert!(base.intersects(&TimeInterval::from_hm(7, 15, 8, 0)));
        assert!(base.intersects(&TimeInterval::from_hm(7, 15, 8, 15)));
        assert!(!base.intersects(&TimeInterval::from_hm(9, 30, 10, 0)));
        // The reversed pairing only compares the later interval's end.
        assert!(TimeInterval::from_hm(9, 30, 10, 0).intersects(&base));

        assert!(!TimeInterval::INVALID.intersects(&TimeInterval::from_hm(9, 30, 10, 0)));
        assert!(!base.intersects(&TimeInterval::INVALID));
    }

    #[test]
    fn interval_contains() {
        let base = TimeInterval::from_hm(8, 0, 8, 30);
        assert!(base.contains(&TimeInterval::from_hm(8, 0, 8, 10)));
        assert!(base.contains(&TimeInterval::from_hm(8, 10, 8, 30)));
        assert!(base.contains(&base));
        assert!(!base.contains(&TimeInterval::from_hm(8, 15, 9, 30)));
        assert!(!base.contains(&TimeInterval::from_hm(7, 15, 8, 30)));
        assert!(!base.contains(&TimeInterval::INVALID));
        assert!(!TimeInterval::INVALID.contains(&TimeInterval::from_hm(7, 15, 8, 30)));
    }

    #[test]
    fn interval_equality_is_structural() {
        assert_eq!(
            TimeInterval::from_hm(8, 30, 9, 30),
            TimeInterval::new(hm(8, 30), hm(9, 30))
        );
        assert_eq!(TimeInterval::default(), TimeInterval::INVALID);
        assert_ne!(TimeInterval::from_hm(8, 30, 9, 30), TimeInterval::from_hm(9, 30, 10, 30));
        assert_ne!(TimeInterval::from_hm(8, 30, 9, 30), TimeInterval::INVALID);
    }

    #[test]
    fn span_keeps_sign_in_components() {
        let forward = TimeInterval::from_hm(10, 0, 11, 30).span();
        assert_eq!(forward.seconds(), 5400);
        assert_eq!((forward.hours(), forward.minutes()), (1, 30));

        let backward = TimeSpan::between(hm(11, 30), hm(10, 0));
        assert_eq!((backward.hours(), backward.minutes()), (-1, -30));

        let odd = TimeSpan::from_seconds(-5410);
        assert_eq!((odd.hours(), odd.minutes()), (-1, -30));
    }

    #[test]
    fn span_of_invalid_endpoint_is_zero() {
        assert_eq!(TimeSpan::between(TimeOfDay::INVALID, hm(8, 0)), TimeSpan::ZERO);
        assert_eq!(TimeSpan::from(TimeInterval::INVALID), TimeSpan::ZERO);
    }

    #[test]
    fn span_display() {
        assert_eq!(TimeSpan::from_seconds(5400).to_string(), "1:30");
        assert_eq!(TimeSpan::from_seconds(-3600).to_string(), "-1:00");
        assert_eq!(TimeSpan::from_seconds(-300).to_string(), "-0:05");
        assert_eq!(TimeSpan::ZERO.to_string(), "0:00");
    }

    #[test]
    fn span_arithmetic() {
        let total: TimeSpan = [1800, -600, 60]
            .into_iter()
            .map(TimeSpan::from_seconds)
            .sum();
        assert_eq!(total.seconds(), 1260);

        let mut running = TimeSpan::ZERO;
        running -= TimeSpan::from_seconds(3600);
        running += TimeSpan::from_seconds(600);
        assert_eq!(running, -TimeSpan::from_seconds(3000));
    }
}
