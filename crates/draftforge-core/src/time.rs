//! Microsecond-tick time model.
//!
//! Every timing field in a draft is an integer count of microseconds
//! ("ticks"). Human-facing duration strings like `"4.2s"` are parsed
//! digit-exact into ticks so that repeated parse/format cycles never
//! drift, and all arithmetic on ticks is checked.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{DraftError, Result};

/// Ticks per second.
pub const SEC: i64 = 1_000_000;

/// Ticks per millisecond.
pub const MILLI: i64 = 1_000;

/// A point in time or a duration, in microseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ticks(pub i64);

impl Ticks {
    /// Zero ticks.
    pub const ZERO: Self = Self(0);

    /// Create from whole seconds.
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * SEC)
    }

    /// Create from whole milliseconds.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * MILLI)
    }

    /// Raw microsecond count.
    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Seconds as f64, for interpolation math only (never serialized).
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / SEC as f64
    }

    /// Checked addition; overflow is an [`DraftError::InvalidRange`].
    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| DraftError::InvalidRange(format!("{} + {} overflows", self.0, rhs.0)))
    }

    /// Checked subtraction; overflow is an [`DraftError::InvalidRange`].
    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(|| DraftError::InvalidRange(format!("{} - {} overflows", self.0, rhs.0)))
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Ticks {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Ticks {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_duration(*self))
    }
}

/// Parse a human duration string into ticks.
///
/// Accepts `"<number>s"` with integer or decimal seconds, and compound
/// forms such as `"1h30m"` or `"2m3.5s"`. Hours and minutes must be
/// integers; only the seconds component may carry a decimal part, which
/// is parsed digit-exact (rounded at the seventh fractional digit).
/// Negative or non-numeric input fails with
/// [`DraftError::MalformedDuration`].
pub fn parse_duration(text: &str) -> Result<Ticks> {
    let malformed = || DraftError::MalformedDuration(text.to_string());
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
        return Err(malformed());
    }

    let mut total: i64 = 0;
    let mut rest = trimmed;
    // Units must appear in h -> m -> s order, each at most once.
    let mut allowed = &["h", "m", "s"][..];
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(malformed)?;
        if num_len == 0 {
            return Err(malformed());
        }
        let (number, tail) = rest.split_at(num_len);
        let unit_len = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let pos = allowed.iter().position(|u| *u == unit).ok_or_else(malformed)?;
        allowed = &allowed[pos + 1..];

        let ticks = match unit {
            "s" => parse_decimal_seconds(number).ok_or_else(malformed)?,
            // Hours and minutes are whole numbers.
            "h" | "m" => {
                let value: i64 = number.parse().map_err(|_| malformed())?;
                let per_unit = if unit == "h" { 3600 * SEC } else { 60 * SEC };
                value.checked_mul(per_unit).ok_or_else(malformed)?
            }
            _ => return Err(malformed()),
        };
        total = total.checked_add(ticks).ok_or_else(malformed)?;
        rest = tail;
    }
    Ok(Ticks(total))
}

/// Parse `"<int>[.<frac>]"` seconds into ticks without going through f64.
fn parse_decimal_seconds(number: &str) -> Option<i64> {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let whole: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    if !frac_part.is_empty() && !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // Scale the fractional digits to microseconds, rounding at digit 7.
    let mut frac: i64 = 0;
    for (i, b) in frac_part.bytes().enumerate() {
        let digit = (b - b'0') as i64;
        match i {
            0..=5 => frac = frac * 10 + digit,
            6 => {
                if digit >= 5 {
                    frac += 1;
                }
                break;
            }
            _ => break,
        }
    }
    let scale = 10_i64.pow(6_u32.saturating_sub(frac_part.len().min(6) as u32));
    whole.checked_mul(SEC)?.checked_add(frac * scale)
}

/// Format ticks as a duration string.
///
/// Left-inverse of [`parse_duration`] for plain `"<number>s"` inputs:
/// `format_duration(parse_duration(s)?) == s` whenever `s` is already in
/// canonical form (no compound units, no trailing zeros).
pub fn format_duration(ticks: Ticks) -> String {
    let sign = if ticks.0 < 0 { "-" } else { "" };
    let abs = ticks.0.unsigned_abs();
    let secs = abs / SEC as u64;
    let micros = abs % SEC as u64;
    if micros == 0 {
        format!("{sign}{secs}s")
    } else {
        let frac = format!("{micros:06}");
        format!("{sign}{secs}.{}s", frac.trim_end_matches('0'))
    }
}

/// A half-open time range `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timerange {
    /// Start tick (inclusive).
    pub start: Ticks,
    /// Duration in ticks.
    pub duration: Ticks,
}

impl Timerange {
    /// Create a range from start and duration.
    #[inline]
    pub const fn new(start: Ticks, duration: Ticks) -> Self {
        Self { start, duration }
    }

    /// Create a validated range: start non-negative, duration positive,
    /// end representable.
    pub fn checked(start: Ticks, duration: Ticks) -> Result<Self> {
        if start.is_negative() {
            return Err(DraftError::InvalidRange(format!(
                "negative start {}",
                start.0
            )));
        }
        if duration.0 <= 0 {
            return Err(DraftError::InvalidRange(format!(
                "non-positive duration {}",
                duration.0
            )));
        }
        start.checked_add(duration)?;
        Ok(Self { start, duration })
    }

    /// End tick (exclusive).
    #[inline]
    pub fn end(self) -> Ticks {
        self.start + self.duration
    }

    /// Whether two ranges intersect.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Whether a tick falls inside this range.
    pub fn contains(self, time: Ticks) -> bool {
        time >= self.start && time < self.end()
    }
}

/// Compose two duration strings into a validated range.
///
/// `trange("1s", "3s")` is the range starting at one second and lasting
/// three.
pub fn trange(start: &str, duration: &str) -> Result<Timerange> {
    Timerange::checked(parse_duration(start)?, parse_duration(duration)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_plain_seconds() {
        assert_eq!(parse_duration("3s").unwrap(), Ticks(3_000_000));
        assert_eq!(parse_duration("4.2s").unwrap(), Ticks(4_200_000));
        assert_eq!(parse_duration("0s").unwrap(), Ticks::ZERO);
        assert_eq!(parse_duration("0.000001s").unwrap(), Ticks(1));
    }

    #[test]
    fn parse_compound_units() {
        assert_eq!(parse_duration("1h").unwrap(), Ticks(3600 * SEC));
        assert_eq!(parse_duration("1m30s").unwrap(), Ticks(90 * SEC));
        assert_eq!(
            parse_duration("1h2m3.5s").unwrap(),
            Ticks((3600 + 120 + 3) * SEC + 500_000)
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "s", "3", "-3s", "+3s", "3x", "abc", "3s4s", "2s1h", "1..5s"] {
            assert!(
                matches!(parse_duration(bad), Err(DraftError::MalformedDuration(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn format_trims_trailing_zeros() {
        assert_eq!(format_duration(Ticks(4_200_000)), "4.2s");
        assert_eq!(format_duration(Ticks(3_000_000)), "3s");
        assert_eq!(format_duration(Ticks(0)), "0s");
        assert_eq!(format_duration(Ticks(1)), "0.000001s");
    }

    #[test]
    fn range_end_and_overlap() {
        let a = trange("0s", "3s").unwrap();
        let b = trange("3s", "2s").unwrap();
        assert_eq!(a.end(), Ticks(3_000_000));
        assert!(!a.overlaps(b));
        assert!(a.overlaps(Timerange::new(Ticks(2_999_999), Ticks(1))));
    }

    #[test]
    fn checked_range_rejects_bad_input() {
        assert!(Timerange::checked(Ticks(-1), Ticks(1)).is_err());
        assert!(Timerange::checked(Ticks(0), Ticks(0)).is_err());
        assert!(Timerange::checked(Ticks(i64::MAX), Ticks(1)).is_err());
    }

    #[test]
    fn checked_arithmetic_overflow() {
        assert!(Ticks(i64::MAX).checked_add(Ticks(1)).is_err());
        assert!(Ticks(i64::MIN).checked_sub(Ticks(1)).is_err());
    }

    proptest! {
        #[test]
        fn format_parse_roundtrip(micros in 0_i64..=86_400 * SEC) {
            let text = format_duration(Ticks(micros));
            prop_assert_eq!(parse_duration(&text).unwrap(), Ticks(micros));
        }
    }
}
