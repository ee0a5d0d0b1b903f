//! Simulation time model.
//!
//! # Design
//!
//! Time is an absolute `Timestamp` in integer milliseconds since the Unix
//! epoch.  Event data carries wall-clock datetimes (`"4/25/2014 0:00:00"`),
//! and edge speeds vary by hour-of-day and weekday/weekend, so the canonical
//! representation must support calendar queries — but a full datetime crate
//! is overkill for the three we need.  `hour_of_day` and `day_kind` fall out
//! of epoch-day arithmetic, and parsing/formatting use the standard
//! civil-from-days algorithms, all exact in integer math.
//!
//! Durations in the public API are `f64` minutes.  `advance_minutes` rounds
//! to the nearest millisecond, so chained advances accumulate at most 0.5 ms
//! of error per step.

use std::fmt;

use crate::error::{CoreError, CoreResult};

const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;

// ── DayKind ───────────────────────────────────────────────────────────────────

/// Weekday/weekend classification used to select an edge's speed table.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl fmt::Display for DayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayKind::Weekday => write!(f, "weekday"),
            DayKind::Weekend => write!(f, "weekend"),
        }
    }
}

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// An absolute instant, stored as milliseconds since the Unix epoch.
///
/// `i64` milliseconds span ±292 million years, so overflow is not a practical
/// concern.  Ordering and equality are exact integer comparisons.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_secs(secs: i64) -> Timestamp {
        Timestamp(secs * 1_000)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Hour of day in UTC, `0..=23`.
    #[inline]
    pub fn hour_of_day(self) -> u8 {
        self.0.div_euclid(MS_PER_HOUR).rem_euclid(24) as u8
    }

    /// Weekday/weekend classification of the calendar day containing `self`.
    ///
    /// Epoch day 0 (1970-01-01) was a Thursday, so `(days + 3) mod 7` yields
    /// a Monday-based weekday number; Saturday and Sunday are 5 and 6.
    #[inline]
    pub fn day_kind(self) -> DayKind {
        let days = self.0.div_euclid(MS_PER_DAY);
        if (days + 3).rem_euclid(7) >= 5 {
            DayKind::Weekend
        } else {
            DayKind::Weekday
        }
    }

    /// The instant `minutes` later (or earlier, if negative), rounded to the
    /// nearest millisecond.
    #[inline]
    pub fn advance_minutes(self, minutes: f64) -> Timestamp {
        Timestamp(self.0 + (minutes * MS_PER_MINUTE).round() as i64)
    }

    /// Signed minutes elapsed from `earlier` to `self`.
    #[inline]
    pub fn minutes_since(self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0) as f64 / MS_PER_MINUTE
    }

    /// Parse a `"M/D/YYYY H:MM:SS"` datetime (the event-record format; field
    /// widths may be zero-padded or not) into a UTC timestamp.
    pub fn parse(s: &str) -> CoreResult<Timestamp> {
        let bad = |reason: &'static str| CoreError::Timestamp(s.to_string(), reason);

        let (date, time) = s.trim().split_once(' ').ok_or_else(|| bad("expected `date time`"))?;

        let mut date_parts = date.split('/');
        let month: u32 = next_field(&mut date_parts, s, "missing or malformed month")?;
        let day: u32 = next_field(&mut date_parts, s, "missing or malformed day")?;
        let year: i64 = next_field(&mut date_parts, s, "missing or malformed year")?;
        if date_parts.next().is_some() {
            return Err(bad("too many date fields"));
        }

        let mut time_parts = time.split(':');
        let hour: i64 = next_field(&mut time_parts, s, "missing or malformed hour")?;
        let minute: i64 = next_field(&mut time_parts, s, "missing or malformed minute")?;
        let second: i64 = next_field(&mut time_parts, s, "missing or malformed second")?;
        if time_parts.next().is_some() {
            return Err(bad("too many time fields"));
        }

        if !(1..=12).contains(&month) {
            return Err(bad("month out of range"));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(bad("day out of range"));
        }
        if !(0..=23).contains(&hour) || !(0..=59).contains(&minute) || !(0..=59).contains(&second) {
            return Err(bad("time of day out of range"));
        }

        let days = days_from_civil(year, month, day);
        let secs = days * 86_400 + hour * 3_600 + minute * 60 + second;
        Ok(Timestamp::from_secs(secs))
    }
}

impl fmt::Display for Timestamp {
    /// Renders in the same `"MM/DD/YYYY HH:MM:SS"` shape the parser accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.0.div_euclid(MS_PER_DAY);
        let ms_of_day = self.0.rem_euclid(MS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        let secs = ms_of_day / 1_000;
        write!(
            f,
            "{:02}/{:02}/{:04} {:02}:{:02}:{:02}",
            month,
            day,
            year,
            secs / 3_600,
            (secs % 3_600) / 60,
            secs % 60
        )
    }
}

// ── Calendar arithmetic ───────────────────────────────────────────────────────
//
// Howard Hinnant's days_from_civil / civil_from_days: exact conversion
// between (y, m, d) and days since 1970-01-01 using only integer ops, valid
// across the entire i64 range we care about.

fn days_from_civil(mut y: i64, m: u32, d: u32) -> i64 {
    y -= (m <= 2) as i64;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if m > 2 { m - 3 } else { m + 9 } as i64;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (y + (m <= 2) as i64, m, d)
}

fn days_in_month(y: i64, m: u32) -> u32 {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            let leap = (y % 4 == 0 && y % 100 != 0) || y % 400 == 0;
            if leap { 29 } else { 28 }
        }
    }
}

fn next_field<'a, T, I>(parts: &mut I, input: &str, reason: &'static str) -> CoreResult<T>
where
    T: std::str::FromStr,
    I: Iterator<Item = &'a str>,
{
    parts
        .next()
        .and_then(|p| p.trim().parse().ok())
        .ok_or_else(|| CoreError::Timestamp(input.to_string(), reason))
}
