//! Calendar kinds: dateTime, time, date and the gregorian partial dates
//!
//! Every calendar value is placed on a single timeline: missing fields take
//! the reference values year 1972, month 12, day 1, and values are compared
//! as seconds since the start of the common era. Values with and without a
//! timezone are ordered only when they differ by more than 14 hours.

use super::{TypeValidator, ValueOrder};
use crate::error::{ValueError, ValueResult};
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

const REFERENCE_YEAR: i64 = 1972;
const REFERENCE_MONTH: u32 = 12;
const REFERENCE_DAY: u32 = 1;
const SECONDS_PER_DAY: i64 = 86_400;
const FOURTEEN_HOURS: i64 = 14 * 3_600;

/// The eight calendar datatypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CalendarKind {
    DateTime,
    Time,
    Date,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
}

impl CalendarKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            CalendarKind::DateTime => "dateTime",
            CalendarKind::Time => "time",
            CalendarKind::Date => "date",
            CalendarKind::GYearMonth => "gYearMonth",
            CalendarKind::GYear => "gYear",
            CalendarKind::GMonthDay => "gMonthDay",
            CalendarKind::GDay => "gDay",
            CalendarKind::GMonth => "gMonth",
        }
    }

    fn has_time(&self) -> bool {
        matches!(self, CalendarKind::DateTime | CalendarKind::Time)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

static LEXICAL_FORMS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(?P<year>-?[0-9]{4,})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})T(?P<hour>[0-9]{2}):(?P<minute>[0-9]{2}):(?P<second>[0-9]{2}(?:\.[0-9]+)?)(?P<tz>Z|[+-][0-9]{2}:[0-9]{2})?$",
        r"^(?P<hour>[0-9]{2}):(?P<minute>[0-9]{2}):(?P<second>[0-9]{2}(?:\.[0-9]+)?)(?P<tz>Z|[+-][0-9]{2}:[0-9]{2})?$",
        r"^(?P<year>-?[0-9]{4,})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})(?P<tz>Z|[+-][0-9]{2}:[0-9]{2})?$",
        r"^(?P<year>-?[0-9]{4,})-(?P<month>[0-9]{2})(?P<tz>Z|[+-][0-9]{2}:[0-9]{2})?$",
        r"^(?P<year>-?[0-9]{4,})(?P<tz>Z|[+-][0-9]{2}:[0-9]{2})?$",
        r"^--(?P<month>[0-9]{2})-(?P<day>[0-9]{2})(?P<tz>Z|[+-][0-9]{2}:[0-9]{2})?$",
        r"^---(?P<day>[0-9]{2})(?P<tz>Z|[+-][0-9]{2}:[0-9]{2})?$",
        r"^--(?P<month>[0-9]{2})(?:--)?(?P<tz>Z|[+-][0-9]{2}:[0-9]{2})?$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("calendar pattern compiles"))
    .collect()
});

/// XSD years have no year zero; chrono counts 1 BCE as year 0
fn to_chrono_year(year: i64) -> Option<i32> {
    let year = if year < 0 { year + 1 } else { year };
    i32::try_from(year).ok()
}

fn from_chrono_year(year: i32) -> i64 {
    let year = year as i64;
    if year <= 0 {
        year - 1
    } else {
        year
    }
}

fn days_from_ce(year: i64, month: u32, day: u32) -> Option<i64> {
    let first = NaiveDate::from_ymd_opt(to_chrono_year(year)?, month, 1)?;
    Some(first.num_days_from_ce() as i64 + day as i64 - 1)
}

/// Value of a calendar datatype
#[derive(Debug, Clone, Copy)]
pub struct DateTimeValue {
    pub kind: CalendarKind,
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: Decimal,
    /// Offset from UTC in minutes
    pub timezone: Option<i32>,
    days: i64,
}

impl DateTimeValue {
    /// Seconds since the start of the era, timezone ignored
    fn local_seconds(&self) -> Decimal {
        let whole = self.days * SECONDS_PER_DAY
            + self.hour as i64 * 3_600
            + self.minute as i64 * 60;
        Decimal::from(whole) + self.second
    }

    /// Seconds since the start of the era in UTC; local time when no
    /// timezone is given
    fn instant(&self) -> Decimal {
        let offset = self.timezone.unwrap_or(0) as i64 * 60;
        self.local_seconds() - Decimal::from(offset)
    }

    /// Partial order on the timeline
    pub fn order(&self, other: &DateTimeValue) -> ValueOrder {
        let window = Decimal::from(FOURTEEN_HOURS);
        match (self.timezone, other.timezone) {
            (Some(_), Some(_)) | (None, None) => self.instant().cmp(&other.instant()).into(),
            (Some(_), None) => {
                let p = self.instant();
                let q = other.local_seconds();
                if p < q - window {
                    ValueOrder::Less
                } else if p > q + window {
                    ValueOrder::Greater
                } else {
                    ValueOrder::Indeterminate
                }
            }
            (None, Some(_)) => {
                let p = self.local_seconds();
                let q = other.instant();
                if p + window < q {
                    ValueOrder::Less
                } else if p - window > q {
                    ValueOrder::Greater
                } else {
                    ValueOrder::Indeterminate
                }
            }
        }
    }

    fn write_year(f: &mut fmt::Formatter<'_>, year: i64) -> fmt::Result {
        if year < 0 {
            write!(f, "-{:04}", -year)
        } else {
            write!(f, "{:04}", year)
        }
    }

    fn write_time(f: &mut fmt::Formatter<'_>, hour: u32, minute: u32, second: Decimal) -> fmt::Result {
        let second = second.normalize();
        let pad = if second < Decimal::TEN { "0" } else { "" };
        write!(f, "{:02}:{:02}:{}{}", hour, minute, pad, second)
    }

    fn write_timezone(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timezone {
            None => Ok(()),
            Some(0) => f.write_str("Z"),
            Some(tz) => {
                let sign = if tz < 0 { '-' } else { '+' };
                let tz = tz.abs();
                write!(f, "{}{:02}:{:02}", sign, tz / 60, tz % 60)
            }
        }
    }

    /// UTC date, second of day and second within the minute
    fn utc_parts(&self) -> Option<(NaiveDate, u32, Decimal)> {
        let instant = self.instant();
        let day_length = Decimal::from(SECONDS_PER_DAY);
        let days = (instant / day_length).floor();
        let rest = instant - days * day_length;
        let date = days.to_i32().and_then(NaiveDate::from_num_days_from_ce_opt)?;
        let whole = rest.trunc().to_u32()?;
        Some((date, whole, Decimal::from(whole % 60) + rest.fract()))
    }

    /// dateTime and time render in UTC, with 24:00:00 rolled over
    ///
    /// Values whose UTC form falls outside the supported calendar are
    /// written as given.
    fn write_normalized(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((date, whole, second)) = self.utc_parts() else {
            if self.kind == CalendarKind::DateTime {
                Self::write_year(f, self.year)?;
                write!(f, "-{:02}-{:02}T", self.month, self.day)?;
            }
            Self::write_time(f, self.hour, self.minute, self.second)?;
            return self.write_timezone(f);
        };

        if self.kind == CalendarKind::DateTime {
            Self::write_year(f, from_chrono_year(date.year()))?;
            write!(f, "-{:02}-{:02}T", date.month(), date.day())?;
        }
        Self::write_time(f, whole / 3_600, whole % 3_600 / 60, second)?;
        if self.timezone.is_some() {
            f.write_str("Z")?;
        }
        Ok(())
    }
}

impl PartialEq for DateTimeValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.order(other) == ValueOrder::Equal
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CalendarKind::DateTime | CalendarKind::Time => return self.write_normalized(f),
            CalendarKind::Date => {
                Self::write_year(f, self.year)?;
                write!(f, "-{:02}-{:02}", self.month, self.day)?;
            }
            CalendarKind::GYearMonth => {
                Self::write_year(f, self.year)?;
                write!(f, "-{:02}", self.month)?;
            }
            CalendarKind::GYear => Self::write_year(f, self.year)?,
            CalendarKind::GMonthDay => write!(f, "--{:02}-{:02}", self.month, self.day)?,
            CalendarKind::GDay => write!(f, "---{:02}", self.day)?,
            CalendarKind::GMonth => write!(f, "--{:02}", self.month)?,
        }
        self.write_timezone(f)
    }
}

fn field<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<Option<T>> {
    match caps.name(name) {
        Some(m) => m.as_str().parse().ok().map(Some),
        None => Some(None),
    }
}

fn parse_timezone(tz: &str) -> Option<i32> {
    if tz == "Z" {
        return Some(0);
    }
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let hours: i32 = tz[1..3].parse().ok()?;
    let minutes: i32 = tz[4..6].parse().ok()?;
    if hours > 14 || minutes > 59 || (hours == 14 && minutes != 0) {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

/// Parse the lexical form of a calendar kind
pub(crate) fn parse_calendar(content: &str, kind: CalendarKind) -> Option<DateTimeValue> {
    let caps = LEXICAL_FORMS[kind.index()].captures(content)?;

    let year = match caps.name("year") {
        Some(m) => {
            let digits = m.as_str().trim_start_matches('-');
            if digits.len() > 4 && digits.starts_with('0') {
                return None;
            }
            let year: i64 = m.as_str().parse().ok()?;
            if year == 0 {
                return None;
            }
            year
        }
        None => REFERENCE_YEAR,
    };
    let month = field::<u32>(&caps, "month")?.unwrap_or(REFERENCE_MONTH);
    let day = field::<u32>(&caps, "day")?.unwrap_or(REFERENCE_DAY);
    let hour = field::<u32>(&caps, "hour")?.unwrap_or(0);
    let minute = field::<u32>(&caps, "minute")?.unwrap_or(0);
    let second = match caps.name("second") {
        Some(m) => super::numeric::parse_decimal(m.as_str())?,
        None => Decimal::ZERO,
    };
    let timezone = match caps.name("tz") {
        Some(m) => Some(parse_timezone(m.as_str())?),
        None => None,
    };

    if !(1..=12).contains(&month) || day == 0 {
        return None;
    }
    // the day must exist in its month; the reference year is a leap year
    NaiveDate::from_ymd_opt(to_chrono_year(year)?, month, day)?;

    if kind.has_time() {
        let midnight = hour == 24 && minute == 0 && second.is_zero();
        if (hour > 23 && !midnight) || minute > 59 || second >= Decimal::from(60) {
            return None;
        }
    }

    Some(DateTimeValue {
        kind,
        year,
        month,
        day,
        hour,
        minute,
        second,
        timezone,
        days: days_from_ce(year, month, day)?,
    })
}

/// Validator for one calendar kind
#[derive(Debug, Clone, Copy)]
pub struct CalendarDv(pub CalendarKind);

impl TypeValidator for CalendarDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::ORDERED_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        parse_calendar(content, self.0)
            .map(ActualValue::DateTime)
            .ok_or_else(|| ValueError::invalid_lexical(content, self.0.type_name()))
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrder {
        match (a, b) {
            (ActualValue::DateTime(a), ActualValue::DateTime(b)) => a.order(b),
            _ => ValueOrder::Indeterminate,
        }
    }

    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        match (a, b) {
            (ActualValue::DateTime(a), ActualValue::DateTime(b)) => {
                a == b && a.timezone == b.timezone
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cal(kind: CalendarKind, s: &str) -> DateTimeValue {
        parse_calendar(s, kind).unwrap_or_else(|| panic!("{} should parse", s))
    }

    #[test]
    fn test_lexical_forms() {
        assert!(parse_calendar("2020-01-01T00:00:00", CalendarKind::DateTime).is_some());
        assert!(parse_calendar("2020-01-01T24:00:00Z", CalendarKind::DateTime).is_some());
        assert!(parse_calendar("-0044-03-15", CalendarKind::Date).is_some());
        assert!(parse_calendar("12345-01", CalendarKind::GYearMonth).is_some());
        assert!(parse_calendar("--02-29", CalendarKind::GMonthDay).is_some());
        assert!(parse_calendar("---31+14:00", CalendarKind::GDay).is_some());
        assert!(parse_calendar("--12--", CalendarKind::GMonth).is_some());

        for (kind, bad) in [
            (CalendarKind::Date, "0000-01-01"),
            (CalendarKind::Date, "2021-02-29"),
            (CalendarKind::Date, "01234-01-01"),
            (CalendarKind::DateTime, "2020-01-01T24:00:01"),
            (CalendarKind::DateTime, "2020-01-01"),
            (CalendarKind::Time, "12:60:00"),
            (CalendarKind::Time, "12:00:00+14:30"),
            (CalendarKind::GYear, "99"),
            (CalendarKind::GMonth, "--13"),
        ] {
            assert!(parse_calendar(bad, kind).is_none(), "{}", bad);
        }
    }

    #[test]
    fn test_timezone_normalization() {
        let a = cal(CalendarKind::DateTime, "2002-10-10T12:00:00-05:00");
        let b = cal(CalendarKind::DateTime, "2002-10-10T17:00:00Z");
        assert_eq!(a.order(&b), ValueOrder::Equal);
        assert_eq!(a.to_string(), "2002-10-10T17:00:00Z");
    }

    #[test]
    fn test_fourteen_hour_rule() {
        let zoned = cal(CalendarKind::DateTime, "2000-01-15T12:00:00Z");
        let close = cal(CalendarKind::DateTime, "2000-01-16T00:00:00");
        let far = cal(CalendarKind::DateTime, "2000-01-16T12:00:00");
        assert_eq!(zoned.order(&close), ValueOrder::Indeterminate);
        assert_eq!(zoned.order(&far), ValueOrder::Less);
        assert_eq!(far.order(&zoned), ValueOrder::Greater);
    }

    #[test]
    fn test_midnight_rolls_over() {
        let end = cal(CalendarKind::DateTime, "1999-12-31T24:00:00");
        let start = cal(CalendarKind::DateTime, "2000-01-01T00:00:00");
        assert_eq!(end.order(&start), ValueOrder::Equal);
        assert_eq!(end.to_string(), "2000-01-01T00:00:00");
    }

    #[test]
    fn test_display_past_calendar_range_keeps_lexical_form() {
        let last = cal(CalendarKind::DateTime, "262142-12-31T23:00:00-05:00");
        assert_eq!(last.to_string(), "262142-12-31T23:00:00-05:00");
        assert_eq!(
            cal(CalendarKind::DateTime, "262142-12-31T23:00:00+05:00").to_string(),
            "262142-12-31T18:00:00Z"
        );

        let dv = CalendarDv(CalendarKind::DateTime);
        let value = dv
            .parse("262142-12-31T23:00:00-05:00", &crate::validators::context::EmptyContext)
            .unwrap();
        assert_eq!(value.to_string(), "262142-12-31T23:00:00-05:00");
    }

    #[test]
    fn test_partial_date_display_keeps_timezone() {
        assert_eq!(cal(CalendarKind::Date, "2002-10-10+13:00").to_string(), "2002-10-10+13:00");
        assert_eq!(cal(CalendarKind::GDay, "---05Z").to_string(), "---05Z");
        assert_eq!(cal(CalendarKind::GYear, "-0044").to_string(), "-0044");
        assert_eq!(cal(CalendarKind::Time, "13:20:00.50-05:00").to_string(), "18:20:00.5Z");
    }

    #[test]
    fn test_identity_keeps_timezone() {
        let dv = CalendarDv(CalendarKind::Time);
        let a = ActualValue::DateTime(cal(CalendarKind::Time, "12:00:00Z"));
        let b = ActualValue::DateTime(cal(CalendarKind::Time, "13:00:00+01:00"));
        assert_eq!(dv.compare(&a, &b), ValueOrder::Equal);
        assert!(!dv.is_identical(&a, &b));
        assert!(dv.is_identical(&a, &a));
    }
}
