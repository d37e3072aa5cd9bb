//! duration, yearMonthDuration and dayTimeDuration
//!
//! A duration is kept as a signed month count and a signed second count.
//! Durations are partially ordered: when months and seconds disagree the
//! order is decided by adding both to four reference dateTimes, and is
//! indeterminate unless all four agree.

use super::{TypeValidator, ValueOrder};
use crate::error::{ValueError, ValueResult};
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;

/// Reference dateTimes `(year, month)` of the duration order, all on day 1
const REFERENCE_DATES: [(i64, i64); 4] = [(1696, 9), (1697, 2), (1903, 3), (1903, 7)];

/// Value of a duration
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationValue {
    /// Year and month part, in months
    pub months: i64,
    /// Day and time part, in seconds
    pub seconds: Decimal,
}

impl DurationValue {
    pub fn new(months: i64, seconds: Decimal) -> Self {
        Self { months, seconds }
    }

    fn is_negative(&self) -> bool {
        self.months < 0 || (self.seconds.is_sign_negative() && !self.seconds.is_zero())
    }

    /// Instant reached by adding this duration to a reference date
    fn from_reference(&self, year: i64, month: i64) -> Option<Decimal> {
        let total = (year * 12 + month - 1).checked_add(self.months)?;
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        let month = (total.rem_euclid(12) + 1) as u32;
        let days = NaiveDate::from_ymd_opt(year, month, 1)?.num_days_from_ce() as i64;
        Decimal::from(days)
            .checked_mul(Decimal::from(86_400))?
            .checked_add(self.seconds)
    }

    /// Partial order between two durations
    pub fn order(&self, other: &DurationValue) -> ValueOrder {
        let by_months: ValueOrder = self.months.cmp(&other.months).into();
        let by_seconds: ValueOrder = self.seconds.cmp(&other.seconds).into();
        if by_months == ValueOrder::Equal || by_months == by_seconds {
            return by_seconds;
        }
        if by_seconds == ValueOrder::Equal {
            return by_months;
        }

        let mut result = None;
        for (year, month) in REFERENCE_DATES {
            let order = match (
                self.from_reference(year, month),
                other.from_reference(year, month),
            ) {
                (Some(a), Some(b)) => ValueOrder::from(a.cmp(&b)),
                _ => return ValueOrder::Indeterminate,
            };
            match result {
                None => result = Some(order),
                Some(previous) if previous != order => return ValueOrder::Indeterminate,
                Some(_) => {}
            }
        }
        result.unwrap_or(ValueOrder::Indeterminate)
    }
}

impl PartialEq for DurationValue {
    fn eq(&self, other: &Self) -> bool {
        self.months == other.months && self.seconds == other.seconds
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        f.write_str("P")?;

        let months = self.months.unsigned_abs();
        let seconds = self.seconds.abs();
        if months == 0 && seconds.is_zero() {
            return f.write_str("T0S");
        }
        let (years, months) = (months / 12, months % 12);
        if years > 0 {
            write!(f, "{}Y", years)?;
        }
        if months > 0 {
            write!(f, "{}M", months)?;
        }

        let whole = seconds.trunc();
        let fraction = (seconds - whole).normalize();
        let whole = whole.to_u64().unwrap_or(u64::MAX);
        let (days, rest) = (whole / 86_400, whole % 86_400);
        let (hours, rest) = (rest / 3_600, rest % 3_600);
        let (minutes, secs) = (rest / 60, rest % 60);
        if days > 0 {
            write!(f, "{}D", days)?;
        }
        if hours > 0 || minutes > 0 || secs > 0 || !fraction.is_zero() {
            f.write_str("T")?;
            if hours > 0 {
                write!(f, "{}H", hours)?;
            }
            if minutes > 0 {
                write!(f, "{}M", minutes)?;
            }
            if secs > 0 || !fraction.is_zero() {
                let value = (Decimal::from(secs) + fraction).normalize();
                write!(f, "{}S", value)?;
            }
        }
        Ok(())
    }
}

/// Which components a duration kind accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFlavor {
    Full,
    /// Years and months only
    YearMonth,
    /// Days, hours, minutes and seconds only
    DayTime,
}

impl DurationFlavor {
    fn type_name(&self) -> &'static str {
        match self {
            DurationFlavor::Full => "duration",
            DurationFlavor::YearMonth => "yearMonthDuration",
            DurationFlavor::DayTime => "dayTimeDuration",
        }
    }
}

/// Read an unsigned component number followed by its designator
fn take_number<'a>(rest: &mut &'a str) -> Option<(&'a str, char)> {
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let number = &rest[..end];
    let designator = rest[end..].chars().next()?;
    *rest = &rest[end + designator.len_utf8()..];
    Some((number, designator))
}

fn integer_part(number: &str) -> Option<i64> {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    number.parse().ok()
}

/// `value` units of `unit` seconds added to `seconds`, or `None` on overflow
fn add_seconds(seconds: Decimal, value: i64, unit: i64) -> Option<Decimal> {
    seconds.checked_add(Decimal::from(value).checked_mul(Decimal::from(unit))?)
}

fn seconds_part(number: &str) -> Option<Decimal> {
    let (int, frac) = number.split_once('.').unwrap_or((number, ""));
    if int.is_empty() || (number.contains('.') && frac.is_empty()) {
        return None;
    }
    super::numeric::parse_decimal(number)
}

/// Parse a duration lexical form restricted to a flavor
pub(crate) fn parse_duration(content: &str, flavor: DurationFlavor) -> Option<DurationValue> {
    let (negative, body) = match content.strip_prefix('-') {
        Some(body) => (true, body),
        None => (false, content),
    };
    let mut rest = body.strip_prefix('P')?;
    let (date_part, time_part) = match rest.find('T') {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };

    let mut months: i64 = 0;
    let mut seconds = Decimal::ZERO;
    let mut seen_any = false;

    // date designators must appear in order Y, M, D
    rest = date_part;
    let mut order = 0;
    while !rest.is_empty() {
        let (number, designator) = take_number(&mut rest)?;
        let value = integer_part(number)?;
        let position = match designator {
            'Y' if flavor != DurationFlavor::DayTime => {
                months = months.checked_add(value.checked_mul(12)?)?;
                1
            }
            'M' if flavor != DurationFlavor::DayTime => {
                months = months.checked_add(value)?;
                2
            }
            'D' if flavor != DurationFlavor::YearMonth => {
                seconds = add_seconds(seconds, value, 86_400)?;
                3
            }
            _ => return None,
        };
        if position <= order {
            return None;
        }
        order = position;
        seen_any = true;
    }

    if let Some(time) = time_part {
        if flavor == DurationFlavor::YearMonth || time.is_empty() {
            return None;
        }
        rest = time;
        let mut order = 0;
        while !rest.is_empty() {
            let (number, designator) = take_number(&mut rest)?;
            let position = match designator {
                'H' => {
                    seconds = add_seconds(seconds, integer_part(number)?, 3_600)?;
                    1
                }
                'M' => {
                    seconds = add_seconds(seconds, integer_part(number)?, 60)?;
                    2
                }
                'S' => {
                    seconds = seconds.checked_add(seconds_part(number)?)?;
                    3
                }
                _ => return None,
            };
            if position <= order {
                return None;
            }
            order = position;
            seen_any = true;
        }
    }

    if !seen_any {
        return None;
    }
    if negative {
        months = -months;
        seconds = -seconds;
    }
    Some(DurationValue::new(months, seconds))
}

/// duration and its two XSD 1.1 restrictions
#[derive(Debug, Clone, Copy)]
pub struct DurationDv(pub DurationFlavor);

impl TypeValidator for DurationDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::ORDERED_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        parse_duration(content, self.0)
            .map(ActualValue::Duration)
            .ok_or_else(|| ValueError::invalid_lexical(content, self.0.type_name()))
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrder {
        match (a, b) {
            (ActualValue::Duration(a), ActualValue::Duration(b)) => a.order(b),
            _ => ValueOrder::Indeterminate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::context::EmptyContext;

    fn duration(s: &str) -> DurationValue {
        parse_duration(s, DurationFlavor::Full).unwrap()
    }

    #[test]
    fn test_parse_components() {
        let d = duration("P1Y2M3DT4H5M6.5S");
        assert_eq!(d.months, 14);
        assert_eq!(d.seconds, Decimal::new(3 * 86_400 + 4 * 3_600 + 5 * 60 + 6, 0) + Decimal::new(5, 1));
        assert_eq!(duration("-PT1M").seconds, Decimal::from(-60));
    }

    #[test]
    fn test_reject_malformed() {
        for bad in ["P", "PT", "P1H", "PT1D", "P1M1Y", "P1.5Y", "PT1.S", "1Y", "P-1Y", "+P1Y"] {
            assert!(parse_duration(bad, DurationFlavor::Full).is_none(), "{}", bad);
        }
    }

    #[test]
    fn test_flavors() {
        assert!(parse_duration("P1Y3M", DurationFlavor::YearMonth).is_some());
        assert!(parse_duration("P1D", DurationFlavor::YearMonth).is_none());
        assert!(parse_duration("P1DT2H", DurationFlavor::DayTime).is_some());
        assert!(parse_duration("P1Y", DurationFlavor::DayTime).is_none());
        let err = DurationDv(DurationFlavor::DayTime)
            .parse("P1M", &EmptyContext)
            .unwrap_err();
        assert_eq!(err.args[1], "dayTimeDuration");
    }

    #[test]
    fn test_partial_order() {
        assert_eq!(duration("P1Y").order(&duration("P12M")), ValueOrder::Equal);
        assert_eq!(duration("P1Y").order(&duration("P364D")), ValueOrder::Greater);
        assert_eq!(duration("P1Y").order(&duration("P365D")), ValueOrder::Indeterminate);
        assert_eq!(duration("P1M").order(&duration("P27D")), ValueOrder::Greater);
        assert_eq!(duration("P1M").order(&duration("P30D")), ValueOrder::Indeterminate);
        assert_eq!(duration("PT36H").order(&duration("P1D")), ValueOrder::Greater);
    }

    #[test]
    fn test_oversized_components_are_rejected() {
        for huge in [
            "P9223372036854775807DT79228162514264337593543950335S",
            "PT9223372036854775807H9223372036854775807M79228162514264337593543950335S",
            "-P9223372036854775807Y",
        ] {
            assert!(parse_duration(huge, DurationFlavor::Full).is_none(), "{}", huge);
            let err = DurationDv(DurationFlavor::Full)
                .parse(huge, &EmptyContext)
                .unwrap_err();
            assert_eq!(err.key(), "cvc-datatype-valid.1.2.1");
        }
        assert!(parse_duration("P9223372036854775807D", DurationFlavor::Full).is_some());
    }

    #[test]
    fn test_order_past_decimal_range_is_indeterminate() {
        let huge = DurationValue::new(-1, Decimal::MAX);
        assert_eq!(huge.order(&DurationValue::default()), ValueOrder::Indeterminate);
        assert_eq!(DurationValue::default().order(&huge), ValueOrder::Indeterminate);
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(duration("P0Y").to_string(), "PT0S");
        assert_eq!(duration("P13M").to_string(), "P1Y1M");
        assert_eq!(duration("PT90M").to_string(), "PT1H30M");
        assert_eq!(duration("-P1DT0.50S").to_string(), "-P1DT0.5S");
    }
}
