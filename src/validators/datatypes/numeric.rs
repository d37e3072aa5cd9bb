//! Numeric kinds: decimal, integer, float, double and precisionDecimal

use super::{TypeValidator, ValueOrder};
use crate::error::{ValueError, ValueResult};
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;

static FLOATING_POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("floating point pattern compiles")
});

/// Split a decimal lexical form into its sign, integer and fraction digits
fn split_decimal(content: &str, allow_fraction: bool) -> Option<(bool, &str, &str)> {
    let (negative, body) = match content.as_bytes().first() {
        Some(b'-') => (true, &content[1..]),
        Some(b'+') => (false, &content[1..]),
        _ => (false, content),
    };
    let (int, frac) = match body.split_once('.') {
        Some((int, frac)) if allow_fraction => (int, frac),
        Some(_) => return None,
        None => (body, ""),
    };
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits(int) || !digits(frac) {
        return None;
    }
    Some((negative, int, frac))
}

/// Build an exact decimal from digit strings and a power of ten
///
/// Fails when the value does not fit the 96-bit mantissa or needs more than
/// 28 fraction digits.
fn build_decimal(negative: bool, int: &str, frac: &str, exponent: i64) -> Option<Decimal> {
    let frac = frac.trim_end_matches('0');
    let joined = format!("{}{}", int, frac);
    let digits = joined.trim_start_matches('0');
    if digits.is_empty() {
        return Some(Decimal::ZERO);
    }

    let mut mantissa: i128 = digits.parse().ok()?;
    let mut scale = i64::try_from(frac.len()).ok()?.checked_sub(exponent)?;
    if scale < 0 {
        let shift = u32::try_from(scale.unsigned_abs()).ok()?;
        mantissa = mantissa.checked_mul(10i128.checked_pow(shift)?)?;
        scale = 0;
    }
    if negative {
        mantissa = -mantissa;
    }
    let scale = u32::try_from(scale).ok().filter(|s| *s <= 28)?;
    Decimal::try_from_i128_with_scale(mantissa, scale)
        .ok()
        .map(|d| d.normalize())
}

/// Parse an xs:decimal lexical form
pub(crate) fn parse_decimal(content: &str) -> Option<Decimal> {
    let (negative, int, frac) = split_decimal(content, true)?;
    build_decimal(negative, int, frac, 0)
}

/// Parse an xs:integer lexical form
pub(crate) fn parse_integer(content: &str) -> Option<Decimal> {
    let (negative, int, frac) = split_decimal(content, false)?;
    build_decimal(negative, int, frac, 0)
}

fn decimal_fraction_digits(d: Decimal) -> usize {
    d.normalize().scale() as usize
}

fn decimal_total_digits(d: Decimal) -> usize {
    let d = d.normalize();
    let mantissa_digits = d.mantissa().unsigned_abs().to_string().len();
    mantissa_digits.max(d.scale() as usize)
}

fn compare_decimals(a: &ActualValue, b: &ActualValue) -> ValueOrder {
    match (a.as_decimal(), b.as_decimal()) {
        (Some(a), Some(b)) => a.cmp(&b).into(),
        _ => ValueOrder::Indeterminate,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecimalDv;

impl TypeValidator for DecimalDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::DECIMAL_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        parse_decimal(content)
            .map(ActualValue::Decimal)
            .ok_or_else(|| ValueError::invalid_lexical(content, "decimal"))
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrder {
        compare_decimals(a, b)
    }

    fn fraction_digits(&self, value: &ActualValue) -> usize {
        value.as_decimal().map(decimal_fraction_digits).unwrap_or(0)
    }

    fn total_digits(&self, value: &ActualValue) -> usize {
        value.as_decimal().map(decimal_total_digits).unwrap_or(0)
    }
}

/// integer: a decimal without a fraction part in its lexical form
#[derive(Debug, Clone, Copy)]
pub struct IntegerDv;

impl TypeValidator for IntegerDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::DECIMAL_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        parse_integer(content)
            .map(ActualValue::Integer)
            .ok_or_else(|| ValueError::invalid_lexical(content, "integer"))
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrder {
        compare_decimals(a, b)
    }

    fn fraction_digits(&self, value: &ActualValue) -> usize {
        value.as_decimal().map(decimal_fraction_digits).unwrap_or(0)
    }

    fn total_digits(&self, value: &ActualValue) -> usize {
        value.as_decimal().map(decimal_total_digits).unwrap_or(0)
    }
}

// ============================================================================
// float / double
// ============================================================================

/// Special values shared by float, double and precisionDecimal
enum Special {
    PositiveInfinity,
    NegativeInfinity,
    NaN,
}

fn special_value(content: &str) -> Option<Special> {
    match content {
        "INF" | "+INF" => Some(Special::PositiveInfinity),
        "-INF" => Some(Special::NegativeInfinity),
        "NaN" => Some(Special::NaN),
        _ => None,
    }
}

fn scientific(repr: String) -> String {
    match repr.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => repr,
    }
}

/// Canonical lexical form of a float
pub fn format_float(v: f32) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let inf = if v > 0.0 { "INF" } else { "-INF" };
        inf.to_string()
    } else {
        scientific(format!("{:E}", v))
    }
}

/// Canonical lexical form of a double
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let inf = if v > 0.0 { "INF" } else { "-INF" };
        inf.to_string()
    } else {
        scientific(format!("{:E}", v))
    }
}

fn compare_fp(a: f64, b: f64) -> ValueOrder {
    if a.is_nan() && b.is_nan() {
        ValueOrder::Equal
    } else {
        ValueOrder::from_partial(a.partial_cmp(&b))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FloatDv;

impl TypeValidator for FloatDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::ORDERED_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        let value = match special_value(content) {
            Some(Special::PositiveInfinity) => f32::INFINITY,
            Some(Special::NegativeInfinity) => f32::NEG_INFINITY,
            Some(Special::NaN) => f32::NAN,
            None if FLOATING_POINT.is_match(content) => content
                .parse::<f32>()
                .map_err(|_| ValueError::invalid_lexical(content, "float"))?,
            None => return Err(ValueError::invalid_lexical(content, "float")),
        };
        Ok(ActualValue::Float(value))
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrder {
        match (a, b) {
            (ActualValue::Float(a), ActualValue::Float(b)) => compare_fp(*a as f64, *b as f64),
            _ => ValueOrder::Indeterminate,
        }
    }

    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        match (a, b) {
            (ActualValue::Float(a), ActualValue::Float(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DoubleDv;

impl TypeValidator for DoubleDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::ORDERED_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        let value = match special_value(content) {
            Some(Special::PositiveInfinity) => f64::INFINITY,
            Some(Special::NegativeInfinity) => f64::NEG_INFINITY,
            Some(Special::NaN) => f64::NAN,
            None if FLOATING_POINT.is_match(content) => content
                .parse::<f64>()
                .map_err(|_| ValueError::invalid_lexical(content, "double"))?,
            None => return Err(ValueError::invalid_lexical(content, "double")),
        };
        Ok(ActualValue::Double(value))
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrder {
        match (a, b) {
            (ActualValue::Double(a), ActualValue::Double(b)) => compare_fp(*a, *b),
            _ => ValueOrder::Indeterminate,
        }
    }

    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        match (a, b) {
            (ActualValue::Double(a), ActualValue::Double(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            _ => false,
        }
    }
}

// ============================================================================
// precisionDecimal
// ============================================================================

/// Value of a precisionDecimal
#[derive(Debug, Clone, Copy)]
pub enum PrecisionDecimalValue {
    Finite(Decimal),
    PositiveInfinity,
    NegativeInfinity,
    /// Not a number; unordered and unequal to everything, itself included
    NaN,
}

impl PrecisionDecimalValue {
    fn order(&self, other: &Self) -> ValueOrder {
        use PrecisionDecimalValue::*;
        match (self, other) {
            (NaN, _) | (_, NaN) => ValueOrder::Indeterminate,
            (Finite(a), Finite(b)) => a.cmp(b).into(),
            (PositiveInfinity, PositiveInfinity) | (NegativeInfinity, NegativeInfinity) => {
                ValueOrder::Equal
            }
            (PositiveInfinity, _) | (_, NegativeInfinity) => ValueOrder::Greater,
            (NegativeInfinity, _) | (_, PositiveInfinity) => ValueOrder::Less,
        }
    }
}

impl PartialEq for PrecisionDecimalValue {
    fn eq(&self, other: &Self) -> bool {
        self.order(other) == ValueOrder::Equal
    }
}

impl fmt::Display for PrecisionDecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecisionDecimalValue::Finite(d) => write!(f, "{}", d.normalize()),
            PrecisionDecimalValue::PositiveInfinity => f.write_str("INF"),
            PrecisionDecimalValue::NegativeInfinity => f.write_str("-INF"),
            PrecisionDecimalValue::NaN => f.write_str("NaN"),
        }
    }
}

fn parse_precision_decimal(content: &str) -> Option<PrecisionDecimalValue> {
    match special_value(content) {
        Some(Special::PositiveInfinity) => return Some(PrecisionDecimalValue::PositiveInfinity),
        Some(Special::NegativeInfinity) => return Some(PrecisionDecimalValue::NegativeInfinity),
        Some(Special::NaN) => return Some(PrecisionDecimalValue::NaN),
        None => {}
    }
    if !FLOATING_POINT.is_match(content) {
        return None;
    }
    let (mantissa, exponent) = match content.find(['e', 'E']) {
        Some(pos) => (&content[..pos], content[pos + 1..].parse::<i64>().ok()?),
        None => (content, 0),
    };
    let (negative, int, frac) = split_decimal(mantissa, true)?;
    build_decimal(negative, int, frac, exponent).map(PrecisionDecimalValue::Finite)
}

#[derive(Debug, Clone, Copy)]
pub struct PrecisionDecimalDv;

impl TypeValidator for PrecisionDecimalDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::ORDERED_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        parse_precision_decimal(content)
            .map(ActualValue::PrecisionDecimal)
            .ok_or_else(|| ValueError::invalid_lexical(content, "precisionDecimal"))
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrder {
        match (a, b) {
            (ActualValue::PrecisionDecimal(a), ActualValue::PrecisionDecimal(b)) => a.order(b),
            _ => ValueOrder::Indeterminate,
        }
    }

    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        match (a, b) {
            (
                ActualValue::PrecisionDecimal(PrecisionDecimalValue::NaN),
                ActualValue::PrecisionDecimal(PrecisionDecimalValue::NaN),
            ) => true,
            _ => a == b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::context::EmptyContext;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_decimal_lexical_space() {
        assert_eq!(parse_decimal("1."), Some(dec("1")));
        assert_eq!(parse_decimal(".5"), Some(dec("0.5")));
        assert_eq!(parse_decimal("+007.250"), Some(dec("7.25")));
        assert_eq!(parse_decimal("-0.0"), Some(Decimal::ZERO));
        assert_eq!(parse_decimal("."), None);
        assert_eq!(parse_decimal("1e3"), None);
        assert_eq!(parse_decimal(" 1"), None);
        assert_eq!(parse_integer("12.0"), None);
        assert_eq!(parse_integer("-0012"), Some(dec("-12")));
    }

    #[test]
    fn test_digit_counts() {
        let v = DecimalDv.parse("0012.3400", &EmptyContext).unwrap();
        assert_eq!(DecimalDv.total_digits(&v), 4);
        assert_eq!(DecimalDv.fraction_digits(&v), 2);

        let small = DecimalDv.parse("0.05", &EmptyContext).unwrap();
        assert_eq!(DecimalDv.total_digits(&small), 2);
        assert_eq!(DecimalDv.fraction_digits(&small), 2);

        let zero = DecimalDv.parse("0.000", &EmptyContext).unwrap();
        assert_eq!(DecimalDv.total_digits(&zero), 1);
        assert_eq!(DecimalDv.fraction_digits(&zero), 0);
    }

    #[test]
    fn test_decimal_compare() {
        let a = DecimalDv.parse("1.50", &EmptyContext).unwrap();
        let b = DecimalDv.parse("1.5", &EmptyContext).unwrap();
        let c = DecimalDv.parse("-3", &EmptyContext).unwrap();
        assert_eq!(DecimalDv.compare(&a, &b), ValueOrder::Equal);
        assert_eq!(DecimalDv.compare(&c, &a), ValueOrder::Less);
    }

    #[test]
    fn test_float_specials() {
        let nan = FloatDv.parse("NaN", &EmptyContext).unwrap();
        let inf = FloatDv.parse("INF", &EmptyContext).unwrap();
        let one = FloatDv.parse("1e0", &EmptyContext).unwrap();
        assert_eq!(FloatDv.compare(&nan, &nan), ValueOrder::Equal);
        assert_eq!(FloatDv.compare(&nan, &one), ValueOrder::Indeterminate);
        assert_eq!(FloatDv.compare(&one, &inf), ValueOrder::Less);
        assert!(FloatDv.parse("inf", &EmptyContext).is_err());
        assert!(FloatDv.parse("Infinity", &EmptyContext).is_err());
        assert!(FloatDv.parse("1.5E", &EmptyContext).is_err());
    }

    #[test]
    fn test_signed_zero_identity() {
        let pos = DoubleDv.parse("0", &EmptyContext).unwrap();
        let neg = DoubleDv.parse("-0", &EmptyContext).unwrap();
        assert_eq!(DoubleDv.compare(&pos, &neg), ValueOrder::Equal);
        assert!(!DoubleDv.is_identical(&pos, &neg));
        assert!(DoubleDv.is_identical(&neg, &neg));
    }

    #[test]
    fn test_canonical_floating_forms() {
        assert_eq!(format_double(15.0), "1.5E1");
        assert_eq!(format_double(1.0), "1.0E0");
        assert_eq!(format_float(f32::NEG_INFINITY), "-INF");
        assert_eq!(format_double(f64::NAN), "NaN");
    }

    #[test]
    fn test_precision_decimal() {
        let a = PrecisionDecimalDv.parse("1.5E2", &EmptyContext).unwrap();
        let b = PrecisionDecimalDv.parse("150", &EmptyContext).unwrap();
        let nan = PrecisionDecimalDv.parse("NaN", &EmptyContext).unwrap();
        let inf = PrecisionDecimalDv.parse("INF", &EmptyContext).unwrap();
        assert_eq!(PrecisionDecimalDv.compare(&a, &b), ValueOrder::Equal);
        assert_eq!(PrecisionDecimalDv.compare(&a, &inf), ValueOrder::Less);
        assert_eq!(PrecisionDecimalDv.compare(&nan, &nan), ValueOrder::Indeterminate);
        assert!(PrecisionDecimalDv.is_identical(&nan, &nan));
        assert_eq!(b.to_string(), "150");
    }

    #[test]
    fn test_precision_decimal_extreme_exponents() {
        for lexical in [
            "1e-9223372036854775808",
            "1.5e-9223372036854775807",
            "1e9223372036854775807",
            "1e99999999999999999999",
        ] {
            let err = PrecisionDecimalDv.parse(lexical, &EmptyContext).unwrap_err();
            assert_eq!(err.key(), "cvc-datatype-valid.1.2.1", "{}", lexical);
            assert_eq!(err.args[1], "precisionDecimal");
        }
        let zero = PrecisionDecimalDv.parse("0e-9223372036854775808", &EmptyContext).unwrap();
        assert_eq!(zero.to_string(), "0");
    }
}
