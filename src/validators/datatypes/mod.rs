//! Datatype validators
//!
//! One [`TypeValidator`] per validation kind, reached through the
//! [`DvKind`] capability table. A validator knows the lexical space and
//! the value space of its kind; facets and varieties are handled by
//! [`SimpleTypeDecl`](super::SimpleTypeDecl).

pub mod binary;
pub mod boolean;
pub mod compound;
pub mod datetime;
pub mod duration;
pub mod numeric;
pub mod qname;
pub mod strings;
pub mod uri;

use super::context::ValidationContext;
use super::facets::FacetMask;
use super::values::ActualValue;
use crate::error::ValueResult;
use serde::Serialize;
use std::cmp::Ordering;

pub use datetime::{CalendarKind, DateTimeValue};
pub use duration::DurationValue;
pub use numeric::PrecisionDecimalValue;

/// Result of comparing two actual values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOrder {
    Less,
    Equal,
    Greater,
    /// The values are not ordered relative to each other
    Indeterminate,
}

impl ValueOrder {
    /// Comparison result from a partial order
    pub fn from_partial(ordering: Option<Ordering>) -> Self {
        ordering.map(Self::from).unwrap_or(ValueOrder::Indeterminate)
    }

    /// Less or Equal
    pub fn is_le(&self) -> bool {
        matches!(self, ValueOrder::Less | ValueOrder::Equal)
    }

    /// Greater or Equal
    pub fn is_ge(&self) -> bool {
        matches!(self, ValueOrder::Greater | ValueOrder::Equal)
    }
}

impl From<Ordering> for ValueOrder {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => ValueOrder::Less,
            Ordering::Equal => ValueOrder::Equal,
            Ordering::Greater => ValueOrder::Greater,
        }
    }
}

/// Lexical and value space operations of one validation kind
pub trait TypeValidator: Send + Sync {
    /// Facets that may be applied to types of this kind
    fn allowed_facets(&self) -> FacetMask;

    /// Parse a normalized lexical form
    fn parse(&self, content: &str, ctx: &dyn ValidationContext) -> ValueResult<ActualValue>;

    /// Semantic rules needing the validation context (ID uniqueness...)
    fn check_extra_rules(
        &self,
        _value: &ActualValue,
        _ctx: &mut dyn ValidationContext,
    ) -> ValueResult<()> {
        Ok(())
    }

    /// Order two values of this kind
    fn compare(&self, _a: &ActualValue, _b: &ActualValue) -> ValueOrder {
        ValueOrder::Indeterminate
    }

    /// Value measured by the length facets
    fn data_length(&self, value: &ActualValue) -> usize {
        match value {
            ActualValue::String(s) => s.chars().count(),
            _ => 0,
        }
    }

    fn fraction_digits(&self, _value: &ActualValue) -> usize {
        0
    }

    fn total_digits(&self, _value: &ActualValue) -> usize {
        0
    }

    /// Identity, stricter than equality (0 and -0 differ, NaN is itself)
    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        a == b
    }
}

/// Whitespace handling applied when a type declares no pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Leave the value untouched
    None,
    /// Strip leading and trailing XML whitespace
    Trim,
    /// Apply the whiteSpace facet
    Full,
}

/// Validation kind selecting a [`TypeValidator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DvKind {
    AnySimple,
    String,
    Boolean,
    Decimal,
    Float,
    Double,
    Duration,
    DateTime,
    Time,
    Date,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
    HexBinary,
    Base64Binary,
    AnyUri,
    QName,
    PrecisionDecimal,
    Notation,
    Id,
    IdRef,
    Entity,
    Integer,
    List,
    Union,
    YearMonthDuration,
    DayTimeDuration,
    AnyAtomic,
}

static VALIDATORS: [&dyn TypeValidator; 30] = [
    &strings::AnySimpleDv,
    &strings::StringDv,
    &boolean::BooleanDv,
    &numeric::DecimalDv,
    &numeric::FloatDv,
    &numeric::DoubleDv,
    &duration::DurationDv(duration::DurationFlavor::Full),
    &datetime::CalendarDv(CalendarKind::DateTime),
    &datetime::CalendarDv(CalendarKind::Time),
    &datetime::CalendarDv(CalendarKind::Date),
    &datetime::CalendarDv(CalendarKind::GYearMonth),
    &datetime::CalendarDv(CalendarKind::GYear),
    &datetime::CalendarDv(CalendarKind::GMonthDay),
    &datetime::CalendarDv(CalendarKind::GDay),
    &datetime::CalendarDv(CalendarKind::GMonth),
    &binary::HexBinaryDv,
    &binary::Base64BinaryDv,
    &uri::AnyUriDv,
    &qname::QNameDv,
    &numeric::PrecisionDecimalDv,
    &qname::QNameDv,
    &strings::IdDv,
    &strings::IdRefDv,
    &strings::EntityDv,
    &numeric::IntegerDv,
    &compound::ListDv,
    &compound::UnionDv,
    &duration::DurationDv(duration::DurationFlavor::YearMonth),
    &duration::DurationDv(duration::DurationFlavor::DayTime),
    &strings::AnyAtomicDv,
];

impl DvKind {
    /// Position in the capability table
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Validator for this kind
    pub fn validator(&self) -> &'static dyn TypeValidator {
        VALIDATORS[self.index()]
    }

    /// Whitespace shortcut used when no pattern is declared
    pub fn normalization(&self) -> Normalization {
        match self {
            DvKind::AnySimple | DvKind::Base64Binary | DvKind::Union | DvKind::AnyAtomic => {
                Normalization::None
            }
            DvKind::String | DvKind::List => Normalization::Full,
            _ => Normalization::Trim,
        }
    }

    /// Primitive kind this kind derives from
    pub fn primitive(&self) -> DvKind {
        match self {
            DvKind::Id | DvKind::IdRef | DvKind::Entity => DvKind::String,
            DvKind::Integer => DvKind::Decimal,
            DvKind::YearMonthDuration | DvKind::DayTimeDuration => DvKind::Duration,
            other => *other,
        }
    }

    /// Partial-date kinds whose bounded value spaces are finite
    pub fn is_partial_date(&self) -> bool {
        matches!(
            self,
            DvKind::Date
                | DvKind::GYearMonth
                | DvKind::GYear
                | DvKind::GMonthDay
                | DvKind::GDay
                | DvKind::GMonth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order() {
        assert_eq!(DvKind::AnySimple.index(), 0);
        assert_eq!(DvKind::Notation.index(), 20);
        assert_eq!(DvKind::Integer.index(), 24);
        assert_eq!(DvKind::AnyAtomic.index(), 29);
    }

    #[test]
    fn test_allowed_facets_by_kind() {
        assert_eq!(DvKind::AnySimple.validator().allowed_facets(), FacetMask::empty());
        assert_eq!(DvKind::String.validator().allowed_facets(), FacetMask::STRING_FACETS);
        assert_eq!(
            DvKind::Boolean.validator().allowed_facets(),
            FacetMask::PATTERN | FacetMask::WHITESPACE
        );
        assert_eq!(DvKind::Integer.validator().allowed_facets(), FacetMask::DECIMAL_FACETS);
        assert_eq!(DvKind::Date.validator().allowed_facets(), FacetMask::ORDERED_FACETS);
        assert_eq!(
            DvKind::Union.validator().allowed_facets(),
            FacetMask::PATTERN | FacetMask::ENUMERATION
        );
    }

    #[test]
    fn test_normalization_shortcuts() {
        assert_eq!(DvKind::String.normalization(), Normalization::Full);
        assert_eq!(DvKind::Base64Binary.normalization(), Normalization::None);
        assert_eq!(DvKind::Decimal.normalization(), Normalization::Trim);
    }

    #[test]
    fn test_primitive_kinds() {
        assert_eq!(DvKind::IdRef.primitive(), DvKind::String);
        assert_eq!(DvKind::Integer.primitive(), DvKind::Decimal);
        assert_eq!(DvKind::DayTimeDuration.primitive(), DvKind::Duration);
        assert_eq!(DvKind::Float.primitive(), DvKind::Float);
    }
}
