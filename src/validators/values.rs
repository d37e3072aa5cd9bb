//! Actual values and validation results
//!
//! [`ActualValue`] is the value-space representation produced by parsing a
//! lexical form. Equality follows the value space of each datatype: `1.0`
//! and `1.00` are the same decimal, two dateTimes in different timezones may
//! be the same instant, NaN equals NaN for float and double enumerations.

use super::datatypes::duration::DurationValue;
use super::datatypes::datetime::DateTimeValue;
use super::datatypes::numeric::{format_double, format_float, PrecisionDecimalValue};
use super::simple_types::SimpleTypeDecl;
use crate::namespaces::QName;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Value-space representation of a validated lexical form
#[derive(Debug, Clone)]
pub enum ActualValue {
    /// anySimpleType, string family, anyURI, ID, IDREF, ENTITY
    String(String),
    Boolean(bool),
    Decimal(Decimal),
    /// Decimal with an integer lexical form
    Integer(Decimal),
    PrecisionDecimal(PrecisionDecimalValue),
    Float(f32),
    Double(f64),
    Duration(DurationValue),
    DateTime(DateTimeValue),
    HexBinary(Vec<u8>),
    Base64Binary(Vec<u8>),
    /// QName and NOTATION
    QName(QName),
    List(Vec<ActualValue>),
}

impl ActualValue {
    /// Decimal payload of decimal and integer values
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ActualValue::Decimal(d) | ActualValue::Integer(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ActualValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Items of a list value
    pub fn as_list(&self) -> Option<&[ActualValue]> {
        match self {
            ActualValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for ActualValue {
    fn eq(&self, other: &Self) -> bool {
        use ActualValue::*;
        match (self, other) {
            (String(a), String(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (Decimal(a) | Integer(a), Decimal(b) | Integer(b)) => a == b,
            (PrecisionDecimal(a), PrecisionDecimal(b)) => a == b,
            (Float(a), Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Double(a), Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Duration(a), Duration(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (HexBinary(a), HexBinary(b)) => a == b,
            (Base64Binary(a), Base64Binary(b)) => a == b,
            (QName(a), QName(b)) => a == b,
            (List(a), List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ActualValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActualValue::String(s) => f.write_str(s),
            ActualValue::Boolean(b) => write!(f, "{}", b),
            ActualValue::Decimal(d) => {
                let d = d.normalize();
                if d.scale() == 0 {
                    write!(f, "{}.0", d)
                } else {
                    write!(f, "{}", d)
                }
            }
            ActualValue::Integer(d) => write!(f, "{}", d.normalize()),
            ActualValue::PrecisionDecimal(p) => write!(f, "{}", p),
            ActualValue::Float(v) => f.write_str(&format_float(*v)),
            ActualValue::Double(v) => f.write_str(&format_double(*v)),
            ActualValue::Duration(d) => write!(f, "{}", d),
            ActualValue::DateTime(d) => write!(f, "{}", d),
            ActualValue::HexBinary(bytes) => {
                for b in bytes {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
            ActualValue::Base64Binary(bytes) => f.write_str(&STANDARD.encode(bytes)),
            ActualValue::QName(q) => write!(f, "{}", q),
            ActualValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// Built-in datatype codes, numbered as in the XML Schema API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum BuiltinKind {
    AnySimpleType = 1,
    String = 2,
    Boolean = 3,
    Decimal = 4,
    Float = 5,
    Double = 6,
    Duration = 7,
    DateTime = 8,
    Time = 9,
    Date = 10,
    GYearMonth = 11,
    GYear = 12,
    GMonthDay = 13,
    GDay = 14,
    GMonth = 15,
    HexBinary = 16,
    Base64Binary = 17,
    AnyUri = 18,
    QName = 19,
    Notation = 20,
    NormalizedString = 21,
    Token = 22,
    Language = 23,
    NmToken = 24,
    Name = 25,
    NcName = 26,
    Id = 27,
    IdRef = 28,
    Entity = 29,
    Integer = 30,
    NonPositiveInteger = 31,
    NegativeInteger = 32,
    Long = 33,
    Int = 34,
    Short = 35,
    Byte = 36,
    NonNegativeInteger = 37,
    UnsignedLong = 38,
    UnsignedInt = 39,
    UnsignedShort = 40,
    UnsignedByte = 41,
    PositiveInteger = 42,
    ListOfUnion = 43,
    List = 44,
    Unavailable = 45,
    YearMonthDuration = 46,
    DayTimeDuration = 47,
    PrecisionDecimal = 48,
    AnyAtomicType = 49,
}

impl BuiltinKind {
    /// Numeric code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Primitive family used when enumeration values are matched: the
    /// string-derived kinds map to `String`, the integer family to `Decimal`
    pub fn convert_to_primitive_kind(self) -> BuiltinKind {
        let code = self.code();
        if code <= BuiltinKind::Notation.code() {
            self
        } else if code <= BuiltinKind::Entity.code() {
            BuiltinKind::String
        } else if code <= BuiltinKind::PositiveInteger.code() {
            BuiltinKind::Decimal
        } else {
            self
        }
    }

    /// Whether two kinds may hold equal values: the same primitive family,
    /// or anySimpleType against string
    pub fn is_comparable_with(self, other: BuiltinKind) -> bool {
        let a = self.convert_to_primitive_kind();
        let b = other.convert_to_primitive_kind();
        a == b
            || matches!(
                (a, b),
                (BuiltinKind::AnySimpleType, BuiltinKind::String)
                    | (BuiltinKind::String, BuiltinKind::AnySimpleType)
            )
    }
}

/// Everything learned about a lexical value while validating it
#[derive(Debug, Clone)]
pub struct ValidatedInfo {
    /// Lexical form after whitespace normalization
    pub normalized_value: String,
    pub actual_value: ActualValue,
    /// Built-in kind of the type that produced the value
    pub actual_value_type: BuiltinKind,
    /// Union member that accepted the value
    pub member_type: Option<Arc<SimpleTypeDecl>>,
    /// For lists, the union member that accepted each item
    pub member_types: Vec<Option<Arc<SimpleTypeDecl>>>,
    /// For lists, the built-in kind of the items: one entry, or one per
    /// item when the item type is a union
    pub item_value_types: Vec<BuiltinKind>,
}

impl ValidatedInfo {
    /// Result for an atomic value
    pub fn atomic(
        normalized_value: impl Into<String>,
        actual_value: ActualValue,
        actual_value_type: BuiltinKind,
    ) -> Self {
        Self {
            normalized_value: normalized_value.into(),
            actual_value,
            actual_value_type,
            member_type: None,
            member_types: Vec::new(),
            item_value_types: Vec::new(),
        }
    }

    /// Whether an enumeration entry may be compared with this value
    pub(crate) fn is_comparable(&self, other: &ValidatedInfo) -> bool {
        if !self
            .actual_value_type
            .is_comparable_with(other.actual_value_type)
        {
            return false;
        }
        let primitive = self.actual_value_type.convert_to_primitive_kind();
        if matches!(primitive, BuiltinKind::List | BuiltinKind::ListOfUnion) {
            if self.item_value_types.len() != other.item_value_types.len() {
                return false;
            }
            return self
                .item_value_types
                .iter()
                .zip(&other.item_value_types)
                .all(|(a, b)| a.is_comparable_with(*b));
        }
        true
    }
}
