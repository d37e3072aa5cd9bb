//! Error types for xmlschema-datatypes
//!
//! Two rich error families are defined here: [`FacetError`] raised while
//! facets are applied to a type (schema compilation time) and [`ValueError`]
//! raised while a lexical value is validated (instance validation time).
//! Both carry a closed kind enum whose [`key`](FacetErrorKind::key) is the
//! stable conformance identifier, plus positional message arguments.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a value-level check
pub type ValueResult<T> = std::result::Result<T, ValueError>;

/// Result of a facet-level check
pub type FacetResult<T> = std::result::Result<T, FacetError>;

/// Main error type for simple type operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Facet restriction error raised by `apply_facets`
    #[error("facet error: {0}")]
    Facet(#[from] FacetError),

    /// Value validation error
    #[error("validation error: {0}")]
    Value(#[from] ValueError),

    /// Malformed type construction (list of list, empty union...)
    #[error("type error: {0}")]
    Type(String),
}

impl Error {
    /// Stable conformance key of the underlying facet or value error
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Error::Facet(e) => Some(e.key()),
            Error::Value(e) => Some(e.key()),
            _ => None,
        }
    }

    /// Positional message arguments of the underlying facet or value error
    pub fn args(&self) -> &[String] {
        match self {
            Error::Facet(e) => &e.args,
            Error::Value(e) => &e.args,
            _ => &[],
        }
    }
}

/// Replace `{0}`, `{1}`... in a message template with positional arguments
fn render(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        match tail.find('}') {
            Some(end) => {
                match tail[..end].parse::<usize>() {
                    Ok(idx) => out.push_str(args.get(idx).map(String::as_str).unwrap_or("")),
                    Err(_) => {
                        out.push('{');
                        out.push_str(&tail[..=end]);
                    }
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// Facet restriction errors
// ============================================================================

/// Kind of a facet restriction error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetErrorKind {
    /// Facet not applicable to the datatype
    CosApplicableFacets,
    /// Pattern failed to compile
    InvalidRegex,
    /// Enumeration value not valid for the base type
    EnumerationValidRestriction,
    /// Range facet value not valid for the base type
    FacetValueFromBase,
    /// Facet fixed on the base type was given another value
    FixedFacetValue,
    MaxExclusiveValidRestriction2,
    MinExclusiveValidRestriction3,
    MinLengthLessThanEqualToMaxLength,
    MaxInclusiveMaxExclusive,
    MinInclusiveMinExclusive,
    MinInclusiveLessThanEqualToMaxInclusive,
    MinExclusiveLessThanEqualToMaxExclusive,
    MinExclusiveLessThanMaxInclusive,
    MinInclusiveLessThanMaxExclusive,
    FractionDigitsTotalDigits,
    LengthMinLengthMaxLength1_1,
    LengthMinLengthMaxLength2_1,
    LengthMinLengthMaxLength1_2a,
    LengthMinLengthMaxLength1_2b,
    LengthMinLengthMaxLength2_2a,
    LengthMinLengthMaxLength2_2b,
    LengthValidRestriction,
    MinLengthValidRestriction,
    MaxLengthValidRestriction,
    TotalDigitsValidRestriction,
    FractionDigitsValidRestriction,
    WhiteSpaceValidRestriction1,
    WhiteSpaceValidRestriction2,
}

impl FacetErrorKind {
    /// Stable conformance key
    pub fn key(&self) -> &'static str {
        use FacetErrorKind::*;
        match self {
            CosApplicableFacets => "cos-applicable-facets",
            InvalidRegex => "InvalidRegex",
            EnumerationValidRestriction => "enumeration-valid-restriction",
            FacetValueFromBase => "FacetValueFromBase",
            FixedFacetValue => "FixedFacetValue",
            MaxExclusiveValidRestriction2 => "maxExclusive-valid-restriction.2",
            MinExclusiveValidRestriction3 => "minExclusive-valid-restriction.3",
            MinLengthLessThanEqualToMaxLength => "minLength-less-than-equal-to-maxLength",
            MaxInclusiveMaxExclusive => "maxInclusive-maxExclusive",
            MinInclusiveMinExclusive => "minInclusive-minExclusive",
            MinInclusiveLessThanEqualToMaxInclusive => {
                "minInclusive-less-than-equal-to-maxInclusive"
            }
            MinExclusiveLessThanEqualToMaxExclusive => {
                "minExclusive-less-than-equal-to-maxExclusive"
            }
            MinExclusiveLessThanMaxInclusive => "minExclusive-less-than-maxInclusive",
            MinInclusiveLessThanMaxExclusive => "minInclusive-less-than-maxExclusive",
            FractionDigitsTotalDigits => "fractionDigits-totalDigits",
            LengthMinLengthMaxLength1_1 => "length-minLength-maxLength.1.1",
            LengthMinLengthMaxLength2_1 => "length-minLength-maxLength.2.1",
            LengthMinLengthMaxLength1_2a => "length-minLength-maxLength.1.2.a",
            LengthMinLengthMaxLength1_2b => "length-minLength-maxLength.1.2.b",
            LengthMinLengthMaxLength2_2a => "length-minLength-maxLength.2.2.a",
            LengthMinLengthMaxLength2_2b => "length-minLength-maxLength.2.2.b",
            LengthValidRestriction => "length-valid-restriction",
            MinLengthValidRestriction => "minLength-valid-restriction",
            MaxLengthValidRestriction => "maxLength-valid-restriction",
            TotalDigitsValidRestriction => "totalDigits-valid-restriction",
            FractionDigitsValidRestriction => "fractionDigits-valid-restriction",
            WhiteSpaceValidRestriction1 => "whiteSpace-valid-restriction.1",
            WhiteSpaceValidRestriction2 => "whiteSpace-valid-restriction.2",
        }
    }

    fn template(&self) -> &'static str {
        use FacetErrorKind::*;
        match self {
            CosApplicableFacets => "Facet '{0}' is not allowed by type {1}.",
            InvalidRegex => "Pattern value '{0}' is not a valid regular expression. The reported error was: '{1}'.",
            EnumerationValidRestriction => "Enumeration value '{0}' is not in the value space of the base type, {1}.",
            FacetValueFromBase => "In the declaration of type '{0}', the value '{1}' of facet '{2}' must be from the value space of the base type, '{3}'.",
            FixedFacetValue => "Value '{1}' for facet '{0}' is invalid, because the value for '{0}' has been set to '{2}' elsewhere in the type hierarchy, and it has fixed = 'true'.",
            MaxExclusiveValidRestriction2 => "Error for type '{2}'. maxExclusive value = '{0}' must be <= maxInclusive of the base type '{1}'.",
            MinExclusiveValidRestriction3 => "Error for type '{2}'. minExclusive value = '{0}' must be > minInclusive of the base type '{1}'.",
            MinLengthLessThanEqualToMaxLength => "For type {2}, the value of minLength = '{0}' must be <= the value of maxLength = '{1}'.",
            MaxInclusiveMaxExclusive => "It is an error for both maxInclusive and maxExclusive to be specified for the same datatype. In {2}, maxInclusive = '{0}' and maxExclusive = '{1}'.",
            MinInclusiveMinExclusive => "It is an error for both minInclusive and minExclusive to be specified for the same datatype. In {2}, minInclusive = '{0}' and minExclusive = '{1}'.",
            MinInclusiveLessThanEqualToMaxInclusive => "For type {2}, minInclusive value = '{0}' must be <= maxInclusive value = '{1}'.",
            MinExclusiveLessThanEqualToMaxExclusive => "For type {2}, minExclusive value = '{0}' must be <= maxExclusive value = '{1}'.",
            MinExclusiveLessThanMaxInclusive => "For type {2}, minExclusive value = '{0}' must be < maxInclusive value = '{1}'.",
            MinInclusiveLessThanMaxExclusive => "For type {2}, minInclusive value = '{0}' must be < maxExclusive value = '{1}'.",
            FractionDigitsTotalDigits => "For type {2}, fractionDigits value = '{0}' must be <= totalDigits value = '{1}'.",
            LengthMinLengthMaxLength1_1 => "For type {0}, the value of length '{1}' must be >= the value of minLength '{2}'.",
            LengthMinLengthMaxLength2_1 => "For type {0}, the value of length '{1}' must be <= the value of maxLength '{2}'.",
            LengthMinLengthMaxLength1_2a => "For type {0}, the base type must have a minLength facet if the current restriction has the minLength facet and the current restriction or base type has the length facet.",
            LengthMinLengthMaxLength1_2b => "For type {0}, the current minLength '{1}' must equal the base minLength '{2}'.",
            LengthMinLengthMaxLength2_2a => "For type {0}, the base type must have a maxLength facet if the current restriction has the maxLength facet and the current restriction or base type has the length facet.",
            LengthMinLengthMaxLength2_2b => "For type {0}, the current maxLength '{1}' must equal the base maxLength '{2}'.",
            LengthValidRestriction => "Error for type '{2}'. The value of length = '{0}' must be = the value of that of the base type '{1}'.",
            MinLengthValidRestriction => "For type {2}, minLength = '{0}' must be >= that of the base type, '{1}'.",
            MaxLengthValidRestriction => "For type {2}, maxLength value = '{0}' must be <= that of the base type '{1}'.",
            TotalDigitsValidRestriction => "For type {2}, value totalDigits = '{0}' must be <= that of the base type '{1}'.",
            FractionDigitsValidRestriction => "For type {2}, fractionDigits = '{0}' must be <= that of the base type '{1}'.",
            WhiteSpaceValidRestriction1 => "For type {0}, the whiteSpace value '{1}' must not be used when the base type has whiteSpace 'collapse'.",
            WhiteSpaceValidRestriction2 => "For type {0}, whitespace value 'preserve' must not be used when the base type has whiteSpace 'replace'.",
        }
    }
}

/// Facet restriction consistency error
#[derive(Debug, Clone, PartialEq)]
pub struct FacetError {
    /// Error kind
    pub kind: FacetErrorKind,
    /// Positional message arguments
    pub args: Vec<String>,
    /// Value error that triggered this error, if any
    pub cause: Option<ValueError>,
}

impl FacetError {
    /// Create a new facet error
    pub fn new<I, S>(kind: FacetErrorKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            args: args.into_iter().map(Into::into).collect(),
            cause: None,
        }
    }

    /// Attach the value error this facet error was derived from
    pub fn with_cause(mut self, cause: ValueError) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Stable conformance key
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    /// Rendered message
    pub fn message(&self) -> String {
        render(self.kind.template(), &self.args)
    }
}

impl fmt::Display for FacetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key(), self.message())?;

        if let Some(ref cause) = self.cause {
            write!(f, "\n\nReason: {}", cause)?;
        }

        Ok(())
    }
}

impl std::error::Error for FacetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

// ============================================================================
// Value validation errors
// ============================================================================

/// Kind of a value validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueErrorKind {
    /// Lexical form not valid for the datatype
    DatatypeValid1_2_1,
    /// Value not valid for any member of a union
    DatatypeValid1_2_3,
    PatternValid,
    MaxLengthValid,
    MinLengthValid,
    LengthValid,
    EnumerationValid,
    FractionDigitsValid,
    TotalDigitsValid,
    MaxInclusiveValid,
    MaxExclusiveValid,
    MinInclusiveValid,
    MinExclusiveValid,
    /// QName prefix without a namespace binding
    UndeclaredPrefix,
    /// ENTITY value that is not an unparsed entity
    UndeclaredEntity,
    /// IDREF without a matching ID
    IdRefUnresolved,
    /// ID declared twice
    IdDuplicate,
    /// whiteSpace queried on a union type
    DtWhitespace,
}

impl ValueErrorKind {
    /// Stable conformance key
    pub fn key(&self) -> &'static str {
        use ValueErrorKind::*;
        match self {
            DatatypeValid1_2_1 => "cvc-datatype-valid.1.2.1",
            DatatypeValid1_2_3 => "cvc-datatype-valid.1.2.3",
            PatternValid => "cvc-pattern-valid",
            MaxLengthValid => "cvc-maxLength-valid",
            MinLengthValid => "cvc-minLength-valid",
            LengthValid => "cvc-length-valid",
            EnumerationValid => "cvc-enumeration-valid",
            FractionDigitsValid => "cvc-fractionDigits-valid",
            TotalDigitsValid => "cvc-totalDigits-valid",
            MaxInclusiveValid => "cvc-maxInclusive-valid",
            MaxExclusiveValid => "cvc-maxExclusive-valid",
            MinInclusiveValid => "cvc-minInclusive-valid",
            MinExclusiveValid => "cvc-minExclusive-valid",
            UndeclaredPrefix => "UndeclaredPrefix",
            UndeclaredEntity => "UndeclaredEntity",
            IdRefUnresolved => "cvc-id.1",
            IdDuplicate => "cvc-id.2",
            DtWhitespace => "dt-whitespace",
        }
    }

    fn template(&self) -> &'static str {
        use ValueErrorKind::*;
        match self {
            DatatypeValid1_2_1 => "'{0}' is not a valid value for '{1}'.",
            DatatypeValid1_2_3 => "'{0}' is not a valid value of union type '{1}'. Member types: {2}.",
            PatternValid => "Value '{0}' is not facet-valid with respect to pattern '{1}' for type '{2}'.",
            MaxLengthValid => "Value '{0}' with length = '{1}' is not facet-valid with respect to maxLength '{2}' for type '{3}'.",
            MinLengthValid => "Value '{0}' with length = '{1}' is not facet-valid with respect to minLength '{2}' for type '{3}'.",
            LengthValid => "Value '{0}' with length = '{1}' is not facet-valid with respect to length '{2}' for type '{3}'.",
            EnumerationValid => "Value '{0}' is not facet-valid with respect to enumeration '{1}'. It must be a value from the enumeration.",
            FractionDigitsValid => "Value '{0}' has {1} fraction digits, but the number of fraction digits has been limited to {2}.",
            TotalDigitsValid => "Value '{0}' has {1} total digits, but the number of total digits has been limited to {2}.",
            MaxInclusiveValid => "Value '{0}' is not facet-valid with respect to maxInclusive '{1}' for type '{2}'.",
            MaxExclusiveValid => "Value '{0}' is not facet-valid with respect to maxExclusive '{1}' for type '{2}'.",
            MinInclusiveValid => "Value '{0}' is not facet-valid with respect to minInclusive '{1}' for type '{2}'.",
            MinExclusiveValid => "Value '{0}' is not facet-valid with respect to minExclusive '{1}' for type '{2}'.",
            UndeclaredPrefix => "Cannot resolve '{0}' as a QName: the prefix '{1}' is not declared.",
            UndeclaredEntity => "Entity '{0}' is not declared.",
            IdRefUnresolved => "There is no ID/IDREF binding for IDREF '{0}'.",
            IdDuplicate => "There are multiple occurrences of ID value '{0}'.",
            DtWhitespace => "Whitespace facet value is not available for the union simpleType '{0}'.",
        }
    }
}

/// Value validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    /// Error kind
    pub kind: ValueErrorKind,
    /// Positional message arguments
    pub args: Vec<String>,
}

impl ValueError {
    /// Create a new value error
    pub fn new<I, S>(kind: ValueErrorKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `cvc-datatype-valid.1.2.1` for a lexical form rejected by a datatype
    pub fn invalid_lexical(content: &str, type_name: &str) -> Self {
        Self::new(ValueErrorKind::DatatypeValid1_2_1, [content, type_name])
    }

    /// Stable conformance key
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    /// Rendered message
    pub fn message(&self) -> String {
        render(self.kind.template(), &self.args)
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key(), self.message())
    }
}

impl std::error::Error for ValueError {}
