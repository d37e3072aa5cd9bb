//! XSD constraining facets
//!
//! This module holds the facet vocabulary shared by type construction,
//! restriction and validation: the facet kinds and their bitmask, the
//! whiteSpace modes, the declared facet set handed over by a schema loader,
//! and the introspection records describing the facets of a type.

use crate::error::{Error, Result};
use crate::namespaces::NamespaceContext;
use crate::validators::values::ActualValue;
use bitflags::bitflags;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Schema annotation attached to a facet or a type, kept as its raw text
pub type Annotation = String;

bitflags! {
    /// Set of constraining facets
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct FacetMask: u16 {
        const LENGTH = 1;
        const MIN_LENGTH = 1 << 1;
        const MAX_LENGTH = 1 << 2;
        const PATTERN = 1 << 3;
        const WHITESPACE = 1 << 4;
        const MAX_INCLUSIVE = 1 << 5;
        const MAX_EXCLUSIVE = 1 << 6;
        const MIN_EXCLUSIVE = 1 << 7;
        const MIN_INCLUSIVE = 1 << 8;
        const TOTAL_DIGITS = 1 << 9;
        const FRACTION_DIGITS = 1 << 10;
        const ENUMERATION = 1 << 11;

        /// Facets applicable to string-like datatypes
        const STRING_FACETS = Self::LENGTH.bits()
            | Self::MIN_LENGTH.bits()
            | Self::MAX_LENGTH.bits()
            | Self::PATTERN.bits()
            | Self::ENUMERATION.bits()
            | Self::WHITESPACE.bits();

        /// The four range facets
        const RANGE_FACETS = Self::MAX_INCLUSIVE.bits()
            | Self::MAX_EXCLUSIVE.bits()
            | Self::MIN_EXCLUSIVE.bits()
            | Self::MIN_INCLUSIVE.bits();

        /// Facets applicable to ordered, non-decimal datatypes
        const ORDERED_FACETS = Self::PATTERN.bits()
            | Self::WHITESPACE.bits()
            | Self::ENUMERATION.bits()
            | Self::RANGE_FACETS.bits();

        /// Facets applicable to decimal datatypes
        const DECIMAL_FACETS = Self::ORDERED_FACETS.bits()
            | Self::TOTAL_DIGITS.bits()
            | Self::FRACTION_DIGITS.bits();
    }
}

/// A single constraining facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetKind {
    Length,
    MinLength,
    MaxLength,
    Pattern,
    WhiteSpace,
    Enumeration,
    MaxInclusive,
    MaxExclusive,
    MinExclusive,
    MinInclusive,
    TotalDigits,
    FractionDigits,
}

impl FacetKind {
    /// All facets, in the order `apply_facets` processes them
    pub const ALL: [FacetKind; 12] = [
        FacetKind::Length,
        FacetKind::MinLength,
        FacetKind::MaxLength,
        FacetKind::Pattern,
        FacetKind::WhiteSpace,
        FacetKind::Enumeration,
        FacetKind::MaxInclusive,
        FacetKind::MaxExclusive,
        FacetKind::MinExclusive,
        FacetKind::MinInclusive,
        FacetKind::TotalDigits,
        FacetKind::FractionDigits,
    ];

    /// Facet name as written in a schema
    pub fn name(&self) -> &'static str {
        match self {
            FacetKind::Length => "length",
            FacetKind::MinLength => "minLength",
            FacetKind::MaxLength => "maxLength",
            FacetKind::Pattern => "pattern",
            FacetKind::WhiteSpace => "whiteSpace",
            FacetKind::Enumeration => "enumeration",
            FacetKind::MaxInclusive => "maxInclusive",
            FacetKind::MaxExclusive => "maxExclusive",
            FacetKind::MinExclusive => "minExclusive",
            FacetKind::MinInclusive => "minInclusive",
            FacetKind::TotalDigits => "totalDigits",
            FacetKind::FractionDigits => "fractionDigits",
        }
    }

    /// Bit of this facet in a [`FacetMask`]
    pub fn mask(&self) -> FacetMask {
        match self {
            FacetKind::Length => FacetMask::LENGTH,
            FacetKind::MinLength => FacetMask::MIN_LENGTH,
            FacetKind::MaxLength => FacetMask::MAX_LENGTH,
            FacetKind::Pattern => FacetMask::PATTERN,
            FacetKind::WhiteSpace => FacetMask::WHITESPACE,
            FacetKind::Enumeration => FacetMask::ENUMERATION,
            FacetKind::MaxInclusive => FacetMask::MAX_INCLUSIVE,
            FacetKind::MaxExclusive => FacetMask::MAX_EXCLUSIVE,
            FacetKind::MinExclusive => FacetMask::MIN_EXCLUSIVE,
            FacetKind::MinInclusive => FacetMask::MIN_INCLUSIVE,
            FacetKind::TotalDigits => FacetMask::TOTAL_DIGITS,
            FacetKind::FractionDigits => FacetMask::FRACTION_DIGITS,
        }
    }

    /// Whether the facet may carry several values
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, FacetKind::Pattern | FacetKind::Enumeration)
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FacetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FacetKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::Type(format!("Unknown facet: '{}'", s)))
    }
}

/// White space handling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteSpace {
    /// Preserve all white space
    Preserve,
    /// Replace tabs and newlines with spaces
    Replace,
    /// Replace and collapse multiple spaces
    Collapse,
}

impl WhiteSpace {
    /// Facet value as written in a schema
    pub fn as_str(&self) -> &'static str {
        match self {
            WhiteSpace::Preserve => "preserve",
            WhiteSpace::Replace => "replace",
            WhiteSpace::Collapse => "collapse",
        }
    }

    /// Normalize a string according to this white space mode
    pub fn normalize(&self, s: &str) -> String {
        match self {
            WhiteSpace::Preserve => s.to_string(),
            WhiteSpace::Replace => s.replace(['\t', '\n', '\r'], " "),
            WhiteSpace::Collapse => {
                let mut result = String::with_capacity(s.len());
                let mut pending_space = false;

                for c in s.chars() {
                    if matches!(c, ' ' | '\t' | '\n' | '\r') {
                        pending_space = !result.is_empty();
                    } else {
                        if pending_space {
                            result.push(' ');
                            pending_space = false;
                        }
                        result.push(c);
                    }
                }

                result
            }
        }
    }
}

impl fmt::Display for WhiteSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhiteSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "preserve" => Ok(WhiteSpace::Preserve),
            "replace" => Ok(WhiteSpace::Replace),
            "collapse" => Ok(WhiteSpace::Collapse),
            _ => Err(Error::Type(format!(
                "Invalid whiteSpace value: '{}'. Must be 'preserve', 'replace', or 'collapse'",
                s
            ))),
        }
    }
}

/// The `ordered` fundamental facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ordered {
    /// No order relation
    False,
    /// Partial order
    Partial,
    /// Total order
    Total,
}

/// Built-in lexical shape checks used by facet-free name types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SpecialPattern {
    #[default]
    None,
    NmToken,
    Name,
    NcName,
}

impl SpecialPattern {
    /// Datatype name reported when the shape check fails
    pub fn type_name(&self) -> &'static str {
        match self {
            SpecialPattern::None => "",
            SpecialPattern::NmToken => "NMTOKEN",
            SpecialPattern::Name => "Name",
            SpecialPattern::NcName => "NCName",
        }
    }

    /// Equivalent XML Schema patterns, as reported by introspection
    pub fn lexical_patterns(&self) -> &'static [&'static str] {
        match self {
            SpecialPattern::None => &[],
            SpecialPattern::NmToken => &[r"\c+"],
            SpecialPattern::Name => &[r"\i\c*"],
            SpecialPattern::NcName => &[r"\i\c*", r"[\i-[:]][\c-[:]]*"],
        }
    }

    /// Check a normalized value against the shape
    pub fn matches(&self, value: &str) -> bool {
        match self {
            SpecialPattern::None => true,
            SpecialPattern::NmToken => crate::names::is_valid_nmtoken(value),
            SpecialPattern::Name => crate::names::is_valid_name(value),
            SpecialPattern::NcName => crate::names::is_valid_ncname(value),
        }
    }
}

/// One declared enumeration value
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationFacet {
    /// Lexical value as written in the schema
    pub value: String,
    /// Namespace bindings in scope where the value was declared
    pub namespaces: Option<NamespaceContext>,
}

/// Facets declared on one restriction step, as extracted by a schema loader
///
/// Several patterns declared in the same step are combined with `|`, as
/// XML Schema requires.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclaredFacets {
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub white_space: Option<WhiteSpace>,
    pub enumeration: Vec<EnumerationFacet>,
    pub max_inclusive: Option<String>,
    pub max_exclusive: Option<String>,
    pub min_exclusive: Option<String>,
    pub min_inclusive: Option<String>,
    pub total_digits: Option<usize>,
    pub fraction_digits: Option<usize>,
    /// Annotations per facet; enumeration and pattern may have several
    pub annotations: BTreeMap<FacetKind, Vec<Annotation>>,
}

impl DeclaredFacets {
    /// Create an empty facet set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, value: usize) -> Self {
        self.length = Some(value);
        self
    }

    pub fn with_min_length(mut self, value: usize) -> Self {
        self.min_length = Some(value);
        self
    }

    pub fn with_max_length(mut self, value: usize) -> Self {
        self.max_length = Some(value);
        self
    }

    /// Add a pattern; patterns of the same step are alternatives
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.pattern = Some(match self.pattern.take() {
            Some(existing) => format!("{}|{}", existing, pattern),
            None => pattern,
        });
        self
    }

    pub fn with_white_space(mut self, value: WhiteSpace) -> Self {
        self.white_space = Some(value);
        self
    }

    /// Add an enumeration value
    pub fn with_enumeration(mut self, value: impl Into<String>) -> Self {
        self.enumeration.push(EnumerationFacet {
            value: value.into(),
            namespaces: None,
        });
        self
    }

    /// Add an enumeration value declared under specific namespace bindings
    pub fn with_enumeration_in(
        mut self,
        value: impl Into<String>,
        namespaces: NamespaceContext,
    ) -> Self {
        self.enumeration.push(EnumerationFacet {
            value: value.into(),
            namespaces: Some(namespaces),
        });
        self
    }

    pub fn with_max_inclusive(mut self, value: impl Into<String>) -> Self {
        self.max_inclusive = Some(value.into());
        self
    }

    pub fn with_max_exclusive(mut self, value: impl Into<String>) -> Self {
        self.max_exclusive = Some(value.into());
        self
    }

    pub fn with_min_exclusive(mut self, value: impl Into<String>) -> Self {
        self.min_exclusive = Some(value.into());
        self
    }

    pub fn with_min_inclusive(mut self, value: impl Into<String>) -> Self {
        self.min_inclusive = Some(value.into());
        self
    }

    pub fn with_total_digits(mut self, value: usize) -> Self {
        self.total_digits = Some(value);
        self
    }

    pub fn with_fraction_digits(mut self, value: usize) -> Self {
        self.fraction_digits = Some(value);
        self
    }

    /// Attach an annotation to a facet
    pub fn with_annotation(mut self, kind: FacetKind, annotation: impl Into<Annotation>) -> Self {
        self.annotations
            .entry(kind)
            .or_default()
            .push(annotation.into());
        self
    }

    /// Set a facet from its schema name and lexical value
    pub fn with_facet(self, name: &str, value: &str) -> Result<Self> {
        let kind: FacetKind = name.parse()?;
        let count = |v: &str| {
            v.parse::<usize>()
                .map_err(|_| Error::Type(format!("Invalid value '{}' for facet '{}'", v, name)))
        };
        Ok(match kind {
            FacetKind::Length => self.with_length(count(value)?),
            FacetKind::MinLength => self.with_min_length(count(value)?),
            FacetKind::MaxLength => self.with_max_length(count(value)?),
            FacetKind::Pattern => self.with_pattern(value),
            FacetKind::WhiteSpace => self.with_white_space(value.parse()?),
            FacetKind::Enumeration => self.with_enumeration(value),
            FacetKind::MaxInclusive => self.with_max_inclusive(value),
            FacetKind::MaxExclusive => self.with_max_exclusive(value),
            FacetKind::MinExclusive => self.with_min_exclusive(value),
            FacetKind::MinInclusive => self.with_min_inclusive(value),
            FacetKind::TotalDigits => self.with_total_digits(count(value)?),
            FacetKind::FractionDigits => self.with_fraction_digits(count(value)?),
        })
    }

    /// Mask of the facets carrying a value
    pub fn present(&self) -> FacetMask {
        let mut mask = FacetMask::empty();
        mask.set(FacetMask::LENGTH, self.length.is_some());
        mask.set(FacetMask::MIN_LENGTH, self.min_length.is_some());
        mask.set(FacetMask::MAX_LENGTH, self.max_length.is_some());
        mask.set(FacetMask::PATTERN, self.pattern.is_some());
        mask.set(FacetMask::WHITESPACE, self.white_space.is_some());
        mask.set(FacetMask::ENUMERATION, !self.enumeration.is_empty());
        mask.set(FacetMask::MAX_INCLUSIVE, self.max_inclusive.is_some());
        mask.set(FacetMask::MAX_EXCLUSIVE, self.max_exclusive.is_some());
        mask.set(FacetMask::MIN_EXCLUSIVE, self.min_exclusive.is_some());
        mask.set(FacetMask::MIN_INCLUSIVE, self.min_inclusive.is_some());
        mask.set(FacetMask::TOTAL_DIGITS, self.total_digits.is_some());
        mask.set(FacetMask::FRACTION_DIGITS, self.fraction_digits.is_some());
        mask
    }

    /// First annotation of a facet
    pub(crate) fn annotation(&self, kind: FacetKind) -> Option<Annotation> {
        self.annotations.get(&kind).and_then(|a| a.first().cloned())
    }

    /// All annotations of a facet
    pub(crate) fn annotations_of(&self, kind: FacetKind) -> Vec<Annotation> {
        self.annotations.get(&kind).cloned().unwrap_or_default()
    }
}

/// Description of a single-valued facet of a type
#[derive(Debug, Clone, Serialize)]
pub struct Facet {
    pub kind: FacetKind,
    /// Lexical (canonical) value
    pub lexical_value: String,
    /// Integer value for the length and digit facets, 0 otherwise
    pub int_value: usize,
    /// Actual value for the range facets
    #[serde(skip)]
    pub actual_value: Option<ActualValue>,
    pub fixed: bool,
    pub annotation: Option<Annotation>,
}

/// Description of the pattern or enumeration facet of a type
#[derive(Debug, Clone, Serialize)]
pub struct MultiValueFacet {
    pub kind: FacetKind,
    pub lexical_values: Vec<String>,
    /// Actual values, enumeration only
    #[serde(skip)]
    pub actual_values: Vec<ActualValue>,
    pub annotations: Vec<Annotation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_whitespace_normalize() {
        assert_eq!(WhiteSpace::Preserve.normalize(" a\tb "), " a\tb ");
        assert_eq!(WhiteSpace::Replace.normalize(" a\tb\n"), " a b ");
        assert_eq!(WhiteSpace::Collapse.normalize("  a \t\n b  "), "a b");
        assert_eq!(WhiteSpace::Collapse.normalize(" \t "), "");
    }

    #[test]
    fn test_whitespace_from_str() {
        assert_eq!("collapse".parse::<WhiteSpace>().unwrap(), WhiteSpace::Collapse);
        assert!("squash".parse::<WhiteSpace>().is_err());
    }

    #[test]
    fn test_facet_kind_mask_roundtrip() {
        let mut all = FacetMask::empty();
        for kind in FacetKind::ALL {
            assert_eq!(kind.name().parse::<FacetKind>().unwrap(), kind);
            all |= kind.mask();
        }
        assert_eq!(all, FacetMask::all());
        assert_eq!(all.bits(), 0x0FFF);
    }

    #[test]
    fn test_mask_values() {
        assert_eq!(FacetMask::WHITESPACE.bits(), 16);
        assert_eq!(FacetMask::ENUMERATION.bits(), 2048);
        assert!(FacetMask::DECIMAL_FACETS.contains(FacetMask::TOTAL_DIGITS));
        assert!(!FacetMask::ORDERED_FACETS.contains(FacetMask::LENGTH));
    }

    #[test]
    fn test_declared_facets_present() {
        let facets = DeclaredFacets::new()
            .with_max_length(5)
            .with_enumeration("a")
            .with_enumeration("b");
        assert_eq!(facets.present(), FacetMask::MAX_LENGTH | FacetMask::ENUMERATION);
    }

    #[test]
    fn test_declared_patterns_are_alternatives() {
        let facets = DeclaredFacets::new().with_pattern("a+").with_pattern("b+");
        assert_eq!(facets.pattern.as_deref(), Some("a+|b+"));
    }

    #[test]
    fn test_with_facet_by_name() {
        let facets = DeclaredFacets::new()
            .with_facet("maxInclusive", "10")
            .unwrap()
            .with_facet("whiteSpace", "replace")
            .unwrap();
        assert_eq!(facets.max_inclusive.as_deref(), Some("10"));
        assert_eq!(facets.white_space, Some(WhiteSpace::Replace));
        assert!(DeclaredFacets::new().with_facet("length", "-1").is_err());
        assert!(DeclaredFacets::new().with_facet("bogus", "1").is_err());
    }

    #[test]
    fn test_special_pattern_shapes() {
        assert!(SpecialPattern::NmToken.matches("123"));
        assert!(!SpecialPattern::Name.matches("123"));
        assert!(!SpecialPattern::NcName.matches("a:b"));
        assert_eq!(SpecialPattern::NcName.lexical_patterns().len(), 2);
    }
}
