//! XSD simple type declarations
//!
//! [`SimpleTypeDecl`] describes one simple type definition:
//! - its place in the derivation hierarchy (base type, final set)
//! - its variety: atomic, list (whitespace-separated items) or union
//! - the facets it declares or inherits, with their annotations
//! - the fundamental facets derived from all of the above
//!
//! Facets are merged by [`apply_facets`](SimpleTypeDecl::apply_facets) and
//! values are checked by [`validate`](SimpleTypeDecl::validate); this module
//! holds construction and introspection.
//!
//! See: https://www.w3.org/TR/xmlschema-2/#dt-simpleType

use super::builtins::any_simple_type;
use super::datatypes::DvKind;
use super::facets::{
    Annotation, Facet, FacetKind, FacetMask, MultiValueFacet, Ordered, SpecialPattern, WhiteSpace,
};
use super::patterns::PatternMatcher;
use super::values::{ActualValue, BuiltinKind, ValidatedInfo};
use crate::error::{Error, Result, ValueError, ValueErrorKind};
use crate::XSD_NAMESPACE;
use bitflags::bitflags;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Lexical pattern reported for the integer kind
const INTEGER_PATTERN: &str = r"[\-+]?[0-9]+";

// =============================================================================
// Variety and derivation methods
// =============================================================================

/// Variety of a simple type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleTypeVariety {
    /// anySimpleType only
    Absent,
    /// Atomic type (single value)
    Atomic,
    /// List type (whitespace-separated values)
    List,
    /// Union type (value matches one of several types)
    Union,
}

bitflags! {
    /// Derivation methods, used for final sets and derivation queries
    ///
    /// The empty set means any method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct DerivationMethod: u8 {
        const RESTRICTION = 1;
        const EXTENSION = 1 << 1;
        const UNION = 1 << 2;
        const LIST = 1 << 3;
    }
}

impl DerivationMethod {
    /// Any combination of restriction, list and union
    pub const ANY: DerivationMethod = DerivationMethod::empty();
}

// =============================================================================
// Facet values
// =============================================================================

/// A pattern facet value and its compiled form
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Pattern as written in the schema
    pub source: String,
    pub matcher: Arc<dyn PatternMatcher>,
}

/// Facet values carried by a type, declared or inherited
///
/// A facet is defined exactly when its value is present; the defined mask
/// is computed from the values, never stored next to them.
#[derive(Debug, Clone, Default)]
pub(crate) struct FacetValues {
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub white_space: Option<WhiteSpace>,
    pub total_digits: Option<usize>,
    pub fraction_digits: Option<usize>,
    pub max_inclusive: Option<ActualValue>,
    pub max_exclusive: Option<ActualValue>,
    pub min_exclusive: Option<ActualValue>,
    pub min_inclusive: Option<ActualValue>,
    /// Own patterns first, then the inherited ones
    pub patterns: Vec<CompiledPattern>,
    pub enumeration: Vec<ValidatedInfo>,
    pub special_pattern: SpecialPattern,
    pub annotations: BTreeMap<FacetKind, Vec<Annotation>>,
}

impl FacetValues {
    /// Mask of the facets carrying a value
    pub fn defined(&self) -> FacetMask {
        let mut mask = FacetMask::empty();
        mask.set(FacetMask::LENGTH, self.length.is_some());
        mask.set(FacetMask::MIN_LENGTH, self.min_length.is_some());
        mask.set(FacetMask::MAX_LENGTH, self.max_length.is_some());
        mask.set(FacetMask::PATTERN, !self.patterns.is_empty());
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

    pub fn annotation(&self, kind: FacetKind) -> Option<Annotation> {
        self.annotations.get(&kind).and_then(|a| a.first().cloned())
    }
}

/// The fundamental facets of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FundamentalFacets {
    pub ordered: Ordered,
    pub bounded: bool,
    pub finite: bool,
    pub numeric: bool,
}

// =============================================================================
// Simple Type Declaration
// =============================================================================

/// An XML Schema simple type definition
///
/// Types are built with [`restriction`](Self::restriction),
/// [`list`](Self::list) or [`union`](Self::union), then restricted further
/// with [`apply_facets`](Self::apply_facets). Built-in types are shared,
/// immutable instances obtained from
/// [`get_builtin_type`](super::builtins::get_builtin_type).
#[derive(Debug, Clone)]
pub struct SimpleTypeDecl {
    name: Option<String>,
    namespace: Option<String>,
    anonymous: bool,
    final_set: DerivationMethod,
    /// `None` for anySimpleType, which is its own base
    pub(crate) base: Option<Arc<SimpleTypeDecl>>,
    pub(crate) variety: SimpleTypeVariety,
    pub(crate) kind: DvKind,
    pub(crate) builtin_kind: BuiltinKind,
    pub(crate) item_type: Option<Arc<SimpleTypeDecl>>,
    pub(crate) member_types: Vec<Arc<SimpleTypeDecl>>,
    pub(crate) facets: FacetValues,
    pub(crate) fixed: FacetMask,
    ordered: Ordered,
    bounded: bool,
    finite: bool,
    numeric: bool,
    annotations: Vec<Annotation>,
    pub(crate) immutable: bool,
}

impl Default for SimpleTypeDecl {
    /// A blank, mutable declaration waiting for one of the `set_*_values`
    fn default() -> Self {
        Self {
            name: None,
            namespace: None,
            anonymous: false,
            final_set: DerivationMethod::empty(),
            base: None,
            variety: SimpleTypeVariety::Absent,
            kind: DvKind::AnySimple,
            builtin_kind: BuiltinKind::AnySimpleType,
            item_type: None,
            member_types: Vec::new(),
            facets: FacetValues::default(),
            fixed: FacetMask::empty(),
            ordered: Ordered::False,
            bounded: false,
            finite: false,
            numeric: false,
            annotations: Vec::new(),
            immutable: false,
        }
    }
}

impl SimpleTypeDecl {
    /// Built-in type validated directly by its own kind
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn primitive(
        base: Option<Arc<SimpleTypeDecl>>,
        name: &str,
        kind: DvKind,
        builtin_kind: BuiltinKind,
        ordered: Ordered,
        bounded: bool,
        finite: bool,
        numeric: bool,
    ) -> Self {
        let (white_space, fixed) = match kind {
            DvKind::AnySimple | DvKind::AnyAtomic | DvKind::String => {
                (WhiteSpace::Preserve, FacetMask::empty())
            }
            _ => (WhiteSpace::Collapse, FacetMask::WHITESPACE),
        };

        Self {
            name: Some(name.to_string()),
            namespace: Some(XSD_NAMESPACE.to_string()),
            base,
            variety: SimpleTypeVariety::Atomic,
            kind,
            builtin_kind,
            facets: FacetValues {
                white_space: Some(white_space),
                ..FacetValues::default()
            },
            fixed,
            ordered,
            bounded,
            finite,
            numeric,
            immutable: true,
            ..Self::default()
        }
    }

    /// Create a type derived by restriction from `base`
    ///
    /// The new type starts with every facet of its base; facets of its own
    /// are added with [`apply_facets`](Self::apply_facets).
    pub fn restriction(
        base: Arc<SimpleTypeDecl>,
        name: Option<&str>,
        namespace: Option<&str>,
        final_set: DerivationMethod,
        annotations: Vec<Annotation>,
    ) -> Self {
        let mut decl = Self::default();
        decl.set_restriction_values(base, name, namespace, final_set, annotations);
        decl
    }

    /// Create a list type
    ///
    /// Fails when the item type is itself a list.
    pub fn list(
        name: Option<&str>,
        namespace: Option<&str>,
        final_set: DerivationMethod,
        item_type: Arc<SimpleTypeDecl>,
        annotations: Vec<Annotation>,
    ) -> Result<Self> {
        let mut decl = Self::default();
        decl.set_list_values(name, namespace, final_set, item_type, annotations)?;
        Ok(decl)
    }

    /// Create a union type; members are tried in the given order
    ///
    /// Fails when no member type is given.
    pub fn union(
        name: Option<&str>,
        namespace: Option<&str>,
        final_set: DerivationMethod,
        member_types: Vec<Arc<SimpleTypeDecl>>,
        annotations: Vec<Annotation>,
    ) -> Result<Self> {
        let mut decl = Self::default();
        decl.set_union_values(name, namespace, final_set, member_types, annotations)?;
        Ok(decl)
    }

    /// Re-initialize as a restriction of `base`; no-op on immutable types
    pub fn set_restriction_values(
        &mut self,
        base: Arc<SimpleTypeDecl>,
        name: Option<&str>,
        namespace: Option<&str>,
        final_set: DerivationMethod,
        annotations: Vec<Annotation>,
    ) {
        if self.immutable {
            return;
        }

        self.set_identity(name, namespace, final_set, annotations);
        self.variety = base.variety;
        self.kind = base.kind;
        self.builtin_kind = base.builtin_kind;
        self.item_type = base.item_type.clone();
        self.member_types = base.member_types.clone();
        self.facets = base.facets.clone();
        self.fixed = base.fixed;
        self.base = Some(base);
        self.calc_fundamental_facets();
    }

    /// Re-initialize as a list type; no-op on immutable types
    pub fn set_list_values(
        &mut self,
        name: Option<&str>,
        namespace: Option<&str>,
        final_set: DerivationMethod,
        item_type: Arc<SimpleTypeDecl>,
        annotations: Vec<Annotation>,
    ) -> Result<()> {
        if self.immutable {
            return Ok(());
        }
        if item_type.variety == SimpleTypeVariety::List {
            return Err(Error::Type(format!(
                "The item type of list type '{}' must be atomic or union, '{}' is a list",
                name.unwrap_or("anonymous"),
                item_type.type_name()
            )));
        }

        self.set_identity(name, namespace, final_set, annotations);
        self.base = Some(any_simple_type());
        self.variety = SimpleTypeVariety::List;
        self.kind = DvKind::List;
        self.builtin_kind = BuiltinKind::List;
        self.item_type = Some(item_type);
        self.member_types = Vec::new();
        self.facets = FacetValues {
            white_space: Some(WhiteSpace::Collapse),
            ..FacetValues::default()
        };
        self.fixed = FacetMask::WHITESPACE;
        self.calc_fundamental_facets();
        Ok(())
    }

    /// Re-initialize as a union type; no-op on immutable types
    pub fn set_union_values(
        &mut self,
        name: Option<&str>,
        namespace: Option<&str>,
        final_set: DerivationMethod,
        member_types: Vec<Arc<SimpleTypeDecl>>,
        annotations: Vec<Annotation>,
    ) -> Result<()> {
        if self.immutable {
            return Ok(());
        }
        if member_types.is_empty() {
            return Err(Error::Type(format!(
                "Union type '{}' must have at least one member type",
                name.unwrap_or("anonymous")
            )));
        }

        self.set_identity(name, namespace, final_set, annotations);
        self.base = Some(any_simple_type());
        self.variety = SimpleTypeVariety::Union;
        self.kind = DvKind::Union;
        self.builtin_kind = BuiltinKind::Unavailable;
        self.item_type = None;
        self.member_types = member_types;
        self.facets = FacetValues {
            white_space: Some(WhiteSpace::Collapse),
            ..FacetValues::default()
        };
        self.fixed = FacetMask::empty();
        self.calc_fundamental_facets();
        Ok(())
    }

    fn set_identity(
        &mut self,
        name: Option<&str>,
        namespace: Option<&str>,
        final_set: DerivationMethod,
        annotations: Vec<Annotation>,
    ) {
        self.name = name.map(str::to_string);
        self.namespace = namespace.map(str::to_string);
        self.anonymous = name.is_none();
        self.final_set = final_set;
        self.annotations = annotations;
    }

    /// Clear everything so the instance can be re-initialized; no-op on
    /// immutable types
    pub fn reset(&mut self) {
        if self.immutable {
            return;
        }
        *self = Self::default();
    }

    /// Mark the type as anonymous; [`name`](Self::name) then returns `None`
    pub fn set_anonymous(&mut self, anonymous: bool) {
        if !self.immutable {
            self.anonymous = anonymous;
        }
    }

    /// Freeze the type: every later mutation is a no-op
    pub fn set_immutable(&mut self) {
        self.immutable = true;
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------

    /// Declared name, `None` for anonymous types
    pub fn name(&self) -> Option<&str> {
        if self.anonymous {
            None
        } else {
            self.name.as_deref()
        }
    }

    /// Name used in error messages
    pub fn type_name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }

    /// Target namespace
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Name in `{namespace}local` form
    pub fn expanded_name(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{{{}}}{}", ns, self.type_name()),
            _ => self.type_name().to_string(),
        }
    }

    pub fn final_set(&self) -> DerivationMethod {
        self.final_set
    }

    /// Whether derivation by `method` is blocked
    pub fn is_final(&self, method: DerivationMethod) -> bool {
        self.final_set.intersects(method)
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    /// Base type; anySimpleType is its own base
    pub fn base_type(&self) -> &SimpleTypeDecl {
        self.base.as_deref().unwrap_or(self)
    }

    /// Shared handle to the base type, `None` for anySimpleType
    pub fn base(&self) -> Option<&Arc<SimpleTypeDecl>> {
        self.base.as_ref()
    }

    /// Whether this is the root of the simple type hierarchy
    pub fn is_any_simple_type(&self) -> bool {
        self.base.is_none()
    }

    pub fn variety(&self) -> SimpleTypeVariety {
        if self.kind == DvKind::AnySimple {
            SimpleTypeVariety::Absent
        } else {
            self.variety
        }
    }

    /// Validation kind selecting the datatype validator
    pub fn validation_kind(&self) -> DvKind {
        self.kind
    }

    pub fn builtin_kind(&self) -> BuiltinKind {
        self.builtin_kind
    }

    /// Primitive kind of an atomic type
    pub fn primitive_kind(&self) -> Option<DvKind> {
        if self.variety == SimpleTypeVariety::Atomic && self.kind != DvKind::AnySimple {
            Some(self.kind.primitive())
        } else {
            None
        }
    }

    /// Primitive type an atomic type derives from
    pub fn primitive_type(&self) -> Option<&SimpleTypeDecl> {
        if self.variety != SimpleTypeVariety::Atomic || self.kind == DvKind::AnySimple {
            return None;
        }
        let mut current = self;
        while let Some(base) = current.base.as_deref() {
            if base.is_any_simple_type() {
                break;
            }
            current = base;
        }
        Some(current)
    }

    /// Item type of a list
    pub fn item_type(&self) -> Option<&Arc<SimpleTypeDecl>> {
        self.item_type.as_ref()
    }

    /// Member types of a union, in declaration order
    pub fn member_types(&self) -> &[Arc<SimpleTypeDecl>] {
        &self.member_types
    }

    /// Whether values of this type are IDs
    pub fn is_id_type(&self) -> bool {
        match self.variety {
            SimpleTypeVariety::List => self.item_type.as_ref().map_or(false, |t| t.is_id_type()),
            SimpleTypeVariety::Union => self.member_types.iter().any(|t| t.is_id_type()),
            _ => self.kind == DvKind::Id,
        }
    }

    // -------------------------------------------------------------------------
    // Fundamental facets
    // -------------------------------------------------------------------------

    pub fn ordered(&self) -> Ordered {
        self.ordered
    }

    pub fn bounded(&self) -> bool {
        self.bounded
    }

    pub fn finite(&self) -> bool {
        self.finite
    }

    pub fn numeric(&self) -> bool {
        self.numeric
    }

    pub fn fundamental_facets(&self) -> FundamentalFacets {
        FundamentalFacets {
            ordered: self.ordered,
            bounded: self.bounded,
            finite: self.finite,
            numeric: self.numeric,
        }
    }

    /// Recompute the fundamental facets from the variety and the facets
    pub(crate) fn calc_fundamental_facets(&mut self) {
        self.ordered = self.compute_ordered();
        self.numeric = self.compute_numeric();
        self.bounded = self.compute_bounded();
        self.finite = self.compute_finite();
    }

    fn common_primitive(members: &[Arc<SimpleTypeDecl>]) -> Option<DvKind> {
        let first = members.first()?.kind.primitive();
        members
            .iter()
            .all(|m| m.kind.primitive() == first)
            .then_some(first)
    }

    fn compute_ordered(&self) -> Ordered {
        match self.variety {
            SimpleTypeVariety::List => Ordered::False,
            SimpleTypeVariety::Union => {
                let members = &self.member_types;
                if members.is_empty() {
                    return Ordered::Partial;
                }
                match Self::common_primitive(members) {
                    Some(kind) if kind != DvKind::AnySimple => members[0].ordered,
                    _ if members.iter().all(|m| m.ordered == Ordered::False) => Ordered::False,
                    _ => Ordered::Partial,
                }
            }
            _ => self.base_type().ordered,
        }
    }

    fn compute_numeric(&self) -> bool {
        match self.variety {
            SimpleTypeVariety::List => false,
            SimpleTypeVariety::Union => self.member_types.iter().all(|m| m.numeric),
            _ => self.base_type().numeric,
        }
    }

    fn compute_bounded(&self) -> bool {
        let defined = self.facets.defined();
        match self.variety {
            SimpleTypeVariety::List => {
                defined.contains(FacetMask::LENGTH)
                    || defined.contains(FacetMask::MIN_LENGTH | FacetMask::MAX_LENGTH)
            }
            SimpleTypeVariety::Union => {
                Self::common_primitive(&self.member_types).is_some()
                    && self.member_types.iter().all(|m| m.bounded)
            }
            _ => {
                defined.intersects(FacetMask::MIN_INCLUSIVE | FacetMask::MIN_EXCLUSIVE)
                    && defined.intersects(FacetMask::MAX_INCLUSIVE | FacetMask::MAX_EXCLUSIVE)
            }
        }
    }

    fn compute_finite(&self) -> bool {
        match self.variety {
            SimpleTypeVariety::List => {
                let defined = self.facets.defined();
                defined.contains(FacetMask::LENGTH)
                    || defined.contains(FacetMask::MIN_LENGTH | FacetMask::MAX_LENGTH)
            }
            SimpleTypeVariety::Union => self.member_types.iter().all(|m| m.finite),
            _ => {
                let base = self.base_type();
                if base.finite {
                    return true;
                }
                // the implicit fractionDigits=0 of the integer kind counts
                let defined = self.defined_facets();
                if defined.intersects(
                    FacetMask::LENGTH | FacetMask::MAX_LENGTH | FacetMask::TOTAL_DIGITS,
                ) {
                    return true;
                }
                defined.intersects(FacetMask::MIN_INCLUSIVE | FacetMask::MIN_EXCLUSIVE)
                    && defined.intersects(FacetMask::MAX_INCLUSIVE | FacetMask::MAX_EXCLUSIVE)
                    && (defined.contains(FacetMask::FRACTION_DIGITS)
                        || base.kind.is_partial_date())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Facet introspection
    // -------------------------------------------------------------------------

    fn hides_facets(&self) -> bool {
        matches!(self.kind, DvKind::AnySimple | DvKind::AnyAtomic)
    }

    /// Whether a facet is defined on this type, declared or inherited
    pub fn is_defined_facet(&self, kind: FacetKind) -> bool {
        self.defined_facets().contains(kind.mask())
    }

    /// Mask of the facets defined on this type
    ///
    /// Name types report their shape check as a pattern, and the integer
    /// kind reports its implicit pattern and fractionDigits.
    pub fn defined_facets(&self) -> FacetMask {
        if self.hides_facets() {
            return FacetMask::empty();
        }
        let mut mask = self.facets.defined();
        if self.facets.special_pattern != SpecialPattern::None {
            mask |= FacetMask::PATTERN;
        }
        if self.kind == DvKind::Integer {
            mask |= FacetMask::PATTERN | FacetMask::FRACTION_DIGITS;
        }
        mask
    }

    pub fn is_fixed_facet(&self, kind: FacetKind) -> bool {
        self.fixed_facets().contains(kind.mask())
    }

    /// Mask of the facets fixed on this type or an ancestor
    pub fn fixed_facets(&self) -> FacetMask {
        if self.kind == DvKind::Integer {
            self.fixed | FacetMask::FRACTION_DIGITS
        } else {
            self.fixed
        }
    }

    /// Lexical value of a single-valued facet
    pub fn lexical_facet_value(&self, kind: FacetKind) -> Option<String> {
        let f = &self.facets;
        match kind {
            FacetKind::Length => f.length.map(|v| v.to_string()),
            FacetKind::MinLength => f.min_length.map(|v| v.to_string()),
            FacetKind::MaxLength => f.max_length.map(|v| v.to_string()),
            FacetKind::WhiteSpace => {
                if self.hides_facets() {
                    None
                } else {
                    f.white_space.map(|ws| ws.as_str().to_string())
                }
            }
            FacetKind::MaxInclusive => f.max_inclusive.as_ref().map(ToString::to_string),
            FacetKind::MaxExclusive => f.max_exclusive.as_ref().map(ToString::to_string),
            FacetKind::MinExclusive => f.min_exclusive.as_ref().map(ToString::to_string),
            FacetKind::MinInclusive => f.min_inclusive.as_ref().map(ToString::to_string),
            FacetKind::TotalDigits => f.total_digits.map(|v| v.to_string()),
            FacetKind::FractionDigits => {
                if self.kind == DvKind::Integer {
                    Some("0".to_string())
                } else {
                    f.fraction_digits.map(|v| v.to_string())
                }
            }
            FacetKind::Pattern | FacetKind::Enumeration => None,
        }
    }

    /// Normalized lexical forms of the enumeration values
    pub fn lexical_enumeration(&self) -> Vec<String> {
        self.facets
            .enumeration
            .iter()
            .map(|e| e.normalized_value.clone())
            .collect()
    }

    /// Actual values of the enumeration
    pub fn actual_enumeration(&self) -> Vec<&ActualValue> {
        self.facets
            .enumeration
            .iter()
            .map(|e| &e.actual_value)
            .collect()
    }

    /// Built-in kind of each enumeration value
    pub fn enumeration_type_list(&self) -> Vec<BuiltinKind> {
        self.facets
            .enumeration
            .iter()
            .map(|e| e.actual_value_type)
            .collect()
    }

    /// Item kinds of each enumeration value of a list type
    pub fn enumeration_item_type_list(&self) -> Vec<Vec<BuiltinKind>> {
        self.facets
            .enumeration
            .iter()
            .map(|e| e.item_value_types.clone())
            .collect()
    }

    /// Pattern facet values, followed by the implicit patterns of name and
    /// integer types
    pub fn lexical_pattern(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self
            .facets
            .patterns
            .iter()
            .map(|p| p.source.clone())
            .collect();
        match self.facets.special_pattern {
            SpecialPattern::None if self.kind == DvKind::Integer => {
                patterns.push(INTEGER_PATTERN.to_string());
            }
            special => patterns.extend(special.lexical_patterns().iter().map(|p| p.to_string())),
        }
        patterns
    }

    pub fn min_inclusive_value(&self) -> Option<&ActualValue> {
        self.facets.min_inclusive.as_ref()
    }

    pub fn min_exclusive_value(&self) -> Option<&ActualValue> {
        self.facets.min_exclusive.as_ref()
    }

    pub fn max_inclusive_value(&self) -> Option<&ActualValue> {
        self.facets.max_inclusive.as_ref()
    }

    pub fn max_exclusive_value(&self) -> Option<&ActualValue> {
        self.facets.max_exclusive.as_ref()
    }

    /// whiteSpace facet value; unions have none
    pub fn white_space(&self) -> Result<WhiteSpace> {
        if self.variety == SimpleTypeVariety::Union {
            return Err(ValueError::new(ValueErrorKind::DtWhitespace, [self.type_name()]).into());
        }
        Ok(self.facets.white_space.unwrap_or(WhiteSpace::Preserve))
    }

    /// Descriptions of the single-valued facets defined on this type
    pub fn facets(&self) -> Vec<Facet> {
        const ORDER: [FacetKind; 10] = [
            FacetKind::WhiteSpace,
            FacetKind::Length,
            FacetKind::MinLength,
            FacetKind::MaxLength,
            FacetKind::TotalDigits,
            FacetKind::FractionDigits,
            FacetKind::MaxInclusive,
            FacetKind::MaxExclusive,
            FacetKind::MinExclusive,
            FacetKind::MinInclusive,
        ];
        ORDER.iter().filter_map(|kind| self.facet(*kind)).collect()
    }

    /// Description of one single-valued facet, if defined
    pub fn facet(&self, kind: FacetKind) -> Option<Facet> {
        if kind.is_multi_valued() || !self.is_defined_facet(kind) {
            return None;
        }
        let f = &self.facets;
        let lexical_value = self.lexical_facet_value(kind)?;
        let (int_value, actual_value) = match kind {
            FacetKind::WhiteSpace => (
                match f.white_space {
                    Some(WhiteSpace::Replace) => 1,
                    Some(WhiteSpace::Collapse) => 2,
                    _ => 0,
                },
                None,
            ),
            FacetKind::Length => (f.length.unwrap_or(0), None),
            FacetKind::MinLength => (f.min_length.unwrap_or(0), None),
            FacetKind::MaxLength => (f.max_length.unwrap_or(0), None),
            FacetKind::TotalDigits => (f.total_digits.unwrap_or(0), None),
            FacetKind::FractionDigits => (f.fraction_digits.unwrap_or(0), None),
            FacetKind::MaxInclusive => (0, f.max_inclusive.clone()),
            FacetKind::MaxExclusive => (0, f.max_exclusive.clone()),
            FacetKind::MinExclusive => (0, f.min_exclusive.clone()),
            FacetKind::MinInclusive => (0, f.min_inclusive.clone()),
            FacetKind::Pattern | FacetKind::Enumeration => return None,
        };
        Some(Facet {
            kind,
            lexical_value,
            int_value,
            actual_value,
            fixed: self.is_fixed_facet(kind),
            annotation: f.annotation(kind),
        })
    }

    /// Descriptions of the pattern and enumeration facets
    pub fn multi_value_facets(&self) -> Vec<MultiValueFacet> {
        [FacetKind::Pattern, FacetKind::Enumeration]
            .iter()
            .filter_map(|kind| self.multi_value_facet(*kind))
            .collect()
    }

    /// Description of the pattern or enumeration facet, if defined
    pub fn multi_value_facet(&self, kind: FacetKind) -> Option<MultiValueFacet> {
        let annotations = self
            .facets
            .annotations
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        match kind {
            FacetKind::Pattern if self.is_defined_facet(kind) => Some(MultiValueFacet {
                kind,
                lexical_values: self.lexical_pattern(),
                actual_values: Vec::new(),
                annotations,
            }),
            FacetKind::Enumeration if !self.facets.enumeration.is_empty() => {
                Some(MultiValueFacet {
                    kind,
                    lexical_values: self.lexical_enumeration(),
                    actual_values: self.actual_enumeration().into_iter().cloned().collect(),
                    annotations,
                })
            }
            _ => None,
        }
    }

    /// Enumeration values as `[a, b]`
    pub(crate) fn enumeration_string(&self) -> String {
        let values: Vec<String> = self
            .facets
            .enumeration
            .iter()
            .map(|e| e.actual_value.to_string())
            .collect();
        format!("[{}]", values.join(", "))
    }

    // -------------------------------------------------------------------------
    // Value equality
    // -------------------------------------------------------------------------

    /// Value-space equality
    pub fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        a == b
    }

    /// Identity, which separates 0 from -0 for float and double
    pub fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        self.kind.validator().is_identical(a, b)
    }

    // -------------------------------------------------------------------------
    // Derivation
    // -------------------------------------------------------------------------

    fn has_name(&self, namespace: Option<&str>, name: &str) -> bool {
        self.name() == Some(name) && self.namespace() == namespace
    }

    /// Whether this type is `ancestor` or derives from it by restriction
    ///
    /// Identity based; anySimpleType is an ancestor of every type.
    pub fn derived_from_type(&self, ancestor: &SimpleTypeDecl) -> bool {
        if ancestor.is_any_simple_type() {
            return true;
        }
        let mut current = self;
        loop {
            if std::ptr::eq(current, ancestor) {
                return true;
            }
            match current.base.as_deref() {
                Some(base) => current = base,
                None => return false,
            }
        }
    }

    /// Whether this type or one of its bases has the given name
    pub fn derived_from(&self, namespace: Option<&str>, name: &str) -> bool {
        if namespace == Some(XSD_NAMESPACE) && name == "anyType" {
            return true;
        }
        let mut current = self;
        loop {
            if current.has_name(namespace, name) {
                return !current.is_any_simple_type();
            }
            match current.base.as_deref() {
                Some(base) => current = base,
                None => return false,
            }
        }
    }

    /// Whether this type derives from the named type by the given methods
    ///
    /// With [`DerivationMethod::ANY`] restriction, list and union steps are
    /// followed in any combination.
    pub fn is_derived_from(
        &self,
        namespace: Option<&str>,
        name: &str,
        method: DerivationMethod,
    ) -> bool {
        if namespace == Some(XSD_NAMESPACE)
            && name == "anyType"
            && (method.contains(DerivationMethod::RESTRICTION) || method.is_empty())
        {
            return true;
        }

        if method.contains(DerivationMethod::RESTRICTION)
            && self.is_derived_by_restriction(namespace, name)
        {
            return true;
        }
        if method.contains(DerivationMethod::LIST) && self.is_derived_by_list(namespace, name) {
            return true;
        }
        if method.contains(DerivationMethod::UNION) && self.is_derived_by_union(namespace, name) {
            return true;
        }

        method.is_empty() && self.is_derived_by_any(namespace, name)
    }

    fn is_derived_by_restriction(&self, namespace: Option<&str>, name: &str) -> bool {
        let mut current = self;
        loop {
            if current.has_name(namespace, name) {
                return true;
            }
            match current.base.as_deref() {
                Some(base) => current = base,
                None => return false,
            }
        }
    }

    fn is_derived_by_list(&self, namespace: Option<&str>, name: &str) -> bool {
        self.variety == SimpleTypeVariety::List
            && self
                .item_type
                .as_ref()
                .map_or(false, |item| item.is_derived_by_restriction(namespace, name))
    }

    fn is_derived_by_union(&self, namespace: Option<&str>, name: &str) -> bool {
        self.variety == SimpleTypeVariety::Union
            && self
                .member_types
                .iter()
                .any(|member| member.is_derived_by_restriction(namespace, name))
    }

    fn is_derived_by_any(&self, namespace: Option<&str>, name: &str) -> bool {
        let mut current = self;
        loop {
            if current.has_name(namespace, name)
                || current.is_derived_by_restriction(namespace, name)
                || current.is_derived_by_list(namespace, name)
                || current.is_derived_by_union(namespace, name)
            {
                return true;
            }
            let next = match current.variety() {
                SimpleTypeVariety::List => current.item_type.as_deref(),
                // only the first member is followed
                SimpleTypeVariety::Union => {
                    return current
                        .member_types
                        .first()
                        .map_or(false, |m| m.is_derived_by_any(namespace, name));
                }
                _ => current.base.as_deref(),
            };
            match next {
                Some(next) if !std::ptr::eq(next, current) => current = next,
                _ => return false,
            }
        }
    }
}

impl fmt::Display for SimpleTypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expanded_name())
    }
}
