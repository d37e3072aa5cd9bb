//! XSD built-in types
//!
//! This module builds the built-in primitive and derived simple types of
//! XML Schema. Primitives are created directly; derived built-ins are
//! restrictions of their base with the facets the XML Schema datatypes
//! recommendation gives them, applied through the regular facet algorithm.
//! Every built-in is frozen once created and shared through an `Arc`.

use super::context::FacetValueContext;
use super::datatypes::DvKind;
use super::facets::{DeclaredFacets, FacetMask, Ordered, SpecialPattern, WhiteSpace};
use super::simple_types::{DerivationMethod, SimpleTypeDecl};
use super::values::BuiltinKind;
use crate::error::{Error, Result};
use crate::XSD_NAMESPACE;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Lexical pattern of the language type
pub const LANGUAGE_PATTERN: &str = "([a-zA-Z]{1,8})(-[a-zA-Z0-9]{1,8})*";

lazy_static::lazy_static! {
    /// Root of the simple type hierarchy
    static ref ANY_SIMPLE_TYPE: Arc<SimpleTypeDecl> = Arc::new(SimpleTypeDecl::primitive(
        None,
        "anySimpleType",
        DvKind::AnySimple,
        BuiltinKind::AnySimpleType,
        Ordered::False,
        false,
        true,
        false,
    ));

    /// Built-in types by local name, in declaration order
    static ref BUILTIN_TYPES: IndexMap<&'static str, Arc<SimpleTypeDecl>> = {
        let registry = build_registry().expect("built-in facets are consistent");
        debug!(count = registry.len(), "built-in simple types created");
        registry
    };
}

/// The anySimpleType singleton
pub fn any_simple_type() -> Arc<SimpleTypeDecl> {
    Arc::clone(&ANY_SIMPLE_TYPE)
}

/// Look up a built-in type by its local name in the XSD namespace
pub fn get_builtin_type(name: &str) -> Option<Arc<SimpleTypeDecl>> {
    BUILTIN_TYPES.get(name).cloned()
}

/// Names of the built-in types, in declaration order
pub fn builtin_type_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_TYPES.keys().copied()
}

/// Whether a name denotes a built-in type
pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains_key(name)
}

// =============================================================================
// Registry construction
// =============================================================================

struct Registry {
    types: IndexMap<&'static str, Arc<SimpleTypeDecl>>,
}

impl Registry {
    fn get(&self, name: &str) -> Result<Arc<SimpleTypeDecl>> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Type(format!("built-in type '{}' is not defined yet", name)))
    }

    fn insert(&mut self, name: &'static str, mut decl: SimpleTypeDecl) {
        decl.set_immutable();
        self.types.insert(name, Arc::new(decl));
    }

    #[allow(clippy::too_many_arguments)]
    fn primitive(
        &mut self,
        name: &'static str,
        base: &str,
        kind: DvKind,
        builtin_kind: BuiltinKind,
        ordered: Ordered,
        bounded: bool,
        finite: bool,
        numeric: bool,
    ) -> Result<()> {
        let base = self.get(base)?;
        let decl = SimpleTypeDecl::primitive(
            Some(base),
            name,
            kind,
            builtin_kind,
            ordered,
            bounded,
            finite,
            numeric,
        );
        self.insert(name, decl);
        Ok(())
    }

    fn restrict(
        &mut self,
        name: &'static str,
        base: &str,
        builtin_kind: BuiltinKind,
        facets: DeclaredFacets,
        special: SpecialPattern,
    ) -> Result<()> {
        let base = self.get(base)?;
        let mut decl = SimpleTypeDecl::restriction(
            base,
            Some(name),
            Some(XSD_NAMESPACE),
            DerivationMethod::empty(),
            Vec::new(),
        );
        decl.builtin_kind = builtin_kind;
        decl.apply_facets_with_pattern(
            &facets,
            facets.present(),
            FacetMask::empty(),
            special,
            &mut FacetValueContext,
        )?;
        self.insert(name, decl);
        Ok(())
    }

    fn integer(
        &mut self,
        name: &'static str,
        base: &str,
        kind: BuiltinKind,
        min: Option<&str>,
        max: Option<&str>,
    ) -> Result<()> {
        let mut facets = DeclaredFacets::new();
        if let Some(min) = min {
            facets = facets.with_min_inclusive(min);
        }
        if let Some(max) = max {
            facets = facets.with_max_inclusive(max);
        }
        self.restrict(name, base, kind, facets, SpecialPattern::None)
    }

    /// A list of `item` with at least one item
    fn list(&mut self, name: &'static str, item: &str) -> Result<()> {
        let item = self.get(item)?;
        let mut list = SimpleTypeDecl::list(
            None,
            Some(XSD_NAMESPACE),
            DerivationMethod::empty(),
            item,
            Vec::new(),
        )?;
        list.set_immutable();
        let facets = DeclaredFacets::new().with_min_length(1);
        let mut decl = SimpleTypeDecl::restriction(
            Arc::new(list),
            Some(name),
            Some(XSD_NAMESPACE),
            DerivationMethod::empty(),
            Vec::new(),
        );
        decl.apply_facets(&facets, facets.present(), FacetMask::empty(), &mut FacetValueContext)?;
        self.insert(name, decl);
        Ok(())
    }
}

fn build_registry() -> Result<IndexMap<&'static str, Arc<SimpleTypeDecl>>> {
    use BuiltinKind as B;
    use DvKind as K;
    use Ordered::{False, Partial, Total};

    let mut r = Registry {
        types: IndexMap::new(),
    };
    r.types.insert("anySimpleType", any_simple_type());

    r.primitive("anyAtomicType", "anySimpleType", K::AnyAtomic, B::AnyAtomicType, False, false, true, false)?;
    r.primitive("string", "anySimpleType", K::String, B::String, False, false, false, false)?;
    r.primitive("boolean", "anySimpleType", K::Boolean, B::Boolean, False, false, true, false)?;
    r.primitive("decimal", "anySimpleType", K::Decimal, B::Decimal, Total, false, false, true)?;
    r.primitive("precisionDecimal", "anySimpleType", K::PrecisionDecimal, B::PrecisionDecimal, Partial, false, false, true)?;
    r.primitive("float", "anySimpleType", K::Float, B::Float, Partial, true, true, true)?;
    r.primitive("double", "anySimpleType", K::Double, B::Double, Partial, true, true, true)?;
    r.primitive("duration", "anySimpleType", K::Duration, B::Duration, Partial, false, false, false)?;
    r.primitive("dateTime", "anySimpleType", K::DateTime, B::DateTime, Partial, false, false, false)?;
    r.primitive("time", "anySimpleType", K::Time, B::Time, Partial, false, false, false)?;
    r.primitive("date", "anySimpleType", K::Date, B::Date, Partial, false, false, false)?;
    r.primitive("gYearMonth", "anySimpleType", K::GYearMonth, B::GYearMonth, Partial, false, false, false)?;
    r.primitive("gYear", "anySimpleType", K::GYear, B::GYear, Partial, false, false, false)?;
    r.primitive("gMonthDay", "anySimpleType", K::GMonthDay, B::GMonthDay, Partial, false, false, false)?;
    r.primitive("gDay", "anySimpleType", K::GDay, B::GDay, Partial, false, false, false)?;
    r.primitive("gMonth", "anySimpleType", K::GMonth, B::GMonth, Partial, false, false, false)?;
    r.primitive("hexBinary", "anySimpleType", K::HexBinary, B::HexBinary, False, false, false, false)?;
    r.primitive("base64Binary", "anySimpleType", K::Base64Binary, B::Base64Binary, False, false, false, false)?;
    r.primitive("anyURI", "anySimpleType", K::AnyUri, B::AnyUri, False, false, false, false)?;
    r.primitive("QName", "anySimpleType", K::QName, B::QName, False, false, false, false)?;
    r.primitive("NOTATION", "anySimpleType", K::Notation, B::Notation, False, false, false, false)?;

    r.primitive("yearMonthDuration", "duration", K::YearMonthDuration, B::YearMonthDuration, Partial, false, false, false)?;
    r.primitive("dayTimeDuration", "duration", K::DayTimeDuration, B::DayTimeDuration, Partial, false, false, false)?;

    // string family
    let ws = |value| DeclaredFacets::new().with_white_space(value);
    r.restrict("normalizedString", "string", B::NormalizedString, ws(WhiteSpace::Replace), SpecialPattern::None)?;
    r.restrict("token", "normalizedString", B::Token, ws(WhiteSpace::Collapse), SpecialPattern::None)?;
    r.restrict(
        "language",
        "token",
        B::Language,
        DeclaredFacets::new().with_pattern(LANGUAGE_PATTERN),
        SpecialPattern::None,
    )?;
    r.restrict("NMTOKEN", "token", B::NmToken, DeclaredFacets::new(), SpecialPattern::NmToken)?;
    r.restrict("Name", "token", B::Name, DeclaredFacets::new(), SpecialPattern::Name)?;
    r.restrict("NCName", "Name", B::NcName, DeclaredFacets::new(), SpecialPattern::NcName)?;
    r.primitive("ID", "NCName", K::Id, B::Id, False, false, false, false)?;
    r.primitive("IDREF", "NCName", K::IdRef, B::IdRef, False, false, false, false)?;
    r.primitive("ENTITY", "NCName", K::Entity, B::Entity, False, false, false, false)?;

    // integer family
    r.primitive("integer", "decimal", K::Integer, B::Integer, Total, false, false, true)?;
    r.integer("nonPositiveInteger", "integer", B::NonPositiveInteger, None, Some("0"))?;
    r.integer("negativeInteger", "nonPositiveInteger", B::NegativeInteger, None, Some("-1"))?;
    r.integer(
        "long",
        "integer",
        B::Long,
        Some("-9223372036854775808"),
        Some("9223372036854775807"),
    )?;
    r.integer("int", "long", B::Int, Some("-2147483648"), Some("2147483647"))?;
    r.integer("short", "int", B::Short, Some("-32768"), Some("32767"))?;
    r.integer("byte", "short", B::Byte, Some("-128"), Some("127"))?;
    r.integer("nonNegativeInteger", "integer", B::NonNegativeInteger, Some("0"), None)?;
    r.integer("unsignedLong", "nonNegativeInteger", B::UnsignedLong, None, Some("18446744073709551615"))?;
    r.integer("unsignedInt", "unsignedLong", B::UnsignedInt, None, Some("4294967295"))?;
    r.integer("unsignedShort", "unsignedInt", B::UnsignedShort, None, Some("65535"))?;
    r.integer("unsignedByte", "unsignedShort", B::UnsignedByte, None, Some("255"))?;
    r.integer("positiveInteger", "nonNegativeInteger", B::PositiveInteger, Some("1"), None)?;

    // lists
    r.list("NMTOKENS", "NMTOKEN")?;
    r.list("IDREFS", "IDREF")?;
    r.list("ENTITIES", "ENTITY")?;

    Ok(r.types)
}
