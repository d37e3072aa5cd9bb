//! End-to-end scenarios over the public API
//!
//! Each test derives user types from the built-ins the way a schema
//! processor would, then validates values against them.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use xmlschema_datatypes::{
    get_builtin_type, ActualValue, BuiltinKind, DeclaredFacets, DerivationMethod, EmptyContext,
    FacetKind, FacetMask, SimpleTypeDecl, SimpleTypeVariety, WhiteSpace, XSD_NAMESPACE,
};

const NS: &str = "urn:scenarios";

fn builtin(name: &str) -> Arc<SimpleTypeDecl> {
    get_builtin_type(name).unwrap()
}

fn restrict(
    base: Arc<SimpleTypeDecl>,
    name: &str,
    facets: &DeclaredFacets,
    fixed: FacetMask,
) -> xmlschema_datatypes::Result<SimpleTypeDecl> {
    let mut decl =
        SimpleTypeDecl::restriction(base, Some(name), Some(NS), DerivationMethod::empty(), vec![]);
    decl.apply_facets(facets, facets.present(), fixed, &mut EmptyContext)?;
    Ok(decl)
}

fn error_key(decl: &SimpleTypeDecl, value: &str) -> Option<&'static str> {
    decl.validate(value, &mut EmptyContext)
        .err()
        .and_then(|e| e.key())
}

// ============================================================================
// Restriction
// ============================================================================

#[test]
fn test_positive_short_from_integer() {
    let facets = DeclaredFacets::new()
        .with_min_exclusive("0")
        .with_max_inclusive("32767");
    let positive_short = restrict(builtin("integer"), "PositiveShort", &facets, FacetMask::empty())
        .unwrap();

    let value = positive_short.validate("100", &mut EmptyContext).unwrap();
    assert_eq!(value, ActualValue::Integer(100.into()));
    assert_eq!(error_key(&positive_short, "0"), Some("cvc-minExclusive-valid"));
    assert_eq!(error_key(&positive_short, "40000"), Some("cvc-maxInclusive-valid"));
    assert_eq!(error_key(&positive_short, "abc"), Some("cvc-datatype-valid.1.2.1"));

    assert_eq!(
        positive_short.defined_facets(),
        FacetMask::MIN_EXCLUSIVE
            | FacetMask::MAX_INCLUSIVE
            | FacetMask::WHITESPACE
            | FacetMask::PATTERN
            | FacetMask::FRACTION_DIGITS
    );
    assert!(positive_short.bounded());
    assert!(positive_short.finite());
}

#[test]
fn test_inapplicable_facet_leaves_type_unchanged() {
    let mut decl = SimpleTypeDecl::restriction(
        builtin("string"),
        Some("Code"),
        Some(NS),
        DerivationMethod::empty(),
        vec![],
    );
    let facets = DeclaredFacets::new().with_total_digits(3);
    let err = decl
        .apply_facets(&facets, facets.present(), FacetMask::empty(), &mut EmptyContext)
        .unwrap_err();

    assert_eq!(err.key(), Some("cos-applicable-facets"));
    assert!(!decl.is_defined_facet(FacetKind::TotalDigits));
    assert_eq!(decl.defined_facets(), builtin("string").defined_facets());
}

#[test]
fn test_max_length_narrowing() {
    let facets = DeclaredFacets::new().with_max_length(10);
    let base = Arc::new(restrict(builtin("string"), "Short10", &facets, FacetMask::empty()).unwrap());

    let narrower = DeclaredFacets::new().with_max_length(5);
    let derived = restrict(base.clone(), "Short5", &narrower, FacetMask::empty()).unwrap();
    assert_eq!(derived.lexical_facet_value(FacetKind::MaxLength), Some("5".to_string()));
    assert_eq!(error_key(&derived, "abcdef"), Some("cvc-maxLength-valid"));

    let wider = DeclaredFacets::new().with_max_length(15);
    let err = restrict(base, "Short15", &wider, FacetMask::empty()).unwrap_err();
    assert_eq!(err.key(), Some("maxLength-valid-restriction"));
}

#[test]
fn test_fixed_white_space() {
    let facets = DeclaredFacets::new().with_white_space(WhiteSpace::Collapse);
    let base = Arc::new(
        restrict(builtin("string"), "Collapsed", &facets, FacetMask::WHITESPACE).unwrap(),
    );
    assert!(base.is_fixed_facet(FacetKind::WhiteSpace));

    let replace = DeclaredFacets::new().with_white_space(WhiteSpace::Replace);
    let err = restrict(base.clone(), "Replaced", &replace, FacetMask::empty()).unwrap_err();
    assert_eq!(err.key(), Some("FixedFacetValue"));

    let collapse = DeclaredFacets::new().with_white_space(WhiteSpace::Collapse);
    let derived = restrict(base, "StillCollapsed", &collapse, FacetMask::empty()).unwrap();
    assert_eq!(derived.white_space().unwrap(), WhiteSpace::Collapse);
    assert_eq!(derived.normalize("  a \t b  "), "a b");
}

#[test]
fn test_enumeration_membership() {
    let facets = DeclaredFacets::new()
        .with_enumeration("a")
        .with_enumeration("b")
        .with_enumeration("c");
    let letters = restrict(builtin("string"), "Letters", &facets, FacetMask::empty()).unwrap();

    assert!(letters.is_valid("b"));
    assert_eq!(error_key(&letters, "d"), Some("cvc-enumeration-valid"));
    assert_eq!(letters.lexical_enumeration(), vec!["a", "b", "c"]);
}

// ============================================================================
// List and union
// ============================================================================

#[test]
fn test_list_items_checked_against_item_facets() {
    let facets = DeclaredFacets::new().with_max_inclusive("100");
    let small = Arc::new(restrict(builtin("integer"), "Small", &facets, FacetMask::empty()).unwrap());
    let list = SimpleTypeDecl::list(
        Some("SmallList"),
        Some(NS),
        DerivationMethod::empty(),
        small,
        vec![],
    )
    .unwrap();

    let value = list.validate(" 5  10 ", &mut EmptyContext).unwrap();
    assert_eq!(
        value,
        ActualValue::List(vec![ActualValue::Integer(5.into()), ActualValue::Integer(10.into())])
    );
    assert_eq!(error_key(&list, "5 10 200"), Some("cvc-maxInclusive-valid"));
}

#[test]
fn test_list_length_counts_items() {
    let item_list = SimpleTypeDecl::list(None, None, DerivationMethod::empty(), builtin("int"), vec![])
        .unwrap();
    let facets = DeclaredFacets::new().with_length(2);
    let pair = restrict(Arc::new(item_list), "Pair", &facets, FacetMask::empty()).unwrap();

    assert_eq!(pair.variety(), SimpleTypeVariety::List);
    assert!(pair.is_valid("1 2"));
    assert_eq!(error_key(&pair, "1 2 3"), Some("cvc-length-valid"));
}

#[test]
fn test_union_first_match() {
    let union = SimpleTypeDecl::union(
        Some("When"),
        Some(NS),
        DerivationMethod::empty(),
        vec![builtin("dateTime"), builtin("string")],
        vec![],
    )
    .unwrap();

    let info = union
        .validate_with_info("2020-01-01T00:00:00", &mut EmptyContext)
        .unwrap();
    assert_eq!(info.member_type.unwrap().type_name(), "dateTime");
    assert_eq!(info.actual_value_type, BuiltinKind::DateTime);

    let info = union.validate_with_info("tomorrow", &mut EmptyContext).unwrap();
    assert_eq!(info.member_type.unwrap().type_name(), "string");
}

#[test]
fn test_union_rejects_value_no_member_accepts() {
    let union = SimpleTypeDecl::union(
        None,
        None,
        DerivationMethod::empty(),
        vec![builtin("boolean"), builtin("date")],
        vec![],
    )
    .unwrap();

    assert_eq!(error_key(&union, "maybe"), Some("cvc-datatype-valid.1.2.3"));
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_canonical_forms_round_trip() {
    let samples = [
        ("decimal", "001.50"),
        ("integer", "+007"),
        ("boolean", "1"),
        ("float", "1.5"),
        ("double", "1e3"),
        ("duration", "P1Y14M3DT25H5M6.5S"),
        ("dateTime", "2020-01-01T12:30:00Z"),
        ("date", "2020-02-29"),
        ("time", "13:20:00"),
        ("gYearMonth", "2020-05"),
        ("gMonthDay", "--12-25"),
        ("hexBinary", "0fa1"),
        ("base64Binary", "AQID"),
        ("token", "  a   b "),
    ];

    for (type_name, lexical) in samples {
        let decl = builtin(type_name);
        let value = decl.validate(lexical, &mut EmptyContext).unwrap();
        let canonical = value.to_string();
        let reparsed = decl
            .validate(&canonical, &mut EmptyContext)
            .unwrap_or_else(|e| panic!("{} canonical '{}' rejected: {}", type_name, canonical, e));
        assert!(
            decl.is_identical(&value, &reparsed),
            "{}: '{}' -> '{}'",
            type_name,
            lexical,
            canonical
        );
    }
}

#[test]
fn test_derivation_queries() {
    let facets = DeclaredFacets::new().with_max_inclusive("10");
    let ten = Arc::new(restrict(builtin("byte"), "UpToTen", &facets, FacetMask::empty()).unwrap());
    let tens = SimpleTypeDecl::list(Some("Tens"), Some(NS), DerivationMethod::empty(), ten.clone(), vec![])
        .unwrap();

    assert!(ten.derived_from(Some(XSD_NAMESPACE), "integer"));
    assert!(ten.derived_from(Some(XSD_NAMESPACE), "anyType"));
    assert!(!ten.derived_from(Some(XSD_NAMESPACE), "string"));
    assert!(ten.derived_from_type(&builtin("short")));

    assert!(!tens.is_derived_from(Some(XSD_NAMESPACE), "byte", DerivationMethod::RESTRICTION));
    assert!(tens.is_derived_from(Some(XSD_NAMESPACE), "byte", DerivationMethod::LIST));
    assert!(tens.is_derived_from(Some(NS), "UpToTen", DerivationMethod::ANY));
}
