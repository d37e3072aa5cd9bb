//! XML Schema simple type validators
//!
//! This module contains the simple type machinery:
//! - datatype validators, one per validation kind
//! - facet definitions and the restriction algorithm
//! - simple type declarations (atomic, list, union)
//! - value validation against a declaration
//! - the built-in type registry

pub mod builtins;
pub mod context;
pub mod datatypes;
pub mod facets;
pub mod patterns;
mod restriction;
pub mod simple_types;
mod validation;
pub mod values;

// Re-exports
pub use builtins::{any_simple_type, builtin_type_names, get_builtin_type, is_builtin_type};
pub use context::{
    EmptyContext, EnumerationContext, FacetValueContext, ValidationContext, ValidationState,
};
pub use datatypes::{DvKind, TypeValidator, ValueOrder};
pub use facets::{
    Annotation, DeclaredFacets, EnumerationFacet, Facet, FacetKind, FacetMask, MultiValueFacet,
    Ordered, SpecialPattern, WhiteSpace,
};
pub use patterns::{PatternMatcher, RegexEngine, XsdRegexEngine};
pub use simple_types::{
    CompiledPattern, DerivationMethod, FundamentalFacets, SimpleTypeDecl, SimpleTypeVariety,
};
pub use values::{ActualValue, BuiltinKind, ValidatedInfo};
