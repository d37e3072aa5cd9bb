//! # xmlschema-datatypes
//!
//! XML Schema simple types for Rust: the built-in datatypes, derivation of
//! new simple types by restriction, list and union, and validation of
//! lexical values against them.
//!
//! ## Features
//!
//! - Every XSD 1.0 built-in datatype, plus anyAtomicType, precisionDecimal,
//!   yearMonthDuration and dayTimeDuration
//! - Facet restriction with the full consistency checks between a type and
//!   its base
//! - Atomic, list and union varieties
//! - Value comparison across total and partial orders (dates with and
//!   without timezone, durations, floats)
//! - Introspection of facets and fundamental facets
//!
//! ## Example
//!
//! ```rust
//! use xmlschema_datatypes::{
//!     get_builtin_type, DeclaredFacets, DerivationMethod, EmptyContext, FacetMask,
//!     SimpleTypeDecl,
//! };
//!
//! let short = get_builtin_type("short").unwrap();
//! let mut positive_short = SimpleTypeDecl::restriction(
//!     short,
//!     Some("PositiveShort"),
//!     Some("urn:example"),
//!     DerivationMethod::empty(),
//!     vec![],
//! );
//! let facets = DeclaredFacets::new().with_min_inclusive("1");
//! positive_short
//!     .apply_facets(&facets, facets.present(), FacetMask::empty(), &mut EmptyContext)
//!     .unwrap();
//!
//! assert!(positive_short.is_valid("32767"));
//! assert!(!positive_short.is_valid("0"));
//! assert!(positive_short.derived_from(Some(xmlschema_datatypes::XSD_NAMESPACE), "int"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub mod names;
pub mod namespaces;

pub mod validators;

// Re-exports for convenience
pub use error::{Error, FacetError, FacetErrorKind, Result, ValueError, ValueErrorKind};
pub use namespaces::{NamespaceContext, QName};
pub use validators::{
    any_simple_type, builtin_type_names, get_builtin_type, is_builtin_type, ActualValue,
    BuiltinKind, DeclaredFacets, DerivationMethod, DvKind, EmptyContext, Facet, FacetKind,
    FacetMask, FacetValueContext, MultiValueFacet, Ordered, SimpleTypeDecl, SimpleTypeVariety,
    ValidatedInfo, ValidationContext, ValidationState, WhiteSpace,
};

/// Version of the xmlschema-datatypes library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML Schema namespace, home of the built-in types
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

