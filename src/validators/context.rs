//! Validation context
//!
//! A [`ValidationContext`] tells a simple type how to validate (whether to
//! normalize, check facets, run the extra semantic rules) and answers the
//! questions a datatype cannot answer on its own: namespace prefixes for
//! QName values, declared entities, IDs seen so far.

use super::patterns::{RegexEngine, DEFAULT_REGEX_ENGINE};
use crate::error::{ValueError, ValueErrorKind, ValueResult};
use crate::namespaces::NamespaceContext;
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;

/// Collaborator consulted while validating values
///
/// Every method has a default matching a context that knows nothing:
/// facets are checked, values are normalized, extra rules are skipped and
/// no prefix, entity or ID is declared.
pub trait ValidationContext {
    /// Whether facets are checked after parsing
    fn need_facet_checking(&self) -> bool {
        true
    }

    /// Whether datatype specific semantic rules (ID, ENTITY...) are run
    fn need_extra_checking(&self) -> bool {
        false
    }

    /// Whether the lexical value is whitespace-normalized first
    fn need_to_normalize(&self) -> bool {
        true
    }

    /// Whether namespace processing is enabled
    fn use_namespaces(&self) -> bool {
        true
    }

    fn is_entity_declared(&self, _name: &str) -> bool {
        false
    }

    fn is_entity_unparsed(&self, _name: &str) -> bool {
        false
    }

    fn is_id_declared(&self, _name: &str) -> bool {
        false
    }

    fn add_id(&mut self, _name: &str) {}

    fn add_idref(&mut self, _name: &str) {}

    /// Intern a symbol
    fn get_symbol(&self, symbol: &str) -> String {
        symbol.to_string()
    }

    /// Namespace bound to a prefix; the empty prefix is the default namespace
    fn get_uri(&self, _prefix: &str) -> Option<&str> {
        None
    }

    fn locale(&self) -> Option<&str> {
        None
    }

    /// Engine compiling pattern facets
    fn regex_engine(&self) -> &dyn RegexEngine {
        &DEFAULT_REGEX_ENGINE
    }
}

/// Context without any declarations, normalizing values
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContext;

impl ValidationContext for EmptyContext {}

/// Context used to resolve facet values of built-in types
///
/// Facet values written by the built-in registry are already in normal
/// form, so no normalization happens.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacetValueContext;

impl ValidationContext for FacetValueContext {
    fn need_to_normalize(&self) -> bool {
        false
    }
}

/// Wraps a context so that prefixes resolve against the namespace bindings
/// in scope where an enumeration value was declared
pub struct EnumerationContext<'a> {
    inner: &'a mut dyn ValidationContext,
    namespaces: Option<&'a NamespaceContext>,
}

impl<'a> EnumerationContext<'a> {
    pub fn new(inner: &'a mut dyn ValidationContext, namespaces: Option<&'a NamespaceContext>) -> Self {
        Self { inner, namespaces }
    }
}

impl<'a> ValidationContext for EnumerationContext<'a> {
    fn need_facet_checking(&self) -> bool {
        self.inner.need_facet_checking()
    }

    fn need_extra_checking(&self) -> bool {
        self.inner.need_extra_checking()
    }

    fn need_to_normalize(&self) -> bool {
        self.inner.need_to_normalize()
    }

    fn use_namespaces(&self) -> bool {
        self.inner.use_namespaces()
    }

    fn is_entity_declared(&self, name: &str) -> bool {
        self.inner.is_entity_declared(name)
    }

    fn is_entity_unparsed(&self, name: &str) -> bool {
        self.inner.is_entity_unparsed(name)
    }

    fn is_id_declared(&self, name: &str) -> bool {
        self.inner.is_id_declared(name)
    }

    fn add_id(&mut self, name: &str) {
        self.inner.add_id(name)
    }

    fn add_idref(&mut self, name: &str) {
        self.inner.add_idref(name)
    }

    fn get_symbol(&self, symbol: &str) -> String {
        self.inner.get_symbol(symbol)
    }

    fn get_uri(&self, prefix: &str) -> Option<&str> {
        match self.namespaces {
            Some(namespaces) => namespaces.get_uri(prefix),
            None => self.inner.get_uri(prefix),
        }
    }

    fn locale(&self) -> Option<&str> {
        self.inner.locale()
    }

    fn regex_engine(&self) -> &dyn RegexEngine {
        self.inner.regex_engine()
    }
}

/// Reusable validation state with namespace, entity and ID bookkeeping
///
/// IDs and IDREFs are recorded while values are validated with extra
/// checking enabled; [`check_id_refs`](Self::check_id_refs) reports
/// references that never met their ID.
#[derive(Clone)]
pub struct ValidationState {
    /// Whether facets are checked
    pub facet_checking: bool,
    /// Whether ID/IDREF/ENTITY rules are run
    pub extra_checking: bool,
    /// Whether values are whitespace-normalized
    pub normalize: bool,
    /// Whether namespace processing is enabled
    pub namespace_aware: bool,
    /// Namespace bindings in scope
    pub namespaces: NamespaceContext,
    /// Declared entities, with their unparsed flag
    pub entities: IndexMap<String, bool>,
    /// IDs seen so far
    pub ids: IndexSet<String>,
    /// IDREFs seen so far
    pub idrefs: IndexSet<String>,
    /// Locale handed to the regex engine
    pub locale: Option<String>,
    regex_engine: Option<Arc<dyn RegexEngine>>,
}

impl ValidationState {
    /// Create a new validation state
    pub fn new() -> Self {
        Self {
            facet_checking: true,
            extra_checking: true,
            normalize: true,
            namespace_aware: true,
            namespaces: NamespaceContext::new(),
            entities: IndexMap::new(),
            ids: IndexSet::new(),
            idrefs: IndexSet::new(),
            locale: None,
            regex_engine: None,
        }
    }

    pub fn with_facet_checking(mut self, enabled: bool) -> Self {
        self.facet_checking = enabled;
        self
    }

    pub fn with_extra_checking(mut self, enabled: bool) -> Self {
        self.extra_checking = enabled;
        self
    }

    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    /// Set namespace bindings
    pub fn with_namespaces(mut self, namespaces: NamespaceContext) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Declare an entity
    pub fn with_entity(mut self, name: impl Into<String>, unparsed: bool) -> Self {
        self.entities.insert(name.into(), unparsed);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Use another regex engine for pattern facets
    pub fn with_regex_engine(mut self, engine: Arc<dyn RegexEngine>) -> Self {
        self.regex_engine = Some(engine);
        self
    }

    /// IDREFs without a matching ID, in first-seen order
    pub fn unresolved_id_refs(&self) -> Vec<&str> {
        self.idrefs
            .iter()
            .filter(|idref| !self.ids.contains(*idref))
            .map(String::as_str)
            .collect()
    }

    /// Fail with `cvc-id.1` on the first IDREF without a matching ID
    pub fn check_id_refs(&self) -> ValueResult<()> {
        match self.unresolved_id_refs().first() {
            Some(idref) => Err(ValueError::new(ValueErrorKind::IdRefUnresolved, [*idref])),
            None => Ok(()),
        }
    }

    /// Forget IDs and IDREFs, keeping the configuration
    pub fn clear(&mut self) {
        self.ids.clear();
        self.idrefs.clear();
    }
}

impl Default for ValidationState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationState")
            .field("facet_checking", &self.facet_checking)
            .field("extra_checking", &self.extra_checking)
            .field("normalize", &self.normalize)
            .field("namespaces", &self.namespaces)
            .field("entities", &self.entities)
            .field("ids", &self.ids)
            .field("idrefs", &self.idrefs)
            .finish_non_exhaustive()
    }
}

impl ValidationContext for ValidationState {
    fn need_facet_checking(&self) -> bool {
        self.facet_checking
    }

    fn need_extra_checking(&self) -> bool {
        self.extra_checking
    }

    fn need_to_normalize(&self) -> bool {
        self.normalize
    }

    fn use_namespaces(&self) -> bool {
        self.namespace_aware
    }

    fn is_entity_declared(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    fn is_entity_unparsed(&self, name: &str) -> bool {
        self.entities.get(name).copied().unwrap_or(false)
    }

    fn is_id_declared(&self, name: &str) -> bool {
        self.ids.contains(name)
    }

    fn add_id(&mut self, name: &str) {
        self.ids.insert(name.to_string());
    }

    fn add_idref(&mut self, name: &str) {
        self.idrefs.insert(name.to_string());
    }

    fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get_uri(prefix)
    }

    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    fn regex_engine(&self) -> &dyn RegexEngine {
        match &self.regex_engine {
            Some(engine) => engine.as_ref(),
            None => &DEFAULT_REGEX_ENGINE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_defaults() {
        let ctx = EmptyContext;
        assert!(ctx.need_facet_checking());
        assert!(ctx.need_to_normalize());
        assert!(!ctx.need_extra_checking());
        assert_eq!(ctx.get_uri("xs"), None);
        assert!(!FacetValueContext.need_to_normalize());
    }

    #[test]
    fn test_enumeration_context_overrides_prefixes() {
        let mut outer = ValidationState::new()
            .with_namespaces(NamespaceContext::new().with_prefix("p", "urn:outer"));
        let local = NamespaceContext::new().with_prefix("p", "urn:local");

        {
            let ctx = EnumerationContext::new(&mut outer, Some(&local));
            assert_eq!(ctx.get_uri("p"), Some("urn:local"));
        }
        let ctx = EnumerationContext::new(&mut outer, None);
        assert_eq!(ctx.get_uri("p"), Some("urn:outer"));
    }

    #[test]
    fn test_enumeration_context_forwards_ids() {
        let mut outer = ValidationState::new();
        {
            let mut ctx = EnumerationContext::new(&mut outer, None);
            ctx.add_id("a1");
        }
        assert!(outer.is_id_declared("a1"));
    }

    #[test]
    fn test_id_ref_bookkeeping() {
        let mut state = ValidationState::new();
        state.add_idref("b");
        state.add_id("a");
        state.add_idref("a");
        state.add_idref("c");

        assert_eq!(state.unresolved_id_refs(), vec!["b", "c"]);
        let err = state.check_id_refs().unwrap_err();
        assert_eq!(err.key(), "cvc-id.1");
        assert_eq!(err.args, vec!["b".to_string()]);

        state.clear();
        assert!(state.check_id_refs().is_ok());
    }

    #[test]
    fn test_entities() {
        let state = ValidationState::new()
            .with_entity("logo", true)
            .with_entity("copy", false);
        assert!(state.is_entity_declared("copy"));
        assert!(!state.is_entity_unparsed("copy"));
        assert!(state.is_entity_unparsed("logo"));
        assert!(!state.is_entity_declared("missing"));
    }
}
