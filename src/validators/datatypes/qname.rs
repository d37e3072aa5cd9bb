use super::TypeValidator;
use crate::error::{ValueError, ValueErrorKind, ValueResult};
use crate::names::{is_valid_ncname, split_qname};
use crate::namespaces::QName;
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;

/// QName and NOTATION: a prefixed name resolved through the context
///
/// Length facets are accepted but never checked for these kinds.
#[derive(Debug, Clone, Copy)]
pub struct QNameDv;

impl TypeValidator for QNameDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        let (prefix, local) = split_qname(content);
        if prefix.is_some_and(|p| !is_valid_ncname(p)) || !is_valid_ncname(local) {
            return Err(ValueError::invalid_lexical(content, "QName"));
        }
        let prefix = prefix.unwrap_or("");

        let namespace = ctx.get_uri(prefix).map(str::to_string);
        if !prefix.is_empty() && namespace.is_none() {
            return Err(ValueError::new(ValueErrorKind::UndeclaredPrefix, [content, prefix]));
        }

        Ok(ActualValue::QName(
            QName::new(namespace, ctx.get_symbol(local)).with_prefix(ctx.get_symbol(prefix)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::NamespaceContext;
    use crate::validators::context::{EmptyContext, ValidationState};

    #[test]
    fn test_prefix_must_be_declared() {
        let err = QNameDv.parse("xs:string", &EmptyContext).unwrap_err();
        assert_eq!(err.key(), "UndeclaredPrefix");
        assert_eq!(err.args, vec!["xs:string".to_string(), "xs".to_string()]);
    }

    #[test]
    fn test_resolved_qname() {
        let state = ValidationState::new().with_namespaces(
            NamespaceContext::new().with_prefix("xs", "http://www.w3.org/2001/XMLSchema"),
        );
        let v = QNameDv.parse("xs:string", &state).unwrap();
        assert_eq!(
            v,
            ActualValue::QName(QName::namespaced("http://www.w3.org/2001/XMLSchema", "string"))
        );
        assert_eq!(v.to_string(), "xs:string");
    }

    #[test]
    fn test_unprefixed_uses_default_namespace() {
        let mut ns = NamespaceContext::new();
        ns.set_default_namespace("urn:d");
        let state = ValidationState::new().with_namespaces(ns);
        let v = QNameDv.parse("local", &state).unwrap();
        assert_eq!(v, ActualValue::QName(QName::namespaced("urn:d", "local")));
        assert_eq!(QNameDv.parse("local", &EmptyContext).unwrap(), ActualValue::QName(QName::local("local")));
    }

    #[test]
    fn test_malformed_qnames() {
        for bad in [":a", "a:", "1a", "a:b:c", ""] {
            let err = QNameDv.parse(bad, &EmptyContext).unwrap_err();
            assert_eq!(err.key(), "cvc-datatype-valid.1.2.1", "{}", bad);
        }
    }
}
