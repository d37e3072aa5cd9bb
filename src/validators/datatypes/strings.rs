//! String-valued kinds: anySimpleType, anyAtomicType, string, ID, IDREF
//! and ENTITY

use super::TypeValidator;
use crate::error::{ValueError, ValueErrorKind, ValueResult};
use crate::names::is_valid_ncname;
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;

/// The ur-type of simple types; accepts anything, allows no facet
#[derive(Debug, Clone, Copy)]
pub struct AnySimpleDv;

impl TypeValidator for AnySimpleDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::empty()
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        Ok(ActualValue::String(content.to_string()))
    }
}

/// anyAtomicType behaves like anySimpleType
#[derive(Debug, Clone, Copy)]
pub struct AnyAtomicDv;

impl TypeValidator for AnyAtomicDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::empty()
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        Ok(ActualValue::String(content.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringDv;

impl TypeValidator for StringDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        Ok(ActualValue::String(content.to_string()))
    }
}

fn parse_ncname(content: &str) -> ValueResult<ActualValue> {
    if !is_valid_ncname(content) {
        return Err(ValueError::invalid_lexical(content, "NCName"));
    }
    Ok(ActualValue::String(content.to_string()))
}

/// ID: an NCName unique within the validation state
#[derive(Debug, Clone, Copy)]
pub struct IdDv;

impl TypeValidator for IdDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        parse_ncname(content)
    }

    fn check_extra_rules(
        &self,
        value: &ActualValue,
        ctx: &mut dyn ValidationContext,
    ) -> ValueResult<()> {
        let id = value.as_str().unwrap_or_default();
        if ctx.is_id_declared(id) {
            return Err(ValueError::new(ValueErrorKind::IdDuplicate, [id]));
        }
        ctx.add_id(id);
        Ok(())
    }
}

/// IDREF: an NCName recorded for the final ID/IDREF check
#[derive(Debug, Clone, Copy)]
pub struct IdRefDv;

impl TypeValidator for IdRefDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        parse_ncname(content)
    }

    fn check_extra_rules(
        &self,
        value: &ActualValue,
        ctx: &mut dyn ValidationContext,
    ) -> ValueResult<()> {
        ctx.add_idref(value.as_str().unwrap_or_default());
        Ok(())
    }
}

/// ENTITY: an NCName naming an unparsed entity
#[derive(Debug, Clone, Copy)]
pub struct EntityDv;

impl TypeValidator for EntityDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        parse_ncname(content)
    }

    fn check_extra_rules(
        &self,
        value: &ActualValue,
        ctx: &mut dyn ValidationContext,
    ) -> ValueResult<()> {
        let name = value.as_str().unwrap_or_default();
        if !ctx.is_entity_unparsed(name) {
            return Err(ValueError::new(ValueErrorKind::UndeclaredEntity, [name]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::context::{EmptyContext, ValidationState};

    #[test]
    fn test_string_length_counts_chars() {
        let v = StringDv.parse("h\u{E9}llo", &EmptyContext).unwrap();
        assert_eq!(StringDv.data_length(&v), 5);
    }

    #[test]
    fn test_id_requires_ncname() {
        let err = IdDv.parse("a:b", &EmptyContext).unwrap_err();
        assert_eq!(err.key(), "cvc-datatype-valid.1.2.1");
        assert_eq!(err.args, vec!["a:b".to_string(), "NCName".to_string()]);
    }

    #[test]
    fn test_duplicate_id() {
        let mut state = ValidationState::new();
        let v = IdDv.parse("x1", &state).unwrap();
        IdDv.check_extra_rules(&v, &mut state).unwrap();
        let err = IdDv.check_extra_rules(&v, &mut state).unwrap_err();
        assert_eq!(err.key(), "cvc-id.2");
    }

    #[test]
    fn test_entity_must_be_unparsed() {
        let mut state = ValidationState::new()
            .with_entity("pic", true)
            .with_entity("txt", false);
        let pic = ActualValue::String("pic".into());
        let txt = ActualValue::String("txt".into());
        assert!(EntityDv.check_extra_rules(&pic, &mut state).is_ok());
        assert_eq!(
            EntityDv.check_extra_rules(&txt, &mut state).unwrap_err().key(),
            "UndeclaredEntity"
        );
    }
}
