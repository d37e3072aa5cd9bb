use super::TypeValidator;
use crate::error::{ValueError, ValueResult};
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;

/// boolean: `true`, `false`, `1`, `0`
#[derive(Debug, Clone, Copy)]
pub struct BooleanDv;

impl TypeValidator for BooleanDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::PATTERN | FacetMask::WHITESPACE
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        match content {
            "true" | "1" => Ok(ActualValue::Boolean(true)),
            "false" | "0" => Ok(ActualValue::Boolean(false)),
            _ => Err(ValueError::invalid_lexical(content, "boolean")),
        }
    }
}
