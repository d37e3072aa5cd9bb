//! List and union kinds
//!
//! Items and members are validated by the owning type declaration; these
//! validators only carry the facet sets and the list length measure.

use super::TypeValidator;
use crate::error::ValueResult;
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;

#[derive(Debug, Clone, Copy)]
pub struct ListDv;

impl TypeValidator for ListDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        Ok(ActualValue::String(content.to_string()))
    }

    /// Number of items
    fn data_length(&self, value: &ActualValue) -> usize {
        match value {
            ActualValue::List(items) => items.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnionDv;

impl TypeValidator for UnionDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::PATTERN | FacetMask::ENUMERATION
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        Ok(ActualValue::String(content.to_string()))
    }
}
