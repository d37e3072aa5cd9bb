//! Value validation
//!
//! Validating a lexical value against a [`SimpleTypeDecl`] runs in two
//! phases:
//! 1. [`get_actual_value`](SimpleTypeDecl::get_actual_value) normalizes the
//!    text, checks the patterns and parses it by variety, recording which
//!    union member accepted it;
//! 2. [`check_validated_info`](SimpleTypeDecl::check_validated_info) checks
//!    the remaining facets on the parsed value and, when the context asks
//!    for it, the ID/IDREF/ENTITY rules.
//!
//! [`validate`](SimpleTypeDecl::validate) runs both.

use super::context::{EmptyContext, ValidationContext};
use super::datatypes::{DvKind, Normalization, ValueOrder};
use super::facets::{FacetMask, SpecialPattern, WhiteSpace};
use super::simple_types::{SimpleTypeDecl, SimpleTypeVariety};
use super::values::{ActualValue, BuiltinKind, ValidatedInfo};
use crate::error::{Result, ValueError, ValueErrorKind, ValueResult};
use crate::names::trim_xml_whitespace;
use std::sync::Arc;
use tracing::trace;

impl SimpleTypeDecl {
    /// Validate a lexical value and return its actual value
    ///
    /// # Example
    ///
    /// ```
    /// use xmlschema_datatypes::{get_builtin_type, ActualValue, EmptyContext};
    ///
    /// let boolean = get_builtin_type("boolean").unwrap();
    /// let value = boolean.validate(" 1 ", &mut EmptyContext).unwrap();
    /// assert_eq!(value, ActualValue::Boolean(true));
    /// ```
    pub fn validate(&self, content: &str, ctx: &mut dyn ValidationContext) -> Result<ActualValue> {
        Ok(self.validate_info(content, ctx)?.actual_value)
    }

    /// Validate a lexical value and return everything learned about it
    pub fn validate_with_info(
        &self,
        content: &str,
        ctx: &mut dyn ValidationContext,
    ) -> Result<ValidatedInfo> {
        Ok(self.validate_info(content, ctx)?)
    }

    /// First phase only: normalize, check patterns and parse
    pub fn get_actual_value(
        &self,
        content: &str,
        ctx: &dyn ValidationContext,
        normalize: bool,
    ) -> Result<ValidatedInfo> {
        Ok(self.actual_value(content, ctx, normalize)?)
    }

    /// Second phase only: check facets and extra rules on a parsed value
    pub fn check_validated_info(
        &self,
        info: &ValidatedInfo,
        ctx: &mut dyn ValidationContext,
    ) -> Result<()> {
        Ok(self.check_info(info, ctx)?)
    }

    /// Whether a value is valid in a context that declares nothing
    pub fn is_valid(&self, content: &str) -> bool {
        self.validate_info(content, &mut EmptyContext).is_ok()
    }

    /// Whitespace-normalize a value the way validation would
    pub fn normalize(&self, content: &str) -> String {
        if self.facets.patterns.is_empty() {
            match self.kind.normalization() {
                Normalization::None => return content.to_string(),
                Normalization::Trim => return trim_xml_whitespace(content).to_string(),
                Normalization::Full => {}
            }
        }
        self.facets
            .white_space
            .unwrap_or(WhiteSpace::Preserve)
            .normalize(content)
    }

    // =========================================================================
    // Phases
    // =========================================================================

    pub(crate) fn validate_info(
        &self,
        content: &str,
        ctx: &mut dyn ValidationContext,
    ) -> ValueResult<ValidatedInfo> {
        let normalize = ctx.need_to_normalize();
        let info = self.actual_value(content, &*ctx, normalize)?;
        self.check_info(&info, ctx)?;
        Ok(info)
    }

    pub(crate) fn actual_value(
        &self,
        content: &str,
        ctx: &dyn ValidationContext,
        normalize: bool,
    ) -> ValueResult<ValidatedInfo> {
        let nvalue = if normalize {
            self.normalize(content)
        } else {
            content.to_string()
        };

        // inherited patterns sit at the end and are checked first
        for pattern in self.facets.patterns.iter().rev() {
            if !pattern.matcher.matches(&nvalue) {
                return Err(ValueError::new(
                    ValueErrorKind::PatternValid,
                    [content, pattern.source.as_str(), self.type_name()],
                ));
            }
        }

        let info = match self.variety {
            SimpleTypeVariety::List => self.list_value(nvalue, ctx)?,
            SimpleTypeVariety::Union => self.union_value(content, ctx)?,
            SimpleTypeVariety::Atomic | SimpleTypeVariety::Absent => {
                let special = self.facets.special_pattern;
                if special != SpecialPattern::None && !special.matches(&nvalue) {
                    return Err(ValueError::invalid_lexical(&nvalue, special.type_name()));
                }
                let value = self.kind.validator().parse(&nvalue, ctx)?;
                ValidatedInfo::atomic(nvalue, value, self.builtin_kind)
            }
        };

        trace!(type_name = self.type_name(), value = %info.actual_value, "parsed value");
        Ok(info)
    }

    fn list_value(&self, nvalue: String, ctx: &dyn ValidationContext) -> ValueResult<ValidatedInfo> {
        let Some(item_type) = self.item_type.as_ref() else {
            return Err(ValueError::invalid_lexical(&nvalue, self.type_name()));
        };
        let union_items = item_type.variety == SimpleTypeVariety::Union;

        let mut items = Vec::new();
        let mut member_types = Vec::new();
        let mut item_value_types = Vec::new();
        for token in nvalue.split(' ').filter(|t| !t.is_empty()) {
            let item = item_type.actual_value(token, ctx, false)?;
            if ctx.need_facet_checking() && item_type.needs_facet_check() {
                item_type.check_facets(&item)?;
            }
            if union_items {
                let kind = item
                    .member_type
                    .as_ref()
                    .map_or(BuiltinKind::Unavailable, |m| m.builtin_kind);
                item_value_types.push(kind);
            }
            member_types.push(item.member_type);
            items.push(item.actual_value);
        }
        if !union_items {
            item_value_types.push(item_type.builtin_kind);
        }

        Ok(ValidatedInfo {
            normalized_value: nvalue,
            actual_value: ActualValue::List(items),
            actual_value_type: if union_items {
                BuiltinKind::ListOfUnion
            } else {
                BuiltinKind::List
            },
            member_type: None,
            member_types,
            item_value_types,
        })
    }

    /// Members are tried in declaration order; the first one accepting the
    /// value wins
    fn union_value(&self, content: &str, ctx: &dyn ValidationContext) -> ValueResult<ValidatedInfo> {
        for member in &self.member_types {
            let Ok(mut info) = member.actual_value(content, ctx, true) else {
                continue;
            };
            if ctx.need_facet_checking()
                && member.needs_facet_check()
                && member.check_facets(&info).is_err()
            {
                continue;
            }
            info.member_type = Some(Arc::clone(member));
            return Ok(info);
        }

        let members: Vec<String> = self
            .member_types
            .iter()
            .map(|member| {
                let mut described = member.expanded_name();
                if !member.facets.enumeration.is_empty() {
                    described.push_str(" : ");
                    described.push_str(&member.enumeration_string());
                }
                described
            })
            .collect();
        Err(ValueError::new(
            ValueErrorKind::DatatypeValid1_2_3,
            [content, self.type_name(), members.join(" | ").as_str()],
        ))
    }

    pub(crate) fn check_info(
        &self,
        info: &ValidatedInfo,
        ctx: &mut dyn ValidationContext,
    ) -> ValueResult<()> {
        if ctx.need_facet_checking() && self.needs_facet_check() {
            self.check_facets(info)?;
        }
        if ctx.need_extra_checking() {
            self.check_value_rules(&info.actual_value, info.member_type.as_ref(), &info.member_types, ctx)?;
        }
        Ok(())
    }

    /// Whether any facet besides whiteSpace is carried
    fn needs_facet_check(&self) -> bool {
        let defined = self.facets.defined();
        !defined.is_empty() && defined != FacetMask::WHITESPACE
    }

    // =========================================================================
    // Facet checks
    // =========================================================================

    fn check_facets(&self, info: &ValidatedInfo) -> ValueResult<()> {
        let f = &self.facets;
        let validator = self.kind.validator();
        let value = &info.actual_value;
        let content = info.normalized_value.as_str();
        let type_name = self.type_name();

        if !matches!(self.kind, DvKind::QName | DvKind::Notation) {
            let length = validator.data_length(value);
            let limits = [
                (f.max_length, ValueErrorKind::MaxLengthValid),
                (f.min_length, ValueErrorKind::MinLengthValid),
                (f.length, ValueErrorKind::LengthValid),
            ];
            for (limit, kind) in limits {
                let Some(limit) = limit else { continue };
                let violated = match kind {
                    ValueErrorKind::MaxLengthValid => length > limit,
                    ValueErrorKind::MinLengthValid => length < limit,
                    _ => length != limit,
                };
                if violated {
                    return Err(ValueError::new(
                        kind,
                        [content.to_string(), length.to_string(), limit.to_string(), type_name.to_string()],
                    ));
                }
            }
        }

        if !f.enumeration.is_empty() {
            let present = f
                .enumeration
                .iter()
                .any(|e| info.is_comparable(e) && e.actual_value == *value);
            if !present {
                return Err(ValueError::new(
                    ValueErrorKind::EnumerationValid,
                    [content.to_string(), self.enumeration_string()],
                ));
            }
        }

        if let Some(limit) = f.fraction_digits {
            let scale = validator.fraction_digits(value);
            if scale > limit {
                return Err(ValueError::new(
                    ValueErrorKind::FractionDigitsValid,
                    [content.to_string(), scale.to_string(), limit.to_string()],
                ));
            }
        }

        if let Some(limit) = f.total_digits {
            let digits = validator.total_digits(value);
            if digits > limit {
                return Err(ValueError::new(
                    ValueErrorKind::TotalDigitsValid,
                    [content.to_string(), digits.to_string(), limit.to_string()],
                ));
            }
        }

        let bounds = [
            (&f.max_inclusive, ValueErrorKind::MaxInclusiveValid),
            (&f.max_exclusive, ValueErrorKind::MaxExclusiveValid),
            (&f.min_inclusive, ValueErrorKind::MinInclusiveValid),
            (&f.min_exclusive, ValueErrorKind::MinExclusiveValid),
        ];
        for (bound, kind) in bounds {
            let Some(bound) = bound else { continue };
            let order = validator.compare(value, bound);
            let within = match kind {
                ValueErrorKind::MaxInclusiveValid => order.is_le(),
                ValueErrorKind::MaxExclusiveValid => order == ValueOrder::Less,
                ValueErrorKind::MinInclusiveValid => order.is_ge(),
                _ => order == ValueOrder::Greater,
            };
            if !within {
                return Err(ValueError::new(
                    kind,
                    [content.to_string(), bound.to_string(), type_name.to_string()],
                ));
            }
        }

        Ok(())
    }

    /// ID, IDREF and ENTITY rules, routed to the type that produced each
    /// value
    fn check_value_rules(
        &self,
        value: &ActualValue,
        member_type: Option<&Arc<SimpleTypeDecl>>,
        member_types: &[Option<Arc<SimpleTypeDecl>>],
        ctx: &mut dyn ValidationContext,
    ) -> ValueResult<()> {
        match self.variety {
            SimpleTypeVariety::List => {
                let (Some(item_type), Some(items)) = (self.item_type.as_ref(), value.as_list()) else {
                    return Ok(());
                };
                for (i, item) in items.iter().enumerate().rev() {
                    let member = member_types.get(i).and_then(Option::as_ref);
                    item_type.check_value_rules(item, member, &[], ctx)?;
                }
                Ok(())
            }
            SimpleTypeVariety::Union => match member_type {
                Some(member) => member.check_value_rules(value, None, &[], ctx),
                None => Ok(()),
            },
            _ => self.kind.validator().check_extra_rules(value, ctx),
        }
    }
}
