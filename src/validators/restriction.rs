//! Derivation by restriction
//!
//! [`SimpleTypeDecl::apply_facets`] merges the facets declared on one
//! restriction step with those inherited from the base type. Every declared
//! facet must be applicable to the datatype, must agree with the other
//! facets of the step and may only narrow the value space of the base.
//!
//! The work happens on a scratch copy of the facet state; the type is only
//! updated when every check passed.
//!
//! See: https://www.w3.org/TR/xmlschema-2/#rf-facets

use super::context::{EnumerationContext, ValidationContext};
use super::datatypes::{TypeValidator, ValueOrder};
use super::facets::{DeclaredFacets, FacetKind, FacetMask, SpecialPattern, WhiteSpace};
use super::simple_types::{CompiledPattern, FacetValues, SimpleTypeDecl};
use super::values::{ActualValue, ValidatedInfo};
use crate::error::{FacetError, FacetErrorKind, FacetResult, Result};
use tracing::debug;

/// Facets of a restriction step, checked but not yet inherited
struct Scratch {
    values: FacetValues,
    fixed: FacetMask,
}

impl SimpleTypeDecl {
    /// Apply the facets of one restriction step
    ///
    /// `present` selects the facets of `facets` to apply and `fixed` those
    /// declared with `fixed="true"`. On error the type is left unchanged.
    /// Immutable types ignore the call.
    pub fn apply_facets(
        &mut self,
        facets: &DeclaredFacets,
        present: FacetMask,
        fixed: FacetMask,
        ctx: &mut dyn ValidationContext,
    ) -> Result<()> {
        self.apply_facets_with_pattern(facets, present, fixed, SpecialPattern::None, ctx)
    }

    /// Apply facets together with a built-in shape check for name types
    pub fn apply_facets_with_pattern(
        &mut self,
        facets: &DeclaredFacets,
        present: FacetMask,
        fixed: FacetMask,
        special: SpecialPattern,
        ctx: &mut dyn ValidationContext,
    ) -> Result<()> {
        if self.immutable {
            return Ok(());
        }

        let scratch = match self.restrict(facets, present, fixed, special, ctx) {
            Ok(scratch) => scratch,
            Err(err) => {
                debug!(type_name = self.type_name(), key = err.key(), "facet restriction rejected");
                return Err(err.into());
            }
        };

        self.facets = scratch.values;
        self.fixed = scratch.fixed;
        self.calc_fundamental_facets();

        debug!(
            type_name = self.type_name(),
            defined = ?self.facets.defined(),
            fixed = ?self.fixed,
            "applied facets"
        );
        Ok(())
    }

    fn restrict(
        &self,
        facets: &DeclaredFacets,
        present: FacetMask,
        fixed: FacetMask,
        special: SpecialPattern,
        ctx: &mut dyn ValidationContext,
    ) -> FacetResult<Scratch> {
        let mut scratch = self.declared_facets(facets, present, fixed, ctx)?;
        if special != SpecialPattern::None {
            scratch.values.special_pattern = special;
        }

        if !scratch.values.defined().is_empty() {
            self.check_consistency(&scratch.values)?;
            self.check_against_base(&scratch.values)?;
        }

        self.inherit(&mut scratch);
        Ok(scratch)
    }

    fn validator(&self) -> &'static dyn TypeValidator {
        self.kind.validator()
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrder {
        self.validator().compare(a, b)
    }

    // =========================================================================
    // Declared facets
    // =========================================================================

    /// Read the declared facets, checking each one against the base
    fn declared_facets(
        &self,
        facets: &DeclaredFacets,
        present: FacetMask,
        fixed: FacetMask,
        ctx: &mut dyn ValidationContext,
    ) -> FacetResult<Scratch> {
        let base = self.base_type();
        let type_name = self.type_name();
        let allowed = self.validator().allowed_facets();
        let mut values = FacetValues::default();

        for kind in FacetKind::ALL {
            if !present.contains(kind.mask()) {
                continue;
            }
            if !allowed.contains(kind.mask()) {
                return Err(FacetError::new(
                    FacetErrorKind::CosApplicableFacets,
                    [kind.name(), type_name],
                ));
            }

            match kind {
                FacetKind::Length => values.length = facets.length,
                FacetKind::MinLength => values.min_length = facets.min_length,
                FacetKind::MaxLength => values.max_length = facets.max_length,
                FacetKind::WhiteSpace => values.white_space = facets.white_space,
                FacetKind::TotalDigits => values.total_digits = facets.total_digits,
                FacetKind::FractionDigits => values.fraction_digits = facets.fraction_digits,
                FacetKind::Pattern => {
                    if let Some(pattern) = &facets.pattern {
                        let matcher = ctx
                            .regex_engine()
                            .compile(pattern, ctx.locale())
                            .map_err(|reason| {
                                FacetError::new(
                                    FacetErrorKind::InvalidRegex,
                                    [pattern.as_str(), reason.as_str()],
                                )
                            })?;
                        values.patterns = vec![CompiledPattern {
                            source: pattern.clone(),
                            matcher,
                        }];
                    }
                }
                FacetKind::Enumeration => {
                    for facet in &facets.enumeration {
                        let mut enum_ctx =
                            EnumerationContext::new(&mut *ctx, facet.namespaces.as_ref());
                        let info = base.validate_info(&facet.value, &mut enum_ctx).map_err(|err| {
                            FacetError::new(
                                FacetErrorKind::EnumerationValidRestriction,
                                [facet.value.as_str(), base.type_name()],
                            )
                            .with_cause(err)
                        })?;
                        values.enumeration.push(info);
                    }
                }
                FacetKind::MaxInclusive => {
                    if let Some(lexical) = &facets.max_inclusive {
                        let info = self.range_value(kind, lexical, ctx)?;
                        if let Some(base_value) = &base.facets.max_inclusive {
                            self.check_fixed_range(kind, &info.actual_value, base_value)?;
                        }
                        self.check_range_against_base(kind, lexical, &info, ctx)?;
                        values.max_inclusive = Some(info.actual_value);
                    }
                }
                FacetKind::MinInclusive => {
                    if let Some(lexical) = &facets.min_inclusive {
                        let info = self.range_value(kind, lexical, ctx)?;
                        if let Some(base_value) = &base.facets.min_inclusive {
                            self.check_fixed_range(kind, &info.actual_value, base_value)?;
                        }
                        self.check_range_against_base(kind, lexical, &info, ctx)?;
                        values.min_inclusive = Some(info.actual_value);
                    }
                }
                FacetKind::MaxExclusive => {
                    if let Some(lexical) = &facets.max_exclusive {
                        let info = self.range_value(kind, lexical, ctx)?;
                        let same_as_base = match &base.facets.max_exclusive {
                            Some(base_value) => {
                                self.check_fixed_range(kind, &info.actual_value, base_value)?
                            }
                            None => false,
                        };
                        if !same_as_base {
                            self.check_range_against_base(kind, lexical, &info, ctx)?;
                        } else if let Some(base_max) = &base.facets.max_inclusive {
                            if !self.compare(&info.actual_value, base_max).is_le() {
                                return Err(FacetError::new(
                                    FacetErrorKind::MaxExclusiveValidRestriction2,
                                    [lexical.clone(), base_max.to_string(), type_name.to_string()],
                                ));
                            }
                        }
                        values.max_exclusive = Some(info.actual_value);
                    }
                }
                FacetKind::MinExclusive => {
                    if let Some(lexical) = &facets.min_exclusive {
                        let info = self.range_value(kind, lexical, ctx)?;
                        let same_as_base = match &base.facets.min_exclusive {
                            Some(base_value) => {
                                self.check_fixed_range(kind, &info.actual_value, base_value)?
                            }
                            None => false,
                        };
                        if !same_as_base {
                            self.check_range_against_base(kind, lexical, &info, ctx)?;
                        } else if let Some(base_min) = &base.facets.min_inclusive {
                            if self.compare(&info.actual_value, base_min) == ValueOrder::Less {
                                return Err(FacetError::new(
                                    FacetErrorKind::MinExclusiveValidRestriction3,
                                    [lexical.clone(), base_min.to_string(), type_name.to_string()],
                                ));
                            }
                        }
                        values.min_exclusive = Some(info.actual_value);
                    }
                }
            }

            let annotations = facets.annotations_of(kind);
            if !annotations.is_empty() {
                values.annotations.insert(kind, annotations);
            }
        }

        // fixed is recorded for every facet but never enforced on pattern
        // and enumeration
        let fixed = fixed & values.defined();
        Ok(Scratch { values, fixed })
    }

    /// Parse a range facet value in the value space of the base type
    fn range_value(
        &self,
        kind: FacetKind,
        lexical: &str,
        ctx: &mut dyn ValidationContext,
    ) -> FacetResult<ValidatedInfo> {
        let base = self.base_type();
        base.actual_value(lexical, &*ctx, true)
            .map_err(|err| self.value_from_base_error(kind, lexical).with_cause(err))
    }

    /// The range value must satisfy every facet of the base type
    fn check_range_against_base(
        &self,
        kind: FacetKind,
        lexical: &str,
        info: &ValidatedInfo,
        ctx: &mut dyn ValidationContext,
    ) -> FacetResult<()> {
        self.base_type()
            .check_info(info, ctx)
            .map_err(|err| self.value_from_base_error(kind, lexical).with_cause(err))
    }

    fn value_from_base_error(&self, kind: FacetKind, lexical: &str) -> FacetError {
        FacetError::new(
            FacetErrorKind::FacetValueFromBase,
            [
                self.type_name(),
                lexical,
                kind.name(),
                self.base_type().type_name(),
            ],
        )
    }

    /// Compare a range value with the base's value of the same facet,
    /// failing when the base fixed it to another value. Returns whether
    /// both values are equal.
    fn check_fixed_range(
        &self,
        kind: FacetKind,
        value: &ActualValue,
        base_value: &ActualValue,
    ) -> FacetResult<bool> {
        let order = self.compare(value, base_value);
        if self.base_type().fixed.contains(kind.mask()) && order != ValueOrder::Equal {
            return Err(FacetError::new(
                FacetErrorKind::FixedFacetValue,
                [
                    kind.name().to_string(),
                    value.to_string(),
                    base_value.to_string(),
                    self.type_name().to_string(),
                ],
            ));
        }
        Ok(order == ValueOrder::Equal)
    }

    // =========================================================================
    // Consistency of the declared facets
    // =========================================================================

    fn check_consistency(&self, values: &FacetValues) -> FacetResult<()> {
        let type_name = self.type_name().to_string();
        let err = |kind: FacetErrorKind, a: String, b: String| {
            Err(FacetError::new(kind, [a, b, type_name.clone()]))
        };

        if let (Some(min), Some(max)) = (values.min_length, values.max_length) {
            if min > max {
                return err(
                    FacetErrorKind::MinLengthLessThanEqualToMaxLength,
                    min.to_string(),
                    max.to_string(),
                );
            }
        }

        let (max_inc, max_exc) = (&values.max_inclusive, &values.max_exclusive);
        let (min_inc, min_exc) = (&values.min_inclusive, &values.min_exclusive);

        if let (Some(inc), Some(exc)) = (max_inc, max_exc) {
            return err(FacetErrorKind::MaxInclusiveMaxExclusive, inc.to_string(), exc.to_string());
        }
        if let (Some(inc), Some(exc)) = (min_inc, min_exc) {
            return err(FacetErrorKind::MinInclusiveMinExclusive, inc.to_string(), exc.to_string());
        }
        if let (Some(min), Some(max)) = (min_inc, max_inc) {
            if !self.compare(min, max).is_le() {
                return err(
                    FacetErrorKind::MinInclusiveLessThanEqualToMaxInclusive,
                    min.to_string(),
                    max.to_string(),
                );
            }
        }
        if let (Some(min), Some(max)) = (min_exc, max_exc) {
            if !self.compare(min, max).is_le() {
                return err(
                    FacetErrorKind::MinExclusiveLessThanEqualToMaxExclusive,
                    min.to_string(),
                    max.to_string(),
                );
            }
        }
        if let (Some(min), Some(max)) = (min_exc, max_inc) {
            if self.compare(min, max) != ValueOrder::Less {
                return err(
                    FacetErrorKind::MinExclusiveLessThanMaxInclusive,
                    min.to_string(),
                    max.to_string(),
                );
            }
        }
        if let (Some(min), Some(max)) = (min_inc, max_exc) {
            if self.compare(min, max) != ValueOrder::Less {
                return err(
                    FacetErrorKind::MinInclusiveLessThanMaxExclusive,
                    min.to_string(),
                    max.to_string(),
                );
            }
        }

        if let (Some(fraction), Some(total)) = (values.fraction_digits, values.total_digits) {
            if fraction > total {
                return err(
                    FacetErrorKind::FractionDigitsTotalDigits,
                    fraction.to_string(),
                    total.to_string(),
                );
            }
        }
        Ok(())
    }

    // =========================================================================
    // Narrowing of the base facets
    // =========================================================================

    fn check_against_base(&self, values: &FacetValues) -> FacetResult<()> {
        let base = self.base_type();
        let b = &base.facets;
        let name = self.type_name().to_string();
        let fail = |kind: FacetErrorKind, args: Vec<String>| Err(FacetError::new(kind, args));
        let fixed_fail = |facet: FacetKind, value: String, base_value: String| {
            Err(FacetError::new(
                FacetErrorKind::FixedFacetValue,
                [facet.name().to_string(), value, base_value, name.clone()],
            ))
        };
        let base_fixed = |facet: FacetKind| base.fixed.contains(facet.mask());

        use FacetErrorKind::*;

        if let Some(length) = values.length {
            if let Some(base_min) = b.min_length.filter(|m| length < *m) {
                return fail(
                    LengthMinLengthMaxLength1_1,
                    vec![name.clone(), length.to_string(), base_min.to_string()],
                );
            }
            if let Some(base_max) = b.max_length.filter(|m| length > *m) {
                return fail(
                    LengthMinLengthMaxLength2_1,
                    vec![name.clone(), length.to_string(), base_max.to_string()],
                );
            }
            if let Some(base_length) = b.length {
                if base_fixed(FacetKind::Length) && length != base_length {
                    return fixed_fail(FacetKind::Length, length.to_string(), base_length.to_string());
                }
                if length != base_length {
                    return fail(
                        LengthValidRestriction,
                        vec![length.to_string(), base_length.to_string(), name.clone()],
                    );
                }
            }
        }

        if b.length.is_some() || values.length.is_some() {
            if let Some(min) = values.min_length {
                if let Some(base_length) = b.length.filter(|l| *l < min) {
                    return fail(
                        LengthMinLengthMaxLength1_1,
                        vec![name.clone(), base_length.to_string(), min.to_string()],
                    );
                }
                if let Some(length) = values.length.filter(|l| *l < min) {
                    return fail(
                        LengthMinLengthMaxLength1_1,
                        vec![name.clone(), length.to_string(), min.to_string()],
                    );
                }
                match b.min_length {
                    None => return fail(LengthMinLengthMaxLength1_2a, vec![name.clone()]),
                    Some(base_min) if base_min != min => {
                        return fail(
                            LengthMinLengthMaxLength1_2b,
                            vec![name.clone(), min.to_string(), base_min.to_string()],
                        )
                    }
                    _ => {}
                }
            }
            if let Some(max) = values.max_length {
                if let Some(base_length) = b.length.filter(|l| *l > max) {
                    return fail(
                        LengthMinLengthMaxLength2_1,
                        vec![name.clone(), base_length.to_string(), max.to_string()],
                    );
                }
                if let Some(length) = values.length.filter(|l| *l > max) {
                    return fail(
                        LengthMinLengthMaxLength2_1,
                        vec![name.clone(), length.to_string(), max.to_string()],
                    );
                }
                match b.max_length {
                    None => return fail(LengthMinLengthMaxLength2_2a, vec![name.clone()]),
                    Some(base_max) if base_max != max => {
                        return fail(
                            LengthMinLengthMaxLength2_2b,
                            vec![name.clone(), max.to_string(), base_max.to_string()],
                        )
                    }
                    _ => {}
                }
            }
        }

        if let Some(min) = values.min_length {
            if let Some(base_max) = b.max_length {
                if min > base_max {
                    return fail(
                        MinLengthLessThanEqualToMaxLength,
                        vec![min.to_string(), base_max.to_string(), name.clone()],
                    );
                }
            } else if let Some(base_min) = b.min_length {
                if base_fixed(FacetKind::MinLength) && min != base_min {
                    return fixed_fail(FacetKind::MinLength, min.to_string(), base_min.to_string());
                }
                if min < base_min {
                    return fail(
                        MinLengthValidRestriction,
                        vec![min.to_string(), base_min.to_string(), name.clone()],
                    );
                }
            }
        }

        if let Some(max) = values.max_length {
            if let Some(base_min) = b.min_length.filter(|m| max < *m) {
                return fail(
                    MinLengthLessThanEqualToMaxLength,
                    vec![base_min.to_string(), max.to_string(), name.clone()],
                );
            }
            if let Some(base_max) = b.max_length {
                if base_fixed(FacetKind::MaxLength) && max != base_max {
                    return fixed_fail(FacetKind::MaxLength, max.to_string(), base_max.to_string());
                }
                if max > base_max {
                    return fail(
                        MaxLengthValidRestriction,
                        vec![max.to_string(), base_max.to_string(), name.clone()],
                    );
                }
            }
        }

        if let (Some(total), Some(base_total)) = (values.total_digits, b.total_digits) {
            if base_fixed(FacetKind::TotalDigits) && total != base_total {
                return fixed_fail(FacetKind::TotalDigits, total.to_string(), base_total.to_string());
            }
            if total > base_total {
                return fail(
                    TotalDigitsValidRestriction,
                    vec![total.to_string(), base_total.to_string(), name.clone()],
                );
            }
        }

        if let Some(fraction) = values.fraction_digits {
            if let Some(base_total) = b.total_digits.filter(|t| fraction > *t) {
                return fail(
                    FractionDigitsTotalDigits,
                    vec![fraction.to_string(), base_total.to_string(), name.clone()],
                );
            }

            let integer = self.kind == super::datatypes::DvKind::Integer;
            match b.fraction_digits {
                Some(base_fraction) => {
                    if (base_fixed(FacetKind::FractionDigits) && fraction != base_fraction)
                        || (integer && fraction != 0)
                    {
                        return fixed_fail(
                            FacetKind::FractionDigits,
                            fraction.to_string(),
                            base_fraction.to_string(),
                        );
                    }
                    if fraction > base_fraction {
                        return fail(
                            FractionDigitsValidRestriction,
                            vec![fraction.to_string(), base_fraction.to_string(), name.clone()],
                        );
                    }
                }
                None if integer && fraction != 0 => {
                    return fixed_fail(FacetKind::FractionDigits, fraction.to_string(), "0".to_string());
                }
                None => {}
            }
        }

        if let (Some(ws), Some(base_ws)) = (values.white_space, b.white_space) {
            if base_fixed(FacetKind::WhiteSpace) && ws != base_ws {
                return fixed_fail(
                    FacetKind::WhiteSpace,
                    ws.as_str().to_string(),
                    base_ws.as_str().to_string(),
                );
            }
            match (ws, base_ws) {
                (WhiteSpace::Preserve | WhiteSpace::Replace, WhiteSpace::Collapse) => {
                    return fail(
                        WhiteSpaceValidRestriction1,
                        vec![name.clone(), ws.as_str().to_string()],
                    );
                }
                (WhiteSpace::Preserve, WhiteSpace::Replace) => {
                    return fail(WhiteSpaceValidRestriction2, vec![name.clone()]);
                }
                _ => {}
            }
        }

        Ok(())
    }

    // =========================================================================
    // Inheritance
    // =========================================================================

    /// Complete the scratch state with the facets of the base
    fn inherit(&self, scratch: &mut Scratch) {
        let base = self.base_type();
        let b = &base.facets;
        let own = &mut scratch.values;

        let inherit_annotation = |own: &mut FacetValues, kind: FacetKind| {
            if let Some(annotations) = b.annotations.get(&kind) {
                own.annotations.insert(kind, annotations.clone());
            }
        };

        if own.length.is_none() && b.length.is_some() {
            own.length = b.length;
            inherit_annotation(own, FacetKind::Length);
        }
        if own.min_length.is_none() && b.min_length.is_some() {
            own.min_length = b.min_length;
            inherit_annotation(own, FacetKind::MinLength);
        }
        if own.max_length.is_none() && b.max_length.is_some() {
            own.max_length = b.max_length;
            inherit_annotation(own, FacetKind::MaxLength);
        }

        if !b.patterns.is_empty() {
            if own.patterns.is_empty() {
                own.patterns = b.patterns.clone();
            } else {
                own.patterns.extend(b.patterns.iter().rev().cloned());
            }
        }
        if let Some(base_annotations) = b.annotations.get(&FacetKind::Pattern) {
            match own.annotations.get_mut(&FacetKind::Pattern) {
                Some(annotations) => annotations.extend(base_annotations.iter().rev().cloned()),
                None => {
                    own.annotations.insert(FacetKind::Pattern, base_annotations.clone());
                }
            }
        }

        if own.white_space.is_none() && b.white_space.is_some() {
            own.white_space = b.white_space;
            inherit_annotation(own, FacetKind::WhiteSpace);
        }
        if own.enumeration.is_empty() && !b.enumeration.is_empty() {
            own.enumeration = b.enumeration.clone();
            inherit_annotation(own, FacetKind::Enumeration);
        }

        if own.max_exclusive.is_none() && own.max_inclusive.is_none() {
            if b.max_exclusive.is_some() {
                own.max_exclusive = b.max_exclusive.clone();
                inherit_annotation(own, FacetKind::MaxExclusive);
            }
            if b.max_inclusive.is_some() {
                own.max_inclusive = b.max_inclusive.clone();
                inherit_annotation(own, FacetKind::MaxInclusive);
            }
        }
        if own.min_exclusive.is_none() && own.min_inclusive.is_none() {
            if b.min_exclusive.is_some() {
                own.min_exclusive = b.min_exclusive.clone();
                inherit_annotation(own, FacetKind::MinExclusive);
            }
            if b.min_inclusive.is_some() {
                own.min_inclusive = b.min_inclusive.clone();
                inherit_annotation(own, FacetKind::MinInclusive);
            }
        }

        if own.total_digits.is_none() && b.total_digits.is_some() {
            own.total_digits = b.total_digits;
            inherit_annotation(own, FacetKind::TotalDigits);
        }
        if own.fraction_digits.is_none() && b.fraction_digits.is_some() {
            own.fraction_digits = b.fraction_digits;
            inherit_annotation(own, FacetKind::FractionDigits);
        }
        if own.special_pattern == SpecialPattern::None {
            own.special_pattern = b.special_pattern;
        }

        scratch.fixed |= base.fixed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::validators::builtins::get_builtin_type;
    use crate::validators::context::FacetValueContext;
    use crate::validators::simple_types::DerivationMethod;
    use std::sync::Arc;

    fn derive(base: Arc<SimpleTypeDecl>, facets: DeclaredFacets, fixed: FacetMask) -> Result<SimpleTypeDecl> {
        let mut decl =
            SimpleTypeDecl::restriction(base, Some("T"), None, DerivationMethod::empty(), vec![]);
        let present = facets.present();
        decl.apply_facets(&facets, present, fixed, &mut FacetValueContext)?;
        Ok(decl)
    }

    fn derive_builtin(base: &str, facets: DeclaredFacets) -> Result<SimpleTypeDecl> {
        derive(get_builtin_type(base).unwrap(), facets, FacetMask::empty())
    }

    fn key(result: Result<SimpleTypeDecl>) -> &'static str {
        result.unwrap_err().key().unwrap()
    }

    #[test]
    fn test_facet_must_be_applicable() {
        let err = derive_builtin("string", DeclaredFacets::new().with_total_digits(3)).unwrap_err();
        assert_eq!(err.key(), Some("cos-applicable-facets"));
        assert_eq!(err.args()[0], "totalDigits");
        assert_eq!(err.args()[1], "T");
        assert_eq!(
            key(derive_builtin("boolean", DeclaredFacets::new().with_max_length(3))),
            "cos-applicable-facets"
        );
    }

    #[test]
    fn test_failed_restriction_leaves_type_untouched() {
        let mut decl = derive_builtin("string", DeclaredFacets::new().with_max_length(5)).unwrap();
        let before = decl.defined_facets();
        let facets = DeclaredFacets::new()
            .with_min_length(2)
            .with_total_digits(3);
        let result = decl.apply_facets(&facets, facets.present(), FacetMask::empty(), &mut FacetValueContext);
        assert!(result.is_err());
        assert_eq!(decl.defined_facets(), before);
        assert_eq!(decl.lexical_facet_value(FacetKind::MaxLength).as_deref(), Some("5"));
        assert_eq!(decl.lexical_facet_value(FacetKind::MinLength), None);
    }

    #[test]
    fn test_invalid_regex() {
        let err = derive_builtin("string", DeclaredFacets::new().with_pattern("[a-")).unwrap_err();
        assert_eq!(err.key(), Some("InvalidRegex"));
        assert_eq!(err.args()[0], "[a-");
    }

    #[test]
    fn test_enumeration_values_come_from_base() {
        let err = derive_builtin("int", DeclaredFacets::new().with_enumeration("1").with_enumeration("x"))
            .unwrap_err();
        assert_eq!(err.key(), Some("enumeration-valid-restriction"));
        assert_eq!(err.args(), &["x".to_string(), "int".to_string()]);
        match err {
            Error::Facet(facet) => assert_eq!(facet.cause.unwrap().key(), "cvc-datatype-valid.1.2.1"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_range_value_from_base() {
        let err = derive_builtin("byte", DeclaredFacets::new().with_max_inclusive("300")).unwrap_err();
        assert_eq!(err.key(), Some("FacetValueFromBase"));
        assert_eq!(
            err.args(),
            &["T".to_string(), "300".to_string(), "maxInclusive".to_string(), "byte".to_string()]
        );

        let err = derive_builtin("int", DeclaredFacets::new().with_min_inclusive("abc")).unwrap_err();
        assert_eq!(err.key(), Some("FacetValueFromBase"));
    }

    #[test]
    fn test_cross_checks() {
        assert_eq!(
            key(derive_builtin("string", DeclaredFacets::new().with_min_length(5).with_max_length(2))),
            "minLength-less-than-equal-to-maxLength"
        );
        assert_eq!(
            key(derive_builtin(
                "int",
                DeclaredFacets::new().with_max_inclusive("5").with_max_exclusive("6")
            )),
            "maxInclusive-maxExclusive"
        );
        assert_eq!(
            key(derive_builtin(
                "int",
                DeclaredFacets::new().with_min_inclusive("5").with_min_exclusive("4")
            )),
            "minInclusive-minExclusive"
        );
        assert_eq!(
            key(derive_builtin(
                "int",
                DeclaredFacets::new().with_min_inclusive("10").with_max_inclusive("5")
            )),
            "minInclusive-less-than-equal-to-maxInclusive"
        );
        assert_eq!(
            key(derive_builtin(
                "int",
                DeclaredFacets::new().with_min_exclusive("5").with_max_inclusive("5")
            )),
            "minExclusive-less-than-maxInclusive"
        );
        assert_eq!(
            key(derive_builtin(
                "int",
                DeclaredFacets::new().with_min_inclusive("5").with_max_exclusive("5")
            )),
            "minInclusive-less-than-maxExclusive"
        );
        assert_eq!(
            key(derive_builtin(
                "decimal",
                DeclaredFacets::new().with_total_digits(2).with_fraction_digits(3)
            )),
            "fractionDigits-totalDigits"
        );
        assert!(derive_builtin(
            "int",
            DeclaredFacets::new().with_min_inclusive("5").with_max_inclusive("5")
        )
        .is_ok());
    }

    #[test]
    fn test_length_family_against_base() {
        let base = Arc::new(derive_builtin("string", DeclaredFacets::new().with_min_length(2).with_max_length(8)).unwrap());
        assert_eq!(
            key(derive(base.clone(), DeclaredFacets::new().with_length(1), FacetMask::empty())),
            "length-minLength-maxLength.1.1"
        );
        assert_eq!(
            key(derive(base.clone(), DeclaredFacets::new().with_length(9), FacetMask::empty())),
            "length-minLength-maxLength.2.1"
        );
        assert_eq!(
            key(derive(base.clone(), DeclaredFacets::new().with_max_length(9), FacetMask::empty())),
            "maxLength-valid-restriction"
        );
        assert_eq!(
            key(derive(base.clone(), DeclaredFacets::new().with_min_length(9), FacetMask::empty())),
            "minLength-less-than-equal-to-maxLength"
        );
        assert!(derive(base, DeclaredFacets::new().with_length(4), FacetMask::empty()).is_ok());

        let fixed_len = Arc::new(derive_builtin("string", DeclaredFacets::new().with_length(4)).unwrap());
        assert_eq!(
            key(derive(fixed_len.clone(), DeclaredFacets::new().with_length(5), FacetMask::empty())),
            "length-valid-restriction"
        );
        assert_eq!(
            key(derive(fixed_len, DeclaredFacets::new().with_min_length(2), FacetMask::empty())),
            "length-minLength-maxLength.1.2.a"
        );

        let min_only = Arc::new(derive_builtin("string", DeclaredFacets::new().with_min_length(3)).unwrap());
        assert_eq!(
            key(derive(min_only.clone(), DeclaredFacets::new().with_min_length(1), FacetMask::empty())),
            "minLength-valid-restriction"
        );
        assert_eq!(
            key(derive(min_only, DeclaredFacets::new().with_max_length(2), FacetMask::empty())),
            "minLength-less-than-equal-to-maxLength"
        );
    }

    #[test]
    fn test_fixed_facets() {
        let base = Arc::new(
            derive(
                get_builtin_type("string").unwrap(),
                DeclaredFacets::new().with_max_length(10),
                FacetMask::MAX_LENGTH,
            )
            .unwrap(),
        );
        assert!(base.is_fixed_facet(FacetKind::MaxLength));
        let err = derive(base.clone(), DeclaredFacets::new().with_max_length(5), FacetMask::empty())
            .unwrap_err();
        assert_eq!(err.key(), Some("FixedFacetValue"));
        assert_eq!(err.args()[0], "maxLength");
        assert!(derive(base, DeclaredFacets::new().with_max_length(10), FacetMask::empty()).is_ok());

        let bounded = Arc::new(
            derive(
                get_builtin_type("int").unwrap(),
                DeclaredFacets::new().with_max_inclusive("100"),
                FacetMask::MAX_INCLUSIVE,
            )
            .unwrap(),
        );
        let err = derive(bounded, DeclaredFacets::new().with_max_inclusive("50"), FacetMask::empty())
            .unwrap_err();
        assert_eq!(err.key(), Some("FixedFacetValue"));
        assert_eq!(err.args()[0], "maxInclusive");
    }

    #[test]
    fn test_fixed_pattern_and_enumeration_are_recorded() {
        let facets = DeclaredFacets::new()
            .with_pattern("[a-z]+")
            .with_enumeration("a")
            .with_enumeration("b");
        let base = Arc::new(
            derive(
                get_builtin_type("string").unwrap(),
                facets,
                FacetMask::PATTERN | FacetMask::ENUMERATION | FacetMask::LENGTH,
            )
            .unwrap(),
        );
        assert!(base.is_fixed_facet(FacetKind::Pattern));
        assert!(base.is_fixed_facet(FacetKind::Enumeration));
        assert!(!base.is_fixed_facet(FacetKind::Length));

        let narrower = DeclaredFacets::new().with_pattern("[a]").with_enumeration("a");
        let derived = derive(base, narrower, FacetMask::empty()).unwrap();
        assert!(derived.is_fixed_facet(FacetKind::Pattern));
        assert_eq!(derived.lexical_enumeration(), vec!["a"]);
        assert!(!derived.is_valid("b"));
    }

    #[test]
    fn test_fixed_white_space() {
        let err = derive_builtin("int", DeclaredFacets::new().with_white_space(WhiteSpace::Replace))
            .unwrap_err();
        assert_eq!(err.key(), Some("FixedFacetValue"));
        assert_eq!(err.args(), &["whiteSpace", "replace", "collapse", "T"].map(String::from));
    }

    #[test]
    fn test_white_space_must_narrow() {
        assert_eq!(
            key(derive_builtin("token", DeclaredFacets::new().with_white_space(WhiteSpace::Replace))),
            "whiteSpace-valid-restriction.1"
        );
        assert_eq!(
            key(derive_builtin(
                "normalizedString",
                DeclaredFacets::new().with_white_space(WhiteSpace::Preserve)
            )),
            "whiteSpace-valid-restriction.2"
        );
        let collapsed =
            derive_builtin("string", DeclaredFacets::new().with_white_space(WhiteSpace::Collapse)).unwrap();
        assert_eq!(collapsed.white_space().unwrap(), WhiteSpace::Collapse);
    }

    #[test]
    fn test_digits_against_base() {
        let base = Arc::new(
            derive_builtin("decimal", DeclaredFacets::new().with_total_digits(5).with_fraction_digits(2))
                .unwrap(),
        );
        assert_eq!(
            key(derive(base.clone(), DeclaredFacets::new().with_total_digits(6), FacetMask::empty())),
            "totalDigits-valid-restriction"
        );
        assert_eq!(
            key(derive(base.clone(), DeclaredFacets::new().with_fraction_digits(3), FacetMask::empty())),
            "fractionDigits-valid-restriction"
        );
        assert!(derive(base, DeclaredFacets::new().with_total_digits(3), FacetMask::empty()).is_ok());

        let err = derive_builtin("integer", DeclaredFacets::new().with_fraction_digits(1)).unwrap_err();
        assert_eq!(err.key(), Some("FixedFacetValue"));
        assert_eq!(err.args()[2], "0");
        assert!(derive_builtin("integer", DeclaredFacets::new().with_fraction_digits(0)).is_ok());
    }

    #[test]
    fn test_exclusive_bound_equal_to_base() {
        let base = Arc::new(
            derive_builtin("decimal", DeclaredFacets::new().with_max_exclusive("10")).unwrap(),
        );
        // same bound as the base is accepted although 10 is outside the base
        let same = derive(base.clone(), DeclaredFacets::new().with_max_exclusive("10"), FacetMask::empty());
        assert!(same.is_ok());
        let wider = derive(base, DeclaredFacets::new().with_max_exclusive("11"), FacetMask::empty());
        assert_eq!(key(wider), "FacetValueFromBase");
    }

    #[test]
    fn test_inheritance() {
        let base = Arc::new(
            derive_builtin(
                "decimal",
                DeclaredFacets::new()
                    .with_min_inclusive("0")
                    .with_max_exclusive("100")
                    .with_pattern("[0-9]+")
                    .with_annotation(FacetKind::MinInclusive, "non-negative"),
            )
            .unwrap(),
        );
        let decl = derive(
            base,
            DeclaredFacets::new().with_max_inclusive("50").with_pattern("[1-9].*"),
            FacetMask::empty(),
        )
        .unwrap();

        assert_eq!(decl.lexical_facet_value(FacetKind::MinInclusive).as_deref(), Some("0.0"));
        assert_eq!(decl.lexical_facet_value(FacetKind::MaxInclusive).as_deref(), Some("50.0"));
        assert_eq!(decl.lexical_facet_value(FacetKind::MaxExclusive), None);
        assert_eq!(decl.lexical_pattern(), vec!["[1-9].*".to_string(), "[0-9]+".to_string()]);
        assert_eq!(
            decl.facet(FacetKind::MinInclusive).unwrap().annotation.as_deref(),
            Some("non-negative")
        );
        assert!(decl.bounded());
    }

    #[test]
    fn test_immutable_type_ignores_facets() {
        let mut string = (*get_builtin_type("string").unwrap()).clone();
        let facets = DeclaredFacets::new().with_length(3);
        string
            .apply_facets(&facets, facets.present(), FacetMask::empty(), &mut FacetValueContext)
            .unwrap();
        assert!(!string.is_defined_facet(FacetKind::Length));
    }
}
