//! Category defaults used to pre-seed products.
//!
//! The same storage implications as on a product apply here, so a category
//! can only hand out defaults that produce a valid product.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::context::ValidationContext;
use crate::engine::{Advisor, Report, Rule, RuleResult, Validated};
use crate::enums::{
    HazardClass, PackagingType, StorageCondition, TemperatureRegime, TrackingType, UnitOfMeasure,
};
use crate::error::{Advisory, ValidationErrors, Violation, ViolationKind};
use crate::product::{
    check_hazard_class, check_temperature_required, recommend_temperature, StorageFields,
};
use crate::tables::units_for_tracking;
use crate::validation::validate_positive_days;

const DEFAULT_FIELDS: StorageFields = StorageFields {
    condition: "default_storage_condition",
    hazard: "default_hazard_class",
    temperature: "default_temperature_regime",
};

/// Default values products of a category start from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CtgDefaults {
    pub default_storage_condition: Option<StorageCondition>,
    pub default_temperature_regime: Option<TemperatureRegime>,
    pub default_hazard_class: Option<HazardClass>,
    pub default_tracking_type: Option<TrackingType>,
    pub default_packaging_type: Option<PackagingType>,
    /// Shelf life used to derive a product's expiry date.
    pub default_shelf_life_days: Option<u32>,
    pub default_unit_of_measure: Option<UnitOfMeasure>,
}

impl CtgDefaults {
    pub fn validate(self, ctx: &ValidationContext<'_>) -> Result<Validated<CtgDefaults>, ValidationErrors> {
        let mut report = ctx.report();
        self.check_into(ctx, &mut report);
        report.finish(Some(self))
    }

    pub(crate) fn check_into(&self, ctx: &ValidationContext<'_>, report: &mut Report) {
        report.run(self, RULES, ctx);
        report.advise(self, ADVISORS, ctx);
    }
}

// =============================================================================
// Rules
// =============================================================================

const RULES: &[Rule<CtgDefaults>] = &[
    Rule { name: "default_hazard_class_iff_hazardous", check: hazard_class_iff_hazardous },
    Rule { name: "default_temperature_regime_required", check: temperature_regime_required },
    Rule { name: "default_expiry_tracking_required", check: expiry_tracking_required },
    Rule { name: "default_tracking_unit", check: tracking_unit },
    Rule { name: "default_shelf_life_positive", check: shelf_life_positive },
];

const ADVISORS: &[Advisor<CtgDefaults>] = &[Advisor {
    name: "default_temperature_regime_recommended",
    check: temperature_regime_recommended,
}];

fn hazard_class_iff_hazardous(d: &CtgDefaults, _: &ValidationContext<'_>) -> RuleResult {
    check_hazard_class(d.default_storage_condition, d.default_hazard_class, &DEFAULT_FIELDS)
}

fn temperature_regime_required(d: &CtgDefaults, ctx: &ValidationContext<'_>) -> RuleResult {
    check_temperature_required(
        d.default_storage_condition,
        d.default_temperature_regime,
        &ctx.config().storage,
        &DEFAULT_FIELDS,
    )
}

fn expiry_tracking_required(d: &CtgDefaults, ctx: &ValidationContext<'_>) -> RuleResult {
    match (d.default_storage_condition, d.default_tracking_type) {
        (Some(condition), Some(tracking))
            if ctx.config().storage.requires_expiry_tracking(condition)
                && tracking != TrackingType::ExpiryTracked =>
        {
            Err(Violation::new(
                ViolationKind::CrossComponentRuleViolation,
                &["default_storage_condition", "default_tracking_type"],
                format!(
                    "{} categories must default to expiry_tracked tracking, got {}",
                    condition, tracking
                ),
            ))
        }
        _ => Ok(()),
    }
}

fn tracking_unit(d: &CtgDefaults, _: &ValidationContext<'_>) -> RuleResult {
    let (Some(tracking), Some(unit)) = (d.default_tracking_type, d.default_unit_of_measure) else {
        return Ok(());
    };
    match units_for_tracking(tracking) {
        Some(units) if !units.contains(&unit) => Err(Violation::new(
            ViolationKind::UnitMismatch,
            &["default_tracking_type", "default_unit_of_measure"],
            format!("{} tracking does not allow unit_of_measure {}", tracking, unit),
        )),
        _ => Ok(()),
    }
}

fn shelf_life_positive(d: &CtgDefaults, _: &ValidationContext<'_>) -> RuleResult {
    validate_positive_days("default_shelf_life_days", d.default_shelf_life_days)
}

fn temperature_regime_recommended(d: &CtgDefaults, ctx: &ValidationContext<'_>) -> Option<Advisory> {
    recommend_temperature(
        d.default_storage_condition,
        d.default_temperature_regime,
        &ctx.config().storage,
        &DEFAULT_FIELDS,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
