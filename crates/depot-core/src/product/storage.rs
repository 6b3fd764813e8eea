//! Storage requirements: condition, hazard class, temperature, packaging.
//!
//! The hazard and temperature implications are shared with category
//! defaults, which carry the same data under `default_*` field names.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::StorageRules;
use crate::context::ValidationContext;
use crate::engine::{Advisor, Report, Rule, RuleResult, Validated};
use crate::enums::{HazardClass, PackagingType, StorageCondition, TemperatureRegime};
use crate::error::{Advisory, ValidationErrors, Violation};

/// Raw storage input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct StorageDraft {
    pub storage_condition: Option<StorageCondition>,
    /// Present if and only if the condition is hazardous.
    pub hazard_class: Option<HazardClass>,
    pub temperature_regime: Option<TemperatureRegime>,
    pub packaging_type: Option<PackagingType>,
}

/// Validated storage requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "StorageDraft")]
pub struct StorageRequirements {
    storage_condition: Option<StorageCondition>,
    hazard_class: Option<HazardClass>,
    temperature_regime: Option<TemperatureRegime>,
    packaging_type: Option<PackagingType>,
}

impl StorageDraft {
    pub fn finalize(
        self,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<StorageRequirements>, ValidationErrors> {
        let mut report = ctx.report();
        let storage = self.finalize_into(ctx, &mut report);
        report.finish(Some(storage))
    }

    pub(crate) fn finalize_into(
        self,
        ctx: &ValidationContext<'_>,
        report: &mut Report,
    ) -> StorageRequirements {
        let storage = StorageRequirements {
            storage_condition: self.storage_condition,
            hazard_class: self.hazard_class,
            temperature_regime: self.temperature_regime,
            packaging_type: self.packaging_type,
        };
        report.run(&storage, RULES, ctx);
        report.advise(&storage, ADVISORS, ctx);
        storage
    }
}

impl StorageRequirements {
    pub fn storage_condition(&self) -> Option<StorageCondition> {
        self.storage_condition
    }

    pub fn hazard_class(&self) -> Option<HazardClass> {
        self.hazard_class
    }

    pub fn temperature_regime(&self) -> Option<TemperatureRegime> {
        self.temperature_regime
    }

    pub fn packaging_type(&self) -> Option<PackagingType> {
        self.packaging_type
    }

    pub fn to_draft(&self) -> StorageDraft {
        StorageDraft::from(*self)
    }
}

impl From<StorageRequirements> for StorageDraft {
    fn from(s: StorageRequirements) -> Self {
        StorageDraft {
            storage_condition: s.storage_condition,
            hazard_class: s.hazard_class,
            temperature_regime: s.temperature_regime,
            packaging_type: s.packaging_type,
        }
    }
}

// =============================================================================
// Shared Storage Checks
// =============================================================================

/// Field names the shared checks report against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StorageFields {
    pub condition: &'static str,
    pub hazard: &'static str,
    pub temperature: &'static str,
}

pub(crate) const PRODUCT_FIELDS: StorageFields = StorageFields {
    condition: "storage_condition",
    hazard: "hazard_class",
    temperature: "temperature_regime",
};

/// hazard class present ⇔ condition is HAZARDOUS.
pub(crate) fn check_hazard_class(
    condition: Option<StorageCondition>,
    hazard: Option<HazardClass>,
    f: &StorageFields,
) -> RuleResult {
    let hazardous = condition == Some(StorageCondition::Hazardous);
    match (hazardous, hazard) {
        (true, None) => Err(Violation::missing(
            f.hazard,
            format!("{} is required for hazardous storage", f.hazard),
        )),
        (false, Some(class)) => Err(Violation::forbidden(
            f.hazard,
            format!(
                "{} '{}' is only allowed when {} is hazardous",
                f.hazard, class, f.condition
            ),
        )),
        _ => Ok(()),
    }
}

/// Temperature regime required for the configured condition set.
pub(crate) fn check_temperature_required(
    condition: Option<StorageCondition>,
    regime: Option<TemperatureRegime>,
    rules: &StorageRules,
    f: &StorageFields,
) -> RuleResult {
    match condition {
        Some(c) if rules.requires_temperature(c) && regime.is_none() => Err(Violation::missing(
            f.temperature,
            format!("{} is required for {} storage", f.temperature, c),
        )),
        _ => Ok(()),
    }
}

/// Soft hint for conditions where a temperature regime is recommended.
pub(crate) fn recommend_temperature(
    condition: Option<StorageCondition>,
    regime: Option<TemperatureRegime>,
    rules: &StorageRules,
    f: &StorageFields,
) -> Option<Advisory> {
    let c = condition?;
    (rules.recommends_temperature(c) && regime.is_none()).then(|| {
        Advisory::new(
            &[f.condition, f.temperature],
            format!("{} storage should specify a {}", c, f.temperature),
        )
    })
}

// =============================================================================
// Rules
// =============================================================================

const RULES: &[Rule<StorageRequirements>] = &[
    Rule { name: "hazard_class_iff_hazardous", check: hazard_class_iff_hazardous },
    Rule { name: "temperature_regime_required", check: temperature_regime_required },
];

const ADVISORS: &[Advisor<StorageRequirements>] = &[Advisor {
    name: "temperature_regime_recommended",
    check: temperature_regime_recommended,
}];

fn hazard_class_iff_hazardous(s: &StorageRequirements, _: &ValidationContext<'_>) -> RuleResult {
    check_hazard_class(s.storage_condition, s.hazard_class, &PRODUCT_FIELDS)
}

fn temperature_regime_required(s: &StorageRequirements, ctx: &ValidationContext<'_>) -> RuleResult {
    check_temperature_required(
        s.storage_condition,
        s.temperature_regime,
        &ctx.config().storage,
        &PRODUCT_FIELDS,
    )
}

fn temperature_regime_recommended(
    s: &StorageRequirements,
    ctx: &ValidationContext<'_>,
) -> Option<Advisory> {
    recommend_temperature(
        s.storage_condition,
        s.temperature_regime,
        &ctx.config().storage,
        &PRODUCT_FIELDS,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
