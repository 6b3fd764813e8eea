//! # Product
//!
//! The root warehouse entity and its composite validator.
//!
//! ## Construction Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ProductDraft ──► field rules ──► sub-components ──► composite rules   │
//! │  (raw input)      sku, name,      dimensions         1. timestamps      │
//! │                   description,    handling           2. storage×track   │
//! │                   required enums  traceability       3. units/packaging │
//! │                                   storage            4. track×state     │
//! │                                   classification     5. size dims       │
//! │                                                      6. size stacking   │
//! │                                                      7. returns         │
//! │                                                             │           │
//! │                                   collaborator rules ◄──────┘           │
//! │                                   sku_unique, category_reference        │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                      Ok(Validated<Product>) | Err(ValidationErrors)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Product` value only exists if every rule passed. Changes go through
//! [`Product::mutate`], which rebuilds a draft, applies the patch and runs the
//! whole pipeline again: a single-field change can break a cross-field rule.

mod classification;
mod dimensions;
mod handling;
mod storage;
mod traceability;

pub use classification::{Classification, ClassificationDraft};
pub use dimensions::{Dimensions, DimensionsDraft, CM3_PER_M3};
pub use handling::{HandlingAttributes, HandlingDraft};
pub use storage::{StorageDraft, StorageRequirements};
pub use traceability::{Traceability, TraceabilityDraft};

pub(crate) use storage::{
    check_hazard_class, check_temperature_required, recommend_temperature, StorageFields,
};

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::category::CtgDefaults;
use crate::context::ValidationContext;
use crate::engine::{Report, Rule, RuleResult, Validated};
use crate::enums::{PhysicalState, ProductStatus, RoleType, StorageCondition, UnitOfMeasure};
use crate::error::{ValidationErrors, Violation, ViolationKind};
use crate::patch::{apply, apply_clearable, double_option};
use crate::tables::{
    physical_state_profile, units_for_tracking, SizeRequirement, STACKING_FORBIDDEN_SIZES,
};
use crate::validation::{validate_description, validate_name, validate_sku};

// =============================================================================
// Draft
// =============================================================================

/// Raw product input, as received from an API or import.
///
/// Every field is optional at this level so that a missing value is reported
/// as a [`ViolationKind::MissingRequiredField`] instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    #[ts(as = "Option<String>")]
    pub category_id: Option<Uuid>,
    pub unit_of_measure: Option<UnitOfMeasure>,
    pub physical_state: Option<PhysicalState>,
    pub role_type: Option<RoleType>,
    pub status: Option<ProductStatus>,
    pub description: Option<String>,
    /// Taken from the clock when absent.
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    /// Taken from the clock when absent.
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
    pub dimensions: DimensionsDraft,
    pub handling: HandlingDraft,
    pub traceability: TraceabilityDraft,
    pub storage: StorageDraft,
    pub classification: ClassificationDraft,
}

impl ProductDraft {
    /// Same as [`Product::construct`].
    pub fn finalize(self, ctx: &ValidationContext<'_>) -> Result<Validated<Product>, ValidationErrors> {
        Product::construct(self, ctx)
    }

    /// Pre-seeds absent fields from a category's defaults.
    ///
    /// ## Rules
    /// - Explicit values are never overwritten
    /// - `hazard_class` is only seeded when the resulting storage condition
    ///   is hazardous
    /// - `expiry_date` = `production_date` + `default_shelf_life_days` when
    ///   expiry is absent and production is known
    pub fn apply_category_defaults(&mut self, defaults: &CtgDefaults) {
        self.unit_of_measure = self.unit_of_measure.or(defaults.default_unit_of_measure);

        let trace = &mut self.traceability;
        trace.tracking_type = trace.tracking_type.or(defaults.default_tracking_type);
        if trace.expiry_date.is_none() {
            if let (Some(production), Some(days)) =
                (trace.production_date, defaults.default_shelf_life_days)
            {
                trace.expiry_date = production.checked_add_days(Days::new(u64::from(days)));
            }
        }

        let storage = &mut self.storage;
        storage.storage_condition = storage.storage_condition.or(defaults.default_storage_condition);
        storage.temperature_regime = storage
            .temperature_regime
            .or(defaults.default_temperature_regime);
        storage.packaging_type = storage.packaging_type.or(defaults.default_packaging_type);
        if storage.storage_condition == Some(StorageCondition::Hazardous) {
            storage.hazard_class = storage.hazard_class.or(defaults.default_hazard_class);
        }
    }

    /// Field rules, sub-components and assembly. `None` if a required field
    /// or sub-component is missing.
    fn finalize_into(self, ctx: &ValidationContext<'_>, report: &mut Report) -> Option<Product> {
        report.run(&self, FIELD_RULES, ctx);

        let dimensions = self.dimensions.finalize_into(ctx, report);
        let handling = self.handling.finalize_into(ctx, report);
        let traceability = self.traceability.finalize_into(ctx, report);
        let storage = self.storage.finalize_into(ctx, report);
        let classification = self.classification.finalize_into(ctx, report);

        let now = ctx.now();
        let created_at = self.created_at.unwrap_or(now);
        let updated_at = self.updated_at.unwrap_or_else(|| created_at.max(now));

        let (Some(unit_of_measure), Some(physical_state), Some(role_type), Some(status), Some(traceability)) = (
            self.unit_of_measure,
            self.physical_state,
            self.role_type,
            self.status,
            traceability,
        ) else {
            return None;
        };

        Some(Product {
            sku: self.sku,
            name: self.name.trim().to_string(),
            category_id: self.category_id,
            unit_of_measure,
            physical_state,
            role_type,
            status,
            description: self.description,
            created_at,
            updated_at,
            dimensions,
            handling,
            traceability,
            storage,
            classification,
        })
    }
}

// =============================================================================
// Patch
// =============================================================================

/// Partial update for [`Product::mutate`].
///
/// Absent fields keep their value. Sub-components are replaced whole.
/// `category_id` and `description` can be cleared with an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    #[ts(as = "Option<Option<String>>")]
    pub category_id: Option<Option<Uuid>>,
    pub unit_of_measure: Option<UnitOfMeasure>,
    pub physical_state: Option<PhysicalState>,
    pub role_type: Option<RoleType>,
    pub status: Option<ProductStatus>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Defaults to the clock's `now`.
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
    pub dimensions: Option<DimensionsDraft>,
    pub handling: Option<HandlingDraft>,
    pub traceability: Option<TraceabilityDraft>,
    pub storage: Option<StorageDraft>,
    pub classification: Option<ClassificationDraft>,
}

impl ProductPatch {
    fn apply_to(self, draft: &mut ProductDraft, now: DateTime<Utc>) {
        apply(&mut draft.sku, self.sku);
        apply(&mut draft.name, self.name);
        apply_clearable(&mut draft.category_id, self.category_id);
        apply_clearable(&mut draft.unit_of_measure, self.unit_of_measure.map(Some));
        apply_clearable(&mut draft.physical_state, self.physical_state.map(Some));
        apply_clearable(&mut draft.role_type, self.role_type.map(Some));
        apply_clearable(&mut draft.status, self.status.map(Some));
        apply_clearable(&mut draft.description, self.description);
        apply(&mut draft.dimensions, self.dimensions);
        apply(&mut draft.handling, self.handling);
        apply(&mut draft.traceability, self.traceability);
        apply(&mut draft.storage, self.storage);
        apply(&mut draft.classification, self.classification);
        draft.updated_at = Some(self.updated_at.unwrap_or(now));
    }
}

// =============================================================================
// Product
// =============================================================================

/// A validated product. Immutable; see [`Product::mutate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ProductDraft")]
pub struct Product {
    sku: String,
    name: String,
    category_id: Option<Uuid>,
    unit_of_measure: UnitOfMeasure,
    physical_state: PhysicalState,
    role_type: RoleType,
    status: ProductStatus,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    dimensions: Dimensions,
    handling: HandlingAttributes,
    traceability: Traceability,
    storage: StorageRequirements,
    classification: Classification,
}

impl Product {
    /// Validates `draft` and returns the accepted product with its advisories.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::{FixedClock, ProductDraft, Product, ValidationConfig, ValidationContext};
    /// use depot_core::enums::{PhysicalState, ProductStatus, RoleType, TrackingType, UnitOfMeasure};
    /// use depot_core::product::TraceabilityDraft;
    ///
    /// let config = ValidationConfig::default();
    /// let clock = FixedClock::on(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    /// let ctx = ValidationContext::new(&config, &clock);
    ///
    /// let draft = ProductDraft {
    ///     sku: "BOLT08".into(),
    ///     name: "Steel bolt M8".into(),
    ///     unit_of_measure: Some(UnitOfMeasure::Piece),
    ///     physical_state: Some(PhysicalState::Solid),
    ///     role_type: Some(RoleType::Components),
    ///     status: Some(ProductStatus::Active),
    ///     traceability: TraceabilityDraft::new(TrackingType::Piece),
    ///     ..ProductDraft::default()
    /// };
    ///
    /// let product = Product::construct(draft, &ctx).unwrap();
    /// assert_eq!(product.sku(), "BOLT08");
    /// ```
    pub fn construct(
        draft: ProductDraft,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<Product>, ValidationErrors> {
        Self::validate(draft, ctx, None)
    }

    /// Applies `patch` to a copy of this product and re-validates everything.
    ///
    /// `updated_at` is stamped with the clock unless the patch sets it. The
    /// SKU uniqueness check only runs when the SKU changes.
    pub fn mutate(
        &self,
        patch: ProductPatch,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<Product>, ValidationErrors> {
        let mut draft = self.to_draft();
        patch.apply_to(&mut draft, ctx.now());
        Self::validate(draft, ctx, Some(&self.sku))
    }

    fn validate(
        draft: ProductDraft,
        ctx: &ValidationContext<'_>,
        previous_sku: Option<&str>,
    ) -> Result<Validated<Product>, ValidationErrors> {
        let sku = draft.sku.clone();
        let mut report = ctx.report();
        let product = draft.finalize_into(ctx, &mut report);

        if let Some(product) = &product {
            report.run_steps(product, COMPOSITE_STEPS, ctx);
            if previous_sku != Some(product.sku.as_str()) {
                report.check("sku_unique", sku_unique(product, ctx));
            }
            report.check("category_reference", category_reference(product, ctx));
        }

        if report.is_clean() {
            debug!(
                sku = %sku,
                advisories = report.advisories().len(),
                "Product accepted"
            );
        } else {
            debug!(
                sku = %sku,
                violations = report.violations().len(),
                "Product rejected"
            );
        }

        report.finish(product)
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category_id(&self) -> Option<Uuid> {
        self.category_id
    }

    pub fn unit_of_measure(&self) -> UnitOfMeasure {
        self.unit_of_measure
    }

    pub fn physical_state(&self) -> PhysicalState {
        self.physical_state
    }

    pub fn role_type(&self) -> RoleType {
        self.role_type
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn handling(&self) -> &HandlingAttributes {
        &self.handling
    }

    pub fn traceability(&self) -> &Traceability {
        &self.traceability
    }

    pub fn storage(&self) -> &StorageRequirements {
        &self.storage
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// A draft that finalizes back to an equal product.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft::from(self.clone())
    }
}

impl From<Product> for ProductDraft {
    fn from(p: Product) -> Self {
        ProductDraft {
            sku: p.sku,
            name: p.name,
            category_id: p.category_id,
            unit_of_measure: Some(p.unit_of_measure),
            physical_state: Some(p.physical_state),
            role_type: Some(p.role_type),
            status: Some(p.status),
            description: p.description,
            created_at: Some(p.created_at),
            updated_at: Some(p.updated_at),
            dimensions: p.dimensions.into(),
            handling: p.handling.into(),
            traceability: p.traceability.into(),
            storage: p.storage.into(),
            classification: p.classification.into(),
        }
    }
}

// =============================================================================
// Field Rules
// =============================================================================

const FIELD_RULES: &[Rule<ProductDraft>] = &[
    Rule { name: "sku_format", check: sku_format },
    Rule { name: "name_format", check: name_format },
    Rule { name: "description_length", check: description_length },
    Rule { name: "unit_of_measure_present", check: unit_of_measure_present },
    Rule { name: "physical_state_present", check: physical_state_present },
    Rule { name: "role_type_present", check: role_type_present },
    Rule { name: "status_present", check: status_present },
];

fn sku_format(d: &ProductDraft, _: &ValidationContext<'_>) -> RuleResult {
    validate_sku(&d.sku)
}

fn name_format(d: &ProductDraft, ctx: &ValidationContext<'_>) -> RuleResult {
    validate_name(&d.name, ctx.config().limits.name_max_chars)
}

fn description_length(d: &ProductDraft, ctx: &ValidationContext<'_>) -> RuleResult {
    validate_description(d.description.as_deref(), ctx.config().limits.description_max_chars)
}

fn require<T>(value: Option<T>, field: &str) -> RuleResult {
    match value {
        Some(_) => Ok(()),
        None => Err(Violation::missing(field, format!("{} is required", field))),
    }
}

fn unit_of_measure_present(d: &ProductDraft, _: &ValidationContext<'_>) -> RuleResult {
    require(d.unit_of_measure, "unit_of_measure")
}

fn physical_state_present(d: &ProductDraft, _: &ValidationContext<'_>) -> RuleResult {
    require(d.physical_state, "physical_state")
}

fn role_type_present(d: &ProductDraft, _: &ValidationContext<'_>) -> RuleResult {
    require(d.role_type, "role_type")
}

fn status_present(d: &ProductDraft, _: &ValidationContext<'_>) -> RuleResult {
    require(d.status, "status")
}

// =============================================================================
// Composite Rules
// =============================================================================
// Order is part of the contract: fail-fast mode reports the first entry
// that fails. Each step stops at its first violation, so collect-all mode
// reports at most one violation per step.

const COMPOSITE_STEPS: &[&[Rule<Product>]] = &[
    // 1. timestamps
    &[Rule { name: "timestamps_ordered", check: timestamps_ordered }],
    // 2. storage condition × tracking / handling
    &[
        Rule { name: "expiry_tracking_required", check: expiry_tracking_required },
        Rule { name: "static_protection_required", check: static_protection_required },
    ],
    // 3. units and packaging
    &[
        Rule { name: "tracking_unit", check: tracking_unit },
        Rule { name: "physical_state_unit", check: physical_state_unit },
        Rule { name: "physical_state_packaging", check: physical_state_packaging },
        Rule { name: "physical_state_ventilation", check: physical_state_ventilation },
    ],
    // 4. tracking × physical state
    &[Rule { name: "tracking_physical_state", check: tracking_physical_state }],
    // 5. size type dimensions
    &[Rule { name: "size_type_dimensions", check: size_type_dimensions }],
    // 6. size type stacking
    &[Rule { name: "size_type_stacking", check: size_type_stacking }],
    // 7. returns
    &[Rule { name: "returns_quarantine", check: returns_quarantine }],
];

fn cross(fields: &[&str], message: String) -> Violation {
    Violation::new(ViolationKind::CrossComponentRuleViolation, fields, message)
}

fn timestamps_ordered(p: &Product, _: &ValidationContext<'_>) -> RuleResult {
    check_timestamps(p.created_at, p.updated_at)
}

/// `updated_at >= created_at`. Shared with categories.
pub(crate) fn check_timestamps(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> RuleResult {
    if updated_at < created_at {
        return Err(Violation::new(
            ViolationKind::DateOrderViolation,
            &["created_at", "updated_at"],
            format!(
                "updated_at {} cannot be earlier than created_at {}",
                updated_at, created_at
            ),
        ));
    }
    Ok(())
}

fn expiry_tracking_required(p: &Product, ctx: &ValidationContext<'_>) -> RuleResult {
    match p.storage.storage_condition() {
        Some(c) if ctx.config().storage.requires_expiry_tracking(c) && !p.traceability.is_expiry_tracked() => {
            Err(cross(
                &["storage_condition", "tracking_type"],
                format!(
                    "{} products must use tracking_type expiry_tracked, got {}",
                    c,
                    p.traceability.tracking_type()
                ),
            ))
        }
        _ => Ok(()),
    }
}

fn static_protection_required(p: &Product, ctx: &ValidationContext<'_>) -> RuleResult {
    match p.storage.storage_condition() {
        Some(c) if ctx.config().storage.requires_static_protection(c) && !p.handling.is_static_sensitive() => {
            Err(cross(
                &["storage_condition", "is_static_sensitive"],
                format!("{} products must be marked static sensitive", c),
            ))
        }
        _ => Ok(()),
    }
}

fn tracking_unit(p: &Product, _: &ValidationContext<'_>) -> RuleResult {
    let tracking = p.traceability.tracking_type();
    match units_for_tracking(tracking) {
        Some(units) if !units.contains(&p.unit_of_measure) => Err(Violation::new(
            ViolationKind::UnitMismatch,
            &["tracking_type", "unit_of_measure"],
            format!(
                "{} tracking requires unit_of_measure in {}, got {}",
                tracking,
                list(units),
                p.unit_of_measure
            ),
        )),
        _ => Ok(()),
    }
}

fn physical_state_unit(p: &Product, _: &ValidationContext<'_>) -> RuleResult {
    let profile = physical_state_profile(p.physical_state);
    if profile.allows_unit(p.unit_of_measure) {
        return Ok(());
    }
    Err(Violation::new(
        ViolationKind::UnitMismatch,
        &["physical_state", "unit_of_measure"],
        format!(
            "{} products require unit_of_measure in {}, got {}",
            p.physical_state,
            list(profile.units.unwrap_or(&[])),
            p.unit_of_measure
        ),
    ))
}

fn physical_state_packaging(p: &Product, _: &ValidationContext<'_>) -> RuleResult {
    let packaging = p.storage.packaging_type();
    if physical_state_profile(p.physical_state).allows_packaging(packaging) {
        return Ok(());
    }
    let packaging = packaging.map(|pk| pk.code()).unwrap_or_default();
    Err(Violation::new(
        ViolationKind::ForbiddenFieldPresent,
        &["physical_state", "packaging_type"],
        format!("packaging_type {} is not allowed for {} products", packaging, p.physical_state),
    ))
}

fn physical_state_ventilation(p: &Product, _: &ValidationContext<'_>) -> RuleResult {
    if physical_state_profile(p.physical_state).requires_ventilation && !p.handling.requires_ventilation() {
        return Err(cross(
            &["physical_state", "requires_ventilation"],
            format!("{} products require ventilation", p.physical_state),
        ));
    }
    Ok(())
}

fn tracking_physical_state(p: &Product, _: &ValidationContext<'_>) -> RuleResult {
    let tracking = p.traceability.tracking_type();
    if physical_state_profile(p.physical_state).allows_tracking(tracking) {
        return Ok(());
    }
    Err(cross(
        &["tracking_type", "physical_state"],
        format!("{} products cannot use {} tracking", p.physical_state, tracking),
    ))
}

fn size_type_dimensions(p: &Product, ctx: &ValidationContext<'_>) -> RuleResult {
    let Some(size) = p.classification.size_type() else {
        return Ok(());
    };
    match SizeRequirement::for_size(size, &ctx.config().thresholds) {
        Some(requirement) => requirement.check(size, &p.dimensions),
        None => Ok(()),
    }
}

fn size_type_stacking(p: &Product, _: &ValidationContext<'_>) -> RuleResult {
    match p.classification.size_type() {
        Some(size) if STACKING_FORBIDDEN_SIZES.contains(&size) && p.handling.is_stackable() => Err(cross(
            &["size_type", "is_stackable"],
            format!("{} products cannot be stackable", size),
        )),
        _ => Ok(()),
    }
}

fn returns_quarantine(p: &Product, _: &ValidationContext<'_>) -> RuleResult {
    if p.role_type == RoleType::Returns && !p.handling.requires_quarantine() {
        return Err(cross(
            &["role_type", "requires_quarantine"],
            "returned products must require quarantine".to_string(),
        ));
    }
    Ok(())
}

fn list(units: &[UnitOfMeasure]) -> String {
    let codes: Vec<&str> = units.iter().map(|u| u.code()).collect();
    format!("{{{}}}", codes.join(", "))
}

// =============================================================================
// Collaborator Rules
// =============================================================================

fn sku_unique(p: &Product, ctx: &ValidationContext<'_>) -> RuleResult {
    match ctx.skus() {
        Some(registry) if registry.is_taken(&p.sku) => Err(Violation::new(
            ViolationKind::DuplicateValue,
            &["sku"],
            format!("sku '{}' is already in use", p.sku),
        )),
        _ => Ok(()),
    }
}

fn category_reference(p: &Product, ctx: &ValidationContext<'_>) -> RuleResult {
    let (Some(id), Some(categories)) = (p.category_id, ctx.categories()) else {
        return Ok(());
    };
    match categories.find(id) {
        Some(node) if !node.is_deleted => Ok(()),
        Some(_) => Err(Violation::new(
            ViolationKind::UnknownReference,
            &["category_id"],
            format!("category {} is deleted", id),
        )),
        None => Err(Violation::new(
            ViolationKind::UnknownReference,
            &["category_id"],
            format!("category {} does not exist", id),
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ValidationConfig, ValidationMode};
    use crate::context::{CategoryNode, Clock, FixedClock};
    use crate::enums::{
        HazardClass, MovingType, PackagingType, SizeType, TemperatureRegime, TrackingType,
    };
    use chrono::{Duration, NaiveDate};
    use std::collections::{HashMap, HashSet};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::on(today())
    }

    fn config(mode: ValidationMode) -> ValidationConfig {
        ValidationConfig::default().with_mode(mode)
    }

    fn construct(draft: ProductDraft) -> Result<Validated<Product>, ValidationErrors> {
        let config = config(ValidationMode::FailFast);
        let clock = clock();
        Product::construct(draft, &ValidationContext::new(&config, &clock))
    }

    fn collect_all(draft: ProductDraft) -> ValidationErrors {
        let config = config(ValidationMode::CollectAll);
        let clock = clock();
        Product::construct(draft, &ValidationContext::new(&config, &clock)).unwrap_err()
    }

    fn first_rule(result: Result<Validated<Product>, ValidationErrors>) -> String {
        result.unwrap_err().first().unwrap().rule.clone()
    }

    fn valid_draft() -> ProductDraft {
        ProductDraft {
            sku: "BOLT08".to_string(),
            name: "Steel bolt M8".to_string(),
            unit_of_measure: Some(UnitOfMeasure::Piece),
            physical_state: Some(PhysicalState::Solid),
            role_type: Some(RoleType::Components),
            status: Some(ProductStatus::Active),
            traceability: TraceabilityDraft::new(TrackingType::Piece),
            ..ProductDraft::default()
        }
    }

    fn gas_draft(ventilated: bool) -> ProductDraft {
        ProductDraft {
            unit_of_measure: Some(UnitOfMeasure::Liter),
            physical_state: Some(PhysicalState::Gas),
            traceability: TraceabilityDraft::new(TrackingType::LotTracked),
            storage: StorageDraft {
                packaging_type: Some(PackagingType::Cylinder),
                ..StorageDraft::default()
            },
            handling: HandlingDraft {
                requires_ventilation: ventilated,
                ..HandlingDraft::default()
            },
            ..valid_draft()
        }
    }

    fn heavy_draft(weight: f64) -> ProductDraft {
        ProductDraft {
            classification: ClassificationDraft {
                size_type: Some(SizeType::Heavy),
                ..ClassificationDraft::default()
            },
            dimensions: DimensionsDraft {
                weight_kg: Some(weight),
                ..DimensionsDraft::default()
            },
            handling: HandlingDraft {
                is_stackable: false,
                ..HandlingDraft::default()
            },
            ..valid_draft()
        }
    }

    fn perishable_draft() -> ProductDraft {
        ProductDraft {
            storage: StorageDraft {
                storage_condition: Some(StorageCondition::Perishable),
                temperature_regime: Some(TemperatureRegime::Chilled),
                ..StorageDraft::default()
            },
            traceability: TraceabilityDraft {
                tracking_type: Some(TrackingType::ExpiryTracked),
                production_date: Some(today() - Duration::days(2)),
                expiry_date: Some(today() + Duration::days(10)),
            },
            ..valid_draft()
        }
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[test]
    fn test_construct_valid_product() {
        let product = construct(valid_draft()).unwrap();
        assert_eq!(product.sku(), "BOLT08");
        assert_eq!(product.created_at(), clock().now());
        assert_eq!(product.updated_at(), product.created_at());
        assert!(product.advisories().is_empty());
    }

    #[test]
    fn test_name_is_trimmed() {
        let draft = ProductDraft {
            name: "  Steel bolt M8 ".to_string(),
            ..valid_draft()
        };
        assert_eq!(construct(draft).unwrap().name(), "Steel bolt M8");
    }

    #[test]
    fn test_field_rules_come_first() {
        let draft = ProductDraft {
            sku: "bolt".to_string(),
            role_type: Some(RoleType::Returns),
            ..valid_draft()
        };
        assert_eq!(first_rule(construct(draft)), "sku_format");
    }

    #[test]
    fn test_empty_draft_lists_missing_fields() {
        let errors = collect_all(ProductDraft::default());
        for field in [
            "sku",
            "name",
            "unit_of_measure",
            "physical_state",
            "role_type",
            "status",
            "tracking_type",
        ] {
            assert!(errors.concerns(field), "expected a violation for {}", field);
        }
        // Nothing was assembled, so no composite rule ran.
        assert!(!errors.has_rule("timestamps_ordered"));
    }

    #[test]
    fn test_timestamps_ordered() {
        let created = clock().now();
        let draft = ProductDraft {
            created_at: Some(created),
            updated_at: Some(created - Duration::seconds(1)),
            ..valid_draft()
        };
        let errors = construct(draft).unwrap_err();
        assert_eq!(errors.first().unwrap().rule, "timestamps_ordered");
        assert_eq!(errors.first().unwrap().kind, ViolationKind::DateOrderViolation);
    }

    // -------------------------------------------------------------------------
    // Storage × tracking
    // -------------------------------------------------------------------------

    #[test]
    fn test_perishable_requires_expiry_tracking() {
        assert!(construct(perishable_draft()).is_ok());

        let draft = ProductDraft {
            traceability: TraceabilityDraft::new(TrackingType::LotTracked),
            ..perishable_draft()
        };
        let errors = construct(draft).unwrap_err();
        assert_eq!(errors.first().unwrap().rule, "expiry_tracking_required");
        assert_eq!(errors.first().unwrap().kind, ViolationKind::CrossComponentRuleViolation);
    }

    #[test]
    fn test_electronics_requires_static_protection_and_advises_temperature() {
        let electronics = |static_sensitive: bool| ProductDraft {
            storage: StorageDraft {
                storage_condition: Some(StorageCondition::Electronics),
                ..StorageDraft::default()
            },
            handling: HandlingDraft {
                is_static_sensitive: static_sensitive,
                ..HandlingDraft::default()
            },
            ..valid_draft()
        };

        assert_eq!(first_rule(construct(electronics(false))), "static_protection_required");

        let accepted = construct(electronics(true)).unwrap();
        assert_eq!(accepted.advisories().len(), 1);
        assert_eq!(accepted.advisories()[0].rule, "temperature_regime_recommended");
    }

    #[test]
    fn test_hazardous_product() {
        let draft = ProductDraft {
            storage: StorageDraft {
                storage_condition: Some(StorageCondition::Hazardous),
                hazard_class: Some(HazardClass::Class3),
                ..StorageDraft::default()
            },
            ..valid_draft()
        };
        assert!(construct(draft).is_ok());
    }

    // -------------------------------------------------------------------------
    // Units, packaging, physical state
    // -------------------------------------------------------------------------

    #[test]
    fn test_weight_based_requires_mass_or_volume_unit() {
        let draft = ProductDraft {
            traceability: TraceabilityDraft::new(TrackingType::WeightBased),
            ..valid_draft()
        };
        let errors = construct(draft).unwrap_err();
        assert_eq!(errors.first().unwrap().rule, "tracking_unit");
        assert_eq!(errors.first().unwrap().kind, ViolationKind::UnitMismatch);

        let kg = ProductDraft {
            unit_of_measure: Some(UnitOfMeasure::Kilogram),
            traceability: TraceabilityDraft::new(TrackingType::WeightBased),
            ..valid_draft()
        };
        assert!(construct(kg).is_ok());
    }

    #[test]
    fn test_kit_units() {
        let draft = ProductDraft {
            unit_of_measure: Some(UnitOfMeasure::Box),
            traceability: TraceabilityDraft::new(TrackingType::Kit),
            ..valid_draft()
        };
        assert_eq!(first_rule(construct(draft)), "tracking_unit");
    }

    #[test]
    fn test_gas_with_ventilation_accepted() {
        assert!(construct(gas_draft(true)).is_ok());
    }

    #[test]
    fn test_gas_without_ventilation_rejected() {
        let errors = construct(gas_draft(false)).unwrap_err();
        assert_eq!(errors.first().unwrap().rule, "physical_state_ventilation");
        assert_eq!(errors.first().unwrap().kind, ViolationKind::CrossComponentRuleViolation);
    }

    #[test]
    fn test_gas_packaging_restricted() {
        let mut draft = gas_draft(true);
        draft.storage.packaging_type = Some(PackagingType::Bag);
        let errors = construct(draft.clone()).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ViolationKind::ForbiddenFieldPresent);

        draft.storage.packaging_type = None;
        assert!(construct(draft).is_ok());
    }

    #[test]
    fn test_liquid_rules() {
        let liquid = ProductDraft {
            unit_of_measure: Some(UnitOfMeasure::Milliliter),
            physical_state: Some(PhysicalState::Liquid),
            traceability: TraceabilityDraft::new(TrackingType::LotTracked),
            ..valid_draft()
        };
        assert!(construct(liquid.clone()).is_ok());

        let mut boxed = liquid.clone();
        boxed.storage.packaging_type = Some(PackagingType::Box);
        assert_eq!(first_rule(construct(boxed)), "physical_state_packaging");

        let mut in_kg = liquid;
        in_kg.unit_of_measure = Some(UnitOfMeasure::Kilogram);
        assert_eq!(first_rule(construct(in_kg)), "physical_state_unit");
    }

    #[test]
    fn test_unit_step_reports_first_violation_only() {
        let draft = ProductDraft {
            unit_of_measure: Some(UnitOfMeasure::Kilogram),
            physical_state: Some(PhysicalState::Liquid),
            traceability: TraceabilityDraft::new(TrackingType::LotTracked),
            storage: StorageDraft {
                packaging_type: Some(PackagingType::Box),
                ..StorageDraft::default()
            },
            ..valid_draft()
        };
        let errors = collect_all(draft);
        assert_eq!(errors.len(), 1);
        assert!(errors.has_rule("physical_state_unit"));
        assert!(!errors.has_rule("physical_state_packaging"));
    }

    #[test]
    fn test_bulk_with_piece_tracking() {
        let draft = ProductDraft {
            physical_state: Some(PhysicalState::Bulk),
            unit_of_measure: Some(UnitOfMeasure::Kilogram),
            ..valid_draft()
        };
        // Unit rules run before the tracking/state rule.
        assert_eq!(first_rule(construct(draft.clone())), "tracking_unit");
        assert!(collect_all(draft).has_rule("tracking_physical_state"));
    }

    // -------------------------------------------------------------------------
    // Size type
    // -------------------------------------------------------------------------

    #[test]
    fn test_heavy_threshold_boundary() {
        let below = construct(heavy_draft(49.9)).unwrap_err();
        assert_eq!(below.first().unwrap().kind, ViolationKind::DimensionThresholdViolation);
        assert!(construct(heavy_draft(50.0)).is_ok());
    }

    #[test]
    fn test_heavy_without_weight() {
        let mut draft = heavy_draft(0.0);
        draft.dimensions.weight_kg = None;
        let errors = construct(draft).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ViolationKind::MissingRequiredField);
        assert!(errors.concerns("weight_kg"));
    }

    #[test]
    fn test_heavy_cannot_stack() {
        let mut draft = heavy_draft(80.0);
        draft.handling.is_stackable = true;
        assert_eq!(first_rule(construct(draft)), "size_type_stacking");
    }

    #[test]
    fn test_heavy_fast_moving_rejected_in_classification() {
        let mut draft = heavy_draft(80.0);
        draft.classification.moving_type = Some(MovingType::FastMoving);
        assert_eq!(first_rule(construct(draft)), "size_not_fast_moving");
    }

    #[test]
    fn test_oversized_uses_dimensions() {
        let draft = ProductDraft {
            classification: ClassificationDraft {
                size_type: Some(SizeType::Oversized),
                ..ClassificationDraft::default()
            },
            dimensions: DimensionsDraft {
                width_cm: Some(240.0),
                height_cm: Some(120.0),
                depth_cm: Some(80.0),
                ..DimensionsDraft::default()
            },
            handling: HandlingDraft {
                is_stackable: false,
                ..HandlingDraft::default()
            },
            ..valid_draft()
        };
        let product = construct(draft).unwrap();
        assert_eq!(product.dimensions().volume_m3(), Some(240.0 * 120.0 * 80.0 / 1e6));
    }

    #[test]
    fn test_light_threshold_boundary() {
        let light = |weight: f64| ProductDraft {
            classification: ClassificationDraft {
                size_type: Some(SizeType::Light),
                ..ClassificationDraft::default()
            },
            dimensions: DimensionsDraft {
                weight_kg: Some(weight),
                ..DimensionsDraft::default()
            },
            ..valid_draft()
        };
        assert!(construct(light(10.0)).is_ok());

        let errors = construct(light(10.5)).unwrap_err();
        assert_eq!(errors.first().unwrap().rule, "size_type_dimensions");
        assert_eq!(errors.first().unwrap().kind, ViolationKind::DimensionThresholdViolation);
    }

    #[test]
    fn test_small_parts_needs_one_small_dimension() {
        let small = |depth: Option<f64>| ProductDraft {
            classification: ClassificationDraft {
                size_type: Some(SizeType::SmallParts),
                ..ClassificationDraft::default()
            },
            dimensions: DimensionsDraft {
                width_cm: Some(80.0),
                height_cm: Some(31.0),
                depth_cm: depth,
                ..DimensionsDraft::default()
            },
            ..valid_draft()
        };
        assert!(construct(small(Some(5.0))).is_ok());

        let errors = construct(small(None)).unwrap_err();
        assert_eq!(errors.first().unwrap().rule, "size_type_dimensions");
        assert!(errors.concerns("depth_cm"));

        let empty = ProductDraft {
            dimensions: DimensionsDraft::default(),
            ..small(None)
        };
        let missing = construct(empty).unwrap_err();
        assert_eq!(missing.first().unwrap().kind, ViolationKind::MissingRequiredField);
    }

    #[test]
    fn test_size_thresholds_from_config() {
        let mut config = config(ValidationMode::FailFast);
        config.thresholds.heavy_min_weight_kg = 100.0;
        let clock = clock();
        let ctx = ValidationContext::new(&config, &clock);
        assert!(Product::construct(heavy_draft(80.0), &ctx).is_err());
    }

    // -------------------------------------------------------------------------
    // Roles
    // -------------------------------------------------------------------------

    #[test]
    fn test_returns_require_quarantine() {
        let draft = ProductDraft {
            role_type: Some(RoleType::Returns),
            ..valid_draft()
        };
        assert_eq!(first_rule(construct(draft.clone())), "returns_quarantine");

        let quarantined = ProductDraft {
            handling: HandlingDraft {
                requires_quarantine: true,
                ..HandlingDraft::default()
            },
            ..draft
        };
        assert!(construct(quarantined).is_ok());
    }

    // -------------------------------------------------------------------------
    // Modes
    // -------------------------------------------------------------------------

    #[test]
    fn test_collect_all_reports_every_step() {
        let draft = ProductDraft {
            role_type: Some(RoleType::Returns),
            ..gas_draft(false)
        };
        let errors = collect_all(draft.clone());
        assert!(errors.has_rule("physical_state_ventilation"));
        assert!(errors.has_rule("returns_quarantine"));

        assert_eq!(construct(draft).unwrap_err().len(), 1);
    }

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------

    #[test]
    fn test_sku_uniqueness() {
        let config = config(ValidationMode::FailFast);
        let clock = clock();
        let taken: HashSet<String> = ["BOLT08".to_string()].into_iter().collect();
        let ctx = ValidationContext::new(&config, &clock).with_sku_registry(&taken);

        let errors = Product::construct(valid_draft(), &ctx).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ViolationKind::DuplicateValue);

        // The product's own SKU is taken by itself; keeping it is fine.
        let existing = construct(valid_draft()).unwrap().into_inner();
        let renamed = existing.mutate(
            ProductPatch {
                name: Some("Bolt M8 zinc".to_string()),
                ..ProductPatch::default()
            },
            &ctx,
        );
        assert!(renamed.is_ok());
    }

    #[test]
    fn test_category_reference() {
        let config = config(ValidationMode::FailFast);
        let clock = clock();
        let live = Uuid::new_v4();
        let deleted = Uuid::new_v4();
        let mut categories = HashMap::new();
        for (id, is_deleted) in [(live, false), (deleted, true)] {
            categories.insert(
                id,
                CategoryNode {
                    id,
                    parent_id: None,
                    level: 0,
                    is_deleted,
                },
            );
        }
        let ctx = ValidationContext::new(&config, &clock).with_categories(&categories);

        let with_category = |id| ProductDraft {
            category_id: Some(id),
            ..valid_draft()
        };

        assert!(Product::construct(with_category(live), &ctx).is_ok());
        for id in [deleted, Uuid::new_v4()] {
            let errors = Product::construct(with_category(id), &ctx).unwrap_err();
            assert_eq!(errors.first().unwrap().kind, ViolationKind::UnknownReference);
        }

        // Without a lookup the reference is not checked.
        assert!(construct(with_category(Uuid::new_v4())).is_ok());
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    #[test]
    fn test_mutate_stamps_updated_at() {
        let product = construct(valid_draft()).unwrap().into_inner();

        let config = config(ValidationMode::FailFast);
        let later = FixedClock::new(clock().now() + Duration::hours(3));
        let ctx = ValidationContext::new(&config, &later);

        let patched = product
            .mutate(
                ProductPatch {
                    status: Some(ProductStatus::Discontinued),
                    ..ProductPatch::default()
                },
                &ctx,
            )
            .unwrap();

        assert_eq!(patched.status(), ProductStatus::Discontinued);
        assert_eq!(patched.created_at(), product.created_at());
        assert_eq!(patched.updated_at(), later.now());
    }

    #[test]
    fn test_mutate_rechecks_cross_rules() {
        let product = construct(valid_draft()).unwrap().into_inner();
        let config = config(ValidationMode::FailFast);
        let clock = clock();
        let ctx = ValidationContext::new(&config, &clock);

        let errors = product
            .mutate(
                ProductPatch {
                    role_type: Some(RoleType::Returns),
                    ..ProductPatch::default()
                },
                &ctx,
            )
            .unwrap_err();
        assert!(errors.has_rule("returns_quarantine"));
        assert_eq!(product.role_type(), RoleType::Components);
    }

    #[test]
    fn test_patch_clears_description() {
        let draft = ProductDraft {
            description: Some("zinc plated".to_string()),
            ..valid_draft()
        };
        let product = construct(draft).unwrap().into_inner();
        let config = config(ValidationMode::FailFast);
        let clock = clock();
        let ctx = ValidationContext::new(&config, &clock);

        let patch: ProductPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let cleared = product.mutate(patch, &ctx).unwrap();
        assert_eq!(cleared.description(), None);

        let untouched = product.mutate(ProductPatch::default(), &ctx).unwrap();
        assert_eq!(untouched.description(), Some("zinc plated"));
    }

    #[test]
    fn test_patch_replaces_dimensions_and_rederives_volume() {
        let draft = ProductDraft {
            dimensions: DimensionsDraft {
                width_cm: Some(10.0),
                height_cm: Some(10.0),
                depth_cm: Some(10.0),
                ..DimensionsDraft::default()
            },
            ..valid_draft()
        };
        let product = construct(draft).unwrap().into_inner();
        assert_eq!(product.dimensions().volume_m3(), Some(0.001));

        let config = config(ValidationMode::FailFast);
        let clock = clock();
        let ctx = ValidationContext::new(&config, &clock);
        let patched = product
            .mutate(
                ProductPatch {
                    dimensions: Some(DimensionsDraft {
                        width_cm: Some(120.0),
                        height_cm: Some(75.0),
                        depth_cm: Some(60.0),
                        ..DimensionsDraft::default()
                    }),
                    ..ProductPatch::default()
                },
                &ctx,
            )
            .unwrap();
        assert_eq!(patched.dimensions().volume_m3(), Some(0.54));
    }

    // -------------------------------------------------------------------------
    // Category defaults
    // -------------------------------------------------------------------------

    #[test]
    fn test_apply_category_defaults() {
        let defaults = CtgDefaults {
            default_storage_condition: Some(StorageCondition::Perishable),
            default_temperature_regime: Some(TemperatureRegime::Chilled),
            default_tracking_type: Some(TrackingType::ExpiryTracked),
            default_shelf_life_days: Some(30),
            default_unit_of_measure: Some(UnitOfMeasure::Kilogram),
            default_hazard_class: Some(HazardClass::Class9),
            ..CtgDefaults::default()
        };

        let mut draft = ProductDraft {
            unit_of_measure: None,
            traceability: TraceabilityDraft {
                tracking_type: None,
                production_date: Some(today()),
                expiry_date: None,
            },
            ..valid_draft()
        };
        draft.apply_category_defaults(&defaults);

        assert_eq!(draft.unit_of_measure, Some(UnitOfMeasure::Kilogram));
        assert_eq!(draft.traceability.tracking_type, Some(TrackingType::ExpiryTracked));
        assert_eq!(draft.traceability.expiry_date, Some(today() + Duration::days(30)));
        assert_eq!(draft.storage.temperature_regime, Some(TemperatureRegime::Chilled));
        // Not hazardous, so the hazard class is not seeded.
        assert_eq!(draft.storage.hazard_class, None);

        assert!(construct(draft).is_ok());
    }

    #[test]
    fn test_category_defaults_never_overwrite() {
        let defaults = CtgDefaults {
            default_unit_of_measure: Some(UnitOfMeasure::Kilogram),
            default_tracking_type: Some(TrackingType::WeightBased),
            ..CtgDefaults::default()
        };
        let mut draft = valid_draft();
        draft.apply_category_defaults(&defaults);
        assert_eq!(draft.unit_of_measure, Some(UnitOfMeasure::Piece));
        assert_eq!(draft.traceability.tracking_type, Some(TrackingType::Piece));
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    #[test]
    fn test_round_trip_preserves_derived_fields() {
        let draft = ProductDraft {
            dimensions: DimensionsDraft {
                width_cm: Some(120.0),
                height_cm: Some(75.0),
                depth_cm: Some(60.0),
                weight_kg: Some(12.5),
                ..DimensionsDraft::default()
            },
            description: Some("Euro pallet crate".to_string()),
            category_id: Some(Uuid::new_v4()),
            ..perishable_draft()
        };
        let product = construct(draft).unwrap().into_inner();

        let json = serde_json::to_string(&product).unwrap();
        let parsed: ProductDraft = serde_json::from_str(&json).unwrap();
        let rebuilt = construct(parsed).unwrap().into_inner();

        assert_eq!(rebuilt, product);
        assert_eq!(rebuilt.dimensions().volume_m3(), Some(0.54));
    }

    #[test]
    fn test_serialized_codes() {
        let product = construct(gas_draft(true)).unwrap().into_inner();
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["unit_of_measure"], "l");
        assert_eq!(json["physical_state"], "gas");
        assert_eq!(json["traceability"]["tracking_type"], "lot_tracked");
        assert_eq!(json["storage"]["packaging_type"], "cylinder");
        assert_eq!(json["handling"]["requires_ventilation"], true);
    }
}
