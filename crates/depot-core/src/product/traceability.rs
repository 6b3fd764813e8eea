//! Tracking type and the production/expiry date rules.
//!
//! ## Evaluation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracking_type_present       tracking_type is mandatory             │
//! │  2. expiry_not_in_past          expiry_date >= today                   │
//! │  3. production_not_in_future    production_date <= today               │
//! │  4. expiry_after_production     expiry_date >  production_date         │
//! │  5. expiry_tracked_dates        EXPIRY_TRACKED needs both dates        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Single-date sanity first, then the pairwise order, then the requirement
//! that depends on the tracking type. "Today" comes from the context clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::context::ValidationContext;
use crate::engine::{Report, Rule, RuleResult, Validated};
use crate::enums::TrackingType;
use crate::error::{ValidationErrors, Violation, ViolationKind};

/// Raw traceability input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct TraceabilityDraft {
    pub tracking_type: Option<TrackingType>,
    #[ts(as = "Option<String>")]
    pub production_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
}

/// Validated traceability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "TraceabilityDraft")]
pub struct Traceability {
    tracking_type: TrackingType,
    production_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
}

impl TraceabilityDraft {
    pub fn new(tracking_type: TrackingType) -> Self {
        TraceabilityDraft {
            tracking_type: Some(tracking_type),
            ..TraceabilityDraft::default()
        }
    }

    pub fn finalize(
        self,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<Traceability>, ValidationErrors> {
        let mut report = ctx.report();
        let traceability = self.finalize_into(ctx, &mut report);
        report.finish(traceability)
    }

    /// `None` when `tracking_type` is missing.
    pub(crate) fn finalize_into(
        self,
        ctx: &ValidationContext<'_>,
        report: &mut Report,
    ) -> Option<Traceability> {
        report.run(&self, RULES, ctx);
        Some(Traceability {
            tracking_type: self.tracking_type?,
            production_date: self.production_date,
            expiry_date: self.expiry_date,
        })
    }
}

impl Traceability {
    pub fn tracking_type(&self) -> TrackingType {
        self.tracking_type
    }

    pub fn production_date(&self) -> Option<NaiveDate> {
        self.production_date
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    pub fn is_expiry_tracked(&self) -> bool {
        self.tracking_type == TrackingType::ExpiryTracked
    }

    pub fn to_draft(&self) -> TraceabilityDraft {
        TraceabilityDraft::from(*self)
    }
}

impl From<Traceability> for TraceabilityDraft {
    fn from(t: Traceability) -> Self {
        TraceabilityDraft {
            tracking_type: Some(t.tracking_type),
            production_date: t.production_date,
            expiry_date: t.expiry_date,
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

const RULES: &[Rule<TraceabilityDraft>] = &[
    Rule { name: "tracking_type_present", check: tracking_type_present },
    Rule { name: "expiry_not_in_past", check: expiry_not_in_past },
    Rule { name: "production_not_in_future", check: production_not_in_future },
    Rule { name: "expiry_after_production", check: expiry_after_production },
    Rule { name: "expiry_tracked_dates", check: expiry_tracked_dates },
];

fn tracking_type_present(t: &TraceabilityDraft, _: &ValidationContext<'_>) -> RuleResult {
    match t.tracking_type {
        Some(_) => Ok(()),
        None => Err(Violation::missing("tracking_type", "tracking_type is required")),
    }
}

fn expiry_not_in_past(t: &TraceabilityDraft, ctx: &ValidationContext<'_>) -> RuleResult {
    let today = ctx.today();
    match t.expiry_date {
        Some(expiry) if expiry < today => Err(Violation::new(
            ViolationKind::DateOutOfRange,
            &["expiry_date"],
            format!("expiry_date {} is in the past (today is {})", expiry, today),
        )),
        _ => Ok(()),
    }
}

fn production_not_in_future(t: &TraceabilityDraft, ctx: &ValidationContext<'_>) -> RuleResult {
    let today = ctx.today();
    match t.production_date {
        Some(production) if production > today => Err(Violation::new(
            ViolationKind::DateOutOfRange,
            &["production_date"],
            format!("production_date {} is in the future (today is {})", production, today),
        )),
        _ => Ok(()),
    }
}

fn expiry_after_production(t: &TraceabilityDraft, _: &ValidationContext<'_>) -> RuleResult {
    match (t.production_date, t.expiry_date) {
        (Some(production), Some(expiry)) if expiry <= production => Err(Violation::new(
            ViolationKind::DateOrderViolation,
            &["production_date", "expiry_date"],
            format!(
                "expiry_date {} must be later than production_date {}",
                expiry, production
            ),
        )),
        _ => Ok(()),
    }
}

fn expiry_tracked_dates(t: &TraceabilityDraft, _: &ValidationContext<'_>) -> RuleResult {
    if t.tracking_type != Some(TrackingType::ExpiryTracked) {
        return Ok(());
    }

    let mut missing = Vec::new();
    if t.production_date.is_none() {
        missing.push("production_date");
    }
    if t.expiry_date.is_none() {
        missing.push("expiry_date");
    }

    if missing.is_empty() {
        return Ok(());
    }
    Err(Violation::new(
        ViolationKind::MissingRequiredField,
        &missing,
        format!("{} required for expiry tracked products", missing.join(" and ")),
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================
