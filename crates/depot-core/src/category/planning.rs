//! Inventory planning parameters of a category.
//!
//! ```text
//!  0 ──── safety_stock ──── reorder_point ──── min ──────── max ────►
//!                           (advisory if below safety_stock)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::context::ValidationContext;
use crate::engine::{Advisor, Report, Rule, RuleResult, Validated};
use crate::enums::{CycleCountFrequency, OrderFrequency};
use crate::error::{Advisory, ValidationErrors, Violation, ViolationKind};
use crate::validation::{validate_measure, validate_positive_days};

/// Stock thresholds and counting/ordering cadence. Stock levels are totals
/// across all products of the category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CtgPlanning {
    pub min_stock_level: Option<f64>,
    pub max_stock_level: Option<f64>,
    pub reorder_point: Option<f64>,
    pub safety_stock: Option<f64>,
    pub order_frequency: Option<OrderFrequency>,
    /// Required when `order_frequency` is custom.
    pub custom_order_interval_days: Option<u32>,
    pub cycle_count_frequency: Option<CycleCountFrequency>,
    /// Required when `cycle_count_frequency` is custom.
    pub custom_count_interval_days: Option<u32>,
}

impl CtgPlanning {
    pub fn validate(self, ctx: &ValidationContext<'_>) -> Result<Validated<CtgPlanning>, ValidationErrors> {
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

const RULES: &[Rule<CtgPlanning>] = &[
    Rule { name: "stock_levels_non_negative", check: stock_levels_non_negative },
    Rule { name: "intervals_positive", check: intervals_positive },
    Rule { name: "min_not_above_max", check: min_not_above_max },
    Rule { name: "custom_order_interval", check: custom_order_interval },
    Rule { name: "custom_count_interval", check: custom_count_interval },
];

const ADVISORS: &[Advisor<CtgPlanning>] = &[Advisor {
    name: "reorder_point_above_safety_stock",
    check: reorder_point_above_safety_stock,
}];

fn stock_levels_non_negative(p: &CtgPlanning, _: &ValidationContext<'_>) -> RuleResult {
    validate_measure("min_stock_level", p.min_stock_level)?;
    validate_measure("max_stock_level", p.max_stock_level)?;
    validate_measure("reorder_point", p.reorder_point)?;
    validate_measure("safety_stock", p.safety_stock)
}

fn intervals_positive(p: &CtgPlanning, _: &ValidationContext<'_>) -> RuleResult {
    validate_positive_days("custom_order_interval_days", p.custom_order_interval_days)?;
    validate_positive_days("custom_count_interval_days", p.custom_count_interval_days)
}

fn min_not_above_max(p: &CtgPlanning, _: &ValidationContext<'_>) -> RuleResult {
    match (p.min_stock_level, p.max_stock_level) {
        (Some(min), Some(max)) if min > max => Err(Violation::new(
            ViolationKind::IncompatibleValues,
            &["min_stock_level", "max_stock_level"],
            format!("min_stock_level {} cannot be greater than max_stock_level {}", min, max),
        )),
        _ => Ok(()),
    }
}

fn custom_order_interval(p: &CtgPlanning, _: &ValidationContext<'_>) -> RuleResult {
    if p.order_frequency == Some(OrderFrequency::Custom) && p.custom_order_interval_days.is_none() {
        return Err(Violation::missing(
            "custom_order_interval_days",
            "custom_order_interval_days is required when order_frequency is custom",
        ));
    }
    Ok(())
}

fn custom_count_interval(p: &CtgPlanning, _: &ValidationContext<'_>) -> RuleResult {
    if p.cycle_count_frequency == Some(CycleCountFrequency::Custom)
        && p.custom_count_interval_days.is_none()
    {
        return Err(Violation::missing(
            "custom_count_interval_days",
            "custom_count_interval_days is required when cycle_count_frequency is custom",
        ));
    }
    Ok(())
}

fn reorder_point_above_safety_stock(p: &CtgPlanning, _: &ValidationContext<'_>) -> Option<Advisory> {
    match (p.reorder_point, p.safety_stock) {
        (Some(reorder), Some(safety)) if reorder < safety => Some(Advisory::new(
            &["reorder_point", "safety_stock"],
            "reorder_point is less than safety_stock; this may lead to frequent stockouts",
        )),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
