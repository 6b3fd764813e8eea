//! Physical dimensions and the derived volume.
//!
//! ```text
//! width_cm × height_cm × depth_cm / 1_000_000 ──► volume_m3
//!
//! 120 × 75 × 60 cm  ──►  0.54 m³
//! ```
//!
//! Volume is derived once while finalizing and only when it was not given.
//! A product that is negative or too large to represent leaves the volume
//! unset.
//! An explicit volume always wins, even when it disagrees with the product
//! of the three linear dimensions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::context::ValidationContext;
use crate::engine::{Report, Rule, RuleResult, Validated};
use crate::error::ValidationErrors;
use crate::validation::validate_measure;

/// Cubic centimetres per cubic metre.
pub const CM3_PER_M3: f64 = 1_000_000.0;

/// Raw dimension input. Every measure is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct DimensionsDraft {
    pub weight_kg: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
    pub volume_m3: Option<f64>,
}

/// Validated dimensions. `volume_m3` is already derived where possible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(into = "DimensionsDraft")]
pub struct Dimensions {
    weight_kg: Option<f64>,
    width_cm: Option<f64>,
    height_cm: Option<f64>,
    depth_cm: Option<f64>,
    volume_m3: Option<f64>,
}

impl DimensionsDraft {
    /// Volume implied by the three linear dimensions, if all are present
    /// and their product is a valid measure.
    pub fn derived_volume(&self) -> Option<f64> {
        match (self.width_cm, self.height_cm, self.depth_cm) {
            (Some(w), Some(h), Some(d)) => Some(w * h * d / CM3_PER_M3)
                .filter(|v| v.is_finite() && *v >= 0.0),
            _ => None,
        }
    }

    /// Validates the measures and derives the volume.
    pub fn finalize(self, ctx: &ValidationContext<'_>) -> Result<Validated<Dimensions>, ValidationErrors> {
        let mut report = ctx.report();
        let dims = self.finalize_into(ctx, &mut report);
        report.finish(Some(dims))
    }

    pub(crate) fn finalize_into(self, ctx: &ValidationContext<'_>, report: &mut Report) -> Dimensions {
        let dims = self.into_dimensions();
        report.run(&dims, RULES, ctx);
        dims
    }

    /// Derivation step only; no rule is checked.
    pub(crate) fn into_dimensions(self) -> Dimensions {
        Dimensions {
            weight_kg: self.weight_kg,
            width_cm: self.width_cm,
            height_cm: self.height_cm,
            depth_cm: self.depth_cm,
            volume_m3: self.volume_m3.or_else(|| self.derived_volume()),
        }
    }
}

impl Dimensions {
    pub fn weight_kg(&self) -> Option<f64> {
        self.weight_kg
    }

    pub fn width_cm(&self) -> Option<f64> {
        self.width_cm
    }

    pub fn height_cm(&self) -> Option<f64> {
        self.height_cm
    }

    pub fn depth_cm(&self) -> Option<f64> {
        self.depth_cm
    }

    pub fn volume_m3(&self) -> Option<f64> {
        self.volume_m3
    }

    /// Width, height and depth in that order.
    pub fn linear(&self) -> [Option<f64>; 3] {
        [self.width_cm, self.height_cm, self.depth_cm]
    }

    pub fn to_draft(&self) -> DimensionsDraft {
        DimensionsDraft::from(*self)
    }
}

impl From<Dimensions> for DimensionsDraft {
    fn from(d: Dimensions) -> Self {
        DimensionsDraft {
            weight_kg: d.weight_kg,
            width_cm: d.width_cm,
            height_cm: d.height_cm,
            depth_cm: d.depth_cm,
            volume_m3: d.volume_m3,
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

const RULES: &[Rule<Dimensions>] = &[
    Rule { name: "weight_non_negative", check: weight_non_negative },
    Rule { name: "width_non_negative", check: width_non_negative },
    Rule { name: "height_non_negative", check: height_non_negative },
    Rule { name: "depth_non_negative", check: depth_non_negative },
    Rule { name: "volume_non_negative", check: volume_non_negative },
];

fn weight_non_negative(d: &Dimensions, _: &ValidationContext<'_>) -> RuleResult {
    validate_measure("weight_kg", d.weight_kg)
}

fn width_non_negative(d: &Dimensions, _: &ValidationContext<'_>) -> RuleResult {
    validate_measure("width_cm", d.width_cm)
}

fn height_non_negative(d: &Dimensions, _: &ValidationContext<'_>) -> RuleResult {
    validate_measure("height_cm", d.height_cm)
}

fn depth_non_negative(d: &Dimensions, _: &ValidationContext<'_>) -> RuleResult {
    validate_measure("depth_cm", d.depth_cm)
}

fn volume_non_negative(d: &Dimensions, _: &ValidationContext<'_>) -> RuleResult {
    validate_measure("volume_m3", d.volume_m3)
}

// =============================================================================
// Unit Tests
// =============================================================================
