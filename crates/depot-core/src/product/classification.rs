//! Size, turnover and ABC classification.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::context::ValidationContext;
use crate::engine::{Report, Rule, RuleResult, Validated};
use crate::enums::{AbcCategory, MovingType, SizeType};
use crate::error::{ValidationErrors, Violation, ViolationKind};
use crate::tables::{ABC_A_MOVING_TYPES, FAST_MOVING_FORBIDDEN_SIZES};

/// Raw classification input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ClassificationDraft {
    pub size_type: Option<SizeType>,
    pub moving_type: Option<MovingType>,
    pub abc_category: Option<AbcCategory>,
}

/// Validated classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "ClassificationDraft")]
pub struct Classification {
    size_type: Option<SizeType>,
    moving_type: Option<MovingType>,
    abc_category: Option<AbcCategory>,
}

impl ClassificationDraft {
    pub fn finalize(
        self,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<Classification>, ValidationErrors> {
        let mut report = ctx.report();
        let classification = self.finalize_into(ctx, &mut report);
        report.finish(Some(classification))
    }

    pub(crate) fn finalize_into(
        self,
        ctx: &ValidationContext<'_>,
        report: &mut Report,
    ) -> Classification {
        let classification = Classification {
            size_type: self.size_type,
            moving_type: self.moving_type,
            abc_category: self.abc_category,
        };
        report.run(&classification, RULES, ctx);
        classification
    }
}

impl Classification {
    pub fn size_type(&self) -> Option<SizeType> {
        self.size_type
    }

    pub fn moving_type(&self) -> Option<MovingType> {
        self.moving_type
    }

    pub fn abc_category(&self) -> Option<AbcCategory> {
        self.abc_category
    }

    pub fn to_draft(&self) -> ClassificationDraft {
        ClassificationDraft::from(*self)
    }
}

impl From<Classification> for ClassificationDraft {
    fn from(c: Classification) -> Self {
        ClassificationDraft {
            size_type: c.size_type,
            moving_type: c.moving_type,
            abc_category: c.abc_category,
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

const RULES: &[Rule<Classification>] = &[
    Rule { name: "size_not_fast_moving", check: size_not_fast_moving },
    Rule { name: "abc_a_moving_type", check: abc_a_moving_type },
];

fn size_not_fast_moving(c: &Classification, _: &ValidationContext<'_>) -> RuleResult {
    match (c.size_type, c.moving_type) {
        (Some(size), Some(MovingType::FastMoving)) if FAST_MOVING_FORBIDDEN_SIZES.contains(&size) => {
            Err(Violation::new(
                ViolationKind::IncompatibleValues,
                &["size_type", "moving_type"],
                format!("{} products cannot be fast moving", size),
            ))
        }
        _ => Ok(()),
    }
}

fn abc_a_moving_type(c: &Classification, _: &ValidationContext<'_>) -> RuleResult {
    if c.abc_category != Some(AbcCategory::A) {
        return Ok(());
    }
    match c.moving_type {
        Some(moving) if ABC_A_MOVING_TYPES.contains(&moving) => Ok(()),
        Some(moving) => Err(Violation::new(
            ViolationKind::IncompatibleValues,
            &["abc_category", "moving_type"],
            format!("ABC category A requires fast or normal moving, got {}", moving),
        )),
        None => Err(Violation::missing(
            "moving_type",
            "moving_type is required for ABC category A",
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
