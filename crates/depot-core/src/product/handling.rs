//! Handling flags.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::context::ValidationContext;
use crate::engine::{Report, Rule, RuleResult, Validated};
use crate::error::{ValidationErrors, Violation, ViolationKind};

/// Raw handling input. Every flag defaults to `false` except
/// `is_stackable`, which defaults to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct HandlingDraft {
    pub is_fragile: bool,
    pub is_stackable: bool,
    pub is_odor_sensitive: bool,
    pub requires_ventilation: bool,
    /// Must be set for returned goods.
    pub requires_quarantine: bool,
    pub is_magnetic: bool,
    pub is_static_sensitive: bool,
    pub irregular_shape: bool,
}

impl Default for HandlingDraft {
    fn default() -> Self {
        HandlingDraft {
            is_fragile: false,
            is_stackable: true,
            is_odor_sensitive: false,
            requires_ventilation: false,
            requires_quarantine: false,
            is_magnetic: false,
            is_static_sensitive: false,
            irregular_shape: false,
        }
    }
}

/// Validated handling flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "HandlingDraft")]
pub struct HandlingAttributes {
    flags: HandlingDraft,
}

impl Default for HandlingAttributes {
    fn default() -> Self {
        HandlingAttributes {
            flags: HandlingDraft::default(),
        }
    }
}

impl HandlingDraft {
    pub fn finalize(
        self,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<HandlingAttributes>, ValidationErrors> {
        let mut report = ctx.report();
        let handling = self.finalize_into(ctx, &mut report);
        report.finish(Some(handling))
    }

    pub(crate) fn finalize_into(
        self,
        ctx: &ValidationContext<'_>,
        report: &mut Report,
    ) -> HandlingAttributes {
        let handling = HandlingAttributes { flags: self };
        report.run(&handling, RULES, ctx);
        handling
    }
}

impl HandlingAttributes {
    pub fn is_fragile(&self) -> bool {
        self.flags.is_fragile
    }

    pub fn is_stackable(&self) -> bool {
        self.flags.is_stackable
    }

    pub fn is_odor_sensitive(&self) -> bool {
        self.flags.is_odor_sensitive
    }

    pub fn requires_ventilation(&self) -> bool {
        self.flags.requires_ventilation
    }

    pub fn requires_quarantine(&self) -> bool {
        self.flags.requires_quarantine
    }

    pub fn is_magnetic(&self) -> bool {
        self.flags.is_magnetic
    }

    pub fn is_static_sensitive(&self) -> bool {
        self.flags.is_static_sensitive
    }

    pub fn irregular_shape(&self) -> bool {
        self.flags.irregular_shape
    }

    pub fn to_draft(&self) -> HandlingDraft {
        self.flags
    }
}

impl From<HandlingAttributes> for HandlingDraft {
    fn from(h: HandlingAttributes) -> Self {
        h.flags
    }
}

// =============================================================================
// Rules
// =============================================================================

const RULES: &[Rule<HandlingAttributes>] = &[Rule {
    name: "fragile_not_stackable",
    check: fragile_not_stackable,
}];

fn fragile_not_stackable(h: &HandlingAttributes, _: &ValidationContext<'_>) -> RuleResult {
    if h.is_fragile() && h.is_stackable() {
        return Err(Violation::new(
            ViolationKind::FlagConflict,
            &["is_fragile", "is_stackable"],
            "fragile products cannot be stackable",
        ));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::context::SystemClock;
    use proptest::prelude::*;

    fn finalize(draft: HandlingDraft) -> Result<Validated<HandlingAttributes>, ValidationErrors> {
        let config = ValidationConfig::default();
        let clock = SystemClock;
        draft.finalize(&ValidationContext::new(&config, &clock))
    }

    #[test]
    fn test_defaults_are_stackable() {
        let handling = finalize(HandlingDraft::default()).unwrap();
        assert!(handling.is_stackable());
        assert!(!handling.is_fragile());
    }

    #[test]
    fn test_missing_flags_deserialize_to_defaults() {
        let draft: HandlingDraft = serde_json::from_str(r#"{"is_magnetic": true}"#).unwrap();
        assert!(draft.is_magnetic);
        assert!(draft.is_stackable);
    }

    #[test]
    fn test_fragile_stackable_conflict() {
        let draft = HandlingDraft {
            is_fragile: true,
            ..HandlingDraft::default()
        };
        let errors = finalize(draft).unwrap_err();
        let v = errors.first().unwrap();
        assert_eq!(v.kind, ViolationKind::FlagConflict);
        assert_eq!(v.fields, vec!["is_fragile".to_string(), "is_stackable".to_string()]);
    }

    #[test]
    fn test_fragile_without_stacking_accepted() {
        let draft = HandlingDraft {
            is_fragile: true,
            is_stackable: false,
            ..HandlingDraft::default()
        };
        assert!(finalize(draft).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn prop_fragile_implies_not_stackable(
            fragile in any::<bool>(),
            stackable in any::<bool>(),
            magnetic in any::<bool>(),
            ventilated in any::<bool>(),
        ) {
            let draft = HandlingDraft {
                is_fragile: fragile,
                is_stackable: stackable,
                is_magnetic: magnetic,
                requires_ventilation: ventilated,
                ..HandlingDraft::default()
            };
            prop_assert_eq!(finalize(draft).is_err(), fragile && stackable);
        }
    }
}
