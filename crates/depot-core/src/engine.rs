//! # Validation Engine
//!
//! Orders checks, aggregates failures, and decides when a value may leave
//! the core.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Draft (raw fields)                                                   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   finalize: derive fields (volume, timestamps, ids)                    │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   Report::run(rules)  ── Rule 1 ─► Rule 2 ─► ... ─► Rule N             │
//! │      │                    │ FailFast: stop after first violation       │
//! │      │                    │ CollectAll: keep going                     │
//! │      ▼                                                                  │
//! │   Report::advise(advisors)   (never blocks)                            │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   Report::finish ──► Ok(Validated<T>) | Err(ValidationErrors)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Components declare their rules as `const` slices. The slice order is the
//! evaluation order, which keeps fail-fast messages reproducible.

use std::ops::Deref;

use tracing::trace;

use crate::config::ValidationMode;
use crate::context::ValidationContext;
use crate::error::{Advisory, ValidationErrors, Violation};

/// Result of one rule.
pub type RuleResult = Result<(), Violation>;

// =============================================================================
// Rules and Advisors
// =============================================================================

/// A named blocking check over `T`.
pub struct Rule<T> {
    pub name: &'static str,
    pub check: fn(&T, &ValidationContext<'_>) -> RuleResult,
}

/// A named non-blocking check over `T`.
pub struct Advisor<T> {
    pub name: &'static str,
    pub check: fn(&T, &ValidationContext<'_>) -> Option<Advisory>,
}

/// Names of the rules in a registry, in evaluation order.
pub fn rule_names<T>(rules: &[Rule<T>]) -> Vec<&'static str> {
    rules.iter().map(|r| r.name).collect()
}

// =============================================================================
// Report
// =============================================================================

/// Accumulates the outcome of one validation run.
#[derive(Debug)]
pub struct Report {
    mode: ValidationMode,
    violations: Vec<Violation>,
    advisories: Vec<Advisory>,
}

impl Report {
    pub fn new(mode: ValidationMode) -> Self {
        Report {
            mode,
            violations: Vec::new(),
            advisories: Vec::new(),
        }
    }

    /// True once fail-fast mode has seen a violation.
    pub fn is_halted(&self) -> bool {
        self.mode == ValidationMode::FailFast && !self.violations.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Records a violation unless the report is halted.
    pub fn push(&mut self, violation: Violation) {
        if self.is_halted() {
            return;
        }
        trace!(rule = %violation.rule, kind = %violation.kind, "Rule violated");
        self.violations.push(violation);
    }

    /// Records the outcome of an ad-hoc check under `rule`.
    pub fn check(&mut self, rule: &str, result: RuleResult) {
        if let Err(violation) = result {
            self.push(violation.with_rule(rule));
        }
    }

    /// Runs a rule registry in order.
    pub fn run<T>(&mut self, subject: &T, rules: &[Rule<T>], ctx: &ValidationContext<'_>) {
        for rule in rules {
            if self.is_halted() {
                return;
            }
            self.check(rule.name, (rule.check)(subject, ctx));
        }
    }

    /// Runs one step of a registry: rules in order until the first
    /// violation, in either mode.
    pub fn run_step<T>(&mut self, subject: &T, rules: &[Rule<T>], ctx: &ValidationContext<'_>) {
        for rule in rules {
            if self.is_halted() {
                return;
            }
            if let Err(violation) = (rule.check)(subject, ctx) {
                self.push(violation.with_rule(rule.name));
                return;
            }
        }
    }

    /// Runs a registry grouped into steps. Each step reports at most one
    /// violation; collect-all mode still visits every step.
    pub fn run_steps<T>(&mut self, subject: &T, steps: &[&[Rule<T>]], ctx: &ValidationContext<'_>) {
        for step in steps {
            self.run_step(subject, step, ctx);
        }
    }

    /// Runs an advisor registry. Advisories are collected regardless of mode.
    pub fn advise<T>(&mut self, subject: &T, advisors: &[Advisor<T>], ctx: &ValidationContext<'_>) {
        for advisor in advisors {
            if let Some(advisory) = (advisor.check)(subject, ctx) {
                self.advisories.push(advisory.with_rule(advisor.name));
            }
        }
    }

    /// Releases `value` if no violation was recorded.
    ///
    /// `None` means the value could not even be assembled; a violation
    /// explaining why must already be in the report.
    pub fn finish<T>(self, value: Option<T>) -> Result<Validated<T>, ValidationErrors> {
        match value {
            Some(value) if self.violations.is_empty() => Ok(Validated {
                value,
                advisories: self.advisories,
            }),
            _ => Err(ValidationErrors::new(self.violations)),
        }
    }
}

// =============================================================================
// Validated
// =============================================================================

/// A value that passed every rule, with the advisories raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    value: T,
    advisories: Vec<Advisory>,
}

impl<T> Validated<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Vec<Advisory>) {
        (self.value, self.advisories)
    }
}

impl<T> Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::context::SystemClock;
    use crate::error::ViolationKind;

    #[derive(Debug)]
    struct Pair {
        a: i32,
        b: i32,
    }

    fn a_positive(p: &Pair, _: &ValidationContext<'_>) -> RuleResult {
        if p.a > 0 {
            Ok(())
        } else {
            Err(Violation::format("a", "a must be positive"))
        }
    }

    fn b_positive(p: &Pair, _: &ValidationContext<'_>) -> RuleResult {
        if p.b > 0 {
            Ok(())
        } else {
            Err(Violation::format("b", "b must be positive"))
        }
    }

    fn a_below_b(p: &Pair, _: &ValidationContext<'_>) -> RuleResult {
        if p.a < p.b {
            Ok(())
        } else {
            Err(Violation::new(ViolationKind::IncompatibleValues, &["a", "b"], "a must be below b"))
        }
    }

    fn hint_small(p: &Pair, _: &ValidationContext<'_>) -> Option<Advisory> {
        (p.b < 10).then(|| Advisory::new(&["b"], "b is small"))
    }

    const RULES: &[Rule<Pair>] = &[
        Rule { name: "a_positive", check: a_positive },
        Rule { name: "b_positive", check: b_positive },
        Rule { name: "a_below_b", check: a_below_b },
    ];

    const ADVISORS: &[Advisor<Pair>] = &[Advisor { name: "b_small", check: hint_small }];

    fn run(mode: ValidationMode, pair: Pair) -> Result<Validated<Pair>, ValidationErrors> {
        let config = ValidationConfig::default().with_mode(mode);
        let clock = SystemClock;
        let ctx = ValidationContext::new(&config, &clock);
        let mut report = ctx.report();
        report.run(&pair, RULES, &ctx);
        report.advise(&pair, ADVISORS, &ctx);
        report.finish(Some(pair))
    }

    #[test]
    fn test_fail_fast_stops_at_first_violation() {
        let errors = run(ValidationMode::FailFast, Pair { a: -1, b: -5 }).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().rule, "a_positive");
    }

    #[test]
    fn test_collect_all_keeps_order() {
        let errors = run(ValidationMode::CollectAll, Pair { a: -1, b: -5 }).unwrap_err();
        let rules: Vec<_> = errors.violations().iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["a_positive", "b_positive", "a_below_b"]);
    }

    #[test]
    fn test_clean_run_carries_advisories() {
        let validated = run(ValidationMode::FailFast, Pair { a: 1, b: 5 }).unwrap();
        assert_eq!(validated.a, 1);
        assert_eq!(validated.advisories().len(), 1);
        assert_eq!(validated.advisories()[0].rule, "b_small");
    }

    #[test]
    fn test_finish_without_value_is_rejected() {
        let mut report = Report::new(ValidationMode::FailFast);
        report.push(Violation::missing("tracking_type", "tracking_type is required"));
        let result: Result<Validated<()>, _> = report.finish(None);
        assert!(result.unwrap_err().has_kind(ViolationKind::MissingRequiredField));
    }

    #[test]
    fn test_steps_report_one_violation_each() {
        const STEPS: &[&[Rule<Pair>]] = &[
            &[
                Rule { name: "a_positive", check: a_positive },
                Rule { name: "b_positive", check: b_positive },
            ],
            &[Rule { name: "a_below_b", check: a_below_b }],
        ];

        let config = ValidationConfig::default().with_mode(ValidationMode::CollectAll);
        let clock = SystemClock;
        let ctx = ValidationContext::new(&config, &clock);
        let mut report = ctx.report();
        report.run_steps(&Pair { a: -1, b: -5 }, STEPS, &ctx);

        let rules: Vec<_> = report.violations().iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["a_positive", "a_below_b"]);
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(rule_names(RULES), vec!["a_positive", "b_positive", "a_below_b"]);
    }
}
