//! # Error Types
//!
//! Domain-specific error types for depot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Blocking (returned as Err)                                            │
//! │  ├── ValidationErrors  - ordered list of rule violations               │
//! │  │   └── Violation     - kind + rule + offending fields + message      │
//! │  ├── UnknownCode       - FromStr on a domain enumeration failed        │
//! │  └── ConfigError       - settings file / environment problems          │
//! │                                                                         │
//! │  Non-blocking (returned alongside Ok)                                  │
//! │  └── Advisory          - recommendation, never rejects an entity       │
//! │                                                                         │
//! │  Flow: Rule ──► Violation ──► Report ──► ValidationErrors ──► caller   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every violation names the fields it is about
//! 3. Violations are data: serialisable, comparable, never panics
//! 4. Advisories travel on a separate channel from violations

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Violation Kind
// =============================================================================

/// Classification of a failed rule.
///
/// Callers switch on the kind to decide how to present a failure (highlight a
/// field, show a date picker, etc.) without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Pattern or range failure (malformed SKU, negative weight, empty name).
    FieldFormat,
    /// A conditionally required field is absent.
    MissingRequiredField,
    /// A field is set where it does not apply.
    ForbiddenFieldPresent,
    /// Two dates are in the wrong order.
    DateOrderViolation,
    /// A date lies in the past/future when it must not.
    DateOutOfRange,
    /// Unit of measure incompatible with tracking type or physical state.
    UnitMismatch,
    /// Size-type minimum or maximum breached.
    DimensionThresholdViolation,
    /// Two boolean attributes contradict each other.
    FlagConflict,
    /// Two enumeration values of one component cannot be combined.
    IncompatibleValues,
    /// Rule spanning several components (role, handling, storage, tracking).
    CrossComponentRuleViolation,
    /// Referenced entity does not exist or is deleted.
    UnknownReference,
    /// Category tree inconsistency (cycle, depth, level).
    HierarchyViolation,
    /// Value must be unique but is already taken.
    DuplicateValue,
}

impl ViolationKind {
    /// Stable snake_case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            ViolationKind::FieldFormat => "field_format",
            ViolationKind::MissingRequiredField => "missing_required_field",
            ViolationKind::ForbiddenFieldPresent => "forbidden_field_present",
            ViolationKind::DateOrderViolation => "date_order_violation",
            ViolationKind::DateOutOfRange => "date_out_of_range",
            ViolationKind::UnitMismatch => "unit_mismatch",
            ViolationKind::DimensionThresholdViolation => "dimension_threshold_violation",
            ViolationKind::FlagConflict => "flag_conflict",
            ViolationKind::IncompatibleValues => "incompatible_values",
            ViolationKind::CrossComponentRuleViolation => "cross_component_rule_violation",
            ViolationKind::UnknownReference => "unknown_reference",
            ViolationKind::HierarchyViolation => "hierarchy_violation",
            ViolationKind::DuplicateValue => "duplicate_value",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Violation
// =============================================================================

/// A single failed rule.
///
/// `rule` is filled in by the engine with the name of the rule that produced
/// the violation; field-level checks set it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[error("{message}")]
pub struct Violation {
    pub kind: ViolationKind,
    pub rule: String,
    pub fields: Vec<String>,
    pub message: String,
}

impl Violation {
    /// Creates a violation about the given fields.
    pub fn new(kind: ViolationKind, fields: &[&str], message: impl Into<String>) -> Self {
        Violation {
            kind,
            rule: String::new(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            message: message.into(),
        }
    }

    /// Shorthand for a single-field [`ViolationKind::FieldFormat`].
    pub fn format(field: &str, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::FieldFormat, &[field], message)
    }

    /// Shorthand for a single-field [`ViolationKind::MissingRequiredField`].
    pub fn missing(field: &str, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::MissingRequiredField, &[field], message)
    }

    /// Shorthand for a single-field [`ViolationKind::ForbiddenFieldPresent`].
    pub fn forbidden(field: &str, message: impl Into<String>) -> Self {
        Self::new(ViolationKind::ForbiddenFieldPresent, &[field], message)
    }

    /// Sets the rule name unless one is already present.
    pub fn with_rule(mut self, rule: &str) -> Self {
        if self.rule.is_empty() {
            self.rule = rule.to_string();
        }
        self
    }

    /// Returns true if this violation mentions `field`.
    pub fn concerns(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// The ordered list of violations that caused a rejection.
///
/// Never empty when produced by the engine. Order follows rule evaluation
/// order, so the first entry is what fail-fast mode would have reported.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
#[error("validation failed: {}", summarize(.0))]
pub struct ValidationErrors(Vec<Violation>);

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("[{}] {}", v.kind, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new(violations: Vec<Violation>) -> Self {
        ValidationErrors(violations)
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First violation in evaluation order.
    pub fn first(&self) -> Option<&Violation> {
        self.0.first()
    }

    /// Returns true if any violation has the given kind.
    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.0.iter().any(|v| v.kind == kind)
    }

    /// Returns true if the named rule failed.
    pub fn has_rule(&self, rule: &str) -> bool {
        self.0.iter().any(|v| v.rule == rule)
    }

    /// Returns true if any violation mentions `field`.
    pub fn concerns(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.concerns(field))
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

impl IntoIterator for ValidationErrors {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Advisory
// =============================================================================

/// A non-fatal recommendation produced while validating.
///
/// ## Example
/// ```text
/// storage_condition = electronics, temperature_regime = None
///      │
///      ▼
/// Advisory { rule: "temperature_regime_recommended", ... }
///      │
///      ▼
/// Entity is still accepted; UI may show a hint
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Advisory {
    pub rule: String,
    pub fields: Vec<String>,
    pub message: String,
}

impl Advisory {
    pub fn new(fields: &[&str], message: impl Into<String>) -> Self {
        Advisory {
            rule: String::new(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            message: message.into(),
        }
    }

    pub fn with_rule(mut self, rule: &str) -> Self {
        if self.rule.is_empty() {
            self.rule = rule.to_string();
        }
        self
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recommendation: {}", self.message)
    }
}

// =============================================================================
// Code Parsing Error
// =============================================================================

/// A string did not match any code of a domain enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} code '{value}'")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

// =============================================================================
// Config Error
// =============================================================================

/// Failures while loading or checking [`crate::config::ValidationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings parsed but are semantically invalid.
    #[error("Invalid validation configuration: {0}")]
    Invalid(String),
}

/// Convenience type alias for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_message() {
        let v = Violation::missing("hazard_class", "hazard_class is required for hazardous products");
        assert_eq!(v.to_string(), "hazard_class is required for hazardous products");
        assert_eq!(v.kind, ViolationKind::MissingRequiredField);
        assert!(v.concerns("hazard_class"));
        assert!(v.rule.is_empty());
    }

    #[test]
    fn test_with_rule_keeps_first_name() {
        let v = Violation::format("sku", "bad").with_rule("sku_format").with_rule("other");
        assert_eq!(v.rule, "sku_format");
    }

    #[test]
    fn test_validation_errors_display_lists_all() {
        let errors = ValidationErrors::new(vec![
            Violation::format("sku", "sku must match [A-Z0-9]{3,20}"),
            Violation::new(
                ViolationKind::FlagConflict,
                &["is_fragile", "is_stackable"],
                "fragile products cannot be stackable",
            ),
        ]);
        assert_eq!(
            errors.to_string(),
            "validation failed: [field_format] sku must match [A-Z0-9]{3,20}; \
             [flag_conflict] fragile products cannot be stackable"
        );
        assert!(errors.has_kind(ViolationKind::FlagConflict));
        assert!(errors.concerns("is_stackable"));
        assert!(!errors.has_kind(ViolationKind::UnitMismatch));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ViolationKind::CrossComponentRuleViolation).unwrap();
        assert_eq!(json, "\"cross_component_rule_violation\"");
        assert_eq!(
            ViolationKind::DimensionThresholdViolation.to_string(),
            "dimension_threshold_violation"
        );
    }

    #[test]
    fn test_unknown_code_message() {
        let err = UnknownCode {
            kind: "unit of measure",
            value: "furlong".to_string(),
        };
        assert_eq!(err.to_string(), "unknown unit of measure code 'furlong'");
    }
}
