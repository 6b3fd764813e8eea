//! # Field Validators
//!
//! Single-field checks shared by products and categories.
//!
//! ## Where These Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Enumeration membership                                            │
//! │  └── Type shape (numbers, dates, UUIDs)                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: field format and range                          │
//! │  ├── SKU pattern, name/description length                              │
//! │  └── Non-negative measures, positive day counts                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Component and entity rules                                   │
//! │  ├── Sub-component invariants (dates, flags, hazard/temperature)       │
//! │  └── Cross-component rules (units, size thresholds, roles)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use depot_core::validation::{validate_sku, validate_measure};
//!
//! assert!(validate_sku("PALLET01").is_ok());
//! assert!(validate_measure("weight_kg", Some(-1.0)).is_err());
//! ```

use crate::engine::RuleResult;
use crate::error::Violation;

// =============================================================================
// String Validators
// =============================================================================

/// Shortest accepted SKU.
pub const SKU_MIN_LEN: usize = 3;

/// Longest accepted SKU.
pub const SKU_MAX_LEN: usize = 20;

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - 3 to 20 characters
/// - Only uppercase ASCII letters and digits (`[A-Z0-9]{3,20}`)
/// - No surrounding whitespace is stripped: `" ABC"` is rejected
///
/// ## Example
/// ```rust
/// use depot_core::validation::validate_sku;
///
/// assert!(validate_sku("ABC123").is_ok());
/// assert!(validate_sku("abc123").is_err());
/// assert!(validate_sku("AB").is_err());
/// ```
pub fn validate_sku(sku: &str) -> RuleResult {
    let len = sku.len();
    let charset_ok = sku
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

    if !charset_ok || !(SKU_MIN_LEN..=SKU_MAX_LEN).contains(&len) {
        return Err(Violation::format(
            "sku",
            format!(
                "sku '{}' must be {}-{} uppercase letters or digits",
                sku, SKU_MIN_LEN, SKU_MAX_LEN
            ),
        ));
    }

    Ok(())
}

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `max_chars` characters after trimming
pub fn validate_name(name: &str, max_chars: usize) -> RuleResult {
    let name = name.trim();

    if name.is_empty() {
        return Err(Violation::missing("name", "name is required"));
    }

    let chars = name.chars().count();
    if chars > max_chars {
        return Err(Violation::format(
            "name",
            format!("name must be at most {} characters, got {}", max_chars, chars),
        ));
    }

    Ok(())
}

/// Validates an optional free-text description (at most `max_chars`).
pub fn validate_description(description: Option<&str>, max_chars: usize) -> RuleResult {
    validate_text_length("description", description, max_chars)
}

/// Validates an optional materialized category path (at most `max_chars`).
pub fn validate_path(path: Option<&str>, max_chars: usize) -> RuleResult {
    validate_text_length("path", path, max_chars)
}

fn validate_text_length(field: &str, value: Option<&str>, max_chars: usize) -> RuleResult {
    let Some(value) = value else {
        return Ok(());
    };

    let chars = value.chars().count();
    if chars > max_chars {
        return Err(Violation::format(
            field,
            format!("{} must be at most {} characters, got {}", field, max_chars, chars),
        ));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an optional physical measure or stock quantity.
///
/// ## Rules
/// - Absent is fine
/// - Must be finite (no NaN, no infinity)
/// - Must be non-negative (>= 0); zero is allowed
///
/// ## Example
/// ```rust
/// use depot_core::validation::validate_measure;
///
/// assert!(validate_measure("width_cm", None).is_ok());
/// assert!(validate_measure("width_cm", Some(0.0)).is_ok());
/// assert!(validate_measure("width_cm", Some(f64::NAN)).is_err());
/// ```
pub fn validate_measure(field: &str, value: Option<f64>) -> RuleResult {
    match value {
        Some(v) if !v.is_finite() => Err(Violation::format(
            field,
            format!("{} must be a finite number", field),
        )),
        Some(v) if v < 0.0 => Err(Violation::format(
            field,
            format!("{} must be greater than or equal to 0, got {}", field, v),
        )),
        _ => Ok(()),
    }
}

/// Validates an optional day count (shelf life, intervals). Zero is rejected.
pub fn validate_positive_days(field: &str, days: Option<u32>) -> RuleResult {
    match days {
        Some(0) => Err(Violation::format(
            field,
            format!("{} must be greater than 0", field),
        )),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViolationKind;
    use proptest::prelude::*;

    #[test]
    fn test_validate_sku() {
        // Valid SKUs
        assert!(validate_sku("ABC").is_ok());
        assert!(validate_sku("ABC123").is_ok());
        assert!(validate_sku(&"9".repeat(20)).is_ok());

        // Invalid SKUs
        assert!(validate_sku("").is_err());
        assert!(validate_sku("AB").is_err());
        assert!(validate_sku(&"A".repeat(21)).is_err());
        assert!(validate_sku("abc123").is_err());
        assert!(validate_sku("COKE-330").is_err());
        assert!(validate_sku(" ABC").is_err());
        assert!(validate_sku("ÄBC").is_err());
    }

    #[test]
    fn test_validate_sku_violation_shape() {
        let v = validate_sku("bad").unwrap_err();
        assert_eq!(v.kind, ViolationKind::FieldFormat);
        assert_eq!(v.fields, vec!["sku".to_string()]);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Steel bolts M8", 50).is_ok());
        assert!(validate_name("  padded  ", 6).is_ok());
        assert!(validate_name(&"é".repeat(50), 50).is_ok());

        let empty = validate_name("   ", 50).unwrap_err();
        assert_eq!(empty.kind, ViolationKind::MissingRequiredField);

        let long = validate_name(&"A".repeat(51), 50).unwrap_err();
        assert_eq!(long.kind, ViolationKind::FieldFormat);
    }

    #[test]
    fn test_validate_description_and_path() {
        assert!(validate_description(None, 300).is_ok());
        assert!(validate_description(Some(""), 300).is_ok());
        assert!(validate_description(Some(&"x".repeat(300)), 300).is_ok());
        assert!(validate_description(Some(&"x".repeat(301)), 300).is_err());

        let v = validate_path(Some(&"/a".repeat(300)), 500).unwrap_err();
        assert!(v.concerns("path"));
    }

    #[test]
    fn test_validate_measure() {
        assert!(validate_measure("weight_kg", Some(49.9)).is_ok());
        assert!(validate_measure("weight_kg", Some(-0.1)).is_err());
        assert!(validate_measure("weight_kg", Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_validate_positive_days() {
        assert!(validate_positive_days("default_shelf_life_days", None).is_ok());
        assert!(validate_positive_days("default_shelf_life_days", Some(1)).is_ok());
        assert!(validate_positive_days("default_shelf_life_days", Some(0)).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn prop_sku_pattern_accepted(sku in "[A-Z0-9]{3,20}") {
            prop_assert!(validate_sku(&sku).is_ok());
        }

        #[test]
        fn prop_sku_with_lowercase_rejected(prefix in "[A-Z0-9]{0,10}", bad in "[a-z]", suffix in "[A-Z0-9]{2,9}") {
            let sku = format!("{}{}{}", prefix, bad, suffix);
            prop_assert!(validate_sku(&sku).is_err());
        }
    }
}
