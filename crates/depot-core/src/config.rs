//! # Validation Configuration
//!
//! Tunable constants of the rule engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DEPOT_VALIDATION_MODE=collect_all                                  │
//! │     DEPOT_HEAVY_MIN_KG=60                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     passed explicitly by the hosting application                       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     fail_fast, 50 kg / 10 kg / 200 cm / 30 cm                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! mode = "collect_all"
//!
//! [thresholds]
//! heavy_min_weight_kg = 50.0
//! light_max_weight_kg = 10.0
//! oversized_min_cm = 200.0
//! small_parts_max_cm = 30.0
//!
//! [storage]
//! temperature_required_for = ["perishable", "temperature_controlled", "medicine"]
//! expiry_tracking_required_for = ["perishable", "medicine"]
//! static_protection_required_for = ["electronics"]
//! temperature_recommended_for = ["electronics"]
//!
//! [limits]
//! name_max_chars = 50
//! description_max_chars = 300
//!
//! [hierarchy]
//! max_depth = 16
//! ```
//!
//! Loading happens once at startup; rules only ever read the parsed value.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::enums::StorageCondition;
use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Validation Mode
// =============================================================================

/// How many violations a single validation run reports.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  FAIL_FAST (Default)                │  COLLECT_ALL                      │
/// │  ───────────────────                │  ───────────                      │
/// │  • Stops at the first violated rule │  • Runs every rule                │
/// │  • Deterministic single message     │  • Lists every violation          │
/// │  • APIs, imports, batch jobs        │  • Form-style UIs                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    FailFast,
    CollectAll,
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationMode::FailFast => write!(f, "fail_fast"),
            ValidationMode::CollectAll => write!(f, "collect_all"),
        }
    }
}

impl std::str::FromStr for ValidationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail_fast" | "fail-fast" | "first" => Ok(ValidationMode::FailFast),
            "collect_all" | "collect-all" | "all" => Ok(ValidationMode::CollectAll),
            other => Err(ConfigError::Invalid(format!(
                "Unknown validation mode: '{}'. Valid options: fail_fast, collect_all",
                other
            ))),
        }
    }
}

// =============================================================================
// Size Thresholds
// =============================================================================

/// Limits used by the size-type dimension rules. All comparisons are
/// inclusive: a HEAVY product of exactly `heavy_min_weight_kg` passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeThresholds {
    #[serde(default = "default_heavy_min")]
    pub heavy_min_weight_kg: f64,

    #[serde(default = "default_light_max")]
    pub light_max_weight_kg: f64,

    #[serde(default = "default_oversized_min")]
    pub oversized_min_cm: f64,

    #[serde(default = "default_small_parts_max")]
    pub small_parts_max_cm: f64,
}

fn default_heavy_min() -> f64 {
    50.0
}

fn default_light_max() -> f64 {
    10.0
}

fn default_oversized_min() -> f64 {
    200.0
}

fn default_small_parts_max() -> f64 {
    30.0
}

impl Default for SizeThresholds {
    fn default() -> Self {
        SizeThresholds {
            heavy_min_weight_kg: default_heavy_min(),
            light_max_weight_kg: default_light_max(),
            oversized_min_cm: default_oversized_min(),
            small_parts_max_cm: default_small_parts_max(),
        }
    }
}

// =============================================================================
// Storage Rule Sets
// =============================================================================

/// Storage conditions that trigger conditional requirements.
///
/// Extending a list extends the corresponding rule for both products and
/// category defaults; no validator code changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRules {
    /// Conditions that need a temperature regime.
    #[serde(default = "default_temperature_required")]
    pub temperature_required_for: Vec<StorageCondition>,

    /// Conditions that need `expiry_tracked` tracking.
    #[serde(default = "default_expiry_tracking_required")]
    pub expiry_tracking_required_for: Vec<StorageCondition>,

    /// Conditions that need `handling.is_static_sensitive = true`.
    #[serde(default = "default_static_protection_required")]
    pub static_protection_required_for: Vec<StorageCondition>,

    /// Conditions where a missing temperature regime yields an advisory.
    #[serde(default = "default_temperature_recommended")]
    pub temperature_recommended_for: Vec<StorageCondition>,
}

fn default_temperature_required() -> Vec<StorageCondition> {
    vec![
        StorageCondition::Perishable,
        StorageCondition::TemperatureControlled,
        StorageCondition::Medicine,
    ]
}

fn default_expiry_tracking_required() -> Vec<StorageCondition> {
    vec![StorageCondition::Perishable, StorageCondition::Medicine]
}

fn default_static_protection_required() -> Vec<StorageCondition> {
    vec![StorageCondition::Electronics]
}

fn default_temperature_recommended() -> Vec<StorageCondition> {
    vec![StorageCondition::Electronics]
}

impl Default for StorageRules {
    fn default() -> Self {
        StorageRules {
            temperature_required_for: default_temperature_required(),
            expiry_tracking_required_for: default_expiry_tracking_required(),
            static_protection_required_for: default_static_protection_required(),
            temperature_recommended_for: default_temperature_recommended(),
        }
    }
}

impl StorageRules {
    pub fn requires_temperature(&self, condition: StorageCondition) -> bool {
        self.temperature_required_for.contains(&condition)
    }

    pub fn requires_expiry_tracking(&self, condition: StorageCondition) -> bool {
        self.expiry_tracking_required_for.contains(&condition)
    }

    pub fn requires_static_protection(&self, condition: StorageCondition) -> bool {
        self.static_protection_required_for.contains(&condition)
    }

    pub fn recommends_temperature(&self, condition: StorageCondition) -> bool {
        self.temperature_recommended_for.contains(&condition)
    }
}

// =============================================================================
// Field Limits
// =============================================================================

/// Text length limits, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLimits {
    #[serde(default = "default_name_max")]
    pub name_max_chars: usize,

    #[serde(default = "default_description_max")]
    pub description_max_chars: usize,

    #[serde(default = "default_path_max")]
    pub path_max_chars: usize,
}

fn default_name_max() -> usize {
    50
}

fn default_description_max() -> usize {
    300
}

fn default_path_max() -> usize {
    500
}

impl Default for FieldLimits {
    fn default() -> Self {
        FieldLimits {
            name_max_chars: default_name_max(),
            description_max_chars: default_description_max(),
            path_max_chars: default_path_max(),
        }
    }
}

// =============================================================================
// Hierarchy Settings
// =============================================================================

/// Category tree limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchySettings {
    /// Maximum number of ancestors walked while looking for cycles.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_max_depth() -> u32 {
    16
}

impl Default for HierarchySettings {
    fn default() -> Self {
        HierarchySettings {
            max_depth: default_max_depth(),
        }
    }
}

// =============================================================================
// Main Validation Configuration
// =============================================================================

/// Complete validation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub mode: ValidationMode,

    #[serde(default)]
    pub thresholds: SizeThresholds,

    #[serde(default)]
    pub storage: StorageRules,

    #[serde(default)]
    pub limits: FieldLimits,

    #[serde(default)]
    pub hierarchy: HierarchySettings,
}

impl ValidationConfig {
    /// Returns a copy using the given evaluation mode.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parses a TOML document. Missing sections fall back to defaults.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: ValidationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (if given and present)
    /// 3. Environment variables
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            if path.exists() {
                info!(?path, "Loading validation config from file");
                let contents = std::fs::read_to_string(path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<&Path>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load validation config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Checks semantic consistency of the values.
    pub fn validate(&self) -> ConfigResult<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("heavy_min_weight_kg", t.heavy_min_weight_kg),
            ("light_max_weight_kg", t.light_max_weight_kg),
            ("oversized_min_cm", t.oversized_min_cm),
            ("small_parts_max_cm", t.small_parts_max_cm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if t.light_max_weight_kg > t.heavy_min_weight_kg {
            return Err(ConfigError::Invalid(format!(
                "light_max_weight_kg ({}) cannot exceed heavy_min_weight_kg ({})",
                t.light_max_weight_kg, t.heavy_min_weight_kg
            )));
        }

        let l = &self.limits;
        if l.name_max_chars == 0 || l.description_max_chars == 0 || l.path_max_chars == 0 {
            return Err(ConfigError::Invalid(
                "text limits must be greater than 0".into(),
            ));
        }

        if self.hierarchy.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "hierarchy.max_depth must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("DEPOT_VALIDATION_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding validation mode from environment");
                    self.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown validation mode in environment"),
            }
        }

        let thresholds = [
            ("DEPOT_HEAVY_MIN_KG", &mut self.thresholds.heavy_min_weight_kg),
            ("DEPOT_LIGHT_MAX_KG", &mut self.thresholds.light_max_weight_kg),
            ("DEPOT_OVERSIZED_MIN_CM", &mut self.thresholds.oversized_min_cm),
            ("DEPOT_SMALL_PARTS_MAX_CM", &mut self.thresholds.small_parts_max_cm),
        ];
        for (key, slot) in thresholds {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<f64>() {
                    Ok(value) => {
                        debug!(key, value, "Overriding threshold from environment");
                        *slot = value;
                    }
                    Err(_) => warn!(key, value = %raw, "Ignoring unparseable threshold"),
                }
            }
        }

        if let Some(raw) = lookup("DEPOT_HIERARCHY_MAX_DEPTH") {
            match raw.trim().parse::<u32>() {
                Ok(depth) => self.hierarchy.max_depth = depth,
                Err(_) => warn!(value = %raw, "Ignoring unparseable hierarchy depth"),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
