//! # depot-core: Warehouse Entities and Validation for Depot
//!
//! Products and categories of a warehouse, and the rule engine that keeps
//! them consistent. Nothing in this crate touches a database or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Depot Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (API handlers, importers, jobs)            │   │
//! │  │     JSON ──► ProductDraft / CategoryDraft / *Patch              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ construct / mutate                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ depot-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  product  │  │ category  │  │  engine   │  │  tables   │  │   │
//! │  │   │  Product  │  │ Category  │  │   Rule    │  │ unit/state│  │   │
//! │  │   │ 5 parts   │  │ defaults  │  │  Report   │  │ size reqs │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ValidationContext: config • clock • ids • category/SKU lookup │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Validated<T> | ValidationErrors        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Persistence (not in here)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`product`] - Product and its five owned sub-components
//! - [`category`] - Category, its defaults, planning and storage settings
//! - [`engine`] - Rule registries, reports, `Validated<T>`
//! - [`context`] - Injected clock, id source and lookups
//! - [`config`] - Thresholds, storage rules, evaluation mode
//! - [`tables`] - Static compatibility tables
//! - [`validation`] - Field-level validators
//! - [`enums`] - Domain codes
//! - [`error`] - Violations, advisories, config errors
//!
//! ## Design Principles
//!
//! 1. **Never partially valid**: `construct` and `mutate` either return a
//!    fully checked entity or the violations that prevented it
//! 2. **No I/O**: time, ids and lookups come through [`ValidationContext`]
//! 3. **Deterministic**: rules run in a fixed order, so errors are reproducible
//! 4. **Explicit Errors**: every violation carries a kind, a rule and fields
//!
//! ## Example Usage
//!
//! ```rust
//! use depot_core::{CategoryDraft, FixedClock, ValidationConfig, ValidationContext};
//! use chrono::NaiveDate;
//!
//! let config = ValidationConfig::default();
//! let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
//! let ctx = ValidationContext::new(&config, &clock);
//!
//! let draft = CategoryDraft {
//!     sku: "CHEM01".to_string(),
//!     name: "Chemicals".to_string(),
//!     ..CategoryDraft::default()
//! };
//! let category = draft.finalize(&ctx).unwrap();
//! assert_eq!(category.level(), 0);
//!
//! let bad = CategoryDraft {
//!     sku: "chem".to_string(),
//!     name: "Chemicals".to_string(),
//!     ..CategoryDraft::default()
//! };
//! let errors = bad.finalize(&ctx).unwrap_err();
//! assert_eq!(errors.first().unwrap().rule, "sku_format");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod category;
pub mod config;
pub mod context;
pub mod engine;
pub mod enums;
pub mod error;
pub mod product;
pub mod tables;
pub mod validation;

mod patch;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use category::{Category, CategoryDraft, CategoryPatch, CtgDefaults, CtgPlanning, CtgStorageSettings};
pub use config::{ValidationConfig, ValidationMode};
pub use context::{
    CategoryLookup, CategoryNode, Clock, FixedClock, IdSource, SkuRegistry, SystemClock, UuidV4,
    ValidationContext,
};
pub use engine::{Advisor, Report, Rule, RuleResult, Validated};
pub use error::{Advisory, ConfigError, ValidationErrors, Violation, ViolationKind};
pub use product::{Product, ProductDraft, ProductPatch};
