//! # Validation Context
//!
//! Everything a rule may consult besides the entity itself: configuration,
//! the clock, and lookups owned by outer layers.
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ValidationContext                                 │
//! │                                                                         │
//! │   ValidationConfig   thresholds, rule sets, fail_fast / collect_all    │
//! │   Clock              now() / today()           (SystemClock, Fixed)    │
//! │   IdSource           next_id()                 (UuidV4)                │
//! │   CategoryLookup     find(id)        optional  (HashMap impl)          │
//! │   SkuRegistry        is_taken(sku)   optional  (HashSet impl)          │
//! │                                                                         │
//! │  Lookups are answered from data the caller already holds; the core     │
//! │  never queries a database. An absent lookup skips its rule.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::config::ValidationConfig;
use crate::engine::Report;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used by "not in the past / future" date rules.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant. Used by tests and by replays that must
/// validate "as of" a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock(now)
    }

    /// Midnight UTC at the start of `date`.
    pub fn on(date: NaiveDate) -> Self {
        FixedClock(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// =============================================================================
// Identifier Source
// =============================================================================

/// Generates identifiers for entities created without one.
pub trait IdSource {
    fn next_id(&self) -> Uuid;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4;

impl IdSource for UuidV4 {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

static DEFAULT_IDS: UuidV4 = UuidV4;

// =============================================================================
// Category Lookup
// =============================================================================

/// The part of a category needed to check references and the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub level: u32,
    pub is_deleted: bool,
}

/// Resolves category ids to nodes.
pub trait CategoryLookup {
    fn find(&self, id: Uuid) -> Option<CategoryNode>;
}

impl CategoryLookup for HashMap<Uuid, CategoryNode> {
    fn find(&self, id: Uuid) -> Option<CategoryNode> {
        self.get(&id).copied()
    }
}

// =============================================================================
// SKU Registry
// =============================================================================

/// Answers whether a SKU is already used by another product.
pub trait SkuRegistry {
    fn is_taken(&self, sku: &str) -> bool;
}

impl SkuRegistry for HashSet<String> {
    fn is_taken(&self, sku: &str) -> bool {
        self.contains(sku)
    }
}

// =============================================================================
// Validation Context
// =============================================================================

/// Read-only inputs to a validation run.
///
/// Cheap to build per request; holds only references.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    config: &'a ValidationConfig,
    clock: &'a dyn Clock,
    ids: &'a dyn IdSource,
    categories: Option<&'a dyn CategoryLookup>,
    skus: Option<&'a dyn SkuRegistry>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(config: &'a ValidationConfig, clock: &'a dyn Clock) -> Self {
        ValidationContext {
            config,
            clock,
            ids: &DEFAULT_IDS,
            categories: None,
            skus: None,
        }
    }

    pub fn with_ids(mut self, ids: &'a dyn IdSource) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_categories(mut self, categories: &'a dyn CategoryLookup) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_sku_registry(mut self, skus: &'a dyn SkuRegistry) -> Self {
        self.skus = Some(skus);
        self
    }

    pub fn config(&self) -> &'a ValidationConfig {
        self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn next_id(&self) -> Uuid {
        self.ids.next_id()
    }

    pub fn categories(&self) -> Option<&'a dyn CategoryLookup> {
        self.categories
    }

    pub fn skus(&self) -> Option<&'a dyn SkuRegistry> {
        self.skus
    }

    /// Starts an empty report in this context's mode.
    pub fn report(&self) -> Report {
        Report::new(self.config.mode)
    }
}

impl std::fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("config", self.config)
            .field("now", &self.clock.now())
            .field("categories", &self.categories.is_some())
            .field("skus", &self.skus.is_some())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
