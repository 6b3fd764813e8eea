//! # Category
//!
//! Product grouping with a parent/child hierarchy and defaults that
//! pre-seed products.
//!
//! ## Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Chemicals (level 0, parent None)                                     │
//! │     ├── Solvents (level 1)                                             │
//! │     │     └── Chlorinated (level 2)                                    │
//! │     └── Acids (level 1)                                                │
//! │                                                                         │
//! │  parent_id is a weak reference: the category only stores the id.      │
//! │  Existence, cycles and levels are checked through CategoryLookup,      │
//! │  which the caller fills from data it already has.                      │
//! │                                                                         │
//! │  Chlorinated.parent = Chemicals?  level 2 ≠ 0 + 1       → rejected     │
//! │  Chemicals.parent = Chlorinated?  Chlorinated → ... → Chemicals → cycle│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Evaluation Order
//! 1. Field rules: sku, name, description, path
//! 2. Entity rules: timestamps, deleted ⇒ inactive
//! 3. Composed settings: defaults, planning
//! 4. Hierarchy: parent ≠ self, parent exists, no cycle, level

mod defaults;
mod planning;
mod storage_settings;

pub use defaults::CtgDefaults;
pub use planning::CtgPlanning;
pub use storage_settings::CtgStorageSettings;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::context::{CategoryNode, ValidationContext};
use crate::engine::{Advisor, Report, Rule, RuleResult, Validated};
use crate::enums::TrackingType;
use crate::error::{Advisory, ValidationErrors, Violation, ViolationKind};
use crate::patch::{apply, apply_clearable, double_option};
use crate::product::check_timestamps;
use crate::validation::{validate_description, validate_name, validate_path, validate_sku};

// =============================================================================
// Draft
// =============================================================================

/// Raw category input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CategoryDraft {
    /// Generated by the context's `IdSource` when absent.
    #[ts(as = "Option<String>")]
    pub id: Option<Uuid>,
    pub sku: String,
    pub name: String,
    #[ts(as = "Option<String>")]
    pub parent_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    /// Depth in the tree; 0 for roots.
    pub level: u32,
    /// Materialized path, maintained by the persistence layer.
    pub path: Option<String>,
    pub sort_order: i32,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
    pub defaults: Option<CtgDefaults>,
    pub planning: Option<CtgPlanning>,
    pub storage_settings: Option<CtgStorageSettings>,
}

impl Default for CategoryDraft {
    fn default() -> Self {
        CategoryDraft {
            id: None,
            sku: String::new(),
            name: String::new(),
            parent_id: None,
            description: None,
            is_active: true,
            is_deleted: false,
            level: 0,
            path: None,
            sort_order: 0,
            created_at: None,
            updated_at: None,
            defaults: None,
            planning: None,
            storage_settings: None,
        }
    }
}

impl CategoryDraft {
    /// Same as [`Category::construct`].
    pub fn finalize(self, ctx: &ValidationContext<'_>) -> Result<Validated<Category>, ValidationErrors> {
        Category::construct(self, ctx)
    }

    fn finalize_into(self, ctx: &ValidationContext<'_>, report: &mut Report) -> Category {
        report.run(&self, FIELD_RULES, ctx);

        let now = ctx.now();
        let created_at = self.created_at.unwrap_or(now);
        let updated_at = self.updated_at.unwrap_or_else(|| created_at.max(now));

        Category {
            id: self.id.unwrap_or_else(|| ctx.next_id()),
            sku: self.sku,
            name: self.name.trim().to_string(),
            parent_id: self.parent_id,
            description: self.description,
            is_active: self.is_active,
            is_deleted: self.is_deleted,
            level: self.level,
            path: self.path,
            sort_order: self.sort_order,
            created_at,
            updated_at,
            defaults: self.defaults,
            planning: self.planning,
            storage_settings: self.storage_settings,
        }
    }
}

// =============================================================================
// Patch
// =============================================================================

/// Partial update for [`Category::mutate`]. `id` and `created_at` cannot
/// change. Optional values and composed settings can be cleared with `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CategoryPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    #[ts(as = "Option<Option<String>>")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
    pub level: Option<u32>,
    #[serde(deserialize_with = "double_option")]
    pub path: Option<Option<String>>,
    pub sort_order: Option<i32>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "double_option")]
    pub defaults: Option<Option<CtgDefaults>>,
    #[serde(deserialize_with = "double_option")]
    pub planning: Option<Option<CtgPlanning>>,
    #[serde(deserialize_with = "double_option")]
    pub storage_settings: Option<Option<CtgStorageSettings>>,
}

impl CategoryPatch {
    fn apply_to(self, draft: &mut CategoryDraft, now: DateTime<Utc>) {
        apply(&mut draft.sku, self.sku);
        apply(&mut draft.name, self.name);
        apply_clearable(&mut draft.parent_id, self.parent_id);
        apply_clearable(&mut draft.description, self.description);
        apply(&mut draft.is_active, self.is_active);
        apply(&mut draft.is_deleted, self.is_deleted);
        apply(&mut draft.level, self.level);
        apply_clearable(&mut draft.path, self.path);
        apply(&mut draft.sort_order, self.sort_order);
        apply_clearable(&mut draft.defaults, self.defaults);
        apply_clearable(&mut draft.planning, self.planning);
        apply_clearable(&mut draft.storage_settings, self.storage_settings);
        draft.updated_at = Some(self.updated_at.unwrap_or(now));
    }
}

// =============================================================================
// Category
// =============================================================================

/// A validated category. Immutable; see [`Category::mutate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "CategoryDraft")]
pub struct Category {
    id: Uuid,
    sku: String,
    name: String,
    parent_id: Option<Uuid>,
    description: Option<String>,
    is_active: bool,
    is_deleted: bool,
    level: u32,
    path: Option<String>,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    defaults: Option<CtgDefaults>,
    planning: Option<CtgPlanning>,
    storage_settings: Option<CtgStorageSettings>,
}

impl Category {
    /// Validates `draft` and returns the accepted category.
    pub fn construct(
        draft: CategoryDraft,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<Category>, ValidationErrors> {
        Self::validate(draft, ctx)
    }

    /// Applies `patch` to a copy of this category and re-validates it,
    /// hierarchy included.
    pub fn mutate(
        &self,
        patch: CategoryPatch,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<Category>, ValidationErrors> {
        let mut draft = self.to_draft();
        patch.apply_to(&mut draft, ctx.now());
        Self::validate(draft, ctx)
    }

    fn validate(
        draft: CategoryDraft,
        ctx: &ValidationContext<'_>,
    ) -> Result<Validated<Category>, ValidationErrors> {
        let mut report = ctx.report();
        let category = draft.finalize_into(ctx, &mut report);

        report.run(&category, ENTITY_RULES, ctx);
        if let Some(defaults) = &category.defaults {
            defaults.check_into(ctx, &mut report);
        }
        if let Some(planning) = &category.planning {
            planning.check_into(ctx, &mut report);
        }
        report.run(&category, HIERARCHY_RULES, ctx);
        report.advise(&category, ADVISORS, ctx);

        if report.is_clean() {
            debug!(
                category_id = %category.id,
                sku = %category.sku,
                advisories = report.advisories().len(),
                "Category accepted"
            );
        } else {
            debug!(
                category_id = %category.id,
                sku = %category.sku,
                violations = report.violations().len(),
                "Category rejected"
            );
        }

        report.finish(Some(category))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn defaults(&self) -> Option<&CtgDefaults> {
        self.defaults.as_ref()
    }

    pub fn planning(&self) -> Option<&CtgPlanning> {
        self.planning.as_ref()
    }

    pub fn storage_settings(&self) -> Option<&CtgStorageSettings> {
        self.storage_settings.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// The tree-relevant part, for a [`crate::context::CategoryLookup`].
    pub fn node(&self) -> CategoryNode {
        CategoryNode {
            id: self.id,
            parent_id: self.parent_id,
            level: self.level,
            is_deleted: self.is_deleted,
        }
    }

    pub fn to_draft(&self) -> CategoryDraft {
        CategoryDraft::from(self.clone())
    }
}

impl From<Category> for CategoryDraft {
    fn from(c: Category) -> Self {
        CategoryDraft {
            id: Some(c.id),
            sku: c.sku,
            name: c.name,
            parent_id: c.parent_id,
            description: c.description,
            is_active: c.is_active,
            is_deleted: c.is_deleted,
            level: c.level,
            path: c.path,
            sort_order: c.sort_order,
            created_at: Some(c.created_at),
            updated_at: Some(c.updated_at),
            defaults: c.defaults,
            planning: c.planning,
            storage_settings: c.storage_settings,
        }
    }
}

// =============================================================================
// Field and Entity Rules
// =============================================================================

const FIELD_RULES: &[Rule<CategoryDraft>] = &[
    Rule { name: "sku_format", check: sku_format },
    Rule { name: "name_format", check: name_format },
    Rule { name: "description_length", check: description_length },
    Rule { name: "path_length", check: path_length },
];

fn sku_format(d: &CategoryDraft, _: &ValidationContext<'_>) -> RuleResult {
    validate_sku(&d.sku)
}

fn name_format(d: &CategoryDraft, ctx: &ValidationContext<'_>) -> RuleResult {
    validate_name(&d.name, ctx.config().limits.name_max_chars)
}

fn description_length(d: &CategoryDraft, ctx: &ValidationContext<'_>) -> RuleResult {
    validate_description(d.description.as_deref(), ctx.config().limits.description_max_chars)
}

fn path_length(d: &CategoryDraft, ctx: &ValidationContext<'_>) -> RuleResult {
    validate_path(d.path.as_deref(), ctx.config().limits.path_max_chars)
}

const ENTITY_RULES: &[Rule<Category>] = &[
    Rule { name: "timestamps_ordered", check: timestamps_ordered },
    Rule { name: "deleted_not_active", check: deleted_not_active },
];

fn timestamps_ordered(c: &Category, _: &ValidationContext<'_>) -> RuleResult {
    check_timestamps(c.created_at, c.updated_at)
}

fn deleted_not_active(c: &Category, _: &ValidationContext<'_>) -> RuleResult {
    if c.is_deleted && c.is_active {
        return Err(Violation::new(
            ViolationKind::FlagConflict,
            &["is_deleted", "is_active"],
            "a deleted category cannot be active",
        ));
    }
    Ok(())
}

// =============================================================================
// Hierarchy Rules
// =============================================================================

const HIERARCHY_RULES: &[Rule<Category>] = &[
    Rule { name: "parent_not_self", check: parent_not_self },
    Rule { name: "parent_exists", check: parent_exists },
    Rule { name: "parent_acyclic", check: parent_acyclic },
    Rule { name: "level_matches_parent", check: level_matches_parent },
];

fn hierarchy(fields: &[&str], message: String) -> Violation {
    Violation::new(ViolationKind::HierarchyViolation, fields, message)
}

fn parent_not_self(c: &Category, _: &ValidationContext<'_>) -> RuleResult {
    if c.parent_id == Some(c.id) {
        return Err(hierarchy(
            &["parent_id"],
            format!("category {} cannot be its own parent", c.id),
        ));
    }
    Ok(())
}

fn parent_exists(c: &Category, ctx: &ValidationContext<'_>) -> RuleResult {
    let (Some(parent_id), Some(categories)) = (c.parent_id, ctx.categories()) else {
        return Ok(());
    };
    match categories.find(parent_id) {
        Some(parent) if !parent.is_deleted => Ok(()),
        Some(_) => Err(Violation::new(
            ViolationKind::UnknownReference,
            &["parent_id"],
            format!("parent category {} is deleted", parent_id),
        )),
        None => Err(Violation::new(
            ViolationKind::UnknownReference,
            &["parent_id"],
            format!("parent category {} does not exist", parent_id),
        )),
    }
}

/// Walks up from the parent; reaching this category again is a cycle.
/// Walks at most `max_depth` ancestors.
fn parent_acyclic(c: &Category, ctx: &ValidationContext<'_>) -> RuleResult {
    let (Some(parent_id), Some(categories)) = (c.parent_id, ctx.categories()) else {
        return Ok(());
    };
    let max_depth = ctx.config().hierarchy.max_depth;

    let mut current = Some(parent_id);
    for _ in 0..max_depth {
        let Some(id) = current else {
            return Ok(());
        };
        if id == c.id {
            return Err(hierarchy(
                &["parent_id"],
                format!("parent {} would make category {} its own ancestor", parent_id, c.id),
            ));
        }
        // Unknown ancestors are reported by parent_exists, or are outside
        // the data the caller supplied.
        let Some(node) = categories.find(id) else {
            return Ok(());
        };
        current = node.parent_id;
    }

    match current {
        None => Ok(()),
        Some(_) => Err(hierarchy(
            &["parent_id"],
            format!("category tree deeper than {} levels", max_depth),
        )),
    }
}

fn level_matches_parent(c: &Category, ctx: &ValidationContext<'_>) -> RuleResult {
    let expected = match c.parent_id {
        None => 0,
        Some(parent_id) => match ctx.categories().and_then(|lookup| lookup.find(parent_id)) {
            Some(parent) => parent.level.saturating_add(1),
            None => return Ok(()),
        },
    };

    if c.level != expected {
        return Err(hierarchy(
            &["level", "parent_id"],
            format!("level must be {}, got {}", expected, c.level),
        ));
    }
    Ok(())
}

// =============================================================================
// Advisors
// =============================================================================

const ADVISORS: &[Advisor<Category>] = &[Advisor {
    name: "fefo_expiry_tracking",
    check: fefo_expiry_tracking,
}];

fn fefo_expiry_tracking(c: &Category, _: &ValidationContext<'_>) -> Option<Advisory> {
    let fefo = c.storage_settings.map_or(false, |s| s.is_fefo());
    let tracking = c.defaults.and_then(|d| d.default_tracking_type);
    (fefo && tracking != Some(TrackingType::ExpiryTracked)).then(|| {
        Advisory::new(
            &["putaway_strategy", "default_tracking_type"],
            "FEFO putaway works best with expiry_tracked products as the category default",
        )
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
