//! # Rule Tables
//!
//! Variant-dependent requirements expressed as data. Adding a variant or
//! widening a unit set is an edit here, not a new branch in a validator.
//!
//! ## Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TrackingType ──► units_for_tracking()     allowed units of measure    │
//! │                                                                         │
//! │  PhysicalState ─► physical_state_profile() units, packaging,           │
//! │                                            ventilation, discrete track │
//! │                                                                         │
//! │  SizeType ──────► SizeRequirement::for_size()                           │
//! │                     HEAVY       weight_kg  >= heavy_min_weight_kg      │
//! │                     LIGHT       weight_kg  <= light_max_weight_kg      │
//! │                     OVERSIZED   any w/h/d  >= oversized_min_cm         │
//! │                     SMALL_PARTS any w/h/d  <= small_parts_max_cm       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::config::SizeThresholds;
use crate::engine::RuleResult;
use crate::enums::{MovingType, PackagingType, PhysicalState, SizeType, TrackingType, UnitOfMeasure};
use crate::error::{Violation, ViolationKind};
use crate::product::Dimensions;

// =============================================================================
// Tracking Type → Units
// =============================================================================

const WEIGHT_BASED_UNITS: &[UnitOfMeasure] = &[
    UnitOfMeasure::Kilogram,
    UnitOfMeasure::Gram,
    UnitOfMeasure::Liter,
    UnitOfMeasure::Milliliter,
    UnitOfMeasure::CubicMeter,
];

const PIECE_UNITS: &[UnitOfMeasure] = &[
    UnitOfMeasure::Piece,
    UnitOfMeasure::Box,
    UnitOfMeasure::Pallet,
    UnitOfMeasure::Set,
];

const KIT_UNITS: &[UnitOfMeasure] = &[UnitOfMeasure::Set, UnitOfMeasure::Piece];

/// Units of measure a tracking type may be counted in.
///
/// `None` means the tracking type puts no restriction on the unit.
pub fn units_for_tracking(tracking: TrackingType) -> Option<&'static [UnitOfMeasure]> {
    match tracking {
        TrackingType::WeightBased => Some(WEIGHT_BASED_UNITS),
        TrackingType::Piece => Some(PIECE_UNITS),
        TrackingType::Kit => Some(KIT_UNITS),
        TrackingType::Serialized | TrackingType::LotTracked | TrackingType::ExpiryTracked => None,
    }
}

/// Tracking types that count discrete items.
pub const DISCRETE_TRACKING: &[TrackingType] = &[TrackingType::Piece, TrackingType::Kit];

// =============================================================================
// Physical State Profiles
// =============================================================================

/// What a physical state demands of units, packaging and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalStateProfile {
    /// Allowed units; `None` = unrestricted.
    pub units: Option<&'static [UnitOfMeasure]>,
    /// Allowed packaging when packaging is set; `None` = unrestricted.
    pub allowed_packaging: Option<&'static [PackagingType]>,
    pub forbidden_packaging: &'static [PackagingType],
    pub requires_ventilation: bool,
    /// Whether PIECE/KIT tracking makes sense for this state.
    pub allows_discrete_tracking: bool,
}

static SOLID: PhysicalStateProfile = PhysicalStateProfile {
    units: None,
    allowed_packaging: None,
    forbidden_packaging: &[],
    requires_ventilation: false,
    allows_discrete_tracking: true,
};

static LIQUID: PhysicalStateProfile = PhysicalStateProfile {
    units: Some(&[UnitOfMeasure::Liter, UnitOfMeasure::Milliliter]),
    allowed_packaging: None,
    forbidden_packaging: &[PackagingType::Box],
    requires_ventilation: false,
    allows_discrete_tracking: false,
};

static GAS: PhysicalStateProfile = PhysicalStateProfile {
    units: Some(&[
        UnitOfMeasure::Liter,
        UnitOfMeasure::Milliliter,
        UnitOfMeasure::CubicMeter,
    ]),
    allowed_packaging: Some(&[PackagingType::Cylinder, PackagingType::Drum]),
    forbidden_packaging: &[],
    requires_ventilation: true,
    allows_discrete_tracking: false,
};

static BULK: PhysicalStateProfile = PhysicalStateProfile {
    units: Some(&[
        UnitOfMeasure::Kilogram,
        UnitOfMeasure::Gram,
        UnitOfMeasure::CubicMeter,
    ]),
    allowed_packaging: None,
    forbidden_packaging: &[],
    requires_ventilation: false,
    allows_discrete_tracking: false,
};

/// Looks up the profile of a physical state.
pub fn physical_state_profile(state: PhysicalState) -> &'static PhysicalStateProfile {
    match state {
        PhysicalState::Solid => &SOLID,
        PhysicalState::Liquid => &LIQUID,
        PhysicalState::Gas => &GAS,
        PhysicalState::Bulk => &BULK,
    }
}

impl PhysicalStateProfile {
    pub fn allows_unit(&self, unit: UnitOfMeasure) -> bool {
        self.units.map_or(true, |units| units.contains(&unit))
    }

    /// Absent packaging is always acceptable.
    pub fn allows_packaging(&self, packaging: Option<PackagingType>) -> bool {
        let Some(packaging) = packaging else {
            return true;
        };
        if self.forbidden_packaging.contains(&packaging) {
            return false;
        }
        self.allowed_packaging
            .map_or(true, |allowed| allowed.contains(&packaging))
    }

    pub fn allows_tracking(&self, tracking: TrackingType) -> bool {
        self.allows_discrete_tracking || !DISCRETE_TRACKING.contains(&tracking)
    }
}

// =============================================================================
// Size Type → Dimension Requirements
// =============================================================================

/// The dimension requirement attached to a size type. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeRequirement {
    MinWeightKg(f64),
    MaxWeightKg(f64),
    AnyDimensionAtLeastCm(f64),
    AnyDimensionAtMostCm(f64),
}

const LINEAR_FIELDS: [&str; 3] = ["width_cm", "height_cm", "depth_cm"];

impl SizeRequirement {
    /// Requirement for `size`, or `None` when the size type has none.
    pub fn for_size(size: SizeType, thresholds: &SizeThresholds) -> Option<Self> {
        match size {
            SizeType::Heavy => Some(SizeRequirement::MinWeightKg(thresholds.heavy_min_weight_kg)),
            SizeType::Light => Some(SizeRequirement::MaxWeightKg(thresholds.light_max_weight_kg)),
            SizeType::Oversized => Some(SizeRequirement::AnyDimensionAtLeastCm(
                thresholds.oversized_min_cm,
            )),
            SizeType::SmallParts => Some(SizeRequirement::AnyDimensionAtMostCm(
                thresholds.small_parts_max_cm,
            )),
            SizeType::Medium | SizeType::Bulky | SizeType::Standard => None,
        }
    }

    /// Checks `dims` against the requirement of `size`.
    ///
    /// A missing measure yields `MissingRequiredField`; a measure on the wrong
    /// side of the bound yields `DimensionThresholdViolation`.
    pub fn check(&self, size: SizeType, dims: &Dimensions) -> RuleResult {
        match *self {
            SizeRequirement::MinWeightKg(min) => {
                let weight = require_weight(size, dims)?;
                if weight >= min {
                    Ok(())
                } else {
                    Err(threshold_violation(
                        &["size_type", "weight_kg"],
                        format!("{} products must weigh at least {} kg, got {} kg", size, min, weight),
                    ))
                }
            }
            SizeRequirement::MaxWeightKg(max) => {
                let weight = require_weight(size, dims)?;
                if weight <= max {
                    Ok(())
                } else {
                    Err(threshold_violation(
                        &["size_type", "weight_kg"],
                        format!("{} products must weigh at most {} kg, got {} kg", size, max, weight),
                    ))
                }
            }
            SizeRequirement::AnyDimensionAtLeastCm(min) => {
                let present = require_linear(size, dims)?;
                if present.iter().any(|d| *d >= min) {
                    Ok(())
                } else {
                    Err(threshold_violation(
                        &["size_type", "width_cm", "height_cm", "depth_cm"],
                        format!("{} products need at least one dimension of {} cm or more", size, min),
                    ))
                }
            }
            SizeRequirement::AnyDimensionAtMostCm(max) => {
                let present = require_linear(size, dims)?;
                if present.iter().any(|d| *d <= max) {
                    Ok(())
                } else {
                    Err(threshold_violation(
                        &["size_type", "width_cm", "height_cm", "depth_cm"],
                        format!("{} products need at least one dimension of {} cm or less", size, max),
                    ))
                }
            }
        }
    }
}

fn require_weight(size: SizeType, dims: &Dimensions) -> Result<f64, Violation> {
    dims.weight_kg().ok_or_else(|| {
        Violation::missing(
            "weight_kg",
            format!("weight_kg is required for size_type {}", size),
        )
    })
}

fn require_linear(size: SizeType, dims: &Dimensions) -> Result<Vec<f64>, Violation> {
    let present: Vec<f64> = dims.linear().into_iter().flatten().collect();
    if present.is_empty() {
        return Err(Violation::new(
            ViolationKind::MissingRequiredField,
            &LINEAR_FIELDS,
            format!("size_type {} requires at least one of width_cm, height_cm, depth_cm", size),
        ));
    }
    Ok(present)
}

fn threshold_violation(fields: &[&str], message: String) -> Violation {
    Violation::new(ViolationKind::DimensionThresholdViolation, fields, message)
}

// =============================================================================
// Classification Tables
// =============================================================================

/// Size types that cannot be FAST_MOVING.
pub const FAST_MOVING_FORBIDDEN_SIZES: &[SizeType] = &[SizeType::Heavy, SizeType::Oversized];

/// Moving types an ABC category A product may have.
pub const ABC_A_MOVING_TYPES: &[MovingType] = &[MovingType::FastMoving, MovingType::NormalMoving];

/// Size types that must not be stacked.
pub const STACKING_FORBIDDEN_SIZES: &[SizeType] = &[SizeType::Heavy, SizeType::Oversized];

// =============================================================================
// Unit Tests
// =============================================================================
