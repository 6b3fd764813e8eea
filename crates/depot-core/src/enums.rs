//! # Domain Codes
//!
//! Closed sets of warehouse domain codes. Every enumeration serializes to its
//! lowercase wire code (the same code a persistence layer stores), parses back
//! from it case-insensitively, and exports a TypeScript union.
//!
//! ## Code Groups
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product identity        │  Product storage        │  Category         │
//! │  ──────────────────      │  ───────────────        │  ────────         │
//! │  UnitOfMeasure           │  StorageCondition       │  PutawayStrategy  │
//! │  PhysicalState           │  HazardClass            │  Replenishment-   │
//! │  TrackingType            │  TemperatureRegime      │    Method         │
//! │  RoleType                │  PackagingType          │  CycleCount-      │
//! │  ProductStatus           │                         │    Frequency      │
//! │                          │  Product classification │  OrderFrequency   │
//! │                          │  SizeType, MovingType,  │                   │
//! │                          │  AbcCategory            │                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::UnknownCode;

/// Declares a domain code enumeration.
///
/// Each variant is paired with its wire code; the macro derives serde/ts-rs
/// (and sqlx behind the feature) from that single table.
macro_rules! domain_codes {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[ts(export)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $code)]
                #[cfg_attr(feature = "sqlx", sqlx(rename = $code))]
                $variant,
            )+
        }

        impl $name {
            /// Every code, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire code.
            pub const fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.code().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownCode {
                        kind: $label,
                        value: s.to_string(),
                    })
            }
        }
    };
}

// =============================================================================
// Product Identity
// =============================================================================

domain_codes! {
    /// Base unit in which a product is counted.
    UnitOfMeasure ("unit of measure") {
        Piece => "pc",
        Kilogram => "kg",
        Gram => "g",
        Liter => "l",
        Milliliter => "ml",
        Meter => "m",
        Centimeter => "cm",
        SquareMeter => "m2",
        CubicMeter => "m3",
        Box => "box",
        Pallet => "pal",
        Set => "set",
    }
}

domain_codes! {
    /// Physical state of the goods.
    PhysicalState ("physical state") {
        Solid => "solid",
        Bulk => "bulk",
        Liquid => "liquid",
        Gas => "gas",
    }
}

domain_codes! {
    /// How stock quantity is counted and traced.
    TrackingType ("tracking type") {
        Piece => "piece",
        WeightBased => "weight_based",
        Kit => "kit",
        Serialized => "serialized",
        LotTracked => "lot_tracked",
        /// Requires production and expiry dates.
        ExpiryTracked => "expiry_tracked",
    }
}

domain_codes! {
    /// Role of the product in the production/logistics chain.
    RoleType ("role type") {
        RawMaterial => "raw material",
        Components => "components",
        FinishedGood => "finished good",
        /// Customer returns; must pass quarantine.
        Returns => "returns",
        WorkInProgress => "work in progress",
        Packaging => "packaging",
        Consumable => "consumable",
        Tool => "tool",
        SparePart => "spare part",
        Scrap => "scrap",
        Sample => "sample",
    }
}

domain_codes! {
    /// Lifecycle status.
    ProductStatus ("product status") {
        Active => "active",
        Inactive => "inactive",
        Discontinued => "discontinued",
        ComingSoon => "coming_soon",
        PendingApproval => "pending_approval",
        UnderReview => "under_review",
        Returned => "returned",
        Damaged => "damaged",
        Quarantined => "quarantined",
    }
}

// =============================================================================
// Product Storage
// =============================================================================

domain_codes! {
    /// General storage requirement of a product.
    StorageCondition ("storage condition") {
        Perishable => "perishable",
        Hazardous => "hazardous",
        Electronics => "electronics",
        Medicine => "medicine",
        TemperatureControlled => "temperature_controlled",
        Ventilated => "ventilated",
        OdorSensitive => "odor_sensitive",
        FoodSafe => "food_safe",
    }
}

domain_codes! {
    /// Dangerous goods class (ADR numbering).
    HazardClass ("hazard class") {
        /// Explosives.
        Class1 => "1",
        /// Gases.
        Class2 => "2",
        /// Flammable liquids.
        Class3 => "3",
        /// Flammable solids.
        Class4 => "4",
        /// Oxidizing substances.
        Class5 => "5",
        /// Toxic substances.
        Class6 => "6",
        /// Radioactive material.
        Class7 => "7",
        /// Corrosives.
        Class8 => "8",
        /// Miscellaneous.
        Class9 => "9",
    }
}

domain_codes! {
    /// Required storage temperature band.
    TemperatureRegime ("temperature regime") {
        /// -18°C and below.
        Frozen => "frozen",
        /// -30°C and below.
        DeepFrozen => "deep_frozen",
        /// 0°C to +5°C.
        Chilled => "chilled",
        /// +10°C to +15°C.
        Cool => "cool",
        Ambient => "ambient",
        /// +20°C to +25°C.
        Warm => "warm",
        /// Specific range agreed separately.
        Controlled => "controlled",
    }
}

domain_codes! {
    /// Packaging used for storage/shipping.
    PackagingType ("packaging type") {
        Bag => "bag",
        Box => "box",
        Crate => "crate",
        Drum => "drum",
        Pallet => "pallet",
        /// Intermediate bulk container.
        Ibc => "ibc",
        Tote => "tote",
        Cylinder => "cylinder",
        Cardboard => "cardboard",
        ShrinkWrap => "shrink_wrap",
        /// Unpackaged / loose goods.
        Loose => "none",
    }
}

// =============================================================================
// Product Classification
// =============================================================================

domain_codes! {
    /// Size/weight category.
    SizeType ("size type") {
        Oversized => "oversized",
        Heavy => "heavy",
        Medium => "medium",
        SmallParts => "small parts",
        /// Needs space but is not heavy.
        Bulky => "bulky",
        Light => "light",
        Standard => "standard",
    }
}

domain_codes! {
    /// Turnover characteristic.
    MovingType ("moving type") {
        FastMoving => "fast moving",
        NormalMoving => "normal moving",
        SlowMoving => "slow moving",
        HighValue => "high value",
        Seasonal => "seasonal",
        Promotional => "promotional",
    }
}

domain_codes! {
    /// ABC analysis bucket (A = high value/turnover, D = obsolete).
    AbcCategory ("ABC category") {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
    }
}

// =============================================================================
// Category Settings
// =============================================================================

domain_codes! {
    /// Where incoming stock of a category is put away.
    PutawayStrategy ("putaway strategy") {
        /// First in, first out.
        Fifo => "fifo",
        /// First expired, first out.
        Fefo => "fefo",
        /// Last in, first out.
        Lifo => "lifo",
        /// Fixed location.
        Fixed => "fixed",
        /// Anywhere in bulk storage.
        Bulk => "bulk",
        Dynamic => "dynamic",
    }
}

domain_codes! {
    /// Unit in which a picking zone is replenished.
    ReplenishmentMethod ("replenishment method") {
        Pallet => "pallet",
        Case => "case",
        Each => "each",
        Bulk => "bulk",
    }
}

domain_codes! {
    /// How often a category is cycle counted.
    CycleCountFrequency ("cycle count frequency") {
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        Yearly => "yearly",
        /// Interval given in `custom_count_interval_days`.
        Custom => "custom",
    }
}

domain_codes! {
    /// How often replenishment orders are placed for a category.
    OrderFrequency ("order frequency") {
        Daily => "daily",
        Weekly => "weekly",
        Biweekly => "biweekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        /// Interval given in `custom_order_interval_days`.
        Custom => "custom",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
