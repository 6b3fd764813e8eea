//! Where a category's stock is put away and how picking zones are refilled.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::{PutawayStrategy, ReplenishmentMethod};

/// Placement and replenishment settings. Only enumeration membership is
/// checked, which deserialization already guarantees. Zone ids are not
/// resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CtgStorageSettings {
    #[ts(as = "Option<String>")]
    pub default_storage_zone_id: Option<Uuid>,
    #[ts(as = "Option<String>")]
    pub default_picking_zone_id: Option<Uuid>,
    pub putaway_strategy: Option<PutawayStrategy>,
    pub replenishment_method: Option<ReplenishmentMethod>,
}

impl CtgStorageSettings {
    /// True when stock should leave in expiry order.
    pub fn is_fefo(&self) -> bool {
        self.putaway_strategy == Some(PutawayStrategy::Fefo)
    }
}
