//! Helpers for partial-update payloads.
//!
//! ```text
//! JSON                      Option<Option<T>>
//! ─────────────────────     ─────────────────
//! field absent          ──► None            (leave unchanged)
//! "field": null         ──► Some(None)      (clear)
//! "field": value        ──► Some(Some(v))   (replace)
//! ```

use serde::{Deserialize, Deserializer};

/// Deserializes a clearable field. Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Applies a clearable patch value to `slot`.
pub(crate) fn apply_clearable<T>(slot: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(value) = patch {
        *slot = value;
    }
}

/// Applies a replace-only patch value to `slot`.
pub(crate) fn apply<T>(slot: &mut T, patch: Option<T>) {
    if let Some(value) = patch {
        *slot = value;
    }
}
