//! Overlay merge by precedence

use strata_domain::{OverlaySet, ValueMap};

/// Merges the three overlays into one raw mapping.
///
/// Precedence, lowest to highest: operator override, user parameters, plan
/// properties. Values are copied literally and never evaluated, even when
/// they contain `${...}`.
#[must_use]
pub fn merge_raw(
    operator_override: &ValueMap,
    user_params: &ValueMap,
    plan_properties: &ValueMap,
) -> ValueMap {
    merge_in_order([operator_override, user_params, plan_properties])
}

/// Merges an [`OverlaySet`] into one raw mapping.
#[must_use]
pub fn merge_overlay_set(overlays: &OverlaySet) -> ValueMap {
    merge_in_order(overlays.in_precedence_order().map(|overlay| {
        tracing::trace!(
            overlay = ?overlay.kind(),
            values = overlay.values().len(),
            "applying overlay"
        );
        overlay.values()
    }))
}

/// Later maps win.
fn merge_in_order<'a>(maps: impl IntoIterator<Item = &'a ValueMap>) -> ValueMap {
    let mut merged = ValueMap::new();
    for values in maps {
        merged.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}
