use std::collections::HashSet;

use crate::catalog::{LabelCatalog, LabelValue};

/// Identifiers observed in image data but absent from the catalog.
///
/// Pure asymmetric set difference, returned ascending-sorted. Empty
/// exactly when every discovered value is registered. The reverse
/// direction, catalog IDs never observed in any image, is deliberately
/// not computed.
pub fn missing_ids(discovered: &HashSet<LabelValue>, catalog: &LabelCatalog) -> Vec<LabelValue> {
    let mut missing: Vec<LabelValue> = discovered.difference(catalog).copied().collect();
    missing.sort_unstable();
    missing
}

// -- Tests --
