//! Latest-per-item projection over a ledger scan.
//!
//! # Responsibility
//! - Select exactly one winning observation per item.
//! - Derive the current-level mapping and its ordered tabulation.
//!
//! # Invariants
//! - Winner order is `(record_date, sequence_id)` descending; it is total,
//!   so the result never depends on scan order.
//! - Pure: no storage access, identical input gives identical output.

use crate::model::observation::Observation;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Current quantity per item, keyed by item name in ascending byte order.
pub type CurrentLevels = BTreeMap<String, i64>;

/// One row of the ordered current-level tabulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub item_name: String,
    pub quantity: i64,
}

/// Ordering applied to `current_levels_ordered_by`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LevelOrder {
    /// Item name ascending. Reproducible chart output for identical data.
    #[default]
    ByItem,
    /// Quantity descending, ties broken by item name ascending.
    ByQuantityDesc,
}

/// Returns the winning observation for every item present in `observations`.
pub fn latest_per_item<'a, I>(observations: I) -> BTreeMap<&'a str, &'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut winners: BTreeMap<&'a str, &'a Observation> = BTreeMap::new();
    for observation in observations {
        match winners.entry(observation.item_name.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(observation);
            }
            Entry::Occupied(mut slot) => {
                if observation.supersedes(slot.get()) {
                    slot.insert(observation);
                }
            }
        }
    }
    winners
}

/// Maps each item to the quantity of its winning observation.
pub fn current_levels(observations: &[Observation]) -> CurrentLevels {
    latest_per_item(observations)
        .into_iter()
        .map(|(item_name, winner)| (item_name.to_string(), winner.quantity))
        .collect()
}

/// Current levels ordered by item name ascending.
pub fn current_levels_ordered(observations: &[Observation]) -> Vec<LevelEntry> {
    current_levels_ordered_by(observations, LevelOrder::ByItem)
}

/// Current levels in the requested order.
pub fn current_levels_ordered_by(
    observations: &[Observation],
    order: LevelOrder,
) -> Vec<LevelEntry> {
    let mut entries: Vec<LevelEntry> = latest_per_item(observations)
        .into_iter()
        .map(|(item_name, winner)| LevelEntry {
            item_name: item_name.to_string(),
            quantity: winner.quantity,
        })
        .collect();

    if order == LevelOrder::ByQuantityDesc {
        entries.sort_by(|left, right| {
            right
                .quantity
                .cmp(&left.quantity)
                .then_with(|| left.item_name.cmp(&right.item_name))
        });
    }
    entries
}
