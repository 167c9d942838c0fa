//! Unit completion and level unlock derivation.
//!
//! A unit is completed when all of its catalog cards are completed (vacuous
//! for a cardless unit), its exercise is completed, and its reward claimed.
//! A level is unlocked when it is first, the admin override is active, or
//! the previous level is fully completed. Stale progress for units missing
//! from the catalog never counts.

use crate::catalog::{Catalog, Level};
use crate::progress::state::ProgressState;

/// Whether a unit satisfies all three completion conditions.
///
/// Unknown unit ids are never completed. Only cards that still exist in the
/// catalog count toward the card total.
pub fn is_unit_completed(catalog: &Catalog, state: &ProgressState, unit_id: u32) -> bool {
    let Some(unit) = catalog.unit(unit_id) else {
        return false;
    };
    let progress = state.unit(unit_id);

    let cards_done = unit
        .card_ids()
        .all(|card_id| progress.completed_cards.contains(card_id));

    cards_done && progress.exercise_completed && progress.reward_claimed
}

/// Whether every unit in a level is completed (vacuously true when empty).
pub fn is_level_completed(catalog: &Catalog, state: &ProgressState, level: &Level) -> bool {
    level
        .units
        .iter()
        .all(|unit| is_unit_completed(catalog, state, unit.unit_id))
}

/// Whether the level at `level_index` (0-based catalog position) is unlocked.
///
/// The first level is always unlocked; the admin override unlocks all; an
/// out-of-range index is locked.
pub fn level_unlocked(catalog: &Catalog, state: &ProgressState, level_index: usize) -> bool {
    if level_index >= catalog.levels.len() {
        return false;
    }
    if level_index == 0 || state.admin {
        return true;
    }
    is_level_completed(catalog, state, &catalog.levels[level_index - 1])
}

/// Count of completed units in a level. Unknown level id counts zero.
pub fn completed_units_count(catalog: &Catalog, state: &ProgressState, level_id: u32) -> usize {
    let Some(level) = catalog.level(level_id) else {
        return 0;
    };
    level
        .units
        .iter()
        .filter(|unit| is_unit_completed(catalog, state, unit.unit_id))
        .count()
}

/// Per-level derived unlock flags in catalog order: `(level_id, unlocked)`.
pub fn unlocked_levels(catalog: &Catalog, state: &ProgressState) -> Vec<(u32, bool)> {
    catalog
        .levels
        .iter()
        .enumerate()
        .map(|(index, level)| (level.level_id, level_unlocked(catalog, state, index)))
        .collect()
}
