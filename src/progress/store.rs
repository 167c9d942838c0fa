//! The process-wide progress store.
//!
//! Owns the in-memory progress state, loads it once at startup (with streak
//! decay applied at load), and writes the full document back after every
//! committed mutation. Persistence failures are fail-open: the in-memory
//! state stays authoritative for the session and the failure is logged.
//!
//! All writes are idempotent and gated:
//! - a card completes only if it exists in the unit's catalog card list
//! - the exercise completes only once every catalog card is completed
//! - the reward claims only once the exercise is completed
//!
//! Points are awarded only on the first transition of each item.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::catalog::Catalog;
use crate::engine::{self, streak, CARD_POINTS, EXERCISE_POINTS};
use crate::error::FailOpen;
use crate::progress::state::{ProgressState, Streak, UnitProgress};
use crate::storage::ProgressBackend;

/// Progress store: catalog + backend + in-memory state.
pub struct ProgressStore<B: ProgressBackend> {
    catalog: Arc<Catalog>,
    backend: B,
    state: ProgressState,
    loaded: bool,
    /// Process-scoped unlock override from config or environment. Never
    /// persisted; independent of the stored admin flag.
    unlock_override: bool,
}

impl<B: ProgressBackend> ProgressStore<B> {
    /// Create an unloaded store. Call [`load`](Self::load) before reading.
    pub fn new(catalog: Arc<Catalog>, backend: B) -> Self {
        Self {
            catalog,
            backend,
            state: ProgressState::default(),
            loaded: false,
            unlock_override: false,
        }
    }

    /// Create a store and load it in one step.
    pub fn open(catalog: Arc<Catalog>, backend: B, today: NaiveDate) -> Self {
        let mut store = Self::new(catalog, backend);
        store.load(today);
        store
    }

    /// Load persisted progress, applying streak decay for `today`.
    ///
    /// Tolerates a missing, unreadable, or partially malformed document by
    /// falling back to defaults per slice. Never writes during the load, so
    /// a failed read cannot clobber stored data with defaults. Idempotent:
    /// a second call re-reads storage.
    pub fn load(&mut self, today: NaiveDate) {
        let doc = self.backend.load().fail_open_default("loading progress");

        self.state = match doc {
            Some(doc) => ProgressState::from_document(&doc),
            None => ProgressState::default(),
        };

        // Elapsed-time decay happens at load, not only at mutation time.
        self.state.streak = streak::decay_on_load(&self.state.streak, today);
        self.loaded = true;
    }

    /// Set the process-scoped unlock override (config or environment).
    /// Survives for this process only; never written to storage.
    pub fn set_unlock_override(&mut self, on: bool) {
        self.unlock_override = on;
    }

    /// Readiness flag; reads should be deferred until this is true.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The catalog this store derives against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Snapshot of the current state, for the pure engine functions.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Total accumulated points.
    pub fn points(&self) -> u64 {
        self.state.points
    }

    /// Current streak.
    pub fn streak(&self) -> &Streak {
        &self.state.streak
    }

    /// Whether either admin source is active: the persisted flag or the
    /// process-scoped override.
    pub fn is_admin(&self) -> bool {
        self.state.admin || self.unlock_override
    }

    /// Progress for a unit, or a fresh default. Never mutates the store.
    pub fn unit_progress(&self, unit_id: u32) -> UnitProgress {
        self.state.unit(unit_id)
    }

    /// Whether the unit is fully completed (cards + exercise + reward).
    pub fn is_unit_completed(&self, unit_id: u32) -> bool {
        engine::is_unit_completed(&self.catalog, &self.state, unit_id)
    }

    /// Count of completed units in a level.
    pub fn completed_units_count(&self, level_id: u32) -> usize {
        engine::completed_units_count(&self.catalog, &self.state, level_id)
    }

    /// Whether the level at the given catalog position is unlocked.
    pub fn level_unlocked(&self, level_index: usize) -> bool {
        if self.unlock_override && level_index < self.catalog.levels.len() {
            return true;
        }
        engine::level_unlocked(&self.catalog, &self.state, level_index)
    }

    /// Per-level `(level_id, unlocked)` flags in catalog order.
    pub fn unlocked_levels(&self) -> Vec<(u32, bool)> {
        if self.unlock_override {
            return self
                .catalog
                .levels
                .iter()
                .map(|level| (level.level_id, true))
                .collect();
        }
        engine::unlocked_levels(&self.catalog, &self.state)
    }

    // =========================================================================
    // Writes (idempotent; persist on every committed mutation)
    // =========================================================================

    /// Complete a card. Awards points only on the absent → present
    /// transition. A card id not in the unit's catalog card list is a safe
    /// no-op. Returns whether anything changed.
    pub fn complete_card(&mut self, unit_id: u32, card_id: &str) -> bool {
        let Some(unit) = self.catalog.unit(unit_id) else {
            tracing::warn!(unit_id, "complete_card for unknown unit, ignoring");
            return false;
        };
        if !unit.has_card(card_id) {
            tracing::warn!(unit_id, card_id, "complete_card for unknown card, ignoring");
            return false;
        }

        let progress = self.state.unit_mut(unit_id);
        if !progress.completed_cards.insert(card_id.to_string()) {
            return false;
        }

        self.state.points += CARD_POINTS;
        self.persist();
        true
    }

    /// Complete a unit's exercise on `today`.
    ///
    /// Gated strictly behind full card completion. On the first transition
    /// awards points and advances the streak. Returns whether anything
    /// changed.
    pub fn complete_exercise(&mut self, unit_id: u32, today: NaiveDate) -> bool {
        let Some(unit) = self.catalog.unit(unit_id) else {
            tracing::warn!(unit_id, "complete_exercise for unknown unit, ignoring");
            return false;
        };

        let progress = self.state.unit(unit_id);
        if progress.exercise_completed {
            return false;
        }

        let cards_done = unit
            .card_ids()
            .all(|card_id| progress.completed_cards.contains(card_id));
        if !cards_done {
            tracing::warn!(unit_id, "complete_exercise before all cards, ignoring");
            return false;
        }

        self.state.unit_mut(unit_id).exercise_completed = true;
        self.state.points += EXERCISE_POINTS;
        self.state.streak = streak::advance(&self.state.streak, today);
        self.persist();
        true
    }

    /// Claim a unit's reward.
    ///
    /// Gated behind exercise completion; awards the catalog's reward points
    /// on the first transition. Unknown unit id is a safe no-op. Returns
    /// whether anything changed.
    pub fn claim_reward(&mut self, unit_id: u32) -> bool {
        let Some(reward_points) = self.catalog.reward_points(unit_id) else {
            tracing::warn!(unit_id, "claim_reward for unknown unit, ignoring");
            return false;
        };

        let progress = self.state.unit(unit_id);
        if progress.reward_claimed {
            return false;
        }
        if !progress.exercise_completed {
            tracing::warn!(unit_id, "claim_reward before exercise, ignoring");
            return false;
        }

        self.state.unit_mut(unit_id).reward_claimed = true;
        self.state.points += reward_points;
        self.persist();
        true
    }

    /// Set the persisted admin override flag.
    pub fn set_admin(&mut self, admin: bool) -> bool {
        if self.state.admin == admin {
            return false;
        }
        self.state.admin = admin;
        self.persist();
        true
    }

    /// Write the full in-memory state back to storage. Fail-open: a write
    /// failure is logged and the in-memory state remains authoritative.
    fn persist(&self) {
        if !self.loaded {
            // Load populates state from storage; writing before that would
            // clobber stored data with defaults.
            return;
        }
        self.backend
            .save(&self.state.to_document())
            .fail_open_default("saving progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::storage::MemoryProgressBackend;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    fn open_store() -> ProgressStore<Arc<MemoryProgressBackend>> {
        let backend = Arc::new(MemoryProgressBackend::new());
        ProgressStore::open(Arc::new(sample_catalog()), backend, today())
    }

    fn complete_unit_cards(store: &mut ProgressStore<Arc<MemoryProgressBackend>>, unit_id: u32) {
        let cards: Vec<String> = store
            .catalog()
            .unit(unit_id)
            .map(|u| u.card_ids().map(String::from).collect())
            .unwrap_or_default();
        for card in cards {
            store.complete_card(unit_id, &card);
        }
    }

    fn complete_unit(store: &mut ProgressStore<Arc<MemoryProgressBackend>>, unit_id: u32) {
        complete_unit_cards(store, unit_id);
        store.complete_exercise(unit_id, today());
        store.claim_reward(unit_id);
    }

    #[test]
    fn test_unloaded_store_not_ready() {
        let store = ProgressStore::new(
            Arc::new(sample_catalog()),
            Arc::new(MemoryProgressBackend::new()),
        );
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_open_loads_defaults_from_empty_backend() {
        let store = open_store();
        assert!(store.is_loaded());
        assert_eq!(store.points(), 0);
        assert_eq!(store.streak().count, 0);
        assert!(!store.is_admin());
    }

    #[test]
    fn test_complete_card_awards_once() {
        let mut store = open_store();

        assert!(store.complete_card(1, "a"));
        assert_eq!(store.points(), 5);

        // Repeat is a no-op for points and membership
        assert!(!store.complete_card(1, "a"));
        assert_eq!(store.points(), 5);
        assert_eq!(store.unit_progress(1).completed_cards.len(), 1);
    }

    #[test]
    fn test_complete_card_unknown_card_is_noop() {
        let mut store = open_store();
        assert!(!store.complete_card(1, "zz"));
        assert_eq!(store.points(), 0);
        assert!(store.unit_progress(1).completed_cards.is_empty());
    }

    #[test]
    fn test_complete_card_unknown_unit_is_noop() {
        let mut store = open_store();
        assert!(!store.complete_card(99, "a"));
        assert_eq!(store.points(), 0);
    }

    #[test]
    fn test_exercise_gated_behind_cards() {
        let mut store = open_store();

        // Unit 1 has two cards; exercise must not complete early.
        store.complete_card(1, "a");
        assert!(!store.complete_exercise(1, today()));
        assert!(!store.unit_progress(1).exercise_completed);
        assert_eq!(store.points(), 5);

        store.complete_card(1, "b");
        assert!(store.complete_exercise(1, today()));
        assert!(store.unit_progress(1).exercise_completed);
        assert_eq!(store.points(), 5 + 5 + 10);
    }

    #[test]
    fn test_exercise_on_cardless_unit() {
        let mut store = open_store();
        // Unit 2 has no cards: vacuously card-complete.
        assert!(store.complete_exercise(2, today()));
        assert_eq!(store.points(), 10);
    }

    #[test]
    fn test_exercise_idempotent_and_streak_once_per_day() {
        let mut store = open_store();

        store.complete_exercise(2, today());
        assert_eq!(store.streak().count, 1);

        // Second completion the same day: flag already set, no-op.
        assert!(!store.complete_exercise(2, today()));
        assert_eq!(store.streak().count, 1);
        assert_eq!(store.points(), 10);
    }

    #[test]
    fn test_streak_continues_across_days() {
        let mut store = open_store();
        let yesterday = today().pred_opt().unwrap();

        store.complete_exercise(2, yesterday);
        assert_eq!(store.streak().count, 1);

        complete_unit_cards(&mut store, 1);
        store.complete_exercise(1, today());
        assert_eq!(store.streak().count, 2);
        assert_eq!(store.streak().last_date, Some(today()));
    }

    #[test]
    fn test_reward_gated_behind_exercise() {
        let mut store = open_store();

        assert!(!store.claim_reward(2));
        assert!(!store.unit_progress(2).reward_claimed);
        assert_eq!(store.points(), 0);

        store.complete_exercise(2, today());
        assert!(store.claim_reward(2));
        assert!(store.unit_progress(2).reward_claimed);
        // 10 exercise + 15 reward (unit 2)
        assert_eq!(store.points(), 25);

        // Claiming again is a no-op
        assert!(!store.claim_reward(2));
        assert_eq!(store.points(), 25);
    }

    #[test]
    fn test_claim_reward_unknown_unit_is_noop() {
        let mut store = open_store();
        assert!(!store.claim_reward(99));
        assert_eq!(store.points(), 0);
    }

    #[test]
    fn test_full_unit_scenario_totals_forty() {
        // Spec scenario: 2 cards, exercise, reward worth 20 → 5+5+10+20.
        let mut store = open_store();

        store.complete_card(1, "a");
        store.complete_card(1, "b");
        store.complete_exercise(1, today());
        store.claim_reward(1);

        assert_eq!(store.points(), 40);
        assert!(store.is_unit_completed(1));
    }

    #[test]
    fn test_completed_units_count_and_level_unlock() {
        let mut store = open_store();
        assert_eq!(store.completed_units_count(1), 0);
        assert!(!store.level_unlocked(1));

        complete_unit(&mut store, 1);
        complete_unit(&mut store, 2);

        assert_eq!(store.completed_units_count(1), 2);
        assert!(store.level_unlocked(1));
        assert_eq!(store.unlocked_levels(), vec![(1, true), (2, true)]);
    }

    #[test]
    fn test_admin_override_unlocks_later_levels() {
        let mut store = open_store();
        assert!(!store.level_unlocked(1));

        assert!(store.set_admin(true));
        assert!(store.is_admin());
        assert!(store.level_unlocked(1));

        // Idempotent
        assert!(!store.set_admin(true));
    }

    #[test]
    fn test_unlock_override_not_persisted() {
        let backend = Arc::new(MemoryProgressBackend::new());
        let mut store =
            ProgressStore::open(Arc::new(sample_catalog()), Arc::clone(&backend), today());

        store.set_unlock_override(true);
        assert!(store.is_admin());
        assert!(store.level_unlocked(1));
        assert_eq!(store.unlocked_levels(), vec![(1, true), (2, true)]);
        // Out of range stays locked even under override
        assert!(!store.level_unlocked(9));

        // Override alone never touches storage
        assert!(backend.is_empty());
        store.complete_card(1, "a");
        let doc = backend.load().unwrap().unwrap();
        assert_eq!(doc["isAdmin"], false);
    }

    #[test]
    fn test_mutations_persist_after_every_write() {
        let backend = Arc::new(MemoryProgressBackend::new());
        let mut store =
            ProgressStore::open(Arc::new(sample_catalog()), Arc::clone(&backend), today());

        store.complete_card(1, "a");

        let doc = backend.load().unwrap().unwrap();
        assert_eq!(doc["userPoints"], 5);
        assert_eq!(
            doc["userProgress"]["1"]["completedCards"],
            serde_json::json!(["a"])
        );
    }

    #[test]
    fn test_load_never_writes() {
        let backend = Arc::new(MemoryProgressBackend::new());
        let mut store = ProgressStore::new(Arc::new(sample_catalog()), Arc::clone(&backend));
        store.load(today());

        // Nothing stored yet: load must not clobber storage with defaults.
        assert!(backend.is_empty());
    }

    #[test]
    fn test_reload_roundtrip_preserves_state() {
        let backend = Arc::new(MemoryProgressBackend::new());
        let catalog = Arc::new(sample_catalog());

        let mut store = ProgressStore::open(Arc::clone(&catalog), Arc::clone(&backend), today());
        store.complete_card(1, "b");
        store.complete_card(1, "a");
        store.complete_exercise(1, today());
        let points = store.points();

        let reloaded = ProgressStore::open(catalog, backend, today());

        assert_eq!(reloaded.points(), points);
        assert_eq!(reloaded.unit_progress(1), store.unit_progress(1));
        assert_eq!(reloaded.streak(), store.streak());
    }

    #[test]
    fn test_streak_decay_applied_at_load() {
        let three_days_ago = today().checked_sub_days(chrono::Days::new(3)).unwrap();
        let doc = serde_json::json!({
            "userStreak": { "count": 6, "lastDate": three_days_ago.to_string() }
        });
        let backend = Arc::new(MemoryProgressBackend::with_document(doc));

        let store = ProgressStore::open(Arc::new(sample_catalog()), backend, today());

        assert_eq!(store.streak().count, 0);
        assert_eq!(store.streak().last_date, None);
    }

    #[test]
    fn test_streak_survives_load_when_yesterday() {
        let yesterday = today().pred_opt().unwrap();
        let doc = serde_json::json!({
            "userStreak": { "count": 6, "lastDate": yesterday.to_string() }
        });
        let backend = Arc::new(MemoryProgressBackend::with_document(doc));

        let store = ProgressStore::open(Arc::new(sample_catalog()), backend, today());

        assert_eq!(store.streak().count, 6);
        assert_eq!(store.streak().last_date, Some(yesterday));
    }

    #[test]
    fn test_corrupt_document_falls_back_to_defaults() {
        let backend = Arc::new(MemoryProgressBackend::with_document(
            serde_json::json!("total garbage"),
        ));

        let store = ProgressStore::open(Arc::new(sample_catalog()), backend, today());

        assert!(store.is_loaded());
        assert_eq!(store.points(), 0);
    }

    #[test]
    fn test_write_failure_keeps_memory_authoritative() {
        let backend = Arc::new(MemoryProgressBackend::new());
        let mut store =
            ProgressStore::open(Arc::new(sample_catalog()), Arc::clone(&backend), today());

        backend.set_fail_writes(true);
        assert!(store.complete_card(1, "a"));

        // In-memory state advanced even though the save failed.
        assert_eq!(store.points(), 5);
        assert!(backend.is_empty());

        // A later successful write flushes the latest state.
        backend.set_fail_writes(false);
        store.complete_card(1, "b");
        let doc = backend.load().unwrap().unwrap();
        assert_eq!(doc["userPoints"], 10);
    }

    #[test]
    fn test_stale_unit_progress_retained_but_ignored() {
        let doc = serde_json::json!({
            "userProgress": {
                "77": { "completedCards": ["x"], "exerciseCompleted": true, "rewardClaimed": true }
            }
        });
        let backend = Arc::new(MemoryProgressBackend::with_document(doc));
        let mut store =
            ProgressStore::open(Arc::new(sample_catalog()), Arc::clone(&backend), today());

        // Unit 77 is not in the catalog: ignored by derived reads.
        assert!(!store.is_unit_completed(77));
        assert_eq!(store.completed_units_count(1), 0);

        // A later save keeps the stale entry on disk.
        store.complete_card(1, "a");
        let saved = backend.load().unwrap().unwrap();
        assert!(saved["userProgress"].get("77").is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: any interleaving of repeated completes awards each
            // item's points exactly once.
            #[test]
            fn prop_repeated_completes_award_once(ops in proptest::collection::vec(0u8..4, 1..40)) {
                let mut store = open_store();

                for op in ops {
                    match op {
                        0 => { store.complete_card(1, "a"); }
                        1 => { store.complete_card(1, "b"); }
                        2 => { store.complete_exercise(1, today()); }
                        _ => { store.claim_reward(1); }
                    }
                }

                let progress = store.unit_progress(1);
                let mut expected = 0u64;
                expected += progress.completed_cards.len() as u64 * 5;
                if progress.exercise_completed {
                    expected += 10;
                }
                if progress.reward_claimed {
                    expected += 20;
                }
                prop_assert_eq!(store.points(), expected);

                // Gating invariants hold at every end state
                if progress.reward_claimed {
                    prop_assert!(progress.exercise_completed);
                }
                if progress.exercise_completed {
                    prop_assert_eq!(progress.completed_cards.len(), 2);
                }
            }
        }
    }
}
