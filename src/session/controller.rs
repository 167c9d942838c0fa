//! Screen navigation state.
//!
//! The controller never computes unlock eligibility itself; it consults the
//! store's derived flags and rejects invalid selections by staying on the
//! current screen. Selecting a locked level or an unknown id is a no-op,
//! never an error.

use crate::progress::ProgressStore;
use crate::storage::ProgressBackend;

/// Current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Level {
        level_id: u32,
    },
    Unit {
        level_id: u32,
        unit_id: u32,
    },
}

/// Navigation controller; lives only for the process lifetime.
#[derive(Debug, Default)]
pub struct SessionController {
    screen: Screen,
}

impl SessionController {
    /// Start at the home screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Enter a level from the home screen.
    ///
    /// Rejected (no-op, returns false) when the level is unknown or locked.
    pub fn select_level<B: ProgressBackend>(
        &mut self,
        store: &ProgressStore<B>,
        level_id: u32,
    ) -> bool {
        let unlocked = store
            .unlocked_levels()
            .into_iter()
            .any(|(id, unlocked)| id == level_id && unlocked);
        if !unlocked {
            return false;
        }

        self.screen = Screen::Level { level_id };
        true
    }

    /// Enter a unit from its level screen.
    ///
    /// Rejected when not currently on a level screen or when the unit does
    /// not belong to that level.
    pub fn select_unit<B: ProgressBackend>(
        &mut self,
        store: &ProgressStore<B>,
        unit_id: u32,
    ) -> bool {
        let Screen::Level { level_id } = self.screen else {
            return false;
        };
        if store.catalog().level_of_unit(unit_id) != Some(level_id) {
            return false;
        }

        self.screen = Screen::Unit { level_id, unit_id };
        true
    }

    /// Step back one screen: Unit → Level → Home.
    pub fn back(&mut self) {
        self.screen = match self.screen {
            Screen::Unit { level_id, .. } => Screen::Level { level_id },
            Screen::Level { .. } => Screen::Home,
            Screen::Home => Screen::Home,
        };
    }
}
