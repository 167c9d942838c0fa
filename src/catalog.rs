//! Curriculum catalog for trek.
//!
//! The catalog is an ordered, read-only tree of levels, units, cards and
//! sections supplied whole at startup. The core never mutates it; progress
//! and unlock state live in the progress store and are derived against the
//! catalog by the engine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrekError};

/// Unit whose exercise offers the extra (state-free) recording action.
pub const EVALUATION_UNIT_ID: u32 = 10;

/// The full curriculum catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    /// Application metadata (name, fixed locale and direction).
    pub app: AppInfo,
    /// Ordered levels; position defines the unlock chain.
    pub levels: Vec<Level>,
}

/// Application metadata carried with the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppInfo {
    pub name: String,
    pub locale: String,
    pub rtl: bool,
}

/// A top-level curriculum grouping. Completing every unit in a level
/// unlocks the next level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Level {
    /// 1-based ordinal id; catalog order is the total order.
    pub level_id: u32,
    pub title: String,
    /// Teaser text shown while the level is locked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teaser: Option<String>,
    pub units: Vec<Unit>,
}

/// A themed sub-lesson: cards, one exercise, one reward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    /// Globally unique across all levels, never reused.
    pub unit_id: u32,
    pub title: String,
    pub cards: Vec<Card>,
    pub exercise: Exercise,
    pub reward: Reward,
}

/// A multi-section content item, completed by opening all sections in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    /// Unique within the owning unit.
    pub card_id: String,
    pub title: String,
    pub sections: Vec<Section>,
}

/// One content section within a card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub body: String,
}

/// The four fixed content categories a section can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Concept,
    Insight,
    Evidence,
    Practice,
}

impl SectionKind {
    /// All categories in their canonical order.
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Concept,
        SectionKind::Insight,
        SectionKind::Evidence,
        SectionKind::Practice,
    ];
}

/// A unit's exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub title: String,
    pub instructions: String,
    pub cta_label: String,
}

/// A unit's reward, claimed on entering the reward stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reward {
    pub badge: String,
    pub points: u64,
    pub message: String,
}

impl Catalog {
    /// Load a catalog from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| TrekError::storage(path, e))?;
        Self::from_json_str(&content)
    }

    /// Parse a catalog from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate structural invariants: 1-based consecutive level ids,
    /// globally unique unit ids, card ids unique within their unit.
    pub fn validate(&self) -> Result<()> {
        let mut seen_units = std::collections::HashSet::new();

        for (index, level) in self.levels.iter().enumerate() {
            let expected = index as u32 + 1;
            if level.level_id != expected {
                return Err(TrekError::catalog(format!(
                    "level at position {} has id {}, expected {}",
                    index, level.level_id, expected
                )));
            }

            for unit in &level.units {
                if !seen_units.insert(unit.unit_id) {
                    return Err(TrekError::catalog(format!(
                        "duplicate unit id {}",
                        unit.unit_id
                    )));
                }

                let mut seen_cards = std::collections::HashSet::new();
                for card in &unit.cards {
                    if !seen_cards.insert(card.card_id.as_str()) {
                        return Err(TrekError::catalog(format!(
                            "duplicate card id '{}' in unit {}",
                            card.card_id, unit.unit_id
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Look up a level by id.
    pub fn level(&self, level_id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.level_id == level_id)
    }

    /// Look up a unit by id, across all levels.
    pub fn unit(&self, unit_id: u32) -> Option<&Unit> {
        self.levels
            .iter()
            .flat_map(|l| l.units.iter())
            .find(|u| u.unit_id == unit_id)
    }

    /// Id of the level containing the given unit.
    pub fn level_of_unit(&self, unit_id: u32) -> Option<u32> {
        self.levels
            .iter()
            .find(|l| l.units.iter().any(|u| u.unit_id == unit_id))
            .map(|l| l.level_id)
    }

    /// Reward point value for a unit, if the unit exists.
    pub fn reward_points(&self, unit_id: u32) -> Option<u64> {
        self.unit(unit_id).map(|u| u.reward.points)
    }

    /// Number of cards in a unit, if the unit exists.
    pub fn card_count(&self, unit_id: u32) -> Option<usize> {
        self.unit(unit_id).map(|u| u.cards.len())
    }

    /// Whether a unit's exercise is the evaluation exercise.
    pub fn is_evaluation_unit(&self, unit_id: u32) -> bool {
        unit_id == EVALUATION_UNIT_ID
    }
}

impl Unit {
    /// Ordered card ids for this unit.
    pub fn card_ids(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|c| c.card_id.as_str())
    }

    /// Whether the given id names one of this unit's cards.
    pub fn has_card(&self, card_id: &str) -> bool {
        self.cards.iter().any(|c| c.card_id == card_id)
    }
}
