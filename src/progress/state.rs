//! Persisted progress document types.
//!
//! Wire format (one JSON document, camelCase keys):
//! - `userProgress`: unit id (string key) → `{completedCards, exerciseCompleted, rewardClaimed}`
//! - `userPoints`: integer
//! - `userStreak`: `{count, lastDate: ISO-8601 date or null}`
//! - `isAdmin`: bool
//!
//! `completedCards` is serialized as a sorted list (`BTreeSet` iteration
//! order); the ordering is part of the format, not an artifact. Decoding is
//! tolerant per slice: a malformed slice falls back to its default without
//! failing the rest of the document.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-unit progress. Absent unit = all-default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitProgress {
    /// Completed card ids (membership only; unlock order comes from the catalog).
    pub completed_cards: BTreeSet<String>,
    pub exercise_completed: bool,
    pub reward_claimed: bool,
}

impl UnitProgress {
    /// Whether nothing has been recorded for this unit.
    pub fn is_empty(&self) -> bool {
        self.completed_cards.is_empty() && !self.exercise_completed && !self.reward_claimed
    }
}

/// Consecutive-day exercise streak.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Streak {
    pub count: u32,
    /// Last calendar day with an exercise completion, if any.
    #[serde(rename = "lastDate")]
    pub last_date: Option<NaiveDate>,
}

/// The full in-memory progress state, mirrored to storage after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    /// String-keyed on the wire; keys that don't parse as unit ids are
    /// retained on save but ignored by derived computations.
    pub units: BTreeMap<String, UnitProgress>,
    pub points: u64,
    pub streak: Streak,
    pub admin: bool,
}

impl ProgressState {
    /// Decode a persisted document, recovering each slice independently.
    ///
    /// A missing or malformed slice yields that slice's default and a
    /// warning; it never fails the whole load.
    pub fn from_document(doc: &Value) -> Self {
        let mut state = ProgressState::default();

        match doc.get("userProgress") {
            None => {}
            Some(Value::Object(map)) => {
                for (unit_id, entry) in map {
                    match serde_json::from_value::<UnitProgress>(entry.clone()) {
                        Ok(unit) => {
                            state.units.insert(unit_id.clone(), unit);
                        }
                        Err(e) => {
                            tracing::warn!(
                                unit_id = %unit_id,
                                error = %e,
                                "skipping malformed unit progress entry"
                            );
                        }
                    }
                }
            }
            Some(other) => {
                tracing::warn!(
                    "userProgress is not an object ({}), using empty progress",
                    json_type_name(other)
                );
            }
        }

        match doc.get("userPoints") {
            None => {}
            Some(value) => match serde_json::from_value::<u64>(value.clone()) {
                Ok(points) => state.points = points,
                Err(e) => tracing::warn!(error = %e, "malformed userPoints, using 0"),
            },
        }

        match doc.get("userStreak") {
            None => {}
            Some(value) => match serde_json::from_value::<Streak>(value.clone()) {
                Ok(streak) => state.streak = streak,
                Err(e) => tracing::warn!(error = %e, "malformed userStreak, using empty streak"),
            },
        }

        match doc.get("isAdmin") {
            None => {}
            Some(value) => match value.as_bool() {
                Some(admin) => state.admin = admin,
                None => tracing::warn!("malformed isAdmin, using false"),
            },
        }

        state
    }

    /// Encode the state as the persisted document.
    pub fn to_document(&self) -> Value {
        serde_json::json!({
            "userProgress": self.units,
            "userPoints": self.points,
            "userStreak": self.streak,
            "isAdmin": self.admin,
        })
    }

    /// Progress for a unit, or the default if none recorded. Never inserts.
    pub fn unit(&self, unit_id: u32) -> UnitProgress {
        self.units
            .get(&unit_id.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Mutable progress for a unit, created lazily on first write.
    pub fn unit_mut(&mut self, unit_id: u32) -> &mut UnitProgress {
        self.units.entry(unit_id.to_string()).or_default()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
