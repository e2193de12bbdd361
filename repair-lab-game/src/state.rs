//! Long-lived player progression state and its snapshot format.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{COMBO_BASE_TENTHS, DEFAULT_ENERGY, ENERGY_MAX, HISTORY_LIMIT};
use crate::numbers::{round1_multiplier, tenths_to_multiplier};
use crate::plan::FixPlan;

/// One completed fix, newest first in [`PlayerState::history`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub mood: String,
    pub confidence: i32,
    pub energy_gain: i32,
    /// Completion time in epoch milliseconds.
    pub at: i64,
}

impl HistoryEntry {
    #[must_use]
    pub fn from_plan(plan: &FixPlan, at: i64) -> Self {
        Self {
            id: plan.id.clone(),
            mood: plan.mood.clone(),
            confidence: plan.confidence,
            energy_gain: plan.energy_gain,
            at,
        }
    }
}

/// Persistent progression state. Mutated only by the progression engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub energy: i32,
    pub score: i64,
    pub streak: u32,
    #[serde(with = "date_or_empty")]
    pub last_fix_date: Option<NaiveDate>,
    pub last_fix_at: Option<i64>,
    pub history: Vec<HistoryEntry>,
    pub fixes_count: u32,
    pub combo_multiplier: f64,
    pub combo_chain: u32,
    pub focus_completed: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            energy: DEFAULT_ENERGY,
            score: 0,
            streak: 0,
            last_fix_date: None,
            last_fix_at: None,
            history: Vec::new(),
            fixes_count: 0,
            combo_multiplier: tenths_to_multiplier(COMBO_BASE_TENTHS),
            combo_chain: 0,
            focus_completed: 0,
        }
    }
}

impl PlayerState {
    /// Add energy, capped at the maximum.
    pub fn gain_energy(&mut self, amount: i32) {
        self.energy = self.energy.saturating_add(amount).clamp(0, ENERGY_MAX);
    }

    /// Prepend a history entry and keep only the most recent entries.
    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.insert(0, entry);
        self.history.truncate(HISTORY_LIMIT);
    }

    /// Force every field back into its invariant range. Restored snapshots
    /// may come from older builds or hand edits.
    pub fn sanitize(&mut self) {
        self.energy = self.energy.clamp(0, ENERGY_MAX);
        self.score = self.score.max(0);
        self.combo_multiplier = round1_multiplier(self.combo_multiplier);
        self.history.truncate(HISTORY_LIMIT);
    }

    /// Serialize to the snapshot JSON stored by the persistence collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_snapshot(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// `Option<NaiveDate>` stored as `"YYYY-MM-DD"`, with `""` for "never".
mod date_or_empty {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.collect_str(&date.format(FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDate::parse_from_str(text, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
