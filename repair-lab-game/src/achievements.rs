//! Threshold achievements derived from player state.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::state::PlayerState;

/// Achievement identifiers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    #[serde(rename = "first-fix")]
    FirstFix,
    #[serde(rename = "streak-3")]
    Streak3,
    #[serde(rename = "score-200")]
    Score200,
    #[serde(rename = "combo-3")]
    Combo3,
    #[serde(rename = "focus-2")]
    Focus2,
}

impl AchievementId {
    pub const ALL: [Self; 5] = [
        Self::FirstFix,
        Self::Streak3,
        Self::Score200,
        Self::Combo3,
        Self::Focus2,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstFix => "first-fix",
            Self::Streak3 => "streak-3",
            Self::Score200 => "score-200",
            Self::Combo3 => "combo-3",
            Self::Focus2 => "focus-2",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::FirstFix => "First Contact",
            Self::Streak3 => "3-Day Momentum",
            Self::Score200 => "Score Hunter",
            Self::Combo3 => "Combo Crafter",
            Self::Focus2 => "Deep Work Pilot",
        }
    }

    /// Whether the state meets this achievement's threshold.
    #[must_use]
    pub fn is_met(self, state: &PlayerState) -> bool {
        match self {
            Self::FirstFix => state.fixes_count >= 1,
            Self::Streak3 => state.streak >= 3,
            Self::Score200 => state.score >= 200,
            Self::Combo3 => state.combo_multiplier >= 3.0,
            Self::Focus2 => state.focus_completed >= 2,
        }
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read model of one achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub unlocked: bool,
}

/// Full achievement list for a state, in display order.
#[must_use]
pub fn achievements_for(state: &PlayerState) -> Vec<Achievement> {
    AchievementId::ALL
        .into_iter()
        .map(|id| Achievement {
            id,
            title: id.title().to_string(),
            unlocked: id.is_met(state),
        })
        .collect()
}

/// Set of achievements currently unlocked by `state`.
#[must_use]
pub fn recompute_achievements(state: &PlayerState) -> BTreeSet<AchievementId> {
    AchievementId::ALL
        .into_iter()
        .filter(|id| id.is_met(state))
        .collect()
}

/// Edge detector: remembers the last unlocked set and reports only ids that
/// flipped from locked to unlocked since the previous observation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementTracker {
    known: BTreeSet<AchievementId>,
}

impl AchievementTracker {
    /// Tracker primed with whatever `state` already unlocks.
    #[must_use]
    pub fn primed(state: &PlayerState) -> Self {
        Self {
            known: recompute_achievements(state),
        }
    }

    /// Re-derive the unlocked set and return the newly unlocked ids in
    /// display order.
    pub fn observe(&mut self, state: &PlayerState) -> Vec<AchievementId> {
        let current = recompute_achievements(state);
        let fresh: Vec<AchievementId> = current.difference(&self.known).copied().collect();
        self.known = current;
        fresh
    }

    #[must_use]
    pub const fn known(&self) -> &BTreeSet<AchievementId> {
        &self.known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_follow_state_fields() {
        let mut state = PlayerState::default();
        assert!(recompute_achievements(&state).is_empty());
        state.fixes_count = 1;
        state.streak = 3;
        state.score = 200;
        state.combo_multiplier = 3.0;
        state.focus_completed = 2;
        assert_eq!(recompute_achievements(&state).len(), 5);
        state.combo_multiplier = 2.9;
        assert!(!AchievementId::Combo3.is_met(&state));
    }

    #[test]
    fn score_unlock_fires_once() {
        let mut state = PlayerState {
            score: 199,
            ..PlayerState::default()
        };
        let mut tracker = AchievementTracker::primed(&state);
        assert!(tracker.observe(&state).is_empty());
        state.score = 200;
        assert_eq!(tracker.observe(&state), vec![AchievementId::Score200]);
        state.score = 450;
        assert!(tracker.observe(&state).is_empty());
    }

    #[test]
    fn primed_tracker_ignores_existing_unlocks() {
        let state = PlayerState {
            fixes_count: 3,
            score: 500,
            ..PlayerState::default()
        };
        let mut tracker = AchievementTracker::primed(&state);
        assert!(tracker.observe(&state).is_empty());
        assert!(tracker.known().contains(&AchievementId::FirstFix));
    }

    #[test]
    fn relocking_then_unlocking_fires_again() {
        let mut state = PlayerState {
            combo_multiplier: 3.4,
            ..PlayerState::default()
        };
        let mut tracker = AchievementTracker::default();
        assert_eq!(tracker.observe(&state), vec![AchievementId::Combo3]);
        state.combo_multiplier = 1.0;
        assert!(tracker.observe(&state).is_empty());
        state.combo_multiplier = 3.0;
        assert_eq!(tracker.observe(&state), vec![AchievementId::Combo3]);
    }

    #[test]
    fn ids_serialize_to_kebab_keys() {
        let json = serde_json::to_string(&AchievementId::Streak3).unwrap();
        assert_eq!(json, "\"streak-3\"");
        let listed = achievements_for(&PlayerState::default());
        assert_eq!(listed.len(), 5);
        assert_eq!(listed[0].title, "First Contact");
        assert!(listed.iter().all(|a| !a.unlocked));
    }
}
