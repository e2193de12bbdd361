//! Typed events emitted by progression transitions.
//!
//! A presentation layer subscribes to these instead of the engine driving
//! sound, confetti or modals itself.
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementId;
use crate::catalog::WeatherKind;
use crate::persistence::PersistenceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressionEvent {
    /// A generated plan is pending and awaiting completion.
    PlanReady { plan_id: String, mood: String },
    /// Base reward for a completed fix.
    FixApplied {
        plan_id: String,
        score_gain: i64,
        energy_gain: i32,
        streak: u32,
        combo_chain: u32,
        combo_multiplier: f64,
    },
    /// Flat bonus for a long combo chain, reported apart from the fix reward.
    GodmodeActivated { combo_chain: u32, bonus: i64 },
    /// The combo window lapsed and the multiplier fell back to x1.0.
    ComboDropped { combo_chain: u32 },
    ChallengeAccepted { score_gain: i64, energy_gain: i32 },
    FocusCompleted { score_gain: i64, energy_gain: i32 },
    AchievementUnlocked { id: AchievementId, title: String },
    /// Chaos mode rerolled the selection and nudged the multiplier.
    ChaosBoost {
        intensity: i32,
        weather: WeatherKind,
        combo_multiplier: f64,
    },
    ProgressReset,
}

impl ProgressionEvent {
    /// Short headline for the event.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::PlanReady { .. } => "Fix Plan Generated".to_string(),
            Self::FixApplied { score_gain, .. } if *score_gain > 160 => {
                "ULTRA FIX SUCCESS".to_string()
            }
            Self::FixApplied { .. } => "Katinka Fixed".to_string(),
            Self::GodmodeActivated { .. } => "GODMODE ACTIVATED".to_string(),
            Self::ComboDropped { .. } => "Combo Dropped".to_string(),
            Self::ChallengeAccepted { .. } => "Challenge Accepted".to_string(),
            Self::FocusCompleted { .. } => "Focus Mission Complete".to_string(),
            Self::AchievementUnlocked { .. } => "Achievement Unlocked".to_string(),
            Self::ChaosBoost { .. } => "Chaos Mode".to_string(),
            Self::ProgressReset => "Lab Reset".to_string(),
        }
    }

    /// One-line detail for the event.
    #[must_use]
    pub fn subtitle(&self) -> String {
        match self {
            Self::PlanReady { mood, .. } => {
                format!("{mood} detected. Complete the plan to apply rewards.")
            }
            Self::FixApplied {
                score_gain,
                energy_gain,
                ..
            } => format!("+{score_gain} score • +{energy_gain} energy"),
            Self::GodmodeActivated { combo_chain, bonus } => {
                format!("Perfect {combo_chain}x chain • +{bonus} bonus score")
            }
            Self::ComboDropped { .. } => "Window missed, multiplier reset to x1.0".to_string(),
            Self::ChallengeAccepted { score_gain, .. } => format!("+{score_gain} score boost"),
            Self::FocusCompleted {
                score_gain,
                energy_gain,
            } => format!("+{score_gain} score • +{energy_gain} energy"),
            Self::AchievementUnlocked { title, .. } => title.clone(),
            Self::ChaosBoost {
                intensity,
                weather,
                combo_multiplier,
            } => format!("Intensity {intensity} • {weather} • x{combo_multiplier:.1}"),
            Self::ProgressReset => "Progress cleared".to_string(),
        }
    }
}

/// Result of one transition: ordered events plus any non-fatal persistence
/// warning raised while snapshotting.
#[derive(Debug, Default)]
pub struct Transition {
    pub events: Vec<ProgressionEvent>,
    pub warning: Option<PersistenceError>,
}

impl Transition {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of score changes carried by the events.
    #[must_use]
    pub fn score_delta(&self) -> i64 {
        self.events
            .iter()
            .map(|event| match event {
                ProgressionEvent::FixApplied { score_gain, .. }
                | ProgressionEvent::ChallengeAccepted { score_gain, .. }
                | ProgressionEvent::FocusCompleted { score_gain, .. } => *score_gain,
                ProgressionEvent::GodmodeActivated { bonus, .. } => *bonus,
                _ => 0,
            })
            .sum()
    }

    /// Achievement ids unlocked during this transition.
    #[must_use]
    pub fn unlocked(&self) -> Vec<AchievementId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ProgressionEvent::AchievementUnlocked { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }
}
