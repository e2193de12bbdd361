//! Derived labels shown alongside the player's state.
use serde::Serialize;

use crate::clock::Moment;
use crate::constants::COMBO_WINDOW_MS;
use crate::state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnergyStatus {
    Legendary,
    Stable,
    Recovering,
    Critical,
}

impl EnergyStatus {
    #[must_use]
    pub const fn from_energy(energy: i32) -> Self {
        match energy {
            80.. => Self::Legendary,
            60..=79 => Self::Stable,
            40..=59 => Self::Recovering,
            _ => Self::Critical,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Legendary => "Legendary",
            Self::Stable => "Stable",
            Self::Recovering => "Recovering",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Badge {
    Apprentice,
    MomentumBuilder,
    FixArchitect,
    Whisperer,
    QuantumFixmaster,
}

impl Badge {
    #[must_use]
    pub const fn from_score(score: i64) -> Self {
        match score {
            400.. => Self::QuantumFixmaster,
            250..=399 => Self::Whisperer,
            140..=249 => Self::FixArchitect,
            60..=139 => Self::MomentumBuilder,
            _ => Self::Apprentice,
        }
    }

    /// Display title; the whisperer badge carries the persona's name.
    #[must_use]
    pub fn title(self, persona: &str) -> String {
        match self {
            Self::QuantumFixmaster => "Quantum Fixmaster".to_string(),
            Self::Whisperer => format!("{persona} Whisperer"),
            Self::FixArchitect => "Fix Architect".to_string(),
            Self::MomentumBuilder => "Momentum Builder".to_string(),
            Self::Apprentice => "Apprentice".to_string(),
        }
    }
}

/// Flavor line keyed on energy.
#[must_use]
pub fn mood_line(persona: &str, energy: i32) -> String {
    match energy {
        85.. => format!("{persona} is operating at superhero settings. Physics is nervous."),
        65..=84 => format!("{persona} is strong. Productivity tools are asking for mercy."),
        45..=64 => format!("{persona} is warming up. Stand back and secure loose objects."),
        _ => format!("{persona} is low energy, but still stronger than most deadlines."),
    }
}

/// Milliseconds left in the combo window; the full window when no chain is live.
#[must_use]
pub fn combo_time_left_ms(state: &PlayerState, now: &Moment) -> i64 {
    match state.last_fix_at {
        Some(last) if state.combo_chain > 0 => (COMBO_WINDOW_MS - now.since(last)).max(0),
        _ => COMBO_WINDOW_MS,
    }
}

/// Whole seconds left in the combo window, rounded up.
#[must_use]
pub fn combo_seconds_left(state: &PlayerState, now: &Moment) -> i64 {
    let ms = combo_time_left_ms(state, now);
    ms.div_euclid(1_000) + i64::from(ms.rem_euclid(1_000) > 0)
}

/// Snapshot of every derived label for one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub energy_status: EnergyStatus,
    pub badge: String,
    pub mood_line: String,
    pub combo_seconds_left: i64,
    pub combo_hot: bool,
}

impl Standing {
    #[must_use]
    pub fn compute(state: &PlayerState, persona: &str, now: &Moment) -> Self {
        Self {
            energy_status: EnergyStatus::from_energy(state.energy),
            badge: Badge::from_score(state.score).title(persona),
            mood_line: mood_line(persona, state.energy),
            combo_seconds_left: combo_seconds_left(state, now),
            combo_hot: state.combo_chain >= 3,
        }
    }
}
