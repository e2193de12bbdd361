//! Focus session countdown driven by explicit one-second ticks.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{FOCUS_DEFAULT_MINUTES, FOCUS_MAX_MINUTES, FOCUS_MIN_MINUTES};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FocusError {
    #[error("focus length cannot change while a session is running")]
    SessionRunning,
    #[error("focus length must be between {min} and {max} minutes, got {minutes}")]
    InvalidLength { minutes: u32, min: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTick {
    /// Timer was not running; nothing changed.
    Idle,
    Counting { remaining_secs: u32 },
    /// The countdown reached zero on this tick.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    minutes: u32,
    remaining_secs: u32,
    phase: FocusPhase,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::with_minutes(FOCUS_DEFAULT_MINUTES)
    }
}

impl FocusTimer {
    /// Idle timer loaded with `minutes`, clamped into the valid range.
    #[must_use]
    pub fn with_minutes(minutes: u32) -> Self {
        let minutes = minutes.clamp(FOCUS_MIN_MINUTES, FOCUS_MAX_MINUTES);
        Self {
            minutes,
            remaining_secs: minutes * 60,
            phase: FocusPhase::Idle,
        }
    }

    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub const fn phase(&self) -> FocusPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, FocusPhase::Running)
    }

    /// Begin or resume counting. A spent timer reloads the full length first.
    pub fn start(&mut self) {
        if self.remaining_secs == 0 {
            self.remaining_secs = self.minutes * 60;
        }
        self.phase = FocusPhase::Running;
    }

    pub fn pause(&mut self) {
        if self.is_running() {
            self.phase = FocusPhase::Paused;
        }
    }

    /// Stop and reload the configured length.
    pub fn reset(&mut self) {
        self.phase = FocusPhase::Idle;
        self.remaining_secs = self.minutes * 60;
    }

    /// Change the session length.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::SessionRunning`] while counting and
    /// [`FocusError::InvalidLength`] for lengths outside the allowed range.
    pub fn set_minutes(&mut self, minutes: u32) -> Result<(), FocusError> {
        if self.is_running() {
            return Err(FocusError::SessionRunning);
        }
        if !(FOCUS_MIN_MINUTES..=FOCUS_MAX_MINUTES).contains(&minutes) {
            return Err(FocusError::InvalidLength {
                minutes,
                min: FOCUS_MIN_MINUTES,
                max: FOCUS_MAX_MINUTES,
            });
        }
        self.minutes = minutes;
        self.remaining_secs = minutes * 60;
        if self.phase == FocusPhase::Completed {
            self.phase = FocusPhase::Idle;
        }
        Ok(())
    }

    /// Advance one second. Completion is reported exactly once.
    pub fn tick(&mut self) -> FocusTick {
        if !self.is_running() {
            return FocusTick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.phase = FocusPhase::Completed;
            return FocusTick::Completed;
        }
        FocusTick::Counting {
            remaining_secs: self.remaining_secs,
        }
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn clock_label(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timer_is_idle_fifteen_minutes() {
        let timer = FocusTimer::default();
        assert_eq!(timer.phase(), FocusPhase::Idle);
        assert_eq!(timer.remaining_secs(), 900);
        assert_eq!(timer.clock_label(), "15:00");
    }

    #[test]
    fn runs_to_completion_once() {
        let mut timer = FocusTimer::with_minutes(1);
        assert_eq!(timer.tick(), FocusTick::Idle);
        timer.start();
        for expected in (1..60).rev() {
            assert_eq!(
                timer.tick(),
                FocusTick::Counting {
                    remaining_secs: expected
                }
            );
        }
        assert_eq!(timer.tick(), FocusTick::Completed);
        assert_eq!(timer.phase(), FocusPhase::Completed);
        assert_eq!(timer.remaining_secs(), 0);
        assert_eq!(timer.tick(), FocusTick::Idle);
        assert_eq!(timer.clock_label(), "00:00");
    }

    #[test]
    fn pause_keeps_remaining_and_start_resumes() {
        let mut timer = FocusTimer::with_minutes(2);
        timer.start();
        timer.tick();
        timer.tick();
        timer.pause();
        assert_eq!(timer.phase(), FocusPhase::Paused);
        assert_eq!(timer.tick(), FocusTick::Idle);
        assert_eq!(timer.remaining_secs(), 118);
        timer.start();
        assert_eq!(timer.clock_label(), "01:58");
        assert!(timer.is_running());
    }

    #[test]
    fn start_after_completion_reloads() {
        let mut timer = FocusTimer::with_minutes(1);
        timer.start();
        while timer.tick() != FocusTick::Completed {}
        timer.start();
        assert_eq!(timer.remaining_secs(), 60);
        assert!(timer.is_running());
    }

    #[test]
    fn reset_stops_and_reloads() {
        let mut timer = FocusTimer::default();
        timer.start();
        timer.tick();
        timer.reset();
        assert_eq!(timer.phase(), FocusPhase::Idle);
        assert_eq!(timer.remaining_secs(), 900);
    }

    #[test]
    fn length_changes_are_guarded() {
        let mut timer = FocusTimer::default();
        timer.start();
        assert_eq!(timer.set_minutes(25), Err(FocusError::SessionRunning));
        timer.pause();
        assert!(matches!(
            timer.set_minutes(0),
            Err(FocusError::InvalidLength { minutes: 0, .. })
        ));
        assert!(timer.set_minutes(181).is_err());
        timer.set_minutes(25).unwrap();
        assert_eq!(timer.remaining_secs(), 1_500);
        assert_eq!(timer.minutes(), 25);
    }
}
