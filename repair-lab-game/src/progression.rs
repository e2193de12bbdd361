//! The stateful scoring core: streaks, combo windows, rewards, achievements.
//!
//! Every transition takes a single [`Moment`] captured by the caller so that
//! the date comparison, the combo window and the history timestamp all agree.
//! Transitions whose preconditions do not hold are silent no-ops and return
//! an empty [`Transition`].
use rand::Rng;
use rand::seq::SliceRandom;

use crate::StateStorage;
use crate::achievements::{Achievement, AchievementTracker, achievements_for};
use crate::catalog::WeatherKind;
use crate::challenge::Challenge;
use crate::clock::Moment;
use crate::constants::{
    CHALLENGE_ENERGY_DIVISOR, CHAOS_BOOST_TENTHS, COMBO_BASE_TENTHS, COMBO_CAP_TENTHS,
    COMBO_STEP_TENTHS, COMBO_WINDOW_MS, FOCUS_ENERGY_REWARD, FOCUS_SCORE_REWARD, GODMODE_BONUS,
    GODMODE_CHAIN, INTENSITY_MAX, INTENSITY_MIN, STREAK_SCORE_PER_DAY,
};
use crate::events::{ProgressionEvent, Transition};
use crate::numbers::{floor_div, multiplier_to_tenths, scale_floor, tenths_to_multiplier};
use crate::persistence::{PersistenceError, persist_state, restore_state};
use crate::plan::FixPlan;
use crate::state::{HistoryEntry, PlayerState};

/// Multiplier (in tenths) for a combo chain of the given length.
#[must_use]
pub fn combo_tenths_for_chain(chain: u32) -> u32 {
    let steps = chain.saturating_sub(1);
    COMBO_BASE_TENTHS
        .saturating_add(steps.saturating_mul(COMBO_STEP_TENTHS))
        .min(COMBO_CAP_TENTHS)
}

/// Selection rerolled by chaos mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaosRoll {
    pub intensity: i32,
    pub weather: WeatherKind,
}

#[derive(Debug)]
pub struct ProgressionEngine<S: StateStorage> {
    state: PlayerState,
    pending_plan: Option<FixPlan>,
    challenge: Option<Challenge>,
    challenge_accepted: bool,
    tracker: AchievementTracker,
    storage: S,
}

impl<S: StateStorage> ProgressionEngine<S> {
    /// Load the persisted snapshot from `storage`. Missing or malformed
    /// snapshots start from defaults; the latter also yields a warning.
    pub fn restore(storage: S) -> (Self, Option<PersistenceError>) {
        let restored = restore_state(&storage);
        (Self::with_state(restored.state, storage), restored.warning)
    }

    /// Engine over an explicit state. Achievements already met by `state`
    /// count as known and will not be reported again.
    pub fn with_state(state: PlayerState, storage: S) -> Self {
        Self {
            tracker: AchievementTracker::primed(&state),
            state,
            pending_plan: None,
            challenge: None,
            challenge_accepted: false,
            storage,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    #[must_use]
    pub const fn pending_plan(&self) -> Option<&FixPlan> {
        self.pending_plan.as_ref()
    }

    #[must_use]
    pub const fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    #[must_use]
    pub const fn challenge_accepted(&self) -> bool {
        self.challenge_accepted
    }

    #[must_use]
    pub fn achievements(&self) -> Vec<Achievement> {
        achievements_for(&self.state)
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Hold `plan` until it is completed. A newer plan replaces the pending one.
    pub fn offer_plan(&mut self, plan: FixPlan) -> Transition {
        if let Some(pending) = &self.pending_plan {
            log::debug!("plan {} replaces pending {}", plan.id, pending.id);
        }
        let event = ProgressionEvent::PlanReady {
            plan_id: plan.id.clone(),
            mood: plan.mood.clone(),
        };
        self.pending_plan = Some(plan);
        Transition {
            events: vec![event],
            warning: None,
        }
    }

    /// Apply the rewards of the pending plan.
    pub fn apply_fix_completion(&mut self, now: &Moment) -> Transition {
        let Some(plan) = self.pending_plan.take() else {
            return Transition::default();
        };
        let state = &mut self.state;

        if state.last_fix_date != Some(now.date) {
            let continued = state
                .last_fix_date
                .is_some_and(|last| Some(last) == now.yesterday());
            state.streak = if continued {
                state.streak.saturating_add(1)
            } else {
                1
            };
            state.last_fix_date = Some(now.date);
        }

        let in_window = state
            .last_fix_at
            .is_some_and(|last| now.since(last) <= COMBO_WINDOW_MS);
        state.combo_chain = if in_window {
            state.combo_chain.saturating_add(1)
        } else {
            1
        };
        let tenths = combo_tenths_for_chain(state.combo_chain);
        state.combo_multiplier = tenths_to_multiplier(tenths);

        let base = i64::from(plan.confidence)
            + i64::from(plan.energy_gain)
            + STREAK_SCORE_PER_DAY * i64::from(state.streak);
        let score_gain = scale_floor(base, state.combo_multiplier);
        state.score = state.score.saturating_add(score_gain);
        state.gain_energy(plan.energy_gain);

        state.fixes_count = state.fixes_count.saturating_add(1);
        state.last_fix_at = Some(now.epoch_ms);
        state.push_history(HistoryEntry::from_plan(&plan, now.epoch_ms));

        let mut events = vec![ProgressionEvent::FixApplied {
            plan_id: plan.id.clone(),
            score_gain,
            energy_gain: plan.energy_gain,
            streak: state.streak,
            combo_chain: state.combo_chain,
            combo_multiplier: state.combo_multiplier,
        }];

        if state.combo_chain >= GODMODE_CHAIN {
            state.score = state.score.saturating_add(GODMODE_BONUS);
            events.push(ProgressionEvent::GodmodeActivated {
                combo_chain: state.combo_chain,
                bonus: GODMODE_BONUS,
            });
        }

        log::debug!(
            "fix {} applied: +{score_gain} score, chain {} at x{:.1}, streak {}",
            plan.id,
            state.combo_chain,
            state.combo_multiplier,
            state.streak
        );
        self.finish(events)
    }

    /// Drop a lapsed combo chain. Chains of one never expire visibly.
    pub fn expire_combo(&mut self, now: &Moment) -> Transition {
        let state = &mut self.state;
        let Some(last) = state.last_fix_at else {
            return Transition::default();
        };
        if state.combo_chain <= 1 || now.since(last) < COMBO_WINDOW_MS {
            return Transition::default();
        }
        let dropped = state.combo_chain;
        state.combo_chain = 0;
        state.combo_multiplier = tenths_to_multiplier(COMBO_BASE_TENTHS);
        state.last_fix_at = None;
        log::debug!("combo chain of {dropped} expired");
        self.finish(vec![ProgressionEvent::ComboDropped {
            combo_chain: dropped,
        }])
    }

    /// Replace the current challenge and clear its accepted flag.
    pub fn offer_challenge(&mut self, challenge: Challenge) {
        self.challenge = Some(challenge);
        self.challenge_accepted = false;
    }

    /// Redeem the current challenge once, scaled by the live multiplier.
    pub fn apply_challenge_acceptance(&mut self) -> Transition {
        let Some(challenge) = &self.challenge else {
            return Transition::default();
        };
        if self.challenge_accepted {
            return Transition::default();
        }
        let score_gain = scale_floor(i64::from(challenge.reward), self.state.combo_multiplier);
        let energy_gain = floor_div(challenge.reward, CHALLENGE_ENERGY_DIVISOR);
        self.challenge_accepted = true;
        self.state.score = self.state.score.saturating_add(score_gain);
        self.state.gain_energy(energy_gain);
        log::debug!("challenge accepted: +{score_gain} score");
        self.finish(vec![ProgressionEvent::ChallengeAccepted {
            score_gain,
            energy_gain,
        }])
    }

    pub fn apply_focus_completion(&mut self) -> Transition {
        self.state.focus_completed = self.state.focus_completed.saturating_add(1);
        self.state.score = self.state.score.saturating_add(FOCUS_SCORE_REWARD);
        self.state.gain_energy(FOCUS_ENERGY_REWARD);
        self.finish(vec![ProgressionEvent::FocusCompleted {
            score_gain: FOCUS_SCORE_REWARD,
            energy_gain: FOCUS_ENERGY_REWARD,
        }])
    }

    /// Reroll intensity and weather and nudge the multiplier upward without
    /// touching the chain.
    pub fn apply_chaos_boost<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (ChaosRoll, Transition) {
        let roll = ChaosRoll {
            intensity: rng.gen_range(INTENSITY_MIN..=INTENSITY_MAX),
            weather: WeatherKind::ALL
                .choose(rng)
                .copied()
                .unwrap_or_default(),
        };
        let tenths = multiplier_to_tenths(self.state.combo_multiplier)
            .saturating_add(CHAOS_BOOST_TENTHS)
            .min(COMBO_CAP_TENTHS);
        self.state.combo_multiplier = tenths_to_multiplier(tenths);
        let transition = self.finish(vec![ProgressionEvent::ChaosBoost {
            intensity: roll.intensity,
            weather: roll.weather,
            combo_multiplier: self.state.combo_multiplier,
        }]);
        (roll, transition)
    }

    /// Return to a fresh player and clear the persisted slot.
    pub fn reset(&mut self) -> Transition {
        self.state = PlayerState::default();
        self.pending_plan = None;
        self.challenge = None;
        self.challenge_accepted = false;
        self.tracker = AchievementTracker::primed(&self.state);
        let warning = self.storage.clear_snapshot().err().map(|err| {
            log::warn!("could not clear snapshot: {err}");
            PersistenceError::Storage(err.to_string())
        });
        log::debug!("progress reset");
        Transition {
            events: vec![ProgressionEvent::ProgressReset],
            warning,
        }
    }

    /// Append achievement unlocks and rewrite the snapshot.
    fn finish(&mut self, mut events: Vec<ProgressionEvent>) -> Transition {
        events.extend(self.tracker.observe(&self.state).into_iter().map(|id| {
            log::debug!("achievement unlocked: {id}");
            ProgressionEvent::AchievementUnlocked {
                id,
                title: id.title().to_string(),
            }
        }));
        let warning = persist_state(&self.storage, &self.state).err();
        if let Some(err) = &warning {
            log::warn!("snapshot not saved: {err}");
        }
        Transition { events, warning }
    }
}
