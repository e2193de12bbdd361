//! Repair Lab Engine
//!
//! Platform-agnostic core of the Repair Lab recovery coach: stochastic content
//! generators (fix plans, challenges, insights, forecasts) and the progression
//! state machine that turns completed work into score, energy, streaks, combos
//! and achievements. No UI, transport or storage backend lives here.

pub mod achievements;
pub mod catalog;
pub mod challenge;
pub mod clock;
pub mod config;
pub mod constants;
pub mod content;
pub mod events;
pub mod focus;
pub mod forecast;
pub mod insight;
pub mod numbers;
pub mod persistence;
pub mod plan;
pub mod progression;
pub mod rng;
pub mod sampler;
pub mod session;
pub mod standing;
pub mod state;
#[cfg(feature = "async")]
pub mod ticker;

// Re-export commonly used types
pub use achievements::{Achievement, AchievementId, AchievementTracker, recompute_achievements};
pub use catalog::{CatalogError, MoodCatalog, MoodProfile, WeatherKind};
pub use challenge::{Challenge, synthesize_challenge};
pub use clock::{Clock, ManualClock, Moment, SystemClock};
pub use config::{ConfigError, SessionConfig};
pub use content::{
    ContentError, ContentService, ForecastQuery, HealthReport, LocalContent, PlanQuery,
};
pub use events::{ProgressionEvent, Transition};
pub use focus::{FocusError, FocusPhase, FocusTick, FocusTimer};
pub use forecast::{ForecastPoint, ForecastReport, synthesize_forecast};
pub use insight::{InsightReport, WeatherImpact, synthesize_insight};
pub use persistence::{MemoryStorage, PersistenceError};
pub use plan::{FixPlan, PlanContext, synthesize_plan};
pub use progression::{ChaosRoll, ProgressionEngine};
pub use rng::RngBundle;
pub use sampler::weighted_pick;
pub use session::{LabSession, RequestKind, RequestTicket};
pub use standing::{Badge, EnergyStatus, Standing};
pub use state::{HistoryEntry, PlayerState};

/// Trait for abstracting the persisted snapshot slot.
/// Platform-specific implementations should provide this
pub trait StateStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the raw snapshot, `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    fn load_snapshot(&self) -> Result<Option<String>, Self::Error>;

    /// Replace the snapshot with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_snapshot(&self, snapshot: &str) -> Result<(), Self::Error>;

    /// Remove the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be cleared.
    fn clear_snapshot(&self) -> Result<(), Self::Error>;
}

/// Entry point binding a storage backend to session settings.
pub struct LabEngine<S>
where
    S: StateStorage + Clone,
{
    storage: S,
    config: SessionConfig,
}

impl<S> LabEngine<S>
where
    S: StateStorage + Clone,
{
    /// Create a new engine with the provided storage and settings
    pub const fn new(storage: S, config: SessionConfig) -> Self {
        Self { storage, config }
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Content generator seeded from the config (entropy when unseeded).
    #[must_use]
    pub fn content_with_clock<K: Clock>(&self, clock: K) -> LocalContent<K> {
        let rng = self
            .config
            .seed
            .map_or_else(RngBundle::from_entropy, RngBundle::from_user_seed);
        LocalContent::new(rng, clock).with_persona(self.config.persona.clone())
    }

    /// Open a session on the system clock, restoring saved progress.
    #[must_use]
    pub fn create_session(&self) -> LabSession<LocalContent<SystemClock>, S> {
        self.create_session_with_clock(SystemClock)
    }

    /// Open a session whose content timestamps come from `clock`.
    #[must_use]
    pub fn create_session_with_clock<K: Clock>(&self, clock: K) -> LabSession<LocalContent<K>, S> {
        LabSession::new(
            self.content_with_clock(clock),
            self.storage.clone(),
            self.config.clone(),
        )
    }

    /// Load the saved state without opening a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or holds malformed JSON.
    pub fn load_state(&self) -> Result<Option<PlayerState>, PersistenceError> {
        let Some(raw) = self
            .storage
            .load_snapshot()
            .map_err(|err| PersistenceError::Storage(err.to_string()))?
        else {
            return Ok(None);
        };
        let mut state = PlayerState::from_snapshot(&raw)
            .map_err(|err| PersistenceError::Malformed(err.to_string()))?;
        state.sanitize();
        Ok(Some(state))
    }

    /// Delete saved progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be cleared.
    pub fn clear_state(&self) -> Result<(), PersistenceError> {
        self.storage
            .clear_snapshot()
            .map_err(|err| PersistenceError::Storage(err.to_string()))
    }
}
