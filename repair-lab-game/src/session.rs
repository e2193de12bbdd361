//! Client-side composition of content generation, progression and focus.
use std::collections::VecDeque;

use crate::StateStorage;
use crate::catalog::WeatherKind;
use crate::challenge::Challenge;
use crate::clock::Moment;
use crate::config::SessionConfig;
use crate::constants::EVENT_QUEUE_LIMIT;
use crate::content::{ContentError, ContentService, ForecastQuery, PlanQuery};
use crate::events::{ProgressionEvent, Transition};
use crate::focus::{FocusError, FocusTick, FocusTimer};
use crate::forecast::ForecastReport;
use crate::insight::InsightReport;
use crate::persistence::PersistenceError;
use crate::plan::{FixPlan, normalize_intensity};
use crate::progression::ProgressionEngine;
use crate::rng::RngBundle;
use crate::standing::Standing;
use crate::state::PlayerState;

pub const PLAN_UNAVAILABLE: &str = "Could not reach the fix engine. Try again in a moment.";
pub const CHALLENGE_UNAVAILABLE: &str = "Could not load a challenge right now.";
pub const INTEL_UNAVAILABLE: &str = "Could not fetch intelligence feed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Plan,
    Challenge,
    Intel,
}

impl RequestKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Challenge => "challenge",
            Self::Intel => "intel",
        }
    }
}

/// Tag for an in-flight content request. Deliveries carrying a ticket from
/// before the latest reset are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    kind: RequestKind,
}

impl RequestTicket {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// One player's lab: a content source, the progression engine, a focus
/// timer and the cached intel shown next to them.
#[derive(Debug)]
pub struct LabSession<C: ContentService, S: StateStorage> {
    content: C,
    engine: ProgressionEngine<S>,
    focus: FocusTimer,
    config: SessionConfig,
    rng: RngBundle,
    intensity: i32,
    weather: WeatherKind,
    insight: Option<InsightReport>,
    forecast: Option<ForecastReport>,
    error: Option<&'static str>,
    warning: Option<PersistenceError>,
    generation: u64,
    events: VecDeque<ProgressionEvent>,
}

impl<C: ContentService, S: StateStorage> LabSession<C, S> {
    /// Restore progress from `storage` and set up the session from `config`.
    pub fn new(content: C, storage: S, config: SessionConfig) -> Self {
        let (engine, warning) = ProgressionEngine::restore(storage);
        let rng = config
            .seed
            .map_or_else(RngBundle::from_entropy, RngBundle::from_user_seed);
        Self {
            content,
            engine,
            focus: FocusTimer::with_minutes(config.focus_minutes),
            intensity: normalize_intensity(f64::from(config.default_intensity)),
            weather: config.default_weather,
            config,
            rng,
            insight: None,
            forecast: None,
            error: None,
            warning,
            generation: 0,
            events: VecDeque::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        self.engine.state()
    }

    #[must_use]
    pub const fn engine(&self) -> &ProgressionEngine<S> {
        &self.engine
    }

    #[must_use]
    pub const fn content(&self) -> &C {
        &self.content
    }

    #[must_use]
    pub const fn focus(&self) -> &FocusTimer {
        &self.focus
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn pending_plan(&self) -> Option<&FixPlan> {
        self.engine.pending_plan()
    }

    #[must_use]
    pub const fn challenge(&self) -> Option<&Challenge> {
        self.engine.challenge()
    }

    #[must_use]
    pub const fn insight(&self) -> Option<&InsightReport> {
        self.insight.as_ref()
    }

    #[must_use]
    pub const fn forecast(&self) -> Option<&ForecastReport> {
        self.forecast.as_ref()
    }

    /// Latest user-visible error, cleared when the next request starts.
    #[must_use]
    pub const fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Take the pending persistence warning, if any.
    pub fn take_warning(&mut self) -> Option<PersistenceError> {
        self.warning.take()
    }

    #[must_use]
    pub const fn intensity(&self) -> i32 {
        self.intensity
    }

    #[must_use]
    pub const fn weather(&self) -> WeatherKind {
        self.weather
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_intensity(&mut self, intensity: f64) {
        self.intensity = normalize_intensity(intensity);
    }

    pub const fn set_weather(&mut self, weather: WeatherKind) {
        self.weather = weather;
    }

    /// Events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        self.events.drain(..).collect()
    }

    #[must_use]
    pub fn standing(&self, now: &Moment) -> Standing {
        Standing::compute(self.engine.state(), &self.config.persona, now)
    }

    /// Start a request of `kind` and clear the visible error.
    pub fn ticket(&mut self, kind: RequestKind) -> RequestTicket {
        self.error = None;
        RequestTicket {
            generation: self.generation,
            kind,
        }
    }

    /// Query matching the current intensity and weather selection.
    #[must_use]
    pub fn plan_query(&self) -> PlanQuery {
        PlanQuery::new(f64::from(self.intensity), self.weather.key())
    }

    /// Generate a plan for the current selection and make it pending.
    pub fn request_plan(&mut self) -> bool {
        let ticket = self.ticket(RequestKind::Plan);
        let result = self.content.fix_plan(&self.plan_query());
        self.deliver_plan(ticket, result)
    }

    /// Apply a plan response. Returns whether anything was applied.
    pub fn deliver_plan(&mut self, ticket: RequestTicket, result: Result<FixPlan, ContentError>) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        match result {
            Ok(plan) => {
                let transition = self.engine.offer_plan(plan);
                self.record(transition)
            }
            Err(err) => self.fail(ticket, &err, PLAN_UNAVAILABLE),
        }
    }

    /// Complete the pending plan at `now`.
    pub fn complete_fix(&mut self, now: &Moment) -> bool {
        let transition = self.engine.apply_fix_completion(now);
        self.record(transition)
    }

    pub fn request_challenge(&mut self) -> bool {
        let ticket = self.ticket(RequestKind::Challenge);
        let result = self.content.challenge();
        self.deliver_challenge(ticket, result)
    }

    pub fn deliver_challenge(
        &mut self,
        ticket: RequestTicket,
        result: Result<Challenge, ContentError>,
    ) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        match result {
            Ok(challenge) => {
                self.engine.offer_challenge(challenge);
                true
            }
            Err(err) => self.fail(ticket, &err, CHALLENGE_UNAVAILABLE),
        }
    }

    pub fn accept_challenge(&mut self) -> bool {
        let transition = self.engine.apply_challenge_acceptance();
        self.record(transition)
    }

    /// Refresh insight and forecast together; either failing keeps both caches.
    pub fn refresh_intel(&mut self) -> bool {
        let ticket = self.ticket(RequestKind::Intel);
        let query = ForecastQuery::new(self.config.forecast_days);
        let result = self
            .content
            .insight()
            .and_then(|insight| Ok((insight, self.content.forecast(&query)?)));
        self.deliver_intel(ticket, result)
    }

    pub fn deliver_intel(
        &mut self,
        ticket: RequestTicket,
        result: Result<(InsightReport, ForecastReport), ContentError>,
    ) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        match result {
            Ok((insight, forecast)) => {
                self.insight = Some(insight);
                self.forecast = Some(forecast);
                true
            }
            Err(err) => self.fail(ticket, &err, INTEL_UNAVAILABLE),
        }
    }

    /// Reroll intensity and weather and boost the multiplier.
    pub fn chaos_mode(&mut self) -> bool {
        let (roll, transition) = self.engine.apply_chaos_boost(&mut *self.rng.session());
        self.intensity = roll.intensity;
        self.weather = roll.weather;
        self.record(transition)
    }

    pub fn start_focus(&mut self) {
        self.focus.start();
    }

    pub fn pause_focus(&mut self) {
        self.focus.pause();
    }

    pub fn reset_focus(&mut self) {
        self.focus.reset();
    }

    /// Change the focus length.
    ///
    /// # Errors
    ///
    /// Returns an error while a session is running or for an invalid length.
    pub fn set_focus_minutes(&mut self, minutes: u32) -> Result<(), FocusError> {
        self.focus.set_minutes(minutes)
    }

    /// One-second heartbeat: advances the focus countdown, then re-checks the
    /// combo window against `now`.
    pub fn tick(&mut self, now: &Moment) -> bool {
        let mut changed = false;
        if self.focus.tick() == FocusTick::Completed {
            let transition = self.engine.apply_focus_completion();
            changed |= self.record(transition);
        }
        let transition = self.engine.expire_combo(now);
        changed | self.record(transition)
    }

    /// Clear all progress. In-flight requests issued before this call are
    /// discarded on delivery.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        let transition = self.engine.reset();
        self.focus = FocusTimer::with_minutes(self.config.focus_minutes);
        self.insight = None;
        self.forecast = None;
        self.error = None;
        self.record(transition);
    }

    fn is_stale(&self, ticket: RequestTicket) -> bool {
        if ticket.generation == self.generation {
            return false;
        }
        log::warn!(
            "discarding stale {} response (generation {} < {})",
            ticket.kind.label(),
            ticket.generation,
            self.generation
        );
        true
    }

    fn fail(&mut self, ticket: RequestTicket, err: &ContentError, message: &'static str) -> bool {
        log::warn!("{} request failed: {err}", ticket.kind.label());
        self.error = Some(message);
        false
    }

    fn record(&mut self, transition: Transition) -> bool {
        let applied = !transition.is_noop();
        if transition.warning.is_some() {
            self.warning = transition.warning;
        }
        self.events.extend(transition.events);
        let overflow = self.events.len().saturating_sub(EVENT_QUEUE_LIMIT);
        if overflow > 0 {
            log::warn!("event queue full, dropping {overflow} oldest events");
            self.events.drain(..overflow);
        }
        applied
    }
}
