//! Content-generation service: the plan, challenge, insight, forecast and
//! health operations, plus an in-process generator implementing them.
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use thiserror::Error;

use crate::catalog::MoodCatalog;
use crate::challenge::{Challenge, synthesize_challenge};
use crate::clock::{Clock, SystemClock};
use crate::constants::{
    DEFAULT_PERSONA, DEFAULT_WEATHER, FORECAST_DAYS_DEFAULT, INTENSITY_DEFAULT,
};
use crate::forecast::{ForecastReport, clamp_days, synthesize_forecast};
use crate::insight::{InsightReport, synthesize_insight};
use crate::numbers::ceil_f64_to_i64;
use crate::plan::{FixPlan, PlanContext, normalize_intensity, synthesize_plan};
use crate::rng::RngBundle;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("{service} unavailable")]
    Unavailable { service: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    /// ISO-8601 UTC timestamp.
    pub timestamp: String,
}

/// Parse a numeric query value the way loose form parameters are read:
/// blank, unparsable, non-finite and zero values count as missing.
fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value != 0.0)
}

/// Normalized `/fix` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanQuery {
    pub intensity: i32,
    pub weather: String,
}

impl Default for PlanQuery {
    fn default() -> Self {
        Self {
            intensity: INTENSITY_DEFAULT,
            weather: DEFAULT_WEATHER.to_string(),
        }
    }
}

impl PlanQuery {
    #[must_use]
    pub fn new(intensity: f64, weather: &str) -> Self {
        Self {
            intensity: normalize_intensity(intensity),
            weather: weather.to_lowercase(),
        }
    }

    /// Normalize raw query strings. Missing weather defaults to cloudy.
    #[must_use]
    pub fn from_params(intensity: Option<&str>, weather: Option<&str>) -> Self {
        Self::new(
            parse_number(intensity).unwrap_or(f64::from(INTENSITY_DEFAULT)),
            weather.unwrap_or(DEFAULT_WEATHER),
        )
    }
}

/// Normalized `/forecast` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub days: u32,
}

impl Default for ForecastQuery {
    fn default() -> Self {
        Self {
            days: FORECAST_DAYS_DEFAULT,
        }
    }
}

impl ForecastQuery {
    #[must_use]
    pub fn new(days: u32) -> Self {
        Self {
            days: clamp_days(days),
        }
    }

    /// Normalize a raw `days` value. Fractional horizons round up, matching
    /// a walk that runs while the day index is below the requested count.
    #[must_use]
    pub fn from_params(days: Option<&str>) -> Self {
        let requested = parse_number(days).map_or(i64::from(FORECAST_DAYS_DEFAULT), ceil_f64_to_i64);
        let clamped = requested.clamp(0, i64::from(u32::MAX));
        Self::new(u32::try_from(clamped).unwrap_or(FORECAST_DAYS_DEFAULT))
    }
}

/// The content-generation operations a session depends on.
pub trait ContentService {
    /// # Errors
    ///
    /// Returns [`ContentError::Unavailable`] if generation cannot be reached.
    fn fix_plan(&self, query: &PlanQuery) -> Result<FixPlan, ContentError>;

    /// # Errors
    ///
    /// Returns [`ContentError::Unavailable`] if generation cannot be reached.
    fn challenge(&self) -> Result<Challenge, ContentError>;

    /// # Errors
    ///
    /// Returns [`ContentError::Unavailable`] if generation cannot be reached.
    fn insight(&self) -> Result<InsightReport, ContentError>;

    /// # Errors
    ///
    /// Returns [`ContentError::Unavailable`] if generation cannot be reached.
    fn forecast(&self, query: &ForecastQuery) -> Result<ForecastReport, ContentError>;

    /// # Errors
    ///
    /// Returns [`ContentError::Unavailable`] if generation cannot be reached.
    fn health(&self) -> Result<HealthReport, ContentError>;
}

impl<T: ContentService + ?Sized> ContentService for &T {
    fn fix_plan(&self, query: &PlanQuery) -> Result<FixPlan, ContentError> {
        (**self).fix_plan(query)
    }

    fn challenge(&self) -> Result<Challenge, ContentError> {
        (**self).challenge()
    }

    fn insight(&self) -> Result<InsightReport, ContentError> {
        (**self).insight()
    }

    fn forecast(&self, query: &ForecastQuery) -> Result<ForecastReport, ContentError> {
        (**self).forecast(query)
    }

    fn health(&self) -> Result<HealthReport, ContentError> {
        (**self).health()
    }
}

/// In-process generator backed by seeded random streams.
#[derive(Debug)]
pub struct LocalContent<C: Clock = SystemClock> {
    rng: RngBundle,
    catalog: MoodCatalog,
    persona: String,
    sequence: Cell<u64>,
    clock: C,
}

impl LocalContent<SystemClock> {
    /// Entropy-seeded generator on the system clock.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(RngBundle::from_entropy(), SystemClock)
    }
}

impl<C: Clock> LocalContent<C> {
    #[must_use]
    pub fn new(rng: RngBundle, clock: C) -> Self {
        Self {
            rng,
            catalog: MoodCatalog::default_catalog().clone(),
            persona: DEFAULT_PERSONA.to_string(),
            sequence: Cell::new(0),
            clock,
        }
    }

    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: MoodCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn persona(&self) -> &str {
        &self.persona
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    fn next_sequence(&self) -> u64 {
        let sequence = self.sequence.get();
        self.sequence.set(sequence.wrapping_add(1));
        sequence
    }
}

impl<C: Clock> ContentService for LocalContent<C> {
    fn fix_plan(&self, query: &PlanQuery) -> Result<FixPlan, ContentError> {
        let ctx = PlanContext {
            persona: &self.persona,
            issued_at_ms: self.clock.now().epoch_ms,
            sequence: self.next_sequence(),
        };
        let plan = synthesize_plan(
            &mut *self.rng.plan(),
            &self.catalog,
            f64::from(query.intensity),
            &query.weather,
            &ctx,
        );
        log::debug!("generated plan {} ({})", plan.id, plan.mood);
        Ok(plan)
    }

    fn challenge(&self) -> Result<Challenge, ContentError> {
        Ok(synthesize_challenge(&mut *self.rng.challenge()))
    }

    fn insight(&self) -> Result<InsightReport, ContentError> {
        Ok(synthesize_insight(&mut *self.rng.insight()))
    }

    fn forecast(&self, query: &ForecastQuery) -> Result<ForecastReport, ContentError> {
        Ok(synthesize_forecast(&mut *self.rng.forecast(), query.days))
    }

    fn health(&self) -> Result<HealthReport, ContentError> {
        let now = self.clock.now();
        let timestamp = DateTime::<Utc>::from_timestamp_millis(now.epoch_ms)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(HealthReport {
            status: "ok".to_string(),
            timestamp,
        })
    }
}
