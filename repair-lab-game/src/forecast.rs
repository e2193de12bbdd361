//! Multi-day energy forecast as a bounded random walk.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    FORECAST_CONFIDENCE_MAX, FORECAST_CONFIDENCE_MIN, FORECAST_CONFIDENCE_ROLL,
    FORECAST_DAYS_MAX, FORECAST_DAYS_MIN, FORECAST_ENERGY_MAX, FORECAST_ENERGY_MIN,
    FORECAST_SEED_ROLL, FORECAST_SHIFT_ROLL, FORECAST_STRONG_AVERAGE,
};
use crate::numbers::{floor_div, i64_to_f64, round_f64_to_i32};
use crate::rng::roll;

pub const RECOMMENDATION_STRONG: &str =
    "Momentum is strong. Maintain daily fix sessions and short recovery breaks.";
pub const RECOMMENDATION_RECOVER: &str =
    "Recovery is inconsistent. Prioritize low-intensity consistency over heroic bursts.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub day: u32,
    pub energy: i32,
    pub confidence: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    pub days: u32,
    pub average_energy: i32,
    pub trend: Vec<ForecastPoint>,
    pub recommendation: String,
}

/// Clamp a requested horizon into the supported window.
#[must_use]
pub fn clamp_days(days: u32) -> u32 {
    days.clamp(FORECAST_DAYS_MIN, FORECAST_DAYS_MAX)
}

/// Recommendation text for an average energy; binary threshold.
#[must_use]
pub const fn recommendation_for(average_energy: i32) -> &'static str {
    if average_energy >= FORECAST_STRONG_AVERAGE {
        RECOMMENDATION_STRONG
    } else {
        RECOMMENDATION_RECOVER
    }
}

/// Build a forecast. Every day, the first included, applies one shift to the
/// seeded energy and clamps it into `[25, 100]`.
pub fn synthesize_forecast<R: Rng + ?Sized>(rng: &mut R, days: u32) -> ForecastReport {
    let days = clamp_days(days);
    let mut energy = roll(rng, FORECAST_SEED_ROLL);
    let mut trend = Vec::with_capacity(days as usize);

    for day in 1..=days {
        energy = (energy + roll(rng, FORECAST_SHIFT_ROLL))
            .clamp(FORECAST_ENERGY_MIN, FORECAST_ENERGY_MAX);
        let confidence = (roll(rng, FORECAST_CONFIDENCE_ROLL) + floor_div(energy - 50, 3))
            .clamp(FORECAST_CONFIDENCE_MIN, FORECAST_CONFIDENCE_MAX);
        trend.push(ForecastPoint {
            day,
            energy,
            confidence,
        });
    }

    let total: i64 = trend.iter().map(|point| i64::from(point.energy)).sum();
    let average_energy = round_f64_to_i32(i64_to_f64(total) / f64::from(days));

    ForecastReport {
        days,
        average_energy,
        trend,
        recommendation: recommendation_for(average_energy).to_string(),
    }
}
