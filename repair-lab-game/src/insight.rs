//! Per-weather impact estimates and coaching tip.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::WeatherKind;
use crate::constants::{
    INSIGHT_SWEET_SPOT_ROLL, INSIGHT_WINDOW_END_ROLL, INSIGHT_WINDOW_START_ROLL,
};
use crate::rng::{roll, roll_u32};

pub const TIP_SUNNY: &str = "On sunny days, schedule your hardest task right after your fix plan.";
pub const TIP_ROUGH: &str = "When weather is rough, lower intensity and stack easier wins early.";

/// Impact estimate for each weather key, serialized in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeatherImpact {
    pub sunny: i32,
    pub cloudy: i32,
    pub rainy: i32,
    pub stormy: i32,
}

impl WeatherImpact {
    #[must_use]
    pub const fn get(&self, weather: WeatherKind) -> i32 {
        match weather {
            WeatherKind::Sunny => self.sunny,
            WeatherKind::Cloudy => self.cloudy,
            WeatherKind::Rainy => self.rainy,
            WeatherKind::Stormy => self.stormy,
        }
    }

    const fn set(&mut self, weather: WeatherKind, value: i32) {
        match weather {
            WeatherKind::Sunny => self.sunny = value,
            WeatherKind::Cloudy => self.cloudy = value,
            WeatherKind::Rainy => self.rainy = value,
            WeatherKind::Stormy => self.stormy = value,
        }
    }

    /// Highest impact; the earliest weather in catalog order wins ties.
    #[must_use]
    pub fn strongest(&self) -> WeatherKind {
        let mut best = WeatherKind::ALL[0];
        for weather in WeatherKind::ALL {
            if self.get(weather) > self.get(best) {
                best = weather;
            }
        }
        best
    }

    /// Lowest impact; the earliest weather in catalog order wins ties.
    #[must_use]
    pub fn weakest(&self) -> WeatherKind {
        let mut worst = WeatherKind::ALL[0];
        for weather in WeatherKind::ALL {
            if self.get(weather) < self.get(worst) {
                worst = weather;
            }
        }
        worst
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub intensity_sweet_spot: i32,
    pub weather_impact: WeatherImpact,
    pub best_window: String,
    pub strongest_weather: WeatherKind,
    pub weakest_weather: WeatherKind,
    pub coaching_tip: String,
}

/// Build an insight report.
///
/// `best_window` and `intensity_sweet_spot` are drawn independently of the
/// impact table.
pub fn synthesize_insight<R: Rng + ?Sized>(rng: &mut R) -> InsightReport {
    let mut weather_impact = WeatherImpact::default();
    for weather in WeatherKind::ALL {
        weather_impact.set(weather, roll(rng, weather.impact_range()));
    }
    let strongest_weather = weather_impact.strongest();
    let weakest_weather = weather_impact.weakest();
    let coaching_tip = if strongest_weather == WeatherKind::Sunny {
        TIP_SUNNY
    } else {
        TIP_ROUGH
    };

    let intensity_sweet_spot = roll(rng, INSIGHT_SWEET_SPOT_ROLL);
    let start = roll_u32(rng, INSIGHT_WINDOW_START_ROLL);
    let end = roll_u32(rng, INSIGHT_WINDOW_END_ROLL);

    InsightReport {
        intensity_sweet_spot,
        weather_impact,
        best_window: format!("{start:02}:00-{end:02}:00"),
        strongest_weather,
        weakest_weather,
        coaching_tip: coaching_tip.to_string(),
    }
}
