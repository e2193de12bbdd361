//! Fix plan generation.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::catalog::{ActionList, MoodCatalog, MoodProfile, weather_delta};
use crate::constants::{
    INTENSITY_DEFAULT, INTENSITY_MAX, INTENSITY_MIN, PLAN_CONFIDENCE_MAX, PLAN_CONFIDENCE_MIN,
    PLAN_CONFIDENCE_ROLL, PLAN_ENERGY_ROLL, PLAN_ETA_PER_INTENSITY, PLAN_ETA_ROLL,
    PLAN_ID_SUFFIX_ROLL,
};
use crate::numbers::{floor_div, round_f64_to_i32};
use crate::rng::{roll, roll_u32};
use crate::sampler::weighted_pick;

/// Lower bound on the energy a plan grants, regardless of confidence.
pub const PLAN_ENERGY_FLOOR: i32 = PLAN_ENERGY_ROLL.0;

/// A generated recovery recommendation awaiting completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixPlan {
    pub id: String,
    pub mood: String,
    pub confidence: i32,
    pub intensity: i32,
    pub weather: String,
    pub eta_minutes: i32,
    pub energy_gain: i32,
    pub actions: ActionList,
    pub summary: String,
}

/// Identity and naming inputs that are not random draws.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    pub persona: &'a str,
    pub issued_at_ms: i64,
    pub sequence: u64,
}

/// Normalize a raw intensity: non-finite or zero values fall back to the
/// default, everything else is clamped into `[1, 10]` and rounded.
#[must_use]
pub fn normalize_intensity(raw: f64) -> i32 {
    if !raw.is_finite() || raw == 0.0 {
        return INTENSITY_DEFAULT;
    }
    let clamped = raw.clamp(f64::from(INTENSITY_MIN), f64::from(INTENSITY_MAX));
    round_f64_to_i32(clamped)
}

/// How many actions a plan of the given intensity asks for.
#[must_use]
pub const fn action_count(intensity: i32) -> usize {
    if intensity >= 8 {
        3
    } else if intensity >= 4 {
        2
    } else {
        1
    }
}

/// Build a fix plan from intensity and weather plus a sampled mood.
///
/// Never fails: invalid intensity degrades to the default and unknown weather
/// contributes no confidence delta.
pub fn synthesize_plan<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &MoodCatalog,
    intensity: f64,
    weather: &str,
    ctx: &PlanContext<'_>,
) -> FixPlan {
    let intensity = normalize_intensity(intensity);
    let fallback;
    let mood = match weighted_pick(rng, catalog.as_slice(), |mood| mood.weight) {
        Some(mood) => mood,
        None => {
            fallback = MoodProfile::fallback();
            &fallback
        }
    };

    let weather = weather.trim().to_ascii_lowercase();
    let confidence = (roll(rng, PLAN_CONFIDENCE_ROLL) + weather_delta(&weather) - intensity)
        .clamp(PLAN_CONFIDENCE_MIN, PLAN_CONFIDENCE_MAX);

    let mut actions: ActionList = mood.actions.clone();
    actions.shuffle(rng);
    actions.truncate(action_count(intensity));

    let eta_minutes = roll(rng, PLAN_ETA_ROLL) + intensity * PLAN_ETA_PER_INTENSITY;
    let energy_gain =
        (roll(rng, PLAN_ENERGY_ROLL) + floor_div(confidence - 50, 4)).max(PLAN_ENERGY_FLOOR);
    let suffix = roll_u32(rng, PLAN_ID_SUFFIX_ROLL);

    FixPlan {
        id: format!("fix-{}-{suffix}-{}", ctx.issued_at_ms, ctx.sequence),
        mood: mood.label.clone(),
        confidence,
        intensity,
        weather,
        eta_minutes,
        energy_gain,
        actions,
        summary: format!(
            "{} is {} today. Estimated recovery in {eta_minutes} minutes.",
            ctx.persona,
            mood.label.to_lowercase()
        ),
    }
}
