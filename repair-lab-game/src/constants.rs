//! Centralized balance and tuning constants for Repair Lab.
//!
//! These values define the scoring math for the progression engine and the
//! bounds of every generator. Keeping them together ensures that balance can
//! only be adjusted via reviewed code changes rather than runtime config.

// Player state -------------------------------------------------------------
pub const DEFAULT_ENERGY: i32 = 10;
pub const ENERGY_MAX: i32 = 100;
pub const HISTORY_LIMIT: usize = 10;
/// Undrained session events kept before the oldest are dropped.
pub const EVENT_QUEUE_LIMIT: usize = 64;

// Combo & streak -----------------------------------------------------------
pub const COMBO_WINDOW_MS: i64 = 90_000;
/// Multiplier expressed in tenths: 10 == x1.0.
pub const COMBO_BASE_TENTHS: u32 = 10;
pub const COMBO_STEP_TENTHS: u32 = 4;
pub const COMBO_CAP_TENTHS: u32 = 50;
pub const CHAOS_BOOST_TENTHS: u32 = 3;
pub const STREAK_SCORE_PER_DAY: i64 = 3;
pub const GODMODE_CHAIN: u32 = 5;
pub const GODMODE_BONUS: i64 = 120;

// Challenge & focus rewards ------------------------------------------------
pub const CHALLENGE_ENERGY_DIVISOR: i32 = 4;
pub const FOCUS_SCORE_REWARD: i64 = 30;
pub const FOCUS_ENERGY_REWARD: i32 = 8;
pub const FOCUS_DEFAULT_MINUTES: u32 = 15;
pub const FOCUS_MIN_MINUTES: u32 = 1;
pub const FOCUS_MAX_MINUTES: u32 = 180;

// Plan generator -----------------------------------------------------------
pub const INTENSITY_MIN: i32 = 1;
pub const INTENSITY_MAX: i32 = 10;
pub const INTENSITY_DEFAULT: i32 = 5;
pub const PLAN_CONFIDENCE_ROLL: (i32, i32) = (62, 88);
pub const PLAN_CONFIDENCE_MIN: i32 = 40;
pub const PLAN_CONFIDENCE_MAX: i32 = 99;
pub const PLAN_ETA_ROLL: (i32, i32) = (8, 30);
pub const PLAN_ETA_PER_INTENSITY: i32 = 2;
pub const PLAN_ENERGY_ROLL: (i32, i32) = (5, 18);
pub const PLAN_ID_SUFFIX_ROLL: (u32, u32) = (100, 999);
pub const DEFAULT_PERSONA: &str = "Katinka";
pub const DEFAULT_WEATHER: &str = "cloudy";

// Forecast generator -------------------------------------------------------
pub const FORECAST_DAYS_MIN: u32 = 3;
pub const FORECAST_DAYS_MAX: u32 = 14;
pub const FORECAST_DAYS_DEFAULT: u32 = 7;
pub const FORECAST_SEED_ROLL: (i32, i32) = (42, 68);
pub const FORECAST_SHIFT_ROLL: (i32, i32) = (-8, 11);
pub const FORECAST_ENERGY_MIN: i32 = 25;
pub const FORECAST_ENERGY_MAX: i32 = 100;
pub const FORECAST_CONFIDENCE_ROLL: (i32, i32) = (48, 92);
pub const FORECAST_CONFIDENCE_MIN: i32 = 35;
pub const FORECAST_CONFIDENCE_MAX: i32 = 98;
pub const FORECAST_STRONG_AVERAGE: i32 = 65;

// Insight generator --------------------------------------------------------
pub const INSIGHT_SWEET_SPOT_ROLL: (i32, i32) = (4, 7);
pub const INSIGHT_WINDOW_START_ROLL: (u32, u32) = (8, 11);
pub const INSIGHT_WINDOW_END_ROLL: (u32, u32) = (14, 18);

// Challenge generator ------------------------------------------------------
pub const CHALLENGE_REWARD_ROLL: (i32, i32) = (10, 35);
pub const CHALLENGE_DEADLINE_ROLL: (i32, i32) = (3, 10);
