//! Numeric conversion helpers centralizing safe numeric casts and the
//! fixed-point multiplier math used by the scoring rules.

use num_traits::cast::cast;

use crate::constants::{COMBO_BASE_TENTHS, COMBO_CAP_TENTHS};

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Ceil a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn ceil_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).ceil();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Integer division rounding toward negative infinity (`Math.floor(a / b)`).
#[must_use]
pub const fn floor_div(numerator: i32, denominator: i32) -> i32 {
    numerator.div_euclid(denominator)
}

/// Convert a multiplier to whole tenths, clamped into the combo range.
#[must_use]
pub fn multiplier_to_tenths(multiplier: f64) -> u32 {
    let tenths = round_f64_to_i32(multiplier * 10.0);
    let clamped = tenths.clamp(
        i32::try_from(COMBO_BASE_TENTHS).unwrap_or(10),
        i32::try_from(COMBO_CAP_TENTHS).unwrap_or(50),
    );
    u32::try_from(clamped).unwrap_or(COMBO_BASE_TENTHS)
}

/// Convert whole tenths back into the nearest representable multiplier.
#[must_use]
pub fn tenths_to_multiplier(tenths: u32) -> f64 {
    f64::from(tenths) / 10.0
}

/// Round a multiplier to one decimal place and clamp it to `[1.0, 5.0]`.
#[must_use]
pub fn round1_multiplier(multiplier: f64) -> f64 {
    if !multiplier.is_finite() {
        return tenths_to_multiplier(COMBO_BASE_TENTHS);
    }
    tenths_to_multiplier(multiplier_to_tenths(multiplier))
}

/// `floor(base * multiplier)` computed in exact tenths so that values such as
/// `100 * 1.4` never land one point short through binary float error.
#[must_use]
pub fn scale_floor(base: i64, multiplier: f64) -> i64 {
    let tenths = i64::from(multiplier_to_tenths(multiplier));
    (base * tenths).div_euclid(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i32(1.6), 2);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn ceil_clamps_and_handles_nan() {
        assert_eq!(ceil_f64_to_i64(1.2), 2);
        assert_eq!(ceil_f64_to_i64(f64::NAN), 0);
    }

    #[test]
    fn floor_div_rounds_toward_negative_infinity() {
        assert_eq!(floor_div(7, 4), 1);
        assert_eq!(floor_div(-1, 4), -1);
        assert_eq!(floor_div(-10, 3), -4);
        assert_eq!(floor_div(0, 3), 0);
    }

    #[test]
    fn multiplier_rounding_clamps_to_combo_range() {
        assert!((round1_multiplier(0.2) - 1.0).abs() < f64::EPSILON);
        assert!((round1_multiplier(9.0) - 5.0).abs() < f64::EPSILON);
        assert!((round1_multiplier(1.0 + 4.0 * 0.4) - 2.6).abs() < f64::EPSILON);
        assert!((round1_multiplier(f64::NAN) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scale_floor_uses_exact_tenths() {
        assert_eq!(scale_floor(100, 1.4), 140);
        assert_eq!(scale_floor(33, 1.4), 46);
        assert_eq!(scale_floor(21, 1.0), 21);
        assert_eq!(scale_floor(107, 5.0), 535);
    }

    #[test]
    fn scale_floor_does_not_lose_a_point_to_float_error() {
        // 5.0 * 4.6 is 22.999... in binary floating point
        assert!((5.0_f64 * 4.6).floor() < 23.0);
        assert_eq!(scale_floor(5, 4.6), 23);
    }
}
