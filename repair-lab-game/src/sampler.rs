//! Weighted discrete choice.
use rand::Rng;

/// Pick one item with probability proportional to its weight.
///
/// Draws `u` uniformly in `[0, total)`, walks the items subtracting each
/// weight and returns the first item where the remainder reaches zero or
/// below. If float exhaustion leaves a positive remainder after the walk, the
/// last usable item is returned. Items with non-positive or non-finite weights are
/// never selected by the walk. Returns `None` for an empty slice or when no
/// item carries a usable weight.
pub fn weighted_pick<'a, T, R, F>(rng: &mut R, items: &'a [T], weight_of: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    let usable = |weight: f64| weight.is_finite() && weight > 0.0;
    let total: f64 = items
        .iter()
        .map(&weight_of)
        .filter(|weight| usable(*weight))
        .sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut remainder = rng.gen_range(0.0..total);
    for item in items {
        let weight = weight_of(item);
        if !usable(weight) {
            continue;
        }
        remainder -= weight;
        if remainder <= 0.0 {
            return Some(item);
        }
    }
    items.iter().rev().find(|item| usable(weight_of(*item)))
}

/// Convenience wrapper over `(item, weight)` pairs.
pub fn weighted_pick_pair<'a, T, R>(rng: &mut R, pairs: &'a [(T, f64)]) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    weighted_pick(rng, pairs, |(_, weight)| *weight).map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngBundle;

    #[test]
    fn empty_and_weightless_sets_yield_nothing() {
        let bundle = RngBundle::from_user_seed(3);
        let empty: [(char, f64); 0] = [];
        assert!(weighted_pick_pair(&mut *bundle.plan(), &empty).is_none());
        let zeroed = [('a', 0.0), ('b', -1.0)];
        assert!(weighted_pick_pair(&mut *bundle.plan(), &zeroed).is_none());
    }

    #[test]
    fn single_item_always_wins() {
        let bundle = RngBundle::from_user_seed(11);
        let only = [("solo", 2.5)];
        for _ in 0..100 {
            assert_eq!(weighted_pick_pair(&mut *bundle.plan(), &only), Some(&"solo"));
        }
    }

    #[test]
    fn heavier_weight_dominates_frequency() {
        let bundle = RngBundle::from_user_seed(0x5EED);
        let pairs = [('A', 1.0), ('B', 3.0)];
        let draws = 100_000;
        let mut hits_b = 0_u32;
        {
            let mut rng = bundle.plan();
            for _ in 0..draws {
                if weighted_pick_pair(&mut *rng, &pairs) == Some(&'B') {
                    hits_b += 1;
                }
            }
        }
        let ratio = f64::from(hits_b) / f64::from(draws);
        assert!((ratio - 0.75).abs() < 0.01, "observed {ratio}");
    }

    #[test]
    fn zero_weight_items_are_skipped() {
        let bundle = RngBundle::from_user_seed(5);
        let pairs = [('x', 0.0), ('y', 1.0), ('z', 0.0)];
        for _ in 0..200 {
            assert_eq!(weighted_pick_pair(&mut *bundle.plan(), &pairs), Some(&'y'));
        }
    }
}
