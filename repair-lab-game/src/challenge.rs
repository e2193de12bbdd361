//! Daily challenge generation.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::catalog::CHALLENGES;
use crate::constants::{CHALLENGE_DEADLINE_ROLL, CHALLENGE_REWARD_ROLL};
use crate::rng::roll;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub challenge: String,
    pub reward: i32,
    pub deadline_hours: i32,
}

/// Pick a challenge uniformly and draw its reward and deadline independently.
pub fn synthesize_challenge<R: Rng + ?Sized>(rng: &mut R) -> Challenge {
    let prompt = CHALLENGES.choose(rng).copied().unwrap_or(CHALLENGES[0]);
    Challenge {
        challenge: prompt.to_string(),
        reward: roll(rng, CHALLENGE_REWARD_ROLL),
        deadline_hours: roll(rng, CHALLENGE_DEADLINE_ROLL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngBundle;
    use std::collections::HashSet;

    #[test]
    fn challenges_cover_catalog_within_bounds() {
        let bundle = RngBundle::from_user_seed(77);
        let mut seen = HashSet::new();
        for _ in 0..1_000 {
            let challenge = synthesize_challenge(&mut *bundle.challenge());
            assert!((10..=35).contains(&challenge.reward));
            assert!((3..=10).contains(&challenge.deadline_hours));
            assert!(CHALLENGES.contains(&challenge.challenge.as_str()));
            seen.insert(challenge.challenge);
        }
        assert_eq!(seen.len(), CHALLENGES.len());
    }

    #[test]
    fn challenge_uses_camel_case_deadline() {
        let bundle = RngBundle::from_user_seed(3);
        let value = serde_json::to_value(synthesize_challenge(&mut *bundle.challenge())).unwrap();
        assert!(value.get("deadlineHours").is_some());
    }
}
