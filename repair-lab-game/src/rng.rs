//! Domain-separated random streams for the content generators.
//!
//! Every generator draws from its own stream so that, for a fixed user seed,
//! adding draws to one generator never shifts the output of another.
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

/// Bundle of independent RNG streams derived from a single user seed.
#[derive(Debug)]
pub struct RngBundle {
    seed: u64,
    plan: RefCell<CountingRng<ChaCha20Rng>>,
    forecast: RefCell<CountingRng<ChaCha20Rng>>,
    insight: RefCell<CountingRng<ChaCha20Rng>>,
    challenge: RefCell<CountingRng<ChaCha20Rng>>,
    session: RefCell<CountingRng<ChaCha20Rng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            plan: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"plan"))),
            forecast: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"forecast"))),
            insight: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"insight"))),
            challenge: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"challenge"))),
            session: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"session"))),
        }
    }

    /// Construct a bundle from OS entropy for production play.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_user_seed(rand::thread_rng().next_u64())
    }

    /// The user seed this bundle was derived from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Access the fix-plan RNG stream.
    #[must_use]
    pub fn plan(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.plan.borrow_mut()
    }

    /// Access the forecast RNG stream.
    #[must_use]
    pub fn forecast(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.forecast.borrow_mut()
    }

    /// Access the insight RNG stream.
    #[must_use]
    pub fn insight(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.insight.borrow_mut()
    }

    /// Access the challenge RNG stream.
    #[must_use]
    pub fn challenge(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.challenge.borrow_mut()
    }

    /// Access the client-session RNG stream (chaos mode).
    #[must_use]
    pub fn session(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.session.borrow_mut()
    }

    /// Total draws performed across every stream.
    #[must_use]
    pub fn total_draws(&self) -> u64 {
        [
            &self.plan,
            &self.forecast,
            &self.insight,
            &self.challenge,
            &self.session,
        ]
        .iter()
        .map(|stream| stream.borrow().draws())
        .sum()
    }
}

/// RNG wrapper that counts how many draw calls were made against it.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Inclusive uniform integer draw, `uniform_int(a, b)` in the generator formulas.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, (min, max): (i32, i32)) -> i32 {
    rng.gen_range(min..=max)
}

/// Unsigned variant of [`roll`].
pub fn roll_u32<R: Rng + ?Sized>(rng: &mut R, (min, max): (u32, u32)) -> u32 {
    rng.gen_range(min..=max)
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed ^ 0x9E37_79B9_7F4A_7C15;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
