//! Deterministic randomness: domain-separated streams behind one seed.
//!
//! Every random decision the engine makes draws from a named stream so tests
//! can replay exact sequences from a fixed seed.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

/// The engine's random streams: `turn` picks players, `prompt` picks
/// prompts, `shuffle` drives difficulty orders and template name pools.
#[derive(Debug, Clone)]
pub struct RngBundle {
    turn: RefCell<CountingRng<ChaCha20Rng>>,
    prompt: RefCell<CountingRng<ChaCha20Rng>>,
    shuffle: RefCell<CountingRng<ChaCha20Rng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        let turn = CountingRng::new(derive_stream_seed(seed, b"turn"));
        let prompt = CountingRng::new(derive_stream_seed(seed, b"prompt"));
        let shuffle = CountingRng::new(derive_stream_seed(seed, b"shuffle"));
        Self {
            turn: RefCell::new(turn),
            prompt: RefCell::new(prompt),
            shuffle: RefCell::new(shuffle),
        }
    }

    /// Access the player-pick RNG stream.
    #[must_use]
    pub fn turn(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.turn.borrow_mut()
    }

    /// Access the prompt-pick RNG stream.
    #[must_use]
    pub fn prompt(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.prompt.borrow_mut()
    }

    /// Access the shuffle RNG stream.
    #[must_use]
    pub fn shuffle(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.shuffle.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
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

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
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

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}
