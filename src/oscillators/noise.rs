//! White noise source.
//!
//! Each thread draws from its own `SmallRng`, created on first use from a
//! shared base seed. Seeding is a pure computation, so the first noise sample
//! on an audio thread neither allocates nor asks the OS for entropy.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Spacing between per-thread seeds (the 64-bit golden ratio).
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

static NEXT_SEED: AtomicU64 = AtomicU64::new(SEED_STRIDE);

thread_local! {
    static NOISE_RNG: RefCell<Option<SmallRng>> = const { RefCell::new(None) };
}

/// Sets the base seed for threads that have not drawn noise yet.
///
/// The calling thread's generator is reset as well, so a single-threaded
/// render after `seed_noise` is reproducible.
///
/// # Examples
///
/// ```
/// use polysynth::oscillators::{seed_noise, white_noise};
///
/// seed_noise(42);
/// let first: Vec<f64> = (0..4).map(|_| white_noise()).collect();
/// seed_noise(42);
/// let second: Vec<f64> = (0..4).map(|_| white_noise()).collect();
/// assert_eq!(first, second);
/// ```
pub fn seed_noise(seed: u64) {
    NEXT_SEED.store(seed, Ordering::Relaxed);
    NOISE_RNG.with(|rng| *rng.borrow_mut() = Some(next_thread_rng()));
}

fn next_thread_rng() -> SmallRng {
    SmallRng::seed_from_u64(NEXT_SEED.fetch_add(SEED_STRIDE, Ordering::Relaxed))
}

/// Returns a uniformly distributed value in `[-1.0, 1.0]` from this thread's
/// noise generator.
///
/// Used as a breath or percussive component in instrument recipes. The value
/// does not depend on frequency or time.
///
/// # Examples
///
/// ```
/// use polysynth::oscillators::white_noise;
///
/// let sample = white_noise();
/// assert!((-1.0..=1.0).contains(&sample));
/// ```
pub fn white_noise() -> f64 {
    NOISE_RNG
        .try_with(|cell| {
            let mut rng = cell.borrow_mut();
            white_noise_with(rng.get_or_insert_with(next_thread_rng))
        })
        .unwrap_or(0.0)
}

/// Same as [`white_noise`] but draws from a caller-supplied RNG.
///
/// # Examples
///
/// ```
/// use polysynth::oscillators::white_noise_with;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let sample = white_noise_with(&mut rng);
/// assert!((-1.0..=1.0).contains(&sample));
/// ```
pub fn white_noise_with<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..=1.0)
}
