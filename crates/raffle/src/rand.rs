use parking_lot::Mutex;
use ::rand::{Rng, SeedableRng, rng, rngs::StdRng};

/// A trait for random sources that return raw random bits.
///
/// This abstraction allows you to plug in a real random source or a mocked
/// random source in tests.
///
/// The random type `T` is generic (typically `u64` or `u128`).
///
/// # Example
/// ```
/// use raffle::RandSource;
///
/// struct FixedRand;
/// impl RandSource<u128> for FixedRand {
///     fn rand(&self) -> u128 {
///         1234
///     }
/// }
///
/// let rng = FixedRand;
/// assert_eq!(rng.rand(), 1234);
/// ```
pub trait RandSource<T> {
    /// Returns a random integer.
    fn rand(&self) -> T;
}

/// A trait for random sources that pick uniformly from a bounded range.
///
/// The shuffle relies on this being unbiased: every value in `0..bound` must
/// be equally likely.
pub trait RangeSource {
    /// Returns a uniformly distributed value in `0..bound`.
    ///
    /// Callers never pass `bound == 0`.
    fn below(&self, bound: usize) -> usize;
}

/// A random source backed by the thread-local RNG (`rand::rng()`).
///
/// Each OS thread has its own RNG instance, so calls from multiple threads are
/// contention-free. This type does **not** store the RNG itself; it simply
/// accesses the thread-local generator on each call, which keeps it `Send`
/// and `Sync` even though the underlying `ThreadRng` is neither.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource<u64> for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }
}

impl RandSource<u128> for ThreadRandom {
    fn rand(&self) -> u128 {
        rng().random()
    }
}

impl RangeSource for ThreadRandom {
    fn below(&self, bound: usize) -> usize {
        rng().random_range(0..bound)
    }
}

/// A deterministic random source seeded from a `u64`.
///
/// Two instances built from the same seed yield the same sequence, which makes
/// shuffles reproducible in tests and benchmarks.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandSource<u64> for SeededRandom {
    fn rand(&self) -> u64 {
        self.rng.lock().random()
    }
}

impl RandSource<u128> for SeededRandom {
    fn rand(&self) -> u128 {
        self.rng.lock().random()
    }
}

impl RangeSource for SeededRandom {
    fn below(&self, bound: usize) -> usize {
        self.rng.lock().random_range(0..bound)
    }
}
