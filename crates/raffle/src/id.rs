use crate::{RandSource, ThreadRandom, base32::encode_u128};
use core::fmt;

/// Key prefix under which draw sequences are stored.
pub const DRAW_KEY_PREFIX: &str = "draw:";

/// Opaque identifier of a draw.
///
/// Ids minted by [`RandomIdGenerator`] are 26-character Crockford base32
/// strings, but any caller-supplied string is accepted verbatim: the draw
/// subsystem never interprets the contents.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DrawId(String);

impl DrawId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the store key holding this draw's remaining entries.
    pub fn key(&self) -> String {
        format!("{DRAW_KEY_PREFIX}{}", self.0)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DrawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DrawId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DrawId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for DrawId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A minimal interface for issuing draw identifiers.
pub trait IdGenerator {
    /// Returns an identifier that has, with overwhelming probability, never
    /// been returned before by this or any other generator.
    fn new_id(&self) -> DrawId;
}

/// Issues 128-bit random identifiers.
///
/// No coordination or clock is involved: uniqueness is probabilistic, with a
/// collision chance around `n^2 / 2^129` after `n` ids.
///
/// # Example
/// ```
/// use raffle::{IdGenerator, RandomIdGenerator, ThreadRandom};
///
/// let ids = RandomIdGenerator::new(ThreadRandom);
/// let a = ids.new_id();
/// let b = ids.new_id();
/// assert_ne!(a, b);
/// assert_eq!(a.as_str().len(), 26);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RandomIdGenerator<R = ThreadRandom>
where
    R: RandSource<u128>,
{
    rng: R,
}

impl<R> RandomIdGenerator<R>
where
    R: RandSource<u128>,
{
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R> IdGenerator for RandomIdGenerator<R>
where
    R: RandSource<u128>,
{
    fn new_id(&self) -> DrawId {
        DrawId(encode_u128(self.rng.rand()))
    }
}
