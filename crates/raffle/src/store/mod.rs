//! Storage backends for draw sequences.
//!
//! A [`DrawStore`] maps draw ids to ordered sequences of entries. The draw
//! subsystem holds no copy of a sequence between calls, so the store alone
//! carries the correctness requirements:
//!
//! - `pop_one` must remove and return the front entry atomically and be
//!   linearizable per key. Two callers must never receive the same entry.
//! - `push_all` must replace the whole sequence in one step; readers observe
//!   either the old sequence or the new one, never a mix.
//! - Operations on different keys never interact.
//!
//! ## Implementations
//!
//! - [`MemoryStore`] - in-process map behind a mutex.
//! - [`RedisStore`] - shared Redis lists (feature `redis`).

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::*;
#[cfg(feature = "redis")]
pub use self::redis::*;

use crate::DrawId;
use core::future::Future;

/// Failure reported by a store backend.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{context}")]
pub struct StoreError {
    context: String,
}

impl StoreError {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }
}

/// An ordered-sequence key-value store with atomic list primitives.
///
/// Implementations are shared across concurrent requests, so every method
/// takes `&self`.
pub trait DrawStore: Send + Sync {
    /// Overwrites the sequence stored under `id` with `entries`.
    ///
    /// The first element of `entries` is the first one [`Self::pop_one`]
    /// returns. An empty `entries` still records the draw as existing.
    fn push_all(
        &self,
        id: &DrawId,
        entries: Vec<String>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Atomically removes and returns the next entry.
    ///
    /// Returns `None` if the draw is absent or its sequence is empty.
    fn pop_one(&self, id: &DrawId) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Removes the draw. Returns `true` if a record existed.
    fn delete(&self, id: &DrawId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Returns `true` if a record exists for `id`, even an exhausted one.
    fn exists(&self, id: &DrawId) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
