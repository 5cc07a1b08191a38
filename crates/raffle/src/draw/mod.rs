//! Draw orchestration.
//!
//! [`DrawManager`] ties together identifier issuance, shuffling and the draw
//! store into the three caller-facing operations: create, draw one, replace.
//!
//! ## State machine
//!
//! Per draw id: **absent** -> `create`/`replace` -> **active** -> `draw_one`
//! ... -> **exhausted**. `replace` moves any state back to active (or to
//! exhausted when given no entries). `discard` moves any state to absent.
//!
//! The manager holds no copy of a draw between calls. Every operation goes to
//! the store, so any replica can serve any request.


use crate::{
    CatalogSource, DrawId, DrawStore, Error, IdGenerator, RandomIdGenerator, RangeSource,
    Result, Shuffler, StoreError, ThreadRandom,
};
use core::future::Future;
use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tunables for [`DrawManager`].
#[derive(Clone, Debug)]
pub struct DrawConfig {
    /// Upper bound on every store round trip. An elapsed timeout surfaces as
    /// [`Error::StoreUnavailable`] with an unknown outcome.
    pub store_timeout: Duration,
    /// Number of catalog candidates used when the caller does not specify one.
    pub catalog_selection: usize,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            catalog_selection: 3,
        }
    }
}

/// Creates, consumes and replaces draws.
///
/// Generic over the store, the id generator and the random source used for
/// shuffling, so tests can inject deterministic collaborators.
pub struct DrawManager<S, G = RandomIdGenerator<ThreadRandom>, R = ThreadRandom>
where
    S: DrawStore,
    G: IdGenerator,
    R: RangeSource,
{
    store: S,
    ids: G,
    shuffler: Shuffler<R>,
    config: DrawConfig,
}

impl<S> DrawManager<S>
where
    S: DrawStore,
{
    /// Creates a manager with random ids, thread-local shuffling and the
    /// default [`DrawConfig`].
    pub fn new(store: S) -> Self {
        Self::with_config(store, DrawConfig::default())
    }

    pub fn with_config(store: S, config: DrawConfig) -> Self {
        Self::from_components(
            store,
            RandomIdGenerator::new(ThreadRandom),
            ThreadRandom,
            config,
        )
    }
}

impl<S, G, R> DrawManager<S, G, R>
where
    S: DrawStore,
    G: IdGenerator,
    R: RangeSource,
{
    pub const fn from_components(store: S, ids: G, rng: R, config: DrawConfig) -> Self {
        Self {
            store,
            ids,
            shuffler: Shuffler::new(rng),
            config,
        }
    }

    pub const fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Starts a new draw over `entries` and returns its fresh id.
    ///
    /// An empty `entries` yields a draw that is exhausted from the start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the sequence could not be
    /// written. The id is discarded; retry with a new `create` call.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(count = entries.len())))]
    pub async fn create(&self, entries: Vec<String>) -> Result<DrawId> {
        let id = self.ids.new_id();
        let order = self.shuffler.shuffle(entries);
        self.guard(self.store.push_all(&id, order)).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(draw_id = %id, "draw created");
        Ok(id)
    }

    /// Atomically removes and returns the next entry of draw `id`.
    ///
    /// Concurrent callers on the same id never receive the same entry.
    ///
    /// # Errors
    ///
    /// - [`Error::DrawNotFound`] if no record exists for `id`.
    /// - [`Error::DrawExhausted`] if the draw has no entries left.
    /// - [`Error::StoreUnavailable`] on store failure or timeout.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), fields(draw_id = %id)))]
    pub async fn draw_one(&self, id: &DrawId) -> Result<String> {
        if let Some(entry) = self.guard(self.store.pop_one(id)).await? {
            return Ok(entry);
        }

        // The pop is the only mutation; this lookup just classifies the miss.
        if self.guard(self.store.exists(id)).await? {
            Err(Error::DrawExhausted { id: id.clone() })
        } else {
            Err(Error::DrawNotFound { id: id.clone() })
        }
    }

    /// Discards whatever draw `id` holds and replaces it with a fresh shuffle
    /// of `entries`.
    ///
    /// Works on absent, active and exhausted draws alike; an absent id is
    /// created. Remaining entries of the previous draw are not preserved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the sequence could not be
    /// written.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, entries), fields(draw_id = %id, count = entries.len())))]
    pub async fn replace(&self, id: &DrawId, entries: Vec<String>) -> Result<()> {
        let order = self.shuffler.shuffle(entries);
        self.guard(self.store.push_all(id, order)).await
    }

    /// Starts a new draw over up to `max_count` candidates from `catalog`.
    ///
    /// Falls back to [`DrawConfig::catalog_selection`] when `max_count` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Propagates catalog errors, then behaves like [`Self::create`].
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, catalog)))]
    pub async fn create_from_catalog<C>(&self, catalog: &C, max_count: Option<usize>) -> Result<DrawId>
    where
        C: CatalogSource,
    {
        let max_count = max_count.unwrap_or(self.config.catalog_selection);
        let candidates = catalog.fetch_candidates(max_count).await?;
        self.create(candidates).await
    }

    /// Deletes draw `id`. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] on store failure or timeout.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), fields(draw_id = %id)))]
    pub async fn discard(&self, id: &DrawId) -> Result<bool> {
        self.guard(self.store.delete(id)).await
    }

    /// Bounds a store call by the configured timeout and maps its failures.
    async fn guard<T>(&self, op: impl Future<Output = Result<T, StoreError>>) -> Result<T> {
        match tokio::time::timeout(self.config.store_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "draw store operation failed");
                Err(Error::StoreUnavailable {
                    reason: err.to_string(),
                })
            }
            Err(_elapsed) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(timeout = ?self.config.store_timeout, "draw store operation timed out");
                Err(Error::StoreUnavailable {
                    reason: format!(
                        "timed out after {:?}; outcome unknown",
                        self.config.store_timeout
                    ),
                })
            }
        }
    }
}
