use crate::{DrawId, DrawStore, StoreError};
use core::time::Duration;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::time::Instant;

#[cfg(feature = "tracing")]
use tracing::instrument;

struct Record {
    entries: VecDeque<String>,
    expires_at: Option<Instant>,
}

impl Record {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// An in-process [`DrawStore`].
///
/// All records live in one map behind a [`parking_lot::Mutex`]; every
/// primitive holds the lock for its whole read-modify-write, which makes pops
/// atomic with respect to each other and to replacements. Exhausted draws keep
/// an empty record until they are deleted or expire.
///
/// Cloning is cheap and clones share the same records, so a single store can
/// be handed to many tasks.
///
/// With a ttl, expired records are dropped when they are next touched, and
/// every write sweeps the whole map at most once per ttl period, so records
/// nobody reads again are reclaimed within two ttl periods.
///
/// Only suitable when every caller runs in the same process. Use
/// `RedisStore` to share draws across replicas.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Records>>,
    ttl: Option<Duration>,
}

struct Records {
    map: HashMap<DrawId, Record>,
    last_sweep: Instant,
}

impl Default for Records {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            last_sweep: Instant::now(),
        }
    }
}

impl Records {
    fn sweep(&mut self, ttl: Duration, now: Instant) {
        if self
            .last_sweep
            .checked_add(ttl)
            .is_none_or(|next| now < next)
        {
            return;
        }
        #[cfg(feature = "tracing")]
        let before = self.map.len();
        self.map.retain(|_, record| !record.is_expired(now));
        self.last_sweep = now;

        #[cfg(feature = "tracing")]
        tracing::debug!(evicted = before - self.map.len(), "swept expired draws");
    }
}

impl MemoryStore {
    /// Creates a store whose records expire `ttl` after their last
    /// [`DrawStore::push_all`].
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: Arc::default(),
            ttl: Some(ttl),
        }
    }

    /// Number of live records, exhausted ones included.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.records
            .lock()
            .map
            .values()
            .filter(|record| !record.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` on the live record for `id`, evicting it first if expired.
    fn with_record<T>(&self, id: &DrawId, f: impl FnOnce(Option<&mut Record>) -> T) -> T {
        let mut guard = self.records.lock();
        let records = &mut guard.map;
        if records
            .get(id)
            .is_some_and(|record| record.is_expired(Instant::now()))
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(draw_id = %id, "evicting expired draw");
            records.remove(id);
        }
        f(records.get_mut(id))
    }
}

impl DrawStore for MemoryStore {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, entries), fields(draw_id = %id, count = entries.len())))]
    async fn push_all(&self, id: &DrawId, entries: Vec<String>) -> Result<(), StoreError> {
        let now = Instant::now();
        let record = Record {
            entries: entries.into(),
            expires_at: self.ttl.and_then(|ttl| now.checked_add(ttl)),
        };
        let mut records = self.records.lock();
        if let Some(ttl) = self.ttl {
            records.sweep(ttl, now);
        }
        records.map.insert(id.clone(), record);
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(draw_id = %id)))]
    async fn pop_one(&self, id: &DrawId) -> Result<Option<String>, StoreError> {
        Ok(self.with_record(id, |record| {
            record.and_then(|record| record.entries.pop_front())
        }))
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(draw_id = %id)))]
    async fn delete(&self, id: &DrawId) -> Result<bool, StoreError> {
        let now = Instant::now();
        let removed = self.records.lock().map.remove(id);
        Ok(removed.is_some_and(|record| !record.is_expired(now)))
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(draw_id = %id)))]
    async fn exists(&self, id: &DrawId) -> Result<bool, StoreError> {
        Ok(self.with_record(id, |record| record.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[tokio::test]
    async fn pops_in_pushed_order() {
        let store = MemoryStore::default();
        let id = DrawId::from("a");
        store.push_all(&id, entries(&["1", "2", "3"])).await.unwrap();

        assert_eq!(store.pop_one(&id).await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.pop_one(&id).await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.pop_one(&id).await.unwrap().as_deref(), Some("3"));
        assert_eq!(store.pop_one(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn exhausted_record_still_exists() {
        let store = MemoryStore::default();
        let id = DrawId::from("a");
        store.push_all(&id, entries(&["only"])).await.unwrap();
        store.pop_one(&id).await.unwrap();

        assert!(store.exists(&id).await.unwrap());
        assert_eq!(store.pop_one(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_push_creates_record() {
        let store = MemoryStore::default();
        let id = DrawId::from("empty");
        store.push_all(&id, Vec::new()).await.unwrap();
        assert!(store.exists(&id).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn push_overwrites_previous_sequence() {
        let store = MemoryStore::default();
        let id = DrawId::from("a");
        store.push_all(&id, entries(&["old1", "old2"])).await.unwrap();
        store.push_all(&id, entries(&["new"])).await.unwrap();

        assert_eq!(store.pop_one(&id).await.unwrap().as_deref(), Some("new"));
        assert_eq!(store.pop_one(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_reports_prior_existence() {
        let store = MemoryStore::default();
        let id = DrawId::from("a");
        assert!(!store.delete(&id).await.unwrap());

        store.push_all(&id, entries(&["x"])).await.unwrap();
        assert!(store.delete(&id).await.unwrap());
        assert!(!store.exists(&id).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let store = MemoryStore::default();
        let a = DrawId::from("a");
        let b = DrawId::from("b");
        store.push_all(&a, entries(&["a1"])).await.unwrap();
        store.push_all(&b, entries(&["b1"])).await.unwrap();

        assert_eq!(store.pop_one(&b).await.unwrap().as_deref(), Some("b1"));
        assert_eq!(store.pop_one(&a).await.unwrap().as_deref(), Some("a1"));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_records_are_evicted() {
        let store = MemoryStore::with_ttl(Duration::from_millis(20));
        let id = DrawId::from("a");
        store.push_all(&id, entries(&["x", "y"])).await.unwrap();
        assert!(store.exists(&id).await.unwrap());

        tokio::time::advance(Duration::from_millis(40)).await;

        assert!(!store.exists(&id).await.unwrap());
        assert_eq!(store.pop_one(&id).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn unrepresentable_ttl_never_expires() {
        let store = MemoryStore::with_ttl(Duration::MAX);
        let id = DrawId::from("a");
        store.push_all(&id, entries(&["x"])).await.unwrap();
        store.push_all(&DrawId::from("b"), Vec::new()).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.pop_one(&id).await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn untouched_expired_records_are_reclaimed_on_write() {
        let store = MemoryStore::with_ttl(Duration::from_millis(10));
        for i in 0..1_000 {
            let id = DrawId::new(format!("stale-{i}"));
            store.push_all(&id, entries(&["x"])).await.unwrap();
        }
        assert_eq!(store.records.lock().map.len(), 1_000);

        tokio::time::advance(Duration::from_millis(30)).await;

        for i in 0..10 {
            let id = DrawId::new(format!("fresh-{i}"));
            store.push_all(&id, entries(&["y"])).await.unwrap();
            assert_eq!(store.pop_one(&id).await.unwrap().as_deref(), Some("y"));
        }
        assert_eq!(store.len(), 10);
        assert_eq!(store.records.lock().map.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn live_records_survive_a_sweep() {
        let store = MemoryStore::with_ttl(Duration::from_millis(50));
        let old = DrawId::from("old");
        let recent = DrawId::from("recent");
        store.push_all(&old, entries(&["o"])).await.unwrap();

        tokio::time::advance(Duration::from_millis(30)).await;
        store.push_all(&recent, entries(&["r"])).await.unwrap();

        tokio::time::advance(Duration::from_millis(30)).await;
        store.push_all(&DrawId::from("trigger"), Vec::new()).await.unwrap();

        assert!(!store.records.lock().map.contains_key(&old));
        assert_eq!(store.pop_one(&recent).await.unwrap().as_deref(), Some("r"));
    }
}
