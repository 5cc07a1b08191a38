use crate::{DrawId, DrawStore, StoreError};
use ::redis::{
    AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError,
    aio::ConnectionManager,
};
use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Key prefix of the marker that records a draw's existence.
///
/// Redis drops a list once its last element is popped, so the list key alone
/// cannot tell an exhausted draw from one that never existed.
pub const DRAW_META_KEY_PREFIX: &str = "draw-meta:";

/// Longest expiry sent to Redis; longer ttls are clamped to it.
pub const MAX_EXPIRY_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Connection settings for [`RedisStore`].
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db: i64,
    /// Expiry applied to every draw on write. `None` keeps draws forever.
    pub ttl: Option<Duration>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 6379,
            username: None,
            password: None,
            db: 0,
            ttl: None,
        }
    }
}

impl RedisConfig {
    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                username: self.username.clone(),
                password: self.password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        Self::new(format!("redis: {err}"))
    }
}

/// A [`DrawStore`] backed by Redis lists.
///
/// Each draw is a list at `draw:{id}` plus a marker at `draw-meta:{id}`.
///
/// - `push_all` runs `DEL`, `RPUSH`, `SET` (and `EXPIRE` with a ttl) inside a
///   single `MULTI`/`EXEC` transaction.
/// - `pop_one` is a single `LPOP`, which Redis executes atomically, so any
///   number of replicas can pop the same draw concurrently.
///
/// The underlying [`ConnectionManager`] multiplexes one connection across all
/// clones and reconnects on failure; cloning the store is cheap.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    ttl: Option<Duration>,
}

impl RedisStore {
    /// Connects to Redis and verifies the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or rejects the
    /// credentials.
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let client = Client::open(config.connection_info())?;
        let conn = ConnectionManager::new(client).await?;

        #[cfg(feature = "tracing")]
        tracing::info!(host = %config.host, port = config.port, "connected to redis");

        Ok(Self {
            conn,
            ttl: config.ttl,
        })
    }

    fn meta_key(id: &DrawId) -> String {
        format!("{DRAW_META_KEY_PREFIX}{id}")
    }

    fn ttl_secs(&self) -> Option<u64> {
        self.ttl.map(expiry_secs)
    }
}

// Redis expiries have one-second granularity; never round down to 0.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().clamp(1, MAX_EXPIRY_SECS)
}

impl DrawStore for RedisStore {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, entries), fields(draw_id = %id, count = entries.len())))]
    async fn push_all(&self, id: &DrawId, entries: Vec<String>) -> Result<(), StoreError> {
        let list_key = id.key();
        let meta_key = Self::meta_key(id);

        let mut pipe = ::redis::pipe();
        pipe.atomic()
            .del(vec![list_key.as_str(), meta_key.as_str()])
            .ignore();
        if !entries.is_empty() {
            pipe.rpush(&list_key, &entries).ignore();
        }
        match self.ttl_secs() {
            Some(secs) => {
                pipe.set_ex(&meta_key, 1, secs).ignore();
                if !entries.is_empty() {
                    pipe.expire(&list_key, i64::try_from(secs).unwrap_or(i64::MAX))
                        .ignore();
                }
            }
            None => {
                pipe.set(&meta_key, 1).ignore();
            }
        }

        let mut conn = self.conn.clone();
        let () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), fields(draw_id = %id)))]
    async fn pop_one(&self, id: &DrawId) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let entry: Option<String> = conn.lpop(id.key(), None).await?;
        Ok(entry)
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), fields(draw_id = %id)))]
    async fn delete(&self, id: &DrawId) -> Result<bool, StoreError> {
        let list_key = id.key();
        let meta_key = Self::meta_key(id);
        let mut conn = self.conn.clone();
        let removed: usize = conn
            .del(vec![list_key.as_str(), meta_key.as_str()])
            .await?;
        Ok(removed > 0)
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), fields(draw_id = %id)))]
    async fn exists(&self, id: &DrawId) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(Self::meta_key(id)).await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrawManager, Error, IdGenerator, RandomIdGenerator, ThreadRandom};
    use futures::future::join_all;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Connects to the server named by `REDIS_HOST` (and `REDIS_PORT`).
    async fn connect(ttl: Option<Duration>) -> RedisStore {
        let host = std::env::var("REDIS_HOST").expect("REDIS_HOST must be set");
        let port = std::env::var("REDIS_PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(6379);
        let config = RedisConfig {
            host,
            port,
            ttl,
            ..RedisConfig::default()
        };
        RedisStore::connect(&config).await.unwrap()
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    async fn key_exists(store: &RedisStore, key: String) -> bool {
        let mut conn = store.conn.clone();
        conn.exists(key).await.unwrap()
    }

    #[test]
    fn expiry_is_whole_seconds_within_range() {
        assert_eq!(expiry_secs(Duration::from_millis(10)), 1);
        assert_eq!(expiry_secs(Duration::from_secs(90)), 90);
        assert_eq!(expiry_secs(Duration::MAX), MAX_EXPIRY_SECS);
        assert!(i64::try_from(MAX_EXPIRY_SECS).is_ok());
    }

    #[tokio::test]
    #[ignore = "requires a Redis server at REDIS_HOST"]
    async fn drains_then_reports_exhausted() {
        let draws = DrawManager::new(connect(None).await);
        let id = draws.create(names(&["a", "b", "c"])).await.unwrap();

        let mut drawn = Vec::new();
        for _ in 0..3 {
            drawn.push(draws.draw_one(&id).await.unwrap());
        }
        drawn.sort();
        assert_eq!(drawn, ["a", "b", "c"]);

        // The list key is gone once empty; the marker keeps the draw alive.
        assert!(!key_exists(draws.store(), id.key()).await);
        assert!(matches!(
            draws.draw_one(&id).await,
            Err(Error::DrawExhausted { .. })
        ));
        assert!(draws.discard(&id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires a Redis server at REDIS_HOST"]
    async fn empty_create_writes_only_the_marker() {
        let draws = DrawManager::new(connect(None).await);
        let id = draws.create(Vec::new()).await.unwrap();

        assert!(key_exists(draws.store(), RedisStore::meta_key(&id)).await);
        assert!(!key_exists(draws.store(), id.key()).await);
        assert!(matches!(
            draws.draw_one(&id).await,
            Err(Error::DrawExhausted { .. })
        ));
        draws.discard(&id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Redis server at REDIS_HOST"]
    async fn replace_creates_an_absent_draw() {
        let draws = DrawManager::new(connect(None).await);
        let id = RandomIdGenerator::new(ThreadRandom).new_id();
        assert!(matches!(
            draws.draw_one(&id).await,
            Err(Error::DrawNotFound { .. })
        ));

        draws.replace(&id, names(&["x"])).await.unwrap();
        assert_eq!(draws.draw_one(&id).await.unwrap(), "x");
        assert!(matches!(
            draws.draw_one(&id).await,
            Err(Error::DrawExhausted { .. })
        ));
        draws.discard(&id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Redis server at REDIS_HOST"]
    async fn discard_removes_list_and_marker() {
        let draws = DrawManager::new(connect(None).await);
        let id = draws.create(names(&["a", "b"])).await.unwrap();

        assert!(draws.discard(&id).await.unwrap());
        assert!(!key_exists(draws.store(), id.key()).await);
        assert!(!key_exists(draws.store(), RedisStore::meta_key(&id)).await);
        assert!(!draws.discard(&id).await.unwrap());
        assert!(matches!(
            draws.draw_one(&id).await,
            Err(Error::DrawNotFound { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires a Redis server at REDIS_HOST"]
    async fn ttl_applies_to_list_and_marker() {
        let draws = DrawManager::new(connect(Some(Duration::from_secs(60))).await);
        let id = draws.create(names(&["a", "b"])).await.unwrap();

        let mut conn = draws.store().conn.clone();
        let list_ttl: i64 = conn.ttl(id.key()).await.unwrap();
        let meta_ttl: i64 = conn.ttl(RedisStore::meta_key(&id)).await.unwrap();
        assert!((1..=60).contains(&list_ttl), "list ttl {list_ttl}");
        assert!((1..=60).contains(&meta_ttl), "marker ttl {meta_ttl}");
        draws.discard(&id).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    #[ignore = "requires a Redis server at REDIS_HOST"]
    async fn concurrent_draws_hand_out_each_entry_once() {
        const N: usize = 128;
        let draws = Arc::new(DrawManager::new(connect(None).await));
        let input: Vec<String> = (0..N).map(|i| format!("entry-{i}")).collect();
        let id = draws.create(input.clone()).await.unwrap();

        let handles = (0..N + 8).map(|_| {
            let draws = Arc::clone(&draws);
            let id = id.clone();
            tokio::spawn(async move { draws.draw_one(&id).await })
        });
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let drawn: Vec<&String> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let unique: HashSet<&String> = drawn.iter().copied().collect();
        assert_eq!(drawn.len(), N);
        assert_eq!(unique, input.iter().collect::<HashSet<_>>());
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(Error::DrawExhausted { .. })))
                .count(),
            8
        );
        draws.discard(&id).await.unwrap();
    }

    #[test]
    fn list_and_marker_keys_do_not_collide() {
        let id = DrawId::from("x:live");
        let other = DrawId::from("x");
        assert_eq!(id.key(), "draw:x:live");
        assert_eq!(RedisStore::meta_key(&id), "draw-meta:x:live");
        assert_ne!(RedisStore::meta_key(&other), id.key());
    }

    #[test]
    fn connection_info_carries_credentials() {
        let config = RedisConfig {
            host: "redis".into(),
            port: 6380,
            username: Some("svc".into()),
            password: Some("secret".into()),
            ..RedisConfig::default()
        };
        let info = config.connection_info();
        assert!(matches!(
            &info.addr,
            ConnectionAddr::Tcp(host, 6380) if host == "redis"
        ));
        assert_eq!(info.redis.db, 0);
        assert_eq!(info.redis.username.as_deref(), Some("svc"));
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
    }
}
