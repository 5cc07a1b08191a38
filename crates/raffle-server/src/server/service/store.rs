use crate::server::config::StoreConfig;
use raffle::{DrawId, DrawStore, MemoryStore, RedisStore, StoreError};

/// The draw store selected at startup.
#[derive(Clone)]
pub enum AnyStore {
    Memory(MemoryStore),
    Redis(RedisStore),
}

impl AnyStore {
    /// Builds the configured backend, connecting to Redis when selected.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        match config {
            StoreConfig::Memory { ttl: None } => Ok(Self::Memory(MemoryStore::default())),
            StoreConfig::Memory { ttl: Some(ttl) } => Ok(Self::Memory(MemoryStore::with_ttl(*ttl))),
            StoreConfig::Redis(redis) => Ok(Self::Redis(RedisStore::connect(redis).await?)),
        }
    }

    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis(_) => "redis",
        }
    }
}

impl DrawStore for AnyStore {
    async fn push_all(&self, id: &DrawId, entries: Vec<String>) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.push_all(id, entries).await,
            Self::Redis(store) => store.push_all(id, entries).await,
        }
    }

    async fn pop_one(&self, id: &DrawId) -> Result<Option<String>, StoreError> {
        match self {
            Self::Memory(store) => store.pop_one(id).await,
            Self::Redis(store) => store.pop_one(id).await,
        }
    }

    async fn delete(&self, id: &DrawId) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.delete(id).await,
            Self::Redis(store) => store.delete(id).await,
        }
    }

    async fn exists(&self, id: &DrawId) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.exists(id).await,
            Self::Redis(store) => store.exists(id).await,
        }
    }
}
