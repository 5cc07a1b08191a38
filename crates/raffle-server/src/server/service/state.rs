use crate::server::service::store::AnyStore;
use anyhow::Context;
use raffle::{CatalogEntry, DrawConfig, DrawManager, MemoryCatalog};
use std::path::Path;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    draws: DrawManager<AnyStore>,
    catalog: MemoryCatalog,
    max_entries: usize,
}

impl AppState {
    pub fn new(
        store: AnyStore,
        catalog: MemoryCatalog,
        draw_config: DrawConfig,
        max_entries: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                draws: DrawManager::with_config(store, draw_config),
                catalog,
                max_entries,
            }),
        }
    }

    pub fn draws(&self) -> &DrawManager<AnyStore> {
        &self.inner.draws
    }

    pub fn catalog(&self) -> &MemoryCatalog {
        &self.inner.catalog
    }

    pub fn max_entries(&self) -> usize {
        self.inner.max_entries
    }
}

/// Reads a JSON array of [`CatalogEntry`] records from `path`.
///
/// A missing path yields an empty catalog.
pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<MemoryCatalog> {
    let Some(path) = path else {
        tracing::info!("no catalog configured; catalog draws are disabled");
        return Ok(MemoryCatalog::new(Vec::new()));
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog `{}`", path.display()))?;
    let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog `{}`", path.display()))?;

    let catalog = MemoryCatalog::new(entries);
    tracing::info!(path = %path.display(), entries = catalog.len(), "catalog loaded");
    Ok(catalog)
}
