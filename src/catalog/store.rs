//! Catalog store with atomic publication.
//!
//! Readers load an `Arc<RemedyCatalog>` snapshot and keep using it for as
//! long as they need; a reload builds a complete replacement catalog and
//! publishes it with a single pointer swap. Readers therefore observe either
//! the previous catalog or the new one, never a partially parsed state.
//!
//! Concurrent `load` calls do not coordinate: the last one to publish wins.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::remedy::RemedyCatalog;
use crate::source::RemedySource;

/// Owner of the currently published remedy catalog.
pub struct CatalogStore {
    source: Arc<dyn RemedySource>,
    source_name: String,
    current: ArcSwapOption<RemedyCatalog>,
    generation: AtomicU64,
}

impl CatalogStore {
    /// Create an empty store. Nothing is loaded until [`CatalogStore::load`].
    #[must_use]
    pub fn new(source: Arc<dyn RemedySource>, source_name: impl Into<String>) -> Self {
        Self {
            source,
            source_name: source_name.into(),
            current: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
        }
    }

    /// Create a store and attempt an initial load.
    ///
    /// A failed first load is logged and leaves the store empty; consumers
    /// recover through [`CatalogStore::ensure_loaded`] or the retry accessor.
    #[must_use]
    pub fn open(source: Arc<dyn RemedySource>, source_name: impl Into<String>) -> Self {
        let store = Self::new(source, source_name);
        if let Err(e) = store.load() {
            warn!(source = %store.source_name, error = %e, "initial catalog load failed");
        }
        store
    }

    /// Logical name passed to the source.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Parse the source and publish the result as the current catalog.
    ///
    /// # Errors
    ///
    /// - `SourceMissing` if the source holds nothing under the store's name
    /// - `MalformedData` if the text cannot be parsed
    /// - `Io` if the source cannot be read
    ///
    /// On error the previously published catalog (if any) stays current.
    pub fn load(&self) -> Result<Arc<RemedyCatalog>, LoadError> {
        let text = self
            .source
            .fetch(&self.source_name)?
            .ok_or_else(|| LoadError::SourceMissing {
                name: self.source_name.clone(),
            })?;

        let catalog = Arc::new(RemedyCatalog::from_json(&self.source_name, &text)?);
        let fingerprint = catalog.fingerprint();

        let previous = self.current.swap(Some(Arc::clone(&catalog)));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let changed = previous.map_or(true, |prev| prev.fingerprint() != fingerprint);

        info!(
            source = %self.source_name,
            remedies = catalog.len(),
            generation,
            changed,
            fingerprint = %fingerprint.to_hex(),
            "remedy catalog loaded"
        );
        Ok(catalog)
    }

    /// The last successfully loaded catalog, or `None` if nothing has loaded.
    #[must_use]
    pub fn current(&self) -> Option<Arc<RemedyCatalog>> {
        self.current.load_full()
    }

    /// Returns true if a non-empty catalog is published.
    #[must_use]
    pub fn has_remedies(&self) -> bool {
        let guard = self.current.load();
        (*guard).as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Return the current catalog, loading it first if none is published or
    /// the published one has no remedies.
    ///
    /// # Errors
    ///
    /// Propagates the [`LoadError`] of the on-demand load.
    pub fn ensure_loaded(&self) -> Result<Arc<RemedyCatalog>, LoadError> {
        match self.current() {
            Some(catalog) if !catalog.is_empty() => Ok(catalog),
            _ => {
                debug!(source = %self.source_name, "catalog empty, reloading");
                self.load()
            }
        }
    }

    /// Drop the published catalog. Readers holding a snapshot keep it.
    pub fn clear(&self) {
        if self.current.swap(None).is_some() {
            debug!(source = %self.source_name, "remedy catalog cleared");
        }
    }

    /// Number of successful loads since the store was created.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.current.load();
        f.debug_struct("CatalogStore")
            .field("source_name", &self.source_name)
            .field("remedies", &(*guard).as_ref().map(|c| c.len()))
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
