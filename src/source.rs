//! Raw remedy data sources.
//!
//! A source maps a logical name (for example `"remedies"`) to the raw text
//! of a remedy document. Parsing happens in the catalog store; sources only
//! fetch bytes.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::LoadError;

/// Provider of raw remedy document text.
///
/// Implementations must be safe to call from several independent catalog
/// stores at once.
pub trait RemedySource: Send + Sync {
    /// Fetch the text stored under `name`.
    ///
    /// Returns `Ok(None)` when nothing is stored under that name.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the source exists but cannot be read.
    fn fetch(&self, name: &str) -> Result<Option<String>, LoadError>;
}

fn lock_err(name: &str) -> LoadError {
    LoadError::Io {
        name: name.to_string(),
        reason: "poisoned lock".to_string(),
    }
}

/// In-memory source for tests and embedders that already hold the data.
#[derive(Debug, Default)]
pub struct InMemorySource {
    documents: RwLock<HashMap<String, String>>,
}

impl InMemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding a single document.
    #[must_use]
    pub fn with_document(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut documents = HashMap::new();
        documents.insert(name.into(), text.into());
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Store or replace a document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the internal lock is poisoned.
    pub fn put(&self, name: impl Into<String>, text: impl Into<String>) -> Result<(), LoadError> {
        let name = name.into();
        let mut documents = self.documents.write().map_err(|_| lock_err(&name))?;
        documents.insert(name, text.into());
        Ok(())
    }

    /// Remove a document, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the internal lock is poisoned.
    pub fn remove(&self, name: &str) -> Result<bool, LoadError> {
        let mut documents = self.documents.write().map_err(|_| lock_err(name))?;
        Ok(documents.remove(name).is_some())
    }
}

impl RemedySource for InMemorySource {
    fn fetch(&self, name: &str) -> Result<Option<String>, LoadError> {
        let documents = self.documents.read().map_err(|_| lock_err(name))?;
        Ok(documents.get(name).cloned())
    }
}

/// Reads `<root>/<name>.json` from disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Extension appended to logical names.
    pub const EXTENSION: &'static str = "json";

    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory documents are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a logical name maps to.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{}", Self::EXTENSION))
    }
}

impl RemedySource for DirectorySource {
    fn fetch(&self, name: &str) -> Result<Option<String>, LoadError> {
        let path = self.path_for(name);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LoadError::Io {
                name: name.to_string(),
                reason: format!("{}: {e}", path.display()),
            }),
        }
    }
}
