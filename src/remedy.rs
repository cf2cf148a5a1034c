//! Remedy records and the catalog that holds them.
//!
//! A [`RemedyCatalog`] is an immutable, ordered snapshot of every remedy
//! parsed from one load of the data source. Lookups elsewhere in the crate
//! rely on the catalog's load order being preserved.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// A single remedy: the canonical name of an ailment and how to treat it.
///
/// # Examples
///
/// ```
/// use remedy_core::Remedy;
///
/// let remedy = Remedy::new("Cold", ["Ginger", "Honey"]);
/// assert_eq!(remedy.name, "Cold");
/// assert_eq!(remedy.ingredients.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remedy {
    /// Canonical identifier, unique within a catalog.
    pub name: String,

    /// Ingredients in recipe order.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Free-text preparation steps, sentence delimited.
    #[serde(default)]
    pub instructions: String,

    /// Free-text description of what the remedy helps with.
    #[serde(default)]
    pub benefits: String,
}

impl Remedy {
    /// Creates a remedy with no instructions or benefits.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            instructions: String::new(),
            benefits: String::new(),
        }
    }

    /// Sets the preparation instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Sets the benefits text.
    #[must_use]
    pub fn with_benefits(mut self, benefits: impl Into<String>) -> Self {
        self.benefits = benefits.into();
        self
    }
}

impl fmt::Display for Remedy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ingredients)", self.name, self.ingredients.len())
    }
}

// The data source is either a bare record array or the game's
// `{ "remedies": [...] }` wrapper.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Bare(Vec<Remedy>),
    Wrapped { remedies: Vec<Remedy> },
}

/// An ordered, read-only collection of remedies from a single load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RemedyCatalog {
    remedies: Vec<Remedy>,
}

impl RemedyCatalog {
    /// Builds a catalog from remedies in load order.
    #[must_use]
    pub fn new(remedies: Vec<Remedy>) -> Self {
        Self { remedies }
    }

    /// Parses raw source text into a catalog.
    ///
    /// `source_name` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedData`] if the text is not a remedy
    /// record array (optionally wrapped in a `remedies` object).
    pub fn from_json(source_name: &str, text: &str) -> Result<Self, LoadError> {
        let doc: CatalogDocument =
            serde_json::from_str(text).map_err(|e| LoadError::MalformedData {
                name: source_name.to_string(),
                reason: e.to_string(),
            })?;
        let remedies = match doc {
            CatalogDocument::Bare(remedies) | CatalogDocument::Wrapped { remedies } => remedies,
        };
        Ok(Self { remedies })
    }

    /// Number of remedies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.remedies.len()
    }

    /// Returns true if the catalog holds no remedies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remedies.is_empty()
    }

    /// Iterates remedies in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Remedy> {
        self.remedies.iter()
    }

    /// Remedy names in load order, as shown on the selection screen.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.remedies.iter().map(|r| r.name.as_str()).collect()
    }

    /// Exact, case-sensitive lookup by canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Remedy> {
        self.remedies.iter().find(|r| r.name == name)
    }

    /// Stable content hash of the catalog.
    ///
    /// Two catalogs with the same remedies in the same order share a
    /// fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for remedy in &self.remedies {
            update_field(&mut hasher, &remedy.name);
            hasher.update(&(remedy.ingredients.len() as u64).to_le_bytes());
            for ingredient in &remedy.ingredients {
                update_field(&mut hasher, ingredient);
            }
            update_field(&mut hasher, &remedy.instructions);
            update_field(&mut hasher, &remedy.benefits);
        }
        hasher.finalize()
    }
}

// Length-prefixed so field boundaries cannot collide.
fn update_field(hasher: &mut blake3::Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

impl<'a> IntoIterator for &'a RemedyCatalog {
    type Item = &'a Remedy;
    type IntoIter = std::slice::Iter<'a, Remedy>;

    fn into_iter(self) -> Self::IntoIter {
        self.remedies.iter()
    }
}

impl FromIterator<Remedy> for RemedyCatalog {
    fn from_iter<T: IntoIterator<Item = Remedy>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
