//! Name resolution against a remedy catalog.
//!
//! Queries come from a selection screen and are only loosely normalized, so
//! lookup runs a fixed cascade of increasingly forgiving comparisons. Each
//! stage scans the whole catalog in load order before the next stage runs;
//! the first hit wins. Resolution is pure and may be repeated freely while
//! polling.

use std::fmt;

use crate::error::ResolutionError;
use crate::remedy::{Remedy, RemedyCatalog};

/// Query rewrites tried by the final cascade stage, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// Entire query lower-cased.
    Lowercase,
    /// Entire query upper-cased.
    Uppercase,
    /// First letter of each word upper-cased, the rest lower-cased.
    TitleCase,
    /// All spaces removed.
    SpacesRemoved,
    /// Hyphens replaced by spaces.
    HyphensToSpaces,
}

impl VariantKind {
    /// All variants in cascade order.
    pub const ALL: [Self; 5] = [
        Self::Lowercase,
        Self::Uppercase,
        Self::TitleCase,
        Self::SpacesRemoved,
        Self::HyphensToSpaces,
    ];

    /// Apply this rewrite to `query`.
    #[must_use]
    pub fn apply(self, query: &str) -> String {
        match self {
            Self::Lowercase => query.to_lowercase(),
            Self::Uppercase => query.to_uppercase(),
            Self::TitleCase => title_case(query),
            Self::SpacesRemoved => query.replace(' ', ""),
            Self::HyphensToSpaces => query.replace('-', " "),
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lowercase => write!(f, "lowercase"),
            Self::Uppercase => write!(f, "uppercase"),
            Self::TitleCase => write!(f, "title-case"),
            Self::SpacesRemoved => write!(f, "spaces-removed"),
            Self::HyphensToSpaces => write!(f, "hyphens-to-spaces"),
        }
    }
}

/// The cascade stage that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStage {
    /// Ordinal, case-sensitive equality.
    Exact,
    /// Case-insensitive equality.
    CaseInsensitive,
    /// Case-insensitive equality after trimming both sides.
    Trimmed,
    /// Case-insensitive equality against a rewritten query.
    Variant(VariantKind),
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::CaseInsensitive => write!(f, "case-insensitive"),
            Self::Trimmed => write!(f, "trimmed"),
            Self::Variant(kind) => write!(f, "variant:{kind}"),
        }
    }
}

/// A successful lookup: the remedy and how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// The matched remedy, borrowed from the catalog.
    pub remedy: &'a Remedy,
    /// Stage of the cascade that matched.
    pub stage: MatchStage,
}

/// Resolve `query` to a remedy in `catalog`.
///
/// Stages, each scanned over the catalog in load order:
/// 1. exact equality
/// 2. case-insensitive equality
/// 3. case-insensitive equality after trimming both sides
/// 4. case-insensitive equality against each [`VariantKind`] rewrite of the
///    query, rewrites tried in [`VariantKind::ALL`] order
///
/// # Examples
///
/// ```
/// use remedy_core::{Remedy, RemedyCatalog};
/// use remedy_core::catalog::{resolve, MatchStage};
///
/// let catalog = RemedyCatalog::new(vec![Remedy::new("Sore Throat", ["Salt"])]);
/// let hit = resolve(&catalog, "  sore throat ").unwrap();
/// assert_eq!(hit.remedy.name, "Sore Throat");
/// assert_eq!(hit.stage, MatchStage::Trimmed);
/// ```
#[must_use]
pub fn resolve<'a>(catalog: &'a RemedyCatalog, query: &str) -> Option<Resolution<'a>> {
    if let Some(remedy) = catalog.iter().find(|r| r.name == query) {
        return Some(Resolution {
            remedy,
            stage: MatchStage::Exact,
        });
    }
    if let Some(remedy) = catalog.iter().find(|r| eq_ignore_case(&r.name, query)) {
        return Some(Resolution {
            remedy,
            stage: MatchStage::CaseInsensitive,
        });
    }
    let trimmed = query.trim();
    if let Some(remedy) = catalog.iter().find(|r| eq_ignore_case(r.name.trim(), trimmed)) {
        return Some(Resolution {
            remedy,
            stage: MatchStage::Trimmed,
        });
    }
    for (kind, variant) in query_variants(query) {
        if let Some(remedy) = catalog.iter().find(|r| eq_ignore_case(&r.name, &variant)) {
            return Some(Resolution {
                remedy,
                stage: MatchStage::Variant(kind),
            });
        }
    }
    None
}

/// Like [`resolve`] but returns only the remedy.
#[must_use]
pub fn resolve_remedy<'a>(catalog: &'a RemedyCatalog, query: &str) -> Option<&'a Remedy> {
    resolve(catalog, query).map(|r| r.remedy)
}

/// Like [`resolve`] but reports a miss as [`ResolutionError::NotFound`].
///
/// # Errors
///
/// Returns `NotFound` if no cascade stage matches.
pub fn lookup<'a>(
    catalog: &'a RemedyCatalog,
    query: &str,
) -> Result<Resolution<'a>, ResolutionError> {
    resolve(catalog, query).ok_or_else(|| ResolutionError::NotFound {
        query: query.to_string(),
    })
}

/// The stage-4 rewrites of `query`, in cascade order.
#[must_use]
pub fn query_variants(query: &str) -> Vec<(VariantKind, String)> {
    VariantKind::ALL
        .iter()
        .map(|&kind| (kind, kind.apply(query)))
        .collect()
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() || c == '-' {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
