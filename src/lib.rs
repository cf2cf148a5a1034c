//! # remedy-core - remedy resolution and assembly
//!
//! The core of the remedy kitchen game: given a loosely typed ailment name,
//! find the matching remedy in a catalog that may not be loaded yet, then
//! track the player's ingredient drops until the remedy can be mixed.
//!
//! ## Core Concepts
//!
//! - **Catalog**: an immutable, ordered snapshot of remedies from one load
//! - **Catalog store**: publishes catalogs atomically; reloadable on demand
//! - **Resolver**: a fixed cascade of name comparisons, first match wins
//! - **Retry accessor**: bounded, cancellable polling over the store
//! - **Assembly session**: required vs. added ingredients and the mix state
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use remedy_core::{CatalogStore, CookingFlow, DirectorySource, RetryPolicy};
//! use remedy_core::accessor::CancelToken;
//!
//! let store = CatalogStore::open(Arc::new(DirectorySource::new("data")), "remedies");
//! let policy = RetryPolicy::default();
//! let mut flow =
//!     CookingFlow::for_query(&store, "sore throat", &policy, &CancelToken::never()).await?;
//! flow.add_ingredient("Salt")?;
//! flow.add_ingredient("Water")?;
//! if flow.can_mix() {
//!     flow.mix()?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod accessor;
pub mod assembly;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flow;
pub mod remedy;
pub mod source;

// Re-export primary types at crate root for convenience
pub use accessor::{cancel_pair, resolve_with_retry, CancelHandle, CancelToken, Resolved};
pub use assembly::{AddOutcome, AssemblySession, AssemblyStatus, SessionId};
pub use catalog::{resolve, CatalogStore, MatchStage, Resolution, VariantKind};
pub use config::{RemedyConfig, RetryPolicy};
pub use error::{
    AssemblyError, FlowError, LoadError, RemedyError, RemedyResult, ResolutionError,
    ResolutionFailure, SelectionError,
};
pub use flow::{CookingFlow, InMemorySelection, SelectionStore};
pub use remedy::{Remedy, RemedyCatalog};
pub use source::{DirectorySource, InMemorySource, RemedySource};
