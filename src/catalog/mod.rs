//! Catalog layer modules.
//!
//! This module groups the catalog store and the name resolver that reads it.

pub mod resolver;
pub mod store;

pub use resolver::{
    lookup, query_variants, resolve, resolve_remedy, MatchStage, Resolution, VariantKind,
};
pub use store::CatalogStore;
