//! Retry-driven remedy resolution.
//!
//! A consumer page may start before the catalog it needs has been published,
//! or after the page that owned the previous catalog was torn down. Rather
//! than assume any initialization order, the accessor polls the store with a
//! bounded budget: load on demand when the store is empty, resolve when it is
//! not, and suspend cooperatively between attempts.
//!
//! The suspension points are the only places this crate yields. Dropping the
//! returned future, or signalling its [`CancelToken`], stops further attempts;
//! a catalog load already completed is kept.

pub mod cancel;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::catalog::{lookup, CatalogStore, MatchStage};
use crate::config::RetryPolicy;
use crate::error::{ResolutionError, ResolutionFailure};
use crate::remedy::{Remedy, RemedyCatalog};

pub use cancel::{cancel_pair, CancelHandle, CancelToken};

/// A remedy obtained through [`resolve_with_retry`].
///
/// The remedy is an owned copy, detached from the catalog snapshot it came
/// from, so it survives later reloads or the store being dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The matched remedy.
    pub remedy: Remedy,
    /// Cascade stage that matched.
    pub stage: MatchStage,
    /// 1-based attempt on which the match happened.
    pub attempts: u32,
}

/// Resolve `query` against `store`, polling under `policy`.
///
/// Each attempt reads the current catalog. If none is published (or it has
/// no remedies) the store is asked to load, and a successful load is resolved
/// against straight away. A miss suspends for `policy.delay` before the next
/// attempt; no suspension follows the final attempt.
///
/// # Errors
///
/// - `EmptyQuery` if `query` is blank; nothing is polled
/// - `Cancelled` if `cancel` fires before a match
/// - `Exhausted` once `policy.max_attempts` attempts have missed
pub async fn resolve_with_retry(
    store: &CatalogStore,
    query: &str,
    policy: &RetryPolicy,
    cancel: &CancelToken,
) -> Result<Resolved, ResolutionError> {
    if query.trim().is_empty() {
        return Err(ResolutionError::EmptyQuery);
    }

    let cancelled = |attempts_tried| ResolutionError::Cancelled {
        query: query.to_string(),
        attempts_tried,
    };

    if cancel.is_cancelled() || !suspend(policy.initial_delay, cancel).await {
        return Err(cancelled(0));
    }

    debug!(query, max_attempts = policy.max_attempts, "resolving remedy");
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(cancelled(attempt - 1));
        }

        if let Some(catalog) = catalog_for_attempt(store, attempt, policy.max_attempts) {
            match lookup(&catalog, query) {
                Ok(hit) => {
                    info!(
                        query,
                        remedy = %hit.remedy.name,
                        stage = %hit.stage,
                        attempt,
                        "remedy resolved"
                    );
                    return Ok(Resolved {
                        remedy: hit.remedy.clone(),
                        stage: hit.stage,
                        attempts: attempt,
                    });
                }
                Err(e) => warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    available = ?catalog.names(),
                    error = %e,
                    "retrying"
                ),
            }
        }

        if attempt < policy.max_attempts && !suspend(policy.delay, cancel).await {
            return Err(cancelled(attempt));
        }
    }

    warn!(query, attempts = policy.max_attempts, "remedy resolution exhausted");
    Err(ResolutionError::Exhausted(ResolutionFailure {
        last_query: query.to_string(),
        attempts_tried: policy.max_attempts,
    }))
}

// Current non-empty catalog, loading on demand. `None` means this attempt
// has nothing to resolve against.
fn catalog_for_attempt(
    store: &CatalogStore,
    attempt: u32,
    max_attempts: u32,
) -> Option<Arc<RemedyCatalog>> {
    if let Some(catalog) = store.current().filter(|c| !c.is_empty()) {
        return Some(catalog);
    }

    warn!(attempt, max_attempts, source = store.source_name(), "catalog empty, loading");
    match store.load() {
        Ok(catalog) if !catalog.is_empty() => Some(catalog),
        Ok(_) => {
            warn!(attempt, source = store.source_name(), "loaded catalog has no remedies");
            None
        }
        Err(e) => {
            warn!(attempt, source = store.source_name(), error = %e, "catalog load failed");
            None
        }
    }
}

// Returns false if cancelled before `delay` elapsed.
async fn suspend(delay: Duration, cancel: &CancelToken) -> bool {
    if delay.is_zero() {
        tokio::task::yield_now().await;
        return !cancel.is_cancelled();
    }
    tokio::select! {
        () = tokio::time::sleep(delay) => true,
        () = cancel.cancelled() => false,
    }
}
