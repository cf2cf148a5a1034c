//! The cooking flow: resolve the selected remedy, then assemble it.
//!
//! The selection screen writes the chosen ailment into a [`SelectionStore`];
//! the cooking page reads it back, resolves it through the retry accessor,
//! and drives an [`AssemblySession`] from the user's ingredient drops.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, info, warn};

use crate::accessor::{resolve_with_retry, CancelToken};
use crate::assembly::{AddOutcome, AssemblySession, AssemblyStatus};
use crate::catalog::{CatalogStore, MatchStage};
use crate::config::RetryPolicy;
use crate::error::{FlowError, SelectionError};
use crate::remedy::Remedy;

/// Key under which the current selection is stored.
pub const SELECTED_REMEDY_KEY: &str = "selected_remedy";

/// Durable key-value storage for the user's current selection.
pub trait SelectionStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Read`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SelectionError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Write`] if the value was not stored.
    fn set(&self, key: &str, value: &str) -> Result<(), SelectionError>;

    /// Remove a value. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Write`] if the value could not be removed.
    fn remove(&self, key: &str) -> Result<(), SelectionError>;
}

/// Process-local [`SelectionStore`].
#[derive(Debug, Default)]
pub struct InMemorySelection {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySelection {
    /// Create an empty selection store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(key: &str) -> String {
    format!("poisoned lock while accessing '{key}'")
}

impl SelectionStore for InMemorySelection {
    fn get(&self, key: &str) -> Result<Option<String>, SelectionError> {
        let values = self.values.read().map_err(|_| SelectionError::Read {
            key: key.to_string(),
            reason: poisoned(key),
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SelectionError> {
        let mut values = self.values.write().map_err(|_| SelectionError::Write {
            key: key.to_string(),
            reason: poisoned(key),
        })?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SelectionError> {
        let mut values = self.values.write().map_err(|_| SelectionError::Write {
            key: key.to_string(),
            reason: poisoned(key),
        })?;
        values.remove(key);
        Ok(())
    }
}

/// Record `remedy_name` as the current selection.
///
/// # Errors
///
/// Returns the store's error if the selection was not recorded.
pub fn select_remedy(
    selection: &dyn SelectionStore,
    remedy_name: &str,
) -> Result<(), SelectionError> {
    selection.set(SELECTED_REMEDY_KEY, remedy_name)?;
    debug!(remedy = remedy_name, "remedy selected");
    Ok(())
}

/// The current selection, if a non-blank one is stored.
///
/// # Errors
///
/// Returns the store's error if the selection cannot be read.
pub fn current_selection(
    selection: &dyn SelectionStore,
) -> Result<Option<String>, SelectionError> {
    Ok(selection
        .get(SELECTED_REMEDY_KEY)?
        .filter(|s| !s.trim().is_empty()))
}

/// Forget the current selection and reload the catalog.
///
/// # Errors
///
/// - `Selection` if the selection cannot be cleared; nothing is reloaded
/// - `Load` if the reload fails; the selection stays cleared
pub fn reset_selection(
    selection: &dyn SelectionStore,
    store: &CatalogStore,
) -> Result<(), FlowError> {
    selection.remove(SELECTED_REMEDY_KEY)?;
    store.load()?;
    Ok(())
}

/// One cooking page: a resolved remedy and its assembly session.
#[derive(Debug)]
pub struct CookingFlow {
    remedy: Remedy,
    stage: MatchStage,
    attempts: u32,
    session: AssemblySession,
}

impl CookingFlow {
    /// Resolve the stored selection and open an assembly session for it.
    ///
    /// # Errors
    ///
    /// - `NoSelection` if nothing is selected
    /// - `Selection` if the selection store cannot be read
    /// - `Resolution` if the remedy cannot be resolved or the wait was
    ///   cancelled
    pub async fn start(
        store: &CatalogStore,
        selection: &dyn SelectionStore,
        policy: &RetryPolicy,
        cancel: &CancelToken,
    ) -> Result<Self, FlowError> {
        let Some(query) = current_selection(selection)? else {
            warn!("cooking flow started without a selection");
            return Err(FlowError::NoSelection);
        };
        Self::for_query(store, &query, policy, cancel).await
    }

    /// Resolve `query` directly and open an assembly session for it.
    ///
    /// # Errors
    ///
    /// Returns `Resolution` if the remedy cannot be resolved.
    pub async fn for_query(
        store: &CatalogStore,
        query: &str,
        policy: &RetryPolicy,
        cancel: &CancelToken,
    ) -> Result<Self, FlowError> {
        let resolved = resolve_with_retry(store, query, policy, cancel).await?;
        let session = AssemblySession::from_remedy(&resolved.remedy);
        info!(
            remedy = %resolved.remedy.name,
            session = %session.id(),
            ingredients = session.required().len(),
            "cooking flow ready"
        );
        Ok(Self {
            remedy: resolved.remedy,
            stage: resolved.stage,
            attempts: resolved.attempts,
            session,
        })
    }

    /// The resolved remedy.
    #[must_use]
    pub const fn remedy(&self) -> &Remedy {
        &self.remedy
    }

    /// How the selection was matched.
    #[must_use]
    pub const fn match_stage(&self) -> MatchStage {
        self.stage
    }

    /// Attempts the resolution took.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The assembly session.
    #[must_use]
    pub const fn session(&self) -> &AssemblySession {
        &self.session
    }

    /// Current assembly status.
    #[must_use]
    pub const fn status(&self) -> AssemblyStatus {
        self.session.status()
    }

    /// Deliver an ingredient drop.
    ///
    /// # Errors
    ///
    /// Returns `Assembly` if the remedy has already been mixed.
    pub fn add_ingredient(&mut self, name: &str) -> Result<AddOutcome, FlowError> {
        Ok(self.session.add_ingredient(name)?)
    }

    /// Whether the mix control should be shown.
    #[must_use]
    pub fn can_mix(&self) -> bool {
        self.session.can_finalize()
    }

    /// Mix the remedy.
    ///
    /// # Errors
    ///
    /// Returns `Assembly` unless the session is ready to mix.
    pub fn mix(&mut self) -> Result<AssemblyStatus, FlowError> {
        Ok(self.session.finalize()?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::error::{AssemblyError, LoadError, ResolutionError};
    use crate::source::InMemorySource;

    const CATALOG: &str = r#"{ "remedies": [
        { "name": "Cold", "ingredients": ["Ginger", "Honey"], "benefits": "Warms" }
    ] }"#;

    fn store() -> CatalogStore {
        CatalogStore::open(
            Arc::new(InMemorySource::with_document("remedies", CATALOG)),
            "remedies",
        )
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_millis(100))
    }

    // Storage that is always unavailable.
    struct UnavailableSelection;

    impl SelectionStore for UnavailableSelection {
        fn get(&self, key: &str) -> Result<Option<String>, SelectionError> {
            Err(SelectionError::Read {
                key: key.to_string(),
                reason: "storage offline".to_string(),
            })
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), SelectionError> {
            Err(SelectionError::Write {
                key: key.to_string(),
                reason: "storage offline".to_string(),
            })
        }

        fn remove(&self, key: &str) -> Result<(), SelectionError> {
            Err(SelectionError::Write {
                key: key.to_string(),
                reason: "storage offline".to_string(),
            })
        }
    }

    // Compile-time test: ensure the trait is object-safe
    fn _assert_selection_store_object_safe(_: &dyn SelectionStore) {}

    #[test]
    fn test_selection_roundtrip_and_blank() {
        let selection = InMemorySelection::new();
        assert_eq!(current_selection(&selection).unwrap(), None);

        select_remedy(&selection, "Cold").unwrap();
        assert_eq!(current_selection(&selection).unwrap().as_deref(), Some("Cold"));

        select_remedy(&selection, "  ").unwrap();
        assert_eq!(current_selection(&selection).unwrap(), None);
    }

    #[test]
    fn test_reset_clears_selection_and_reloads() {
        let store = store();
        let selection = InMemorySelection::new();
        select_remedy(&selection, "Cold").unwrap();

        reset_selection(&selection, &store).unwrap();
        assert_eq!(current_selection(&selection).unwrap(), None);
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_reset_reports_reload_failure_after_clearing() {
        let store = CatalogStore::new(Arc::new(InMemorySource::new()), "remedies");
        let selection = InMemorySelection::new();
        select_remedy(&selection, "Cold").unwrap();

        let err = reset_selection(&selection, &store).unwrap_err();
        assert!(matches!(err, FlowError::Load(LoadError::SourceMissing { .. })));
        assert_eq!(current_selection(&selection).unwrap(), None);
    }

    #[test]
    fn test_selection_store_failures_are_reported() {
        let store = store();
        let err = select_remedy(&UnavailableSelection, "Cold").unwrap_err();
        assert!(matches!(err, SelectionError::Write { .. }));
        assert!(current_selection(&UnavailableSelection).is_err());

        let err = reset_selection(&UnavailableSelection, &store).unwrap_err();
        assert!(matches!(err, FlowError::Selection(SelectionError::Write { .. })));
        // The catalog is not reloaded when the selection could not be cleared.
        assert_eq!(store.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_without_selection() {
        let selection = InMemorySelection::new();
        let err = CookingFlow::start(&store(), &selection, &policy(), &CancelToken::never())
            .await
            .unwrap_err();
        assert_eq!(err, FlowError::NoSelection);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_with_unreadable_selection() {
        let cancel = CancelToken::never();
        let err = CookingFlow::start(&store(), &UnavailableSelection, &policy(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Selection(SelectionError::Read { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cooking_flow() {
        let store = store();
        let selection = InMemorySelection::new();
        select_remedy(&selection, "cold").unwrap();

        let mut flow = CookingFlow::start(&store, &selection, &policy(), &CancelToken::never())
            .await
            .unwrap();
        assert_eq!(flow.remedy().benefits, "Warms");
        assert_eq!(flow.match_stage(), MatchStage::CaseInsensitive);
        assert_eq!(flow.attempts(), 1);
        assert_eq!(flow.status(), AssemblyStatus::Idle);

        assert!(matches!(flow.mix(), Err(FlowError::Assembly(_))));

        flow.add_ingredient("Ginger").unwrap();
        assert!(!flow.can_mix());
        flow.add_ingredient("Honey").unwrap();
        assert!(flow.can_mix());
        assert_eq!(flow.mix().unwrap(), AssemblyStatus::Mixed);

        let err = flow.add_ingredient("Salt").unwrap_err();
        assert!(matches!(
            err,
            FlowError::Assembly(AssemblyError::InvalidTransition { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_selection_degrades_to_error() {
        let store = store();
        let selection = InMemorySelection::new();
        select_remedy(&selection, "Fever").unwrap();

        let err = CookingFlow::start(&store, &selection, &policy(), &CancelToken::never())
            .await
            .unwrap_err();
        match err {
            FlowError::Resolution(ResolutionError::Exhausted(failure)) => {
                assert_eq!(failure.last_query, "Fever");
                assert_eq!(failure.attempts_tried, 2);
            }
            other => panic!("expected exhausted resolution, got {other:?}"),
        }
    }
}
