//! Per-session ingredient tracking.
//!
//! An [`AssemblySession`] is opened for one resolved remedy and lives as long
//! as the cooking page that owns it. The required set is fixed at creation;
//! the added set only grows. Sessions serialize to a JSON snapshot for the
//! host UI; nothing here is persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::assembly::status::AssemblyStatus;
use crate::error::AssemblyError;
use crate::remedy::Remedy;

/// Unique identifier for an assembly session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of offering an ingredient to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The ingredient was inserted; carries the recomputed status.
    Added(AssemblyStatus),
    /// The ingredient was already present; nothing changed.
    Duplicate(AssemblyStatus),
    /// The session is ready to mix and will not take new ingredients.
    Rejected(AssemblyStatus),
}

impl AddOutcome {
    /// Status after the call.
    #[must_use]
    pub const fn status(self) -> AssemblyStatus {
        match self {
            Self::Added(s) | Self::Duplicate(s) | Self::Rejected(s) => s,
        }
    }

    /// Returns true if the ingredient was inserted.
    #[must_use]
    pub const fn is_added(self) -> bool {
        matches!(self, Self::Added(_))
    }
}

/// Tracks required versus supplied ingredients for one remedy.
///
/// # Examples
///
/// ```
/// use remedy_core::{AssemblySession, AssemblyStatus};
///
/// let mut session = AssemblySession::new("Cold", ["Ginger", "Honey"]);
/// session.add_ingredient("Ginger").unwrap();
/// session.add_ingredient("Honey").unwrap();
/// assert_eq!(session.status(), AssemblyStatus::ReadyToMix);
/// assert_eq!(session.finalize().unwrap(), AssemblyStatus::Mixed);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AssemblySession {
    id: SessionId,
    remedy_name: String,
    required: IndexSet<String>,
    added: IndexSet<String>,
    status: AssemblyStatus,
    created_at: DateTime<Utc>,
    mixed_at: Option<DateTime<Utc>>,
}

impl AssemblySession {
    /// Open a session for `remedy_name`. Repeated ingredient names collapse.
    #[must_use]
    pub fn new<I, S>(remedy_name: impl Into<String>, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let required: IndexSet<String> = ingredients.into_iter().map(Into::into).collect();
        let session = Self {
            id: SessionId::new(),
            remedy_name: remedy_name.into(),
            required,
            added: IndexSet::new(),
            status: AssemblyStatus::Idle,
            created_at: Utc::now(),
            mixed_at: None,
        };
        debug!(
            session = %session.id,
            remedy = %session.remedy_name,
            required = session.required.len(),
            "assembly session opened"
        );
        session
    }

    /// Open a session for a resolved remedy.
    #[must_use]
    pub fn from_remedy(remedy: &Remedy) -> Self {
        Self::new(remedy.name.clone(), remedy.ingredients.iter().cloned())
    }

    /// Offer an ingredient.
    ///
    /// Duplicates are no-ops. Once the session is `ReadyToMix` further new
    /// ingredients are rejected so readiness cannot regress.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the session is already `Mixed`.
    pub fn add_ingredient(
        &mut self,
        name: impl Into<String>,
    ) -> Result<AddOutcome, AssemblyError> {
        let name = name.into();
        match self.status {
            AssemblyStatus::Mixed => {
                return Err(AssemblyError::InvalidTransition {
                    from: self.status,
                    action: "add an ingredient",
                })
            }
            _ if self.added.contains(&name) => {
                debug!(session = %self.id, ingredient = %name, "duplicate ingredient ignored");
                return Ok(AddOutcome::Duplicate(self.status));
            }
            AssemblyStatus::ReadyToMix => {
                debug!(
                    session = %self.id,
                    ingredient = %name,
                    "session ready, ingredient rejected"
                );
                return Ok(AddOutcome::Rejected(self.status));
            }
            AssemblyStatus::Idle | AssemblyStatus::InProgress => {}
        }

        self.added.insert(name);
        let previous = self.status;
        self.status = AssemblyStatus::derive(&self.required, &self.added);

        let (added, required) = self.progress();
        debug!(session = %self.id, added, required, status = %self.status, "ingredient added");
        if previous != self.status {
            info!(
                session = %self.id,
                from = %previous,
                to = %self.status,
                "assembly status changed"
            );
        }
        Ok(AddOutcome::Added(self.status))
    }

    /// Mix the remedy. Only valid while `ReadyToMix`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other state; the session is left
    /// unchanged.
    pub fn finalize(&mut self) -> Result<AssemblyStatus, AssemblyError> {
        if self.status != AssemblyStatus::ReadyToMix {
            return Err(AssemblyError::InvalidTransition {
                from: self.status,
                action: "finalize",
            });
        }
        self.status = AssemblyStatus::Mixed;
        self.mixed_at = Some(Utc::now());
        info!(session = %self.id, remedy = %self.remedy_name, "remedy mixed");
        Ok(self.status)
    }

    /// Whether a mix control should be offered to the user.
    #[must_use]
    pub fn can_finalize(&self) -> bool {
        self.status == AssemblyStatus::ReadyToMix
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> AssemblyStatus {
        self.status
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Name of the remedy being assembled.
    #[must_use]
    pub fn remedy_name(&self) -> &str {
        &self.remedy_name
    }

    /// Required ingredients in recipe order.
    #[must_use]
    pub const fn required(&self) -> &IndexSet<String> {
        &self.required
    }

    /// Added ingredients in the order they were supplied.
    #[must_use]
    pub const fn added(&self) -> &IndexSet<String> {
        &self.added
    }

    /// `(added, required)` counts.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.added.len(), self.required.len())
    }

    /// Required ingredients not yet added, in recipe order.
    #[must_use]
    pub fn missing(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|r| !self.added.contains(*r))
            .map(String::as_str)
            .collect()
    }

    /// Added ingredients that the remedy does not call for.
    #[must_use]
    pub fn unexpected(&self) -> Vec<&str> {
        self.added
            .iter()
            .filter(|a| !self.required.contains(*a))
            .map(String::as_str)
            .collect()
    }

    /// When the session was opened.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the remedy was mixed, if it has been.
    #[must_use]
    pub const fn mixed_at(&self) -> Option<DateTime<Utc>> {
        self.mixed_at
    }
}
