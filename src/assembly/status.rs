//! Assembly status and its derivation from ingredient sets.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Where an assembly session stands.
///
/// `Idle -> InProgress -> ReadyToMix -> Mixed`. Only `finalize` enters
/// `Mixed`, and only from `ReadyToMix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyStatus {
    /// Nothing added yet.
    Idle,
    /// Some ingredients added, but the added set differs from the required set.
    InProgress,
    /// The added set equals the required set.
    ReadyToMix,
    /// Terminal: the remedy has been mixed.
    Mixed,
}

impl AssemblyStatus {
    /// Derive the status of an open session from its ingredient sets.
    ///
    /// Never returns `Mixed`; that state is only reachable through `finalize`.
    #[must_use]
    pub fn derive(required: &IndexSet<String>, added: &IndexSet<String>) -> Self {
        if added.is_empty() {
            Self::Idle
        } else if added.len() == required.len() && added.iter().all(|a| required.contains(a)) {
            Self::ReadyToMix
        } else {
            Self::InProgress
        }
    }

    /// Returns true for `ReadyToMix` and `Mixed`.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::ReadyToMix | Self::Mixed)
    }

    /// Returns true once the session can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Mixed)
    }
}

impl fmt::Display for AssemblyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::InProgress => write!(f, "in progress"),
            Self::ReadyToMix => write!(f, "ready to mix"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}
