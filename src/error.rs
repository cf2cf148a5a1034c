//! Error types for the remedy core.
//!
//! All errors are strongly typed using thiserror. Each layer (catalog
//! loading, name resolution, assembly, the consumer flow) owns its own enum
//! and `RemedyError` wraps them so callers can match on a single type.

use thiserror::Error;

use crate::assembly::AssemblyStatus;

/// Errors raised while loading a remedy catalog from its source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Remedy source '{name}' not found")]
    SourceMissing {
        name: String,
    },

    #[error("Remedy source '{name}' is malformed: {reason}")]
    MalformedData {
        name: String,
        reason: String,
    },

    #[error("Failed to read remedy source '{name}': {reason}")]
    Io {
        name: String,
        reason: String,
    },
}

/// Terminal outcome of a retry loop that ran out of attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    /// The query that was being resolved when the budget ran out.
    pub last_query: String,
    /// Number of attempts actually performed.
    pub attempts_tried: u32,
}

/// Errors raised while mapping a query to a remedy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("No remedy matches '{query}'")]
    NotFound {
        query: String,
    },

    #[error("Could not resolve remedy '{}' after {} attempts", .0.last_query, .0.attempts_tried)]
    Exhausted(ResolutionFailure),

    #[error("Resolution of '{query}' was cancelled after {attempts_tried} attempts")]
    Cancelled {
        query: String,
        attempts_tried: u32,
    },

    #[error("Resolution query cannot be empty")]
    EmptyQuery,
}

impl ResolutionError {
    /// Returns the failure record when attempts were exhausted.
    #[must_use]
    pub const fn failure(&self) -> Option<&ResolutionFailure> {
        match self {
            Self::Exhausted(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Errors raised by the assembly state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("Cannot {action} while assembly is {from}")]
    InvalidTransition {
        from: AssemblyStatus,
        action: &'static str,
    },
}

/// Errors raised by the durable selection store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Failed to read selection '{key}': {reason}")]
    Read {
        key: String,
        reason: String,
    },

    #[error("Failed to write selection '{key}': {reason}")]
    Write {
        key: String,
        reason: String,
    },
}

/// Errors raised by the cooking flow that ties resolution and assembly together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("No remedy has been selected")]
    NoSelection,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Top-level error type for the remedy core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemedyError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("No remedy has been selected")]
    NoSelection,

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },
}

impl RemedyError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this is a load error.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Returns true if this is a resolution error.
    #[must_use]
    pub const fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }

    /// Returns true if this is an assembly error.
    #[must_use]
    pub const fn is_assembly(&self) -> bool {
        matches!(self, Self::Assembly(_))
    }

    /// Returns true if the selection store failed or nothing was selected.
    #[must_use]
    pub const fn is_selection(&self) -> bool {
        matches!(self, Self::Selection(_) | Self::NoSelection)
    }

    /// Returns true if repeating the failed call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Load(e) => matches!(e, LoadError::SourceMissing { .. } | LoadError::Io { .. }),
            Self::Resolution(e) => matches!(
                e,
                ResolutionError::NotFound { .. } | ResolutionError::Exhausted(_)
            ),
            Self::Selection(_) => true,
            // Usage errors won't change on retry
            Self::Assembly(_) | Self::NoSelection | Self::Config { .. } => false,
        }
    }
}

impl From<FlowError> for RemedyError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::NoSelection => Self::NoSelection,
            FlowError::Selection(e) => Self::Selection(e),
            FlowError::Load(e) => Self::Load(e),
            FlowError::Resolution(e) => Self::Resolution(e),
            FlowError::Assembly(e) => Self::Assembly(e),
        }
    }
}

/// Result type alias for remedy core operations.
pub type RemedyResult<T> = Result<T, RemedyError>;
