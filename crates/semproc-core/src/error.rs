use crate::identity::Lookup;
use crate::process::ProcessId;
use std::fmt;
use thiserror::Error;

/// Identity attribute that must be readable for a capture to succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Name,
    Path,
    LaunchTime,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Name => f.write_str("name"),
            Attribute::Path => f.write_str("executable path"),
            Attribute::LaunchTime => f.write_str("launch time"),
        }
    }
}

/// Why a lookup did not produce a [`crate::ProcessIdentity`]
///
/// Every variant means "no such process right now". None of them is fatal; the
/// caller decides whether to try again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No running process matches {0}")]
    NoMatch(Lookup),

    #[error("Process {0} is not running")]
    NotRunning(ProcessId),

    #[error("Could not read {attribute} of process {pid}")]
    AttributeUnavailable { pid: ProcessId, attribute: Attribute },

    #[error("Process {0} matched the lookup but exited before it could be captured")]
    Vanished(ProcessId),

    #[error("Process {0} has no code-signing identifier")]
    Unsigned(ProcessId),
}

impl ResolveError {
    /// Check if a later attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResolveError::NoMatch(_)
                | ResolveError::NotRunning(_)
                | ResolveError::AttributeUnavailable { .. }
                | ResolveError::Vanished(_)
        )
    }

    /// The process disappeared (or became unreadable) between enumeration and capture
    pub fn is_vanished(&self) -> bool {
        matches!(
            self,
            ResolveError::AttributeUnavailable { .. } | ResolveError::Vanished(_)
        )
    }
}
