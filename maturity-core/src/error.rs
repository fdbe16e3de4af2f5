//! Error types for maturity core.

use std::path::PathBuf;
use std::{error::Error, fmt, io};

/// Error type for maturity core operations.
#[derive(Debug)]
pub enum MaturityError {
    /// An underlying I/O error.
    Io(io::Error),
    /// A JSON payload could not be encoded or decoded.
    Json(serde_json::Error),
    /// A package manifest could not be understood.
    Manifest {
        /// Manifest location.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// Two criteria were registered under the same id.
    DuplicateCriterion(String),
}

impl fmt::Display for MaturityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Manifest { path, message } => {
                write!(f, "invalid manifest {}: {message}", path.display())
            }
            Self::DuplicateCriterion(id) => write!(f, "duplicate criterion id: {id}"),
        }
    }
}

impl Error for MaturityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MaturityError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MaturityError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Convenience result type for maturity core.
pub type Result<T> = std::result::Result<T, MaturityError>;
