//! Error types for dispatch operations.

use std::path::PathBuf;

use crate::arch::ArchId;

/// Errors that can occur while dispatching to an architecture sub-build.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The architecture token failed validation.
    #[error("invalid architecture '{token}': {reason}")]
    InvalidArch {
        /// The rejected token.
        token: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No sub-build directory exists for the requested architecture.
    #[error("no sub-build for architecture '{arch}': {} is not a directory", path.display())]
    ArchNotFound {
        /// The requested architecture.
        arch: ArchId,
        /// The sub-build directory that was expected.
        path: PathBuf,
    },

    /// The sub-build program could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// The program that was invoked.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The sub-build ran and exited non-zero.
    #[error("sub-build target '{target}' exited with status {code}")]
    SubBuild {
        /// The target that was forwarded.
        target: String,
        /// The sub-build's exit code, propagated verbatim.
        code: i32,
    },

    /// The sub-build was killed by a signal before exiting.
    #[error("sub-build target '{target}' was terminated by a signal")]
    Terminated {
        /// The target that was forwarded.
        target: String,
    },
}

impl DispatchError {
    /// Process exit code for this failure.
    ///
    /// A failed sub-build propagates its own exit code verbatim. A missing
    /// architecture gets the reserved code 2 so callers can tell it apart
    /// from a sub-build failure. Everything else is a generic 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SubBuild { code, .. } => *code,
            Self::ArchNotFound { .. } => 2,
            _ => 1,
        }
    }
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
