//! Fatal analysis errors.
//!
//! User-facing problems (unresolvable specifiers, cycles, premature uses) are
//! [`Issue`](crate::Issue)s and never travel through this type. An
//! [`AnalysisError`] means the linking or evaluation algorithm reached a state
//! its own invariants rule out, or the entrypoint itself could not be read.

use crate::runtime::RuntimeError;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// An algorithm step found the module graph in an impossible state.
    #[error("Assertion failed in {algorithm} step {part}.")]
    Assertion {
        algorithm: &'static str,
        part: &'static str,
    },

    /// Data handed over by the parser did not have the expected shape.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The entrypoint could not be read.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Fail with [`AnalysisError::Assertion`] unless `condition` holds.
pub(crate) fn ensure(condition: bool, algorithm: &'static str, part: &'static str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(AnalysisError::Assertion { algorithm, part })
    }
}
