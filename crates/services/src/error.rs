//! Shared error types for the services crate.

use thiserror::Error;

use portal_core::model::QuizError;
use storage::StoreError;

use crate::sessions::SessionPhase;

/// Errors emitted by quiz sessions and their runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Configuration(#[from] QuizError),

    #[error("operation not allowed in the {phase:?} phase")]
    InvalidPhase { phase: SessionPhase },

    #[error("session state lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Store(#[from] StoreError),
}
