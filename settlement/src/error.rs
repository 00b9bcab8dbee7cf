//! Error types for the settlement engine

use crate::types::ParticipantId;
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Expense paid by someone who is not a participant
    #[error("Unknown payer {payer} for expense '{description}'")]
    UnknownPayer {
        /// Payer referenced by the expense
        payer: ParticipantId,
        /// Expense description, for the caller's error message
        description: String,
    },

    /// Expense amount is NaN or infinite
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Two participants share the same id
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(ParticipantId),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
