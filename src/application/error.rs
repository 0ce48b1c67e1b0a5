use thiserror::Error;

use crate::storage::StorageError;

/// Bad or missing user input. Nothing is written when one of these is returned;
/// the message is meant to be shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("all fields required")]
    MissingFields,

    #[error("amount must be a number")]
    InvalidAmount,

    #[error("import data first")]
    NotMounted,

    #[error("invalid timezone '{descriptor}': {reason}")]
    InvalidTimezone { descriptor: String, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// The validation failure, if this is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            AppError::Validation(e) => Some(e),
            AppError::Storage(_) => None,
        }
    }
}
