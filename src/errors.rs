//! Unified error type for the club ledger.
//!
//! Every operation either commits completely or fails with one of these
//! variants before any state is written. [`Error::kind`] groups the variants
//! so callers can decide between showing a message and falling back to a
//! safe default view.

use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before any mutation
    Validation,
    /// Referenced club/event/user/record does not exist
    NotFound,
    /// Actor lacks the role or ownership required
    Authorization,
    /// Write would break a uniqueness rule or repeat a one-way transition
    Conflict,
    /// Database, serialization or configuration failure
    Infrastructure,
}

/// Errors produced by the store and the business operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Details about the failure
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A document could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic input validation failure
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// Amount is zero, negative where a positive value is required, or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Registration with an email that already exists
    #[error("Email already registered: {email}")]
    EmailTaken {
        /// Normalized (lowercased) email
        email: String,
    },

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name, e.g. `"club"`
        entity: &'static str,
        /// Requested id
        id: i64,
    },

    /// Actor is not allowed to perform the action
    #[error("Not allowed to {action}")]
    Unauthorized {
        /// Short description of the refused action
        action: String,
    },

    /// A collection write would duplicate an id or a composite key
    #[error("Duplicate key {key} in collection {collection}")]
    UniqueViolation {
        /// Collection being written
        collection: &'static str,
        /// Offending key
        key: String,
    },

    /// Contribution or event payment is already settled
    #[error("Already paid by user {user_id}")]
    AlreadyPaid {
        /// Payer
        user_id: i64,
    },
}

impl Error {
    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::EmailTaken { .. }
            | Self::InvalidCredentials => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::UniqueViolation { .. } | Self::AlreadyPaid { .. } => ErrorKind::Conflict,
            Self::Config { .. } | Self::Database(_) | Self::Serialization(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn unauthorized(action: impl Into<String>) -> Self {
        Self::Unauthorized {
            action: action.into(),
        }
    }

    pub(crate) const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_variants() {
        assert_eq!(Error::InvalidCredentials.kind(), ErrorKind::Validation);
        assert_eq!(Error::not_found("club", 3).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::unauthorized("delete club").kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            Error::AlreadyPaid { user_id: 1 }.kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(Error::not_found("event", 7).to_string(), "event 7 not found");
    }
}
