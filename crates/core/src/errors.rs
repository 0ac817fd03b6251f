//! Core error types for Modelfolio.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::lifecycle::GenerationStatus;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the template versioning core.
///
/// Every service returns this type. Callers can match on the top-level
/// variant to decide how to surface the failure (bad input, blocked by
/// dependents, unknown id, collaborator outage, storage failure).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Operation blocked: {0}")]
    Referenced(#[from] ReferencedError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: Collaborator,
        reason: String,
    },

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Creates a CollaboratorUnavailable error.
    pub fn unavailable(collaborator: Collaborator, reason: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            collaborator,
            reason: reason.into(),
        }
    }

    /// Number of bound products blocking the operation, when known.
    pub fn blocking_count(&self) -> Option<i64> {
        match self {
            Error::Referenced(ReferencedError::BoundProducts { count, .. }) => Some(*count),
            _ => None,
        }
    }
}

/// The two external systems this core depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    FundCatalog,
    ProductRegistry,
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collaborator::FundCatalog => write!(f, "Fund catalog"),
            Collaborator::ProductRegistry => write!(f, "Product registry"),
        }
    }
}

/// Validation errors for caller input. Always raised before any mutation.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Fund '{fund_id}' appears more than once in the allocation set")]
    DuplicateFund { fund_id: String },

    #[error("Fund '{fund_id}' has a negative target weighting")]
    NegativeWeighting { fund_id: String },

    #[error("Fund '{fund_id}' has a target weighting of {weighting}, above the full weighting of 100")]
    WeightingTooLarge { fund_id: String, weighting: Decimal },

    #[error("Cannot move generation from {from} to {to}")]
    InvalidTransition {
        from: GenerationStatus,
        to: GenerationStatus,
    },

    #[error(
        "Allocations of generation {generation_id} are locked ({status}); create a new generation instead"
    )]
    AllocationsLocked {
        generation_id: String,
        status: GenerationStatus,
    },
}

/// A destructive operation was refused because dependents exist, or could
/// not be ruled out.
#[derive(Error, Debug)]
pub enum ReferencedError {
    #[error("generation {generation_id} is still referenced by {count} product(s)")]
    BoundProducts { generation_id: String, count: i64 },

    #[error("could not verify product references for generation {generation_id}: {reason}")]
    RegistryUnavailable {
        generation_id: String,
        reason: String,
    },
}

/// Unknown identifiers.
#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("template '{0}'")]
    Template(String),

    #[error("generation '{0}'")]
    Generation(String),

    #[error("fund '{0}'")]
    Fund(String),

    #[error("product '{0}'")]
    Product(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_count_is_reported() {
        let err: Error = ReferencedError::BoundProducts {
            generation_id: "gen-a".to_string(),
            count: 2,
        }
        .into();
        assert_eq!(err.blocking_count(), Some(2));
        assert!(err.to_string().contains("2 product(s)"));
    }

    #[test]
    fn test_registry_unavailable_has_no_count() {
        let err: Error = ReferencedError::RegistryUnavailable {
            generation_id: "gen-a".to_string(),
            reason: "timeout".to_string(),
        }
        .into();
        assert_eq!(err.blocking_count(), None);
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_collaborator_display() {
        let err = Error::unavailable(Collaborator::FundCatalog, "connection reset");
        assert_eq!(
            err.to_string(),
            "Fund catalog unavailable: connection reset"
        );
    }
}
