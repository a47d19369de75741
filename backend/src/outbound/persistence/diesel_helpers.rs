//! Shared error mapping for the Diesel adapters.
//!
//! Both repositories translate pool and Diesel failures the same way:
//! checkout failures and closed connections become connection errors, unique
//! constraint violations become the port's conflict flavour, and anything
//! else is a query error with the raw database message kept out of the
//! domain.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{RecipeStoreError, UserPersistenceError};

use super::pool::PoolError;

/// Port error types the Diesel adapters can produce.
pub(crate) trait DieselFailure: Sized {
    fn connection_failure(message: String) -> Self;

    fn query_failure(message: String) -> Self;

    /// A unique index rejected the write. `constraint` is the index name when
    /// PostgreSQL reports one.
    fn unique_violation(constraint: Option<&str>) -> Self {
        let _ = constraint;
        Self::query_failure("unique constraint violated".to_owned())
    }

    fn from_pool(error: PoolError) -> Self {
        map_pool_error(error)
    }

    fn from_diesel(error: DieselError) -> Self {
        map_diesel_error(error)
    }
}

impl DieselFailure for RecipeStoreError {
    fn connection_failure(message: String) -> Self {
        Self::connection(message)
    }

    fn query_failure(message: String) -> Self {
        Self::query(message)
    }

    fn unique_violation(constraint: Option<&str>) -> Self {
        Self::conflict(format!(
            "duplicate value violates {}",
            constraint.unwrap_or("a unique constraint")
        ))
    }
}

impl DieselFailure for UserPersistenceError {
    fn connection_failure(message: String) -> Self {
        Self::connection(message)
    }

    fn query_failure(message: String) -> Self {
        Self::query(message)
    }
}

/// Map a pool checkout or build failure to a connection error.
pub(crate) fn map_pool_error<E: DieselFailure>(error: PoolError) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            E::connection_failure(message)
        }
    }
}

/// Whether `error` is a unique constraint violation.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Map a Diesel failure, logging the database detail at `debug`.
pub(crate) fn map_diesel_error<E: DieselFailure>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection_failure("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            E::unique_violation(info.constraint_name())
        }
        DieselError::NotFound => E::query_failure("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query_failure("database query error".to_owned()),
        _ => E::query_failure("database error".to_owned()),
    }
}
