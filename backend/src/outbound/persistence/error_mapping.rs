//! Diesel and pool error mapping for the submission store.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::SubmissionRepositoryError;

use super::pool::PoolError;

/// Map pool errors to repository connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> SubmissionRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            SubmissionRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors.
///
/// `email` names the address involved in a write so a unique-constraint
/// violation can be reported as a duplicate; reads pass `None`.
pub(crate) fn map_diesel_error(
    error: DieselError,
    email: Option<&str>,
) -> SubmissionRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => SubmissionRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => {
            SubmissionRepositoryError::query("database query error")
        }
        DieselError::DatabaseError(kind, _) => match (kind, email) {
            (DatabaseErrorKind::UniqueViolation, Some(email)) => {
                SubmissionRepositoryError::duplicate_email(email)
            }
            (DatabaseErrorKind::ClosedConnection, _) => {
                SubmissionRepositoryError::connection("database connection error")
            }
            _ => SubmissionRepositoryError::query("database error"),
        },
        _ => SubmissionRepositoryError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new("constraint detail".to_string()))
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(
            repo_err,
            SubmissionRepositoryError::Connection { .. }
        ));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn unique_violation_on_write_maps_to_duplicate_email() {
        let repo_err = map_diesel_error(
            database_error(DatabaseErrorKind::UniqueViolation),
            Some("ada@example.com"),
        );

        assert_eq!(
            repo_err,
            SubmissionRepositoryError::duplicate_email("ada@example.com")
        );
    }

    #[rstest]
    fn unique_violation_without_email_is_a_query_error() {
        let repo_err = map_diesel_error(database_error(DatabaseErrorKind::UniqueViolation), None);

        assert!(matches!(repo_err, SubmissionRepositoryError::Query { .. }));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let repo_err = map_diesel_error(database_error(DatabaseErrorKind::ClosedConnection), None);

        assert!(matches!(
            repo_err,
            SubmissionRepositoryError::Connection { .. }
        ));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(DieselError::NotFound, None);

        assert!(repo_err.to_string().contains("record not found"));
    }
}
