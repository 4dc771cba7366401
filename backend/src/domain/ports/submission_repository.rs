//! Driven port for submission persistence.
//!
//! [`SubmissionRepository`] is the record store contract. Adapters must back
//! email uniqueness with a store-level constraint: a concurrent insert that
//! loses the race reports [`SubmissionRepositoryError::DuplicateEmail`]
//! rather than creating a second row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{
    EmailAddress, NewSubmission, Submission, SubmissionFilter, SubmissionId, SubmissionSort,
    SubmissionStatus,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by submission repository adapters.
    pub enum SubmissionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "submission repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "submission repository query failed: {message}",
        /// The unique email constraint rejected an insert.
        DuplicateEmail { email: String } =>
            "a submission with email {email} already exists",
    }
}

/// Record store for form submissions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Whether any submission uses `email`.
    async fn exists_by_email(&self, email: &EmailAddress)
    -> Result<bool, SubmissionRepositoryError>;

    /// Persist a new submission, assigning its id and both timestamps.
    async fn insert(&self, submission: NewSubmission)
    -> Result<Submission, SubmissionRepositoryError>;

    /// Point lookup by id.
    async fn find_by_id(
        &self,
        id: SubmissionId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError>;

    /// Point lookup by exact email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Submission>, SubmissionRepositoryError>;

    /// One page of every submission.
    async fn find_all(
        &self,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError>;

    /// One page of submissions in `status`.
    async fn find_by_status(
        &self,
        status: SubmissionStatus,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError>;

    /// One page of submissions matching every criterion in `filter`.
    async fn find_by_filter(
        &self,
        filter: &SubmissionFilter,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError>;

    /// Overwrite the stored row for `submission.id` and refresh `updated_at`.
    ///
    /// Returns `None` when the row no longer exists. `created_at` is never
    /// written.
    async fn update(
        &self,
        submission: &Submission,
    ) -> Result<Option<Submission>, SubmissionRepositoryError>;

    /// Hard delete. Returns `false` when nothing was removed.
    async fn delete_by_id(&self, id: SubmissionId) -> Result<bool, SubmissionRepositoryError>;

    /// Case-insensitive substring search on the name, ordered by id.
    async fn find_by_name_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError>;

    /// Case-insensitive substring search on the address, ordered by id.
    async fn find_by_address_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError>;

    /// Exact phone number match, ordered by id.
    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError>;

    /// Number of submissions in `status`.
    async fn count_by_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<u64, SubmissionRepositoryError>;

    /// Number of stored submissions.
    async fn count(&self) -> Result<u64, SubmissionRepositoryError>;

    /// Submissions with `created_at >= since`, newest first.
    async fn find_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError>;

    /// Submissions with `from <= created_at <= to`, newest first.
    async fn find_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError>;

    /// Submissions whose id is in `ids`; unknown ids are simply absent.
    async fn find_all_by_ids(
        &self,
        ids: &[SubmissionId],
    ) -> Result<Vec<Submission>, SubmissionRepositoryError>;

    /// Every stored submission, ordered by id.
    async fn list_all(&self) -> Result<Vec<Submission>, SubmissionRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Behaves like an empty store that refuses inserts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubmissionRepository;

#[async_trait]
impl SubmissionRepository for FixtureSubmissionRepository {
    async fn exists_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<bool, SubmissionRepositoryError> {
        Ok(false)
    }

    async fn insert(
        &self,
        _submission: NewSubmission,
    ) -> Result<Submission, SubmissionRepositoryError> {
        Err(SubmissionRepositoryError::query(
            "fixture repository does not store submissions",
        ))
    }

    async fn find_by_id(
        &self,
        _id: SubmissionId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        Ok(None)
    }

    async fn find_all(
        &self,
        page: PageRequest,
        _sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn find_by_status(
        &self,
        _status: SubmissionStatus,
        page: PageRequest,
        _sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn find_by_filter(
        &self,
        _filter: &SubmissionFilter,
        page: PageRequest,
        _sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn update(
        &self,
        _submission: &Submission,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        Ok(None)
    }

    async fn delete_by_id(&self, _id: SubmissionId) -> Result<bool, SubmissionRepositoryError> {
        Ok(false)
    }

    async fn find_by_name_containing(
        &self,
        _fragment: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_address_containing(
        &self,
        _fragment: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_phone_number(
        &self,
        _phone_number: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(Vec::new())
    }

    async fn count_by_status(
        &self,
        _status: SubmissionStatus,
    ) -> Result<u64, SubmissionRepositoryError> {
        Ok(0)
    }

    async fn count(&self) -> Result<u64, SubmissionRepositoryError> {
        Ok(0)
    }

    async fn find_created_since(
        &self,
        _since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_created_between(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_all_by_ids(
        &self,
        _ids: &[SubmissionId],
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_all(&self) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_repository_behaves_like_an_empty_store() {
        let repo = FixtureSubmissionRepository;
        let email = EmailAddress::new("a@example.com").expect("valid email");

        assert!(!repo.exists_by_email(&email).await.expect("exists"));
        assert_eq!(repo.count().await.expect("count"), 0);
        assert!(
            repo.find_by_id(SubmissionId::new(1))
                .await
                .expect("lookup")
                .is_none()
        );
        let page = repo
            .find_all(PageRequest::default(), SubmissionSort::default())
            .await
            .expect("page");
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[rstest]
    fn duplicate_email_error_names_the_address() {
        let err = SubmissionRepositoryError::duplicate_email("a@example.com");
        assert_eq!(
            err.to_string(),
            "a submission with email a@example.com already exists"
        );
    }
}
