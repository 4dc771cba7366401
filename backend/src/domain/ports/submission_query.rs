//! Driving port for submission reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{
    EmailAddress, Error, Submission, SubmissionFilter, SubmissionId, SubmissionSort,
    SubmissionStats, SubmissionStatus,
};

/// Largest look-back window accepted by [`SubmissionQuery::recent`].
pub const RECENT_DAYS_MAX: u32 = 3650;

/// Reads consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionQuery: Send + Sync {
    /// Point lookup; absence is `Ok(None)`.
    async fn get(&self, id: SubmissionId) -> Result<Option<Submission>, Error>;

    /// Lookup by exact email; absence is `Ok(None)`.
    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<Submission>, Error>;

    /// One page of every submission.
    async fn list(&self, page: PageRequest, sort: SubmissionSort)
    -> Result<Page<Submission>, Error>;

    /// One page of submissions in `status`.
    async fn list_by_status(
        &self,
        status: SubmissionStatus,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, Error>;

    /// One page of submissions matching `filter`.
    async fn search(
        &self,
        filter: SubmissionFilter,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, Error>;

    /// Case-insensitive substring match on the name.
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Submission>, Error>;

    /// Case-insensitive substring match on the address.
    async fn search_by_address(&self, fragment: &str) -> Result<Vec<Submission>, Error>;

    /// Exact phone number match.
    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Vec<Submission>, Error>;

    /// Submissions created within the last `days` days, newest first.
    ///
    /// # Errors
    ///
    /// Invalid request when `days` exceeds [`RECENT_DAYS_MAX`].
    async fn recent(&self, days: u32) -> Result<Vec<Submission>, Error>;

    /// Submissions created in `[from, to]`, newest first.
    async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Submission>, Error>;

    /// Counts per status plus approval and rejection rates.
    async fn stats(&self) -> Result<SubmissionStats, Error>;
}

/// Fixture implementation that sees an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubmissionQuery;

#[async_trait]
impl SubmissionQuery for FixtureSubmissionQuery {
    async fn get(&self, _id: SubmissionId) -> Result<Option<Submission>, Error> {
        Ok(None)
    }

    async fn get_by_email(&self, _email: &EmailAddress) -> Result<Option<Submission>, Error> {
        Ok(None)
    }

    async fn list(
        &self,
        page: PageRequest,
        _sort: SubmissionSort,
    ) -> Result<Page<Submission>, Error> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn list_by_status(
        &self,
        _status: SubmissionStatus,
        page: PageRequest,
        _sort: SubmissionSort,
    ) -> Result<Page<Submission>, Error> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn search(
        &self,
        _filter: SubmissionFilter,
        page: PageRequest,
        _sort: SubmissionSort,
    ) -> Result<Page<Submission>, Error> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn search_by_name(&self, _fragment: &str) -> Result<Vec<Submission>, Error> {
        Ok(Vec::new())
    }

    async fn search_by_address(&self, _fragment: &str) -> Result<Vec<Submission>, Error> {
        Ok(Vec::new())
    }

    async fn find_by_phone_number(&self, _phone_number: &str) -> Result<Vec<Submission>, Error> {
        Ok(Vec::new())
    }

    async fn recent(&self, _days: u32) -> Result<Vec<Submission>, Error> {
        Ok(Vec::new())
    }

    async fn between(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<Submission>, Error> {
        Ok(Vec::new())
    }

    async fn stats(&self) -> Result<SubmissionStats, Error> {
        Ok(SubmissionStats::default())
    }
}
