//! Driven port for mirroring submissions to an external spreadsheet.
//!
//! The mirror is non-authoritative. The service treats every call except
//! [`SubmissionSync::sync_all`] as best-effort and only logs failures.

use async_trait::async_trait;

use crate::domain::{Submission, SubmissionId, SubmissionStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by sync adapters.
    pub enum SubmissionSyncError {
        /// The remote endpoint could not be reached or timed out.
        Transport { message: String } =>
            "spreadsheet sync transport failed: {message}",
        /// The remote endpoint answered with a failure status.
        Rejected { status: u16, message: String } =>
            "spreadsheet sync rejected with status {status}: {message}",
        /// The payload could not be encoded.
        Encode { message: String } =>
            "spreadsheet sync payload could not be encoded: {message}",
    }
}

/// Capability to mirror submission changes to the spreadsheet.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionSync: Send + Sync {
    /// Append a freshly created submission.
    async fn mirror_create(&self, submission: &Submission) -> Result<(), SubmissionSyncError>;

    /// Record a status change for `id`.
    async fn mirror_status_change(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<(), SubmissionSyncError>;

    /// Push every submission in one batch.
    async fn sync_all(&self, submissions: &[Submission]) -> Result<(), SubmissionSyncError>;
}

/// Fixture implementation that accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubmissionSync;

#[async_trait]
impl SubmissionSync for FixtureSubmissionSync {
    async fn mirror_create(&self, _submission: &Submission) -> Result<(), SubmissionSyncError> {
        Ok(())
    }

    async fn mirror_status_change(
        &self,
        _id: SubmissionId,
        _status: SubmissionStatus,
    ) -> Result<(), SubmissionSyncError> {
        Ok(())
    }

    async fn sync_all(&self, _submissions: &[Submission]) -> Result<(), SubmissionSyncError> {
        Ok(())
    }
}
