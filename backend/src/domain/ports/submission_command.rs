//! Driving port for submission mutations.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    Error, Submission, SubmissionDraft, SubmissionFields, SubmissionId, SubmissionStatus,
};

/// Per-id outcome of a bulk status update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusUpdateOutcome {
    /// Ids whose status was written.
    pub updated: Vec<SubmissionId>,
    /// Ids that matched no stored submission.
    pub missing: Vec<SubmissionId>,
    /// Ids whose write failed.
    pub failed: Vec<SubmissionId>,
}

/// Mutations consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionCommand: Send + Sync {
    /// Persist a new submission and mirror it.
    ///
    /// # Errors
    ///
    /// [`crate::domain::ErrorCode::DuplicateEmail`] when the email is taken.
    async fn create(&self, draft: SubmissionDraft) -> Result<Submission, Error>;

    /// Overwrite the editable fields of `id`.
    async fn update_fields(
        &self,
        id: SubmissionId,
        fields: SubmissionFields,
    ) -> Result<Submission, Error>;

    /// Move `id` to `status` and mirror the change.
    async fn update_status(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<Submission, Error>;

    /// Hard delete `id`.
    async fn delete(&self, id: SubmissionId) -> Result<(), Error>;

    /// Move every known id to `status`; unknown ids are reported, not errors.
    async fn bulk_update_status(
        &self,
        ids: Vec<SubmissionId>,
        status: SubmissionStatus,
    ) -> Result<BulkStatusUpdateOutcome, Error>;

    /// Push every stored submission to the mirror. Returns how many were sent.
    async fn sync_all(&self) -> Result<usize, Error>;
}

/// Fixture implementation backed by nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubmissionCommand;

fn missing(id: SubmissionId) -> Error {
    Error::not_found(format!("submission {id} not found"))
}

#[async_trait]
impl SubmissionCommand for FixtureSubmissionCommand {
    async fn create(&self, draft: SubmissionDraft) -> Result<Submission, Error> {
        let now = chrono::DateTime::UNIX_EPOCH;
        Ok(Submission::from_new(
            SubmissionId::new(1),
            draft.into(),
            now,
            now,
        ))
    }

    async fn update_fields(
        &self,
        id: SubmissionId,
        _fields: SubmissionFields,
    ) -> Result<Submission, Error> {
        Err(missing(id))
    }

    async fn update_status(
        &self,
        id: SubmissionId,
        _status: SubmissionStatus,
    ) -> Result<Submission, Error> {
        Err(missing(id))
    }

    async fn delete(&self, id: SubmissionId) -> Result<(), Error> {
        Err(missing(id))
    }

    async fn bulk_update_status(
        &self,
        ids: Vec<SubmissionId>,
        _status: SubmissionStatus,
    ) -> Result<BulkStatusUpdateOutcome, Error> {
        Ok(BulkStatusUpdateOutcome {
            missing: ids,
            ..BulkStatusUpdateOutcome::default()
        })
    }

    async fn sync_all(&self) -> Result<usize, Error> {
        Ok(0)
    }
}
