//! Sync adapter double that records calls and fails on request.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{SubmissionSync, SubmissionSyncError};
use crate::domain::{Submission, SubmissionId, SubmissionStatus};

/// One observed call on [`RecordingSubmissionSync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCall {
    /// `mirror_create` for the given id.
    Create(SubmissionId),
    /// `mirror_status_change` for the given id and status.
    StatusChange(SubmissionId, SubmissionStatus),
    /// `sync_all` with the ids of the batch, in order.
    SyncAll(Vec<SubmissionId>),
}

/// Recording [`SubmissionSync`] implementation.
///
/// Every call is recorded before the configured outcome is returned, so
/// failed attempts are visible too.
#[derive(Debug, Default)]
pub struct RecordingSubmissionSync {
    calls: Mutex<Vec<SyncCall>>,
    fail_create: bool,
    fail_status_for: HashSet<SubmissionId>,
    fail_sync_all: bool,
}

impl RecordingSubmissionSync {
    /// A double where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `mirror_create` fail.
    #[must_use]
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Make `mirror_status_change` fail for `id`.
    #[must_use]
    pub fn failing_status_for(mut self, id: SubmissionId) -> Self {
        self.fail_status_for.insert(id);
        self
    }

    /// Make `sync_all` fail.
    #[must_use]
    pub fn failing_sync_all(mut self) -> Self {
        self.fail_sync_all = true;
        self
    }

    /// Snapshot of the calls observed so far.
    pub fn calls(&self) -> Vec<SyncCall> {
        self.lock_calls().clone()
    }

    fn record(&self, call: SyncCall) {
        self.lock_calls().push(call);
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<SyncCall>> {
        match self.calls.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SubmissionSync for RecordingSubmissionSync {
    async fn mirror_create(&self, submission: &Submission) -> Result<(), SubmissionSyncError> {
        self.record(SyncCall::Create(submission.id));
        if self.fail_create {
            return Err(SubmissionSyncError::transport("create mirror unavailable"));
        }
        Ok(())
    }

    async fn mirror_status_change(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<(), SubmissionSyncError> {
        self.record(SyncCall::StatusChange(id, status));
        if self.fail_status_for.contains(&id) {
            return Err(SubmissionSyncError::rejected(503_u16, "status mirror unavailable"));
        }
        Ok(())
    }

    async fn sync_all(&self, submissions: &[Submission]) -> Result<(), SubmissionSyncError> {
        self.record(SyncCall::SyncAll(
            submissions.iter().map(|s| s.id).collect(),
        ));
        if self.fail_sync_all {
            return Err(SubmissionSyncError::transport("spreadsheet unreachable"));
        }
        Ok(())
    }
}
