//! Submission domain service.
//!
//! [`SubmissionService`] implements both driving ports. The repository is
//! authoritative; the spreadsheet mirror is told about creates and status
//! changes after the write succeeds, and its failures are logged and
//! dropped. Only [`SubmissionCommand::sync_all`] reports mirror failures.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BulkStatusUpdateOutcome, RECENT_DAYS_MAX, SubmissionCommand, SubmissionQuery,
    SubmissionRepository, SubmissionRepositoryError, SubmissionSync, SubmissionSyncError,
};
use crate::domain::{
    EmailAddress, Error, StatusCounts, Submission, SubmissionDraft, SubmissionFields,
    SubmissionFilter, SubmissionId, SubmissionSort, SubmissionStats, SubmissionStatus, TraceId,
};

/// How best-effort mirror calls are run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncDispatch {
    /// Await the mirror before returning to the caller.
    Inline,
    /// Spawn the mirror on a separate task and return immediately.
    #[default]
    Detached,
}

/// Submission service implementing [`SubmissionCommand`] and
/// [`SubmissionQuery`].
pub struct SubmissionService<R: ?Sized, S: ?Sized> {
    repo: Arc<R>,
    sync: Arc<S>,
    clock: Arc<dyn Clock>,
    dispatch: SyncDispatch,
}

impl<R: ?Sized, S: ?Sized> SubmissionService<R, S> {
    /// Create a service that detaches mirror calls.
    pub fn new(repo: Arc<R>, sync: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            sync,
            clock,
            dispatch: SyncDispatch::default(),
        }
    }

    /// Override how mirror calls are dispatched.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: SyncDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }
}

/// `details.code` carried by errors raised because the spreadsheet mirror
/// refused a full sync.
pub const SYNC_FAILED: &str = "sync_failed";

/// Whether `error` came from the spreadsheet mirror rather than the store.
pub fn is_sync_failure(error: &Error) -> bool {
    error
        .details()
        .and_then(|details| details.get("code"))
        .and_then(|code| code.as_str())
        == Some(SYNC_FAILED)
}

fn sync_failed(error: SubmissionSyncError) -> Error {
    Error::internal(format!("spreadsheet sync failed: {error}"))
        .with_details(json!({ "code": SYNC_FAILED }))
}

fn map_repository_error(error: SubmissionRepositoryError) -> Error {
    match error {
        SubmissionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("submission repository unavailable: {message}"))
        }
        SubmissionRepositoryError::Query { message } => {
            Error::internal(format!("submission repository error: {message}"))
        }
        SubmissionRepositoryError::DuplicateEmail { email } => duplicate_email(&email),
    }
}

fn duplicate_email(email: &str) -> Error {
    Error::duplicate_email(format!("a submission with email {email} already exists"))
        .with_details(json!({ "field": "email", "code": "duplicate_email" }))
}

fn not_found(id: SubmissionId) -> Error {
    Error::not_found(format!("submission {id} not found"))
        .with_details(json!({ "id": id.as_i64() }))
}

fn dedupe(ids: Vec<SubmissionId>) -> Vec<SubmissionId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

impl<R: ?Sized, S: ?Sized> SubmissionService<R, S>
where
    R: SubmissionRepository,
    S: SubmissionSync + 'static,
{
    async fn dispatch<Fut>(&self, task: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        match self.dispatch {
            SyncDispatch::Inline => task.await,
            SyncDispatch::Detached => {
                // Task locals do not follow `spawn`; re-enter the trace scope.
                match TraceId::current() {
                    Some(trace_id) => drop(tokio::spawn(TraceId::scope(trace_id, task))),
                    None => drop(tokio::spawn(task)),
                }
            }
        }
    }

    async fn mirror_create(&self, submission: &Submission) {
        let sync = Arc::clone(&self.sync);
        let record = submission.clone();
        self.dispatch(async move {
            if let Err(error) = sync.mirror_create(&record).await {
                warn!(submission_id = %record.id, %error, "failed to mirror new submission");
            }
        })
        .await;
    }

    async fn mirror_status_changes(&self, ids: Vec<SubmissionId>, status: SubmissionStatus) {
        if ids.is_empty() {
            return;
        }
        let sync = Arc::clone(&self.sync);
        self.dispatch(async move {
            for id in ids {
                if let Err(error) = sync.mirror_status_change(id, status).await {
                    warn!(submission_id = %id, %status, %error, "failed to mirror status change");
                }
            }
        })
        .await;
    }

    async fn load(&self, id: SubmissionId) -> Result<Submission, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn store(&self, submission: &Submission) -> Result<Submission, Error> {
        self.repo
            .update(submission)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(submission.id))
    }

    async fn status_counts(&self) -> Result<StatusCounts, Error> {
        let mut counts = StatusCounts {
            total: self.repo.count().await.map_err(map_repository_error)?,
            ..StatusCounts::default()
        };
        for status in SubmissionStatus::ALL {
            let count = self
                .repo
                .count_by_status(status)
                .await
                .map_err(map_repository_error)?;
            match status {
                SubmissionStatus::Pending => counts.pending = count,
                SubmissionStatus::Approved => counts.approved = count,
                SubmissionStatus::Rejected => counts.rejected = count,
                SubmissionStatus::Processing => counts.processing = count,
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl<R: ?Sized, S: ?Sized> SubmissionCommand for SubmissionService<R, S>
where
    R: SubmissionRepository,
    S: SubmissionSync + 'static,
{
    async fn create(&self, draft: SubmissionDraft) -> Result<Submission, Error> {
        // Fast path only; the store's unique constraint decides races.
        if self
            .repo
            .exists_by_email(&draft.email)
            .await
            .map_err(map_repository_error)?
        {
            return Err(duplicate_email(draft.email.as_ref()));
        }

        let submission = self
            .repo
            .insert(draft.into())
            .await
            .map_err(map_repository_error)?;
        info!(submission_id = %submission.id, status = %submission.status, "submission created");

        self.mirror_create(&submission).await;
        Ok(submission)
    }

    async fn update_fields(
        &self,
        id: SubmissionId,
        fields: SubmissionFields,
    ) -> Result<Submission, Error> {
        let mut submission = self.load(id).await?;
        submission.fields = fields;
        let updated = self.store(&submission).await?;
        info!(submission_id = %id, "submission fields updated");
        Ok(updated)
    }

    async fn update_status(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<Submission, Error> {
        let mut submission = self.load(id).await?;
        let previous = submission.status;
        submission.status = status;
        let updated = self.store(&submission).await?;
        info!(submission_id = %id, from = %previous, to = %status, "submission status updated");

        self.mirror_status_changes(vec![id], status).await;
        Ok(updated)
    }

    async fn delete(&self, id: SubmissionId) -> Result<(), Error> {
        let removed = self
            .repo
            .delete_by_id(id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(not_found(id));
        }
        info!(submission_id = %id, "submission deleted");
        Ok(())
    }

    async fn bulk_update_status(
        &self,
        ids: Vec<SubmissionId>,
        status: SubmissionStatus,
    ) -> Result<BulkStatusUpdateOutcome, Error> {
        let ids = dedupe(ids);
        let found = self
            .repo
            .find_all_by_ids(&ids)
            .await
            .map_err(|error| Error::internal(format!("failed to load submissions: {error}")))?;

        let mut outcome = BulkStatusUpdateOutcome::default();
        for id in ids {
            let Some(mut submission) = found.iter().find(|s| s.id == id).cloned() else {
                debug!(submission_id = %id, "bulk status update skipped unknown id");
                outcome.missing.push(id);
                continue;
            };
            submission.status = status;
            match self.repo.update(&submission).await {
                Ok(Some(_)) => outcome.updated.push(id),
                Ok(None) => outcome.missing.push(id),
                Err(error) => {
                    warn!(submission_id = %id, %error, "bulk status update failed for submission");
                    outcome.failed.push(id);
                }
            }
        }
        info!(
            %status,
            updated = outcome.updated.len(),
            missing = outcome.missing.len(),
            failed = outcome.failed.len(),
            "bulk status update finished"
        );

        self.mirror_status_changes(outcome.updated.clone(), status)
            .await;
        Ok(outcome)
    }

    async fn sync_all(&self) -> Result<usize, Error> {
        let submissions = self.repo.list_all().await.map_err(map_repository_error)?;
        self.sync
            .sync_all(&submissions)
            .await
            .map_err(sync_failed)?;
        info!(count = submissions.len(), "all submissions synced to spreadsheet");
        Ok(submissions.len())
    }
}

#[async_trait]
impl<R: ?Sized, S: ?Sized> SubmissionQuery for SubmissionService<R, S>
where
    R: SubmissionRepository,
    S: SubmissionSync + 'static,
{
    async fn get(&self, id: SubmissionId) -> Result<Option<Submission>, Error> {
        self.repo.find_by_id(id).await.map_err(map_repository_error)
    }

    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<Submission>, Error> {
        self.repo
            .find_by_email(email)
            .await
            .map_err(map_repository_error)
    }

    async fn list(
        &self,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, Error> {
        self.repo
            .find_all(page, sort)
            .await
            .map_err(map_repository_error)
    }

    async fn list_by_status(
        &self,
        status: SubmissionStatus,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, Error> {
        self.repo
            .find_by_status(status, page, sort)
            .await
            .map_err(map_repository_error)
    }

    async fn search(
        &self,
        filter: SubmissionFilter,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, Error> {
        if let (Some(from), Some(to)) = (filter.created_from, filter.created_to) {
            if from > to {
                return Err(Error::invalid_request("from must not be after to")
                    .with_details(json!({ "field": "from", "code": "invalid_range" })));
            }
        }
        self.repo
            .find_by_filter(&filter, page, sort)
            .await
            .map_err(map_repository_error)
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Submission>, Error> {
        self.repo
            .find_by_name_containing(fragment)
            .await
            .map_err(map_repository_error)
    }

    async fn search_by_address(&self, fragment: &str) -> Result<Vec<Submission>, Error> {
        self.repo
            .find_by_address_containing(fragment)
            .await
            .map_err(map_repository_error)
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Vec<Submission>, Error> {
        self.repo
            .find_by_phone_number(phone_number)
            .await
            .map_err(map_repository_error)
    }

    async fn recent(&self, days: u32) -> Result<Vec<Submission>, Error> {
        if days > RECENT_DAYS_MAX {
            return Err(
                Error::invalid_request(format!("days must be at most {RECENT_DAYS_MAX}"))
                    .with_details(json!({
                        "field": "days",
                        "code": "out_of_range",
                        "max": RECENT_DAYS_MAX,
                        "value": days,
                    })),
            );
        }
        let since: DateTime<Utc> = self.clock.utc() - TimeDelta::days(i64::from(days));
        self.repo
            .find_created_since(since)
            .await
            .map_err(map_repository_error)
    }

    async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Submission>, Error> {
        if from > to {
            return Err(Error::invalid_request("from must not be after to")
                .with_details(json!({ "field": "from", "code": "invalid_range" })));
        }
        self.repo
            .find_created_between(from, to)
            .await
            .map_err(map_repository_error)
    }

    async fn stats(&self) -> Result<SubmissionStats, Error> {
        Ok(self.status_counts().await?.into())
    }
}

#[cfg(test)]
#[path = "submission_service_tests.rs"]
mod tests;
