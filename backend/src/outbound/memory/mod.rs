//! In-process submission store.
//!
//! Used when no database URL is configured and by tests. Email uniqueness is
//! checked under the write lock, so concurrent inserts with the same address
//! cannot both succeed.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};

use crate::domain::ports::{SubmissionRepository, SubmissionRepositoryError};
use crate::domain::{
    EmailAddress, NewSubmission, SortField, Submission, SubmissionFilter, SubmissionId,
    SubmissionSort, SubmissionStatus, contains_ignore_case,
};

#[derive(Debug, Default)]
struct StoreState {
    last_id: i64,
    rows: BTreeMap<SubmissionId, Submission>,
}

impl StoreState {
    fn email_taken(&self, email: &EmailAddress, except: Option<SubmissionId>) -> bool {
        self.rows
            .values()
            .any(|row| &row.email == email && Some(row.id) != except)
    }

    fn select<F>(&self, predicate: F) -> Vec<Submission>
    where
        F: Fn(&Submission) -> bool,
    {
        self.rows
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }
}

/// [`SubmissionRepository`] backed by a locked in-memory map.
pub struct InMemorySubmissionRepository {
    state: RwLock<StoreState>,
    clock: Arc<dyn Clock>,
}

impl InMemorySubmissionRepository {
    /// Create an empty store that timestamps rows with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            clock,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, SubmissionRepositoryError> {
        self.state
            .read()
            .map_err(|_| SubmissionRepositoryError::query("submission store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, SubmissionRepositoryError> {
        self.state
            .write()
            .map_err(|_| SubmissionRepositoryError::query("submission store lock poisoned"))
    }

    fn page<F>(
        &self,
        predicate: F,
        request: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError>
    where
        F: Fn(&Submission) -> bool,
    {
        let mut rows = self.read()?.select(predicate);
        rows.sort_by(|a, b| sort.compare(a, b));
        let total = u64::try_from(rows.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(request.size()).unwrap_or(usize::MAX);
        let content = rows.into_iter().skip(offset).take(size).collect();
        Ok(Page::new(content, request, total))
    }

    fn newest_first<F>(&self, predicate: F) -> Result<Vec<Submission>, SubmissionRepositoryError>
    where
        F: Fn(&Submission) -> bool,
    {
        let mut rows = self.read()?.select(predicate);
        let sort = SubmissionSort::new(SortField::CreatedAt, pagination::SortDirection::Desc);
        rows.sort_by(|a, b| sort.compare(a, b));
        Ok(rows)
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn exists_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<bool, SubmissionRepositoryError> {
        Ok(self.read()?.email_taken(email, None))
    }

    async fn insert(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, SubmissionRepositoryError> {
        let mut state = self.write()?;
        if state.email_taken(&submission.email, None) {
            return Err(SubmissionRepositoryError::duplicate_email(
                submission.email.as_ref(),
            ));
        }
        state.last_id += 1;
        let id = SubmissionId::new(state.last_id);
        let now = self.clock.utc();
        let row = Submission::from_new(id, submission, now, now);
        state.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_id(
        &self,
        id: SubmissionId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        Ok(self
            .read()?
            .rows
            .values()
            .find(|row| &row.email == email)
            .cloned())
    }

    async fn find_all(
        &self,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        self.page(|_| true, page, sort)
    }

    async fn find_by_status(
        &self,
        status: SubmissionStatus,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        self.page(|row| row.status == status, page, sort)
    }

    async fn find_by_filter(
        &self,
        filter: &SubmissionFilter,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        self.page(|row| filter.matches(row), page, sort)
    }

    async fn update(
        &self,
        submission: &Submission,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let mut state = self.write()?;
        if !state.rows.contains_key(&submission.id) {
            return Ok(None);
        }
        if state.email_taken(&submission.email, Some(submission.id)) {
            return Err(SubmissionRepositoryError::duplicate_email(
                submission.email.as_ref(),
            ));
        }
        let now = self.clock.utc();
        let Some(row) = state.rows.get_mut(&submission.id) else {
            return Ok(None);
        };
        row.email = submission.email.clone();
        row.fields = submission.fields.clone();
        row.status = submission.status;
        row.submitted_by_ip = submission.submitted_by_ip.clone();
        row.updated_at = now.max(row.created_at);
        Ok(Some(row.clone()))
    }

    async fn delete_by_id(&self, id: SubmissionId) -> Result<bool, SubmissionRepositoryError> {
        Ok(self.write()?.rows.remove(&id).is_some())
    }

    async fn find_by_name_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(self
            .read()?
            .select(|row| contains_ignore_case(row.fields.name(), fragment)))
    }

    async fn find_by_address_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(self
            .read()?
            .select(|row| contains_ignore_case(row.fields.address(), fragment)))
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(self
            .read()?
            .select(|row| row.fields.phone_number() == Some(phone_number)))
    }

    async fn count_by_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<u64, SubmissionRepositoryError> {
        let count = self
            .read()?
            .rows
            .values()
            .filter(|row| row.status == status)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn count(&self) -> Result<u64, SubmissionRepositoryError> {
        Ok(u64::try_from(self.read()?.rows.len()).unwrap_or(u64::MAX))
    }

    async fn find_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        self.newest_first(|row| row.created_at >= since)
    }

    async fn find_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        self.newest_first(|row| row.created_at >= from && row.created_at <= to)
    }

    async fn find_all_by_ids(
        &self,
        ids: &[SubmissionId],
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.rows.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        Ok(self.read()?.select(|_| true))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::SubmissionFields;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use pagination::SortDirection;
    use rstest::{fixture, rstest};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn new_submission(email: &str, name: &str) -> NewSubmission {
        NewSubmission {
            email: EmailAddress::new(email).expect("valid email"),
            fields: SubmissionFields::new(name, "1 Main Street", Some("555-0100"), None)
                .expect("valid fields"),
            status: SubmissionStatus::Pending,
            submitted_by_ip: Some("203.0.113.9".to_owned()),
        }
    }

    struct Harness {
        clock: Arc<MutableClock>,
        repo: InMemorySubmissionRepository,
    }

    #[fixture]
    fn harness() -> Harness {
        let clock = Arc::new(MutableClock::new(start()));
        let repo = InMemorySubmissionRepository::new(clock.clone());
        Harness { clock, repo }
    }

    async fn seed(harness: &Harness, count: usize) -> Vec<Submission> {
        let mut rows = Vec::with_capacity(count);
        for index in 0..count {
            let row = harness
                .repo
                .insert(new_submission(
                    &format!("user{index}@example.com"),
                    &format!("User {index}"),
                ))
                .await
                .expect("insert succeeds");
            rows.push(row);
            harness.clock.advance_seconds(60);
        }
        rows
    }

    #[rstest]
    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_timestamps(harness: Harness) {
        let rows = seed(&harness, 2).await;
        assert_eq!(rows[0].id, SubmissionId::new(1));
        assert_eq!(rows[1].id, SubmissionId::new(2));
        assert_eq!(rows[0].created_at, start());
        assert_eq!(rows[0].updated_at, rows[0].created_at);
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_duplicate_email(harness: Harness) {
        seed(&harness, 1).await;
        let err = harness
            .repo
            .insert(new_submission("user0@example.com", "Someone Else"))
            .await
            .expect_err("duplicate email");
        assert_eq!(
            err,
            SubmissionRepositoryError::duplicate_email("user0@example.com")
        );
        assert_eq!(harness.repo.count().await.expect("count"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_refreshes_updated_at_but_not_created_at(harness: Harness) {
        let mut row = seed(&harness, 1).await.remove(0);
        harness.clock.advance_seconds(3_600);
        row.status = SubmissionStatus::Approved;
        row.created_at = start() + chrono::TimeDelta::days(1);

        let updated = harness
            .repo
            .update(&row)
            .await
            .expect("update succeeds")
            .expect("row exists");

        assert_eq!(updated.status, SubmissionStatus::Approved);
        assert_eq!(updated.created_at, start());
        assert!(updated.updated_at > updated.created_at);
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_row_returns_none(harness: Harness) {
        let mut row = seed(&harness, 1).await.remove(0);
        row.id = SubmissionId::new(99);
        assert!(harness.repo.update(&row).await.expect("update").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn find_all_pages_newest_first(harness: Harness) {
        let rows = seed(&harness, 5).await;
        let request = PageRequest::new(0, 2).expect("valid request");

        let page = harness
            .repo
            .find_all(request, SubmissionSort::default())
            .await
            .expect("page");

        let ids: Vec<_> = page.content.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![rows[4].id, rows[3].id]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn pages_do_not_overlap_when_timestamps_tie(harness: Harness) {
        for index in 0..4 {
            harness
                .repo
                .insert(new_submission(&format!("tie{index}@example.com"), "Tie"))
                .await
                .expect("insert");
        }
        let sort = SubmissionSort::new(SortField::CreatedAt, SortDirection::Desc);
        let first = harness
            .repo
            .find_all(PageRequest::new(0, 2).expect("valid"), sort)
            .await
            .expect("first page");
        let second = harness
            .repo
            .find_all(PageRequest::new(1, 2).expect("valid"), sort)
            .await
            .expect("second page");

        let mut ids: Vec<_> = first
            .content
            .iter()
            .chain(second.content.iter())
            .map(|row| row.id.as_i64())
            .collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn name_search_is_case_insensitive(harness: Harness) {
        harness
            .repo
            .insert(new_submission("john@example.com", "John SMITH"))
            .await
            .expect("insert");
        let found = harness
            .repo
            .find_by_name_containing("smi")
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn created_since_is_inclusive_and_newest_first(harness: Harness) {
        let rows = seed(&harness, 3).await;
        let found = harness
            .repo
            .find_created_since(rows[1].created_at)
            .await
            .expect("query");
        let ids: Vec<_> = found.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![rows[2].id, rows[1].id]);
    }

    #[rstest]
    #[tokio::test]
    async fn find_all_by_ids_skips_unknown_ids(harness: Harness) {
        let rows = seed(&harness, 2).await;
        let found = harness
            .repo
            .find_all_by_ids(&[rows[0].id, SubmissionId::new(42)])
            .await
            .expect("query");
        assert_eq!(found, vec![rows[0].clone()]);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed(harness: Harness) {
        let row = seed(&harness, 1).await.remove(0);
        assert!(harness.repo.delete_by_id(row.id).await.expect("delete"));
        assert!(!harness.repo.delete_by_id(row.id).await.expect("delete"));
    }
}
