//! PostgreSQL-backed `SubmissionRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by the `form_submissions_email_key`
//! constraint; a losing concurrent insert surfaces as
//! [`SubmissionRepositoryError::DuplicateEmail`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest, SortDirection};

use crate::domain::ports::{SubmissionRepository, SubmissionRepositoryError};
use crate::domain::{
    EmailAddress, NewSubmission, SortField, Submission, SubmissionFields, SubmissionFilter,
    SubmissionId, SubmissionSort, SubmissionStatus,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewSubmissionRow, SubmissionRow, SubmissionUpdate};
use super::pool::DbPool;
use super::schema::form_submissions;

type BoxedRows<'a> = form_submissions::BoxedQuery<'a, Pg, form_submissions::SqlType>;

/// Diesel-backed implementation of the `SubmissionRepository` port.
#[derive(Clone)]
pub struct DieselSubmissionRepository {
    pool: DbPool,
}

impl DieselSubmissionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn page_matching(
        &self,
        filter: &SubmissionFilter,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let offset = i64::try_from(page.offset())
            .map_err(|_| SubmissionRepositoryError::query("page offset exceeds i64 range"))?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        let rows: Vec<SubmissionRow> = ordered(filtered(filter), sort)
            .limit(i64::from(page.size()))
            .offset(offset)
            .select(SubmissionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        let content = rows
            .into_iter()
            .map(row_to_submission)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, page, to_count(total)))
    }

    async fn load_where(
        &self,
        query: BoxedRows<'static>,
        sort: SubmissionSort,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let rows: Vec<SubmissionRow> = ordered(query, sort)
            .select(SubmissionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        rows.into_iter().map(row_to_submission).collect()
    }
}

const BY_ID: SubmissionSort = SubmissionSort::new(SortField::Id, SortDirection::Asc);
const NEWEST_FIRST: SubmissionSort = SubmissionSort::new(SortField::CreatedAt, SortDirection::Desc);

/// `LIKE` pattern matching `fragment` anywhere, with wildcards escaped.
fn contains_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Every row matching each criterion set on `filter`.
fn filtered(filter: &SubmissionFilter) -> BoxedRows<'static> {
    let mut query = form_submissions::table.into_boxed();
    if let Some(name) = &filter.name {
        query = query.filter(form_submissions::name.ilike(contains_pattern(name)));
    }
    if let Some(email) = &filter.email {
        query = query.filter(form_submissions::email.eq(email.clone()));
    }
    if let Some(address) = &filter.address {
        query = query.filter(form_submissions::address.ilike(contains_pattern(address)));
    }
    if let Some(phone) = &filter.phone_number {
        query = query.filter(form_submissions::phone_number.eq(phone.clone()));
    }
    if let Some(status) = filter.status {
        query = query.filter(form_submissions::status.eq(status.as_str()));
    }
    if let Some(from) = filter.created_from {
        query = query.filter(form_submissions::created_at.ge(from));
    }
    if let Some(to) = filter.created_to {
        query = query.filter(form_submissions::created_at.le(to));
    }
    query
}

macro_rules! order_with_id_tiebreak {
    ($query:expr, $column:expr, $direction:expr) => {
        match $direction {
            SortDirection::Asc => $query
                .order_by($column.asc())
                .then_order_by(form_submissions::id.asc()),
            SortDirection::Desc => $query
                .order_by($column.desc())
                .then_order_by(form_submissions::id.desc()),
        }
    };
}

fn ordered(query: BoxedRows<'_>, sort: SubmissionSort) -> BoxedRows<'_> {
    match sort.field {
        SortField::Id => order_with_id_tiebreak!(query, form_submissions::id, sort.direction),
        SortField::Name => order_with_id_tiebreak!(query, form_submissions::name, sort.direction),
        SortField::Email => order_with_id_tiebreak!(query, form_submissions::email, sort.direction),
        SortField::Status => {
            order_with_id_tiebreak!(query, form_submissions::status, sort.direction)
        }
        SortField::CreatedAt => {
            order_with_id_tiebreak!(query, form_submissions::created_at, sort.direction)
        }
        SortField::UpdatedAt => {
            order_with_id_tiebreak!(query, form_submissions::updated_at, sort.direction)
        }
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Convert a database row to a domain submission.
fn row_to_submission(row: SubmissionRow) -> Result<Submission, SubmissionRepositoryError> {
    let email = EmailAddress::new(&row.email).map_err(|err| {
        SubmissionRepositoryError::query(format!("invalid email in row {}: {err}", row.id))
    })?;
    let fields = SubmissionFields::new(
        &row.name,
        &row.address,
        row.phone_number.as_deref(),
        row.comments.as_deref(),
    )
    .map_err(|err| {
        SubmissionRepositoryError::query(format!("invalid fields in row {}: {err}", row.id))
    })?;
    let status: SubmissionStatus = row.status.parse().map_err(|err| {
        SubmissionRepositoryError::query(format!("invalid status in row {}: {err}", row.id))
    })?;

    Ok(Submission {
        id: SubmissionId::new(row.id),
        email,
        fields,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
        submitted_by_ip: row.submitted_by_ip,
    })
}

#[async_trait]
impl SubmissionRepository for DieselSubmissionRepository {
    async fn exists_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<bool, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            form_submissions::table.filter(form_submissions::email.eq(email.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, None))
    }

    async fn insert(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let new_row = NewSubmissionRow {
            name: submission.fields.name(),
            email: submission.email.as_ref(),
            address: submission.fields.address(),
            phone_number: submission.fields.phone_number(),
            comments: submission.fields.comments(),
            status: submission.status.as_str(),
            submitted_by_ip: submission.submitted_by_ip.as_deref(),
        };

        let row = diesel::insert_into(form_submissions::table)
            .values(&new_row)
            .returning(SubmissionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(submission.email.as_ref())))?;
        row_to_submission(row)
    }

    async fn find_by_id(
        &self,
        id: SubmissionId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let row: Option<SubmissionRow> = form_submissions::table
            .find(id.as_i64())
            .select(SubmissionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        row.map(row_to_submission).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let row: Option<SubmissionRow> = form_submissions::table
            .filter(form_submissions::email.eq(email.as_ref()))
            .select(SubmissionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        row.map(row_to_submission).transpose()
    }

    async fn find_all(
        &self,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        self.page_matching(&SubmissionFilter::default(), page, sort)
            .await
    }

    async fn find_by_status(
        &self,
        status: SubmissionStatus,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        let filter = SubmissionFilter {
            status: Some(status),
            ..SubmissionFilter::default()
        };
        self.page_matching(&filter, page, sort).await
    }

    async fn find_by_filter(
        &self,
        filter: &SubmissionFilter,
        page: PageRequest,
        sort: SubmissionSort,
    ) -> Result<Page<Submission>, SubmissionRepositoryError> {
        self.page_matching(filter, page, sort).await
    }

    async fn update(
        &self,
        submission: &Submission,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let changes = SubmissionUpdate {
            name: submission.fields.name(),
            email: submission.email.as_ref(),
            address: submission.fields.address(),
            phone_number: submission.fields.phone_number(),
            comments: submission.fields.comments(),
            status: submission.status.as_str(),
            submitted_by_ip: submission.submitted_by_ip.as_deref(),
        };

        let row: Option<SubmissionRow> =
            diesel::update(form_submissions::table.find(submission.id.as_i64()))
                .set((
                    &changes,
                    form_submissions::updated_at.eq(diesel::dsl::now),
                ))
                .returning(SubmissionRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, Some(submission.email.as_ref())))?;
        row.map(row_to_submission).transpose()
    }

    async fn delete_by_id(&self, id: SubmissionId) -> Result<bool, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let removed = diesel::delete(form_submissions::table.find(id.as_i64()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(removed > 0)
    }

    async fn find_by_name_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        self.load_where(
            form_submissions::table
                .filter(form_submissions::name.ilike(contains_pattern(fragment)))
                .into_boxed(),
            BY_ID,
        )
        .await
    }

    async fn find_by_address_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        self.load_where(
            form_submissions::table
                .filter(form_submissions::address.ilike(contains_pattern(fragment)))
                .into_boxed(),
            BY_ID,
        )
        .await
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        self.load_where(
            form_submissions::table
                .filter(form_submissions::phone_number.eq(phone_number.to_owned()))
                .into_boxed(),
            BY_ID,
        )
        .await
    }

    async fn count_by_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<u64, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let count: i64 = form_submissions::table
            .filter(form_submissions::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(to_count(count))
    }

    async fn count(&self) -> Result<u64, SubmissionRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_pool_error)?;
        let count: i64 = form_submissions::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(to_count(count))
    }

    async fn find_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        self.load_where(
            form_submissions::table
                .filter(form_submissions::created_at.ge(since))
                .into_boxed(),
            NEWEST_FIRST,
        )
        .await
    }

    async fn find_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        let filter = SubmissionFilter {
            created_from: Some(from),
            created_to: Some(to),
            ..SubmissionFilter::default()
        };
        self.load_where(filtered(&filter), NEWEST_FIRST).await
    }

    async fn find_all_by_ids(
        &self,
        ids: &[SubmissionId],
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        self.load_where(
            form_submissions::table
                .filter(form_submissions::id.eq_any(raw))
                .into_boxed(),
            BY_ID,
        )
        .await
    }

    async fn list_all(&self) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        self.load_where(form_submissions::table.into_boxed(), BY_ID).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> SubmissionRow {
        let created_at = Utc
            .with_ymd_and_hms(2025, 1, 15, 8, 30, 0)
            .single()
            .expect("valid timestamp");
        SubmissionRow {
            id: 12,
            name: "Grace Hopper".to_owned(),
            email: "grace@example.com".to_owned(),
            address: "1 Navy Yard".to_owned(),
            phone_number: Some("555-0142".to_owned()),
            comments: None,
            status: "APPROVED".to_owned(),
            created_at,
            updated_at: created_at,
            submitted_by_ip: Some("192.0.2.10".to_owned()),
        }
    }

    #[rstest]
    fn row_converts_to_domain_submission(row: SubmissionRow) {
        let submission = row_to_submission(row).expect("valid row");

        assert_eq!(submission.id, SubmissionId::new(12));
        assert_eq!(submission.email.as_ref(), "grace@example.com");
        assert_eq!(submission.fields.phone_number(), Some("555-0142"));
        assert_eq!(submission.status, SubmissionStatus::Approved);
    }

    #[rstest]
    fn row_with_unknown_status_is_rejected(mut row: SubmissionRow) {
        row.status = "ARCHIVED".to_owned();

        let err = row_to_submission(row).expect_err("unknown status");

        assert!(matches!(err, SubmissionRepositoryError::Query { .. }));
        assert!(err.to_string().contains("invalid status in row 12"));
    }

    #[rstest]
    fn row_with_corrupt_email_is_rejected(mut row: SubmissionRow) {
        row.email = "not-an-email".to_owned();

        let err = row_to_submission(row).expect_err("corrupt email");

        assert!(err.to_string().contains("invalid email in row 12"));
    }

    #[rstest]
    #[case("smi", "%smi%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("back\\slash", "%back\\\\slash%")]
    fn contains_pattern_escapes_wildcards(#[case] fragment: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(fragment), expected);
    }

    fn where_clause(filter: &SubmissionFilter) -> Option<String> {
        let sql = diesel::debug_query::<Pg, _>(&filtered(filter)).to_string();
        sql.split_once(" WHERE ")
            .map(|(_, rest)| rest.to_owned())
    }

    #[rstest]
    fn empty_filter_selects_every_row() {
        assert_eq!(where_clause(&SubmissionFilter::default()), None);
    }

    #[rstest]
    fn every_set_criterion_narrows_the_query(row: SubmissionRow) {
        let filter = SubmissionFilter {
            name: Some("grace".to_owned()),
            email: Some(row.email.clone()),
            address: Some("navy".to_owned()),
            phone_number: row.phone_number.clone(),
            status: Some(SubmissionStatus::Approved),
            created_from: Some(row.created_at),
            created_to: Some(row.updated_at),
        };

        let clause = where_clause(&filter).expect("filtered query has a WHERE clause");

        for fragment in [
            r#""form_submissions"."name" ILIKE $"#,
            r#""form_submissions"."email" = $"#,
            r#""form_submissions"."address" ILIKE $"#,
            r#""form_submissions"."phone_number" = $"#,
            r#""form_submissions"."status" = $"#,
            r#""form_submissions"."created_at" >= $"#,
            r#""form_submissions"."created_at" <= $"#,
        ] {
            assert!(clause.contains(fragment), "{fragment} missing from {clause}");
        }
    }

    #[rstest]
    fn negative_counts_clamp_to_zero() {
        assert_eq!(to_count(-1), 0);
        assert_eq!(to_count(7), 7);
    }
}
