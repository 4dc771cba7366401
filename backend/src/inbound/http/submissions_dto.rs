//! Request and response payloads for the submission endpoints.

use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::BulkStatusUpdateOutcome;
use crate::domain::{
    EmailAddress, Error, Submission, SubmissionFields, SubmissionId, SubmissionStats,
    SubmissionStatus,
};

use super::validation::submission_validation_error;

/// Create/replace payload.
///
/// Every field is optional at the wire level so missing values surface as
/// `required` validation errors rather than opaque decode failures.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "12 St James's Square, London")]
    pub address: Option<String>,
    #[schema(example = "+44 20 7946 0000")]
    pub phone_number: Option<String>,
    pub comments: Option<String>,
}

impl SubmissionRequest {
    /// Validate the editable fields.
    pub(crate) fn fields(&self) -> Result<SubmissionFields, Error> {
        SubmissionFields::new(
            self.name.as_deref().unwrap_or_default(),
            self.address.as_deref().unwrap_or_default(),
            self.phone_number.as_deref(),
            self.comments.as_deref(),
        )
        .map_err(|err| submission_validation_error(&err))
    }

    /// Validate the email address.
    pub(crate) fn email(&self) -> Result<EmailAddress, Error> {
        EmailAddress::new(self.email.as_deref().unwrap_or_default())
            .map_err(|err| submission_validation_error(&err))
    }
}

/// A stored submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub comments: Option<String>,
    pub status: SubmissionStatus,
    /// RFC 3339 insertion time.
    pub created_at: String,
    /// RFC 3339 time of the last change.
    pub updated_at: String,
    pub submitted_by_ip: Option<String>,
}

impl From<Submission> for SubmissionResponse {
    fn from(value: Submission) -> Self {
        Self {
            id: value.id.as_i64(),
            name: value.fields.name().to_owned(),
            email: value.email.into(),
            address: value.fields.address().to_owned(),
            phone_number: value.fields.phone_number().map(str::to_owned),
            comments: value.fields.comments().map(str::to_owned),
            status: value.status,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            submitted_by_ip: value.submitted_by_ip,
        }
    }
}

pub(crate) fn submission_list(submissions: Vec<Submission>) -> Vec<SubmissionResponse> {
    submissions.into_iter().map(SubmissionResponse::from).collect()
}

/// One page of submissions.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPageResponse {
    pub content: Vec<SubmissionResponse>,
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl From<Page<Submission>> for SubmissionPageResponse {
    fn from(value: Page<Submission>) -> Self {
        let Page {
            content,
            page,
            size,
            total_elements,
            total_pages,
        } = value.map(SubmissionResponse::from);
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}

/// Status change payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct StatusUpdateRequest {
    #[schema(example = "APPROVED")]
    pub status: Option<String>,
}

/// Bulk status change payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest {
    pub submission_ids: Option<Vec<i64>>,
    #[schema(example = "REJECTED")]
    pub status: Option<String>,
}

/// Per-id result of a bulk status change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResponse {
    pub updated: Vec<i64>,
    /// Ids that matched nothing; these are not errors.
    pub missing: Vec<i64>,
    pub failed: Vec<i64>,
}

fn raw_ids(ids: Vec<SubmissionId>) -> Vec<i64> {
    ids.into_iter().map(SubmissionId::as_i64).collect()
}

impl From<BulkStatusUpdateOutcome> for BulkUpdateResponse {
    fn from(value: BulkStatusUpdateOutcome) -> Self {
        Self {
            updated: raw_ids(value.updated),
            missing: raw_ids(value.missing),
            failed: raw_ids(value.failed),
        }
    }
}

/// Aggregate counts and rates.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub processing: u64,
    /// Percentage rounded half-up to two decimals.
    #[schema(example = 33.33)]
    pub approval_rate: f64,
    #[schema(example = 66.67)]
    pub rejection_rate: f64,
}

impl From<SubmissionStats> for StatsResponse {
    fn from(value: SubmissionStats) -> Self {
        Self {
            total: value.total,
            pending: value.pending,
            approved: value.approved,
            rejected: value.rejected,
            processing: value.processing,
            approval_rate: value.approval_rate,
            rejection_rate: value.rejection_rate,
        }
    }
}

/// Outcome of a full spreadsheet sync.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SyncResponse {
    /// `success` or `error`.
    pub status: String,
    pub message: String,
}

impl SyncResponse {
    pub(crate) fn success(synced: usize) -> Self {
        Self {
            status: "success".to_owned(),
            message: format!("synced {synced} submissions to the spreadsheet"),
        }
    }

    pub(crate) fn failure(reason: &str) -> Self {
        Self {
            status: "error".to_owned(),
            message: format!("sync failed: {reason}"),
        }
    }
}

/// Paging and ordering query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index (default 0).
    pub page: Option<i64>,
    /// Page size, 1 to 100 (default 20).
    pub size: Option<i64>,
    /// One of id, name, email, status, createdAt, updatedAt.
    pub sort_by: Option<String>,
    /// asc or desc (default desc).
    pub sort_direction: Option<String>,
}

/// Multi-criteria search parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    /// Exact email.
    pub email: Option<String>,
    /// Case-insensitive address fragment.
    pub address: Option<String>,
    /// Exact phone number.
    pub phone_number: Option<String>,
    pub status: Option<String>,
    /// RFC 3339 inclusive lower bound on creation time.
    pub from: Option<String>,
    /// RFC 3339 inclusive upper bound on creation time.
    pub to: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

/// `?name=` search parameter.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// `?address=` search parameter.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressQuery {
    pub address: Option<String>,
}

/// `?phoneNumber=` search parameter.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PhoneQuery {
    pub phone_number: Option<String>,
}

/// `?days=` window for recent submissions.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentQuery {
    /// Days to look back, 0 to 3650 (default 7).
    pub days: Option<i64>,
}

/// Creation time window.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// RFC 3339 inclusive start.
    pub from: Option<String>,
    /// RFC 3339 inclusive end.
    pub to: Option<String>,
}
