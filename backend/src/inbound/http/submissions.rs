//! Form submission HTTP handlers.
//!
//! ```text
//! POST   /api/v1/form-submissions
//! GET    /api/v1/form-submissions
//! GET    /api/v1/form-submissions/search
//! GET    /api/v1/form-submissions/search/name
//! GET    /api/v1/form-submissions/search/address
//! GET    /api/v1/form-submissions/search/phone
//! GET    /api/v1/form-submissions/stats
//! GET    /api/v1/form-submissions/recent
//! GET    /api/v1/form-submissions/range
//! GET    /api/v1/form-submissions/email/{email}
//! GET    /api/v1/form-submissions/status/{status}
//! PATCH  /api/v1/form-submissions/bulk-update
//! POST   /api/v1/form-submissions/sync-to-sheets
//! GET    /api/v1/form-submissions/{id}
//! PUT    /api/v1/form-submissions/{id}
//! PATCH  /api/v1/form-submissions/{id}/status
//! DELETE /api/v1/form-submissions/{id}
//! ```
//!
//! Literal paths are registered ahead of `{id}` in [`configure`].

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use serde_json::json;
use tracing::warn;

use crate::domain::{
    EmailAddress, Error, ErrorCode, SubmissionDraft, SubmissionFilter, SubmissionId,
    is_sync_failure,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::client_ip::client_ip;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::submissions_dto::{
    AddressQuery, BulkUpdateRequest, BulkUpdateResponse, NameQuery, PageQuery, PhoneQuery,
    RangeQuery, RecentQuery, SearchQuery, StatsResponse, StatusUpdateRequest,
    SubmissionPageResponse, SubmissionRequest, SubmissionResponse, SyncResponse, submission_list,
};
use crate::inbound::http::validation::{
    FROM, FieldName, STATUS, TO, missing_field_error, page_request, parse_optional_rfc3339_timestamp,
    parse_optional_status, parse_rfc3339_timestamp, parse_sort, parse_status,
    submission_validation_error,
};

const DEFAULT_RECENT_DAYS: u32 = 7;
const SUBMISSION_IDS: FieldName = FieldName::new("submissionIds");
const NAME: FieldName = FieldName::new("name");
const ADDRESS: FieldName = FieldName::new("address");
const PHONE_NUMBER: FieldName = FieldName::new("phoneNumber");

/// Register every submission route plus JSON, query, and path extractor
/// error handlers that answer with the domain error payload.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(create_submission)
        .service(list_submissions)
        .service(search_submissions)
        .service(search_by_name)
        .service(search_by_address)
        .service(search_by_phone)
        .service(submission_stats)
        .service(recent_submissions)
        .service(submissions_between)
        .service(get_submission_by_email)
        .service(list_submissions_by_status)
        .service(bulk_update_status)
        .service(sync_to_sheets)
        .service(get_submission)
        .service(update_submission)
        .service(update_submission_status)
        .service(delete_submission);
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("malformed JSON body: {err}"))
        .with_details(json!({ "code": "invalid_json" }))
        .into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("malformed query string: {err}"))
        .with_details(json!({ "code": "invalid_query" }))
        .into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("malformed path parameter: {err}"))
        .with_details(json!({ "code": "invalid_path" }))
        .into()
}

fn not_found(id: SubmissionId) -> Error {
    Error::not_found(format!("submission {id} not found")).with_details(json!({ "id": id }))
}

fn required<'a>(value: Option<&'a str>, field: FieldName) -> Result<&'a str, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Create a submission.
#[utoipa::path(
    post,
    path = "/api/v1/form-submissions",
    request_body = SubmissionRequest,
    responses(
        (status = 201, description = "Created submission", body = SubmissionResponse),
        (status = 400, description = "Validation failure or duplicate email", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "createSubmission"
)]
#[post("/form-submissions")]
pub async fn create_submission(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<SubmissionRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let draft = SubmissionDraft {
        email: payload.email()?,
        fields: payload.fields()?,
        status: None,
        submitted_by_ip: client_ip(&request),
    };
    let created = state.submissions.create(draft).await?;
    Ok(HttpResponse::Created().json(SubmissionResponse::from(created)))
}

/// Fetch one submission.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/{id}",
    params(("id" = i64, Path, description = "Submission identifier")),
    responses(
        (status = 200, description = "Submission", body = SubmissionResponse),
        (status = 404, description = "Unknown id", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "getSubmission"
)]
#[get("/form-submissions/{id}")]
pub async fn get_submission(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<SubmissionResponse>> {
    let id = SubmissionId::new(path.into_inner());
    let submission = state
        .submissions_query
        .get(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(web::Json(submission.into()))
}

/// Fetch one submission by email.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/email/{email}",
    params(("email" = String, Path, description = "Exact email address")),
    responses(
        (status = 200, description = "Submission", body = SubmissionResponse),
        (status = 400, description = "Malformed email", body = Error),
        (status = 404, description = "No submission uses this email", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "getSubmissionByEmail"
)]
#[get("/form-submissions/email/{email}")]
pub async fn get_submission_by_email(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SubmissionResponse>> {
    let email = EmailAddress::new(path.into_inner())
        .map_err(|err| submission_validation_error(&err))?;
    let submission = state
        .submissions_query
        .get_by_email(&email)
        .await?
        .ok_or_else(|| {
            Error::not_found(format!("no submission for {email}"))
                .with_details(json!({ "email": email.as_ref() }))
        })?;
    Ok(web::Json(submission.into()))
}

/// Page through every submission.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of submissions", body = SubmissionPageResponse),
        (status = 400, description = "Invalid paging or sort", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "listSubmissions"
)]
#[get("/form-submissions")]
pub async fn list_submissions(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<SubmissionPageResponse>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.size)?;
    let sort = parse_sort(query.sort_by.as_deref(), query.sort_direction.as_deref())?;
    let submissions = state.submissions_query.list(page, sort).await?;
    Ok(web::Json(submissions.into()))
}

/// Page through submissions in one status.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/status/{status}",
    params(("status" = String, Path, description = "PENDING, APPROVED, REJECTED, or PROCESSING"), PageQuery),
    responses(
        (status = 200, description = "One page of submissions", body = SubmissionPageResponse),
        (status = 400, description = "Unknown status or invalid paging", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "listSubmissionsByStatus"
)]
#[get("/form-submissions/status/{status}")]
pub async fn list_submissions_by_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<SubmissionPageResponse>> {
    let status = parse_status(&path.into_inner(), STATUS)?;
    let query = query.into_inner();
    let page = page_request(query.page, query.size)?;
    let sort = parse_sort(query.sort_by.as_deref(), query.sort_direction.as_deref())?;
    let submissions = state
        .submissions_query
        .list_by_status(status, page, sort)
        .await?;
    Ok(web::Json(submissions.into()))
}

/// Multi-criteria paginated search.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "One page of matches", body = SubmissionPageResponse),
        (status = 400, description = "Invalid criteria", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "searchSubmissions"
)]
#[get("/form-submissions/search")]
pub async fn search_submissions(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<SubmissionPageResponse>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.size)?;
    let sort = parse_sort(query.sort_by.as_deref(), query.sort_direction.as_deref())?;
    let filter = SubmissionFilter {
        status: parse_optional_status(query.status.as_deref(), STATUS)?,
        created_from: parse_optional_rfc3339_timestamp(query.from.as_deref(), FROM)?,
        created_to: parse_optional_rfc3339_timestamp(query.to.as_deref(), TO)?,
        name: query.name,
        email: query.email,
        address: query.address,
        phone_number: query.phone_number,
    };
    let submissions = state.submissions_query.search(filter, page, sort).await?;
    Ok(web::Json(submissions.into()))
}

/// Case-insensitive name search.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/search/name",
    params(NameQuery),
    responses(
        (status = 200, description = "Matches", body = [SubmissionResponse]),
        (status = 400, description = "Missing name", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "searchSubmissionsByName"
)]
#[get("/form-submissions/search/name")]
pub async fn search_by_name(
    state: web::Data<HttpState>,
    query: web::Query<NameQuery>,
) -> ApiResult<web::Json<Vec<SubmissionResponse>>> {
    let name = required(query.name.as_deref(), NAME)?;
    let submissions = state.submissions_query.search_by_name(name).await?;
    Ok(web::Json(submission_list(submissions)))
}

/// Case-insensitive address search.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/search/address",
    params(AddressQuery),
    responses(
        (status = 200, description = "Matches", body = [SubmissionResponse]),
        (status = 400, description = "Missing address", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "searchSubmissionsByAddress"
)]
#[get("/form-submissions/search/address")]
pub async fn search_by_address(
    state: web::Data<HttpState>,
    query: web::Query<AddressQuery>,
) -> ApiResult<web::Json<Vec<SubmissionResponse>>> {
    let address = required(query.address.as_deref(), ADDRESS)?;
    let submissions = state.submissions_query.search_by_address(address).await?;
    Ok(web::Json(submission_list(submissions)))
}

/// Exact phone number lookup.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/search/phone",
    params(PhoneQuery),
    responses(
        (status = 200, description = "Matches", body = [SubmissionResponse]),
        (status = 400, description = "Missing phone number", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "searchSubmissionsByPhone"
)]
#[get("/form-submissions/search/phone")]
pub async fn search_by_phone(
    state: web::Data<HttpState>,
    query: web::Query<PhoneQuery>,
) -> ApiResult<web::Json<Vec<SubmissionResponse>>> {
    let phone_number = required(query.phone_number.as_deref(), PHONE_NUMBER)?;
    let submissions = state
        .submissions_query
        .find_by_phone_number(phone_number.trim())
        .await?;
    Ok(web::Json(submission_list(submissions)))
}

/// Counts per status and approval/rejection rates.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/stats",
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse)
    ),
    tags = ["form-submissions"],
    operation_id = "submissionStats"
)]
#[get("/form-submissions/stats")]
pub async fn submission_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<StatsResponse>> {
    let stats = state.submissions_query.stats().await?;
    Ok(web::Json(stats.into()))
}

/// Submissions created in the last `days` days, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent submissions", body = [SubmissionResponse]),
        (status = 400, description = "days out of range", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "recentSubmissions"
)]
#[get("/form-submissions/recent")]
pub async fn recent_submissions(
    state: web::Data<HttpState>,
    query: web::Query<RecentQuery>,
) -> ApiResult<web::Json<Vec<SubmissionResponse>>> {
    let days = match query.days {
        None => DEFAULT_RECENT_DAYS,
        Some(raw) => u32::try_from(raw).map_err(|_| {
            Error::invalid_request("days must not be negative")
                .with_details(json!({ "field": "days", "code": "out_of_range", "value": raw }))
        })?,
    };
    let submissions = state.submissions_query.recent(days).await?;
    Ok(web::Json(submission_list(submissions)))
}

/// Submissions created within an inclusive time window.
#[utoipa::path(
    get,
    path = "/api/v1/form-submissions/range",
    params(RangeQuery),
    responses(
        (status = 200, description = "Submissions in range", body = [SubmissionResponse]),
        (status = 400, description = "Missing, malformed, or inverted bounds", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "submissionsBetween"
)]
#[get("/form-submissions/range")]
pub async fn submissions_between(
    state: web::Data<HttpState>,
    query: web::Query<RangeQuery>,
) -> ApiResult<web::Json<Vec<SubmissionResponse>>> {
    let from = parse_rfc3339_timestamp(required(query.from.as_deref(), FROM)?, FROM)?;
    let to = parse_rfc3339_timestamp(required(query.to.as_deref(), TO)?, TO)?;
    let submissions = state.submissions_query.between(from, to).await?;
    Ok(web::Json(submission_list(submissions)))
}

/// Replace the editable fields of a submission.
#[utoipa::path(
    put,
    path = "/api/v1/form-submissions/{id}",
    params(("id" = i64, Path, description = "Submission identifier")),
    request_body = SubmissionRequest,
    responses(
        (status = 200, description = "Updated submission", body = SubmissionResponse),
        (status = 400, description = "Validation failure", body = Error),
        (status = 404, description = "Unknown id", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "updateSubmission"
)]
#[put("/form-submissions/{id}")]
pub async fn update_submission(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<SubmissionRequest>,
) -> ApiResult<web::Json<SubmissionResponse>> {
    let id = SubmissionId::new(path.into_inner());
    let fields = payload.fields()?;
    let updated = state.submissions.update_fields(id, fields).await?;
    Ok(web::Json(updated.into()))
}

/// Move a submission to a new status.
#[utoipa::path(
    patch,
    path = "/api/v1/form-submissions/{id}/status",
    params(("id" = i64, Path, description = "Submission identifier")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated submission", body = SubmissionResponse),
        (status = 400, description = "Missing or unknown status", body = Error),
        (status = 404, description = "Unknown id", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "updateSubmissionStatus"
)]
#[patch("/form-submissions/{id}/status")]
pub async fn update_submission_status(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<StatusUpdateRequest>,
) -> ApiResult<web::Json<SubmissionResponse>> {
    let id = SubmissionId::new(path.into_inner());
    let status = parse_status(required(payload.status.as_deref(), STATUS)?, STATUS)?;
    let updated = state.submissions.update_status(id, status).await?;
    Ok(web::Json(updated.into()))
}

/// Hard delete a submission.
#[utoipa::path(
    delete,
    path = "/api/v1/form-submissions/{id}",
    params(("id" = i64, Path, description = "Submission identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown id", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "deleteSubmission"
)]
#[delete("/form-submissions/{id}")]
pub async fn delete_submission(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = SubmissionId::new(path.into_inner());
    state.submissions.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Move many submissions to one status. Unknown ids are reported, not errors.
#[utoipa::path(
    patch,
    path = "/api/v1/form-submissions/bulk-update",
    request_body = BulkUpdateRequest,
    responses(
        (status = 200, description = "Per-id outcome", body = BulkUpdateResponse),
        (status = 400, description = "Missing ids or status", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["form-submissions"],
    operation_id = "bulkUpdateSubmissionStatus"
)]
#[patch("/form-submissions/bulk-update")]
pub async fn bulk_update_status(
    state: web::Data<HttpState>,
    payload: web::Json<BulkUpdateRequest>,
) -> ApiResult<web::Json<BulkUpdateResponse>> {
    let BulkUpdateRequest {
        submission_ids,
        status,
    } = payload.into_inner();
    let ids = submission_ids
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| missing_field_error(SUBMISSION_IDS))?;
    let status = parse_status(required(status.as_deref(), STATUS)?, STATUS)?;

    let outcome = state
        .submissions
        .bulk_update_status(ids.into_iter().map(SubmissionId::new).collect(), status)
        .await?;
    if !outcome.failed.is_empty() {
        warn!(failed = outcome.failed.len(), "bulk status update partially failed");
    }
    Ok(web::Json(outcome.into()))
}

const STORE_FAILURE_REASON: &str = "submissions could not be loaded";

/// Push every stored submission to the spreadsheet mirror.
#[utoipa::path(
    post,
    path = "/api/v1/form-submissions/sync-to-sheets",
    responses(
        (status = 200, description = "Sync finished", body = SyncResponse),
        (status = 500, description = "Sync failed", body = SyncResponse)
    ),
    tags = ["form-submissions"],
    operation_id = "syncSubmissionsToSheets"
)]
#[post("/form-submissions/sync-to-sheets")]
pub async fn sync_to_sheets(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    match state.submissions.sync_all().await {
        Ok(synced) => Ok(HttpResponse::Ok().json(SyncResponse::success(synced))),
        Err(err) if err.code() == ErrorCode::InternalError => {
            warn!(error = %err, "spreadsheet sync failed");
            let reason = if is_sync_failure(&err) {
                err.message()
            } else {
                STORE_FAILURE_REASON
            };
            Ok(HttpResponse::InternalServerError().json(SyncResponse::failure(reason)))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "submissions_tests.rs"]
mod tests;
