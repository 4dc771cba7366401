//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every submission endpoint, the health probes, and
//! the request/response schemas. The document backs Swagger UI in debug
//! builds and is exported by `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, SubmissionStatus};
use crate::inbound::http::submissions_dto::{
    BulkUpdateRequest, BulkUpdateResponse, StatsResponse, StatusUpdateRequest,
    SubmissionPageResponse, SubmissionRequest, SubmissionResponse, SyncResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Form intake API",
        description = "Collect form submissions, review their status, and mirror them to a spreadsheet."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::submissions::create_submission,
        crate::inbound::http::submissions::get_submission,
        crate::inbound::http::submissions::get_submission_by_email,
        crate::inbound::http::submissions::list_submissions,
        crate::inbound::http::submissions::list_submissions_by_status,
        crate::inbound::http::submissions::search_submissions,
        crate::inbound::http::submissions::search_by_name,
        crate::inbound::http::submissions::search_by_address,
        crate::inbound::http::submissions::search_by_phone,
        crate::inbound::http::submissions::submission_stats,
        crate::inbound::http::submissions::recent_submissions,
        crate::inbound::http::submissions::submissions_between,
        crate::inbound::http::submissions::update_submission,
        crate::inbound::http::submissions::update_submission_status,
        crate::inbound::http::submissions::delete_submission,
        crate::inbound::http::submissions::bulk_update_status,
        crate::inbound::http::submissions::sync_to_sheets,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SubmissionStatus,
        SubmissionRequest,
        SubmissionResponse,
        SubmissionPageResponse,
        StatusUpdateRequest,
        BulkUpdateRequest,
        BulkUpdateResponse,
        StatsResponse,
        SyncResponse,
    )),
    tags(
        (name = "form-submissions", description = "Submission intake and review"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn submission_schema_is_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get("SubmissionResponse")
            .expect("SubmissionResponse schema");

        assert_object_schema_has_field(schema, "phoneNumber");
        assert_object_schema_has_field(schema, "submittedByIp");
    }

    #[test]
    fn literal_routes_are_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/form-submissions/stats",
            "/api/v1/form-submissions/bulk-update",
            "/api/v1/form-submissions/sync-to-sheets",
            "/api/v1/form-submissions/{id}/status",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
