//! Status mapping, redaction, and trace header coverage.

use super::*;
use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::json;

const TRACE: &str = "6f1c2a84-0d2b-4e57-9a51-0c1b8f0e6d3a";

struct Rendered {
    status: StatusCode,
    trace_header: Option<String>,
    payload: Error,
}

async fn render(error: &Error) -> Rendered {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let trace_header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("body is readable");
    Rendered {
        status,
        trace_header,
        payload: serde_json::from_slice(&bytes).expect("error payload is JSON"),
    }
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::DuplicateEmail, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn codes_map_to_statuses(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(Error::new(code, "x").status_code(), status);
}

#[rstest]
#[case(ErrorCode::InternalError, "Internal server error")]
#[case(ErrorCode::ServiceUnavailable, "Submission store temporarily unavailable")]
#[actix_web::test]
async fn server_side_failures_are_redacted(#[case] code: ErrorCode, #[case] message: &str) {
    let error = Error::new(code, "pool timed out talking to db-7.internal:5432")
        .with_trace_id(TRACE)
        .with_details(json!({ "host": "db-7.internal" }));

    let rendered = render(&error).await;

    assert_eq!(rendered.trace_header.as_deref(), Some(TRACE));
    assert_eq!(rendered.payload.code(), code);
    assert_eq!(rendered.payload.message(), message);
    assert_eq!(rendered.payload.trace_id(), Some(TRACE));
    assert!(rendered.payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_is_a_bad_request_with_its_own_code() {
    let error = Error::duplicate_email("a submission with email a@b.co already exists")
        .with_trace_id(TRACE)
        .with_details(json!({ "field": "email", "code": "duplicate_email" }));

    let rendered = render(&error).await;

    assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
    assert_eq!(rendered.payload, error);
}

#[rstest]
#[actix_web::test]
async fn untraced_errors_have_no_trace_header() {
    let error = Error::invalid_request("name is required")
        .with_details(json!({ "field": "name", "code": "required" }));

    let rendered = render(&error).await;

    assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
    assert!(rendered.trace_header.is_none());
    assert_eq!(rendered.payload, error);
}

#[rstest]
fn client_errors_are_shown_as_raised() {
    let error = Error::not_found("submission 9 not found")
        .with_trace_id(TRACE)
        .with_details(json!({ "id": 9 }));
    assert_eq!(public_view(&error), error);
}
