//! Regression coverage for this module.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::duplicate_email("taken"), ErrorCode::DuplicateEmail)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_code_in_snake_case(expected_trace_id: String) {
    let error = Error::duplicate_email("taken")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "field": "email" }));

    let value = serde_json::to_value(&error).expect("error serialises");

    assert_eq!(value["code"], "duplicate_email");
    assert_eq!(value["message"], "taken");
    assert_eq!(value["traceId"], expected_trace_id);
    assert_eq!(value["details"]["field"], "email");
}

#[rstest]
fn omits_absent_optional_fields() {
    let value = serde_json::to_value(Error::not_found("missing")).expect("error serialises");
    let object = value.as_object().expect("error is an object");

    assert!(!object.contains_key("traceId"));
    assert!(!object.contains_key("details"));
}

#[rstest]
fn display_uses_message() {
    assert_eq!(Error::invalid_request("bad input").to_string(), "bad input");
}
