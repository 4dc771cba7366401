//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use pagination::{DEFAULT_PAGE_SIZE, PageRequest, PageRequestError, SortDirection};
use serde_json::json;

use crate::domain::{
    Error, SortField, SubmissionSort, SubmissionStatus, SubmissionValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidStatus,
    InvalidTimestamp,
    InvalidSort,
    InvalidPage,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidStatus => "invalid_status",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidSort => "invalid_sort",
            ErrorCode::InvalidPage => "invalid_page",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) const STATUS: FieldName = FieldName::new("status");
pub(crate) const SORT_BY: FieldName = FieldName::new("sortBy");
pub(crate) const SORT_DIRECTION: FieldName = FieldName::new("sortDirection");
pub(crate) const FROM: FieldName = FieldName::new("from");
pub(crate) const TO: FieldName = FieldName::new("to");

struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

/// Render a field validation failure with `{field, code, [max]}` details.
pub(crate) fn submission_validation_error(err: &SubmissionValidationError) -> Error {
    let mut details = json!({
        "field": err.field(),
        "code": err.code(),
    });
    if let Some(max) = err.max() {
        details["max"] = json!(max);
    }
    Error::invalid_request(err.to_string()).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn parse_status(value: &str, field: FieldName) -> Result<SubmissionStatus, Error> {
    SubmissionStatus::from_str(value).map_err(|_| {
        ValidationError::new(
            field,
            "status must be one of PENDING, APPROVED, REJECTED, PROCESSING",
        )
        .with_value(ErrorCode::InvalidStatus, value)
    })
}

pub(crate) fn parse_optional_status(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<SubmissionStatus>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_status(raw, field))
        .transpose()
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let name = field.as_str();
            ValidationError::new(field, format!("{name} must be an RFC 3339 timestamp"))
                .with_value(ErrorCode::InvalidTimestamp, value)
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

/// Page request from optional query parameters, defaulting to page 0 of 20.
pub(crate) fn page_request(page: Option<i64>, size: Option<i64>) -> Result<PageRequest, Error> {
    PageRequest::from_signed(page.unwrap_or(0), size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)))
        .map_err(|err| {
            let field = match err {
                PageRequestError::NegativePage | PageRequestError::PageOutOfRange => {
                    FieldName::new("page")
                }
                _ => FieldName::new("size"),
            };
            ValidationError::new(field, err.to_string()).with_code(ErrorCode::InvalidPage)
        })
}

/// Sort order from optional query parameters, defaulting to `createdAt desc`.
pub(crate) fn parse_sort(
    sort_by: Option<&str>,
    sort_direction: Option<&str>,
) -> Result<SubmissionSort, Error> {
    let field = sort_by
        .map(|raw| {
            SortField::from_str(raw).map_err(|err| {
                ValidationError::new(SORT_BY, err.to_string())
                    .with_value(ErrorCode::InvalidSort, raw)
            })
        })
        .transpose()?
        .unwrap_or_default();
    let direction = sort_direction
        .map(|raw| {
            SortDirection::from_str(raw).map_err(|err| {
                ValidationError::new(SORT_DIRECTION, err.to_string())
                    .with_value(ErrorCode::InvalidSort, raw)
            })
        })
        .transpose()?
        .unwrap_or_default();
    Ok(SubmissionSort::new(field, direction))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode as DomainErrorCode;
    use rstest::rstest;

    #[rstest]
    fn validation_errors_carry_field_code_and_max() {
        let err = submission_validation_error(&SubmissionValidationError::NameTooLong { max: 100 });

        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["field"], "name");
        assert_eq!(details["code"], "too_long");
        assert_eq!(details["max"], 100);
    }

    #[rstest]
    fn required_errors_omit_max() {
        let err = submission_validation_error(&SubmissionValidationError::EmptyEmail);

        let details = err.details().expect("details present");
        assert_eq!(details["field"], "email");
        assert_eq!(details["code"], "required");
        assert!(details.get("max").is_none());
    }

    #[rstest]
    #[case("approved", SubmissionStatus::Approved)]
    #[case("PROCESSING", SubmissionStatus::Processing)]
    fn parses_statuses(#[case] raw: &str, #[case] expected: SubmissionStatus) {
        assert_eq!(parse_status(raw, STATUS).expect("valid status"), expected);
    }

    #[rstest]
    fn rejects_unknown_status_with_value() {
        let err = parse_status("archived", STATUS).expect_err("unknown status");
        let details = err.details().expect("details present");
        assert_eq!(details["value"], "archived");
        assert_eq!(details["code"], "invalid_status");
    }

    #[rstest]
    fn blank_optional_status_is_absent() {
        assert_eq!(parse_optional_status(Some("  "), STATUS).expect("blank ok"), None);
    }

    #[rstest]
    fn page_defaults_apply() {
        let page = page_request(None, None).expect("defaults are valid");
        assert_eq!(page.page(), 0);
        assert_eq!(page.size(), DEFAULT_PAGE_SIZE);
    }

    #[rstest]
    #[case(Some(-1), None, "page")]
    #[case(None, Some(0), "size")]
    #[case(None, Some(101), "size")]
    fn page_errors_name_the_field(
        #[case] page: Option<i64>,
        #[case] size: Option<i64>,
        #[case] field: &str,
    ) {
        let err = page_request(page, size).expect_err("invalid paging");
        assert_eq!(err.details().expect("details present")["field"], field);
    }

    #[rstest]
    fn sort_defaults_to_newest_first() {
        assert_eq!(
            parse_sort(None, None).expect("defaults are valid"),
            SubmissionSort::default()
        );
    }

    #[rstest]
    fn sort_accepts_mixed_case() {
        let sort = parse_sort(Some("name"), Some("ASC")).expect("valid sort");
        assert_eq!(sort, SubmissionSort::new(SortField::Name, SortDirection::Asc));
    }

    #[rstest]
    #[case(Some("favouriteColour"), None)]
    #[case(None, Some("sideways"))]
    fn sort_rejects_unknown_values(#[case] by: Option<&str>, #[case] direction: Option<&str>) {
        let err = parse_sort(by, direction).expect_err("invalid sort");
        assert_eq!(
            err.details().expect("details present")["code"],
            "invalid_sort"
        );
    }

    #[rstest]
    fn timestamps_must_be_rfc3339() {
        let err = parse_rfc3339_timestamp("yesterday", FROM).expect_err("invalid timestamp");
        assert_eq!(err.details().expect("details present")["field"], "from");

        let parsed = parse_optional_rfc3339_timestamp(Some("2025-01-02T03:04:05+01:00"), TO)
            .expect("valid timestamp")
            .expect("present");
        assert_eq!(parsed.to_rfc3339(), "2025-01-02T02:04:05+00:00");
    }
}
