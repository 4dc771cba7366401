//! Domain primitives, ports, and the submission service.
//!
//! Public surface:
//! - [`Submission`] and its value types, validated at construction.
//! - [`SubmissionFilter`] / [`SubmissionSort`] query criteria.
//! - [`SubmissionStats`] aggregate counts and rates.
//! - [`SubmissionService`] implementing the driving ports in [`ports`].
//! - [`Error`] / [`ErrorCode`] transport-agnostic failures.

pub mod error;
pub mod ports;
pub mod search;
pub mod stats;
pub mod submission;
pub mod submission_service;
pub mod trace_id;

pub use self::error::{Error, ErrorCode};
pub use self::search::{
    ParseSortFieldError, SortField, SubmissionFilter, SubmissionSort, contains_ignore_case,
};
pub use self::stats::{StatusCounts, SubmissionStats};
pub use self::submission::{
    ADDRESS_MAX, COMMENTS_MAX, EMAIL_MAX, EmailAddress, NAME_MAX, NewSubmission, PHONE_NUMBER_MAX,
    ParseSubmissionStatusError, Submission, SubmissionDraft, SubmissionFields, SubmissionId,
    SubmissionStatus, SubmissionValidationError,
};
pub use self::submission_service::{
    SYNC_FAILED, SubmissionService, SyncDispatch, is_sync_failure,
};
pub use self::trace_id::TraceId;
