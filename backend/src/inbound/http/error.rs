//! Domain errors rendered as JSON HTTP responses.
//!
//! Client errors go out as raised. Server-side failures keep their code and
//! trace id but swap the message for a fixed public one and drop details,
//! since they may quote database or network internals.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::TRACE_ID_HEADER;

/// Result type returned by submission handlers.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Submission store temporarily unavailable";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::DuplicateEmail => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn public_message(code: ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::InternalError => Some(INTERNAL_MESSAGE),
        ErrorCode::ServiceUnavailable => Some(UNAVAILABLE_MESSAGE),
        ErrorCode::InvalidRequest | ErrorCode::DuplicateEmail | ErrorCode::NotFound => None,
    }
}

/// The payload clients see for `error`.
fn public_view(error: &Error) -> Error {
    let Some(message) = public_message(error.code()) else {
        return error.clone();
    };
    let redacted = Error::new(error.code(), message);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        match self.code() {
            ErrorCode::InternalError => {
                error!(error = %self, trace_id = ?self.trace_id(), "request failed");
            }
            ErrorCode::ServiceUnavailable => {
                warn!(error = %self, trace_id = ?self.trace_id(), "submission store unavailable");
            }
            ErrorCode::InvalidRequest | ErrorCode::DuplicateEmail | ErrorCode::NotFound => {}
        }

        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(public_view(self))
    }
}

#[cfg(test)]
mod tests;
