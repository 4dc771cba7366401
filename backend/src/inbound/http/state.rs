//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureSubmissionCommand, FixtureSubmissionQuery, SubmissionCommand, SubmissionQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Submission mutations.
    pub submissions: Arc<dyn SubmissionCommand>,
    /// Submission reads.
    pub submissions_query: Arc<dyn SubmissionQuery>,
}

impl HttpState {
    /// Construct state from the submission ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use form_intake::domain::ports::{FixtureSubmissionCommand, FixtureSubmissionQuery};
    /// use form_intake::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureSubmissionCommand),
    ///     Arc::new(FixtureSubmissionQuery),
    /// );
    /// let _query = state.submissions_query.clone();
    /// ```
    pub fn new(
        submissions: Arc<dyn SubmissionCommand>,
        submissions_query: Arc<dyn SubmissionQuery>,
    ) -> Self {
        Self {
            submissions,
            submissions_query,
        }
    }

    /// Build state from one value implementing both ports.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: SubmissionCommand + SubmissionQuery + 'static,
    {
        Self {
            submissions: service.clone(),
            submissions_query: service,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureSubmissionCommand),
            Arc::new(FixtureSubmissionQuery),
        )
    }
}
