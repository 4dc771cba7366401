//! Domain ports for the hexagonal boundary.
//!
//! Driven ports ([`SubmissionRepository`], [`SubmissionSync`]) are
//! implemented by outbound adapters. Driving ports ([`SubmissionCommand`],
//! [`SubmissionQuery`]) are implemented by the domain service and consumed
//! by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod submission_command;
mod submission_query;
mod submission_repository;
mod submission_sync;

#[cfg(test)]
pub use submission_command::MockSubmissionCommand;
pub use submission_command::{
    BulkStatusUpdateOutcome, FixtureSubmissionCommand, SubmissionCommand,
};
#[cfg(test)]
pub use submission_query::MockSubmissionQuery;
pub use submission_query::{FixtureSubmissionQuery, RECENT_DAYS_MAX, SubmissionQuery};
#[cfg(test)]
pub use submission_repository::MockSubmissionRepository;
pub use submission_repository::{
    FixtureSubmissionRepository, SubmissionRepository, SubmissionRepositoryError,
};
#[cfg(test)]
pub use submission_sync::MockSubmissionSync;
pub use submission_sync::{FixtureSubmissionSync, SubmissionSync, SubmissionSyncError};
