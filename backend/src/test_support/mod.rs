//! Test doubles shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature.

mod clock;
mod recording_sync;

pub use clock::MutableClock;
pub use recording_sync::{RecordingSubmissionSync, SyncCall};
