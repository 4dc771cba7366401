//! Spreadsheet mirror adapters for the `SubmissionSync` port.
//!
//! [`SheetsWebhookSync`] posts rows to a spreadsheet bridge over HTTP;
//! [`LoggingSubmissionSync`] stands in when no bridge is configured.

mod logging;
mod row;
mod webhook;

pub use logging::LoggingSubmissionSync;
pub use row::{SHEET_COLUMNS, SheetRow};
pub use webhook::{SheetsTarget, SheetsWebhookSync};
