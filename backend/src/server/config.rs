//! Server settings loaded via OrthoConfig.
//!
//! Values come from `FORM_INTAKE_*` environment variables, CLI flags, or a
//! configuration file. Every field is optional; accessors supply defaults.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::SyncDispatch;
use crate::outbound::sheets::SheetsTarget;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SHEETS_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SHEETS_PACE_MILLIS: u64 = 100;

/// Runtime configuration for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FORM_INTAKE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it submissions live in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Spreadsheet bridge endpoint. Without it mirror calls are only logged.
    pub sheets_webhook_url: Option<String>,
    /// Spreadsheet identifier passed to the bridge.
    pub spreadsheet_id: Option<String>,
    /// Worksheet name passed to the bridge.
    pub worksheet_name: Option<String>,
    /// Per-request timeout for the bridge.
    pub sheets_timeout_secs: Option<u64>,
    /// Pause between rows during a full sync.
    pub sheets_pace_millis: Option<u64>,
    /// Mirror dispatch mode: `detached` (spawned task) or `inline`.
    pub sync_mode: Option<String>,
}

impl ServerSettings {
    /// Listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Database URL, if one is configured and non-blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size, falling back to 10.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Parsed bridge endpoint, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed URL.
    pub fn sheets_webhook_url(&self) -> Result<Option<Url>, url::ParseError> {
        self.sheets_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(Url::parse)
            .transpose()
    }

    /// Spreadsheet and worksheet, each falling back to its default.
    pub fn sheets_target(&self) -> SheetsTarget {
        let defaults = SheetsTarget::default();
        SheetsTarget {
            spreadsheet_id: self
                .spreadsheet_id
                .clone()
                .unwrap_or(defaults.spreadsheet_id),
            worksheet_name: self
                .worksheet_name
                .clone()
                .unwrap_or(defaults.worksheet_name),
        }
    }

    /// Bridge request timeout, falling back to 10 seconds.
    pub fn sheets_timeout(&self) -> Duration {
        Duration::from_secs(
            self.sheets_timeout_secs
                .unwrap_or(DEFAULT_SHEETS_TIMEOUT_SECS),
        )
    }

    /// Pause between rows, falling back to 100 milliseconds.
    pub fn sheets_pace(&self) -> Duration {
        Duration::from_millis(
            self.sheets_pace_millis
                .unwrap_or(DEFAULT_SHEETS_PACE_MILLIS),
        )
    }

    /// Mirror dispatch mode. Only an explicit `inline` awaits the mirror;
    /// anything else, including an absent value, detaches it.
    pub fn sync_dispatch(&self) -> SyncDispatch {
        match self.sync_mode.as_deref().map(str::trim) {
            Some(mode) if mode.eq_ignore_ascii_case("inline") => SyncDispatch::Inline,
            _ => SyncDispatch::Detached,
        }
    }
}
