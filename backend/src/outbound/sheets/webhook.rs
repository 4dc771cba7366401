//! Reqwest-backed spreadsheet mirror.
//!
//! Submissions are posted as JSON to a spreadsheet bridge endpoint (an Apps
//! Script web app or similar) that owns the actual sheet credentials. The
//! adapter only handles payload encoding, timeouts, pacing, and HTTP error
//! mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::row::SheetRow;
use crate::domain::ports::{SubmissionSync, SubmissionSyncError};
use crate::domain::{Submission, SubmissionId, SubmissionStatus};

const DEFAULT_SPREADSHEET_ID: &str = "form-intake-submissions";
const DEFAULT_WORKSHEET_NAME: &str = "Sheet1";
const DEFAULT_PACE: Duration = Duration::from_millis(100);

/// Which spreadsheet and worksheet rows land in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsTarget {
    /// Spreadsheet identifier understood by the bridge.
    pub spreadsheet_id: String,
    /// Worksheet (tab) name inside the spreadsheet.
    pub worksheet_name: String,
}

impl Default for SheetsTarget {
    fn default() -> Self {
        Self {
            spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_owned(),
            worksheet_name: DEFAULT_WORKSHEET_NAME.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetRequest<'a> {
    spreadsheet_id: &'a str,
    worksheet_name: &'a str,
    #[serde(flatten)]
    operation: SheetOperation,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum SheetOperation {
    AppendRow { row: SheetRow },
    UpdateStatus { id: String, status: String },
}

/// Sync adapter that posts submission rows to a spreadsheet webhook.
pub struct SheetsWebhookSync {
    client: Client,
    endpoint: Url,
    target: SheetsTarget,
    pace: Duration,
}

impl SheetsWebhookSync {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        target: SheetsTarget,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            target,
            pace: DEFAULT_PACE,
        })
    }

    /// Pause inserted between rows during [`SubmissionSync::sync_all`].
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    fn request(&self, operation: SheetOperation) -> SheetRequest<'_> {
        SheetRequest {
            spreadsheet_id: &self.target.spreadsheet_id,
            worksheet_name: &self.target.worksheet_name,
            operation,
        }
    }

    async fn post(&self, operation: SheetOperation) -> Result<(), SubmissionSyncError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&self.request(operation))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }

    async fn append(&self, submission: &Submission) -> Result<(), SubmissionSyncError> {
        self.post(SheetOperation::AppendRow {
            row: SheetRow::from(submission),
        })
        .await
    }
}

#[async_trait]
impl SubmissionSync for SheetsWebhookSync {
    async fn mirror_create(&self, submission: &Submission) -> Result<(), SubmissionSyncError> {
        self.append(submission).await?;
        debug!(submission_id = %submission.id, "appended submission row");
        Ok(())
    }

    async fn mirror_status_change(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<(), SubmissionSyncError> {
        self.post(SheetOperation::UpdateStatus {
            id: id.to_string(),
            status: status.as_str().to_owned(),
        })
        .await?;
        debug!(submission_id = %id, status = %status, "updated submission row status");
        Ok(())
    }

    async fn sync_all(&self, submissions: &[Submission]) -> Result<(), SubmissionSyncError> {
        let mut written = 0_usize;
        let mut last_error = None;
        for (index, submission) in submissions.iter().enumerate() {
            if index > 0 && !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }
            match self.append(submission).await {
                Ok(()) => written += 1,
                Err(err) => {
                    warn!(submission_id = %submission.id, error = %err, "failed to sync row");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if written == 0 => Err(err),
            _ => {
                info!(
                    written,
                    total = submissions.len(),
                    "synced submissions to spreadsheet"
                );
                Ok(())
            }
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> SubmissionSyncError {
    if error.is_builder() {
        SubmissionSyncError::encode(error.to_string())
    } else {
        SubmissionSyncError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SubmissionSyncError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    } else {
        preview
    };
    SubmissionSyncError::rejected(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for payload encoding and error mapping.
    //!
    //! Network tests target either a closed local port or a bridge stub bound
    //! to loopback, so they never leave the machine.

    use super::*;
    use std::net::TcpListener;
    use std::sync::Mutex;

    use actix_web::dev::ServerHandle;
    use actix_web::{App, HttpResponse, HttpServer, web};
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};
    use serde_json::Value;

    use crate::domain::{EmailAddress, NewSubmission, SubmissionFields};

    fn submission(id: i64) -> Submission {
        let new = NewSubmission {
            email: EmailAddress::new(format!("person{id}@example.com")).expect("valid email"),
            fields: SubmissionFields::new("Person", "1 Road", Some("555-0100"), None)
                .expect("valid fields"),
            status: SubmissionStatus::Pending,
            submitted_by_ip: None,
        };
        Submission::from_new(SubmissionId::new(id), new, DateTime::UNIX_EPOCH, Utc::now())
    }

    #[fixture]
    fn unreachable() -> SheetsWebhookSync {
        let endpoint = Url::parse("http://127.0.0.1:1/sheets").expect("valid url");
        SheetsWebhookSync::new(endpoint, SheetsTarget::default(), Duration::from_secs(2))
            .expect("client builds")
            .with_pace(Duration::ZERO)
    }

    fn encoded(sync: &SheetsWebhookSync, operation: SheetOperation) -> Value {
        serde_json::to_value(sync.request(operation)).expect("payload encodes")
    }

    type Received = web::Data<Mutex<Vec<Value>>>;

    /// Loopback bridge that records every payload and refuses row 2.
    struct Bridge {
        sync: SheetsWebhookSync,
        received: Received,
        handle: ServerHandle,
    }

    impl Bridge {
        fn received(&self) -> Vec<Value> {
            self.received.lock().expect("bridge log").clone()
        }

        fn row_ids(&self) -> Vec<String> {
            self.received()
                .iter()
                .filter_map(|payload| payload["row"]["ID"].as_str().map(str::to_owned))
                .collect()
        }

        async fn stop(self) {
            self.handle.stop(true).await;
        }
    }

    async fn bridge_endpoint(payload: web::Json<Value>, received: Received) -> HttpResponse {
        let payload = payload.into_inner();
        let refused = payload["row"]["ID"] == "2";
        received.lock().expect("bridge log").push(payload);
        if refused {
            HttpResponse::InternalServerError().body("sheet is locked")
        } else {
            HttpResponse::Ok().finish()
        }
    }

    fn spawn_bridge() -> Bridge {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("bound address");
        let received: Received = web::Data::new(Mutex::new(Vec::new()));

        let app_received = received.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_received.clone())
                .route("/sheets", web::post().to(bridge_endpoint))
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen on loopback")
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let endpoint = Url::parse(&format!("http://{addr}/sheets")).expect("valid url");
        let sync = SheetsWebhookSync::new(endpoint, SheetsTarget::default(), Duration::from_secs(5))
            .expect("client builds")
            .with_pace(Duration::ZERO);
        Bridge {
            sync,
            received,
            handle,
        }
    }

    #[rstest]
    fn append_payload_carries_target_and_row(unreachable: SheetsWebhookSync) {
        let value = encoded(
            &unreachable,
            SheetOperation::AppendRow {
                row: SheetRow::from(&submission(3)),
            },
        );

        assert_eq!(value["action"], "append_row");
        assert_eq!(value["spreadsheetId"], DEFAULT_SPREADSHEET_ID);
        assert_eq!(value["worksheetName"], "Sheet1");
        assert_eq!(value["row"]["ID"], "3");
        assert_eq!(value["row"]["Phone Number"], "555-0100");
        assert_eq!(value["row"]["Comments"], "");
    }

    #[rstest]
    fn status_payload_names_row_and_status(unreachable: SheetsWebhookSync) {
        let value = encoded(
            &unreachable,
            SheetOperation::UpdateStatus {
                id: "9".to_owned(),
                status: SubmissionStatus::Rejected.as_str().to_owned(),
            },
        );

        assert_eq!(value["action"], "update_status");
        assert_eq!(value["id"], "9");
        assert_eq!(value["status"], "REJECTED");
    }

    #[rstest]
    #[case(StatusCode::BAD_GATEWAY, b"".as_slice(), "Bad Gateway")]
    #[case(StatusCode::FORBIDDEN, b"  quota\n exceeded ".as_slice(), "quota exceeded")]
    fn maps_failure_statuses_to_rejected(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] expected: &str,
    ) {
        match map_status_error(status, body) {
            SubmissionSyncError::Rejected {
                status: code,
                message,
            } => {
                assert_eq!(code, status.as_u16());
                assert_eq!(message, expected);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn truncates_long_bodies() {
        let body = "x".repeat(200);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    #[tokio::test]
    async fn sync_all_of_nothing_succeeds(unreachable: SheetsWebhookSync) {
        unreachable
            .sync_all(&[])
            .await
            .expect("empty batch needs no requests");
    }

    #[rstest]
    #[tokio::test]
    async fn sync_all_fails_when_every_row_fails(unreachable: SheetsWebhookSync) {
        let err = unreachable
            .sync_all(&[submission(1), submission(2)])
            .await
            .expect_err("closed port rejects every row");
        assert!(matches!(err, SubmissionSyncError::Transport { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn mirror_create_reports_transport_failure(unreachable: SheetsWebhookSync) {
        let err = unreachable
            .mirror_create(&submission(1))
            .await
            .expect_err("closed port rejects the row");
        assert!(matches!(err, SubmissionSyncError::Transport { .. }));
    }

    #[actix_web::test]
    async fn accepted_row_is_posted_as_json() {
        let bridge = spawn_bridge();

        bridge
            .sync
            .mirror_create(&submission(1))
            .await
            .expect("bridge accepts row 1");

        let received = bridge.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["action"], "append_row");
        assert_eq!(received[0]["spreadsheetId"], DEFAULT_SPREADSHEET_ID);
        assert_eq!(received[0]["row"]["Email"], "person1@example.com");
        bridge.stop().await;
    }

    #[actix_web::test]
    async fn refused_row_surfaces_bridge_status_and_body() {
        let bridge = spawn_bridge();

        let err = bridge
            .sync
            .mirror_create(&submission(2))
            .await
            .expect_err("bridge refuses row 2");

        match err {
            SubmissionSyncError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "sheet is locked");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        bridge.stop().await;
    }

    #[actix_web::test]
    async fn status_change_is_posted_to_the_bridge() {
        let bridge = spawn_bridge();

        bridge
            .sync
            .mirror_status_change(SubmissionId::new(7), SubmissionStatus::Approved)
            .await
            .expect("bridge accepts status change");

        let received = bridge.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["action"], "update_status");
        assert_eq!(received[0]["id"], "7");
        assert_eq!(received[0]["status"], "APPROVED");
        bridge.stop().await;
    }

    #[actix_web::test]
    async fn sync_all_continues_past_a_refused_row() {
        let bridge = spawn_bridge();

        bridge
            .sync
            .sync_all(&[submission(1), submission(2), submission(3)])
            .await
            .expect("batch succeeds while any row lands");

        assert_eq!(bridge.row_ids(), ["1", "2", "3"]);
        bridge.stop().await;
    }

    #[actix_web::test]
    async fn sync_all_fails_when_the_bridge_refuses_every_row() {
        let bridge = spawn_bridge();

        let err = bridge
            .sync
            .sync_all(&[submission(2)])
            .await
            .expect_err("only row is refused");

        assert!(matches!(err, SubmissionSyncError::Rejected { status: 500, .. }));
        bridge.stop().await;
    }
}
