//! Server construction and middleware wiring.

mod config;

pub use config::ServerSettings;

use std::io;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::SubmissionService;
use crate::domain::ports::{SubmissionRepository, SubmissionSync};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::submissions;
use crate::outbound::memory::InMemorySubmissionRepository;
use crate::outbound::persistence::{
    DbPool, DieselSubmissionRepository, PoolConfig, run_pending_migrations,
};
use crate::outbound::sheets::{LoggingSubmissionSync, SheetsWebhookSync};

/// Build the HTTP application around prepared state.
///
/// Submission routes live under `/api/v1`; health probes sit at the root.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1").configure(submissions::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

async fn build_repository(
    settings: &ServerSettings,
    clock: Arc<dyn Clock>,
) -> io::Result<Arc<dyn SubmissionRepository>> {
    let Some(url) = settings.database_url() else {
        warn!("no database configured; submissions are kept in memory");
        return Ok(Arc::new(InMemorySubmissionRepository::new(clock)));
    };

    run_pending_migrations(url)
        .await
        .map_err(|err| io::Error::other(format!("database migration failed: {err}")))?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()))
        .await
        .map_err(|err| io::Error::other(format!("database pool setup failed: {err}")))?;
    info!(
        max_connections = settings.db_max_connections(),
        "using PostgreSQL submission store"
    );
    Ok(Arc::new(DieselSubmissionRepository::new(pool)))
}

fn build_sync(settings: &ServerSettings) -> io::Result<Arc<dyn SubmissionSync>> {
    let endpoint = settings
        .sheets_webhook_url()
        .map_err(|err| io::Error::other(format!("invalid spreadsheet webhook url: {err}")))?;
    let Some(endpoint) = endpoint else {
        info!("no spreadsheet webhook configured; mirror calls are logged only");
        return Ok(Arc::new(LoggingSubmissionSync));
    };

    let sync = SheetsWebhookSync::new(endpoint, settings.sheets_target(), settings.sheets_timeout())
        .map_err(|err| io::Error::other(format!("spreadsheet client setup failed: {err}")))?
        .with_pace(settings.sheets_pace());
    Ok(Arc::new(sync))
}

/// Assemble adapters and the submission service from settings.
///
/// # Errors
///
/// Returns [`io::Error`] when migrations, the pool, or the spreadsheet
/// client cannot be set up.
pub async fn build_http_state(
    settings: &ServerSettings,
    clock: Arc<dyn Clock>,
) -> io::Result<HttpState> {
    let repo = build_repository(settings, Arc::clone(&clock)).await?;
    let sync = build_sync(settings)?;
    let service =
        SubmissionService::new(repo, sync, clock).with_dispatch(settings.sync_dispatch());
    Ok(HttpState::from_service(Arc::new(service)))
}

/// Construct an Actix HTTP server from settings.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`io::Error`] when adapters cannot be built or binding fails.
pub async fn create_server(settings: ServerSettings) -> io::Result<Server> {
    let health_state = web::Data::new(HealthState::new());
    let http_state = web::Data::new(build_http_state(&settings, Arc::new(DefaultClock)).await?);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(settings.bind_addr())?
    .run();

    info!(bind_addr = settings.bind_addr(), "form intake server listening");
    health_state.mark_ready();
    Ok(server)
}
