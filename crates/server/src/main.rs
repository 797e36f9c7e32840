use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::FormRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use server_api::{
    csrf::FormTokenConfig, index_page, submit_course, ApiContext, SubmitOutcome,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::CourseSubmission,
};
use storage::Storage;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod pages;

use config::{load_settings, prepare_database_url};
use pages::{panic_page, render_index, PageError};

const MAX_FORM_BYTES: usize = 16 * 1024;

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    if settings.uses_default_secret() {
        warn!("using the built-in secret key; set SECRET_KEY before exposing the server");
    }
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        let detail = format!("{error:#}");
        error!(
            %database_url,
            error = %detail,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext {
        storage,
        form_tokens: FormTokenConfig::new(settings.secret_key),
    };

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .layer(CatchPanicLayer::custom(panic_page))
        .layer(TraceLayer::new_for_http())
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let page = index_page(&state.api).await?;
    render_index(&page)
}

async fn submit(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CourseSubmission>, FormRejection>,
) -> Result<Response, PageError> {
    let submission = submission_from(form)?;
    match submit_course(&state.api, submission).await? {
        SubmitOutcome::Created(_) => Ok(Redirect::to("/").into_response()),
        SubmitOutcome::Rejected(page) => Ok(render_index(&page)?.into_response()),
    }
}

/// A body that does not decode is validated as an empty form, so the user
/// gets the page back with field errors. Oversized bodies are refused.
fn submission_from(
    form: Result<Form<CourseSubmission>, FormRejection>,
) -> Result<CourseSubmission, PageError> {
    match form {
        Ok(Form(submission)) => Ok(submission),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => Err(
            ApiError::new(ErrorCode::PayloadTooLarge, rejection.body_text()).into(),
        ),
        Err(rejection) => {
            debug!(%rejection, "undecodable course form, validating as empty");
            Ok(CourseSubmission::default())
        }
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, PageError> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| PageError::from(ApiError::internal(e.to_string())))?;
    Ok("ok")
}

async fn not_found() -> PageError {
    ApiError::not_found("no route").into()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
