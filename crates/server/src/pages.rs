use std::any::Any;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use server_api::{
    forms::{label_for, SUBMIT_LABEL},
    FormState, IndexPage,
};
use shared::{
    domain::{Course, MAX_DESCRIPTION_CHARS},
    error::{ApiError, ErrorCode},
    protocol::{FIELD_DESCRICAO, FIELD_NOME},
};
use tracing::{error, warn};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    form: &'a FormState,
    courses: &'a [Course],
    nome_label: &'a str,
    descricao_label: &'a str,
    submit_label: &'a str,
    description_max: usize,
}

#[derive(Template)]
#[template(path = "404.html")]
struct NotFoundTemplate;

#[derive(Template)]
#[template(path = "413.html")]
struct PayloadTooLargeTemplate;

#[derive(Template)]
#[template(path = "500.html")]
struct ServerErrorTemplate;

const FALLBACK_NOT_FOUND: &str = "<h1>Not Found</h1>";
const FALLBACK_PAYLOAD_TOO_LARGE: &str = "<h1>Payload Too Large</h1>";
const FALLBACK_SERVER_ERROR: &str = "<h1>Internal Server Error</h1>";

pub(crate) fn render_index(page: &IndexPage) -> Result<Html<String>, PageError> {
    let template = IndexTemplate {
        form: &page.form,
        courses: &page.courses,
        nome_label: label_for(FIELD_NOME),
        descricao_label: label_for(FIELD_DESCRICAO),
        submit_label: SUBMIT_LABEL,
        description_max: MAX_DESCRIPTION_CHARS,
    };
    template
        .render()
        .map(Html)
        .map_err(|e| PageError(ApiError::internal(format!("index template failed: {e}"))))
}

fn not_found_page() -> Response {
    let body = NotFoundTemplate.render().unwrap_or_else(|e| {
        error!(error = %e, "404 template failed");
        FALLBACK_NOT_FOUND.to_string()
    });
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

fn payload_too_large_page() -> Response {
    let body = PayloadTooLargeTemplate.render().unwrap_or_else(|e| {
        error!(error = %e, "413 template failed");
        FALLBACK_PAYLOAD_TOO_LARGE.to_string()
    });
    (StatusCode::PAYLOAD_TOO_LARGE, Html(body)).into_response()
}

fn server_error_page() -> Response {
    let body = ServerErrorTemplate.render().unwrap_or_else(|e| {
        error!(error = %e, "500 template failed");
        FALLBACK_SERVER_ERROR.to_string()
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
}

/// Handler panics land here via `CatchPanicLayer`.
pub(crate) fn panic_page(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(%detail, "handler panicked");
    server_error_page()
}

/// Failure that escaped the page controller; rendered as a static error page.
#[derive(Debug)]
pub(crate) struct PageError(pub(crate) ApiError);

impl From<ApiError> for PageError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self.0.code {
            ErrorCode::NotFound => not_found_page(),
            ErrorCode::PayloadTooLarge => {
                warn!(error = %self.0, "request body refused");
                payload_too_large_page()
            }
            ErrorCode::Internal => {
                error!(error = %self.0, "request failed");
                server_error_page()
            }
        }
    }
}
