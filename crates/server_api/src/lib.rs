//! Request-independent logic behind the course page.
//!
//! The HTTP layer decides whether a request is a submission or a plain
//! fetch; everything after that decision lives here so it can be driven
//! without a router.

pub mod csrf;
pub mod forms;

use shared::{
    domain::{Course, NewCourse},
    error::ApiError,
    protocol::{CourseSubmission, FIELD_CSRF_TOKEN},
};
use storage::Storage;
use tracing::{debug, error, info};

use crate::{
    csrf::{issue_form_token, verify_form_token, FormTokenConfig},
    forms::{validate_course, FieldErrors},
};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub form_tokens: FormTokenConfig,
}

/// What the form shows: submitted values, their errors and a fresh token.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub nome: String,
    pub descricao: String,
    pub csrf_token: String,
    pub errors: FieldErrors,
}

impl FormState {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct IndexPage {
    pub form: FormState,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Persisted; the caller redirects to the listing.
    Created(Course),
    /// Validation failed; nothing was written.
    Rejected(IndexPage),
}

pub async fn list_courses(ctx: &ApiContext) -> Result<Vec<Course>, ApiError> {
    ctx.storage.list_courses_by_name().await.map_err(internal)
}

pub async fn create_course(ctx: &ApiContext, course: &NewCourse) -> Result<Course, ApiError> {
    let created = ctx.storage.insert_course(course).await.map_err(internal)?;
    info!(course_id = created.id.0, nome = %created.nome, "course created");
    Ok(created)
}

/// The plain-fetch page: empty form and every course in name order.
pub async fn index_page(ctx: &ApiContext) -> Result<IndexPage, ApiError> {
    render_with(ctx, FormState::default()).await
}

/// Handles one form post.
///
/// Field and token errors come back as [`SubmitOutcome::Rejected`]; only
/// storage failures and token minting failures are `Err`.
pub async fn submit_course(
    ctx: &ApiContext,
    submission: CourseSubmission,
) -> Result<SubmitOutcome, ApiError> {
    let mut errors = FieldErrors::new();
    if let Err(token_error) = verify_form_token(&ctx.form_tokens, &submission.csrf_token) {
        errors.push(FIELD_CSRF_TOKEN, token_error.to_string());
    }

    match validate_course(&submission) {
        Ok(course) if errors.is_empty() => {
            let created = create_course(ctx, &course).await?;
            return Ok(SubmitOutcome::Created(created));
        }
        Ok(_) => {}
        Err(field_errors) => errors.merge(field_errors),
    }

    debug!(fields = errors.len(), "course submission rejected");
    let form = FormState {
        nome: submission.nome,
        descricao: submission.descricao,
        csrf_token: String::new(),
        errors,
    };
    render_with(ctx, form).await.map(SubmitOutcome::Rejected)
}

async fn render_with(ctx: &ApiContext, mut form: FormState) -> Result<IndexPage, ApiError> {
    form.csrf_token = issue_form_token(&ctx.form_tokens).map_err(|e| {
        error!(error = %e, "failed to mint form token");
        ApiError::internal(format!("form token mint failed: {e}"))
    })?;
    let courses = list_courses(ctx).await?;
    Ok(IndexPage { form, courses })
}

fn internal(err: anyhow::Error) -> ApiError {
    let detail = format!("{err:#}");
    error!(error = %detail, "storage failure");
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
