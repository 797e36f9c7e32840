use super::*;
use shared::{
    error::ErrorCode,
    protocol::{FIELD_DESCRICAO, FIELD_NOME},
};

async fn setup() -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    ApiContext {
        storage,
        form_tokens: FormTokenConfig::new("test secret"),
    }
}

fn submission(ctx: &ApiContext, nome: &str, descricao: &str) -> CourseSubmission {
    CourseSubmission {
        nome: nome.to_string(),
        descricao: descricao.to_string(),
        csrf_token: issue_form_token(&ctx.form_tokens).expect("token"),
    }
}

#[tokio::test]
async fn valid_submission_creates_course() {
    let ctx = setup().await;
    let outcome = submit_course(&ctx, submission(&ctx, "Math", "Intro to math"))
        .await
        .expect("submit");
    let SubmitOutcome::Created(course) = outcome else {
        panic!("expected created outcome");
    };
    assert_eq!(course.nome, "Math");

    let page = index_page(&ctx).await.expect("page");
    assert_eq!(page.courses, vec![course]);
    assert!(!page.form.has_errors());
    assert!(page.form.nome.is_empty());
}

#[tokio::test]
async fn blank_name_is_rejected_without_writing() {
    let ctx = setup().await;
    let outcome = submit_course(&ctx, submission(&ctx, "", "x"))
        .await
        .expect("submit");
    let SubmitOutcome::Rejected(page) = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(page.form.errors.get(FIELD_NOME), [forms::REQUIRED_MESSAGE]);
    assert_eq!(page.form.descricao, "x");
    assert!(page.courses.is_empty());
    assert_eq!(ctx.storage.count_courses().await.expect("count"), 0);
}

#[tokio::test]
async fn long_description_is_rejected_and_echoed() {
    let ctx = setup().await;
    let descricao = "d".repeat(251);
    let outcome = submit_course(&ctx, submission(&ctx, "Math", &descricao))
        .await
        .expect("submit");
    let SubmitOutcome::Rejected(page) = outcome else {
        panic!("expected rejection");
    };
    assert!(page.form.errors.contains(FIELD_DESCRICAO));
    assert_eq!(page.form.nome, "Math");
    assert_eq!(page.form.descricao, descricao);
    assert_eq!(ctx.storage.count_courses().await.expect("count"), 0);
}

#[tokio::test]
async fn missing_token_is_rejected_even_with_valid_fields() {
    let ctx = setup().await;
    let mut input = submission(&ctx, "Math", "Intro");
    input.csrf_token.clear();
    let outcome = submit_course(&ctx, input).await.expect("submit");
    let SubmitOutcome::Rejected(page) = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(
        page.form.errors.get(FIELD_CSRF_TOKEN),
        ["The CSRF token is missing."]
    );
    assert_eq!(ctx.storage.count_courses().await.expect("count"), 0);
}

#[tokio::test]
async fn rejected_page_carries_fresh_token() {
    let ctx = setup().await;
    let outcome = submit_course(&ctx, submission(&ctx, "", ""))
        .await
        .expect("submit");
    let SubmitOutcome::Rejected(page) = outcome else {
        panic!("expected rejection");
    };
    assert!(verify_form_token(&ctx.form_tokens, &page.form.csrf_token).is_ok());
}

#[tokio::test]
async fn rejected_page_still_lists_existing_courses() {
    let ctx = setup().await;
    for nome in ["Physics", "Art"] {
        submit_course(&ctx, submission(&ctx, nome, "desc"))
            .await
            .expect("submit");
    }
    let outcome = submit_course(&ctx, submission(&ctx, "", "desc"))
        .await
        .expect("submit");
    let SubmitOutcome::Rejected(page) = outcome else {
        panic!("expected rejection");
    };
    let names: Vec<_> = page.courses.iter().map(|c| c.nome.as_str()).collect();
    assert_eq!(names, ["Art", "Physics"]);
}

#[tokio::test]
async fn index_page_never_writes() {
    let ctx = setup().await;
    submit_course(&ctx, submission(&ctx, "Math", "Intro"))
        .await
        .expect("submit");
    for _ in 0..3 {
        index_page(&ctx).await.expect("page");
    }
    assert_eq!(ctx.storage.count_courses().await.expect("count"), 1);
}

#[tokio::test]
async fn storage_failure_is_internal_error() {
    let ctx = setup().await;
    ctx.storage.pool().close().await;

    let err = index_page(&ctx).await.expect_err("closed pool");
    assert_eq!(err.code, ErrorCode::Internal);

    let err = submit_course(&ctx, submission(&ctx, "Math", "Intro"))
        .await
        .expect_err("closed pool");
    assert_eq!(err.code, ErrorCode::Internal);
}
