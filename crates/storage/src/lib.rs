use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{Course, CourseId, NewCourse};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = pool_options_for(database_url)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply migrations")?;
        debug!(%database_url, "storage ready");
        Ok(Self { pool })
    }

    /// Raw pool for ad hoc queries and for closing the store in tests.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Writes one course and returns it with its generated id.
    ///
    /// The statement runs in its own implicit transaction, so the row is
    /// either committed with both fields or not written at all.
    pub async fn insert_course(&self, course: &NewCourse) -> Result<Course> {
        let row = sqlx::query(
            "INSERT INTO cursos (nome, descricao) VALUES (?, ?)
             RETURNING id, nome, descricao",
        )
        .bind(&course.nome)
        .bind(&course.descricao)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert course")?;
        Ok(course_from_row(&row))
    }

    /// Every stored course, `nome` ascending under SQLite's binary collation.
    pub async fn list_courses_by_name(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query(
            "SELECT id, nome, descricao
             FROM cursos
             ORDER BY nome ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list courses")?;
        Ok(rows.iter().map(course_from_row).collect())
    }

    pub async fn load_course(&self, course_id: CourseId) -> Result<Option<Course>> {
        let row = sqlx::query("SELECT id, nome, descricao FROM cursos WHERE id = ?")
            .bind(course_id.0)
            .fetch_optional(&self.pool)
            .await
            .context("failed to load course")?;
        Ok(row.as_ref().map(course_from_row))
    }

    pub async fn count_courses(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cursos")
            .fetch_one(&self.pool)
            .await
            .context("failed to count courses")?;
        Ok(count)
    }
}

fn course_from_row(row: &SqliteRow) -> Course {
    Course {
        id: CourseId(row.get::<i64, _>("id")),
        nome: row.get::<String, _>("nome"),
        descricao: row.get::<String, _>("descricao"),
    }
}

// Every in-memory connection is its own database, so keep exactly one alive.
fn pool_options_for(database_url: &str) -> SqlitePoolOptions {
    if database_url.starts_with("sqlite::memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
