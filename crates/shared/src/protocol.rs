use serde::{Deserialize, Serialize};

use crate::domain::Course;

pub const FIELD_NOME: &str = "nome";
pub const FIELD_DESCRICAO: &str = "descricao";
pub const FIELD_CSRF_TOKEN: &str = "csrf_token";

/// Body of `POST /` as sent by the course form.
///
/// Fields the browser leaves out decode as empty strings so that the
/// validator, not the extractor, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSubmission {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub descricao: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Listing entry printed by the admin tool in `--json` mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: i64,
    pub nome: String,
    pub descricao: String,
}

impl From<Course> for CourseSummary {
    fn from(course: Course) -> Self {
        Self {
            id: course.id.0,
            nome: course.nome,
            descricao: course.descricao,
        }
    }
}
