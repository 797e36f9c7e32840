use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(CourseId);

/// Upper bound on `descricao`, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 250;

/// A course row as persisted in `cursos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub nome: String,
    pub descricao: String,
}

/// A course that passed validation and has not been written yet.
///
/// Only the form validator constructs one outside of tests, so every value
/// that reaches the store already satisfies the field rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub nome: String,
    pub descricao: String,
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Curso {:?}>", self.nome)
    }
}
