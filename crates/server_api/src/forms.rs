//! Field rules for the course form.
//!
//! Each field maps to an ordered list of [`Rule`]s. Rules run in order and a
//! failed [`Rule::Required`] stops the chain for that field, so an empty
//! description reports "required" and nothing about its length.

use std::collections::BTreeMap;

use shared::{
    domain::{NewCourse, MAX_DESCRIPTION_CHARS},
    protocol::{CourseSubmission, FIELD_DESCRICAO, FIELD_NOME},
};

const NOME_LABEL: &str = "Qual é o nome do curso?";
const DESCRICAO_LABEL: &str = "Descrição (250 caracteres)";
pub const SUBMIT_LABEL: &str = "Cadastrar";

pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Rejects empty and whitespace-only values.
    Required,
    /// Upper bound in characters, not bytes.
    MaxLength(usize),
}

impl Rule {
    fn check(self, value: &str) -> Result<(), String> {
        match self {
            Rule::Required if value.trim().is_empty() => Err(REQUIRED_MESSAGE.to_string()),
            Rule::Required => Ok(()),
            Rule::MaxLength(max) if value.chars().count() > max => Err(format!(
                "Field cannot be longer than {max} characters."
            )),
            Rule::MaxLength(_) => Ok(()),
        }
    }

    fn stops_chain(self) -> bool {
        matches!(self, Rule::Required)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub rules: &'static [Rule],
}

pub const COURSE_FIELDS: [FieldSpec; 2] = [
    FieldSpec {
        name: FIELD_NOME,
        label: NOME_LABEL,
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: FIELD_DESCRICAO,
        label: DESCRICAO_LABEL,
        rules: &[Rule::Required, Rule::MaxLength(MAX_DESCRIPTION_CHARS)],
    },
];

/// Label shown next to `field`, or the field name for unknown fields.
pub fn label_for(field: &'static str) -> &'static str {
    COURSE_FIELDS
        .iter()
        .find(|spec| spec.name == field)
        .map_or(field, |spec| spec.label)
}

/// Messages per field name, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }
}

fn check_field(spec: &FieldSpec, value: &str, errors: &mut FieldErrors) {
    for rule in spec.rules {
        if let Err(message) = rule.check(value) {
            errors.push(spec.name, message);
            if rule.stops_chain() {
                return;
            }
        }
    }
}

fn field_value<'a>(submission: &'a CourseSubmission, field: &str) -> &'a str {
    match field {
        FIELD_NOME => &submission.nome,
        FIELD_DESCRICAO => &submission.descricao,
        _ => "",
    }
}

/// Applies [`COURSE_FIELDS`] to a submission.
///
/// Accepted values are carried over untouched: no trimming, no case folding.
pub fn validate_course(submission: &CourseSubmission) -> Result<NewCourse, FieldErrors> {
    let mut errors = FieldErrors::new();
    for spec in &COURSE_FIELDS {
        check_field(spec, field_value(submission, spec.name), &mut errors);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewCourse {
        nome: submission.nome.clone(),
        descricao: submission.descricao.clone(),
    })
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
