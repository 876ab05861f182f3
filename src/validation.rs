//! Helpers shared by the per-model `prepare` / `validate` pipeline.

use lazy_static::lazy_static;
use regex::Regex;

/// Operation a model is validated for. Each model decides which fields a
/// given action requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Create,
    Update,
    Login,
}

/// Describes the first invalid field of a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
        )
        .unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims surrounding whitespace and escapes HTML metacharacters.
pub(crate) fn sanitize(value: &str) -> String {
    escape_html(value.trim())
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn require_present(
    entity: &str,
    field: &str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(format!(
            "{entity} must have defined property '{field}'"
        )));
    }
    Ok(())
}

pub(crate) fn require_max_len(
    entity: &str,
    field: &str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(format!(
            "{entity} property '{field}' must be at most {max} characters"
        )));
    }
    Ok(())
}

pub(crate) fn invalid_value(entity: &str, field: &str) -> ValidationError {
    ValidationError::new(format!("{entity} has invalid value for property '{field}'"))
}
