use serde::Serialize;
use thiserror::Error;

use crate::validation::FieldKind;

/// What was wrong with a single inbound field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    Missing,
    WrongType { expected: FieldKind },
    Malformed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub problem: Problem,
}

impl FieldIssue {
    pub fn missing(field: &str) -> Self {
        Self { field: field.to_owned(), problem: Problem::Missing }
    }

    pub fn wrong_type(field: &str, expected: FieldKind) -> Self {
        Self { field: field.to_owned(), problem: Problem::WrongType { expected } }
    }

    pub fn malformed(field: &str, reason: impl Into<String>) -> Self {
        Self { field: field.to_owned(), problem: Problem::Malformed { reason: reason.into() } }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.problem {
            Problem::Missing => write!(f, "{}: field required", self.field),
            Problem::WrongType { expected } => write!(f, "{}: expected {}", self.field, expected),
            Problem::Malformed { reason } => write!(f, "{}: {}", self.field, reason),
        }
    }
}

/// An inbound record failed validation. Every offending field is listed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid record: {}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// The document as a whole was unusable (not an object, undecodable).
    pub fn body(reason: impl Into<String>) -> Self {
        Self { issues: vec![FieldIssue::malformed("body", reason)] }
    }

    pub fn has_issue_for(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
