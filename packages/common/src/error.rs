use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of problem found while validating input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    Missing,
    Invalid,
    Unknown,
}

/// A single validation finding, addressed by a dotted field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            kind: IssueKind::Missing,
            message: format!("required field `{}` is missing", field),
            field,
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Invalid,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Unknown,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Malformed or incomplete input.
///
/// Always carries every issue that was found, never just the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn single(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    /// Field paths of every issue, in discovery order
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed with {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

/// Accumulates issues so validators can report everything in one pass
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<ValidationIssue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// `Ok(value)` when nothing was collected, otherwise every issue at once
    pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}
