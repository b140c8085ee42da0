use std::fmt;
use thiserror::Error;

/// An instance whose component has no captured source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSource {
    pub instance_id: String,
    pub registry_id: String,
}

impl fmt::Display for MissingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.instance_id, self.registry_id)
    }
}

/// Problem found while assembling a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportProblem {
    UnknownToken {
        token: String,
        path: String,
    },
    UnresolvedBinding {
        instance_id: String,
        field_slug: String,
        reason: String,
    },
}

impl fmt::Display for ExportProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportProblem::UnknownToken { token, path } => {
                write!(f, "{}: unknown token {}", path, token)
            }
            ExportProblem::UnresolvedBinding {
                instance_id,
                field_slug,
                reason,
            } => write!(f, "{}: cannot bind {}: {}", instance_id, field_slug, reason),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn also(problems: &[ExportProblem]) -> String {
    if problems.is_empty() {
        String::new()
    } else {
        format!("; {} other problem(s): {}", problems.len(), join(problems))
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    /// Instances without a source, along with every other problem found in
    /// the same run
    #[error("Missing source for {}{}", join(missing), also(problems))]
    MissingSource {
        missing: Vec<MissingSource>,
        problems: Vec<ExportProblem>,
    },

    #[error("Export failed with {} problem(s): {}", .0.len(), join(.0))]
    Problems(Vec<ExportProblem>),

    #[error("Export cancelled")]
    Cancelled,

    #[error("Nothing to export: no pages")]
    NoPages,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SourceIndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Indexing task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deployment rejected: {0}")]
    Rejected(String),
}
