use pagewright_common::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BindingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BindingResult<T> = Result<T, BindingError>;
