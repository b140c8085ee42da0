use crate::collection::Collection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Record {id} already exists in {collection}")]
    DuplicateId { collection: Collection, id: String },

    #[error("Record added to {0} has no string `id`")]
    MissingId(Collection),

    #[error("Write attempted inside a read-only transaction")]
    ReadOnly,

    #[error("Collection {0} is not part of the current transaction")]
    OutOfScope(Collection),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
