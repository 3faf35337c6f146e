//! Shared error types for the index build workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
