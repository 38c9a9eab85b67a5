use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MintError {
    #[error("Note not found: {0}")]
    NoteNotFound(PathBuf),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Note metadata could not be parsed: {0}")]
    FailedMetadata(PathBuf),

    #[error("Change rejected: {0}")]
    ConflictingChange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, MintError>;
