use thiserror::Error;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("blob request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("blob store answered HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}
