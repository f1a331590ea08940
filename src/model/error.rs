use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(sqlx::Error),
    #[error("row violates a uniqueness constraint: {0}")]
    Conflict(String),
    #[error("access to this resource is forbidden")]
    Forbidden,
    #[error("status transition from {from} is not allowed")]
    InvalidTransition { from: String },
    #[error("amount does not fit in the amount column")]
    AmountOverflow,
    #[error("unknown status value: {0}")]
    UnknownStatus(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(value: sqlx::Error) -> Self {
        match value.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                Self::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            _ => Self::SqlxError(value),
        }
    }
}
