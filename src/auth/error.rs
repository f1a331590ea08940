use thiserror::Error;

pub type CryptResult<T> = std::result::Result<T, CryptError>;

#[derive(Debug, Error)]
pub enum CryptError {
    #[error("argon2 error: {0}")]
    Argon2Error(argon2::password_hash::Error),
    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<argon2::password_hash::Error> for CryptError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::Argon2Error(value)
    }
}
