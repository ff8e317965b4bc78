pub mod extract;
pub mod links;
pub mod password;
pub mod token;

pub use extract::AuthUser;
pub use links::{LinkClaims, LinkPurpose, LinkSigner};
pub use token::{Claims, TokenService};

use crate::errors::AppError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing or malformed Authorization header")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("This link has already been used.")]
    LinkUsed,

    #[error("failed to issue token: {0}")]
    Issue(#[from] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Issue(e) => AppError::Internal(e.into()),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}
