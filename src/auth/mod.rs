pub mod jwks;
pub mod jwt;
pub mod middleware;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to fetch JWKS: {0}")]
    JwksFetch(String),

    #[error("No 'kid' in token header")]
    MissingKid,

    #[error("Key with kid={0} not found in JWKS")]
    UnknownKey(String),

    #[error("Malformed JWK: {0}")]
    MalformedKey(String),

    #[error("Token validation failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid UUID in sub claim: {0}")]
    InvalidSubject(String),
}

impl AuthError {
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            AuthError::Token(e) if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature)
        )
    }
}
