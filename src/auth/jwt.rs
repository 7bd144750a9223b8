use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use super::jwks::JwksCache;

/// Supabase JWT claims.
///
/// The `sub` field is the user's UUID in `auth.users` and becomes the
/// owner id of every portfolio the user saves. `user_metadata` carries
/// profile info from the OAuth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    /// Supabase role (e.g. "authenticated").
    pub role: Option<String>,
    pub user_metadata: Option<UserMetadata>,
    pub app_metadata: Option<AppMetadata>,
}

/// Metadata Supabase sets itself; `provider` names the sign-in method.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppMetadata {
    pub provider: Option<String>,
}

/// Metadata populated by the OAuth provider (Google).
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
}

impl Claims {
    /// The user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::InvalidSubject(e.to_string()))
    }

    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.full_name.clone().or_else(|| m.name.clone()))
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.avatar_url.clone().or_else(|| m.picture.clone()))
    }

    /// Sign-in provider from `app_metadata`, `"email"` when absent.
    pub fn auth_provider(&self) -> String {
        self.app_metadata
            .as_ref()
            .and_then(|m| m.provider.clone())
            .unwrap_or_else(|| "email".to_string())
    }

    /// Prefer the top-level email, fall back to metadata.
    pub fn user_email(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.email.clone()))
    }
}

/// Validate a token against the project's published signing keys.
pub async fn validate_token(token: &str, jwks_cache: &JwksCache) -> Result<Claims, AuthError> {
    jwks_cache.validate_token(token).await.map(|td| td.claims)
}

/// Validate an HS256 token signed with a shared secret.
pub fn validate_token_with_secret(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
