use actix_web::FromRequest;
use actix_web::{Error, HttpRequest, dev::Payload, web};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::AuthError;
use super::jwks::JwksCache;
use super::jwt::{self, Claims};
use crate::db::users::find_or_create_from_auth;
use crate::models::users::{self, CreateUserFromAuth};

/// Verifies bearer tokens, either against Supabase's JWKS or a shared secret.
#[derive(Clone)]
pub enum TokenVerifier {
    Jwks(Arc<JwksCache>),
    Secret(String),
}

impl TokenVerifier {
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        match self {
            TokenVerifier::Jwks(cache) => jwt::validate_token(token, cache).await,
            TokenVerifier::Secret(secret) => jwt::validate_token_with_secret(token, secret),
        }
    }
}

/// 401 body for a token that failed verification.
pub fn rejection_message(err: &AuthError) -> String {
    if err.is_expired() {
        "Token expired".to_string()
    } else {
        format!("Invalid token: {err}")
    }
}

/// The caller behind a verified bearer token. Its id is the owner id.
pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    actix_web::error::ErrorUnauthorized("Missing Authorization header")
                })?;

            let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
                actix_web::error::ErrorUnauthorized("Authorization header must be: Bearer <token>")
            })?;

            let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Token verifier not configured")
            })?;

            let claims = verifier
                .verify(token)
                .await
                .map_err(|e| actix_web::error::ErrorUnauthorized(rejection_message(&e)))?;

            let user_id = claims
                .user_id()
                .map_err(actix_web::error::ErrorUnauthorized)?;

            let email = claims
                .user_email()
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("No email in token claims"))?;

            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| {
                    actix_web::error::ErrorInternalServerError("Database not configured")
                })?;

            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email,
                    display_name: claims.display_name(),
                    avatar_url: claims.avatar_url(),
                    auth_provider: claims.auth_provider(),
                },
            )
            .await
            .map_err(|e| {
                tracing::error!("failed to load user {user_id}: {e}");
                actix_web::error::ErrorInternalServerError("Database error")
            })?;

            Ok(AuthenticatedUser(user))
        })
    }
}
