use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::models::users::MeResponse;
use crate::services::portfolios;

/// GET /api/auth/me: the authenticated user and whether they have saved a portfolio yet.
pub async fn me(user: AuthenticatedUser, db: web::Data<DatabaseConnection>) -> impl Responder {
    let has_portfolios = portfolios::owner_has_portfolios(db.get_ref(), user.0.id).await;
    HttpResponse::Ok().json(MeResponse::new(user.0, has_portfolios))
}
