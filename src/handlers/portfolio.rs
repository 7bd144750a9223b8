use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::error_response;
use crate::assets::AssetStore;
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{self, CacheData};
use crate::models::portfolio::{PublishResponse, RenamePortfolio};
use crate::services::{portfolios, publication};
use crate::templates::TemplateForm;

/// GET /api/portfolios: the caller's own portfolios.
pub async fn list_portfolios(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    assets: web::Data<AssetStore>,
) -> impl Responder {
    let items = portfolios::list_by_owner(db.get_ref(), assets.get_ref(), user.0.id).await;
    HttpResponse::Ok().json(items)
}

/// POST /api/portfolios: save a new draft from form state.
pub async fn create_portfolio(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    assets: web::Data<AssetStore>,
    body: web::Json<TemplateForm>,
) -> impl Responder {
    match portfolios::create_portfolio(db.get_ref(), assets.get_ref(), user.0.id, body.into_inner())
        .await
    {
        Ok(record) => HttpResponse::Created().json(record),
        Err(e) => error_response(&e),
    }
}

/// GET /api/portfolios/{id}: form state for the editor.
pub async fn get_portfolio_for_edit(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match portfolios::load_for_edit(db.get_ref(), user.0.id, path.into_inner()).await {
        Ok(form) => HttpResponse::Ok().json(form),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/portfolios/{id}: replace the content of an existing portfolio.
pub async fn update_portfolio(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    assets: web::Data<AssetStore>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<TemplateForm>,
) -> impl Responder {
    let id = path.into_inner();
    match portfolios::update_portfolio(
        db.get_ref(),
        assets.get_ref(),
        user.0.id,
        id,
        body.into_inner(),
    )
    .await
    {
        Ok(record) => {
            cache::invalidate_published(cache.get_ref()).await;
            HttpResponse::Ok().json(record)
        }
        Err(e) => error_response(&e),
    }
}

/// PATCH /api/portfolios/{id}/name
pub async fn rename_portfolio(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<RenamePortfolio>,
) -> impl Responder {
    let id = path.into_inner();
    match portfolios::rename_portfolio(db.get_ref(), user.0.id, id, body.into_inner().name).await
    {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/portfolios/{id}
pub async fn delete_portfolio(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match portfolios::delete_portfolio(db.get_ref(), user.0.id, path.into_inner()).await {
        Ok(()) => {
            cache::invalidate_published(cache.get_ref()).await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/portfolios/{id}/preview: render model for the owner, drafts included.
pub async fn preview_portfolio(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    assets: web::Data<AssetStore>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match portfolios::get_owned_preview(
        db.get_ref(),
        assets.get_ref(),
        user.0.id,
        path.into_inner(),
    )
    .await
    {
        Ok(preview) => HttpResponse::Ok().json(preview),
        Err(e) => error_response(&e),
    }
}

/// POST /api/portfolios/{id}/publish
pub async fn publish_portfolio(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    match publication::publish(db.get_ref(), user.0.id, id).await {
        Ok(link) => {
            cache::invalidate_published(cache.get_ref()).await;
            HttpResponse::Ok().json(PublishResponse { id, link })
        }
        Err(e) => error_response(&e),
    }
}
