pub mod assets;
pub mod auth;
pub mod portfolio;
pub mod published;

use actix_web::{HttpResponse, web};

use crate::error::{PersistenceError, PortfolioError};
use crate::storage::StorageError;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Owner routes (all protected: require valid JWT) ──
    cfg.service(
        web::resource("/portfolios")
            .route(web::get().to(portfolio::list_portfolios))
            .route(web::post().to(portfolio::create_portfolio)),
    );
    cfg.service(
        web::resource("/portfolios/{id}")
            .route(web::get().to(portfolio::get_portfolio_for_edit))
            .route(web::put().to(portfolio::update_portfolio))
            .route(web::delete().to(portfolio::delete_portfolio)),
    );
    cfg.service(
        web::scope("/portfolios/{id}")
            .route("/name", web::patch().to(portfolio::rename_portfolio))
            .route("/preview", web::get().to(portfolio::preview_portfolio))
            .route("/publish", web::post().to(portfolio::publish_portfolio)),
    );

    // ── Public routes ──
    cfg.service(
        web::scope("/published")
            .route("", web::get().to(published::search_published))
            .route("/feed", web::get().to(published::published_feed))
            .route("/{id}", web::get().to(published::get_published)),
    );
    cfg.service(
        web::resource("/assets/{path:.*}").route(web::get().to(assets::serve_asset)),
    );
}

/// Map a failed portfolio operation onto an HTTP response.
pub(crate) fn error_response(err: &PortfolioError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        PortfolioError::Validation(_) => HttpResponse::BadRequest().json(body),
        PortfolioError::MissingOwner => HttpResponse::Unauthorized().json(body),
        PortfolioError::NotFound(_) => HttpResponse::NotFound().json(body),
        PortfolioError::Forbidden(_) => HttpResponse::Forbidden().json(body),
        PortfolioError::TemplateMismatch { .. } => HttpResponse::Conflict().json(body),
        PortfolioError::Persistence(PersistenceError::Storage(
            StorageError::SizeLimitExceeded { .. },
        )) => HttpResponse::PayloadTooLarge().json(body),
        PortfolioError::Persistence(_) | PortfolioError::AssetResolution(_) => {
            tracing::error!("portfolio operation failed: {err}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error",
            }))
        }
    }
}
