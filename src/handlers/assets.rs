use actix_web::{HttpResponse, Responder, http::header, web};

use crate::assets::{AssetRef, AssetStore};
use crate::storage::StorageError;

/// GET /api/assets/{path}: raw bytes of a stored asset.
///
/// Paths are content-addressed, so responses never change and may be cached forever.
pub async fn serve_asset(assets: web::Data<AssetStore>, path: web::Path<String>) -> impl Responder {
    let asset_ref = AssetRef::new(path.into_inner());

    match assets.fetch(&asset_ref).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(asset_ref.as_str()).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.essence_str())
                .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
                .body(bytes)
        }
        Err(StorageError::NotFound(_)) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Asset {asset_ref} not found"),
        })),
        Err(StorageError::InvalidPath(_)) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Invalid asset path: {asset_ref}"),
        })),
        Err(e) => {
            tracing::error!(asset = %asset_ref, "failed to read asset: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to read asset",
            }))
        }
    }
}
