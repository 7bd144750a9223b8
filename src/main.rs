use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use portfo_backend::assets::AssetStore;
use portfo_backend::auth::jwks::JwksCache;
use portfo_backend::auth::middleware::TokenVerifier;
use portfo_backend::cache::{CacheConfig, RedisCache};
use portfo_backend::config::{AppConfig, AuthConfig};
use portfo_backend::create_pool;
use portfo_backend::handlers;
use portfo_backend::storage::filesystem::FilesystemBlobStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Room for a full form with several base64-encoded photos.
const JSON_BODY_FACTOR: u64 = 8;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db = create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    let db_data = web::Data::new(db);

    // Initialize Redis cache
    let redis_cache = RedisCache::new(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");
    let redis_data = web::Data::new(Arc::new(redis_cache));
    let cache_config = web::Data::new(CacheConfig::from_env());
    tracing::info!("Connected to Redis");

    let verifier = match &config.auth {
        AuthConfig::Supabase {
            project_ref,
            anon_key,
        } => {
            tracing::info!("Verifying tokens against Supabase project {project_ref}");
            TokenVerifier::Jwks(Arc::new(JwksCache::new(project_ref, anon_key)))
        }
        AuthConfig::Secret(secret) => {
            tracing::info!("Verifying tokens with the shared HS256 secret");
            TokenVerifier::Secret(secret.clone())
        }
    };
    let verifier = web::Data::new(verifier);

    let blobs = FilesystemBlobStore::new(config.assets_dir.clone(), config.max_asset_bytes)
        .await
        .expect("Failed to open asset directory");
    let assets = web::Data::new(AssetStore::new(
        Arc::new(blobs),
        config.assets_public_url.clone(),
    ));
    tracing::info!("Serving assets from {}", config.assets_dir.display());

    let json_limit = usize::try_from(config.max_asset_bytes.saturating_mul(JSON_BODY_FACTOR))
        .unwrap_or(usize::MAX);
    let bind_addr = config.bind_addr();
    let config_data = web::Data::new(config);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(db_data.clone())
            .app_data(redis_data.clone())
            .app_data(cache_config.clone())
            .app_data(verifier.clone())
            .app_data(assets.clone())
            .app_data(config_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
