use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use super::error_response;
use crate::assets::AssetStore;
use crate::cache::{CacheConfig, CacheData, keys};
use crate::config::AppConfig;
use crate::db::portfolio::PublishedCursor;
use crate::models::PageQuery;
use crate::models::portfolio::SearchFilters;
use crate::services::portfolios;
use crate::services::search::{self, SearchItem};

const DEFAULT_FEED_LIMIT: u64 = 20;
const MAX_FEED_LIMIT: u64 = 100;

/// `?limit=&cursor_created_at=&cursor_id=` for the feed.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u64>,
    pub cursor_created_at: Option<DateTime<Utc>>,
    pub cursor_id: Option<Uuid>,
}

impl FeedQuery {
    fn cursor(&self) -> Option<PublishedCursor> {
        match (self.cursor_created_at, self.cursor_id) {
            (Some(created_at), Some(id)) => Some(PublishedCursor { created_at, id }),
            _ => None,
        }
    }

    fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT)
    }
}

/// GET /api/published?name=&role=&from=&to=&page=: filtered, paged search items.
///
/// The unfiltered projection is cached; a backend failure yields an empty page.
pub async fn search_published(
    db: web::Data<DatabaseConnection>,
    assets: web::Data<AssetStore>,
    cache: web::Data<CacheData>,
    cache_config: web::Data<CacheConfig>,
    config: web::Data<AppConfig>,
    filters: web::Query<SearchFilters>,
    page: web::Query<PageQuery>,
) -> impl Responder {
    let cache_key = keys::published_listing();

    let items = match cache.get::<Vec<SearchItem>>(&cache_key).await {
        Ok(Some(cached)) => {
            tracing::debug!("Cache hit for {cache_key}");
            cached
        }
        Ok(None) | Err(_) => {
            match search::list_published_as_search_items(db.get_ref(), assets.get_ref()).await {
                Ok(items) => {
                    if let Err(e) = cache
                        .set(&cache_key, &items, Some(cache_config.published_ttl))
                        .await
                    {
                        tracing::warn!("Failed to cache published listing: {e}");
                    }
                    items
                }
                Err(e) => {
                    tracing::error!("Failed to list published portfolios: {e}");
                    Vec::new()
                }
            }
        }
    };

    let filtered = search::apply_filters(&filters, items);
    HttpResponse::Ok().json(search::paginate(
        &filtered,
        page.page(),
        config.search_page_size,
    ))
}

/// GET /api/published/feed: cursor-paged listing with filters applied in SQL.
pub async fn published_feed(
    db: web::Data<DatabaseConnection>,
    assets: web::Data<AssetStore>,
    filters: web::Query<SearchFilters>,
    query: web::Query<FeedQuery>,
) -> impl Responder {
    match search::published_feed(
        db.get_ref(),
        assets.get_ref(),
        &filters,
        query.limit(),
        query.cursor(),
    )
    .await
    {
        Ok(feed) => HttpResponse::Ok().json(feed),
        Err(e) => error_response(&e),
    }
}

/// GET /api/published/{id}: public preview; drafts are not visible here.
pub async fn get_published(
    db: web::Data<DatabaseConnection>,
    assets: web::Data<AssetStore>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match portfolios::get_published_preview(db.get_ref(), assets.get_ref(), path.into_inner()).await
    {
        Ok(preview) => HttpResponse::Ok().json(preview),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_query_needs_both_cursor_parts() {
        let query =
            web::Query::<FeedQuery>::from_query("cursor_created_at=2024-01-01T00:00:00Z").unwrap();
        assert!(query.cursor().is_none());
        assert_eq!(query.limit(), DEFAULT_FEED_LIMIT);

        let id = Uuid::new_v4();
        let query = web::Query::<FeedQuery>::from_query(&format!(
            "limit=500&cursor_created_at=2024-01-01T00:00:00Z&cursor_id={id}"
        ))
        .unwrap();
        assert_eq!(query.cursor().map(|c| c.id), Some(id));
        assert_eq!(query.limit(), MAX_FEED_LIMIT);
    }
}
