//! Public listing of published portfolios.
//!
//! The full listing is projected once and filtered in memory; the feed
//! variant pushes the same filters into SQL and pages by cursor.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assets::{AssetRef, AssetStore};
use crate::db::portfolio::{self as portfolio_db, PublishedCursor};
use crate::error::PortfolioError;
use crate::models::portfolio::{self, SearchFilters, TemplateKind};
use crate::models::projects;

/// Summary of one published portfolio for public browsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub portfolio_id: Uuid,
    pub photo_url: Option<String>,
    pub full_name: String,
    pub role: String,
    pub project_creation_dates: Vec<DateTime<Utc>>,
    pub link: String,
    pub template_kind: TemplateKind,
}

/// One page of a sliced listing. Pages are 1-indexed.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// One chunk of the cursor-paged feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub items: Vec<SearchItem>,
    pub next_cursor: Option<PublishedCursor>,
}

/// Every published portfolio as a search item, newest first.
pub async fn list_published_as_search_items(
    db: &DatabaseConnection,
    assets: &AssetStore,
) -> Result<Vec<SearchItem>, PortfolioError> {
    let records = portfolio_db::get_published_portfolios(db).await?;
    project_records(db, assets, records).await
}

async fn project_records(
    db: &DatabaseConnection,
    assets: &AssetStore,
    records: Vec<portfolio::Model>,
) -> Result<Vec<SearchItem>, PortfolioError> {
    let ids = records.iter().map(|r| r.id).collect();
    let mut projects_by_portfolio = portfolio_db::get_projects_for_portfolios(db, ids).await?;

    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let photo_url = match record.profile_asset_ref {
            Some(path) => Some(assets.resolve(&AssetRef::new(path)).await?),
            None => None,
        };
        let projects = projects_by_portfolio.remove(&record.id).unwrap_or_default();

        items.push(SearchItem {
            portfolio_id: record.id,
            photo_url,
            full_name: record.full_name,
            role: record.role,
            project_creation_dates: creation_dates(&projects),
            link: record.public_link,
            template_kind: record.template_kind,
        });
    }
    Ok(items)
}

fn creation_dates(projects: &[projects::Model]) -> Vec<DateTime<Utc>> {
    projects.iter().filter_map(|p| p.creation_date).collect()
}

/// Whether an item passes every filter that is set.
///
/// Name and role are case-insensitive prefix matches. The date range is
/// inclusive on both ends and passes when any project date falls inside it.
pub fn matches(filters: &SearchFilters, item: &SearchItem) -> bool {
    if let Some(name) = filters.name_prefix() {
        if !item.full_name.to_lowercase().starts_with(&name) {
            return false;
        }
    }
    if let Some(role) = filters.role_prefix() {
        if !item.role.to_lowercase().starts_with(&role) {
            return false;
        }
    }
    if !filters.has_date_range() {
        return true;
    }

    item.project_creation_dates.iter().any(|date| {
        filters.from.is_none_or(|from| *date >= from) && filters.to.is_none_or(|to| *date <= to)
    })
}

/// Keep the items that match, preserving order.
pub fn apply_filters(filters: &SearchFilters, items: Vec<SearchItem>) -> Vec<SearchItem> {
    items.into_iter().filter(|i| matches(filters, i)).collect()
}

/// Slice one page out of `items`. Page 0 is treated as page 1; a page past
/// the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Cursor-paged published listing with filters evaluated by the database.
///
/// `next_cursor` is set when the page came back full.
pub async fn published_feed(
    db: &DatabaseConnection,
    assets: &AssetStore,
    filters: &SearchFilters,
    limit: u64,
    cursor: Option<PublishedCursor>,
) -> Result<FeedPage, PortfolioError> {
    let limit = limit.max(1);
    let records = portfolio_db::get_published_page(db, filters, limit, cursor).await?;

    let next_cursor = if records.len() as u64 == limit {
        records.last().map(PublishedCursor::from)
    } else {
        None
    };

    // `LIKE` treats `%` and `_` in the prefix as wildcards.
    let items = apply_filters(filters, project_records(db, assets, records).await?);

    Ok(FeedPage { items, next_cursor })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn item(full_name: &str, role: &str, dates: Vec<DateTime<Utc>>) -> SearchItem {
        SearchItem {
            portfolio_id: Uuid::new_v4(),
            photo_url: None,
            full_name: full_name.to_string(),
            role: role.to_string(),
            project_creation_dates: dates,
            link: String::new(),
            template_kind: TemplateKind::Second,
        }
    }

    #[test]
    fn name_filter_is_case_insensitive_prefix() {
        let items = vec![
            item("Alice Smith", "Designer", vec![]),
            item("Bob Alden", "Engineer", vec![]),
        ];
        let filters = SearchFilters {
            name: Some("al".to_string()),
            ..Default::default()
        };

        let result = apply_filters(&filters, items);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].full_name, "Alice Smith");
    }

    #[test]
    fn name_prefix_keeps_trailing_space() {
        let items = vec![item("Alfred", "Designer", vec![]), item("Al Green", "Singer", vec![])];
        let filters = SearchFilters {
            name: Some("al ".to_string()),
            ..Default::default()
        };

        let result = apply_filters(&filters, items);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].full_name, "Al Green");
    }

    #[test]
    fn name_match_is_dropped_when_dates_fall_outside_range() {
        let items = vec![
            item("Alice Smith", "Designer", vec![date(2019, 3, 1)]),
            item("Alan Turing", "Engineer", vec![date(2021, 6, 1)]),
            item("Bob Alden", "Engineer", vec![date(2021, 6, 1)]),
        ];
        let filters = SearchFilters {
            name: Some("al".to_string()),
            from: Some(date(2020, 1, 1)),
            to: Some(date(2022, 1, 1)),
            ..Default::default()
        };

        let result = apply_filters(&filters, items);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].full_name, "Alan Turing");
    }

    #[test]
    fn role_filter_ignores_blank_input() {
        let items = vec![item("Alice", "Designer", vec![])];
        let filters = SearchFilters {
            role: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&filters, items).len(), 1);
    }

    #[test]
    fn date_range_excludes_items_outside_it() {
        let inside = item("Alice", "Designer", vec![date(2021, 6, 1), date(2024, 1, 1)]);
        let outside = item("Bob", "Engineer", vec![date(2019, 3, 1)]);
        let filters = SearchFilters {
            from: Some(date(2020, 1, 1)),
            to: Some(date(2022, 1, 1)),
            ..Default::default()
        };

        assert!(matches(&filters, &inside));
        assert!(!matches(&filters, &outside));
    }

    #[test]
    fn date_range_bounds_are_inclusive_and_one_sided() {
        let on_bound = item("Alice", "Designer", vec![date(2020, 1, 1)]);

        let from_only = SearchFilters {
            from: Some(date(2020, 1, 1)),
            ..Default::default()
        };
        let to_only = SearchFilters {
            to: Some(date(2020, 1, 1)),
            ..Default::default()
        };
        assert!(matches(&from_only, &on_bound));
        assert!(matches(&to_only, &on_bound));
    }

    #[test]
    fn date_range_rejects_items_without_dates() {
        let undated = item("Alice", "Designer", vec![]);
        let filters = SearchFilters {
            from: Some(date(2020, 1, 1)),
            ..Default::default()
        };
        assert!(!matches(&filters, &undated));
        assert!(matches(&SearchFilters::default(), &undated));
    }

    #[test]
    fn paginate_slices_fixed_size_pages() {
        let items: Vec<u32> = (1..=8).collect();

        let first = paginate(&items, 1, 6);
        assert_eq!(first.items, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(first.total_pages, 2);

        let second = paginate(&items, 2, 6);
        assert_eq!(second.items, vec![7, 8]);
        assert_eq!(second.total_items, 8);
    }

    #[test]
    fn paginate_clamps_page_numbers() {
        let items: Vec<u32> = (1..=3).collect();
        assert_eq!(paginate(&items, 0, 2).items, vec![1, 2]);
        assert!(paginate(&items, 5, 2).items.is_empty());
    }
}
