//! Integration tests for publishing and the public listing.
//!
//! Run with: `cargo test --test publication_test`
mod common;

use std::time::Duration;

use chrono::{TimeZone, Utc};
use sea_orm::DbErr;
use uuid::Uuid;

use portfo_backend::db::portfolio as portfolio_db;
use portfo_backend::error::PortfolioError;
use portfo_backend::models::portfolio::{PortfolioStatus, SearchFilters, TemplateKind};
use portfo_backend::services::{portfolios, publication, search};
use portfo_backend::templates::{TemplateForm, TemplatePreview};

use common::{TestContext, create_user, first_form, second_form, second_project, setup};

async fn create_second(ctx: &TestContext, owner: Uuid, full_name: &str, role: &str) -> Uuid {
    let record = portfolios::create_portfolio(
        &ctx.db,
        &ctx.assets,
        owner,
        TemplateForm::Second(second_form(full_name, role)),
    )
    .await
    .unwrap();
    // Keep creation timestamps strictly ordered.
    tokio::time::sleep(Duration::from_millis(5)).await;
    record.id
}

#[tokio::test]
async fn test_publish_sets_status_and_template_link() {
    let ctx = setup().await;
    let owner = create_user(&ctx.db, "alice@example.com").await;

    let first = portfolios::create_portfolio(
        &ctx.db,
        &ctx.assets,
        owner,
        TemplateForm::First(first_form("Alice Smith", "Engineer")),
    )
    .await
    .unwrap();
    let second = create_second(&ctx, owner, "Alice Smith", "Designer").await;

    let link = publication::publish(&ctx.db, owner, first.id).await.unwrap();
    assert_eq!(link, format!("/first-template-published/{}", first.id));

    let link = publication::publish(&ctx.db, owner, second).await.unwrap();
    assert_eq!(link, format!("/second-template-published/{second}"));

    let items = portfolios::list_by_owner(&ctx.db, &ctx.assets, owner).await;
    assert!(items.iter().all(|i| i.status == PortfolioStatus::Published));
    assert!(items.iter().all(|i| i.status_name == "Published"));
}

#[tokio::test]
async fn test_publish_twice_returns_the_same_link() {
    let ctx = setup().await;
    let owner = create_user(&ctx.db, "alice@example.com").await;
    let id = create_second(&ctx, owner, "Alice Smith", "Designer").await;

    let first = publication::publish(&ctx.db, owner, id).await.unwrap();
    let second = publication::publish(&ctx.db, owner, id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_publish_requires_ownership_and_existence() {
    let ctx = setup().await;
    let owner = create_user(&ctx.db, "alice@example.com").await;
    let other = create_user(&ctx.db, "bob@example.com").await;
    let id = create_second(&ctx, owner, "Alice Smith", "Designer").await;

    let err = publication::publish(&ctx.db, other, id).await.unwrap_err();
    assert!(matches!(err, PortfolioError::Forbidden(_)));

    let err = publication::publish(&ctx.db, owner, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::NotFound(_)));

    let err = publication::publish(&ctx.db, Uuid::nil(), id).await.unwrap_err();
    assert!(matches!(err, PortfolioError::MissingOwner));
}

#[tokio::test]
async fn test_update_after_publish_keeps_link_and_status() {
    let ctx = setup().await;
    let owner = create_user(&ctx.db, "alice@example.com").await;
    let id = create_second(&ctx, owner, "Alice Smith", "Designer").await;
    let link = publication::publish(&ctx.db, owner, id).await.unwrap();

    let updated = portfolios::update_portfolio(
        &ctx.db,
        &ctx.assets,
        owner,
        id,
        TemplateForm::Second(second_form("Alice Smith", "Art director")),
    )
    .await
    .unwrap();

    assert_eq!(updated.status, PortfolioStatus::Published);
    assert_eq!(updated.public_link, link);
    assert_eq!(updated.role, "Art director");
}

#[tokio::test]
async fn test_public_preview_hides_drafts() {
    let ctx = setup().await;
    let owner = create_user(&ctx.db, "alice@example.com").await;
    let id = create_second(&ctx, owner, "Alice Smith", "Designer").await;

    let err = portfolios::get_published_preview(&ctx.db, &ctx.assets, id)
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::NotFound(_)));

    publication::publish(&ctx.db, owner, id).await.unwrap();
    let preview = portfolios::get_published_preview(&ctx.db, &ctx.assets, id)
        .await
        .unwrap();
    let TemplatePreview::Second(preview) = preview else {
        panic!("expected a second-template preview");
    };
    assert_eq!(preview.meta.status, PortfolioStatus::Published);
    assert_eq!(preview.meta.link, format!("/second-template-published/{id}"));
    assert_eq!(preview.phone_number, "+47 555 01 00");
}

#[tokio::test]
async fn test_search_items_are_published_only_newest_first() {
    let ctx = setup().await;
    let owner = create_user(&ctx.db, "alice@example.com").await;

    let older = create_second(&ctx, owner, "Alice Smith", "Designer").await;
    let draft = create_second(&ctx, owner, "Draft Person", "Designer").await;
    let newer = create_second(&ctx, owner, "Alan Turing", "Engineer").await;
    publication::publish(&ctx.db, owner, older).await.unwrap();
    publication::publish(&ctx.db, owner, newer).await.unwrap();

    let items = search::list_published_as_search_items(&ctx.db, &ctx.assets)
        .await
        .unwrap();

    let ids: Vec<Uuid> = items.iter().map(|i| i.portfolio_id).collect();
    assert_eq!(ids, vec![newer, older]);
    assert!(!ids.contains(&draft));
    assert!(items.iter().all(|i| i.photo_url.is_some()));
    assert!(items.iter().all(|i| i.template_kind == TemplateKind::Second));
    assert_eq!(items[0].link, format!("/second-template-published/{newer}"));

    let filters = SearchFilters {
        name: Some("AL".to_string()),
        role: Some("eng".to_string()),
        ..Default::default()
    };
    let matched = search::apply_filters(&filters, items);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].full_name, "Alan Turing");
}

#[tokio::test]
async fn test_search_items_carry_project_dates() {
    let ctx = setup().await;
    let owner = create_user(&ctx.db, "alice@example.com").await;

    let dated = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
    let mut form = second_form("Alice Smith", "Designer");
    form.projects = vec![second_project("Poster", dated)];
    let record =
        portfolios::create_portfolio(&ctx.db, &ctx.assets, owner, TemplateForm::Second(form))
            .await
            .unwrap();
    publication::publish(&ctx.db, owner, record.id).await.unwrap();

    let items = search::list_published_as_search_items(&ctx.db, &ctx.assets)
        .await
        .unwrap();
    assert_eq!(items[0].project_creation_dates, vec![dated]);

    let outside = SearchFilters {
        from: Some(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()),
        ..Default::default()
    };
    assert!(search::apply_filters(&outside, items).is_empty());
}

#[tokio::test]
async fn test_feed_pages_with_cursor_and_sql_filters() {
    let ctx = setup().await;
    let owner = create_user(&ctx.db, "alice@example.com").await;

    let mut published = Vec::new();
    for name in ["Ada One", "Ada Two", "Ada Three", "Bob Four"] {
        let id = create_second(&ctx, owner, name, "Engineer").await;
        publication::publish(&ctx.db, owner, id).await.unwrap();
        published.push(id);
    }

    let filters = SearchFilters {
        name: Some("ada".to_string()),
        ..Default::default()
    };

    let page = search::published_feed(&ctx.db, &ctx.assets, &filters, 2, None)
        .await
        .unwrap();
    let names: Vec<&str> = page.items.iter().map(|i| i.full_name.as_str()).collect();
    assert_eq!(names, vec!["Ada Three", "Ada Two"]);
    let cursor = page.next_cursor.expect("a full page yields a cursor");

    let page = search::published_feed(&ctx.db, &ctx.assets, &filters, 2, Some(cursor))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].portfolio_id, published[0]);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_publish_write_on_vanished_row_reports_record_not_found() {
    let ctx = setup().await;

    let err = portfolio_db::mark_published(&ctx.db, Uuid::new_v4(), "/x".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DbErr::RecordNotFound(_)));
}
