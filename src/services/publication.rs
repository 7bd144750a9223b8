use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::{fetch_owned, gone_as_not_found};
use crate::db::portfolio as portfolio_db;
use crate::error::PortfolioError;
use crate::models::portfolio::PortfolioStatus;

/// Publish a portfolio and return its public link.
///
/// The link is `<template prefix>/<id>`. Publishing an already published
/// portfolio returns the stored link without writing. Content is not
/// re-validated.
pub async fn publish(
    db: &DatabaseConnection,
    owner_id: Uuid,
    id: Uuid,
) -> Result<String, PortfolioError> {
    let record = fetch_owned(db, owner_id, id).await?;

    if record.status == PortfolioStatus::Published && !record.public_link.is_empty() {
        return Ok(record.public_link);
    }

    let link = record.template_kind.public_link(record.id);
    let updated = portfolio_db::mark_published(db, id, link)
        .await
        .map_err(|e| gone_as_not_found(id, e))?;

    tracing::info!(portfolio_id = %id, link = %updated.public_link, "published portfolio");
    Ok(updated.public_link)
}
