use sea_orm::{DatabaseConnection, DbErr};
use uuid::Uuid;

use super::{fetch_owned, gone_as_not_found, require_owner};
use crate::assets::{AssetRef, AssetStore};
use crate::db::portfolio as portfolio_db;
use crate::error::PortfolioError;
use crate::models::portfolio::{self, PortfolioListItem, PortfolioStatus};
use crate::templates::{self, PortfolioDocument, TemplateForm, TemplatePreview};

/// Save a new portfolio from form state.
///
/// Validation runs before any upload. Photos are stored, then the record and
/// its projects are written in one transaction; if staging or that write
/// fails, blobs created by this save and not referenced elsewhere are
/// deleted again.
pub async fn create_portfolio(
    db: &DatabaseConnection,
    assets: &AssetStore,
    owner_id: Uuid,
    form: TemplateForm,
) -> Result<portfolio::Model, PortfolioError> {
    require_owner(owner_id)?;
    form.validate().into_result()?;

    let mut created_assets = Vec::new();
    let document = stage(db, assets, form, &mut created_assets).await?;

    let record = compensate_on_failure(
        db,
        assets,
        &created_assets,
        portfolio_db::insert_portfolio(db, owner_id, document).await,
        PortfolioError::from,
    )
    .await?;

    tracing::info!(
        portfolio_id = %record.id,
        %owner_id,
        template = %record.template_kind,
        "created portfolio"
    );
    Ok(record)
}

/// Replace the editable content of an existing portfolio.
///
/// The form must be of the same template kind as the record.
pub async fn update_portfolio(
    db: &DatabaseConnection,
    assets: &AssetStore,
    owner_id: Uuid,
    id: Uuid,
    form: TemplateForm,
) -> Result<portfolio::Model, PortfolioError> {
    form.validate().into_result()?;

    let existing = fetch_owned(db, owner_id, id).await?;
    if existing.template_kind != form.kind() {
        return Err(PortfolioError::TemplateMismatch {
            id,
            existing: existing.template_kind,
            requested: form.kind(),
        });
    }

    let mut created_assets = Vec::new();
    let document = stage(db, assets, form, &mut created_assets).await?;

    let record = compensate_on_failure(
        db,
        assets,
        &created_assets,
        portfolio_db::replace_portfolio_content(db, id, document).await,
        |e| gone_as_not_found(id, e),
    )
    .await?;

    tracing::info!(portfolio_id = %id, "updated portfolio");
    Ok(record)
}

async fn stage(
    db: &DatabaseConnection,
    assets: &AssetStore,
    form: TemplateForm,
    created_assets: &mut Vec<AssetRef>,
) -> Result<PortfolioDocument, PortfolioError> {
    match templates::to_persisted(form, assets, created_assets).await {
        Ok(document) => Ok(document),
        Err(e) => {
            discard_unreferenced(db, assets, created_assets).await;
            Err(e)
        }
    }
}

async fn compensate_on_failure<T>(
    db: &DatabaseConnection,
    assets: &AssetStore,
    created_assets: &[AssetRef],
    result: Result<T, DbErr>,
    map_err: impl FnOnce(DbErr) -> PortfolioError,
) -> Result<T, PortfolioError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::error!(
                "portfolio write failed, discarding {} new asset(s): {e}",
                created_assets.len()
            );
            discard_unreferenced(db, assets, created_assets).await;
            Err(map_err(e))
        }
    }
}

/// Delete the given blobs unless a committed portfolio or project points at
/// them. Identical bytes saved concurrently share a path, so a blob this save
/// created may already belong to another record.
///
/// If the reference check itself fails nothing is deleted.
pub async fn discard_unreferenced(
    db: &DatabaseConnection,
    assets: &AssetStore,
    candidates: &[AssetRef],
) {
    let referenced = match portfolio_db::referenced_asset_refs(db, candidates).await {
        Ok(referenced) => referenced,
        Err(e) => {
            tracing::warn!(
                "could not check asset references, leaving {} blob(s) in place: {e}",
                candidates.len()
            );
            return;
        }
    };

    let unused: Vec<AssetRef> = candidates
        .iter()
        .filter(|r| !referenced.contains(r.as_str()))
        .cloned()
        .collect();
    if unused.len() < candidates.len() {
        tracing::info!(
            kept = candidates.len() - unused.len(),
            "keeping assets referenced by other portfolios"
        );
    }
    assets.discard(&unused).await;
}

/// Form state for editing, with every stored photo kept by reference.
pub async fn load_for_edit(
    db: &DatabaseConnection,
    owner_id: Uuid,
    id: Uuid,
) -> Result<TemplateForm, PortfolioError> {
    fetch_owned(db, owner_id, id).await?;
    let (_, document) = portfolio_db::load_document(db, id)
        .await?
        .ok_or(PortfolioError::NotFound(id))?;
    Ok(TemplateForm::from_document(document))
}

/// Preview of any portfolio, regardless of owner or status.
pub async fn get_preview(
    db: &DatabaseConnection,
    assets: &AssetStore,
    id: Uuid,
) -> Result<TemplatePreview, PortfolioError> {
    let (record, document) = portfolio_db::load_document(db, id)
        .await?
        .ok_or(PortfolioError::NotFound(id))?;
    Ok(templates::from_persisted(&record, document, assets).await?)
}

/// Preview for the owner, draft or not.
pub async fn get_owned_preview(
    db: &DatabaseConnection,
    assets: &AssetStore,
    owner_id: Uuid,
    id: Uuid,
) -> Result<TemplatePreview, PortfolioError> {
    fetch_owned(db, owner_id, id).await?;
    get_preview(db, assets, id).await
}

/// Preview of a published portfolio; drafts read as not found.
pub async fn get_published_preview(
    db: &DatabaseConnection,
    assets: &AssetStore,
    id: Uuid,
) -> Result<TemplatePreview, PortfolioError> {
    let (record, document) = portfolio_db::load_document(db, id)
        .await?
        .ok_or(PortfolioError::NotFound(id))?;
    if record.status != PortfolioStatus::Published {
        return Err(PortfolioError::NotFound(id));
    }
    Ok(templates::from_persisted(&record, document, assets).await?)
}

/// Change a portfolio's display name without touching its content.
pub async fn rename_portfolio(
    db: &DatabaseConnection,
    owner_id: Uuid,
    id: Uuid,
    name: String,
) -> Result<portfolio::Model, PortfolioError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(PortfolioError::Validation(
            "Portfolio name cannot be empty!".to_string(),
        ));
    }

    fetch_owned(db, owner_id, id).await?;
    portfolio_db::rename_portfolio(db, id, name)
        .await
        .map_err(|e| gone_as_not_found(id, e))
}

/// Delete a portfolio. Its stored assets stay behind.
pub async fn delete_portfolio(
    db: &DatabaseConnection,
    owner_id: Uuid,
    id: Uuid,
) -> Result<(), PortfolioError> {
    fetch_owned(db, owner_id, id).await?;
    let result = portfolio_db::delete_portfolio(db, id).await?;
    if result.rows_affected == 0 {
        return Err(PortfolioError::NotFound(id));
    }
    tracing::info!(portfolio_id = %id, "deleted portfolio");
    Ok(())
}

/// The owner's personal listing. Backend failures yield an empty list.
pub async fn list_by_owner(
    db: &DatabaseConnection,
    assets: &AssetStore,
    owner_id: Uuid,
) -> Vec<PortfolioListItem> {
    let records = match portfolio_db::get_portfolios_by_owner(db, owner_id).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(%owner_id, "failed to fetch portfolios: {e}");
            return Vec::new();
        }
    };

    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let image_url = match &record.profile_asset_ref {
            Some(path) => match assets.resolve(&AssetRef::new(path.clone())).await {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(portfolio_id = %record.id, "listing without photo: {e}");
                    None
                }
            },
            None => None,
        };

        items.push(PortfolioListItem {
            id: record.id,
            display_name: record.display_name,
            image_url,
            status: record.status,
            status_name: record.status.display_name(),
            public_link: record.public_link,
            template_kind: record.template_kind,
        });
    }
    items
}

/// Whether the owner has saved anything yet. Backend failures read as `false`.
pub async fn owner_has_portfolios(db: &DatabaseConnection, owner_id: Uuid) -> bool {
    match portfolio_db::owner_has_portfolios(db, owner_id).await {
        Ok(has) => has,
        Err(e) => {
            tracing::error!(%owner_id, "failed to check for portfolios: {e}");
            false
        }
    }
}
