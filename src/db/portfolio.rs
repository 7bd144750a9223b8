use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Query;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assets::AssetRef;
use crate::models::portfolio::{
    self, DEFAULT_DISPLAY_NAME, Links, PortfolioStatus, SearchFilters,
};
use crate::models::projects;
use crate::templates::{Document, PortfolioDocument, ProfileFields, ProjectEntry};

/// Position in the newest-first published ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl From<&portfolio::Model> for PublishedCursor {
    fn from(m: &portfolio::Model) -> Self {
        Self {
            created_at: m.created_at,
            id: m.id,
        }
    }
}

/// Insert a new draft portfolio with its projects in one transaction.
pub async fn insert_portfolio(
    db: &DatabaseConnection,
    owner_id: Uuid,
    document: PortfolioDocument,
) -> Result<portfolio::Model, DbErr> {
    let txn = db.begin().await?;
    let id = Uuid::new_v4();

    let mut record = portfolio::ActiveModel {
        id: Set(id),
        owner_id: Set(owner_id),
        template_kind: Set(document.template_kind),
        display_name: Set(DEFAULT_DISPLAY_NAME.to_string()),
        status: Set(PortfolioStatus::Draft),
        public_link: Set(String::new()),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    };
    apply_content(&mut record, &document);
    let model = record.insert(&txn).await?;

    insert_projects(&txn, id, document.projects).await?;
    txn.commit().await?;

    Ok(model)
}

/// Overwrite every editable field and the full project list of a portfolio.
///
/// Identity, owner, template kind, display name, status, public link and
/// creation time are left untouched.
pub async fn replace_portfolio_content(
    db: &DatabaseConnection,
    id: Uuid,
    document: PortfolioDocument,
) -> Result<portfolio::Model, DbErr> {
    let txn = db.begin().await?;

    let existing = portfolio::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DbErr::RecordNotFound("Portfolio not found".to_string()))?;

    let mut active: portfolio::ActiveModel = existing.into();
    apply_content(&mut active, &document);
    active.updated_at = Set(Some(Utc::now()));
    let model = active.update(&txn).await?;

    projects::Entity::delete_many()
        .filter(projects::Column::PortfolioId.eq(id))
        .exec(&txn)
        .await?;
    insert_projects(&txn, id, document.projects).await?;

    txn.commit().await?;
    Ok(model)
}

fn apply_content(active: &mut portfolio::ActiveModel, document: &PortfolioDocument) {
    let profile = &document.profile;
    active.profile_asset_ref = Set(document.photo.clone().map(AssetRef::into_inner));
    active.username = Set(profile.username.clone());
    active.phone_number = Set(profile.phone_number.clone());
    active.full_name = Set(profile.full_name.clone());
    active.full_name_search = Set(profile.full_name.to_lowercase());
    active.location = Set(profile.location.clone());
    active.role = Set(profile.role.clone());
    active.role_search = Set(profile.role.to_lowercase());
    active.bio = Set(profile.bio.clone());
    active.links = Set(Links(document.links.clone()));
}

async fn insert_projects(
    txn: &DatabaseTransaction,
    portfolio_id: Uuid,
    entries: Vec<ProjectEntry<Option<AssetRef>>>,
) -> Result<(), DbErr> {
    for (position, entry) in entries.into_iter().enumerate() {
        projects::ActiveModel {
            id: Set(Uuid::new_v4()),
            portfolio_id: Set(portfolio_id),
            position: Set(position as i32),
            asset_ref: Set(entry.photo.map(AssetRef::into_inner)),
            name: Set(entry.name),
            link: Set(entry.link),
            description: Set(entry.description),
            creation_date: Set(entry.creation_date),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

/// Fetch a single portfolio by ID.
pub async fn get_portfolio_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<portfolio::Model>, DbErr> {
    portfolio::Entity::find_by_id(id).one(db).await
}

/// Fetch a portfolio's projects in display order.
pub async fn get_projects(
    db: &DatabaseConnection,
    portfolio_id: Uuid,
) -> Result<Vec<projects::Model>, DbErr> {
    projects::Entity::find()
        .filter(projects::Column::PortfolioId.eq(portfolio_id))
        .order_by_asc(projects::Column::Position)
        .all(db)
        .await
}

/// Fetch projects for many portfolios in one query, grouped by portfolio.
pub async fn get_projects_for_portfolios(
    db: &DatabaseConnection,
    portfolio_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<projects::Model>>, DbErr> {
    if portfolio_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = projects::Entity::find()
        .filter(projects::Column::PortfolioId.is_in(portfolio_ids))
        .order_by_asc(projects::Column::PortfolioId)
        .order_by_asc(projects::Column::Position)
        .all(db)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<projects::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.portfolio_id).or_default().push(row);
    }
    Ok(grouped)
}

/// Fetch a portfolio together with its persisted document.
pub async fn load_document(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<(portfolio::Model, PortfolioDocument)>, DbErr> {
    let Some(record) = get_portfolio_by_id(db, id).await? else {
        return Ok(None);
    };
    let projects = get_projects(db, id).await?;
    let document = document_from_rows(&record, projects);
    Ok(Some((record, document)))
}

/// Rebuild the persisted document shape from table rows.
pub fn document_from_rows(
    record: &portfolio::Model,
    projects: Vec<projects::Model>,
) -> PortfolioDocument {
    Document {
        template_kind: record.template_kind,
        photo: record.profile_asset_ref.clone().map(AssetRef::new),
        profile: ProfileFields {
            username: record.username.clone(),
            phone_number: record.phone_number.clone(),
            full_name: record.full_name.clone(),
            location: record.location.clone(),
            role: record.role.clone(),
            bio: record.bio.clone(),
        },
        links: record.links.0.clone(),
        projects: projects
            .into_iter()
            .map(|p| ProjectEntry {
                photo: p.asset_ref.map(AssetRef::new),
                name: p.name,
                link: p.link,
                description: p.description,
                creation_date: p.creation_date,
            })
            .collect(),
    }
}

/// Fetch all portfolios of one owner, oldest first.
pub async fn get_portfolios_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> Result<Vec<portfolio::Model>, DbErr> {
    portfolio::Entity::find()
        .filter(portfolio::Column::OwnerId.eq(owner_id))
        .order_by_asc(portfolio::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn owner_has_portfolios(db: &DatabaseConnection, owner_id: Uuid) -> Result<bool, DbErr> {
    let count = portfolio::Entity::find()
        .filter(portfolio::Column::OwnerId.eq(owner_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Fetch every published portfolio, newest first.
pub async fn get_published_portfolios(
    db: &DatabaseConnection,
) -> Result<Vec<portfolio::Model>, DbErr> {
    portfolio::Entity::find()
        .filter(portfolio::Column::Status.eq(PortfolioStatus::Published))
        .order_by_desc(portfolio::Column::CreatedAt)
        .order_by_desc(portfolio::Column::Id)
        .all(db)
        .await
}

/// Fetch one page of published portfolios with filters applied in SQL.
///
/// Prefix filters run against the lowercased search columns. `LIKE`
/// wildcards in the prefix are not escaped, so callers re-check matches.
pub async fn get_published_page(
    db: &DatabaseConnection,
    filters: &SearchFilters,
    limit: u64,
    cursor: Option<PublishedCursor>,
) -> Result<Vec<portfolio::Model>, DbErr> {
    let mut query =
        portfolio::Entity::find().filter(portfolio::Column::Status.eq(PortfolioStatus::Published));

    if let Some(name) = filters.name_prefix() {
        query = query.filter(portfolio::Column::FullNameSearch.starts_with(name.as_str()));
    }
    if let Some(role) = filters.role_prefix() {
        query = query.filter(portfolio::Column::RoleSearch.starts_with(role.as_str()));
    }

    if filters.has_date_range() {
        let mut dated = Query::select();
        dated
            .column(projects::Column::PortfolioId)
            .from(projects::Entity)
            .and_where(projects::Column::CreationDate.is_not_null());
        if let Some(from) = filters.from {
            dated.and_where(projects::Column::CreationDate.gte(from));
        }
        if let Some(to) = filters.to {
            dated.and_where(projects::Column::CreationDate.lte(to));
        }
        query = query.filter(portfolio::Column::Id.in_subquery(dated.to_owned()));
    }

    if let Some(cursor) = cursor {
        query = query.filter(
            Condition::any()
                .add(portfolio::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(portfolio::Column::CreatedAt.eq(cursor.created_at))
                        .add(portfolio::Column::Id.lt(cursor.id)),
                ),
        );
    }

    query
        .order_by_desc(portfolio::Column::CreatedAt)
        .order_by_desc(portfolio::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// Change only the display name.
pub async fn rename_portfolio(
    db: &DatabaseConnection,
    id: Uuid,
    name: String,
) -> Result<portfolio::Model, DbErr> {
    let item = portfolio::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Portfolio not found".to_string()))?;

    let mut active: portfolio::ActiveModel = item.into();
    active.display_name = Set(name);
    active.updated_at = Set(Some(Utc::now()));

    active.update(db).await
}

/// Set status to PUBLISHED and store the public link in a single update.
pub async fn mark_published(
    db: &DatabaseConnection,
    id: Uuid,
    public_link: String,
) -> Result<portfolio::Model, DbErr> {
    let item = portfolio::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Portfolio not found".to_string()))?;

    let mut active: portfolio::ActiveModel = item.into();
    active.status = Set(PortfolioStatus::Published);
    active.public_link = Set(public_link);

    active.update(db).await
}

/// Which of `refs` are still stored on a portfolio or one of its projects.
pub async fn referenced_asset_refs(
    db: &DatabaseConnection,
    refs: &[AssetRef],
) -> Result<HashSet<String>, DbErr> {
    if refs.is_empty() {
        return Ok(HashSet::new());
    }
    let paths: Vec<String> = refs.iter().map(|r| r.as_str().to_string()).collect();

    let profile_refs: Vec<Option<String>> = portfolio::Entity::find()
        .select_only()
        .column(portfolio::Column::ProfileAssetRef)
        .filter(portfolio::Column::ProfileAssetRef.is_in(paths.clone()))
        .into_tuple()
        .all(db)
        .await?;
    let project_refs: Vec<Option<String>> = projects::Entity::find()
        .select_only()
        .column(projects::Column::AssetRef)
        .filter(projects::Column::AssetRef.is_in(paths))
        .into_tuple()
        .all(db)
        .await?;

    Ok(profile_refs
        .into_iter()
        .chain(project_refs)
        .flatten()
        .collect())
}

/// Delete a portfolio and its projects. Stored assets are not touched.
pub async fn delete_portfolio(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    let txn = db.begin().await?;
    projects::Entity::delete_many()
        .filter(projects::Column::PortfolioId.eq(id))
        .exec(&txn)
        .await?;
    let result = portfolio::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(result)
}
