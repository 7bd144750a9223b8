use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Name given to a portfolio when it is first saved.
pub const DEFAULT_DISPLAY_NAME: &str = "New Portfolio";

/// Which template schema a portfolio uses. Fixed at creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[sea_orm(string_value = "first")]
    First,
    #[sea_orm(string_value = "second")]
    Second,
}

impl TemplateKind {
    /// Page prefix under which published portfolios of this kind are served.
    pub fn published_prefix(self) -> &'static str {
        match self {
            TemplateKind::First => "/first-template-published",
            TemplateKind::Second => "/second-template-published",
        }
    }

    /// Public link of a published portfolio: `<prefix>/<id>`.
    pub fn public_link(self, id: Uuid) -> String {
        format!("{}/{id}", self.published_prefix())
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::First => f.write_str("first"),
            TemplateKind::Second => f.write_str("second"),
        }
    }
}

/// Lifecycle status. Only DRAFT -> PUBLISHED is ever performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PortfolioStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "pending_changes")]
    PendingChanges,
}

impl PortfolioStatus {
    /// Human-readable label shown in the personal listing.
    pub fn display_name(self) -> &'static str {
        match self {
            PortfolioStatus::Draft => "Draft",
            PortfolioStatus::Published => "Published",
            PortfolioStatus::PendingChanges => "Pending changes",
        }
    }
}

/// Ordered list of profile links, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Links(pub Vec<String>);

/// SeaORM entity for the `portfolios` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub template_kind: TemplateKind,
    pub display_name: String,
    pub status: PortfolioStatus,
    /// Empty until published.
    pub public_link: String,
    pub profile_asset_ref: Option<String>,
    /// First template only.
    pub username: Option<String>,
    /// Second template only.
    pub phone_number: Option<String>,
    pub full_name: String,
    #[serde(skip)]
    pub full_name_search: String,
    pub location: String,
    pub role: String,
    #[serde(skip)]
    pub role_search: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub links: Links,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::projects::Entity")]
    Projects,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct RenamePortfolio {
    pub name: String,
}

/// One row of the owner's personal portfolio listing.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioListItem {
    pub id: Uuid,
    pub display_name: String,
    pub image_url: Option<String>,
    pub status: PortfolioStatus,
    pub status_name: &'static str,
    pub public_link: String,
    pub template_kind: TemplateKind,
}

/// Response of a successful publish.
#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    pub id: Uuid,
    pub link: String,
}

/// Filters over published portfolios: name/role prefix (case-insensitive)
/// and an optional inclusive range over project creation dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub name: Option<String>,
    pub role: Option<String>,
    pub from: Option<DateTimeUtc>,
    pub to: Option<DateTimeUtc>,
}

impl SearchFilters {
    /// Lowercased name prefix, `None` when blank.
    pub fn name_prefix(&self) -> Option<String> {
        normalized_prefix(self.name.as_deref())
    }

    /// Lowercased role prefix, `None` when blank.
    pub fn role_prefix(&self) -> Option<String> {
        normalized_prefix(self.role.as_deref())
    }

    pub fn has_date_range(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

/// Blank input means no filter; otherwise the value is used as typed,
/// surrounding spaces included.
fn normalized_prefix(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_lowercase)
}
