use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::portfolio::TemplateKind;
use crate::storage::StorageError;

/// Failure of the document store or the blob store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("blob storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A stored asset reference that could not be turned into a fetchable URL.
#[derive(Debug, Error)]
pub enum AssetResolutionError {
    #[error("asset {0} does not exist")]
    Missing(String),
    #[error("could not resolve asset {asset_ref}: {source}")]
    Storage {
        asset_ref: String,
        #[source]
        source: StorageError,
    },
}

/// Everything a portfolio operation can fail with.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// The form was rejected before anything was written.
    #[error("{0}")]
    Validation(String),
    #[error("an authenticated owner is required")]
    MissingOwner,
    #[error("portfolio {0} not found")]
    NotFound(Uuid),
    #[error("portfolio {0} belongs to another user")]
    Forbidden(Uuid),
    #[error("portfolio {id} uses the {existing} template and cannot be saved as {requested}")]
    TemplateMismatch {
        id: Uuid,
        existing: TemplateKind,
        requested: TemplateKind,
    },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    AssetResolution(#[from] AssetResolutionError),
}

impl From<DbErr> for PortfolioError {
    fn from(err: DbErr) -> Self {
        Self::Persistence(PersistenceError::Database(err))
    }
}

impl From<StorageError> for PortfolioError {
    fn from(err: StorageError) -> Self {
        Self::Persistence(PersistenceError::Storage(err))
    }
}
