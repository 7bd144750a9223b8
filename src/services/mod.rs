//! Portfolio operations on top of the repository and the asset store.
//!
//! Every function takes the database connection and, where assets are
//! involved, the [`AssetStore`](crate::assets::AssetStore) explicitly.

pub mod portfolios;
pub mod publication;
pub mod search;

use sea_orm::{DatabaseConnection, DbErr};
use uuid::Uuid;

use crate::db::portfolio as portfolio_db;
use crate::error::{PersistenceError, PortfolioError};
use crate::models::portfolio;

/// Fetch a portfolio and check that `owner_id` owns it.
pub(crate) async fn fetch_owned(
    db: &DatabaseConnection,
    owner_id: Uuid,
    id: Uuid,
) -> Result<portfolio::Model, PortfolioError> {
    require_owner(owner_id)?;
    let record = portfolio_db::get_portfolio_by_id(db, id)
        .await?
        .ok_or(PortfolioError::NotFound(id))?;

    if record.owner_id != owner_id {
        return Err(PortfolioError::Forbidden(id));
    }
    Ok(record)
}

pub(crate) fn require_owner(owner_id: Uuid) -> Result<(), PortfolioError> {
    if owner_id.is_nil() {
        return Err(PortfolioError::MissingOwner);
    }
    Ok(())
}

/// A row that vanished between the ownership check and the write reads as
/// not found, not as a backend failure.
pub(crate) fn gone_as_not_found(id: Uuid, err: DbErr) -> PortfolioError {
    match err {
        DbErr::RecordNotFound(_) => PortfolioError::NotFound(id),
        other => PortfolioError::Persistence(PersistenceError::Database(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanished_row_maps_to_not_found() {
        let id = Uuid::new_v4();
        let err = gone_as_not_found(id, DbErr::RecordNotFound("Portfolio not found".into()));
        assert!(matches!(err, PortfolioError::NotFound(got) if got == id));

        let err = gone_as_not_found(id, DbErr::Custom("connection reset".into()));
        assert!(matches!(err, PortfolioError::Persistence(_)));
    }
}
