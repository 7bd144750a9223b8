use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Portfolios {
    Table,
    OwnerId,
    Status,
    CreatedAt,
    Id,
}

#[derive(DeriveIden)]
enum PortfolioProjects {
    Table,
    PortfolioId,
    Position,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Personal listing: portfolios by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolios_owner_id")
                    .table(Portfolios::Table)
                    .col(Portfolios::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Public listing: published portfolios, newest first, (created_at, id) cursor
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolios_status_created_at_id")
                    .table(Portfolios::Table)
                    .col(Portfolios::Status)
                    .col((Portfolios::CreatedAt, IndexOrder::Desc))
                    .col((Portfolios::Id, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_portfolio_projects_portfolio_position")
                    .table(PortfolioProjects::Table)
                    .col(PortfolioProjects::PortfolioId)
                    .col(PortfolioProjects::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_portfolios_owner_id").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_portfolios_status_created_at_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_portfolio_projects_portfolio_position")
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
