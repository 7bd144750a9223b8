use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PortfolioProjects {
    Table,
    Id,
    PortfolioId,
    Position,
    AssetRef,
    Name,
    Link,
    Description,
    CreationDate,
}

#[derive(DeriveIden)]
enum Portfolios {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PortfolioProjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PortfolioProjects::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PortfolioProjects::PortfolioId).uuid().not_null())
                    .col(ColumnDef::new(PortfolioProjects::Position).integer().not_null())
                    .col(ColumnDef::new(PortfolioProjects::AssetRef).string().null())
                    .col(ColumnDef::new(PortfolioProjects::Name).string().not_null())
                    .col(ColumnDef::new(PortfolioProjects::Link).string().not_null())
                    .col(ColumnDef::new(PortfolioProjects::Description).text().null())
                    .col(
                        ColumnDef::new(PortfolioProjects::CreationDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_portfolio_projects_portfolio_id")
                            .from(PortfolioProjects::Table, PortfolioProjects::PortfolioId)
                            .to(Portfolios::Table, Portfolios::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PortfolioProjects::Table).to_owned())
            .await
    }
}
