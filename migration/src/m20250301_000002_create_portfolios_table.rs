use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `portfolios` table and its columns.
#[derive(DeriveIden)]
enum Portfolios {
    Table,
    Id,
    OwnerId,
    TemplateKind,
    DisplayName,
    Status,
    PublicLink,
    ProfileAssetRef,
    Username,
    PhoneNumber,
    FullName,
    FullNameSearch,
    Location,
    Role,
    RoleSearch,
    Bio,
    Links,
    CreatedAt,
    UpdatedAt,
}

/// Re-declare parent table identifiers for foreign-key references.
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Portfolios::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Portfolios::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Portfolios::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Portfolios::TemplateKind).string().not_null())
                    .col(ColumnDef::new(Portfolios::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Portfolios::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Portfolios::PublicLink)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Portfolios::ProfileAssetRef).string().null())
                    .col(ColumnDef::new(Portfolios::Username).string().null())
                    .col(ColumnDef::new(Portfolios::PhoneNumber).string().null())
                    .col(ColumnDef::new(Portfolios::FullName).string().not_null())
                    // Lowercased copies of full_name / role for prefix search.
                    .col(ColumnDef::new(Portfolios::FullNameSearch).string().not_null())
                    .col(ColumnDef::new(Portfolios::Location).string().not_null())
                    .col(ColumnDef::new(Portfolios::Role).string().not_null())
                    .col(ColumnDef::new(Portfolios::RoleSearch).string().not_null())
                    .col(ColumnDef::new(Portfolios::Bio).text().not_null())
                    .col(ColumnDef::new(Portfolios::Links).json().not_null())
                    .col(
                        ColumnDef::new(Portfolios::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Portfolios::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_portfolios_owner_id")
                            .from(Portfolios::Table, Portfolios::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Portfolios::Table).to_owned())
            .await
    }
}
