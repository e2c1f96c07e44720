//! Create `about_us` table.
//! Titles are not unique here; the sync job de-duplicates by title itself.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AboutUs::Table)
                    .if_not_exists()
                    .col(pk_auto(AboutUs::Id))
                    .col(string_len(AboutUs::Title, 255).not_null())
                    .col(text(AboutUs::Description).not_null())
                    .col(string_len(AboutUs::Type, 64).not_null().default("general"))
                    .col(
                        timestamp_with_time_zone(AboutUs::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(AboutUs::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_about_us_type")
                    .table(AboutUs::Table)
                    .col(AboutUs::Type)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_about_us_title")
                    .table(AboutUs::Table)
                    .col(AboutUs::Title)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AboutUs::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AboutUs {
    Table,
    Id,
    Title,
    Description,
    Type,
    CreatedAt,
    UpdatedAt,
}
