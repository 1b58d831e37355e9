use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

use crate::m20251020_000001_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SocialLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SocialLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SocialLinks::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(SocialLinks::Platform)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SocialLinks::Url).text().not_null())
                    .col(
                        ColumnDef::new(SocialLinks::DisplayName)
                            .string_len(128)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SocialLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_social_links_profile")
                            .from(SocialLinks::Table, SocialLinks::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    // Ordered reads per owner
                    .index(
                        Index::create()
                            .name("idx_social_links_user_created")
                            .col(SocialLinks::UserId)
                            .col(SocialLinks::CreatedAt),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CustomLinks::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(CustomLinks::Title)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomLinks::Url).text().not_null())
                    .col(
                        ColumnDef::new(CustomLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_links_profile")
                            .from(CustomLinks::Table, CustomLinks::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_custom_links_user_created")
                            .col(CustomLinks::UserId)
                            .col(CustomLinks::CreatedAt),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SocialLinks::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SocialLinks {
    Table,
    Id,
    UserId,
    Platform,
    Url,
    DisplayName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CustomLinks {
    Table,
    Id,
    UserId,
    Title,
    Url,
    CreatedAt,
}
