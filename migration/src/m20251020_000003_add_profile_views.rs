use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

use crate::m20251020_000001_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only view events
        manager
            .create_table(
                Table::create()
                    .table(ProfileViews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProfileViews::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProfileViews::ProfileId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProfileViews::ViewedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_views_profile")
                            .from(ProfileViews::Table, ProfileViews::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_profile_views_profile_time")
                            .col(ProfileViews::ProfileId)
                            .col(ProfileViews::ViewedAt),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProfileViews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProfileViews {
    Table,
    Id,
    ProfileId,
    ViewedAt,
}
