use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::Username).string_len(64).null())
                    .col(ColumnDef::new(Profiles::FirstName).string_len(128).null())
                    .col(ColumnDef::new(Profiles::LastName).string_len(128).null())
                    .col(ColumnDef::new(Profiles::Bio).text().null())
                    .col(ColumnDef::new(Profiles::Location).string_len(256).null())
                    .col(ColumnDef::new(Profiles::Phone).string_len(64).null())
                    .col(ColumnDef::new(Profiles::Email).string_len(320).null())
                    .col(ColumnDef::new(Profiles::AvatarUrl).text().null())
                    .col(
                        ColumnDef::new(Profiles::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL usernames do not collide, so profiles without one coexist.
        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_username")
                    .table(Profiles::Table)
                    .col(Profiles::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Token)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Sessions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_profile")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Profiles {
    Table,
    Id,
    Username,
    FirstName,
    LastName,
    Bio,
    Location,
    Phone,
    Email,
    AvatarUrl,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Token,
    UserId,
    ExpiresAt,
}
