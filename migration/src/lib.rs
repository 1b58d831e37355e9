pub use sea_orm_migration::prelude::*;

mod m20251020_000001_create_profiles;
mod m20251020_000002_add_link_tables;
mod m20251020_000003_add_profile_views;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251020_000001_create_profiles::Migration),
            Box::new(m20251020_000002_add_link_tables::Migration),
            Box::new(m20251020_000003_add_profile_views::Migration),
        ]
    }
}
