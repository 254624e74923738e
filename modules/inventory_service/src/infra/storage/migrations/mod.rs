//! Database migrations for inventory service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_schemas_and_items::Migration),
            Box::new(m20250301_000002_create_audit_log::Migration),
            Box::new(m20250301_000003_create_operations::Migration),
        ]
    }
}

mod m20250301_000001_create_schemas_and_items;
mod m20250301_000002_create_audit_log;
mod m20250301_000003_create_operations;
