use super::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryAuditLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryAuditLog::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryAuditLog::TenantId).uuid().not_null())
                    .col(ColumnDef::new(InventoryAuditLog::ActorId).uuid().not_null())
                    .col(ColumnDef::new(InventoryAuditLog::Action).string().not_null())
                    .col(ColumnDef::new(InventoryAuditLog::ItemId).uuid())
                    .col(ColumnDef::new(InventoryAuditLog::ItemName).string())
                    .col(ColumnDef::new(InventoryAuditLog::Snapshot).json())
                    .col(ColumnDef::new(InventoryAuditLog::Changes).json())
                    .col(ColumnDef::new(InventoryAuditLog::SchemaChanges).json())
                    .col(
                        ColumnDef::new(InventoryAuditLog::Undoable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(InventoryAuditLog::UndoneAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(InventoryAuditLog::UndoneById).uuid())
                    .col(
                        ColumnDef::new(InventoryAuditLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_audit_log_tenant_created")
                    .table(InventoryAuditLog::Table)
                    .col(InventoryAuditLog::TenantId)
                    .col(InventoryAuditLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_audit_log_item_id")
                    .table(InventoryAuditLog::Table)
                    .col(InventoryAuditLog::ItemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryAuditLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InventoryAuditLog {
    Table,
    Id,
    TenantId,
    ActorId,
    Action,
    ItemId,
    ItemName,
    Snapshot,
    Changes,
    SchemaChanges,
    Undoable,
    UndoneAt,
    UndoneById,
    CreatedAt,
}
