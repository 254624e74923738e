use super::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryOperations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryOperations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryOperations::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(InventoryOperations::OperationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryOperations::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryOperations::Reference).string())
                    .col(ColumnDef::new(InventoryOperations::Supplier).string())
                    .col(ColumnDef::new(InventoryOperations::Notes).text())
                    .col(ColumnDef::new(InventoryOperations::Items).json().not_null())
                    .col(
                        ColumnDef::new(InventoryOperations::TotalQty)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryOperations::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(InventoryOperations::UndoneAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(InventoryOperations::UndoneById).uuid())
                    .col(
                        ColumnDef::new(InventoryOperations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_operations_tenant_created")
                    .table(InventoryOperations::Table)
                    .col(InventoryOperations::TenantId)
                    .col(InventoryOperations::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryOperations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InventoryOperations {
    Table,
    Id,
    TenantId,
    OperationType,
    Date,
    Reference,
    Supplier,
    Notes,
    Items,
    TotalQty,
    UserId,
    UndoneAt,
    UndoneById,
    CreatedAt,
}
