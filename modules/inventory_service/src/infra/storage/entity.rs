//! SeaORM entities for database tables
//!
//! Nested structures (column lists, item data, snapshots, diffs, operation
//! lines) are stored as JSON columns; see `mapper` for their shapes.

/// Per-tenant column list, replaced as a whole on every edit
pub mod schema {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "inventory_schemas")]
    pub struct Model {
        /// One schema per tenant
        #[sea_orm(primary_key, auto_increment = false)]
        pub tenant_id: Uuid,

        /// Ordered column definitions as JSON array
        pub columns: Json,

        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Inventory records
pub mod item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "inventory_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub tenant_id: Uuid,

        /// Field map keyed by column id
        pub data: Json,

        pub created_by_id: Uuid,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Append-only audit log
pub mod audit_entry {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "inventory_audit_log")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub tenant_id: Uuid,

        pub actor_id: Uuid,

        /// ITEM_CREATED, ITEM_UPDATED, ITEM_DELETED or SCHEMA_UPDATED
        pub action: String,

        pub item_id: Option<Uuid>,
        pub item_name: Option<String>,

        /// Deleted item state
        pub snapshot: Option<Json>,

        /// Field changes of an update
        pub changes: Option<Json>,

        /// Column changes of a schema update
        pub schema_changes: Option<Json>,

        pub undoable: bool,
        pub undone_at: Option<DateTimeUtc>,
        pub undone_by_id: Option<Uuid>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Receiving operations
pub mod operation {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "inventory_operations")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub tenant_id: Uuid,

        pub operation_type: String,
        pub date: DateTimeUtc,
        pub reference: Option<String>,
        pub supplier: Option<String>,
        pub notes: Option<String>,

        /// Per-item lines as JSON array
        pub items: Json,

        pub total_qty: i64,
        pub user_id: Uuid,
        pub undone_at: Option<DateTimeUtc>,
        pub undone_by_id: Option<Uuid>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
