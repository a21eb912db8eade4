use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_items_table::Migration),
            Box::new(m20240101_000002_create_warehouses_table::Migration),
            Box::new(m20240101_000003_create_warehouse_locations_table::Migration),
            Box::new(m20240101_000004_create_stock_balances_table::Migration),
            Box::new(m20240101_000005_create_item_warehouse_configs_table::Migration),
            Box::new(m20240101_000006_create_movements_table::Migration),
            Box::new(m20240101_000007_create_movement_lines_table::Migration),
            Box::new(m20240101_000008_create_stock_alerts_table::Migration),
            Box::new(m20240101_000009_create_audit_logs_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create items table aligned with entities::item Model
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Items::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Description).string().null())
                        .col(ColumnDef::new(Items::Unit).string().not_null())
                        .col(ColumnDef::new(Items::Category).string().null())
                        .col(ColumnDef::new(Items::DefaultWarehouseId).uuid().null())
                        .col(
                            ColumnDef::new(Items::StandardCost)
                                .decimal_len(16, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Items::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Items::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_category")
                        .table(Items::Table)
                        .col(Items::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Items {
        Table,
        Id,
        Code,
        Name,
        Description,
        Unit,
        Category,
        DefaultWarehouseId,
        StandardCost,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_warehouses_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_warehouses_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Warehouses::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(
                            ColumnDef::new(Warehouses::WarehouseType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::Address).string().null())
                        .col(ColumnDef::new(Warehouses::Contact).string().null())
                        .col(
                            ColumnDef::new(Warehouses::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Warehouses::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Warehouses::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Warehouses {
        Table,
        Id,
        Code,
        Name,
        WarehouseType,
        Address,
        Contact,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_warehouse_locations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_warehouse_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WarehouseLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehouseLocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseLocations::WarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WarehouseLocations::Code).string().not_null())
                        .col(ColumnDef::new(WarehouseLocations::Name).string().not_null())
                        .col(
                            ColumnDef::new(WarehouseLocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseLocations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Location codes repeat across warehouses but not within one
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_warehouse_locations_warehouse_code")
                        .table(WarehouseLocations::Table)
                        .col(WarehouseLocations::WarehouseId)
                        .col(WarehouseLocations::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WarehouseLocations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum WarehouseLocations {
        Table,
        Id,
        WarehouseId,
        Code,
        Name,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_stock_balances_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_stock_balances_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockBalances::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockBalances::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockBalances::ItemId).uuid().not_null())
                        .col(ColumnDef::new(StockBalances::WarehouseId).uuid().not_null())
                        .col(ColumnDef::new(StockBalances::LocationId).uuid().null())
                        .col(
                            ColumnDef::new(StockBalances::Quantity)
                                .decimal_len(16, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockBalances::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(StockBalances::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockBalances::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One row per located stock key
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_balances_key")
                        .table(StockBalances::Table)
                        .col(StockBalances::ItemId)
                        .col(StockBalances::WarehouseId)
                        .col(StockBalances::LocationId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Unique indexes treat NULLs as distinct, so warehouse-level rows
            // (NULL location) need their own partial index
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_stock_balances_warehouse_key \
                     ON stock_balances (item_id, warehouse_id) WHERE location_id IS NULL",
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_balances_warehouse_id")
                        .table(StockBalances::Table)
                        .col(StockBalances::WarehouseId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockBalances::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockBalances {
        Table,
        Id,
        ItemId,
        WarehouseId,
        LocationId,
        Quantity,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_item_warehouse_configs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_item_warehouse_configs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ItemWarehouseConfigs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemWarehouseConfigs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ItemWarehouseConfigs::ItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ItemWarehouseConfigs::WarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ItemWarehouseConfigs::MinStock)
                                .decimal_len(16, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ItemWarehouseConfigs::ReorderPoint)
                                .decimal_len(16, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ItemWarehouseConfigs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ItemWarehouseConfigs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_warehouse_configs_key")
                        .table(ItemWarehouseConfigs::Table)
                        .col(ItemWarehouseConfigs::ItemId)
                        .col(ItemWarehouseConfigs::WarehouseId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ItemWarehouseConfigs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ItemWarehouseConfigs {
        Table,
        Id,
        ItemId,
        WarehouseId,
        MinStock,
        ReorderPoint,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_movements_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Movements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Movements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Movements::Code).string().null())
                        .col(
                            ColumnDef::new(Movements::MovementType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Movements::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Movements::AdjustmentDirection)
                                .string_len(32)
                                .null(),
                        )
                        .col(ColumnDef::new(Movements::OriginWarehouseId).uuid().null())
                        .col(ColumnDef::new(Movements::OriginLocationId).uuid().null())
                        .col(
                            ColumnDef::new(Movements::DestinationWarehouseId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Movements::DestinationLocationId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(Movements::Reference).string().null())
                        .col(ColumnDef::new(Movements::Reason).string().null())
                        .col(ColumnDef::new(Movements::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Movements::ApprovedBy).uuid().null())
                        .col(ColumnDef::new(Movements::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Movements::ConfirmedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Movements::CanceledAt).timestamp_with_time_zone().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movements_status")
                        .table(Movements::Table)
                        .col(Movements::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movements_movement_type")
                        .table(Movements::Table)
                        .col(Movements::MovementType)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movements_created_at")
                        .table(Movements::Table)
                        .col(Movements::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Movements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Movements {
        Table,
        Id,
        Code,
        MovementType,
        Status,
        AdjustmentDirection,
        OriginWarehouseId,
        OriginLocationId,
        DestinationWarehouseId,
        DestinationLocationId,
        Reference,
        Reason,
        CreatedBy,
        ApprovedBy,
        CreatedAt,
        ConfirmedAt,
        CanceledAt,
    }
}

mod m20240101_000007_create_movement_lines_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_movement_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MovementLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MovementLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MovementLines::MovementId).uuid().not_null())
                        .col(
                            ColumnDef::new(MovementLines::LineNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MovementLines::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(MovementLines::Quantity)
                                .decimal_len(16, 3)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovementLines::UnitCost)
                                .decimal_len(16, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MovementLines::TotalCost)
                                .decimal_len(16, 2)
                                .null(),
                        )
                        .col(ColumnDef::new(MovementLines::Notes).string().null())
                        .col(
                            ColumnDef::new(MovementLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movement_lines_movement_id")
                        .table(MovementLines::Table)
                        .col(MovementLines::MovementId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movement_lines_item_id")
                        .table(MovementLines::Table)
                        .col(MovementLines::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MovementLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MovementLines {
        Table,
        Id,
        MovementId,
        LineNumber,
        ItemId,
        Quantity,
        UnitCost,
        TotalCost,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000008_create_stock_alerts_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_stock_alerts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockAlerts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockAlerts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockAlerts::ItemId).uuid().not_null())
                        .col(ColumnDef::new(StockAlerts::WarehouseId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockAlerts::AlertType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAlerts::Quantity)
                                .decimal_len(16, 3)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAlerts::MinStock)
                                .decimal_len(16, 3)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAlerts::ReorderPoint)
                                .decimal_len(16, 3)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAlerts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_alerts_warehouse_id")
                        .table(StockAlerts::Table)
                        .col(StockAlerts::WarehouseId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockAlerts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockAlerts {
        Table,
        Id,
        ItemId,
        WarehouseId,
        AlertType,
        Quantity,
        MinStock,
        ReorderPoint,
        CreatedAt,
    }
}

mod m20240101_000009_create_audit_logs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_audit_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AuditLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AuditLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AuditLogs::EntityType).string().not_null())
                        .col(ColumnDef::new(AuditLogs::EntityId).uuid().not_null())
                        .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                        .col(ColumnDef::new(AuditLogs::DataBefore).json().null())
                        .col(ColumnDef::new(AuditLogs::DataAfter).json().null())
                        .col(ColumnDef::new(AuditLogs::UserId).uuid().null())
                        .col(ColumnDef::new(AuditLogs::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_audit_logs_entity")
                        .table(AuditLogs::Table)
                        .col(AuditLogs::EntityType)
                        .col(AuditLogs::EntityId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AuditLogs {
        Table,
        Id,
        EntityType,
        EntityId,
        Action,
        DataBefore,
        DataAfter,
        UserId,
        CreatedAt,
    }
}
