use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum EmergencyRequests {
    Table,
    Id,
    FullName,
    PhoneNumber,
    Longitude,
    Latitude,
    Address,
    Status,
    Priority,
    Notes,
    AssignedTo,
    ResponseTime,
    ResolvedAt,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmergencyRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmergencyRequests::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmergencyRequests::FullName).string_len(100).not_null())
                    .col(ColumnDef::new(EmergencyRequests::PhoneNumber).string_len(17).not_null())
                    .col(ColumnDef::new(EmergencyRequests::Longitude).double().not_null())
                    .col(ColumnDef::new(EmergencyRequests::Latitude).double().not_null())
                    .col(ColumnDef::new(EmergencyRequests::Address).string_len(200).null())
                    .col(
                        ColumnDef::new(EmergencyRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(EmergencyRequests::Priority)
                            .string_len(16)
                            .not_null()
                            .default("high"),
                    )
                    .col(ColumnDef::new(EmergencyRequests::Notes).string_len(500).null())
                    .col(ColumnDef::new(EmergencyRequests::AssignedTo).string().null())
                    .col(ColumnDef::new(EmergencyRequests::ResponseTime).big_integer().null())
                    .col(
                        ColumnDef::new(EmergencyRequests::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EmergencyRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmergencyRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_emergency_requests_status_created")
                    .table(EmergencyRequests::Table)
                    .col(EmergencyRequests::Status)
                    .col(EmergencyRequests::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_emergency_requests_location")
                    .table(EmergencyRequests::Table)
                    .col(EmergencyRequests::Latitude)
                    .col(EmergencyRequests::Longitude)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmergencyRequests::Table).to_owned())
            .await
    }
}
