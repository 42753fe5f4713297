use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StaffUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StaffUsers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StaffUsers::FullName).string().not_null())
                    .col(
                        ColumnDef::new(StaffUsers::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(StaffUsers::CredentialHash).string().not_null())
                    .col(ColumnDef::new(StaffUsers::Role).small_integer().not_null())
                    .col(
                        ColumnDef::new(StaffUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StaffUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StaffUsers {
    Table,
    Id,
    FullName,
    Username,
    CredentialHash,
    Role,
    CreatedAt,
}
