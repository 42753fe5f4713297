use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Homeworks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Homeworks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Homeworks::StudentId).integer().not_null())
                    .col(ColumnDef::new(Homeworks::ParentId).integer())
                    .col(ColumnDef::new(Homeworks::Subject).string().not_null())
                    .col(ColumnDef::new(Homeworks::ImagePath).string())
                    .col(
                        ColumnDef::new(Homeworks::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Homeworks::TeacherNote).text())
                    .col(ColumnDef::new(Homeworks::ReviewedBy).integer())
                    .col(
                        ColumnDef::new(Homeworks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Homeworks::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Homeworks::Table, Homeworks::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Homeworks::Table, Homeworks::ParentId)
                            .to(Parents::Table, Parents::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Homeworks::Table, Homeworks::ReviewedBy)
                            .to(StaffUsers::Table, StaffUsers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing filters by status and parent; both are hot paths.
        manager
            .create_index(
                Index::create()
                    .table(Homeworks::Table)
                    .col(Homeworks::Status)
                    .name("idx_homeworks_status")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Homeworks::Table)
                    .col(Homeworks::ParentId)
                    .name("idx_homeworks_parent_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Homeworks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Homeworks {
    Table,
    Id,
    StudentId,
    ParentId,
    Subject,
    ImagePath,
    Status,
    TeacherNote,
    ReviewedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
}

#[derive(Iden)]
enum Parents {
    Table,
    Id,
}

#[derive(Iden)]
enum StaffUsers {
    Table,
    Id,
}
