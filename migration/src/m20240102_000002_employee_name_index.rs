use sea_orm_migration::prelude::*;

use crate::m20240101_000001_employees::Employees;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employees_name")
                    .table(Employees::Table)
                    .col(Employees::FirstName)
                    .col(Employees::LastName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_employees_name")
                    .table(Employees::Table)
                    .to_owned(),
            )
            .await
    }
}
