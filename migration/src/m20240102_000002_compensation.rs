use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Employee { Table, Id }

#[derive(DeriveIden)]
enum Compensation { Table, Id, EmployeeId, SalaryCents, EffectiveDate, CreatedAt }

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Compensation::Table)
                .if_not_exists()
                .col(ColumnDef::new(Compensation::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Compensation::EmployeeId).uuid().not_null())
                .col(ColumnDef::new(Compensation::SalaryCents).big_integer().not_null())
                .col(ColumnDef::new(Compensation::EffectiveDate).date().not_null())
                .col(ColumnDef::new(Compensation::CreatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(ForeignKey::create()
                    .name("fk_compensation_employee")
                    .from(Compensation::Table, Compensation::EmployeeId)
                    .to(Employee::Table, Employee::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .name("idx_compensation_employee_effective")
                .table(Compensation::Table)
                .col(Compensation::EmployeeId)
                .col(Compensation::EffectiveDate)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Compensation::Table).to_owned()).await?;
        Ok(())
    }
}
