use crate::employee;
use sea_orm::prelude::*;
use uuid::Uuid;

/// One edge of the reporting graph: `report_id` reports to `manager_id`.
///
/// Stored as an edge table rather than a `manager_id` column so that an employee may
/// appear under more than one manager.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "direct_report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub manager_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub report_id: Uuid,
    /// Position of the report in the manager's ordered list.
    pub ordinal: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "employee::Entity",
        from = "Column::ManagerId",
        to = "employee::Column::Id",
        on_delete = "Cascade"
    )]
    Manager,
    #[sea_orm(
        belongs_to = "employee::Entity",
        from = "Column::ReportId",
        to = "employee::Column::Id",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
