use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::info;
use uuid::Uuid;

use crate::{error::HrResult, model::EmployeeInput, store};

pub const JOHN_LENNON: Uuid = Uuid::from_u128(0x16a596ae_edd3_4847_99fe_c4518e82c86f);
pub const PAUL_MCCARTNEY: Uuid = Uuid::from_u128(0xb7839309_3348_463b_a7e3_5de1c168beb3);
pub const RINGO_STARR: Uuid = Uuid::from_u128(0x03aa1462_ffa9_4978_901b_7c001562cf6f);
pub const PETE_BEST: Uuid = Uuid::from_u128(0x62c1084e_6e34_4630_93fd_9153afb65309);
pub const GEORGE_HARRISON: Uuid = Uuid::from_u128(0xc0c2293d_16bd_4603_8e08_638a9d18b22c);

/// The demo hierarchy: John leads Paul and Ringo, Ringo leads Pete and George.
pub fn demo_hierarchy() -> EmployeeInput {
    let engineer = |id, first: &str, last: &str, position: &str| {
        EmployeeInput::record(Some(id), first, last, position, "Engineering")
    };
    engineer(JOHN_LENNON, "John", "Lennon", "Development Manager").with_reports(vec![
        engineer(PAUL_MCCARTNEY, "Paul", "McCartney", "Developer I").with_reports(vec![]),
        engineer(RINGO_STARR, "Ringo", "Starr", "Developer V").with_reports(vec![
            engineer(PETE_BEST, "Pete", "Best", "Developer II").with_reports(vec![]),
            engineer(GEORGE_HARRISON, "George", "Harrison", "Developer III").with_reports(vec![]),
        ]),
    ])
}

/// Inserts [`demo_hierarchy`] unless its root already exists. Returns whether rows
/// were written.
pub async fn seed_demo(db: &DatabaseConnection) -> HrResult<bool> {
    if entity::employee::Entity::find_by_id(JOHN_LENNON)
        .one(db)
        .await?
        .is_some()
    {
        info!("demo hierarchy already present");
        return Ok(false);
    }
    let root = store::create_employee(db, demo_hierarchy()).await?;
    info!(employee_id = %root.employee_id, "demo hierarchy seeded");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::WritePlan;

    #[test]
    fn demo_hierarchy_plans_five_employees() {
        let plan = WritePlan::for_create(demo_hierarchy()).unwrap();
        assert_eq!(plan.root, JOHN_LENNON);
        assert_eq!(plan.upserts.len(), 5);
        assert!(plan.references.is_empty());
        assert!(
            plan.links
                .contains(&(RINGO_STARR, vec![PETE_BEST, GEORGE_HARRISON]))
        );
    }
}
