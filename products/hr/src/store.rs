use std::collections::{HashMap, HashSet};

use chrono::Utc;
use entity::{compensation, direct_report, employee};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    SqlErr, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    chart::OrgChart,
    error::{HrError, HrResult},
    model::{Compensation, CompensationInput, Employee, EmployeeInput, ReportingStructure, Salary},
    plan::{EmployeeFields, WritePlan},
    reporting::ReportingStructureCalculator,
};

/// Loads employee `id` with its reports down to `depth` levels (0 loads the employee
/// alone). `None` when the employee does not exist.
#[instrument(name = "hr.employees.find", skip(db))]
pub async fn find_employee<C>(db: &C, id: Uuid, depth: usize) -> HrResult<Option<Employee>>
where
    C: ConnectionTrait,
{
    let chart = load_chart(db, id, depth).await?;
    Ok(chart.map(OrgChart::into_tree))
}

/// Loads the reporting graph below `id` breadth first, one level per round trip.
pub async fn load_chart<C>(db: &C, id: Uuid, depth: usize) -> HrResult<Option<OrgChart>>
where
    C: ConnectionTrait,
{
    let Some(root) = employee::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut chart = OrgChart::new(root.into());
    let mut frontier = vec![id];

    for level in 1..=depth {
        if frontier.is_empty() {
            break;
        }
        let edges = direct_report::Entity::find()
            .filter(direct_report::Column::ManagerId.is_in(frontier.clone()))
            .order_by_asc(direct_report::Column::Ordinal)
            .all(db)
            .await?;

        let mut by_manager: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut unseen = Vec::new();
        let mut queued = HashSet::new();
        for edge in edges {
            by_manager
                .entry(edge.manager_id)
                .or_default()
                .push(edge.report_id);
            if !chart.contains(&edge.report_id) && queued.insert(edge.report_id) {
                unseen.push(edge.report_id);
            }
        }
        for manager in &frontier {
            chart.link(*manager, by_manager.remove(manager).unwrap_or_default());
        }
        if unseen.is_empty() {
            break;
        }

        let mut loaded: HashMap<Uuid, employee::Model> = employee::Entity::find()
            .filter(employee::Column::Id.is_in(unseen.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|model| (model.id, model))
            .collect();
        frontier = unseen
            .into_iter()
            .filter_map(|report| loaded.remove(&report))
            .map(|model| {
                let id = model.id;
                chart.insert(model.into(), level);
                id
            })
            .collect();
        debug!(level, loaded = frontier.len(), "reporting level loaded");
    }

    Ok(Some(chart))
}

/// Loads `id` down to `depth` levels and counts everyone below it.
#[instrument(name = "hr.employees.reporting_structure", skip(db))]
pub async fn reporting_structure<C>(
    db: &C,
    id: Uuid,
    depth: usize,
) -> HrResult<Option<ReportingStructure>>
where
    C: ConnectionTrait,
{
    let Some(employee) = find_employee(db, id, depth).await? else {
        return Ok(None);
    };
    ReportingStructureCalculator::new()
        .compute(Some(employee))
        .map(Some)
}

/// Inserts a new employee and any nested reports in one transaction.
#[instrument(name = "hr.employees.create", skip_all)]
pub async fn create_employee(db: &DatabaseConnection, input: EmployeeInput) -> HrResult<Employee> {
    let plan = WritePlan::for_create(input)?;
    apply_plan(db, &plan, PlanMode::Create).await?;
    find_employee(db, plan.root, 1)
        .await?
        .ok_or(HrError::EmployeeNotFound(plan.root))
}

/// Overwrites employee `id` and replaces its report list.
#[instrument(name = "hr.employees.replace", skip(db, input))]
pub async fn replace_employee(
    db: &DatabaseConnection,
    id: Uuid,
    input: EmployeeInput,
) -> HrResult<Employee> {
    let plan = WritePlan::for_replace(id, input)?;
    apply_plan(db, &plan, PlanMode::Replace).await?;
    find_employee(db, id, 1)
        .await?
        .ok_or(HrError::EmployeeNotFound(id))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlanMode {
    Create,
    Replace,
}

async fn apply_plan(db: &DatabaseConnection, plan: &WritePlan, mode: PlanMode) -> HrResult<()> {
    let txn = db.begin().await?;

    let upserted = plan.upserted_ids();
    let mut wanted: Vec<Uuid> = upserted.iter().copied().collect();
    wanted.extend(plan.references.iter().copied());
    let existing: HashSet<Uuid> = employee::Entity::find()
        .filter(employee::Column::Id.is_in(wanted))
        .all(&txn)
        .await?
        .into_iter()
        .map(|model| model.id)
        .collect();

    match mode {
        PlanMode::Create if existing.contains(&plan.root) => {
            return Err(HrError::DuplicateEmployee(plan.root));
        }
        PlanMode::Replace if !existing.contains(&plan.root) => {
            return Err(HrError::EmployeeNotFound(plan.root));
        }
        _ => {}
    }
    if let Some(unknown) = plan
        .references
        .iter()
        .find(|id| !existing.contains(id) && !upserted.contains(id))
    {
        return Err(HrError::UnknownEmployee(*unknown));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    for fields in &plan.upserts {
        if existing.contains(&fields.id) {
            update_employee(&txn, fields, now).await?;
        } else {
            insert_employee(&txn, fields, now).await?;
        }
    }
    for (manager, reports) in &plan.links {
        replace_reports(&txn, *manager, reports).await?;
    }

    txn.commit().await?;
    debug!(
        root = %plan.root,
        upserts = plan.upserts.len(),
        links = plan.links.len(),
        "employee plan applied"
    );
    Ok(())
}

async fn insert_employee<C>(db: &C, fields: &EmployeeFields, now: DateTimeWithTimeZone) -> HrResult<()>
where
    C: ConnectionTrait,
{
    let active = employee::ActiveModel {
        id: Set(fields.id),
        first_name: Set(fields.first_name.clone()),
        last_name: Set(fields.last_name.clone()),
        position: Set(fields.position.clone()),
        department: Set(fields.department.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    employee::Entity::insert(active)
        .exec_without_returning(db)
        .await
        .map_err(|err| duplicate_or_db(err, fields.id))?;
    Ok(())
}

// A concurrent writer can insert the same identifier between the existence check and
// this insert.
fn duplicate_or_db(err: DbErr, id: Uuid) -> HrError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => HrError::DuplicateEmployee(id),
        _ => HrError::Db(err),
    }
}

async fn update_employee<C>(db: &C, fields: &EmployeeFields, now: DateTimeWithTimeZone) -> HrResult<()>
where
    C: ConnectionTrait,
{
    let active = employee::ActiveModel {
        id: Unchanged(fields.id),
        first_name: Set(fields.first_name.clone()),
        last_name: Set(fields.last_name.clone()),
        position: Set(fields.position.clone()),
        department: Set(fields.department.clone()),
        created_at: NotSet,
        updated_at: Set(now),
    };
    active.update(db).await?;
    Ok(())
}

async fn replace_reports<C>(db: &C, manager: Uuid, reports: &[Uuid]) -> HrResult<()>
where
    C: ConnectionTrait,
{
    direct_report::Entity::delete_many()
        .filter(direct_report::Column::ManagerId.eq(manager))
        .exec(db)
        .await?;
    if reports.is_empty() {
        return Ok(());
    }
    let edges = reports
        .iter()
        .enumerate()
        .map(|(ordinal, report)| direct_report::ActiveModel {
            manager_id: Set(manager),
            report_id: Set(*report),
            ordinal: Set(ordinal as i32),
        });
    direct_report::Entity::insert_many(edges)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Records a compensation for an existing employee.
#[instrument(name = "hr.compensation.create", skip_all)]
pub async fn create_compensation<C>(db: &C, input: CompensationInput) -> HrResult<Compensation>
where
    C: ConnectionTrait,
{
    let employee_id = input
        .employee
        .employee_id
        .ok_or_else(|| HrError::invalid("compensation requires employee.employeeId"))?;
    let employee = employee::Entity::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or(HrError::UnknownEmployee(employee_id))?;

    let active = compensation::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(employee_id),
        salary_cents: Set(input.salary.cents()),
        effective_date: Set(input.effective_date),
        created_at: Set(Utc::now().into()),
    };
    compensation::Entity::insert(active)
        .exec_without_returning(db)
        .await?;
    debug!(%employee_id, salary = %input.salary, "compensation recorded");

    Ok(Compensation {
        employee: employee.into(),
        salary: input.salary,
        effective_date: input.effective_date,
    })
}

/// The compensation with the latest effective date for `employee_id`.
#[instrument(name = "hr.compensation.find", skip(db))]
pub async fn find_compensation<C>(db: &C, employee_id: Uuid) -> HrResult<Option<Compensation>>
where
    C: ConnectionTrait,
{
    let Some(employee) = employee::Entity::find_by_id(employee_id).one(db).await? else {
        return Ok(None);
    };
    let latest = compensation::Entity::find()
        .filter(compensation::Column::EmployeeId.eq(employee_id))
        .order_by_desc(compensation::Column::EffectiveDate)
        .order_by_desc(compensation::Column::CreatedAt)
        .one(db)
        .await?;
    let Some(record) = latest else {
        return Ok(None);
    };
    Ok(Some(Compensation {
        employee: employee.into(),
        salary: Salary::from_cents(record.salary_cents)?,
        effective_date: record.effective_date,
    }))
}

#[cfg(test)]
mod tests {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use super::*;

    #[tokio::test]
    async fn racing_insert_reports_duplicate() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let fields = EmployeeFields {
            id: Uuid::new_v4(),
            first_name: "Debbie".into(),
            last_name: "Downer".into(),
            position: "Developer".into(),
            department: "Engineering".into(),
        };
        let now: DateTimeWithTimeZone = Utc::now().into();

        insert_employee(&db, &fields, now).await.unwrap();
        let err = insert_employee(&db, &fields, now).await.unwrap_err();
        assert!(matches!(err, HrError::DuplicateEmployee(id) if id == fields.id));
    }
}
