//! Flattening of nested employee writes.
//!
//! A create or replace request is a tree of [`EmployeeInput`]. Before touching the
//! database it is turned into a flat [`WritePlan`]: the records to insert or update,
//! the identifiers that must already exist, and the report lists to replace.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    error::{HrError, HrResult},
    model::EmployeeInput,
};

const MAX_NAME_LEN: usize = 128;

/// Validated attributes of one employee to insert or update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeFields {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub department: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WritePlan {
    pub root: Uuid,
    /// One entry per identifier; a later record for the same identifier wins.
    pub upserts: Vec<EmployeeFields>,
    /// Identifiers referenced without attributes.
    pub references: Vec<Uuid>,
    /// Report lists to replace, applied in order.
    pub links: Vec<(Uuid, Vec<Uuid>)>,
}

impl WritePlan {
    /// Plan for a new employee; the identifier is generated when absent.
    pub fn for_create(input: EmployeeInput) -> HrResult<Self> {
        require_record(&input)?;
        Self::build(input)
    }

    /// Plan for overwriting employee `id`. The path identifier replaces any identifier
    /// in the body, and a missing report list clears the employee's reports.
    pub fn for_replace(id: Uuid, mut input: EmployeeInput) -> HrResult<Self> {
        require_record(&input)?;
        input.employee_id = Some(id);
        input.direct_reports.get_or_insert_with(Vec::new);
        Self::build(input)
    }

    /// Every identifier the plan writes as a record.
    pub fn upserted_ids(&self) -> HashSet<Uuid> {
        self.upserts.iter().map(|fields| fields.id).collect()
    }

    fn build(input: EmployeeInput) -> HrResult<Self> {
        let mut builder = PlanBuilder::default();
        let root = builder.visit(input)?;
        Ok(Self {
            root,
            upserts: builder.upserts,
            references: builder.references,
            links: builder.links,
        })
    }
}

#[derive(Default)]
struct PlanBuilder {
    upserts: Vec<EmployeeFields>,
    positions: HashMap<Uuid, usize>,
    references: Vec<Uuid>,
    links: Vec<(Uuid, Vec<Uuid>)>,
}

impl PlanBuilder {
    // Nesting comes from request bodies, which the JSON parser already bounds.
    fn visit(&mut self, input: EmployeeInput) -> HrResult<Uuid> {
        let id = match (input.employee_id, input.has_fields()) {
            (Some(id), _) => id,
            (None, true) => Uuid::new_v4(),
            (None, false) => {
                return Err(HrError::invalid(
                    "direct report needs an employeeId or employee details",
                ));
            }
        };

        if input.has_fields() {
            let fields = EmployeeFields {
                id,
                first_name: required_text("firstName", input.first_name)?,
                last_name: required_text("lastName", input.last_name)?,
                position: optional_text("position", input.position)?,
                department: optional_text("department", input.department)?,
            };
            match self.positions.get(&id) {
                Some(&index) => self.upserts[index] = fields,
                None => {
                    self.positions.insert(id, self.upserts.len());
                    self.upserts.push(fields);
                }
            }
        } else if !self.references.contains(&id) {
            self.references.push(id);
        }

        if let Some(reports) = input.direct_reports {
            let mut ordered = Vec::with_capacity(reports.len());
            for report in reports {
                let report_id = self.visit(report)?;
                if !ordered.contains(&report_id) {
                    ordered.push(report_id);
                }
            }
            self.links.push((id, ordered));
        }

        Ok(id)
    }
}

fn require_record(input: &EmployeeInput) -> HrResult<()> {
    if input.has_fields() {
        Ok(())
    } else {
        Err(HrError::invalid("employee details are required"))
    }
}

fn required_text(field: &str, value: Option<String>) -> HrResult<String> {
    let value = optional_text(field, value)?;
    if value.is_empty() {
        return Err(HrError::invalid(format!("{field} is required")));
    }
    Ok(value)
}

fn optional_text(field: &str, value: Option<String>) -> HrResult<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.chars().count() > MAX_NAME_LEN {
        return Err(HrError::invalid(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(first: &str) -> EmployeeInput {
        EmployeeInput::record(None, first, "Tester", "Engineer", "Engineering")
    }

    #[test]
    fn create_generates_identifier_and_trims_fields() {
        let mut input = record("  Debbie ");
        input.position = None;
        let plan = WritePlan::for_create(input).unwrap();
        assert_eq!(plan.upserts.len(), 1);
        let fields = &plan.upserts[0];
        assert_eq!(fields.id, plan.root);
        assert_eq!(fields.first_name, "Debbie");
        assert_eq!(fields.position, "");
        assert!(plan.links.is_empty());
    }

    #[test]
    fn create_requires_names() {
        let err = WritePlan::for_create(EmployeeInput::reference(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(_)));

        let mut input = record("Debbie");
        input.last_name = Some("   ".into());
        let err = WritePlan::for_create(input).unwrap_err();
        assert_eq!(err.to_string(), "lastName is required");
    }

    #[test]
    fn nested_records_and_references_are_flattened() {
        let existing = Uuid::new_v4();
        let input = record("Lead").with_reports(vec![
            record("New").with_reports(vec![EmployeeInput::reference(existing)]),
            EmployeeInput::reference(existing),
        ]);
        let plan = WritePlan::for_create(input).unwrap();

        assert_eq!(plan.upserts.len(), 2);
        assert_eq!(plan.references, vec![existing]);
        let new_id = plan.upserts[1].id;
        assert_eq!(
            plan.links,
            vec![
                (new_id, vec![existing]),
                (plan.root, vec![new_id, existing]),
            ]
        );
    }

    #[test]
    fn replace_forces_path_identifier_and_clears_reports() {
        let id = Uuid::new_v4();
        let mut input = record("Pete");
        input.employee_id = Some(Uuid::new_v4());
        let plan = WritePlan::for_replace(id, input).unwrap();
        assert_eq!(plan.root, id);
        assert_eq!(plan.upserts[0].id, id);
        assert_eq!(plan.links, vec![(id, vec![])]);
    }

    #[test]
    fn nested_entry_without_reports_keeps_stored_reports() {
        let child = Uuid::new_v4();
        let input = record("Lead").with_reports(vec![EmployeeInput::record(
            Some(child),
            "Child",
            "Tester",
            "Engineer",
            "Engineering",
        )]);
        let plan = WritePlan::for_create(input).unwrap();
        assert!(plan.links.iter().all(|(manager, _)| *manager != child));
    }

    #[test]
    fn duplicate_reports_keep_first_position() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let input = record("Lead").with_reports(vec![
            EmployeeInput::reference(a),
            EmployeeInput::reference(b),
            EmployeeInput::reference(a),
        ]);
        let plan = WritePlan::for_create(input).unwrap();
        assert_eq!(plan.links, vec![(plan.root, vec![a, b])]);
        assert_eq!(plan.references, vec![a, b]);
    }

    #[test]
    fn later_record_for_same_identifier_wins() {
        let shared = Uuid::new_v4();
        let input = record("Lead").with_reports(vec![
            EmployeeInput::record(Some(shared), "First", "Copy", "", ""),
            EmployeeInput::record(Some(shared), "Second", "Copy", "", ""),
        ]);
        let plan = WritePlan::for_create(input).unwrap();
        assert_eq!(plan.upserts.len(), 2);
        assert_eq!(plan.upserts[1].first_name, "Second");
    }

    #[test]
    fn anonymous_reference_is_rejected() {
        let input = record("Lead").with_reports(vec![EmployeeInput::default()]);
        assert!(WritePlan::for_create(input).is_err());
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let mut input = record("Lead");
        input.department = Some("x".repeat(MAX_NAME_LEN + 1));
        let err = WritePlan::for_create(input).unwrap_err();
        assert_eq!(err.to_string(), "department must be at most 128 characters");
    }
}
