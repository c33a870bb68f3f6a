use std::fmt;

use chrono::NaiveDate;
use entity::employee;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HrError;

/// An employee together with whatever part of its reporting subtree was loaded.
///
/// Nested reports are full values. The same identifier may appear more than once in
/// one tree (shared reports, cycles cut short by the loader); readers key on
/// `employee_id`, never on position in the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub direct_reports: Vec<Employee>,
}

impl Employee {
    pub fn new(
        employee_id: Uuid,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        position: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            employee_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            position: position.into(),
            department: department.into(),
            direct_reports: Vec::new(),
        }
    }

    pub fn with_reports(mut self, reports: Vec<Employee>) -> Self {
        self.direct_reports = reports;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<employee::Model> for Employee {
    fn from(model: employee::Model) -> Self {
        Self {
            employee_id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            position: model.position,
            department: model.department,
            direct_reports: Vec::new(),
        }
    }
}

/// Write-side shape of an employee.
///
/// At the top level of a request it describes the employee being created or replaced.
/// Inside `direct_reports` an entry carrying only `employee_id` references an existing
/// employee; an entry carrying names is inserted or updated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_reports: Option<Vec<EmployeeInput>>,
}

impl EmployeeInput {
    pub fn reference(employee_id: Uuid) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Self::default()
        }
    }

    pub fn record(
        employee_id: Option<Uuid>,
        first_name: &str,
        last_name: &str,
        position: &str,
        department: &str,
    ) -> Self {
        Self {
            employee_id,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            position: Some(position.to_string()),
            department: Some(department.to_string()),
            direct_reports: None,
        }
    }

    pub fn with_reports(mut self, reports: Vec<EmployeeInput>) -> Self {
        self.direct_reports = Some(reports);
        self
    }

    /// True when the entry carries any employee attribute.
    pub fn has_fields(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.position.is_some()
            || self.department.is_some()
    }
}

/// A salary with two-place precision, held as integer cents.
///
/// On the wire it is a plain JSON number such as `92500.5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Salary {
    cents: i64,
}

// Largest cent amount that survives the trip through an f64 unchanged.
const MAX_SALARY_CENTS: i64 = 9_007_199_254_740_991;

impl Salary {
    pub fn from_cents(cents: i64) -> Result<Self, HrError> {
        if !(0..=MAX_SALARY_CENTS).contains(&cents) {
            return Err(HrError::invalid(format!("salary {cents} cents out of range")));
        }
        Ok(Self { cents })
    }

    pub fn cents(self) -> i64 {
        self.cents
    }
}

impl TryFrom<f64> for Salary {
    type Error = HrError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(HrError::invalid(
                "salary must be a non-negative finite number",
            ));
        }
        let scaled = value * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(HrError::invalid(
                "salary must have at most two decimal places",
            ));
        }
        if rounded > MAX_SALARY_CENTS as f64 {
            return Err(HrError::invalid("salary out of range"));
        }
        Self::from_cents(rounded as i64)
    }
}

impl From<Salary> for f64 {
    fn from(value: Salary) -> Self {
        value.cents as f64 / 100.0
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compensation {
    pub employee: Employee,
    pub salary: Salary,
    pub effective_date: NaiveDate,
}

/// Request body for recording a compensation; only `employee.employeeId` is read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationInput {
    pub employee: EmployeeInput,
    pub salary: Salary,
    pub effective_date: NaiveDate,
}

/// An employee paired with the number of employees transitively reporting to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingStructure {
    pub employee: Employee,
    pub number_of_reports: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn salary_accepts_two_decimal_places() {
        let salary = Salary::try_from(92500.5).unwrap();
        assert_eq!(salary.cents(), 9_250_050);
        assert_eq!(salary.to_string(), "92500.50");
        assert_eq!(f64::from(salary), 92500.5);
    }

    #[test]
    fn salary_rejects_fractions_of_a_cent() {
        assert!(Salary::try_from(10.005).is_err());
        assert!(Salary::try_from(-1.0).is_err());
        assert!(Salary::try_from(f64::NAN).is_err());
        assert!(Salary::try_from(f64::INFINITY).is_err());
    }

    #[test]
    fn salary_is_a_json_number() {
        let salary: Salary = serde_json::from_value(json!(1234.56)).unwrap();
        assert_eq!(salary.cents(), 123_456);
        assert_eq!(serde_json::to_value(salary).unwrap(), json!(1234.56));
        assert!(serde_json::from_value::<Salary>(json!(0.001)).is_err());
    }

    #[test]
    fn employee_serializes_in_camel_case_without_empty_reports() {
        let id = Uuid::parse_str("16a596ae-edd3-4847-99fe-c4518e82c86f").unwrap();
        let employee = Employee::new(id, "John", "Lennon", "Development Manager", "Engineering");
        let value = serde_json::to_value(&employee).unwrap();
        assert_eq!(
            value,
            json!({
                "employeeId": "16a596ae-edd3-4847-99fe-c4518e82c86f",
                "firstName": "John",
                "lastName": "Lennon",
                "position": "Development Manager",
                "department": "Engineering",
            })
        );
    }

    #[test]
    fn employee_input_distinguishes_references_from_records() {
        let input: EmployeeInput = serde_json::from_value(json!({
            "employeeId": "b7839309-3348-463b-a7e3-5de1c168beb3"
        }))
        .unwrap();
        assert!(!input.has_fields());
        assert!(input.direct_reports.is_none());

        let record: EmployeeInput = serde_json::from_value(json!({
            "firstName": "Debbie",
            "lastName": "Downer",
            "directReports": []
        }))
        .unwrap();
        assert!(record.has_fields());
        assert_eq!(record.direct_reports, Some(vec![]));
    }
}
