//! HR vertical slice.
//!
//! Employees form a reporting hierarchy through their direct reports. The hierarchy is
//! stored as an edge table and may contain shared reports or cycles; [`reporting`]
//! counts every employee below a subject exactly once regardless.

pub mod chart;
pub mod error;
pub mod model;
pub mod plan;
pub mod reporting;
pub mod seed;
pub mod store;

pub use error::{HrError, HrResult};
pub use model::{
    Compensation, CompensationInput, Employee, EmployeeInput, ReportingStructure, Salary,
};
pub use reporting::ReportingStructureCalculator;
