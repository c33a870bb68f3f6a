//! SeaORM entities for the HR schema.

pub mod compensation;
pub mod direct_report;
pub mod employee;
