//! Validation and reporting.

pub mod report;
pub mod validator;
