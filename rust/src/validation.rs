//! Input checks applied before a run reaches the engine.
//!
//! The engine itself assumes well-formed input: dates are already `NaiveDate`,
//! duty codes are already `DutyType`, priorities are in range. Callers turn
//! raw text into those types here.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::models::{Employee, EmployeeId};

/// Textual date format accepted at the boundary.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Rejected input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Malformed date {0:?}: expected DD.MM.YYYY")]
    MalformedDate(String),
    #[error("Duty type {0} out of range (expected 1..=7)")]
    DutyTypeOutOfRange(i64),
    #[error("Employee list is empty")]
    EmptyRoster,
    #[error("Priority {priority} of employee {id} out of range (expected 0..=10)")]
    PriorityOutOfRange { id: EmployeeId, priority: i32 },
    #[error("Duplicate employee id: {0}")]
    DuplicateEmployeeId(EmployeeId),
}

/// Parse a single `DD.MM.YYYY` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::MalformedDate(trimmed.to_string()))
}

/// Parse a comma-separated list of `DD.MM.YYYY` dates.
///
/// Blank entries are skipped; any malformed entry rejects the whole list.
pub fn parse_date_list(text: &str) -> Result<Vec<NaiveDate>, ValidationError> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_date)
        .collect()
}

/// Check the roster as a whole: non-empty, ids unique.
pub fn validate_roster(employees: &[Employee]) -> Result<(), ValidationError> {
    if employees.is_empty() {
        return Err(ValidationError::EmptyRoster);
    }
    check_unique_ids(employees)
}

/// Reject a roster in which two employees share an id.
pub fn check_unique_ids(employees: &[Employee]) -> Result<(), ValidationError> {
    let mut seen: FxHashSet<EmployeeId> = FxHashSet::default();
    for employee in employees {
        if !seen.insert(employee.id) {
            return Err(ValidationError::DuplicateEmployeeId(employee.id));
        }
    }
    Ok(())
}
