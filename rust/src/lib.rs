//! Duty roster engine with a Python binding.
//!
//! Assigns employees to dated duty instances under hard eligibility rules
//! (vacation, multi-day quota, date occupancy including rest days) and a
//! soft preference score, and reports why any duty stayed unassigned.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

mod config;
pub mod logging;
mod models;
pub mod roster;
pub mod validation;

pub use config::RosterConfig;
pub use models::{
    Assignment, DutyCalendar, DutyRequest, DutyType, Employee, EmployeeId, UnassignedDuty,
    UnassignedReason, MAX_PRIORITY,
};
pub use roster::{
    DailyCoverage, DutyScheduler, EmployeeStats, QuotaUsage, RosterError, RosterStatistics,
    RosterTotals, ScheduleOutcome,
};
pub use validation::{
    check_unique_ids, parse_date, parse_date_list, validate_roster, ValidationError,
};

impl From<ValidationError> for PyErr {
    fn from(err: ValidationError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

impl From<RosterError> for PyErr {
    fn from(err: RosterError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Employee record as passed in from Python.
#[pyclass(name = "Employee")]
#[derive(Clone, Debug)]
pub struct PyEmployee {
    #[pyo3(get, set)]
    pub id: EmployeeId,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub priority: i32,
    #[pyo3(get, set)]
    pub vacation_dates: Vec<NaiveDate>,
    #[pyo3(get, set)]
    pub preferred_exclusion_dates: Vec<NaiveDate>,
}

#[pymethods]
impl PyEmployee {
    #[new]
    #[pyo3(signature = (
        id,
        name,
        priority=0,
        vacation_dates=None,
        preferred_exclusion_dates=None
    ))]
    fn new(
        id: EmployeeId,
        name: String,
        priority: i32,
        vacation_dates: Option<Vec<NaiveDate>>,
        preferred_exclusion_dates: Option<Vec<NaiveDate>>,
    ) -> Self {
        Self {
            id,
            name,
            priority,
            vacation_dates: vacation_dates.unwrap_or_default(),
            preferred_exclusion_dates: preferred_exclusion_dates.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Employee(id={}, name={:?}, priority={}, vacation_days={})",
            self.id,
            self.name,
            self.priority,
            self.vacation_dates.len()
        )
    }
}

impl TryFrom<PyEmployee> for Employee {
    type Error = ValidationError;

    fn try_from(py: PyEmployee) -> Result<Self, Self::Error> {
        Ok(Employee::new(py.id, py.name, py.priority)?
            .with_vacation(py.vacation_dates)
            .with_preferred_exclusions(py.preferred_exclusion_dates))
    }
}

/// One run's outcome, kept alive on the Python side for inspection and edits.
#[pyclass(name = "ScheduleResult")]
pub struct PyScheduleResult {
    outcome: ScheduleOutcome,
}

#[pymethods]
impl PyScheduleResult {
    #[getter]
    fn assignments(&self) -> Vec<Assignment> {
        self.outcome.assignments().to_vec()
    }

    #[getter]
    fn unassigned(&self) -> Vec<UnassignedDuty> {
        self.outcome.unassigned().to_vec()
    }

    fn statistics(&self) -> RosterStatistics {
        self.outcome.statistics()
    }

    /// Move assignment `index` to `employee_id`; raises ValueError if not allowed.
    fn reassign(&mut self, index: usize, employee_id: EmployeeId) -> PyResult<()> {
        Ok(self.outcome.reassign(index, employee_id)?)
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(assigned={}, unassigned={})",
            self.outcome.assignments().len(),
            self.outcome.unassigned().len()
        )
    }
}

/// Assign duties to employees.
///
/// # Arguments
/// * `employees` - Roster; must be non-empty with unique ids
/// * `calendar` - Dict mapping date to a list of duty-type codes (1-7)
/// * `config` - Scoring and tie-break configuration (defaults if omitted)
///
/// # Raises
/// * ValueError on an empty roster, duplicate ids, out-of-range priorities or
///   duty codes, or an invalid configuration
#[pyfunction]
#[pyo3(signature = (employees, calendar, config=None))]
fn schedule_duties(
    py: Python<'_>,
    employees: Vec<PyEmployee>,
    calendar: HashMap<NaiveDate, Vec<i64>>,
    config: Option<RosterConfig>,
) -> PyResult<PyScheduleResult> {
    let employees = employees
        .into_iter()
        .map(Employee::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    validate_roster(&employees)?;
    let calendar = DutyCalendar::from_codes(calendar)?;

    let scheduler = DutyScheduler::new(employees, &calendar, config.unwrap_or_default())?;
    let outcome = py.allow_threads(|| scheduler.schedule())?;
    Ok(PyScheduleResult { outcome })
}

/// Parse a comma-separated `DD.MM.YYYY` list into dates.
///
/// # Raises
/// * ValueError if any entry is malformed
#[pyfunction]
fn parse_dates(text: &str) -> PyResult<Vec<NaiveDate>> {
    Ok(parse_date_list(text)?)
}

/// The duty_roster.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Input types
    m.add_class::<PyEmployee>()?;
    m.add_class::<RosterConfig>()?;

    // Result types
    m.add_class::<Assignment>()?;
    m.add_class::<UnassignedDuty>()?;
    m.add_class::<EmployeeStats>()?;
    m.add_class::<RosterTotals>()?;
    m.add_class::<QuotaUsage>()?;
    m.add_class::<DailyCoverage>()?;
    m.add_class::<RosterStatistics>()?;
    m.add_class::<PyScheduleResult>()?;

    // Functions
    m.add_function(wrap_pyfunction!(schedule_duties, m)?)?;
    m.add_function(wrap_pyfunction!(parse_dates, m)?)?;

    Ok(())
}
