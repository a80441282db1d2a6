//! Aggregate numbers for a finished run.

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::BTreeMap;

use crate::models::EmployeeId;

use super::engine::ScheduleOutcome;

/// Per-employee figures, in roster order.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeStats {
    #[pyo3(get)]
    pub employee_id: EmployeeId,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub assigned_count: u32,
    #[pyo3(get)]
    pub remaining_quota: u32,
    #[pyo3(get)]
    pub occupied_days: usize,
    #[pyo3(get)]
    pub load: u32,
}

#[pymethods]
impl EmployeeStats {
    fn __repr__(&self) -> String {
        format!(
            "EmployeeStats(employee_id={}, assigned_count={}, remaining_quota={})",
            self.employee_id, self.assigned_count, self.remaining_quota
        )
    }
}

#[pyclass]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RosterTotals {
    #[pyo3(get)]
    pub total_employees: usize,
    #[pyo3(get)]
    pub total_assigned: usize,
    #[pyo3(get)]
    pub total_unassigned: usize,
    /// Always `total_assigned + total_unassigned`.
    #[pyo3(get)]
    pub total_requested: usize,
}

#[pymethods]
impl RosterTotals {
    fn __repr__(&self) -> String {
        format!(
            "RosterTotals(employees={}, assigned={}, unassigned={}, requested={})",
            self.total_employees, self.total_assigned, self.total_unassigned, self.total_requested
        )
    }
}

/// How much of the roster's multi-day quota the run consumed.
#[pyclass]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaUsage {
    /// employees * monthly quota
    #[pyo3(get)]
    pub total_slots: u64,
    #[pyo3(get)]
    pub used_slots: u64,
}

#[pymethods]
impl QuotaUsage {
    fn __repr__(&self) -> String {
        format!("QuotaUsage(used={}/{})", self.used_slots, self.total_slots)
    }
}

/// Requested vs. assigned duties on one date.
#[pyclass]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyCoverage {
    #[pyo3(get)]
    pub date: NaiveDate,
    #[pyo3(get)]
    pub requested: usize,
    #[pyo3(get)]
    pub assigned: usize,
}

#[pymethods]
impl DailyCoverage {
    fn __repr__(&self) -> String {
        format!(
            "DailyCoverage(date={}, assigned={}/{})",
            self.date, self.assigned, self.requested
        )
    }
}

#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterStatistics {
    #[pyo3(get)]
    pub totals: RosterTotals,
    #[pyo3(get)]
    pub employees: Vec<EmployeeStats>,
    #[pyo3(get)]
    pub quota: QuotaUsage,
    /// One entry per date that had duties, ascending.
    #[pyo3(get)]
    pub daily: Vec<DailyCoverage>,
}

#[pymethods]
impl RosterStatistics {
    fn __repr__(&self) -> String {
        format!(
            "RosterStatistics(assigned={}, unassigned={}, employees={}, days={})",
            self.totals.total_assigned,
            self.totals.total_unassigned,
            self.employees.len(),
            self.daily.len()
        )
    }
}

impl ScheduleOutcome {
    /// Summarize the run. Reflects any manual reassignments made since.
    pub fn statistics(&self) -> RosterStatistics {
        let total_assigned = self.assignments.len();
        let total_unassigned = self.unassigned.len();
        let totals = RosterTotals {
            total_employees: self.employees.len(),
            total_assigned,
            total_unassigned,
            total_requested: total_assigned + total_unassigned,
        };

        let employees: Vec<EmployeeStats> = self
            .employees
            .iter()
            .zip(self.state.iter())
            .map(|(employee, state)| EmployeeStats {
                employee_id: employee.id,
                name: employee.name.clone(),
                assigned_count: state.assigned_count,
                remaining_quota: state.remaining_quota,
                occupied_days: state.occupied_dates.len(),
                load: state.load,
            })
            .collect();

        let quota_per_employee = self.config.monthly_quota as u64;
        let quota = QuotaUsage {
            total_slots: quota_per_employee * self.employees.len() as u64,
            used_slots: self
                .state
                .iter()
                .map(|s| quota_per_employee.saturating_sub(s.remaining_quota as u64))
                .sum(),
        };

        let mut by_date: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
        for duty in &self.duties {
            by_date.entry(duty.date).or_default().0 += 1;
        }
        for assignment in &self.assignments {
            by_date.entry(assignment.duty.date).or_default().1 += 1;
        }
        let daily = by_date
            .into_iter()
            .map(|(date, (requested, assigned))| DailyCoverage {
                date,
                requested,
                assigned,
            })
            .collect();

        RosterStatistics {
            totals,
            employees,
            quota,
            daily,
        }
    }
}
