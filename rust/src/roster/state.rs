//! Per-run mutable employee state.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use crate::models::DutyRequest;

/// What one employee has accumulated so far in the current run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeRunState {
    pub assigned_count: u32,
    /// Multi-day duties still allowed; never negative.
    pub remaining_quota: u32,
    /// Dates claimed by earlier assignments, rest days included.
    pub occupied_dates: FxHashSet<NaiveDate>,
    /// Weighted work total used for load balancing.
    pub load: u32,
}

impl EmployeeRunState {
    pub fn new(quota: u32) -> Self {
        Self {
            remaining_quota: quota,
            ..Default::default()
        }
    }

    /// Whether any of `dates` is already taken.
    pub fn is_occupied_on(&self, dates: &[NaiveDate]) -> bool {
        dates.iter().any(|date| self.occupied_dates.contains(date))
    }

    /// Record a duty as taken by this employee. Load saturates at `u32::MAX`.
    pub fn commit(&mut self, duty: &DutyRequest, dates: &[NaiveDate], load: u32) {
        self.assigned_count = self.assigned_count.saturating_add(1);
        self.load = self.load.saturating_add(load);
        if duty.duty_type.is_multi_day() {
            self.remaining_quota = self.remaining_quota.saturating_sub(1);
        }
        self.occupied_dates.extend(dates.iter().copied());
    }

    /// Undo a previous `commit` of the same duty.
    pub fn release(&mut self, duty: &DutyRequest, dates: &[NaiveDate], load: u32) {
        self.assigned_count = self.assigned_count.saturating_sub(1);
        self.load = self.load.saturating_sub(load);
        if duty.duty_type.is_multi_day() {
            self.remaining_quota += 1;
        }
        for date in dates {
            self.occupied_dates.remove(date);
        }
    }
}

/// Run state for every employee, indexed in roster order.
///
/// Built fresh for each run and owned by it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunState {
    employees: Vec<EmployeeRunState>,
}

impl RunState {
    pub fn new(employee_count: usize, quota: u32) -> Self {
        Self {
            employees: vec![EmployeeRunState::new(quota); employee_count],
        }
    }

    #[inline]
    pub fn employee(&self, index: usize) -> &EmployeeRunState {
        &self.employees[index]
    }

    #[inline]
    pub fn employee_mut(&mut self, index: usize) -> &mut EmployeeRunState {
        &mut self.employees[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmployeeRunState> {
        self.employees.iter()
    }

    /// Mean load over all employees (0.0 for an empty roster).
    pub fn average_load(&self) -> f64 {
        if self.employees.is_empty() {
            return 0.0;
        }
        let total: u64 = self.employees.iter().map(|e| e.load as u64).sum();
        total as f64 / self.employees.len() as f64
    }
}
