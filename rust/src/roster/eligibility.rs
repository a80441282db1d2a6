//! Hard constraints: vacation, quota and date occupancy.
//!
//! A candidate failing any of these can never take the duty, whatever its score.

use chrono::NaiveDate;
use std::fmt;

use crate::models::{DutyRequest, Employee};

use super::state::EmployeeRunState;

/// The first hard constraint a candidate failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ineligibility {
    OnVacation,
    QuotaExhausted,
    AlreadyOccupied,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnVacation => write!(f, "on vacation"),
            Self::QuotaExhausted => write!(f, "quota exhausted"),
            Self::AlreadyOccupied => write!(f, "already occupied"),
        }
    }
}

/// No occupied date falls on the employee's vacation.
#[inline]
pub fn clears_vacation(employee: &Employee, dates: &[NaiveDate]) -> bool {
    !dates.iter().any(|&date| employee.is_on_vacation(date))
}

/// Single-day duties ignore quota.
#[inline]
pub fn clears_quota(state: &EmployeeRunState, duty: &DutyRequest) -> bool {
    !duty.duty_type.is_multi_day() || state.remaining_quota > 0
}

#[inline]
pub fn clears_occupancy(state: &EmployeeRunState, dates: &[NaiveDate]) -> bool {
    !state.is_occupied_on(dates)
}

/// Check all hard constraints in order: vacation, quota, occupancy.
///
/// `dates` must be `duty.occupied_dates()`; it is passed in so a caller scoring
/// the whole roster computes it once.
pub fn check_eligibility(
    employee: &Employee,
    state: &EmployeeRunState,
    duty: &DutyRequest,
    dates: &[NaiveDate],
) -> Result<(), Ineligibility> {
    if !clears_vacation(employee, dates) {
        return Err(Ineligibility::OnVacation);
    }
    if !clears_quota(state, duty) {
        return Err(Ineligibility::QuotaExhausted);
    }
    if !clears_occupancy(state, dates) {
        return Err(Ineligibility::AlreadyOccupied);
    }
    Ok(())
}
