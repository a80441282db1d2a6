//! Classifying why a duty could not be assigned.

use chrono::NaiveDate;

use crate::models::{DutyRequest, Employee, UnassignedReason};

use super::eligibility::{clears_occupancy, clears_quota, clears_vacation};
use super::state::RunState;

/// Work out why nobody could take `duty` given the current run state.
///
/// Applies the hard constraints as successive filters over the roster and
/// reports the first one that empties it:
/// 1. vacation eliminates everyone -> `AllOnVacation`
/// 2. quota eliminates everyone left -> `QuotaExhausted`
/// 3. occupancy eliminates everyone left -> `AllOccupied`
///
/// Anything else (including an empty roster) is `InsufficientStaff`.
/// Read-only: the run state is never touched.
pub fn classify_unassigned(
    employees: &[Employee],
    state: &RunState,
    duty: &DutyRequest,
    dates: &[NaiveDate],
) -> UnassignedReason {
    if employees.is_empty() {
        return UnassignedReason::InsufficientStaff;
    }

    let off_vacation: Vec<usize> = employees
        .iter()
        .enumerate()
        .filter(|(_, employee)| clears_vacation(employee, dates))
        .map(|(index, _)| index)
        .collect();
    if off_vacation.is_empty() {
        return UnassignedReason::AllOnVacation;
    }

    let with_quota: Vec<usize> = off_vacation
        .into_iter()
        .filter(|&index| clears_quota(state.employee(index), duty))
        .collect();
    if with_quota.is_empty() {
        return UnassignedReason::QuotaExhausted;
    }

    if with_quota
        .iter()
        .all(|&index| !clears_occupancy(state.employee(index), dates))
    {
        return UnassignedReason::AllOccupied;
    }

    UnassignedReason::InsufficientStaff
}
