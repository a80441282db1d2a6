//! Manual changes to a finished run.

use crate::log_changes;
use crate::models::EmployeeId;

use super::eligibility::check_eligibility;
use super::engine::{RosterError, ScheduleOutcome};

impl ScheduleOutcome {
    /// Move an assigned duty to another employee.
    ///
    /// The new employee must pass every hard constraint against their current
    /// state. On failure nothing changes. Moving a duty to its current holder
    /// is a no-op.
    pub fn reassign(
        &mut self,
        assignment_index: usize,
        employee_id: EmployeeId,
    ) -> Result<(), RosterError> {
        let assignment = self
            .assignments
            .get(assignment_index)
            .cloned()
            .ok_or(RosterError::AssignmentNotFound(assignment_index))?;
        let new_index = self
            .employee_index(employee_id)
            .ok_or(RosterError::UnknownEmployee(employee_id))?;
        let old_index = self
            .employee_index(assignment.employee_id)
            .ok_or(RosterError::UnknownEmployee(assignment.employee_id))?;

        if new_index == old_index {
            return Ok(());
        }

        let duty = assignment.duty;
        let dates = duty.occupied_dates();
        check_eligibility(
            &self.employees[new_index],
            self.state.employee(new_index),
            &duty,
            &dates,
        )
        .map_err(|reason| RosterError::EmployeeUnavailable {
            employee_id,
            reason,
        })?;

        let load = duty.load(self.config.single_day_load, self.config.multi_day_load);
        self.state.employee_mut(old_index).release(&duty, &dates, load);
        self.state.employee_mut(new_index).commit(&duty, &dates, load);
        self.assignments[assignment_index].employee_id = employee_id;

        log_changes!(
            self.config.verbosity,
            "Reassigned {} from {} to {}",
            duty,
            self.employees[old_index].name,
            self.employees[new_index].name
        );
        Ok(())
    }
}
