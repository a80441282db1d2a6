//! Greedy single-pass duty assignment.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::config::RosterConfig;
use crate::models::{Assignment, DutyCalendar, DutyRequest, Employee, EmployeeId, UnassignedDuty};
use crate::validation::{check_unique_ids, ValidationError};
use crate::{log_changes, log_checks, log_debug};

use super::diagnostics::classify_unassigned;
use super::eligibility::{check_eligibility, Ineligibility};
use super::expansion::expand_duties;
use super::scoring::score_candidate;
use super::state::RunState;

/// Errors that can occur while building or running a roster.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Scheduling cancelled after {processed} of {total} duties")]
    Cancelled { processed: usize, total: usize },
    #[error("Employee not found: {0}")]
    UnknownEmployee(EmployeeId),
    #[error("Assignment not found: {0}")]
    AssignmentNotFound(usize),
    #[error("Employee {employee_id} is unavailable: {reason}")]
    EmployeeUnavailable {
        employee_id: EmployeeId,
        reason: Ineligibility,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Assigns duty instances to employees one at a time, in date order.
///
/// Holds only the run's input. Every call to `schedule` builds its own
/// `RunState`, so one scheduler can be run repeatedly (or shared across
/// threads) without runs seeing each other.
#[derive(Clone, Debug)]
pub struct DutyScheduler {
    employees: Vec<Employee>,
    duties: Vec<DutyRequest>,
    config: RosterConfig,
}

impl DutyScheduler {
    /// Create a scheduler, expanding the calendar into its processing order.
    ///
    /// An empty roster is accepted: every duty then ends up unassigned.
    pub fn new(
        employees: Vec<Employee>,
        calendar: &DutyCalendar,
        config: RosterConfig,
    ) -> Result<Self, RosterError> {
        config.validate()?;
        check_unique_ids(&employees)?;

        Ok(Self {
            employees,
            duties: expand_duties(calendar),
            config,
        })
    }

    /// Duty instances in the order they will be processed.
    pub fn duties(&self) -> &[DutyRequest] {
        &self.duties
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Run the assignment loop to completion.
    pub fn schedule(&self) -> Result<ScheduleOutcome, RosterError> {
        self.run(|_| false)
    }

    /// Run the assignment loop, stopping before the next duty once `cancel` is set.
    ///
    /// Assignments already made are discarded with the run; nothing outside it
    /// was touched.
    pub fn schedule_with_cancel(
        &self,
        cancel: &AtomicBool,
    ) -> Result<ScheduleOutcome, RosterError> {
        self.run(|_| cancel.load(Ordering::Relaxed))
    }

    /// `is_cancelled` is asked before each duty with the number already processed.
    fn run(&self, is_cancelled: impl Fn(usize) -> bool) -> Result<ScheduleOutcome, RosterError> {
        let verbosity = self.config.verbosity;
        let total = self.duties.len();
        let mut state = RunState::new(self.employees.len(), self.config.monthly_quota);
        let mut jitter_rng = self.config.jitter_seed().map(StdRng::seed_from_u64);
        let mut assignments: Vec<Assignment> = Vec::new();
        let mut unassigned: Vec<UnassignedDuty> = Vec::new();

        log_changes!(
            verbosity,
            "Scheduling {} duties across {} employees",
            total,
            self.employees.len()
        );

        for (processed, duty) in self.duties.iter().enumerate() {
            if is_cancelled(processed) {
                log_changes!(verbosity, "Cancelled after {} of {} duties", processed, total);
                return Err(RosterError::Cancelled { processed, total });
            }

            let dates = duty.occupied_dates();
            match self.select_candidate(duty, &dates, &state, &mut jitter_rng) {
                Some(index) => {
                    let employee = &self.employees[index];
                    let load = duty.load(self.config.single_day_load, self.config.multi_day_load);
                    state.employee_mut(index).commit(duty, &dates, load);
                    log_changes!(verbosity, "Assigned {} -> {}", duty, employee.name);
                    assignments.push(Assignment {
                        duty: *duty,
                        employee_id: employee.id,
                    });
                }
                None => {
                    let reason = classify_unassigned(&self.employees, &state, duty, &dates);
                    log_changes!(verbosity, "Unassigned {}: {}", duty, reason);
                    unassigned.push(UnassignedDuty {
                        duty: *duty,
                        reason,
                    });
                }
            }
        }

        Ok(ScheduleOutcome::new(
            self.employees.clone(),
            self.duties.clone(),
            self.config.clone(),
            assignments,
            unassigned,
            state,
        ))
    }

    /// Pick the eligible employee with the highest score.
    ///
    /// Exact ties go to the employee listed first. With jitter enabled every
    /// eligible candidate draws a tie key in roster order, and among equal
    /// scores the highest key wins. The key never outweighs a score gap.
    fn select_candidate(
        &self,
        duty: &DutyRequest,
        dates: &[NaiveDate],
        state: &RunState,
        jitter_rng: &mut Option<StdRng>,
    ) -> Option<usize> {
        let verbosity = self.config.verbosity;
        let average_load = state.average_load();
        // (index, score, tie key)
        let mut best: Option<(usize, f64, f64)> = None;

        for (index, employee) in self.employees.iter().enumerate() {
            let employee_state = state.employee(index);
            if let Err(why) = check_eligibility(employee, employee_state, duty, dates) {
                log_checks!(verbosity, "Skipping {} for {}: {}", employee.name, duty, why);
                continue;
            }

            let breakdown =
                score_candidate(employee, employee_state, dates, average_load, &self.config);
            let score = breakdown.total;
            let tie_key = jitter_rng
                .as_mut()
                .map_or(0.0, |rng| rng.random::<f64>() * self.config.jitter);

            log_debug!(
                verbosity,
                "{} for {}: score={:.3} tie={:.3} (base={}, exclusion=-{}, priority=+{}, \
                 load={:+.3}, fairness={:+})",
                employee.name,
                duty,
                score,
                tie_key,
                breakdown.base,
                breakdown.exclusion_penalty,
                breakdown.priority_bonus,
                breakdown.load_bonus,
                breakdown.fairness_bonus
            );

            let better = match best {
                None => true,
                Some((_, best_score, best_key)) => {
                    score > best_score || (score == best_score && tie_key > best_key)
                }
            };
            if better {
                best = Some((index, score, tie_key));
            }
        }

        best.map(|(index, _, _)| index)
    }
}

/// Result of one run: assignments, unassigned duties and the final run state.
///
/// Owns everything it needs, so statistics and manual reassignment work
/// after the scheduler is gone.
#[derive(Clone, Debug)]
pub struct ScheduleOutcome {
    pub(super) employees: Vec<Employee>,
    pub(super) index_by_id: FxHashMap<EmployeeId, usize>,
    pub(super) duties: Vec<DutyRequest>,
    pub(super) config: RosterConfig,
    pub(super) assignments: Vec<Assignment>,
    pub(super) unassigned: Vec<UnassignedDuty>,
    pub(super) state: RunState,
}

impl ScheduleOutcome {
    fn new(
        employees: Vec<Employee>,
        duties: Vec<DutyRequest>,
        config: RosterConfig,
        assignments: Vec<Assignment>,
        unassigned: Vec<UnassignedDuty>,
        state: RunState,
    ) -> Self {
        let index_by_id = employees
            .iter()
            .enumerate()
            .map(|(index, employee)| (employee.id, index))
            .collect();
        Self {
            employees,
            index_by_id,
            duties,
            config,
            assignments,
            unassigned,
            state,
        }
    }

    /// Assignments in the order they were made.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn unassigned(&self) -> &[UnassignedDuty] {
        &self.unassigned
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// All duty instances in processing order.
    pub fn duties(&self) -> &[DutyRequest] {
        &self.duties
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// True when every duty found an employee.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }

    /// Duties held by one employee, in assignment order.
    pub fn assignments_for(&self, employee_id: EmployeeId) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .collect()
    }

    pub(super) fn employee_index(&self, employee_id: EmployeeId) -> Option<usize> {
        self.index_by_id.get(&employee_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DutyType, UnassignedReason};
    use rustc_hash::FxHashSet;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn t(code: i64) -> DutyType {
        DutyType::try_from(code).unwrap()
    }

    fn employee(id: EmployeeId, priority: i32) -> Employee {
        Employee::new(id, format!("emp{}", id), priority).unwrap()
    }

    fn run(
        employees: Vec<Employee>,
        calendar: &DutyCalendar,
        config: RosterConfig,
    ) -> ScheduleOutcome {
        DutyScheduler::new(employees, calendar, config)
            .unwrap()
            .schedule()
            .unwrap()
    }

    /// A month of mixed duties for a handful of employees with vacations and
    /// exclusions sprinkled in.
    fn busy_month() -> (Vec<Employee>, DutyCalendar) {
        let employees = vec![
            employee(1, 3).with_vacation((5..=9).map(|day| d(2025, 3, day))),
            employee(2, 0).with_preferred_exclusions([d(2025, 3, 1), d(2025, 3, 15)]),
            employee(3, 10).with_vacation([d(2025, 3, 20)]),
            employee(4, 7),
        ];
        let mut calendar = DutyCalendar::new();
        for day in (1..=31).rev() {
            let types = match day % 3 {
                0 => vec![t(1), t(7)],
                1 => vec![t(2), t(3), t(7)],
                _ => vec![t(6)],
            };
            calendar.add_day(d(2025, 3, day), types);
        }
        (employees, calendar)
    }

    #[test]
    fn test_scenario_priority_bonus_wins() {
        let calendar = DutyCalendar::new().with_day(d(2025, 1, 10), vec![t(1)]);
        let outcome = run(
            vec![employee(2, 0), employee(1, 5)],
            &calendar,
            RosterConfig::default(),
        );
        assert_eq!(outcome.assignments().len(), 1);
        assert_eq!(outcome.assignments()[0].employee_id, 1);
    }

    #[test]
    fn test_scenario_vacation_leaves_duty_unassigned() {
        let calendar = DutyCalendar::new().with_day(d(2025, 1, 10), vec![t(7)]);
        let outcome = run(
            vec![employee(1, 0).with_vacation([d(2025, 1, 10)])],
            &calendar,
            RosterConfig::default(),
        );
        assert!(outcome.assignments().is_empty());
        assert_eq!(outcome.unassigned().len(), 1);
        assert_eq!(outcome.unassigned()[0].reason, UnassignedReason::AllOnVacation);
    }

    #[test]
    fn test_scenario_rest_day_blocks_next_duty() {
        let calendar = DutyCalendar::new()
            .with_day(d(2025, 1, 10), vec![t(1)])
            .with_day(d(2025, 1, 11), vec![t(7)]);
        let outcome = run(vec![employee(1, 0)], &calendar, RosterConfig::default());

        assert_eq!(outcome.assignments().len(), 1);
        assert_eq!(outcome.assignments()[0].duty.date, d(2025, 1, 10));
        assert_eq!(outcome.unassigned()[0].duty.date, d(2025, 1, 11));
        assert_eq!(outcome.unassigned()[0].reason, UnassignedReason::AllOccupied);
    }

    #[test]
    fn test_scenario_zero_quota() {
        let config = RosterConfig {
            monthly_quota: 0,
            ..RosterConfig::default()
        };

        let multi = DutyCalendar::new().with_day(d(2025, 1, 10), vec![t(2)]);
        let outcome = run(vec![employee(1, 0)], &multi, config.clone());
        assert_eq!(outcome.unassigned()[0].reason, UnassignedReason::QuotaExhausted);

        let single = DutyCalendar::new().with_day(d(2025, 1, 10), vec![t(7)]);
        let outcome = run(vec![employee(1, 0)], &single, config);
        assert!(outcome.is_complete());
        assert_eq!(outcome.state().employee(0).remaining_quota, 0);
    }

    #[test]
    fn test_quota_runs_out_mid_run() {
        let config = RosterConfig {
            monthly_quota: 2,
            ..RosterConfig::default()
        };
        let calendar = DutyCalendar::new()
            .with_day(d(2025, 1, 1), vec![t(1)])
            .with_day(d(2025, 1, 3), vec![t(1)])
            .with_day(d(2025, 1, 5), vec![t(1)])
            .with_day(d(2025, 1, 7), vec![t(7)]);
        let outcome = run(vec![employee(1, 0)], &calendar, config);

        assert_eq!(outcome.assignments().len(), 3);
        assert_eq!(outcome.unassigned().len(), 1);
        assert_eq!(outcome.unassigned()[0].duty.date, d(2025, 1, 5));
        assert_eq!(outcome.unassigned()[0].reason, UnassignedReason::QuotaExhausted);
        assert_eq!(outcome.state().employee(0).remaining_quota, 0);
    }

    #[test]
    fn test_empty_roster_leaves_everything_unassigned() {
        let calendar = DutyCalendar::new().with_day(d(2025, 1, 1), vec![t(1), t(7)]);
        let outcome = run(vec![], &calendar, RosterConfig::default());
        assert!(outcome.assignments().is_empty());
        assert_eq!(outcome.unassigned().len(), 2);
        assert!(outcome
            .unassigned()
            .iter()
            .all(|u| u.reason == UnassignedReason::InsufficientStaff));
    }

    #[test]
    fn test_load_balancing_spreads_duties() {
        let calendar = DutyCalendar::new()
            .with_day(d(2025, 1, 1), vec![t(7)])
            .with_day(d(2025, 1, 2), vec![t(7)])
            .with_day(d(2025, 1, 3), vec![t(7)])
            .with_day(d(2025, 1, 4), vec![t(7)]);
        let outcome = run(
            vec![employee(1, 0), employee(2, 0)],
            &calendar,
            RosterConfig::default(),
        );
        let holders: Vec<EmployeeId> =
            outcome.assignments().iter().map(|a| a.employee_id).collect();
        assert_eq!(holders, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_exclusion_is_soft() {
        let calendar = DutyCalendar::new().with_day(d(2025, 1, 1), vec![t(7)]);

        // With a free colleague the excluded employee is passed over.
        let outcome = run(
            vec![
                employee(1, 0).with_preferred_exclusions([d(2025, 1, 1)]),
                employee(2, 0),
            ],
            &calendar,
            RosterConfig::default(),
        );
        assert_eq!(outcome.assignments()[0].employee_id, 2);

        // Alone, they still get the duty.
        let outcome = run(
            vec![employee(1, 0).with_preferred_exclusions([d(2025, 1, 1)])],
            &calendar,
            RosterConfig::default(),
        );
        assert_eq!(outcome.assignments()[0].employee_id, 1);
    }

    #[test]
    fn test_zero_score_candidate_still_assignable() {
        let config = RosterConfig {
            base_score: 0.0,
            fairness_weight: 0.0,
            ..RosterConfig::default()
        };
        let calendar = DutyCalendar::new().with_day(d(2025, 1, 1), vec![t(7)]);
        let outcome = run(
            vec![employee(1, 0).with_preferred_exclusions([d(2025, 1, 1)])],
            &calendar,
            config,
        );
        assert!(outcome.is_complete());
    }

    #[test]
    fn test_hard_constraints_hold_over_busy_month() {
        let (employees, calendar) = busy_month();
        let outcome = run(employees.clone(), &calendar, RosterConfig::default());

        // Conservation
        assert_eq!(
            outcome.assignments().len() + outcome.unassigned().len(),
            calendar.duty_count()
        );

        for employee in &employees {
            let held = outcome.assignments_for(employee.id);
            let mut claimed: FxHashSet<NaiveDate> = FxHashSet::default();
            for assignment in &held {
                for date in assignment.duty.occupied_dates() {
                    assert!(!employee.is_on_vacation(date), "vacation violated on {}", date);
                    assert!(claimed.insert(date), "double occupancy on {}", date);
                }
            }
            let multi_day = held
                .iter()
                .filter(|a| a.duty.duty_type.is_multi_day())
                .count() as u32;
            let index = outcome.employee_index(employee.id).unwrap();
            assert_eq!(outcome.state().employee(index).remaining_quota, 15 - multi_day);
            assert_eq!(outcome.state().employee(index).occupied_dates, claimed);
        }
    }

    #[test]
    fn test_quota_never_goes_below_zero_or_up() {
        let (employees, calendar) = busy_month();
        let config = RosterConfig {
            monthly_quota: 3,
            ..RosterConfig::default()
        };
        let outcome = run(employees, &calendar, config);

        assert!(!outcome.is_complete());
        for state in outcome.state().iter() {
            assert!(state.remaining_quota <= 3);
        }
        assert!(outcome
            .unassigned()
            .iter()
            .any(|u| u.reason == UnassignedReason::QuotaExhausted));
    }

    #[test]
    fn test_runs_are_deterministic() {
        let (employees, calendar) = busy_month();
        let scheduler = DutyScheduler::new(employees, &calendar, RosterConfig::default()).unwrap();
        let first = scheduler.schedule().unwrap();
        let second = scheduler.schedule().unwrap();
        assert_eq!(first.assignments(), second.assignments());
        assert_eq!(first.unassigned(), second.unassigned());
        assert_eq!(first.state(), second.state());
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let (employees, calendar) = busy_month();
        let config = RosterConfig {
            tie_break_seed: Some(42),
            jitter: 5.0,
            ..RosterConfig::default()
        };
        let first = run(employees.clone(), &calendar, config.clone());
        let second = run(employees, &calendar, config);
        assert_eq!(first.assignments(), second.assignments());
        assert_eq!(first.unassigned(), second.unassigned());
    }

    #[test]
    fn test_jitter_never_beats_a_higher_score() {
        // 170 vs 145: a real gap, far below the jitter magnitude.
        let calendar = DutyCalendar::new().with_day(d(2025, 1, 10), vec![t(1)]);
        for seed in 0..50 {
            let config = RosterConfig {
                tie_break_seed: Some(seed),
                jitter: 100.0,
                ..RosterConfig::default()
            };
            let outcome = run(vec![employee(2, 0), employee(1, 5)], &calendar, config);
            assert_eq!(outcome.assignments()[0].employee_id, 1, "seed {}", seed);
        }
    }

    #[test]
    fn test_seed_decides_exact_ties() {
        let calendar = DutyCalendar::new().with_day(d(2025, 1, 10), vec![t(7)]);
        let winner = |seed: u64| {
            let config = RosterConfig {
                tie_break_seed: Some(seed),
                jitter: 1.0,
                ..RosterConfig::default()
            };
            run(vec![employee(1, 0), employee(2, 0)], &calendar, config).assignments()[0]
                .employee_id
        };

        let winners: FxHashSet<EmployeeId> = (0..50).map(&winner).collect();
        assert_eq!(winners.len(), 2);
        for seed in 0..10 {
            assert_eq!(winner(seed), winner(seed));
        }

        // Without jitter the first listed employee takes the tie.
        let outcome = run(
            vec![employee(1, 0), employee(2, 0)],
            &calendar,
            RosterConfig::default(),
        );
        assert_eq!(outcome.assignments()[0].employee_id, 1);
    }

    #[test]
    fn test_huge_load_weights_saturate() {
        let config = RosterConfig {
            multi_day_load: u32::MAX,
            ..RosterConfig::default()
        };
        let calendar = DutyCalendar::new()
            .with_day(d(2025, 1, 1), vec![t(1)])
            .with_day(d(2025, 1, 3), vec![t(1)]);
        let outcome = run(vec![employee(1, 0)], &calendar, config);
        assert!(outcome.is_complete());
        assert_eq!(outcome.state().employee(0).load, u32::MAX);
    }

    #[test]
    fn test_cancellation_between_duties() {
        let (employees, calendar) = busy_month();
        let scheduler = DutyScheduler::new(employees, &calendar, RosterConfig::default()).unwrap();
        let err = scheduler.run(|processed| processed == 5).unwrap_err();
        assert_eq!(
            err,
            RosterError::Cancelled {
                processed: 5,
                total: calendar.duty_count()
            }
        );
    }

    #[test]
    fn test_cancel_flag_set_during_run() {
        let (employees, calendar) = busy_month();
        let scheduler = DutyScheduler::new(employees, &calendar, RosterConfig::default()).unwrap();
        let cancel = AtomicBool::new(false);

        // Raise the flag from inside the run once three duties are done.
        let err = scheduler
            .run(|processed| {
                if processed == 3 {
                    cancel.store(true, Ordering::Relaxed);
                }
                cancel.load(Ordering::Relaxed)
            })
            .unwrap_err();
        assert!(matches!(err, RosterError::Cancelled { processed: 3, .. }));
    }

    #[test]
    fn test_cancellation_stops_run() {
        let (employees, calendar) = busy_month();
        let scheduler = DutyScheduler::new(employees, &calendar, RosterConfig::default()).unwrap();

        let cancel = AtomicBool::new(true);
        let err = scheduler.schedule_with_cancel(&cancel).unwrap_err();
        assert_eq!(
            err,
            RosterError::Cancelled {
                processed: 0,
                total: calendar.duty_count()
            }
        );

        let not_cancelled = AtomicBool::new(false);
        assert!(scheduler.schedule_with_cancel(&not_cancelled).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = DutyScheduler::new(
            vec![employee(1, 0), employee(1, 2)],
            &DutyCalendar::new(),
            RosterConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            RosterError::Validation(ValidationError::DuplicateEmployeeId(1))
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RosterConfig {
            priority_weight: -5.0,
            ..RosterConfig::default()
        };
        let err = DutyScheduler::new(vec![employee(1, 0)], &DutyCalendar::new(), config);
        assert!(matches!(err, Err(RosterError::InvalidConfig(_))));
    }

    #[test]
    fn test_runs_on_separate_threads() {
        let (employees, calendar) = busy_month();
        let scheduler = DutyScheduler::new(employees, &calendar, RosterConfig::default()).unwrap();
        let expected = scheduler.schedule().unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| scheduler.schedule().unwrap()))
                .collect();
            for handle in handles {
                let outcome = handle.join().unwrap();
                assert_eq!(outcome.assignments(), expected.assignments());
            }
        });
    }
}
