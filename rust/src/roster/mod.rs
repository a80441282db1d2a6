//! Duty assignment engine.
//!
//! Expands a duty calendar into date-ordered duty instances, then hands each
//! one to the best-scoring employee who passes every hard constraint. The
//! pass is greedy: earlier assignments are never revisited.

mod adjust;
mod diagnostics;
mod eligibility;
mod engine;
mod expansion;
mod scoring;
mod state;
mod statistics;

pub use diagnostics::classify_unassigned;
pub use eligibility::{check_eligibility, Ineligibility};
pub use engine::{DutyScheduler, RosterError, ScheduleOutcome};
pub use expansion::expand_duties;
pub use scoring::{score_candidate, ScoreBreakdown};
pub use state::{EmployeeRunState, RunState};
pub use statistics::{DailyCoverage, EmployeeStats, QuotaUsage, RosterStatistics, RosterTotals};
