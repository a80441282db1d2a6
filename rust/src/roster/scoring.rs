//! Soft-constraint scoring for eligible candidates.

use chrono::NaiveDate;

use crate::config::RosterConfig;
use crate::models::Employee;

use super::state::EmployeeRunState;

/// Individual terms of a candidate's score, kept for debug logging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub exclusion_penalty: f64,
    pub priority_bonus: f64,
    pub load_bonus: f64,
    pub fairness_bonus: f64,
    /// Sum of the terms, floored at 0.
    pub total: f64,
}

/// Score an eligible candidate for a duty occupying `dates`.
///
/// Formula:
/// `base - penalty * excluded_dates + priority * w_p
///  + (avg_load - load) * w_l + (cap - assigned) * w_f`
/// clamped to a minimum of 0.
///
/// Higher score = better candidate. `average_load` is the mean load over the
/// whole roster before this duty is handed out.
pub fn score_candidate(
    employee: &Employee,
    state: &EmployeeRunState,
    dates: &[NaiveDate],
    average_load: f64,
    config: &RosterConfig,
) -> ScoreBreakdown {
    let excluded_dates = dates
        .iter()
        .filter(|&&date| employee.prefers_off(date))
        .count();

    let base = config.base_score;
    let exclusion_penalty = config.exclusion_penalty * excluded_dates as f64;
    let priority_bonus = employee.priority as f64 * config.priority_weight;
    let load_bonus = (average_load - state.load as f64) * config.load_balance_weight;
    let fairness_bonus =
        (config.fairness_cap as f64 - state.assigned_count as f64) * config.fairness_weight;

    let total = (base - exclusion_penalty + priority_bonus + load_bonus + fairness_bonus).max(0.0);

    ScoreBreakdown {
        base,
        exclusion_penalty,
        priority_bonus,
        load_bonus,
        fairness_bonus,
        total,
    }
}
