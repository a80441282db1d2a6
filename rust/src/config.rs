//! Configuration for the duty roster engine.

use pyo3::prelude::*;

use crate::roster::RosterError;

/// Scoring weights, quota cap and tie-break settings for one run.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct RosterConfig {
    /// Multi-day duties each employee may take per run
    #[pyo3(get, set)]
    pub monthly_quota: u32,
    /// Starting score for every eligible candidate
    #[pyo3(get, set)]
    pub base_score: f64,
    /// Subtracted once per occupied date the employee asked to keep free
    #[pyo3(get, set)]
    pub exclusion_penalty: f64,
    /// Multiplier on employee priority (0-10)
    #[pyo3(get, set)]
    pub priority_weight: f64,
    /// Multiplier on (average load - own load)
    #[pyo3(get, set)]
    pub load_balance_weight: f64,
    /// Shift count at which the fairness term reaches zero
    #[pyo3(get, set)]
    pub fairness_cap: u32,
    /// Multiplier on (fairness_cap - shifts assigned so far)
    #[pyo3(get, set)]
    pub fairness_weight: f64,
    /// Load points for a type-7 duty
    #[pyo3(get, set)]
    pub single_day_load: u32,
    /// Load points for a type 1-6 duty
    #[pyo3(get, set)]
    pub multi_day_load: u32,
    /// Seed for tie-break jitter; jitter is off when None
    #[pyo3(get, set)]
    pub tie_break_seed: Option<u64>,
    /// Scale of the random tie key drawn per eligible candidate; only
    /// decides between exactly equal scores, and 0 turns it off
    #[pyo3(get, set)]
    pub jitter: f64,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            monthly_quota: 15,
            base_score: 100.0,
            exclusion_penalty: 40.0,
            priority_weight: 5.0,
            load_balance_weight: 8.0,
            fairness_cap: 15,
            fairness_weight: 3.0,
            single_day_load: 1,
            multi_day_load: 2,
            tie_break_seed: None,
            jitter: 0.0,
            verbosity: 0,
        }
    }
}

impl RosterConfig {
    /// Seed to use for jitter, if jitter is actually enabled.
    pub fn jitter_seed(&self) -> Option<u64> {
        match self.tie_break_seed {
            Some(seed) if self.jitter > 0.0 => Some(seed),
            _ => None,
        }
    }

    /// Reject weights that would make scores meaningless.
    pub fn validate(&self) -> Result<(), RosterError> {
        let weights = [
            ("base_score", self.base_score),
            ("exclusion_penalty", self.exclusion_penalty),
            ("priority_weight", self.priority_weight),
            ("load_balance_weight", self.load_balance_weight),
            ("fairness_weight", self.fairness_weight),
            ("jitter", self.jitter),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(RosterError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[pymethods]
impl RosterConfig {
    #[new]
    #[pyo3(signature = (
        monthly_quota=None,
        base_score=None,
        exclusion_penalty=None,
        priority_weight=None,
        load_balance_weight=None,
        fairness_cap=None,
        fairness_weight=None,
        single_day_load=None,
        multi_day_load=None,
        tie_break_seed=None,
        jitter=None,
        verbosity=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        monthly_quota: Option<u32>,
        base_score: Option<f64>,
        exclusion_penalty: Option<f64>,
        priority_weight: Option<f64>,
        load_balance_weight: Option<f64>,
        fairness_cap: Option<u32>,
        fairness_weight: Option<f64>,
        single_day_load: Option<u32>,
        multi_day_load: Option<u32>,
        tie_break_seed: Option<u64>,
        jitter: Option<f64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            monthly_quota: monthly_quota.unwrap_or(defaults.monthly_quota),
            base_score: base_score.unwrap_or(defaults.base_score),
            exclusion_penalty: exclusion_penalty.unwrap_or(defaults.exclusion_penalty),
            priority_weight: priority_weight.unwrap_or(defaults.priority_weight),
            load_balance_weight: load_balance_weight.unwrap_or(defaults.load_balance_weight),
            fairness_cap: fairness_cap.unwrap_or(defaults.fairness_cap),
            fairness_weight: fairness_weight.unwrap_or(defaults.fairness_weight),
            single_day_load: single_day_load.unwrap_or(defaults.single_day_load),
            multi_day_load: multi_day_load.unwrap_or(defaults.multi_day_load),
            tie_break_seed: tie_break_seed.or(defaults.tie_break_seed),
            jitter: jitter.unwrap_or(defaults.jitter),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "RosterConfig(monthly_quota={}, fairness_cap={}, tie_break_seed={:?}, jitter={})",
            self.monthly_quota, self.fairness_cap, self.tie_break_seed, self.jitter
        )
    }
}
