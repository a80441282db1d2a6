//! Core data types for the duty roster.

use chrono::NaiveDate;
use pyo3::prelude::*;
use rustc_hash::FxHashSet;
use std::fmt;

use crate::validation::ValidationError;

/// Stable employee identifier for one scheduling run.
pub type EmployeeId = u32;

/// Highest accepted employee priority.
pub const MAX_PRIORITY: i32 = 10;

/// An employee on the roster.
///
/// Immutable for the duration of a run; everything that changes while duties
/// are handed out lives in `EmployeeRunState`.
#[derive(Clone, Debug)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// 0..=10, higher is preferred.
    pub priority: u8,
    /// Dates the employee can never be given.
    pub vacation_dates: FxHashSet<NaiveDate>,
    /// Dates the employee would rather not work (soft penalty only).
    pub preferred_exclusion_dates: FxHashSet<NaiveDate>,
}

impl Employee {
    /// Create an employee, rejecting priorities outside 0..=10.
    pub fn new(
        id: EmployeeId,
        name: impl Into<String>,
        priority: i32,
    ) -> Result<Self, ValidationError> {
        if !(0..=MAX_PRIORITY).contains(&priority) {
            return Err(ValidationError::PriorityOutOfRange { id, priority });
        }
        Ok(Self {
            id,
            name: name.into(),
            priority: priority as u8,
            vacation_dates: FxHashSet::default(),
            preferred_exclusion_dates: FxHashSet::default(),
        })
    }

    pub fn with_vacation(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.vacation_dates.extend(dates);
        self
    }

    pub fn with_preferred_exclusions(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.preferred_exclusion_dates.extend(dates);
        self
    }

    #[inline]
    pub fn is_on_vacation(&self, date: NaiveDate) -> bool {
        self.vacation_dates.contains(&date)
    }

    #[inline]
    pub fn prefers_off(&self, date: NaiveDate) -> bool {
        self.preferred_exclusion_dates.contains(&date)
    }
}

/// Duty-type code in 1..=7.
///
/// Types 1-6 are 24-hour duties that also claim the following day as rest.
/// Type 7 is a single-day duty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DutyType(u8);

impl DutyType {
    pub const SINGLE_DAY: DutyType = DutyType(7);

    pub fn code(self) -> u8 {
        self.0
    }

    /// True for types 1-6.
    pub fn is_multi_day(self) -> bool {
        self.0 <= 6
    }
}

impl TryFrom<i64> for DutyType {
    type Error = ValidationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        if (1..=7).contains(&code) {
            Ok(DutyType(code as u8))
        } else {
            Err(ValidationError::DutyTypeOutOfRange(code))
        }
    }
}

impl fmt::Display for DutyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One duty instance: a date plus a duty type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DutyRequest {
    pub date: NaiveDate,
    pub duty_type: DutyType,
}

impl DutyRequest {
    pub fn new(date: NaiveDate, duty_type: DutyType) -> Self {
        Self { date, duty_type }
    }

    /// Dates this duty claims for whoever takes it.
    ///
    /// A multi-day duty claims its own date and the next calendar date.
    pub fn occupied_dates(&self) -> Vec<NaiveDate> {
        let mut dates = vec![self.date];
        if self.duty_type.is_multi_day() {
            if let Some(rest_day) = self.date.succ_opt() {
                dates.push(rest_day);
            }
        }
        dates
    }

    /// Load points this duty adds to the employee who takes it.
    pub fn load(&self, single_day_load: u32, multi_day_load: u32) -> u32 {
        if self.duty_type.is_multi_day() {
            multi_day_load
        } else {
            single_day_load
        }
    }
}

impl fmt::Display for DutyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} type {}", self.date, self.duty_type)
    }
}

/// Duty requests keyed by calendar date, in caller order.
///
/// The same date may appear more than once; its duty types are simply
/// appended during expansion.
#[derive(Clone, Debug, Default)]
pub struct DutyCalendar {
    days: Vec<(NaiveDate, Vec<DutyType>)>,
}

impl DutyCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, date: NaiveDate, duty_types: Vec<DutyType>) -> Self {
        self.add_day(date, duty_types);
        self
    }

    pub fn add_day(&mut self, date: NaiveDate, duty_types: Vec<DutyType>) {
        self.days.push((date, duty_types));
    }

    /// Build a calendar from raw integer codes, rejecting any code outside 1..=7.
    pub fn from_codes<I, C>(days: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (NaiveDate, C)>,
        C: IntoIterator<Item = i64>,
    {
        let mut calendar = Self::new();
        for (date, codes) in days {
            let duty_types = codes
                .into_iter()
                .map(DutyType::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            calendar.add_day(date, duty_types);
        }
        Ok(calendar)
    }

    pub fn days(&self) -> &[(NaiveDate, Vec<DutyType>)] {
        &self.days
    }

    /// Total number of duty instances across all dates.
    pub fn duty_count(&self) -> usize {
        self.days.iter().map(|(_, types)| types.len()).sum()
    }
}

/// A duty given to an employee.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub duty: DutyRequest,
    #[pyo3(get)]
    pub employee_id: EmployeeId,
}

#[pymethods]
impl Assignment {
    #[getter]
    fn date(&self) -> NaiveDate {
        self.duty.date
    }

    #[getter]
    fn duty_type(&self) -> u8 {
        self.duty.duty_type.code()
    }

    fn __repr__(&self) -> String {
        format!(
            "Assignment(date={}, duty_type={}, employee_id={})",
            self.duty.date, self.duty.duty_type, self.employee_id
        )
    }
}

/// Why a duty could not be given to anyone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnassignedReason {
    /// Nobody clears the vacation check for the duty's dates.
    AllOnVacation,
    /// Everyone off vacation has no quota left for a multi-day duty.
    QuotaExhausted,
    /// Everyone left is already busy on one of the duty's dates.
    AllOccupied,
    /// Fallback, e.g. an empty roster.
    InsufficientStaff,
}

impl UnassignedReason {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::AllOnVacation => "all_on_vacation",
            Self::QuotaExhausted => "quota_exhausted",
            Self::AllOccupied => "all_occupied",
            Self::InsufficientStaff => "insufficient_staff",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::AllOnVacation => "all eligible employees are on vacation for this duty's dates",
            Self::QuotaExhausted => "quota exhausted for all remaining candidates",
            Self::AllOccupied => "all employees already occupied on these dates",
            Self::InsufficientStaff => "insufficient staff",
        }
    }
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A duty nobody could take, with the reason.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnassignedDuty {
    pub duty: DutyRequest,
    pub reason: UnassignedReason,
}

#[pymethods]
impl UnassignedDuty {
    #[getter]
    fn date(&self) -> NaiveDate {
        self.duty.date
    }

    #[getter]
    fn duty_type(&self) -> u8 {
        self.duty.duty_type.code()
    }

    #[getter]
    fn reason_code(&self) -> &'static str {
        self.reason.code()
    }

    #[getter]
    fn reason(&self) -> &'static str {
        self.reason.description()
    }

    fn __repr__(&self) -> String {
        format!(
            "UnassignedDuty(date={}, duty_type={}, reason={:?})",
            self.duty.date,
            self.duty.duty_type,
            self.reason.code()
        )
    }
}
