//! Turning a duty calendar into an ordered list of duty instances.

use crate::models::{DutyCalendar, DutyRequest};

/// Flatten the calendar into one `DutyRequest` per (date, type) pair.
///
/// Ordered by date ascending. Duties on the same date keep the order in which
/// the calendar lists them (the sort is stable), so later duties always see
/// the occupancy and quota effects of earlier ones in the same order.
pub fn expand_duties(calendar: &DutyCalendar) -> Vec<DutyRequest> {
    let mut duties: Vec<DutyRequest> = calendar
        .days()
        .iter()
        .flat_map(|(date, duty_types)| {
            duty_types
                .iter()
                .map(move |&duty_type| DutyRequest::new(*date, duty_type))
        })
        .collect();

    duties.sort_by_key(|duty| duty.date);
    duties
}
