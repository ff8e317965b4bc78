use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::db::{profiles, sessions};
use crate::models::{Session, SlotAvailability, TimeSlot};

#[derive(Debug)]
pub enum SchedulingError {
    UnknownInstructor,
    Storage(anyhow::Error),
}

impl std::fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingError::UnknownInstructor => write!(f, "Instructor not found"),
            SchedulingError::Storage(e) => write!(f, "{e}"),
        }
    }
}

/// Marks each configured slot as free or taken on `date`.
///
/// A slot is taken iff some session on that date has exactly the same start and
/// end strings. Overlaps are not detected and session status is not consulted,
/// so a cancelled booking still occupies its slot.
pub fn compute_slot_availability(
    slots: &[TimeSlot],
    sessions: &[Session],
    date: NaiveDate,
) -> Vec<SlotAvailability> {
    slots
        .iter()
        .map(|slot| {
            let taken = sessions.iter().any(|s| {
                s.date == date && s.start_time == slot.start && s.end_time == slot.end
            });
            SlotAvailability {
                start: slot.start.clone(),
                end: slot.end.clone(),
                available: !taken,
            }
        })
        .collect()
}

/// Loads the instructor's weekly schedule and that day's sessions, then
/// annotates the slots configured for the date's weekday.
pub fn slots_for_date(
    conn: &Connection,
    instructor_id: &str,
    date: NaiveDate,
) -> Result<Vec<SlotAvailability>, SchedulingError> {
    let availability = profiles::get_availability(conn, instructor_id)
        .map_err(SchedulingError::Storage)?
        .ok_or(SchedulingError::UnknownInstructor)?;

    let slots = availability.slots_for(date.weekday());
    if slots.is_empty() {
        return Ok(vec![]);
    }

    let booked = sessions::get_instructor_sessions_on(conn, instructor_id, date)
        .map_err(SchedulingError::Storage)?;

    Ok(compute_slot_availability(slots, &booked, date))
}
