use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// One recurring window, e.g. `{"start": "09:00", "end": "10:00"}`.
/// Times are kept exactly as the instructor entered them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeeklyAvailability {
    #[serde(default)]
    pub monday: Vec<TimeSlot>,
    #[serde(default)]
    pub tuesday: Vec<TimeSlot>,
    #[serde(default)]
    pub wednesday: Vec<TimeSlot>,
    #[serde(default)]
    pub thursday: Vec<TimeSlot>,
    #[serde(default)]
    pub friday: Vec<TimeSlot>,
    #[serde(default)]
    pub saturday: Vec<TimeSlot>,
    #[serde(default)]
    pub sunday: Vec<TimeSlot>,
}

/// A configured slot annotated with whether it is still free on a given date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotAvailability {
    pub start: String,
    pub end: String,
    pub available: bool,
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl WeeklyAvailability {
    pub fn slots_for(&self, day: Weekday) -> &[TimeSlot] {
        match day {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn to_human_readable(&self) -> String {
        WEEK.iter()
            .flat_map(|day| {
                self.slots_for(*day)
                    .iter()
                    .map(move |s| format!("{}: {}-{}", weekday_name(*day), s.start, s.end))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
