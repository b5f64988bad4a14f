use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Fixed half-day service window. The business runs exactly two slots per
/// day; the windows are not configurable per date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotId {
    Morning,
    Afternoon,
}

impl SlotId {
    pub const ALL: [SlotId; 2] = [SlotId::Morning, SlotId::Afternoon];

    /// Wall-clock window for the slot.
    pub fn window(&self) -> (NaiveTime, NaiveTime) {
        match self {
            SlotId::Morning => (
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            ),
            SlotId::Afternoon => (
                NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            ),
        }
    }

    /// Customer-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            SlotId::Morning => "9:00 AM - 1:00 PM",
            SlotId::Afternoon => "1:00 PM - 5:00 PM",
        }
    }

    /// Value stored in an appointment's `service_time` field.
    pub fn service_time(&self) -> &'static str {
        match self {
            SlotId::Morning => "9:00-13:00",
            SlotId::Afternoon => "13:00-17:00",
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::Morning => write!(f, "morning"),
            SlotId::Afternoon => write!(f, "afternoon"),
        }
    }
}

impl FromStr for SlotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(SlotId::Morning),
            "afternoon" => Ok(SlotId::Afternoon),
            other => Err(format!("unknown slot id: {other}")),
        }
    }
}

/// Availability record for one calendar date.
///
/// A date with `is_available == false` is closed outright; its
/// `booked_slots` are ignored by every status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub is_available: bool,
    #[serde(default)]
    pub booked_slots: BTreeSet<SlotId>,
}

impl DayRecord {
    pub fn open() -> Self {
        Self {
            is_available: true,
            booked_slots: BTreeSet::new(),
        }
    }

    pub fn closed() -> Self {
        Self {
            is_available: false,
            booked_slots: BTreeSet::new(),
        }
    }

    pub fn occupied(&self) -> u32 {
        self.booked_slots.len() as u32
    }
}

impl Default for DayRecord {
    fn default() -> Self {
        Self::closed()
    }
}

/// Derived booking status for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStatus {
    Available,
    Partial,
    Full,
    Unavailable,
}

impl DateStatus {
    /// True when the date can still accept a booking.
    pub fn is_bookable(&self) -> bool {
        matches!(self, DateStatus::Available | DateStatus::Partial)
    }
}

impl fmt::Display for DateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DateStatus::Available => "available",
            DateStatus::Partial => "partial",
            DateStatus::Full => "full",
            DateStatus::Unavailable => "unavailable",
        };
        write!(f, "{s}")
    }
}

/// Monday through Friday are working days; weekends stay closed unless an
/// admin opens them explicitly.
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
