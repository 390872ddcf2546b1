use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of one bookable slot.
pub const SLOT_MINUTES: u32 = 30;

/// Spanish display names, Monday first.
const DAY_NAMES: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn day_name(weekday: Weekday) -> &'static str {
    DAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Weekday for a Spanish day name ("martes", "Miércoles") or a chrono name ("tue").
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    let name = name.trim();
    DAY_NAMES
        .iter()
        .position(|day| day.to_lowercase() == name.to_lowercase())
        .map(|index| WEEKDAYS[index])
        .or_else(|| name.parse().ok())
}

/// Sunday is the only day the shop never opens.
pub fn is_operating_weekday(weekday: Weekday) -> bool {
    weekday != Weekday::Sun
}

/// Half-hour aligned time of day, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotLabel {
    minutes: u16,
}

impl SlotLabel {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour >= 24 || minute % SLOT_MINUTES != 0 || minute >= 60 {
            return None;
        }
        Some(Self {
            minutes: (hour * 60 + minute) as u16,
        })
    }

    /// Seconds are ignored.
    pub fn from_time(time: NaiveTime) -> Option<Self> {
        Self::from_hm(time.hour(), time.minute())
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.minutes) / 60
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minutes) % 60
    }

    pub fn time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// Whether this slot starts strictly after `now`, compared at minute precision.
    pub fn starts_after(&self, now: NaiveTime) -> bool {
        (self.hour(), self.minute()) > (now.hour(), now.minute())
    }

    /// The following slot, if it still falls on the same day.
    pub fn next(&self) -> Option<Self> {
        let minutes = u32::from(self.minutes) + SLOT_MINUTES;
        Self::from_hm(minutes / 60, minutes % 60)
    }

    /// Every slot from `first` to `last`, both inclusive.
    pub fn range_inclusive(first: SlotLabel, last: SlotLabel) -> Vec<SlotLabel> {
        let mut slots = Vec::new();
        let mut current = Some(first);
        while let Some(slot) = current {
            if slot > last {
                break;
            }
            slots.push(slot);
            current = slot.next();
        }
        slots
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for SlotLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("'{}' is not an HH:MM time", s))?;
        let hour: u32 = hour
            .parse()
            .map_err(|_| format!("'{}' is not an HH:MM time", s))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| format!("'{}' is not an HH:MM time", s))?;
        Self::from_hm(hour, minute).ok_or_else(|| format!("'{}' is not a half-hour slot", s))
    }
}

impl TryFrom<String> for SlotLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotLabel> for String {
    fn from(value: SlotLabel) -> Self {
        value.to_string()
    }
}

/// Opening hours: the ordered slot list offered on a weekday.
///
/// Monday to Friday run 12:00 to 19:30, Saturday 12:00 to 15:00.
pub fn opening_slots(weekday: Weekday) -> Vec<SlotLabel> {
    let last = match weekday {
        Weekday::Sun => return Vec::new(),
        Weekday::Sat => SlotLabel::from_hm(15, 0),
        _ => SlotLabel::from_hm(19, 30),
    };
    match (SlotLabel::from_hm(12, 0), last) {
        (Some(first), Some(last)) => SlotLabel::range_inclusive(first, last),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Day {
    pub id: Uuid,
    pub name: String,
    pub weekday: Weekday,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceCategory {
    Base,
    Addon,
}

impl ServiceCategory {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceCategory::Base => "BASE",
            ServiceCategory::Addon => "ADDON",
        }
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASE" => Ok(ServiceCategory::Base),
            "ADDON" => Ok(ServiceCategory::Addon),
            other => Err(format!("unknown service category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceType {
    pub id: Uuid,
    pub name: String,
    pub price: u32,
    pub category: ServiceCategory,
    pub duration_minutes: u32,
}

impl ServiceType {
    /// Number of consecutive slots a booking of this service needs.
    pub fn slots_needed(&self) -> usize {
        let minutes = self.duration_minutes.max(SLOT_MINUTES);
        minutes.div_ceil(SLOT_MINUTES) as usize
    }
}

/// Legacy duration rule for catalog rows without an explicit duration:
/// grooming ("perfil") services take an hour, everything else half an hour.
pub fn legacy_duration_minutes(name: &str) -> u32 {
    if name.to_lowercase().contains("perfil") {
        60
    } else {
        30
    }
}

/// A catalog row as shipped with a fresh install.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSeed {
    pub name: &'static str,
    pub price: u32,
    pub category: ServiceCategory,
    pub duration_minutes: Option<u32>,
}

impl ServiceSeed {
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
            .unwrap_or_else(|| legacy_duration_minutes(self.name))
    }
}

pub const SEED_SERVICES: &[ServiceSeed] = &[
    ServiceSeed {
        name: "Corte de pelo",
        price: 8000,
        category: ServiceCategory::Base,
        duration_minutes: Some(30),
    },
    ServiceSeed {
        name: "Limpieza facial",
        price: 10000,
        category: ServiceCategory::Base,
        duration_minutes: Some(30),
    },
    ServiceSeed {
        name: "Perfilado de barba",
        price: 3000,
        category: ServiceCategory::Addon,
        duration_minutes: Some(60),
    },
    ServiceSeed {
        name: "Perfilado de cejas",
        price: 2000,
        category: ServiceCategory::Addon,
        duration_minutes: None,
    },
    ServiceSeed {
        name: "Líneas",
        price: 1000,
        category: ServiceCategory::Addon,
        duration_minutes: None,
    },
];

/// Monday to Saturday.
pub const OPERATING_WEEKDAYS: [Weekday; 6] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];
