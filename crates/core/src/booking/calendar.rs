//! Date rules: the reservable window, the current week and date parsing.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::errors::{BookingError, BookingResult};
use crate::models::catalog::day_name;
use crate::models::report::{ReservableWindow, WeekDay};

/// Dates a client may book from `today`.
///
/// Monday to Saturday: today through this week's Saturday. Sunday: next
/// week's Monday through Saturday.
pub fn reservable_window(today: NaiveDate) -> ReservableWindow {
    if today.weekday() == Weekday::Sun {
        let monday = today + Duration::days(1);
        return ReservableWindow {
            from: monday,
            to: monday + Duration::days(5),
        };
    }

    ReservableWindow {
        from: today,
        to: monday_of(today) + Duration::days(5),
    }
}

pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Monday through Sunday of the week containing `today`.
pub fn current_week(today: NaiveDate) -> Vec<WeekDay> {
    let monday = monday_of(today);
    (0..7)
        .map(|offset| {
            let date = monday + Duration::days(offset);
            WeekDay {
                date,
                label: format!("{} {:02}", day_name(date.weekday()), date.day()),
            }
        })
        .collect()
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidDate(raw.to_string()))
}

/// `dd-mm-YYYY`, the format shown to clients.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}
