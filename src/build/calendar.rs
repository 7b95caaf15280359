use crate::feed::models::GtfsCalendar;
use crate::plan::{DayPattern, ServiceWindow};
use chrono::NaiveDate;
use std::{collections::HashMap, sync::Arc};

pub struct CalendarEntry {
    pub service_id: String,
    pub days: DayPattern,
}

/// Deduplicated service calendar. Windows active on the same days share a
/// service ID, and entries keep the order the windows first used them.
pub struct ServiceCalendar {
    entries: Vec<CalendarEntry>,
    by_window: HashMap<Arc<str>, String>,
}

impl ServiceCalendar {
    pub fn resolve(windows: &[ServiceWindow]) -> Self {
        let mut entries: Vec<CalendarEntry> = Vec::new();
        let mut by_window = HashMap::with_capacity(windows.len());
        for window in windows {
            let service_id = window.days.service_id();
            if !entries.iter().any(|entry| entry.service_id == service_id) {
                entries.push(CalendarEntry {
                    service_id: service_id.clone(),
                    days: window.days,
                });
            }
            by_window.insert(window.id.clone(), service_id);
        }
        Self { entries, by_window }
    }

    pub fn service_for(&self, window_id: &str) -> Option<&str> {
        self.by_window.get(window_id).map(String::as_str)
    }

    pub fn entries(&self) -> &[CalendarEntry] {
        &self.entries
    }

    /// One `calendar.txt` row per distinct day pattern, all spanning the
    /// feed's date range.
    pub fn rows(&self, start_date: NaiveDate, end_date: NaiveDate) -> Vec<GtfsCalendar> {
        self.entries
            .iter()
            .map(|entry| {
                let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] =
                    entry.days.days().map(u8::from);
                GtfsCalendar {
                    service_id: entry.service_id.clone(),
                    monday,
                    tuesday,
                    wednesday,
                    thursday,
                    friday,
                    saturday,
                    sunday,
                    start_date,
                    end_date,
                }
            })
            .collect()
    }
}

#[cfg(test)]
use crate::shared::Time;

#[cfg(test)]
fn window(id: &str, days: [bool; 7]) -> ServiceWindow {
    ServiceWindow {
        id: Arc::from(id),
        start: Time::from_seconds(6 * 3600),
        end: Time::from_seconds(9 * 3600),
        days: DayPattern::new(days),
    }
}

#[test]
fn windows_sharing_days_share_a_service() {
    let weekdays = [true, true, true, true, true, false, false];
    let weekend = [false, false, false, false, false, true, true];
    let calendar = ServiceCalendar::resolve(&[
        window("peak", weekdays),
        window("midday", weekdays),
        window("saturday", weekend),
    ]);
    assert_eq!(calendar.entries().len(), 2);
    assert_eq!(calendar.service_for("peak"), Some("srv1111100"));
    assert_eq!(calendar.service_for("midday"), Some("srv1111100"));
    assert_eq!(calendar.service_for("saturday"), Some("srv0000011"));
}

#[test]
fn entries_keep_first_seen_order() {
    let calendar = ServiceCalendar::resolve(&[
        window("late", [false, false, false, false, false, false, true]),
        window("peak", [true, true, true, true, true, false, false]),
    ]);
    let ids: Vec<&str> = calendar
        .entries()
        .iter()
        .map(|entry| entry.service_id.as_str())
        .collect();
    assert_eq!(ids, ["srv0000001", "srv1111100"]);
}

#[test]
fn rows_span_the_feed_dates() {
    let calendar = ServiceCalendar::resolve(&[window(
        "peak",
        [true, false, false, false, false, false, false],
    )]);
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
    let rows = calendar.rows(start, end);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].monday, 1);
    assert_eq!(rows[0].tuesday, 0);
    assert_eq!(rows[0].start_date, start);
    assert_eq!(rows[0].end_date, end);
}
