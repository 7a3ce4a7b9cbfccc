use crate::domain::{split_hours_minutes, Task};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A finalized task placed on the calendar, with its duration pre-split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    #[serde(flatten)]
    pub task: Task,
    pub hours: i64,
    pub minutes: i64,
}

impl CalendarEntry {
    fn new(task: &Task, duration: i64) -> Self {
        let (hours, minutes) = split_hours_minutes(duration);
        Self {
            task: task.clone(),
            hours,
            minutes,
        }
    }

    pub fn duration(&self) -> i64 {
        self.task.duration.unwrap_or_default()
    }
}

/// Date key ("YYYY-MM-DD") to the tasks started on that day, in history order
pub type CalendarMonth = BTreeMap<String, Vec<CalendarEntry>>;

/// Calendar date of `instant` in the given zone
pub fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Finalized tasks paired with their duration and local start date
pub(crate) fn finalized<'a, Tz: TimeZone + 'a>(
    tasks: &'a [Task],
    tz: &'a Tz,
) -> impl Iterator<Item = (&'a Task, i64, NaiveDate)> + 'a {
    tasks.iter().filter_map(move |task| {
        task.duration
            .map(|duration| (task, duration, local_date(&task.start_time, tz)))
    })
}

/// Group the finalized tasks started in `year`/`month` by start date
pub fn group_by_date<Tz: TimeZone>(tasks: &[Task], year: i32, month: u32, tz: &Tz) -> CalendarMonth {
    let mut days = CalendarMonth::new();

    for (task, duration, date) in finalized(tasks, tz) {
        if date.year() == year && date.month() == month {
            days.entry(date.format(DATE_KEY_FORMAT).to_string())
                .or_default()
                .push(CalendarEntry::new(task, duration));
        }
    }

    days
}

/// Total duration of one calendar day's entries
pub fn day_total(entries: &[CalendarEntry]) -> i64 {
    entries.iter().map(CalendarEntry::duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use pretty_assertions::assert_eq;

    fn finished(name: &str, start: DateTime<Utc>, minutes: i64) -> Task {
        let mut task = Task::new(name, start);
        task.finalize(start + Duration::minutes(minutes));
        task
    }

    #[test]
    fn test_empty_history_is_empty_calendar() {
        assert!(group_by_date(&[], 2024, 3, &Utc).is_empty());
    }

    #[test]
    fn test_hours_and_minutes_split() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let task = finished("Writing", start, 90);
        assert_eq!(task.duration, Some(5_400_000));

        let days = group_by_date(&[task], 2024, 3, &Utc);
        let entries = &days["2024-03-15"];
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].hours, entries[0].minutes), (1, 30));
    }

    #[test]
    fn test_filters_month_and_unfinalized() {
        let march = Utc.with_ymd_and_hms(2024, 3, 31, 22, 0, 0).unwrap();
        let april = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        let running = Task::new("Running", march);
        let tasks = vec![finished("A", march, 30), finished("B", april, 30), running];

        let days = group_by_date(&tasks, 2024, 3, &Utc);
        assert_eq!(days.keys().collect::<Vec<_>>(), vec!["2024-03-31"]);
        assert_eq!(days["2024-03-31"].len(), 1);
        assert_eq!(days["2024-03-31"][0].task.name, "A");
    }

    #[test]
    fn test_multiple_tasks_same_day_keep_order() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        let tasks = vec![
            finished("Writing", morning, 60),
            finished("Writing", morning + Duration::hours(2), 45),
            finished("Review", morning + Duration::hours(4), 15),
        ];

        let days = group_by_date(&tasks, 2024, 3, &Utc);
        let names: Vec<_> = days["2024-03-15"].iter().map(|e| e.task.name.as_str()).collect();
        assert_eq!(names, vec!["Writing", "Writing", "Review"]);
        assert_eq!(day_total(&days["2024-03-15"]), 120 * 60_000);
    }

    #[test]
    fn test_date_boundary_follows_zone() {
        // 23:30 UTC on the 31st is already April 1st at UTC+2
        let start = Utc.with_ymd_and_hms(2024, 3, 31, 23, 30, 0).unwrap();
        let tasks = vec![finished("Late", start, 20)];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert!(group_by_date(&tasks, 2024, 3, &plus_two).is_empty());
        assert!(group_by_date(&tasks, 2024, 4, &plus_two).contains_key("2024-04-01"));
        assert!(group_by_date(&tasks, 2024, 3, &Utc).contains_key("2024-03-31"));
    }

    #[test]
    fn test_entry_serializes_flat() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let days = group_by_date(&[finished("Writing", start, 90)], 2024, 3, &Utc);
        let value = serde_json::to_value(&days).unwrap();

        let entry = &value["2024-03-15"][0];
        assert_eq!(entry["name"], "Writing");
        assert_eq!(entry["duration"], 5_400_000);
        assert_eq!(entry["hours"], 1);
        assert_eq!(entry["minutes"], 30);
    }
}
