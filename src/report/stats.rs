use crate::domain::{split_hours_minutes, Task, MILLIS_PER_HOUR};
use crate::report::calendar::finalized;
use chrono::{Datelike, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::HashSet;

/// Summary figures shown alongside the calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Milliseconds tracked on `today`
    pub today_total: i64,
    pub today_hours: i64,
    pub today_minutes: i64,
    /// Progress of today's total against the daily target, capped at 100
    pub today_percentage: f64,
    /// Finalized tasks started in today's month
    pub month_count: usize,
    /// Milliseconds per active day across all history
    pub daily_average: i64,
    pub target_hours: f64,
}

impl Statistics {
    pub fn compute<Tz: TimeZone>(tasks: &[Task], today: NaiveDate, tz: &Tz, target_hours: f64) -> Self {
        let today_total = daily_total(tasks, today, tz);
        let (today_hours, today_minutes) = split_hours_minutes(today_total);

        Self {
            today_total,
            today_hours,
            today_minutes,
            today_percentage: target_percentage(today_total, target_hours),
            month_count: monthly_project_count(tasks, today.year(), today.month(), tz),
            daily_average: daily_average(tasks, tz),
            target_hours,
        }
    }
}

/// Sum of durations of finalized tasks started on `date`
pub fn daily_total<Tz: TimeZone>(tasks: &[Task], date: NaiveDate, tz: &Tz) -> i64 {
    finalized(tasks, tz)
        .filter(|(_, _, day)| *day == date)
        .map(|(_, duration, _)| duration)
        .sum()
}

/// Number of finalized tasks started in `year`/`month`; repeated names count separately
pub fn monthly_project_count<Tz: TimeZone>(tasks: &[Task], year: i32, month: u32, tz: &Tz) -> usize {
    finalized(tasks, tz)
        .filter(|(_, _, day)| day.year() == year && day.month() == month)
        .count()
}

/// Total tracked time divided by the number of distinct days with any task
pub fn daily_average<Tz: TimeZone>(tasks: &[Task], tz: &Tz) -> i64 {
    let mut days = HashSet::new();
    let mut total = 0;

    for (_, duration, day) in finalized(tasks, tz) {
        days.insert(day);
        total += duration;
    }

    if days.is_empty() {
        0
    } else {
        total / days.len() as i64
    }
}

/// `min(100, hours / target * 100)`; a non-positive target counts as met
pub fn target_percentage(total_millis: i64, target_hours: f64) -> f64 {
    if target_hours <= 0.0 {
        return if total_millis > 0 { 100.0 } else { 0.0 };
    }
    let hours = total_millis.max(0) as f64 / MILLIS_PER_HOUR as f64;
    (hours / target_hours * 100.0).min(100.0)
}
