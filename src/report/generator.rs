use crate::domain::{format_duration, Task, TimerState};
use crate::persistence::files::atomic_write;
use crate::report::calendar::{day_total, group_by_date};
use crate::report::stats::{daily_average, monthly_project_count, target_percentage};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::path::{Path, PathBuf};

/// Format percentage with 1 decimal place
fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Inputs for a monthly markdown report
pub struct MonthReport<'a, Tz: TimeZone> {
    pub year: i32,
    pub month: u32,
    pub history: &'a [Task],
    pub active: Option<&'a Task>,
    pub target_hours: f64,
    pub tz: &'a Tz,
    pub now: DateTime<Utc>,
}

impl<'a, Tz: TimeZone> MonthReport<'a, Tz> {
    /// Render the report as markdown
    pub fn render(&self) -> String {
        let days = group_by_date(self.history, self.year, self.month, self.tz);
        let month_total: i64 = days.values().map(|entries| day_total(entries)).sum();
        let days_on_target = days
            .values()
            .filter(|entries| target_percentage(day_total(entries), self.target_hours) >= 100.0)
            .count();

        let title = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month));

        let mut report = String::new();
        report.push_str(&format!("# Monthly Report - {}\n\n", title));

        // Summary
        report.push_str("## Summary\n\n");
        report.push_str(&format!(
            "- **Tasks:** {}\n",
            monthly_project_count(self.history, self.year, self.month, self.tz)
        ));
        report.push_str(&format!("- **Total Time:** {}\n", format_duration(month_total)));
        report.push_str(&format!("- **Active Days:** {}\n", days.len()));
        report.push_str(&format!(
            "- **Days On Target ({}h):** {}\n",
            self.target_hours, days_on_target
        ));
        report.push_str(&format!(
            "- **Daily Average (all history):** {}\n\n",
            format_duration(daily_average(self.history, self.tz))
        ));

        if let Some(task) = self.active {
            let state = TimerState::of(Some(task));
            report.push_str("## In Progress\n\n");
            report.push_str(&format!(
                "- [{}] **{}** {} so far\n\n",
                state.to_tag(),
                task.name,
                format_duration(task.observe_elapsed(self.now))
            ));
        }

        if days.is_empty() {
            report.push_str("_No tasks recorded this month._\n");
            return report;
        }

        // Calendar
        report.push_str("## Calendar\n\n");
        report.push_str("| Date | Total | Target | Tasks |\n");
        report.push_str("|------|-------|--------|-------|\n");
        for (date, entries) in &days {
            let total = day_total(entries);
            report.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                date,
                format_duration(total),
                format_percent(target_percentage(total, self.target_hours)),
                entries.len()
            ));
        }
        report.push('\n');

        // Tasks Breakdown
        report.push_str("## Tasks Breakdown\n\n");
        for (date, entries) in &days {
            report.push_str(&format!("### {}\n\n", date));
            for entry in entries {
                report.push_str(&format!(
                    "- **{}** {}h {}m",
                    entry.task.name, entry.hours, entry.minutes
                ));
                if entry.task.paused_duration > 0 {
                    report.push_str(&format!(
                        " (paused {})",
                        format_duration(entry.task.paused_duration)
                    ));
                }
                report.push('\n');
            }
            report.push('\n');
        }

        report
    }

    /// Render and write the report, defaulting to `report-YYYY-MM.md` in `data_dir`
    pub fn write(&self, data_dir: &Path, output_path: Option<PathBuf>) -> Result<PathBuf> {
        let output = output_path.unwrap_or_else(|| {
            data_dir.join(format!("report-{}-{:02}.md", self.year, self.month))
        });
        atomic_write(&output, &self.render())?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn finished(name: &str, start: DateTime<Utc>, minutes: i64) -> Task {
        let mut task = Task::new(name, start);
        task.finalize(start + Duration::minutes(minutes));
        task
    }

    fn report<'a>(history: &'a [Task], active: Option<&'a Task>) -> MonthReport<'a, Utc> {
        MonthReport {
            year: 2024,
            month: 3,
            history,
            active,
            target_hours: 8.0,
            tz: &Utc,
            now: Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_month() {
        let text = report(&[], None).render();
        assert!(text.starts_with("# Monthly Report - March 2024"));
        assert!(text.contains("- **Tasks:** 0"));
        assert!(text.contains("_No tasks recorded this month._"));
    }

    #[test]
    fn test_calendar_rows_and_breakdown() {
        let history = vec![
            finished("Writing", Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(), 90),
            finished("Review", Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap(), 30),
            finished("Deep work", Utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap(), 480),
        ];
        let text = report(&history, None).render();

        assert!(text.contains("| 2024-03-15 | 2h 0m | 25.0% | 2 |"));
        assert!(text.contains("| 2024-03-16 | 8h 0m | 100.0% | 1 |"));
        assert!(text.contains("- **Days On Target (8h):** 1"));
        assert!(text.contains("- **Writing** 1h 30m"));
    }

    #[test]
    fn test_in_progress_section() {
        let active = Task::new("Writing", Utc.with_ymd_and_hms(2024, 3, 20, 11, 15, 0).unwrap());
        let text = report(&[], Some(&active)).render();
        assert!(text.contains("- [RUNNING] **Writing** 45m so far"));
    }

    #[test]
    fn test_write_report_default_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = report(&[], None).write(temp_dir.path(), None).unwrap();

        assert_eq!(path, temp_dir.path().join("report-2024-03.md"));
        assert!(std::fs::read_to_string(path).unwrap().contains("March 2024"));
    }
}
