use crate::domain::{format_duration, Task, TimerState};
use crate::error::TrackerError;
use crate::persistence::TaskStore;
use crate::report::{local_date, Statistics};
use crate::tracker::Tracker;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

/// State behind the terminal dashboard
///
/// Holds a snapshot of the store that is refreshed on a timer, so changes made
/// by another process (CLI or HTTP server) show up without restarting.
pub struct DashboardApp<S: TaskStore, Tz: TimeZone = Local> {
    tracker: Tracker<S>,
    tz: Tz,
    pub target_hours: f64,
    pub current: Option<Task>,
    pub history: Vec<Task>,
    pub now: DateTime<Utc>,
    /// Last error or confirmation shown in the status line
    pub status: Option<String>,
}

impl<S: TaskStore, Tz: TimeZone> DashboardApp<S, Tz> {
    pub fn new(tracker: Tracker<S>, tz: Tz, target_hours: f64, now: DateTime<Utc>) -> Self {
        let mut app = Self {
            tracker,
            tz,
            target_hours,
            current: None,
            history: Vec::new(),
            now,
            status: None,
        };
        app.reload();
        app
    }

    pub fn state(&self) -> TimerState {
        TimerState::of(self.current.as_ref())
    }

    pub fn today(&self) -> NaiveDate {
        local_date(&self.now, &self.tz)
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    /// Elapsed time of the active task as of the last tick
    pub fn elapsed(&self) -> i64 {
        self.current
            .as_ref()
            .map(|task| task.observe_elapsed(self.now))
            .unwrap_or(0)
    }

    /// Today's finished total plus the active task, when it started today
    pub fn live_today_total(&self, stats: &Statistics) -> i64 {
        let started_today = self
            .current
            .as_ref()
            .is_some_and(|task| local_date(&task.start_time, &self.tz) == self.today());
        if started_today {
            stats.today_total + self.elapsed()
        } else {
            stats.today_total
        }
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::compute(&self.history, self.today(), &self.tz, self.target_hours)
    }

    /// Advance the clock without touching the store
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    /// Re-read the active task and history from the store
    pub fn reload(&mut self) {
        let snapshot = self
            .tracker
            .current()
            .and_then(|current| Ok((current, self.tracker.history()?)));
        match snapshot {
            Ok((current, history)) => {
                self.current = current;
                self.history = history;
            }
            Err(e) => self.report(e),
        }
    }

    /// Pause a running task or resume a paused one at `now`
    pub fn toggle_pause(&mut self, now: DateTime<Utc>) {
        self.tick(now);
        let result = match self.state() {
            TimerState::Running => self.tracker.pause(self.now),
            TimerState::Paused => self.tracker.resume(self.now),
            TimerState::Idle => Err(TrackerError::no_active_task()),
        };
        match result {
            Ok(task) => {
                self.status = None;
                self.current = Some(task);
            }
            Err(e) => self.report(e),
        }
    }

    pub fn stop(&mut self, now: DateTime<Utc>) {
        self.tick(now);
        match self.tracker.stop(self.now) {
            Ok(task) => {
                self.status = Some(format!(
                    "Stopped {} after {}",
                    task.name,
                    format_duration(task.duration.unwrap_or(0))
                ));
                self.current = None;
                self.history.push(task);
            }
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, error: TrackerError) {
        self.status = Some(error.to_string());
    }
}
