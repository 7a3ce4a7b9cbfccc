use super::color::color_for;
use crate::error::TrackerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MILLIS_PER_MINUTE: i64 = 60_000;
pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// A tracked task, either active (in the single slot) or finalized (in history).
///
/// All durations are integer milliseconds. Elapsed time is never stored while
/// the task is active; it is recomputed from `start_time`, `paused_duration`
/// and the optional open `pause_start_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque identifier; new tasks get a UUID v4
    pub id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Total time spent in closed pause intervals
    pub paused_duration: i64,
    pub is_paused: bool,
    /// Start of the open pause interval; present iff `is_paused`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Final elapsed-minus-paused time, set once at stop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub color: String,
}

impl Task {
    pub fn new(name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            start_time: now,
            paused_duration: 0,
            is_paused: false,
            pause_start_time: None,
            end_time: None,
            duration: None,
            color: color_for(name),
        }
    }

    /// Open a pause interval at `now`
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        if self.is_paused {
            return Err(TrackerError::already_paused());
        }
        self.is_paused = true;
        self.pause_start_time = Some(now);
        Ok(())
    }

    /// Close the open pause interval, adding its length to `paused_duration`
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        if !self.is_paused {
            return Err(TrackerError::not_paused());
        }
        self.fold_open_pause(now);
        self.is_paused = false;
        self.pause_start_time = None;
        Ok(())
    }

    /// Compute the final duration and stamp `end_time`.
    ///
    /// A task stopped while paused keeps `is_paused` and `pause_start_time`,
    /// but the open interval is counted in `paused_duration` first.
    pub fn finalize(&mut self, now: DateTime<Utc>) {
        if self.is_paused {
            self.fold_open_pause(now);
        }
        let total = millis_between(self.start_time, now);
        self.duration = Some((total - self.paused_duration).max(0));
        self.end_time = Some(now);
    }

    /// Elapsed working time as seen at `now`.
    ///
    /// While paused the value is frozen at the moment the pause began. Clock
    /// skew between the caller and the stored timestamps clamps to zero.
    pub fn observe_elapsed(&self, now: DateTime<Utc>) -> i64 {
        if let Some(duration) = self.duration {
            return duration;
        }
        let observed_at = match (self.is_paused, self.pause_start_time) {
            (true, Some(paused_at)) => paused_at,
            _ => now,
        };
        (millis_between(self.start_time, observed_at) - self.paused_duration).max(0)
    }

    fn fold_open_pause(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.pause_start_time {
            // Negative intervals (clock moved backwards) count as zero
            self.paused_duration += millis_between(paused_at, now).max(0);
        }
    }
}

fn millis_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds()
}

/// Split milliseconds into whole hours and leftover whole minutes
pub fn split_hours_minutes(millis: i64) -> (i64, i64) {
    let millis = millis.max(0);
    (
        millis / MILLIS_PER_HOUR,
        (millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
    )
}

/// Format milliseconds as "Xh Ym" (e.g., "1h 30m", "45m")
pub fn format_duration(millis: i64) -> String {
    let (hours, minutes) = split_hours_minutes(millis);
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format milliseconds as a clock "HH:MM:SS"
pub fn format_clock(millis: i64) -> String {
    let secs = millis.max(0) / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
