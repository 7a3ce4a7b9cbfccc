use crate::domain::{Task, TimerState};
use crate::error::TrackerError;
use crate::persistence::TaskStore;
use chrono::{DateTime, Utc};
use tracing::info;

/// Task timer state machine over a [`TaskStore`].
///
/// Every operation is one read-modify-write of the store. Callers sharing a
/// store must serialize operations (the HTTP server wraps the tracker in a
/// mutex) or two concurrent starts can both see an empty slot.
pub struct Tracker<S: TaskStore> {
    store: S,
}

impl<S: TaskStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The active task, if any
    pub fn current(&self) -> Result<Option<Task>, TrackerError> {
        Ok(self.store.active_task()?)
    }

    pub fn state(&self) -> Result<TimerState, TrackerError> {
        Ok(TimerState::of(self.current()?.as_ref()))
    }

    /// Finalized tasks in the order they were stopped
    pub fn history(&self) -> Result<Vec<Task>, TrackerError> {
        Ok(self.store.history()?)
    }

    pub fn start(&mut self, name: &str, now: DateTime<Utc>) -> Result<Task, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::name_required());
        }
        if self.store.active_task()?.is_some() {
            return Err(TrackerError::already_in_progress());
        }

        let task = Task::new(name, now);
        self.store.put_active_task(&task)?;
        info!(task_id = %task.id, name = %task.name, "task started");
        Ok(task)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Task, TrackerError> {
        let mut task = self.require_active()?;
        task.pause(now)?;
        self.store.put_active_task(&task)?;
        info!(task_id = %task.id, "task paused");
        Ok(task)
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Task, TrackerError> {
        let mut task = self.require_active()?;
        task.resume(now)?;
        self.store.put_active_task(&task)?;
        info!(task_id = %task.id, paused_ms = task.paused_duration, "task resumed");
        Ok(task)
    }

    /// Finalize the active task, append it to history and empty the slot
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Task, TrackerError> {
        let mut task = self.require_active()?;
        task.finalize(now);
        self.store.append_history(&task)?;
        self.store.clear_active_task()?;
        info!(
            task_id = %task.id,
            duration_ms = task.duration.unwrap_or_default(),
            "task stopped"
        );
        Ok(task)
    }

    fn require_active(&self) -> Result<Task, TrackerError> {
        self.store
            .active_task()?
            .ok_or_else(TrackerError::no_active_task)
    }
}
