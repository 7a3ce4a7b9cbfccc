use thiserror::Error;

/// Failures surfaced by timer operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Caller supplied unusable input (e.g. a blank task name)
    #[error("{0}")]
    InvalidInput(String),

    /// Operation conflicts with the current timer state
    #[error("{0}")]
    Conflict(String),

    /// Operation needs an active task and there is none
    #[error("{0}")]
    NotFound(String),

    /// The backing store could not be read or written
    #[error("Storage unavailable: {0:#}")]
    StorageUnavailable(#[from] anyhow::Error),
}

impl TrackerError {
    pub fn name_required() -> Self {
        Self::InvalidInput("Task name is required".to_string())
    }

    pub fn already_in_progress() -> Self {
        Self::Conflict("A task is already in progress".to_string())
    }

    pub fn already_paused() -> Self {
        Self::Conflict("Task is already paused".to_string())
    }

    pub fn not_paused() -> Self {
        Self::Conflict("Task is not paused".to_string())
    }

    pub fn no_active_task() -> Self {
        Self::NotFound("No task in progress".to_string())
    }

    /// True for errors the caller can fix by changing the request
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::StorageUnavailable(_))
    }
}
