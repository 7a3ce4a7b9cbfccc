use serde::{Deserialize, Serialize};

/// Lifecycle state of the active-task slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    /// No task is active
    Idle,
    Running,
    Paused,
}

impl TimerState {
    /// Derive the state from the contents of the active slot
    pub fn of(active: Option<&super::Task>) -> Self {
        match active {
            None => Self::Idle,
            Some(task) if task.is_paused => Self::Paused,
            Some(_) => Self::Running,
        }
    }

    /// Short uppercase label used by the CLI and dashboard
    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
        }
    }
}
