use super::files::{atomic_write, ensure_dir, read_optional, remove_if_exists};
use crate::domain::Task;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const ACTIVE_TASK_FILE: &str = "current_task.json";
const HISTORY_FILE: &str = "tasks.json";

/// Key-value collaborator holding the single active-task slot and the
/// append-only history list.
pub trait TaskStore {
    fn active_task(&self) -> Result<Option<Task>>;
    fn put_active_task(&mut self, task: &Task) -> Result<()>;
    fn clear_active_task(&mut self) -> Result<()>;
    fn history(&self) -> Result<Vec<Task>>;
    fn append_history(&mut self, task: &Task) -> Result<()>;
}

/// Store backed by two JSON blobs in a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = ensure_dir(dir)?;
        Ok(Self { dir })
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_TASK_FILE)
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }
}

impl TaskStore for FileStore {
    fn active_task(&self) -> Result<Option<Task>> {
        let path = self.active_path();
        match read_optional(&path)? {
            None => Ok(None),
            Some(content) if content.trim().is_empty() => Ok(None),
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Corrupt active task in {}", path.display())),
        }
    }

    fn put_active_task(&mut self, task: &Task) -> Result<()> {
        let json = serde_json::to_string_pretty(task)?;
        atomic_write(self.active_path(), &json)
    }

    fn clear_active_task(&mut self) -> Result<()> {
        remove_if_exists(self.active_path())
    }

    fn history(&self) -> Result<Vec<Task>> {
        let path = self.history_path();
        match read_optional(&path)? {
            None => Ok(Vec::new()),
            Some(content) if content.trim().is_empty() => Ok(Vec::new()),
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Corrupt task history in {}", path.display())),
        }
    }

    fn append_history(&mut self, task: &Task) -> Result<()> {
        let mut tasks = self.history()?;
        tasks.push(task.clone());
        let json = serde_json::to_string_pretty(&tasks)?;
        atomic_write(self.history_path(), &json)
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub active: Option<Task>,
    pub tasks: Vec<Task>,
}

#[cfg(test)]
impl TaskStore for MemoryStore {
    fn active_task(&self) -> Result<Option<Task>> {
        Ok(self.active.clone())
    }

    fn put_active_task(&mut self, task: &Task) -> Result<()> {
        self.active = Some(task.clone());
        Ok(())
    }

    fn clear_active_task(&mut self) -> Result<()> {
        self.active = None;
        Ok(())
    }

    fn history(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn append_history(&mut self, task: &Task) -> Result<()> {
        self.tasks.push(task.clone());
        Ok(())
    }
}

/// Store whose reads and writes always fail
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct FailingStore;

#[cfg(test)]
impl TaskStore for FailingStore {
    fn active_task(&self) -> Result<Option<Task>> {
        anyhow::bail!("store offline")
    }

    fn put_active_task(&mut self, _task: &Task) -> Result<()> {
        anyhow::bail!("store offline")
    }

    fn clear_active_task(&mut self) -> Result<()> {
        anyhow::bail!("store offline")
    }

    fn history(&self) -> Result<Vec<Task>> {
        anyhow::bail!("store offline")
    }

    fn append_history(&mut self, _task: &Task) -> Result<()> {
        anyhow::bail!("store offline")
    }
}
