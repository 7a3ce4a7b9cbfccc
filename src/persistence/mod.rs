pub mod files;
pub mod settings;
pub mod store;

pub use files::{get_data_dir, init_local_data_dir};
pub use settings::{load_settings, load_settings_unchecked, settings_file, update_settings};
pub use store::{FileStore, TaskStore};

#[cfg(test)]
pub use store::{FailingStore, MemoryStore};
