// TaskTracker - single-user task list persisted in a local SQLite table

pub mod config;
pub mod display;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::Config;
pub use store::TaskStore;
pub use task::{Task, TaskStats, TaskStatus};
