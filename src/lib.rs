pub mod application;
pub mod cli;
pub mod clock;
pub mod config;
pub mod domain;
pub mod storage;

pub use application::{EntryService, ImportManager};
pub use domain::*;
pub use storage::{LedgerFile, SettingsStore};
