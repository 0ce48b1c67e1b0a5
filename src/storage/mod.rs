mod ledger_file;
mod settings_store;

pub use ledger_file::*;
pub use settings_store::*;

use std::path::PathBuf;
use thiserror::Error;

/// I/O failures on the settings record or the ledger file.
/// Every variant keeps the path involved and the underlying cause.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to export to {path}: {source}")]
    ExportFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save settings to {path}: {source}")]
    SettingsWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
