use std::path::PathBuf;
use std::time::Duration;

use crate::clock::{NtpClient, DEFAULT_NTP_SERVER, DEFAULT_NTP_TIMEOUT};
use crate::storage::SettingsStore;

/// Where the tool keeps its state and how it reaches the network clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the settings record
    pub data_dir: PathBuf,
    /// Where auto-named exports go; next to the ledger when unset
    pub export_dir: Option<PathBuf>,
    pub ntp_server: String,
    pub ntp_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            export_dir: None,
            ntp_server: DEFAULT_NTP_SERVER.to_string(),
            ntp_timeout: DEFAULT_NTP_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn settings_store(&self) -> SettingsStore {
        SettingsStore::in_dir(&self.data_dir)
    }

    pub fn ntp_client(&self) -> NtpClient {
        NtpClient::new(self.ntp_server.clone(), self.ntp_timeout)
    }
}
