// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use finmon::application::{EntryService, ImportManager};
use finmon::clock::{TimeError, TimeResolver, TimeSource};
use finmon::storage::SettingsStore;
use tempfile::TempDir;

/// Time source that always answers with the same instant
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl TimeSource for FixedClock {
    async fn now_utc(&self) -> Result<DateTime<Utc>, TimeError> {
        Ok(self.0)
    }
}

/// Time source that behaves like an unreachable NTP server
#[derive(Debug, Clone)]
pub struct OfflineClock;

impl TimeSource for OfflineClock {
    async fn now_utc(&self) -> Result<DateTime<Utc>, TimeError> {
        Err(TimeError::Timeout(Duration::from_secs(2)))
    }
}

/// Helper to create a test service with a temporary data directory
pub fn test_service<S: TimeSource>(source: S) -> Result<(EntryService<S>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let settings = SettingsStore::in_dir(temp_dir.path());
    let service = EntryService::new(
        ImportManager::new(settings.clone()),
        TimeResolver::new(source, settings),
    );
    Ok((service, temp_dir))
}

/// Helper to create a test service whose clock reads 2024-01-01T00:00:00Z
pub fn new_year_service() -> Result<(EntryService<FixedClock>, TempDir)> {
    test_service(FixedClock(parse_date("2024-01-01")))
}

/// Helper to mount a ledger named `name` inside the temp dir
pub fn mount_ledger<S: TimeSource>(
    service: &EntryService<S>,
    temp_dir: &TempDir,
    name: &str,
) -> Result<PathBuf> {
    let path = temp_dir.path().join(name);
    service.imports().mount(&path)?;
    Ok(path)
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}
