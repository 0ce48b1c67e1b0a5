use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Precision, UtcOffset};
use crate::storage::SettingsStore;

use super::{NtpClient, TimeSource};

/// Produces the text placed in a sentinel date field.
///
/// Prefers the time source, degrades silently to the local clock, and shifts the
/// instant by the offset stored in settings (re-read on every call).
#[derive(Debug, Clone)]
pub struct TimeResolver<S = NtpClient> {
    source: S,
    settings: SettingsStore,
}

impl<S: TimeSource> TimeResolver<S> {
    pub fn new(source: S, settings: SettingsStore) -> Self {
        Self { source, settings }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The current UTC instant from the source, or from the local clock if the
    /// source fails. Never errors.
    pub async fn now(&self) -> DateTime<Utc> {
        match self.source.now_utc().await {
            Ok(instant) => instant,
            Err(e) => {
                warn!(error = %e, "network time unavailable, using local clock");
                Utc::now()
            }
        }
    }

    /// The current date (or date and time) in the configured offset.
    pub async fn resolve_date(&self, precision: Precision) -> String {
        let offset = self.settings.load().offset();
        let instant = self.now().await;
        let resolved = format_resolved(instant, offset, precision);
        debug!(%offset, %resolved, "date resolved");
        resolved
    }
}

/// Format a UTC instant shifted by `offset`.
/// Example: 2024-01-01T00:00:00Z with UTC+2 -> "2024-01-01" / "2024-01-01 02:00:00"
pub fn format_resolved(instant: DateTime<Utc>, offset: UtcOffset, precision: Precision) -> String {
    offset
        .apply(instant)
        .format(precision.format_str())
        .to_string()
}
