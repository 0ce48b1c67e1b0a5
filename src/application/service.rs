use std::path::{Path, PathBuf};

use tracing::info;

use crate::clock::{DatePreview, NtpClient, TimeResolver, TimeSource};
use crate::config::AppConfig;
use crate::domain::{is_date_sentinel, is_numeric_amount, LedgerEntry, Precision, UtcOffset};
use crate::storage::{LedgerFile, SettingsStore};

use super::{AppError, ImportManager, ValidationError};

/// Application service behind the entry form.
/// This is the primary interface for any host (CLI, GUI, ...).
pub struct EntryService<S = NtpClient> {
    imports: ImportManager,
    resolver: TimeResolver<S>,
    precision: Precision,
    export_dir: Option<PathBuf>,
}

impl EntryService<NtpClient> {
    /// Wire a service with the network clock and settings described by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let settings = config.settings_store();
        let resolver = TimeResolver::new(config.ntp_client(), settings.clone());
        let mut service = Self::new(ImportManager::new(settings), resolver);
        service.export_dir = config.export_dir.clone();
        service
    }
}

impl<S: TimeSource> EntryService<S> {
    pub fn new(imports: ImportManager, resolver: TimeResolver<S>) -> Self {
        Self {
            imports,
            resolver,
            precision: Precision::default(),
            export_dir: None,
        }
    }

    /// Resolve sentinel dates with this precision (date only by default).
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Send auto-named exports to this directory instead of next to the ledger.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    pub fn imports(&self) -> &ImportManager {
        &self.imports
    }

    pub fn resolver(&self) -> &TimeResolver<S> {
        &self.resolver
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    fn settings(&self) -> &SettingsStore {
        self.imports.settings()
    }

    // ========================
    // Entry operations
    // ========================

    /// Check the raw form fields. The first failing check wins.
    /// Returns the mounted ledger path when everything is in order.
    pub fn validate(
        &self,
        amount_text: &str,
        description_text: &str,
        date_text: &str,
    ) -> Result<PathBuf, ValidationError> {
        let fields = [amount_text, description_text, date_text];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(ValidationError::MissingFields);
        }

        if !is_numeric_amount(amount_text) {
            return Err(ValidationError::InvalidAmount);
        }

        self.imports.current().ok_or(ValidationError::NotMounted)
    }

    /// Validate one submission and append it to the mounted ledger.
    ///
    /// A sentinel date is replaced by the resolved current date; any other date
    /// text is written verbatim. On success the caller should clear its inputs.
    pub async fn submit(
        &self,
        amount_text: &str,
        description_text: &str,
        date_text: &str,
    ) -> Result<LedgerEntry, AppError> {
        let path = self.validate(amount_text, description_text, date_text)?;

        let date = if is_date_sentinel(date_text) {
            self.resolver.resolve_date(self.precision).await
        } else {
            date_text.to_string()
        };

        let entry = LedgerEntry::new(amount_text, description_text, date);
        LedgerFile::new(&path).append(&entry)?;

        info!(path = %path.display(), record = %entry, "record submitted");
        Ok(entry)
    }

    /// Raw content of the mounted ledger.
    pub fn read_ledger(&self) -> Result<String, AppError> {
        let path = self.imports.current().ok_or(ValidationError::NotMounted)?;
        Ok(LedgerFile::new(path).read_all()?)
    }

    /// Export the mounted ledger. Without an explicit destination the copy gets an
    /// auto-derived name in the export directory, or next to the ledger.
    pub fn export(&self, destination: Option<&Path>) -> Result<PathBuf, AppError> {
        let path = self.imports.current().ok_or(ValidationError::NotMounted)?;
        let ledger = LedgerFile::new(path);

        let written = match (destination, &self.export_dir) {
            (None, Some(dir)) => ledger.export_into(dir)?,
            (destination, _) => ledger.export(destination)?,
        };
        Ok(written)
    }

    // ========================
    // Timezone preference
    // ========================

    /// The configured offset; UTC when unset or unparseable.
    pub fn timezone(&self) -> UtcOffset {
        self.settings().load().offset()
    }

    /// Persist a new timezone descriptor such as "UTC+2". The stored value is
    /// normalized, so later reads always parse.
    pub fn set_timezone(&self, descriptor: &str) -> Result<UtcOffset, AppError> {
        let offset = descriptor
            .parse::<UtcOffset>()
            .map_err(|e| ValidationError::InvalidTimezone {
                descriptor: descriptor.to_string(),
                reason: e.to_string(),
            })?;

        self.settings()
            .update(|settings| settings.time = Some(offset.to_string()))?;

        info!(%offset, "timezone updated");
        Ok(offset)
    }
}

impl<S> EntryService<S>
where
    S: TimeSource + Clone + 'static,
{
    /// A live preview for a date field, resolving with this service's precision.
    pub fn date_preview(
        &self,
    ) -> (DatePreview<S>, tokio::sync::mpsc::UnboundedReceiver<String>) {
        DatePreview::new(self.resolver.clone(), self.precision)
    }
}
