use serde::{Deserialize, Serialize};

use super::UtcOffset;

/// The persisted preferences record. Saved wholesale on every write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the mounted ledger; empty when nothing is mounted
    #[serde(default)]
    pub imported_file: String,
    /// Timezone descriptor such as "UTC+2"; absent means UTC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl Settings {
    /// The mounted ledger path, if any.
    pub fn mounted_path(&self) -> Option<&str> {
        if self.imported_file.is_empty() {
            None
        } else {
            Some(self.imported_file.as_str())
        }
    }

    pub fn offset(&self) -> UtcOffset {
        UtcOffset::from_setting(self.time.as_deref())
    }
}
