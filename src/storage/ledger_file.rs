use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::LedgerEntry;

use super::StorageError;

const MAX_EXPORT_ATTEMPTS: u32 = 1000;

/// File name used for an export when the caller does not pick a destination.
/// Example: "exported_20240101T093000Z.txt"
pub fn export_file_name(at: DateTime<Utc>) -> String {
    numbered_export_file_name(at, 0)
}

/// Example: "exported_20240101T093000Z_2.txt" for the third export in one second
fn numbered_export_file_name(at: DateTime<Utc>, n: u32) -> String {
    let stamp = at.format("%Y%m%dT%H%M%SZ");
    if n == 0 {
        format!("exported_{stamp}.txt")
    } else {
        format!("exported_{stamp}_{n}.txt")
    }
}

/// The append-only plain-text ledger.
///
/// Each record is one `amount, description, date;` line. The file is owned by the
/// user: it is created empty when missing, appended to, read and copied, but never
/// truncated or deleted. Callers must serialize access to a given path.
#[derive(Debug, Clone)]
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty file if none exists. Existing content is left alone.
    pub fn ensure_exists(&self) -> Result<(), StorageError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StorageError::WriteFailure {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }

    /// Append one record.
    ///
    /// If the file does not end with a newline, one is written first so the new
    /// record starts on its own line. Afterwards the file always ends with `\n`.
    /// The file must already exist.
    pub fn append(&self, entry: &LedgerEntry) -> Result<(), StorageError> {
        let failure = |source| StorageError::WriteFailure {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(failure)?;

        let mut line = String::new();
        if !ends_with_newline(&mut file).map_err(failure)? {
            line.push('\n');
        }
        line.push_str(&entry.to_line());

        file.write_all(line.as_bytes()).map_err(failure)?;
        file.flush().map_err(failure)?;

        debug!(path = %self.path.display(), record = %entry, "record appended");
        Ok(())
    }

    /// The full raw content of the ledger.
    pub fn read_all(&self) -> Result<String, StorageError> {
        fs::read_to_string(&self.path).map_err(|source| StorageError::ReadFailure {
            path: self.path.clone(),
            source,
        })
    }

    /// Copy the ledger to `destination`, or to an auto-named file next to the
    /// ledger when none is given. Trailing whitespace of the source is dropped and
    /// the copy ends with exactly one newline. Returns the destination path.
    ///
    /// An explicit destination is overwritten, unless it is the ledger itself.
    pub fn export(&self, destination: Option<&Path>) -> Result<PathBuf, StorageError> {
        match destination {
            Some(path) => self.export_to(path),
            None => self.export_into(self.path.parent().unwrap_or_else(|| Path::new(""))),
        }
    }

    fn export_to(&self, destination: &Path) -> Result<PathBuf, StorageError> {
        let exported = self.exported_content()?;
        let failure = |source| StorageError::ExportFailure {
            path: destination.to_path_buf(),
            source,
        };

        if self.is_same_file(destination) {
            return Err(failure(io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination is the ledger itself",
            )));
        }

        fs::write(destination, exported).map_err(failure)?;
        self.log_export(destination);
        Ok(destination.to_path_buf())
    }

    /// Export under an auto-derived name in `dir`. Existing files are never
    /// replaced: a taken name gets a numeric suffix instead.
    pub fn export_into(&self, dir: &Path) -> Result<PathBuf, StorageError> {
        let exported = self.exported_content()?;
        let at = Utc::now();

        for attempt in 0..MAX_EXPORT_ATTEMPTS {
            let destination = dir.join(numbered_export_file_name(at, attempt));
            let failure = |source| StorageError::ExportFailure {
                path: destination.clone(),
                source,
            };

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&destination)
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(failure(source)),
            };
            file.write_all(exported.as_bytes()).map_err(failure)?;
            file.flush().map_err(failure)?;

            self.log_export(&destination);
            return Ok(destination);
        }

        Err(StorageError::ExportFailure {
            path: dir.join(export_file_name(at)),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "no free export file name"),
        })
    }

    fn exported_content(&self) -> Result<String, StorageError> {
        let content =
            fs::read_to_string(&self.path).map_err(|source| StorageError::ExportFailure {
                path: self.path.clone(),
                source,
            })?;

        let mut exported = content.trim_end().to_string();
        exported.push('\n');
        Ok(exported)
    }

    /// A destination that does not exist yet cannot be the ledger.
    fn is_same_file(&self, destination: &Path) -> bool {
        match (fs::canonicalize(&self.path), fs::canonicalize(destination)) {
            (Ok(source), Ok(destination)) => source == destination,
            _ => false,
        }
    }

    fn log_export(&self, destination: &Path) {
        info!(
            source = %self.path.display(),
            destination = %destination.display(),
            "ledger exported"
        );
    }
}

/// Empty files count as terminated: there is no previous record to separate from.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
