//! Deduplicated, CSV-backed persistence of access keys.
//!
//! One file, one text column named `key`, one row per unique key.
//! Values are written with a leading apostrophe so spreadsheet tools
//! keep a 44-digit key as text instead of collapsing it to scientific
//! notation; the marker is stripped for every comparison and display.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Marker character that forces text interpretation on read-back.
const TEXT_MARKER: char = '\'';

/// Errors from the persisted key store. These are fatal to the caller;
/// the store never recovers by silently dropping or rewriting records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("key store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The backing file is not a readable single-column CSV.
    #[error("key store is malformed: {0}")]
    Malformed(#[from] csv::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct KeyRecord {
    key: String,
}

/// Append-only record of unique access keys backed by a single CSV
/// file. The file is re-read in full on every call; there is no cached
/// index, and the read-modify-write save cycle is not atomic under
/// concurrent writers.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    /// Store backed by the given file path. The file is created on the
    /// first successful save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the key unless an equal key (marker stripped) already
    /// exists. Returns `true` when a new row was written.
    pub fn save_if_new(&self, key: &str) -> Result<bool, StoreError> {
        let mut records = self.read_records()?;
        let candidate = strip_marker(key);
        if records.iter().any(|stored| strip_marker(stored) == candidate) {
            return Ok(false);
        }

        records.push(format!("{TEXT_MARKER}{key}"));
        self.write_records(&records)?;
        info!(key = %candidate, total = records.len(), "new access key recorded");
        Ok(true)
    }

    /// Every stored key in insertion order, marker stripped. An absent
    /// backing file reads as an empty store.
    pub fn load_all(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read_records()?
            .iter()
            .map(|stored| strip_marker(stored))
            .collect())
    }

    /// The persisted file exactly as stored (header and markers
    /// retained), for export/download.
    pub fn export(&self) -> Result<String, StoreError> {
        Ok(fs::read_to_string(&self.path)?)
    }

    fn read_records(&self) -> Result<Vec<String>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for record in reader.deserialize() {
            let record: KeyRecord = record?;
            records.push(record.key);
        }
        Ok(records)
    }

    fn write_records(&self, records: &[String]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for key in records {
            writer.serialize(KeyRecord { key: key.clone() })?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn strip_marker(value: &str) -> String {
    value.replace(TEXT_MARKER, "")
}
