//! Line-delimited JSON file holding the last baseline of every observed coin.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{NotifierError, Result};
use crate::types::SnapshotRecord;

/// Reads and atomically rewrites the snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every record. A missing file is an empty snapshot; a line that
    /// does not parse fails the whole load.
    pub fn load(&self) -> Result<Vec<SnapshotRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str::<SnapshotRecord>(&line).map_err(|source| {
                NotifierError::MalformedSnapshot {
                    path: self.path.clone(),
                    line: index + 1,
                    source,
                }
            })?;
            records.push(record);
        }

        debug!(path = %self.path.display(), records = records.len(), "loaded snapshot");
        Ok(records)
    }

    /// Replaces the file with `records`, one per line.
    ///
    /// Writes to a temp file next to the target and renames it into place, so
    /// readers see either the old file or the complete new one.
    pub fn save(&self, records: &[SnapshotRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.tmp_path();
        let result = (|| -> Result<()> {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for record in records {
                serde_json::to_writer(&mut writer, record).map_err(std::io::Error::from)?;
                writer.write_all(b"\n")?;
            }
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)?;
            Ok(())
        })();

        match &result {
            Ok(()) => debug!(path = %self.path.display(), records = records.len(), "saved snapshot"),
            Err(_) => {
                let _ = fs::remove_file(&tmp_path);
            }
        }
        result
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
