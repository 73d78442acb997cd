//! Append-only JSON-lines journal.
//!
//! Several chats may append to the same journal at once. Appends are
//! serialized by an async mutex and each record is written as one complete
//! line, so concurrent writers never interleave or truncate each other.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use switchboard_core::{CapabilityError, CapabilityResult};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{trace, warn};

/// A JSON-lines file that only grows.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Journal {
    /// Creates a journal at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single line.
    pub async fn append<T: Serialize>(&self, record: &T) -> CapabilityResult<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| CapabilityError::io(format!("failed to encode record: {e}")))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        trace!(path = %self.path.display(), "Appended journal record");
        Ok(())
    }

    /// Reads every well-formed record. A missing file reads as empty.
    ///
    /// Malformed lines are skipped with a warning.
    pub async fn read_all<T: DeserializeOwned>(&self) -> CapabilityResult<Vec<T>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        line = line_num + 1,
                        error = %e,
                        path = %self.path.display(),
                        "Skipping malformed journal line"
                    );
                }
            }
        }
        Ok(records)
    }
}
