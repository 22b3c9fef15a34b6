//! JSON file store for the student collection.
//!
//! The whole collection lives in one pretty-printed JSON array. Every
//! operation re-reads the file; nothing is cached between calls. An internal
//! mutex serializes access so that a read-modify-write sequence never
//! interleaves with another one, and a reader never sees a half-written file.
//!
//! Records are kept as raw JSON values: whatever a hand-edited file holds is
//! listed back unchanged, including fields this service does not know about.
//! A file that is not syntactically valid JSON is renamed to
//! `<file>.corrupt.<unix-millis>` and replaced with an empty array, so the
//! original bytes are kept for manual inspection.

use std::path::{Path, PathBuf};

use serde_json::Value;
use time::OffsetDateTime;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::metrics;
use crate::student::Student;

const EMPTY_COLLECTION: &str = "[]";

/// Student collection persisted as a single JSON file.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Store {
    /// Create a store backed by `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the data directory and file exist.
    pub async fn ensure(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.ensure_unlocked().await
    }

    /// Read the whole collection, quarantining the file if it is corrupt.
    pub async fn read(&self) -> Result<Vec<Value>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Overwrite the file with `students`.
    pub async fn write(&self, students: &[Value]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.write_unlocked(students).await
    }

    /// Append one student as a single read-modify-write.
    pub async fn append(&self, student: Student) -> Result<Student, StoreError> {
        let _guard = self.lock.lock().await;
        let mut students = self.read_unlocked().await?;
        students.push(serde_json::to_value(&student)?);
        self.write_unlocked(&students).await?;
        debug!(id = %student.id, total = students.len(), "Student appended");
        Ok(student)
    }

    async fn ensure_unlocked(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !fs::try_exists(dir).await.map_err(|e| self.fail(dir, e))? {
                fs::create_dir_all(dir).await.map_err(|e| self.fail(dir, e))?;
                debug!(dir = %dir.display(), "Created data directory");
            }
        }

        if !fs::try_exists(&self.path)
            .await
            .map_err(|e| self.fail(&self.path, e))?
        {
            fs::write(&self.path, EMPTY_COLLECTION)
                .await
                .map_err(|e| self.fail(&self.path, e))?;
            debug!(path = %self.path.display(), "Initialized empty student file");
        }

        Ok(())
    }

    async fn read_unlocked(&self) -> Result<Vec<Value>, StoreError> {
        self.ensure_unlocked().await?;

        let raw = fs::read(&self.path)
            .await
            .map_err(|e| self.fail(&self.path, e))?;

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Array(students)) => Ok(students),
            Ok(_) => Err(StoreError::NotACollection {
                path: self.path.clone(),
            }),
            Err(parse_err) => {
                let backup = self.quarantine().await?;
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %parse_err,
                    "Student file corrupted, backed up and reset"
                );
                metrics::inc_store_corruptions();
                Ok(Vec::new())
            }
        }
    }

    async fn write_unlocked(&self, students: &[Value]) -> Result<(), StoreError> {
        self.ensure_unlocked().await?;

        // serde_json's pretty printer indents with two spaces.
        let body = serde_json::to_vec_pretty(students)?;
        fs::write(&self.path, body)
            .await
            .map_err(|e| self.fail(&self.path, e))
    }

    /// Move the live file aside and start over with an empty collection.
    async fn quarantine(&self) -> Result<PathBuf, StoreError> {
        let backup = self.backup_path(OffsetDateTime::now_utc());

        fs::rename(&self.path, &backup)
            .await
            .map_err(|e| self.fail(&self.path, e))?;
        fs::write(&self.path, EMPTY_COLLECTION)
            .await
            .map_err(|e| self.fail(&self.path, e))?;

        Ok(backup)
    }

    fn backup_path(&self, at: OffsetDateTime) -> PathBuf {
        let millis = at.unix_timestamp_nanos() / 1_000_000;
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".corrupt.{millis}"));
        PathBuf::from(name)
    }

    fn fail(&self, path: &Path, source: std::io::Error) -> StoreError {
        metrics::inc_store_errors();
        StoreError::io(path, source)
    }
}
