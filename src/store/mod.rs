//! Daily follower snapshot storage.
//!
//! Persists one JSON file per calendar day in the storage directory:
//! - `followers_YYYYMMDD.json`, keyed by account name
//! - the first write of a day wins, later writes the same day are no-ops
//!
//! Supports:
//! - Recording today's followers with the delta against yesterday
//! - Loading a stored day for an account
//! - Listing stored days
//!
//! A day file is written to a temporary file in the same directory and only
//! then moved into place, so a failed write never leaves a partial day file.
//! Two processes recording on the same day can still both compute a
//! snapshot; the move refuses to replace an existing file, so the first one
//! published wins. Runs are expected to be serialized by the caller (cron).

pub mod diff;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::WalkDir;

use crate::snapshot::{normalize, FollowerSnapshot, InconsistentSnapshot, SnapshotFile};
use self::diff::compute_delta;

const FILE_PREFIX: &str = "followers_";
const FILE_SUFFIX: &str = ".json";
const DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read snapshot file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot file {} is not a valid snapshot document: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("snapshot for {account} in {} is inconsistent: {reason}", .path.display())]
    Inconsistent {
        path: PathBuf,
        account: String,
        #[source]
        reason: InconsistentSnapshot,
    },
    #[error("cannot write snapshot file {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// True when an existing snapshot file could not be trusted.
    pub fn is_corrupt(&self) -> bool {
        !matches!(self, StoreError::Persistence { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Ok,
    Failed,
}

/// Result record handed back to the surrounding routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreResponse {
    pub status: StoreStatus,
    pub data_file: PathBuf,
}

impl StoreResponse {
    pub fn ok(data_file: PathBuf) -> Self {
        StoreResponse {
            status: StoreStatus::Ok,
            data_file,
        }
    }

    pub fn failed(data_file: PathBuf) -> Self {
        StoreResponse {
            status: StoreStatus::Failed,
            data_file,
        }
    }
}

/// Snapshot directory handle. Owns every file it names.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file for `date`. Independent of the account.
    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{}{FILE_SUFFIX}", date.format(DATE_FORMAT)))
    }

    /// Record today's followers for `account`, comparing against yesterday.
    ///
    /// A day that is already stored is returned as is, without reading
    /// yesterday.
    pub fn record(
        &self,
        account: &str,
        followers: &[String],
        today: NaiveDate,
    ) -> Result<StoreResponse, StoreError> {
        let path = self.snapshot_path(today);
        if day_exists(&path)? {
            return Ok(StoreResponse::ok(path));
        }

        let followers = normalize(followers);

        let previous = match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) => self.load_previous(account, yesterday)?,
            None => None,
        };

        let delta = compute_delta(&followers, previous.as_ref().map(|s| s.followers.as_slice()));
        let snapshot = FollowerSnapshot::new(&followers, delta);
        let path = self.persist(account, &snapshot, today)?;

        Ok(StoreResponse::ok(path))
    }

    /// Write the day's file unless it already exists.
    ///
    /// Returns the day's path either way; an existing file is never touched.
    pub fn persist(
        &self,
        account: &str,
        snapshot: &FollowerSnapshot,
        date: NaiveDate,
    ) -> Result<PathBuf, StoreError> {
        let path = self.snapshot_path(date);
        if day_exists(&path)? {
            return Ok(path);
        }

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Persistence {
            path: self.dir.clone(),
            source,
        })?;

        let mut document = SnapshotFile::new();
        document.insert(account.to_string(), snapshot.clone());

        let body = serde_json::to_vec_pretty(&document).map_err(|e| StoreError::Persistence {
            path: path.clone(),
            source: io::Error::other(e),
        })?;

        self.publish(path, |file| file.write_all(&body))
    }

    /// Stage the file in the store directory, then move it to `path` unless
    /// something got there first. Nothing appears at `path` when `fill` or
    /// the sync fails.
    fn publish(
        &self,
        path: PathBuf,
        fill: impl FnOnce(&mut File) -> io::Result<()>,
    ) -> Result<PathBuf, StoreError> {
        let failed = |source| StoreError::Persistence {
            path: path.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(&self.dir).map_err(failed)?;
        fill(staged.as_file_mut())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(failed)?;

        match staged.persist_noclobber(&path) {
            Ok(_) => Ok(path),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists && path.is_file() => Ok(path),
            Err(e) => Err(StoreError::Persistence {
                path,
                source: e.error,
            }),
        }
    }

    /// Snapshot of `account` stored for `date`, if that day and account exist.
    pub fn load_previous(
        &self,
        account: &str,
        date: NaiveDate,
    ) -> Result<Option<FollowerSnapshot>, StoreError> {
        let path = self.snapshot_path(date);

        let Some(mut document) = self.load_file(&path)? else {
            return Ok(None);
        };

        let Some(snapshot) = document.remove(account) else {
            return Ok(None);
        };

        snapshot
            .validate()
            .map_err(|reason| StoreError::Inconsistent {
                path,
                account: account.to_string(),
                reason,
            })?;

        Ok(Some(snapshot))
    }

    /// Whole document for `date`, every account included.
    pub fn load_day(&self, date: NaiveDate) -> Result<Option<SnapshotFile>, StoreError> {
        self.load_file(&self.snapshot_path(date))
    }

    fn load_file(&self, path: &Path) -> Result<Option<SnapshotFile>, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let document: SnapshotFile =
            serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Some(document))
    }

    /// Stored days, newest first. A missing directory has no days.
    pub fn list_days(&self) -> Result<Vec<NaiveDate>, StoreError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut days = Vec::new();

        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StoreError::Unreadable {
                path: self.dir.clone(),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(date) = entry.file_name().to_str().and_then(parse_file_name) {
                days.push(date);
            }
        }

        days.sort_unstable_by(|a, b| b.cmp(a));
        Ok(days)
    }
}

/// Whether the day's file is already stored. Anything other than a regular
/// file at that path cannot be treated as the stored day.
fn day_exists(path: &Path) -> Result<bool, StoreError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(true),
        Ok(_) => Err(StoreError::Persistence {
            path: path.to_path_buf(),
            source: io::Error::other("path exists but is not a regular file"),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StoreError::Persistence {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_file_name(name: &str) -> Option<NaiveDate> {
    let stamp = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    if stamp.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(stamp, DATE_FORMAT).ok()
}

/// Parse a `YYYYMMDD` day stamp.
pub fn parse_day(stamp: &str) -> Result<NaiveDate, String> {
    if stamp.len() != 8 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{stamp}' is not a YYYYMMDD date"));
    }
    NaiveDate::parse_from_str(stamp, DATE_FORMAT).map_err(|e| format!("'{stamp}': {e}"))
}
