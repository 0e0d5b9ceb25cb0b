//! Cached login session settings.
//!
//! After a successful login the client's settings are written to the cache
//! file so the next run can reuse them instead of logging in again. Byte
//! values in the settings go through the tagged-bytes codec.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::codec::Setting;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot read session cache {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session cache {} is not valid: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write session cache {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Opaque settings produced by the client after login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(BTreeMap<String, Setting>);

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Setting) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.0.get(key)
    }

    pub fn device_id(&self) -> Option<&str> {
        self.get("device_id").and_then(Setting::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct SessionCache {
    path: PathBuf,
    max_age: Duration,
}

impl SessionCache {
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        SessionCache {
            path: path.into(),
            max_age,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached settings, or `None` when there is no cache or it is too old.
    pub fn load(&self) -> Result<Option<SessionState>, SessionError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session cache");
                return Ok(None);
            }
            Err(source) => {
                return Err(SessionError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .map(|age| age > self.max_age)
            .unwrap_or(false);

        if expired {
            debug!(
                path = %self.path.display(),
                max_age = %humantime::format_duration(self.max_age),
                "session cache expired"
            );
            return Ok(None);
        }

        debug!(path = %self.path.display(), "loading session cache");
        let content = fs::read_to_string(&self.path).map_err(|source| SessionError::Read {
            path: self.path.clone(),
            source,
        })?;

        let state = serde_json::from_str(&content).map_err(|source| SessionError::Parse {
            path: self.path.clone(),
            source,
        })?;

        Ok(Some(state))
    }
}

/// Post-login hook: write the session settings to `path`.
pub fn save_session(state: &SessionState, path: &Path) -> Result<(), SessionError> {
    let write_err = |source| SessionError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let body = serde_json::to_vec(state).map_err(|e| write_err(io::Error::other(e)))?;
    fs::write(path, body).map_err(write_err)?;

    debug!(path = %path.display(), "saved session cache");
    Ok(())
}
