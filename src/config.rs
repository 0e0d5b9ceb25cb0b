use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::cli::Cli;
use crate::logging::{self, LogLevel};
use crate::session::SessionCache;
use crate::store::SnapshotStore;
use crate::upload::UploadQueue;

const APP_NAME: &str = "follower-ledger";
const DEFAULT_SESSION_MAX_AGE: &str = "90d";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid session_max_age '{value}': {source}")]
    MaxAge {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("could not determine a data directory, set DATA_DIR or --data-dir")]
    NoDataDir,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub session_file: Option<PathBuf>,
    pub session_max_age: Option<String>,
    pub log_level: Option<LogLevel>,
}

impl FileConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `explicit`, or the default location if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(FileConfig::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(content) => FileConfig::parse(&content, &path),
            Err(e) if !required && e.kind() == io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub debug: bool,
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub session_file: PathBuf,
    pub session_max_age: Duration,
    pub log_level: LogLevel,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = FileConfig::load(cli.config.as_deref())?;
        let overrides = Overrides {
            data_dir: cli.data_dir.clone(),
            upload_dir: cli.upload_dir(),
            debug: cli.debug,
            log_level: cli.level,
        };
        Config::resolve(file, overrides)
    }

    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let data_dir = overrides
            .data_dir
            .or(file.data_dir)
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .ok_or(ConfigError::NoDataDir)?;

        let upload_dir = overrides
            .upload_dir
            .or(file.upload_dir)
            .unwrap_or_else(|| data_dir.join("upload"));

        let session_file = file
            .session_file
            .unwrap_or_else(|| data_dir.join("session.json"));

        let max_age = file
            .session_max_age
            .unwrap_or_else(|| DEFAULT_SESSION_MAX_AGE.to_string());
        let session_max_age = humantime::parse_duration(&max_age)
            .map_err(|source| ConfigError::MaxAge { value: max_age, source })?;

        Ok(Config {
            log_level: logging::resolve_level(overrides.debug, overrides.log_level, file.log_level),
            data_dir,
            upload_dir,
            session_file,
            session_max_age,
        })
    }

    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.data_dir)
    }

    pub fn upload_queue(&self) -> UploadQueue {
        UploadQueue::new(&self.upload_dir)
    }

    pub fn session_cache(&self) -> SessionCache {
        SessionCache::new(&self.session_file, self.session_max_age)
    }
}
