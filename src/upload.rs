//! Photo upload queue.
//!
//! The upload directory holds photos waiting to be posted:
//! - `*.jpg` / `*.jpeg` photos, taken in file name order
//! - an optional `*.txt` caption, preferably sharing the photo's stem
//!
//! After a successful post both files get an `.uploaded` suffix so the next
//! run moves on to the next photo. Nothing is ever deleted.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::client::{ClientError, SocialClient};

const UPLOADED_SUFFIX: &str = ".uploaded";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("cannot list upload directory {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("upload failed: {0}")]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPost {
    pub photo: PathBuf,
    pub caption: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing queued.
    Empty,
    Posted {
        photo: PathBuf,
        archived: Vec<PathBuf>,
    },
    Rejected {
        photo: PathBuf,
        status: String,
    },
}

pub struct UploadQueue {
    dir: PathBuf,
}

impl UploadQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        UploadQueue { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The next photo to post and its caption file.
    pub fn next(&self) -> Result<Option<QueuedPost>, UploadError> {
        if !self.dir.is_dir() {
            debug!(dir = %self.dir.display(), "upload directory does not exist");
            return Ok(None);
        }

        let mut photos = Vec::new();
        let mut captions = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| UploadError::Scan {
                path: self.dir.clone(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if has_extension(&path, &["jpg", "jpeg"]) {
                photos.push(path);
            } else if has_extension(&path, &["txt"]) {
                captions.push(path);
            }
        }

        let Some(photo) = photos.into_iter().next() else {
            return Ok(None);
        };

        let caption = captions
            .iter()
            .find(|c| c.file_stem() == photo.file_stem())
            .or_else(|| captions.first())
            .cloned();

        Ok(Some(QueuedPost { photo, caption }))
    }
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

pub fn read_caption(post: &QueuedPost) -> Result<Option<String>, UploadError> {
    let Some(path) = &post.caption else {
        debug!("no caption file");
        return Ok(None);
    };

    fs::read_to_string(path)
        .map(Some)
        .map_err(|source| UploadError::Read {
            path: path.clone(),
            source,
        })
}

/// Rename the post's files out of the queue. Returns the new paths.
pub fn mark_uploaded(post: &QueuedPost) -> Result<Vec<PathBuf>, UploadError> {
    let mut archived = Vec::new();

    for from in std::iter::once(&post.photo).chain(post.caption.as_ref()) {
        let mut name = from.file_name().unwrap_or_default().to_os_string();
        name.push(UPLOADED_SUFFIX);
        let to = from.with_file_name(name);

        fs::rename(from, &to).map_err(|source| UploadError::Rename {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        archived.push(to);
    }

    Ok(archived)
}

/// Post the next queued photo and take it out of the queue on success.
pub fn post_next<C: SocialClient + ?Sized>(
    client: &C,
    queue: &UploadQueue,
) -> Result<UploadOutcome, UploadError> {
    debug!(dir = %queue.dir().display(), "looking for a queued photo");

    let Some(post) = queue.next()? else {
        debug!("no photo queued");
        return Ok(UploadOutcome::Empty);
    };

    let photo = fs::read(&post.photo).map_err(|source| UploadError::Read {
        path: post.photo.clone(),
        source,
    })?;
    let caption = read_caption(&post)?;

    let response = client.post_photo(&photo, caption.as_deref())?;
    if !response.is_ok() {
        warn!(photo = %post.photo.display(), status = %response.status, "upload not accepted");
        return Ok(UploadOutcome::Rejected {
            photo: post.photo,
            status: response.status,
        });
    }

    debug!(photo = %post.photo.display(), "photo uploaded");
    let archived = mark_uploaded(&post)?;

    Ok(UploadOutcome::Posted {
        photo: post.photo,
        archived,
    })
}
