//! One automation run.
//!
//! Logs in (reusing the cached session when possible), resolves the account
//! to analyze, then optionally records today's follower snapshot and posts
//! the next queued photo.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{authenticate, AuthError};
use crate::client::{ClientError, Connector, Credentials, SocialClient, UserId};
use crate::config::Config;
use crate::followers::fetch_followers;
use crate::store::{StoreError, StoreResponse};
use crate::upload::{post_next, UploadError, UploadOutcome};

#[derive(Debug, Default, Clone)]
pub struct RoutineOptions {
    /// Account to analyze instead of the logged in one.
    pub target_account: Option<String>,
    pub analyze_followers: bool,
    pub upload: bool,
}

#[derive(Debug)]
pub struct RoutineReport {
    pub account: String,
    pub user_id: UserId,
    pub analytics: Option<StoreResponse>,
    pub upload: Option<UploadOutcome>,
}

#[derive(Debug, Error)]
pub enum RoutineError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl RoutineError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RoutineError::Auth(e) => e.exit_code(),
            _ => 1,
        }
    }
}

pub fn run<K: Connector>(
    connector: &K,
    credentials: &Credentials,
    config: &Config,
    options: &RoutineOptions,
    today: NaiveDate,
) -> Result<RoutineReport, RoutineError> {
    let client = authenticate(connector, credentials, &config.session_cache())?;

    let rank_token = client.rank_token();
    debug!(%rank_token, "generated rank token");

    let account = options
        .target_account
        .clone()
        .unwrap_or_else(|| credentials.username.clone());
    let user_id = client.user_id(&account)?;
    debug!(%account, user_id, "resolved account");

    let analytics = if options.analyze_followers {
        let followers = fetch_followers(&client, user_id, &rank_token)?;
        let response = config.store().record(&account, &followers, today)?;
        info!(data_file = %response.data_file.display(), "analytics data written");
        Some(response)
    } else {
        None
    };

    let upload = if options.upload {
        let outcome = post_next(&client, &config.upload_queue())?;
        if let UploadOutcome::Posted { photo, .. } = &outcome {
            info!(photo = %photo.display(), "posted photo");
        }
        Some(outcome)
    } else {
        None
    };

    Ok(RoutineReport {
        account,
        user_id,
        analytics,
        upload,
    })
}
