//! Login with session reuse.
//!
//! A cached session is tried first. If the client rejects it as expired the
//! login is repeated from scratch with the same device id, and the fresh
//! settings replace the cache.

use chrono::DateTime;
use thiserror::Error;
use tracing::debug;

use crate::client::{ClientError, Connector, Credentials, LoginOptions, SocialClient};
use crate::session::{save_session, SessionCache, SessionError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login rejected: {0}")]
    Rejected(#[source] ClientError),
    #[error("unexpected login failure: {0}")]
    Unexpected(#[source] ClientError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    /// 9 for failures the remote side reported, 99 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AuthError::Rejected(_) => 9,
            AuthError::Unexpected(_) | AuthError::Session(_) => 99,
        }
    }
}

fn classify(err: ClientError) -> AuthError {
    match err {
        ClientError::Login(_) | ClientError::Api { .. } => AuthError::Rejected(err),
        _ => AuthError::Unexpected(err),
    }
}

pub fn authenticate<K: Connector>(
    connector: &K,
    credentials: &Credentials,
    cache: &SessionCache,
) -> Result<K::Client, AuthError> {
    debug!(username = %credentials.username, "authenticating");

    let client = match cache.load()? {
        None => {
            debug!("continuing with new login");
            let client = connector
                .login(credentials, LoginOptions::default())
                .map_err(classify)?;
            save_session(&client.settings(), cache.path())?;
            client
        }
        Some(cached) => {
            debug!("reusing cached session settings");
            let device_id = cached.device_id().map(str::to_string);
            let reuse = LoginOptions {
                settings: Some(cached),
                device_id: None,
            };

            match connector.login(credentials, reuse) {
                Ok(client) => client,
                Err(err) if err.is_session_expired() => {
                    debug!(reason = %err, "session expired, logging in again with the same device");
                    let relogin = LoginOptions {
                        settings: None,
                        device_id,
                    };
                    let client = connector.login(credentials, relogin).map_err(classify)?;
                    save_session(&client.settings(), cache.path())?;
                    client
                }
                Err(err) => return Err(classify(err)),
            }
        }
    };

    match client.cookie_expiry().and_then(|ts| DateTime::from_timestamp(ts, 0)) {
        Some(expiry) => debug!(expiry = %expiry.format("%Y-%m-%dT%H:%M:%SZ"), "cookie expiry"),
        None => debug!("cookie expiry unknown"),
    }

    Ok(client)
}
