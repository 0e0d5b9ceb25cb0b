//! Seam to the external private-API client.
//!
//! The routine never speaks HTTP itself. Everything network-bound goes
//! through `SocialClient`, and logging in goes through a `Connector`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::session::SessionState;

pub type UserId = u64;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session cookie expired: {0}")]
    CookieExpired(String),
    #[error("login required: {0}")]
    LoginRequired(String),
    #[error("login failed: {0}")]
    Login(String),
    #[error("{message} (code: {code}, response: {response})")]
    Api {
        code: u16,
        message: String,
        response: String,
    },
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// The cached session is no longer accepted and a fresh login may succeed.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::CookieExpired(_) | ClientError::LoginRequired(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub pk: UserId,
    pub username: String,
}

/// One page of a follower listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FollowersPage {
    #[serde(default)]
    pub users: Vec<UserSummary>,
    #[serde(default)]
    pub next_max_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendshipStatus {
    pub following: bool,
    pub followed_by: bool,
    pub blocking: bool,
    pub is_private: bool,
    pub incoming_request: bool,
    pub outgoing_request: bool,
}

pub type FriendshipStatuses = BTreeMap<UserId, FriendshipStatus>;

/// Plain `{"status": "..."}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
}

impl ApiResponse {
    pub fn ok() -> Self {
        ApiResponse {
            status: "ok".to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// How to log in: reuse cached settings, or start over keeping a device id.
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    pub settings: Option<SessionState>,
    pub device_id: Option<String>,
}

pub trait SocialClient {
    /// Settings to cache for the next run.
    fn settings(&self) -> SessionState;

    /// Unix timestamp at which the auth cookie expires.
    fn cookie_expiry(&self) -> Option<i64>;

    /// Opaque token scoping one paginated listing.
    fn rank_token(&self) -> String;

    fn user_id(&self, username: &str) -> Result<UserId, ClientError>;

    fn user_followers(
        &self,
        user_id: UserId,
        rank_token: &str,
        max_id: Option<&str>,
    ) -> Result<FollowersPage, ClientError>;

    fn friendships_create(&self, user_id: UserId) -> Result<ApiResponse, ClientError>;
    fn friendships_destroy(&self, user_id: UserId) -> Result<ApiResponse, ClientError>;
    fn friendships_show(&self, user_id: UserId) -> Result<FriendshipStatus, ClientError>;
    fn friendships_show_many(&self, user_ids: &[UserId]) -> Result<FriendshipStatuses, ClientError>;

    fn post_photo(&self, photo: &[u8], caption: Option<&str>) -> Result<ApiResponse, ClientError>;
}

pub trait Connector {
    type Client: SocialClient;

    fn login(&self, credentials: &Credentials, options: LoginOptions) -> Result<Self::Client, ClientError>;
}
