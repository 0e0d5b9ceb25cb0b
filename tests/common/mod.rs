#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use follower_ledger::client::{
    ApiResponse, ClientError, Connector, Credentials, FollowersPage, FriendshipStatus,
    FriendshipStatuses, LoginOptions, SocialClient, UserId, UserSummary,
};
use follower_ledger::codec::Setting;
use follower_ledger::config::Config;
use follower_ledger::logging::LogLevel;
use follower_ledger::session::SessionState;

#[derive(Debug, Clone, PartialEq)]
pub enum LoginKind {
    Fresh,
    Cached,
    Relogin(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CachedBehavior {
    Accept,
    Expire,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FreshBehavior {
    Accept,
    BadPassword,
    Network,
}

#[derive(Debug, Default)]
pub struct CallLog {
    pub logins: Vec<LoginKind>,
    pub follower_requests: Vec<Option<String>>,
    pub posted: Vec<(Vec<u8>, Option<String>)>,
    pub show_calls: usize,
    pub show_many_calls: usize,
}

pub struct FakeConnector {
    pub log: Rc<RefCell<CallLog>>,
    pub cached: CachedBehavior,
    pub fresh: FreshBehavior,
    pub device_id: String,
    pub accounts: HashMap<String, UserId>,
    pub follower_pages: Vec<Vec<String>>,
    pub post_status: String,
}

impl FakeConnector {
    pub fn new() -> Self {
        FakeConnector {
            log: Rc::new(RefCell::new(CallLog::default())),
            cached: CachedBehavior::Accept,
            fresh: FreshBehavior::Accept,
            device_id: "android-fresh".to_string(),
            accounts: HashMap::from([("me".to_string(), 1), ("other".to_string(), 2)]),
            follower_pages: vec![names(&["carol", "alice"]), names(&["bob", "alice"])],
            post_status: "ok".to_string(),
        }
    }

    fn client(&self, device_id: String) -> FakeClient {
        FakeClient {
            log: Rc::clone(&self.log),
            device_id,
            accounts: self.accounts.clone(),
            follower_pages: self.follower_pages.clone(),
            post_status: self.post_status.clone(),
        }
    }
}

impl Connector for FakeConnector {
    type Client = FakeClient;

    fn login(&self, _credentials: &Credentials, options: LoginOptions) -> Result<FakeClient, ClientError> {
        if let Some(settings) = options.settings {
            self.log.borrow_mut().logins.push(LoginKind::Cached);
            return match self.cached {
                CachedBehavior::Accept => {
                    let device = settings.device_id().unwrap_or("unknown").to_string();
                    Ok(self.client(device))
                }
                CachedBehavior::Expire => Err(ClientError::CookieExpired("cookie expired".into())),
            };
        }

        let kind = match options.device_id {
            Some(device) => LoginKind::Relogin(Some(device)),
            None => LoginKind::Fresh,
        };
        self.log.borrow_mut().logins.push(kind.clone());

        match self.fresh {
            FreshBehavior::Accept => {
                let device = match kind {
                    LoginKind::Relogin(Some(device)) => device,
                    _ => self.device_id.clone(),
                };
                Ok(self.client(device))
            }
            FreshBehavior::BadPassword => Err(ClientError::Login("bad password".into())),
            FreshBehavior::Network => Err(ClientError::Other("connection reset".into())),
        }
    }
}

#[derive(Debug)]
pub struct FakeClient {
    log: Rc<RefCell<CallLog>>,
    device_id: String,
    accounts: HashMap<String, UserId>,
    follower_pages: Vec<Vec<String>>,
    post_status: String,
}

impl SocialClient for FakeClient {
    fn settings(&self) -> SessionState {
        let mut state = SessionState::new();
        state.insert("device_id", Setting::String(self.device_id.clone()));
        state.insert("cookie", Setting::Bytes(vec![7, 0, 255]));
        state
    }

    fn cookie_expiry(&self) -> Option<i64> {
        Some(1_900_000_000)
    }

    fn rank_token(&self) -> String {
        "1-rank-token".to_string()
    }

    fn user_id(&self, username: &str) -> Result<UserId, ClientError> {
        self.accounts.get(username).copied().ok_or_else(|| ClientError::Api {
            code: 404,
            message: "User not found".into(),
            response: "{}".into(),
        })
    }

    fn user_followers(
        &self,
        user_id: UserId,
        _rank_token: &str,
        max_id: Option<&str>,
    ) -> Result<FollowersPage, ClientError> {
        self.log.borrow_mut().follower_requests.push(max_id.map(str::to_string));

        let index: usize = max_id.map(|id| id.parse().unwrap()).unwrap_or(0);
        let users = self.follower_pages[index]
            .iter()
            .enumerate()
            .map(|(i, name)| UserSummary {
                pk: user_id * 1000 + i as u64,
                username: name.clone(),
            })
            .collect();
        let next_max_id = (index + 1 < self.follower_pages.len()).then(|| (index + 1).to_string());

        Ok(FollowersPage { users, next_max_id })
    }

    fn friendships_create(&self, _user_id: UserId) -> Result<ApiResponse, ClientError> {
        Ok(ApiResponse::ok())
    }

    fn friendships_destroy(&self, _user_id: UserId) -> Result<ApiResponse, ClientError> {
        Ok(ApiResponse { status: "fail".into() })
    }

    fn friendships_show(&self, _user_id: UserId) -> Result<FriendshipStatus, ClientError> {
        self.log.borrow_mut().show_calls += 1;
        Ok(FriendshipStatus {
            following: true,
            ..FriendshipStatus::default()
        })
    }

    fn friendships_show_many(&self, user_ids: &[UserId]) -> Result<FriendshipStatuses, ClientError> {
        self.log.borrow_mut().show_many_calls += 1;
        Ok(user_ids
            .iter()
            .map(|id| (*id, FriendshipStatus::default()))
            .collect())
    }

    fn post_photo(&self, photo: &[u8], caption: Option<&str>) -> Result<ApiResponse, ClientError> {
        self.log
            .borrow_mut()
            .posted
            .push((photo.to_vec(), caption.map(str::to_string)));
        Ok(ApiResponse {
            status: self.post_status.clone(),
        })
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn credentials() -> Credentials {
    Credentials {
        username: "me".to_string(),
        password: "hunter2".to_string(),
    }
}

pub fn config_in(dir: &Path) -> Config {
    Config {
        data_dir: dir.join("data"),
        upload_dir: dir.join("data").join("upload"),
        session_file: dir.join("session.json"),
        session_max_age: Duration::from_secs(90 * 24 * 60 * 60),
        log_level: LogLevel::Debug,
    }
}
