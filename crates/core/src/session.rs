//! Mock authentication and per-session user state.
//!
//! Login accepts any password for a well-formed email; signup additionally enforces a
//! minimum password length. Each successful call opens a session keyed by an opaque
//! token. The session owns its `User`, so profile edits and saved datasets are scoped
//! to the token that made them.

use chrono::{TimeZone, Utc};
use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AuthError;
use crate::types::{ConnectedAccount, Provider, User};

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Fields a client may change through `PATCH /api/profile`. Absent = unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// The canned account every login resolves to, with the caller's email.
pub fn demo_user(email: &str) -> User {
    let joined = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).single().unwrap_or_else(Utc::now);
    User {
        id: "user-1".to_string(),
        email: email.to_string(),
        name: "Demo User".to_string(),
        avatar: None,
        created_at: joined,
        connected_accounts: vec![
            ConnectedAccount {
                provider: Provider::Kaggle,
                username: Some("demo_kaggler".to_string()),
                connected: true,
                connected_at: Some(joined),
            },
            ConnectedAccount {
                provider: Provider::Github,
                username: None,
                connected: false,
                connected_at: None,
            },
            ConnectedAccount {
                provider: Provider::HuggingFace,
                username: None,
                connected: false,
                connected_at: None,
            },
        ],
        saved_datasets: vec!["ds-001".to_string(), "ds-003".to_string()],
    }
}

/// State for a single signed-in client.
pub struct UserSession {
    pub user: User,
    pub last_activity: Instant,
}

impl UserSession {
    pub fn new(user: User) -> Self {
        Self { user, last_activity: Instant::now() }
    }
}

/// Thread-safe session store. Key = opaque bearer token.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, UserSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AuthError> {
        if req.email.is_empty() || req.password.is_empty() {
            return Err(AuthError::MissingFields("Email and password are required"));
        }
        if !is_valid_email(&req.email) {
            return Err(AuthError::InvalidEmail);
        }
        Ok(self.open(demo_user(&req.email)))
    }

    pub fn signup(&self, req: &SignupRequest) -> Result<AuthResponse, AuthError> {
        if req.email.is_empty() || req.password.is_empty() || req.name.is_empty() {
            return Err(AuthError::MissingFields("Email, password, and name are required"));
        }
        if !is_valid_email(&req.email) {
            return Err(AuthError::InvalidEmail);
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let mut user = demo_user(&req.email);
        user.id = format!("user-{}", Uuid::new_v4().simple());
        user.name = req.name.clone();
        user.created_at = Utc::now();
        user.saved_datasets.clear();
        Ok(self.open(user))
    }

    fn open(&self, user: User) -> AuthResponse {
        let token = format!("atlas-{}", Uuid::new_v4().simple());
        info!(user = user.id.as_str(), "Session opened");
        self.sessions.insert(token.clone(), UserSession::new(user.clone()));
        AuthResponse { user, token }
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Snapshot of the session's user. Touches the session.
    pub fn profile(&self, token: &str) -> Result<User, AuthError> {
        self.with_user(token, |user| Ok(user.clone()))
    }

    pub fn update_profile(&self, token: &str, update: ProfileUpdate) -> Result<User, AuthError> {
        if let Some(email) = &update.email {
            if !is_valid_email(email) {
                return Err(AuthError::InvalidEmail);
            }
        }
        self.with_user(token, |user| {
            if let Some(name) = update.name {
                user.name = name;
            }
            if let Some(email) = update.email {
                user.email = email;
            }
            if update.avatar.is_some() {
                user.avatar = update.avatar;
            }
            Ok(user.clone())
        })
    }

    /// Add a dataset id to the session's saved list. Idempotent.
    pub fn save_dataset(&self, token: &str, dataset_id: &str) -> Result<(), AuthError> {
        self.with_user(token, |user| {
            if !user.saved_datasets.iter().any(|id| id == dataset_id) {
                user.saved_datasets.push(dataset_id.to_string());
            }
            Ok(())
        })
    }

    /// Remove a dataset id from the session's saved list. Idempotent.
    pub fn unsave_dataset(&self, token: &str, dataset_id: &str) -> Result<(), AuthError> {
        self.with_user(token, |user| {
            user.saved_datasets.retain(|id| id != dataset_id);
            Ok(())
        })
    }

    fn with_user<T>(
        &self,
        token: &str,
        f: impl FnOnce(&mut User) -> Result<T, AuthError>,
    ) -> Result<T, AuthError> {
        let mut session = self.sessions.get_mut(token).ok_or(AuthError::Unauthorized)?;
        session.last_activity = Instant::now();
        f(&mut session.user)
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were removed.
    pub fn prune_idle(&self, ttl: Duration) -> usize {
        let Some(cutoff) = Instant::now().checked_sub(ttl) else {
            return 0;
        };
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.last_activity > cutoff);
        let pruned = before - self.sessions.len();
        if pruned > 0 {
            debug!(pruned = pruned, remaining = self.sessions.len(), "Pruned idle sessions");
        }
        pruned
    }
}
