//! Config-backed authentication adapter for single-user installs.

use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::domain::error::JournalError;
use crate::ports::auth_port::{AuthPort, User};
use crate::ports::config_port::ConfigPort;

/// User id taken when `[auth] user_id` is not configured. Fixed so that
/// every run of the same install opens the same collection.
pub const DEFAULT_USER_ID: &str = "local";

pub struct LocalAuth {
    current: RwLock<Option<User>>,
}

impl LocalAuth {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Sign in as `[auth] user_id`, or as [`DEFAULT_USER_ID`] when it is not
    /// configured.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, JournalError> {
        let auth = Self::new();
        let user_id = config
            .get_string("auth", "user_id")
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());
        let email = config.get_string("auth", "email");
        auth.sign_in(&user_id, email.as_deref())?;
        Ok(auth)
    }
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthPort for LocalAuth {
    fn current_user(&self) -> Option<User> {
        self.current.read().ok().and_then(|u| u.clone())
    }

    fn sign_in(&self, user_id: &str, email: Option<&str>) -> Result<User, JournalError> {
        let user_id = user_id.trim();
        if user_id.is_empty() || user_id.contains('/') {
            return Err(JournalError::validation(
                "user id",
                "must be non-empty and contain no '/'",
            ));
        }
        let user = User {
            id: user_id.to_string(),
            email: email.map(str::to_string).filter(|e| !e.trim().is_empty()),
        };
        *self.current.write().map_err(JournalError::store)? = Some(user.clone());
        info!(user = %user.id, "signed in");
        Ok(user)
    }

    fn sign_in_anonymously(&self) -> Result<User, JournalError> {
        let id = Uuid::new_v4().simple().to_string();
        self.sign_in(&id, None)
    }

    fn sign_out(&self) {
        if let Ok(mut current) = self.current.write() {
            if let Some(user) = current.take() {
                info!(user = %user.id, "signed out");
            }
        }
    }
}
