pub mod claims;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::storage::{Storage, CACHED_USER_KEY, LOGOUT_REASON_KEY, TOKEN_KEY};

/// User attributes cached next to the token for instant first paint.
/// Never authoritative; the resolver reconciles them against the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedUser {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// The server-side role no longer matches the one embedded in the
    /// token. Continuing with either role would be unsafe.
    RoleChanged,
    UserRequest,
}

/// Owns the persisted session: bearer token and cached user attributes.
///
/// No token validation happens here. A storage failure on read degrades
/// to "no session" so the caller lands on the unauthenticated path.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn token(&self) -> Option<String> {
        match self.storage.read(TOKEN_KEY) {
            Ok(Some(data)) => String::from_utf8(data).ok().filter(|t| !t.is_empty()),
            Ok(None) => None,
            Err(err) => {
                warn!("Read token from storage failed: {err:#}");
                None
            }
        }
    }

    pub fn cached_user(&self) -> Option<CachedUser> {
        match self.storage.read(CACHED_USER_KEY) {
            Ok(Some(data)) => match serde_json::from_slice(&data) {
                Ok(user) => Some(user),
                Err(_) => {
                    warn!("Cached user data is invalid, ignoring it");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("Read cached user from storage failed: {err:#}");
                None
            }
        }
    }

    pub fn set_session(&self, token: &str, user: &CachedUser) -> Result<()> {
        self.storage
            .write(TOKEN_KEY, token.as_bytes())
            .context("persist token")?;
        let data = serde_json::to_vec(user).context("encode cached user")?;
        self.storage
            .write(CACHED_USER_KEY, &data)
            .context("persist cached user")?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove(TOKEN_KEY).context("remove token")?;
        self.storage
            .remove(CACHED_USER_KEY)
            .context("remove cached user")?;
        Ok(())
    }

    pub fn clear_with_reason(&self, reason: LogoutReason) -> Result<()> {
        self.clear()?;
        let data = serde_json::to_vec(&reason).context("encode logout reason")?;
        self.storage
            .write(LOGOUT_REASON_KEY, &data)
            .context("persist logout reason")?;
        Ok(())
    }

    /// Reads and clears the recorded logout reason. The sign-in surface
    /// calls this once to explain why the session ended.
    pub fn take_logout_reason(&self) -> Option<LogoutReason> {
        let data = match self.storage.read(LOGOUT_REASON_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(err) => {
                warn!("Read logout reason from storage failed: {err:#}");
                return None;
            }
        };
        if let Err(err) = self.storage.remove(LOGOUT_REASON_KEY) {
            warn!("Clear logout reason failed: {err:#}");
        }
        serde_json::from_slice(&data).ok()
    }
}
