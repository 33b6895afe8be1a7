//! Client session state.
//!
//! The session (`token` + `user`) is process-wide. It is restored from
//! storage at start-up and only changes through [`SessionHandle::establish`]
//! (login), [`SessionHandle::replace_token`] (refresh) and
//! [`SessionHandle::clear`] (logout or failed refresh).

mod claims;
mod storage;

pub use claims::decode_user;
pub use storage::{
    FileSessionStorage, MemorySessionStorage, PersistedSession, SessionStorage, SESSION_KEY,
};

#[cfg(test)]
pub(crate) use claims::test_token;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::ClientError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
    SuperAdmin,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
            Role::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super_admin" | "super-admin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub subject_id: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

struct SessionState {
    session: Session,
    cookies: Option<String>,
}

/// Shared access to the session. Cloning shares the same state.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<RwLock<SessionState>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionHandle {
    /// Restore the session from storage.
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Result<Self, ClientError> {
        let record = storage.load()?.unwrap_or_default();
        if record.token.is_some() {
            tracing::debug!(
                user = record.user.as_ref().map(|u| u.subject_id.as_str()),
                "Restored persisted session"
            );
        }

        Ok(Self {
            state: Arc::new(RwLock::new(SessionState {
                session: Session {
                    user: record.user,
                    token: record.token,
                },
                cookies: record.cookies,
            })),
            storage,
        })
    }

    /// An empty session backed by memory only.
    pub fn ephemeral() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState {
                session: Session::default(),
                cookies: None,
            })),
            storage: Arc::new(MemorySessionStorage::new()),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().session.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().session.token.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.state.read().session.user.clone()
    }

    pub fn cookies(&self) -> Option<String> {
        self.state.read().cookies.clone()
    }

    /// Start a session after login.
    pub fn establish(&self, user: SessionUser, token: String) {
        {
            let mut state = self.state.write();
            state.session = Session {
                user: Some(user),
                token: Some(token),
            };
        }
        self.persist();
    }

    /// Swap in a refreshed token, keeping the current user.
    ///
    /// Returns `false` and leaves the session alone when no user is present.
    pub fn replace_token(&self, token: String) -> bool {
        {
            let mut state = self.state.write();
            if state.session.user.is_none() {
                return false;
            }
            state.session.token = Some(token);
        }
        self.persist();
        true
    }

    /// Record the cookie header the transport holds for the API origin.
    pub fn remember_cookies(&self, cookies: Option<String>) {
        {
            let mut state = self.state.write();
            if state.cookies == cookies {
                return;
            }
            state.cookies = cookies;
        }
        self.persist();
    }

    /// Log out: drop user, token and cookies.
    pub fn clear(&self) {
        {
            let mut state = self.state.write();
            state.session = Session::default();
            state.cookies = None;
        }
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
    }

    fn persist(&self) {
        let record = {
            let state = self.state.read();
            PersistedSession {
                token: state.session.token.clone(),
                user: state.session.user.clone(),
                cookies: state.cookies.clone(),
            }
        };
        if let Err(e) = self.storage.save(&record) {
            tracing::warn!(error = %e, "Failed to persist session");
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionHandle")
            .field("user", &state.session.user)
            .field("has_token", &state.session.token.is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_user(id: &str, role: Role) -> SessionUser {
    use chrono::TimeZone;

    SessionUser {
        subject_id: id.to_string(),
        role,
        issued_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        expires_at: Utc.timestamp_opt(1_700_086_400, 0).unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_from_storage() {
        let storage = Arc::new(MemorySessionStorage::with_record(PersistedSession {
            token: Some("tok".to_string()),
            user: Some(test_user("u-1", Role::User)),
            cookies: None,
        }));
        let handle = SessionHandle::restore(storage).unwrap();
        assert!(handle.snapshot().is_authenticated());
        assert_eq!(handle.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_replace_token_requires_user() {
        let handle = SessionHandle::ephemeral();
        assert!(!handle.replace_token("new".to_string()));
        assert_eq!(handle.snapshot(), Session::default());

        handle.establish(test_user("u-1", Role::User), "old".to_string());
        assert!(handle.replace_token("new".to_string()));
        let session = handle.snapshot();
        assert_eq!(session.token.as_deref(), Some("new"));
        assert_eq!(session.user.unwrap().subject_id, "u-1");
    }

    #[test]
    fn test_clear_removes_persisted_record() {
        let storage = Arc::new(MemorySessionStorage::new());
        let handle = SessionHandle::restore(storage.clone()).unwrap();
        handle.establish(test_user("u-1", Role::Admin), "tok".to_string());
        handle.remember_cookies(Some("refreshToken=r".to_string()));
        assert_eq!(
            storage.load().unwrap().unwrap().cookies.as_deref(),
            Some("refreshToken=r")
        );

        handle.clear();
        assert_eq!(handle.snapshot(), Session::default());
        assert!(handle.cookies().is_none());
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert!(Role::SuperAdmin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_expiry_check() {
        let user = test_user("u-1", Role::User);
        assert!(user.is_expired_at(user.expires_at));
        assert!(!user.is_expired_at(user.issued_at));
    }
}
