//! Durable session storage.
//!
//! The session file is a JSON object; the session lives under
//! [`SESSION_KEY`] so other keys written by other tools survive.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::SessionUser;
use crate::api::error::ClientError;

/// Namespace key the session is stored under.
pub const SESSION_KEY: &str = "bazar:session";

/// What survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
    /// `Cookie` header for the API origin, carries the refresh cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>, ClientError>;
    fn save(&self, record: &PersistedSession) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// JSON file storage.
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, source: std::io::Error) -> ClientError {
        ClientError::Storage {
            path: self.path.clone(),
            source,
        }
    }

    fn read_document(&self) -> Result<serde_json::Map<String, serde_json::Value>, ClientError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Default::default()),
            Err(e) => return Err(self.storage_err(e)),
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            // A corrupt file is treated as empty; it is rewritten on next save
            _ => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable session file");
                Ok(Default::default())
            }
        }
    }

    fn write_document(
        &self,
        document: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.storage_err(e))?;
            }
        }

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| ClientError::decode("session file", e))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| self.storage_err(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.storage_err(e))?;
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| self.storage_err(e))
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>, ClientError> {
        let document = self.read_document()?;
        match document.get(SESSION_KEY) {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed persisted session");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn save(&self, record: &PersistedSession) -> Result<(), ClientError> {
        let mut document = self.read_document()?;
        let value =
            serde_json::to_value(record).map_err(|e| ClientError::decode("session record", e))?;
        document.insert(SESSION_KEY.to_string(), value);
        self.write_document(&document)
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut document = self.read_document()?;
        if document.remove(SESSION_KEY).is_some() {
            self.write_document(&document)?;
        }
        Ok(())
    }
}

/// In-process storage, nothing touches disk.
#[derive(Default)]
pub struct MemorySessionStorage {
    record: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: PersistedSession) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>, ClientError> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, record: &PersistedSession) -> Result<(), ClientError> {
        *self.record.lock() = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.record.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use chrono::{TimeZone, Utc};

    fn record() -> PersistedSession {
        PersistedSession {
            token: Some("tok".to_string()),
            user: Some(SessionUser {
                subject_id: "u-1".to_string(),
                role: Role::User,
                issued_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                expires_at: Utc.timestamp_opt(1_700_086_400, 0).unwrap(),
            }),
            cookies: Some("refreshToken=abc".to_string()),
        }
    }

    #[test]
    fn test_file_storage_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested").join("session.json"));

        assert_eq!(storage.load().unwrap(), None);
        storage.save(&record()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(record()));
    }

    #[test]
    fn test_file_storage_keeps_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let storage = FileSessionStorage::new(&path);
        storage.save(&record()).unwrap();
        storage.clear().unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content, serde_json::json!({"theme": "dark"}));
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert_eq!(storage.load().unwrap(), None);
        storage.save(&record()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(record()));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemorySessionStorage::new();
        storage.save(&record()).unwrap();
        assert!(storage.load().unwrap().is_some());
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
