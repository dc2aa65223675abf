//! Durable storage backends for the persisted part of a session.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AuthTokens, User};

/// Namespace key the session is stored under.
pub const STORAGE_KEY: &str = "auth-storage";

const STORAGE_VERSION: u32 = 0;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fields of a session that survive restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub user: Option<User>,
    pub tokens: Option<AuthTokens>,
    pub is_authenticated: bool,
}

/// On-disk layout: `{ "state": { ... }, "version": 0 }`.
#[derive(Serialize, Deserialize)]
struct Envelope {
    state: PersistedSession,
    #[serde(default)]
    version: u32,
}

fn encode(session: &PersistedSession) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(&Envelope {
        state: session.clone(),
        version: STORAGE_VERSION,
    })?)
}

fn decode(contents: &str) -> Result<PersistedSession, StorageError> {
    let envelope: Envelope = serde_json::from_str(contents)?;
    Ok(envelope.state)
}

/// Key-value persistence for the session. Calls are synchronous: a save has
/// completed once it returns.
pub trait SessionStorage: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<PersistedSession>, StorageError>;

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;
}

/// Stores the session as a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/auth-storage.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STORAGE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => decode(&contents).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Creates the parent directory if needed. The file is owner read/write
    /// only on Unix.
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, encode(session)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

/// Keeps the encoded session in memory. Useful for tests and for processes
/// that should not touch the disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw encoded contents, as they would appear on disk.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        self.contents().as_deref().map(decode).transpose()
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let encoded = encode(session)?;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn persisted() -> PersistedSession {
        PersistedSession {
            user: Some(
                serde_json::from_value(json!({
                    "id": "u1",
                    "email": "ada@example.com",
                    "username": "ada",
                    "createdAt": "2024-05-01T10:00:00Z",
                    "updatedAt": "2024-05-01T10:00:00Z"
                }))
                .unwrap(),
            ),
            tokens: Some(AuthTokens::new("a1", "r1")),
            is_authenticated: true,
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn file_storage_writes_the_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path().join("nested"));

        storage.save(&persisted()).unwrap();

        assert!(storage.path().ends_with("auth-storage.json"));
        let raw: Value =
            serde_json::from_str(&fs::read_to_string(storage.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], 0);
        assert_eq!(raw["state"]["isAuthenticated"], true);
        assert_eq!(raw["state"]["tokens"]["refreshToken"], "r1");
        assert_eq!(storage.load().unwrap(), Some(persisted()));
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        storage.save(&persisted()).unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        fs::write(storage.path(), "{ not json").unwrap();

        assert!(matches!(storage.load(), Err(StorageError::Json(_))));
    }

    #[test]
    fn memory_storage_uses_the_same_encoding() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load().unwrap(), None);

        storage.save(&persisted()).unwrap();

        let raw: Value = serde_json::from_str(&storage.contents().unwrap()).unwrap();
        assert_eq!(raw["state"]["user"]["username"], "ada");
        assert_eq!(storage.load().unwrap(), Some(persisted()));
    }
}
