//! The in-memory session store with write-through persistence.

use std::{fmt, sync::Arc};

use tokio::sync::watch;
use tracing::{debug, warn};

use super::storage::{MemoryStorage, PersistedSession, SessionStorage};
use crate::models::{AuthTokens, User, UserUpdate};

/// Snapshot of the login state.
///
/// `is_authenticated` is true exactly when `user` is set. `is_loading` and
/// `error` are transient and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub tokens: Option<AuthTokens>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Session {
    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            tokens: self.tokens.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    fn restored(persisted: PersistedSession) -> Self {
        let is_authenticated = persisted.user.is_some();
        if is_authenticated != persisted.is_authenticated {
            warn!("stored session flag disagrees with stored user, trusting the user");
        }
        Self {
            user: persisted.user,
            tokens: persisted.tokens,
            is_authenticated,
            is_loading: false,
            error: None,
        }
    }
}

/// Shared handle to the current session.
///
/// Cloning is cheap and every clone sees the same state. Each mutation is
/// applied atomically, written to storage before the call returns, and then
/// published to subscribers.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<Session>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Rehydrates from `storage`. Unreadable storage starts an empty session.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self::with_storage(Arc::new(storage))
    }

    pub fn with_storage(storage: Arc<dyn SessionStorage>) -> Self {
        let session = match storage.load() {
            Ok(Some(persisted)) => {
                debug!("restored persisted session");
                Session::restored(persisted)
            }
            Ok(None) => Session::default(),
            Err(err) => {
                warn!(error = %err, "failed to restore session, starting logged out");
                Session::default()
            }
        };

        let (state, _) = watch::channel(session);
        Self {
            state: Arc::new(state),
            storage,
        }
    }

    /// A store that keeps nothing across restarts.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn tokens(&self) -> Option<AuthTokens> {
        self.state.borrow().tokens.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .borrow()
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state
            .borrow()
            .tokens
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn login(&self, user: User, tokens: AuthTokens) {
        self.mutate(|session| {
            session.user = Some(user);
            session.tokens = Some(tokens);
            session.is_authenticated = true;
            session.error = None;
        });
    }

    /// Safe to call when already logged out.
    pub fn logout(&self) {
        self.mutate(|session| {
            session.user = None;
            session.tokens = None;
            session.is_authenticated = false;
            session.error = None;
        });
    }

    /// Merges `update` into the current user. Does nothing when logged out.
    pub fn update_user(&self, update: UserUpdate) {
        self.mutate(|session| {
            if let Some(user) = session.user.as_mut() {
                user.merge(update);
            }
        });
    }

    pub fn set_user(&self, user: Option<User>) {
        self.mutate(|session| {
            session.is_authenticated = user.is_some();
            session.user = user;
        });
    }

    pub fn set_tokens(&self, tokens: Option<AuthTokens>) {
        self.mutate(|session| session.tokens = tokens);
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|session| session.is_loading = is_loading);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.send_modify(|session| session.error = error);
    }

    // The save runs while the watch lock is held so writes reach storage in
    // the same order as the mutations.
    fn mutate(&self, f: impl FnOnce(&mut Session)) {
        self.state.send_modify(|session| {
            f(session);
            if let Err(err) = self.storage.save(&session.persisted()) {
                warn!(error = %err, "failed to persist session");
            }
        });
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FileStorage, StorageError};
    use serde_json::json;

    fn user(username: &str) -> User {
        serde_json::from_value(json!({
            "id": format!("id-{username}"),
            "email": format!("{username}@example.com"),
            "username": username,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn starts_empty() {
        let store = SessionStore::in_memory();
        assert_eq!(store.snapshot(), Session::default());
        assert!(!store.is_authenticated());
        assert_eq!(store.access_token(), None);
    }

    #[test]
    fn login_sets_user_tokens_and_flag() {
        let store = SessionStore::in_memory();
        store.set_error(Some("bad password".into()));

        store.login(user("ada"), AuthTokens::new("a1", "r1"));

        let session = store.snapshot();
        assert_eq!(session.user, Some(user("ada")));
        assert_eq!(session.tokens, Some(AuthTokens::new("a1", "r1")));
        assert!(session.is_authenticated);
        assert_eq!(session.error, None);
    }

    #[test]
    fn logout_then_login_leaves_no_stale_fields() {
        let store = SessionStore::in_memory();
        store.login(user("old"), AuthTokens::new("a0", "r0"));
        store.update_user(UserUpdate {
            bio: Some("stale bio".into()),
            ..Default::default()
        });

        store.logout();
        store.login(user("new"), AuthTokens::new("a1", "r1"));

        let session = store.snapshot();
        assert_eq!(session.user, Some(user("new")));
        assert_eq!(session.tokens, Some(AuthTokens::new("a1", "r1")));
        assert!(session.is_authenticated);
    }

    #[test]
    fn logout_is_idempotent() {
        let store = SessionStore::in_memory();
        store.logout();
        store.logout();
        assert_eq!(store.snapshot(), Session::default());
    }

    #[test]
    fn update_user_merges_or_does_nothing() {
        let store = SessionStore::in_memory();
        store.update_user(UserUpdate {
            bio: Some("ignored".into()),
            ..Default::default()
        });
        assert_eq!(store.user(), None);

        store.login(user("ada"), AuthTokens::new("a1", "r1"));
        store.update_user(UserUpdate {
            bio: Some("Bakes bread".into()),
            ..Default::default()
        });

        let updated = store.user().unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Bakes bread"));
        assert_eq!(updated.username, "ada");
        assert!(store.is_authenticated());
    }

    #[test]
    fn set_user_keeps_flag_in_sync() {
        let store = SessionStore::in_memory();
        store.set_user(Some(user("ada")));
        assert!(store.is_authenticated());
        store.set_user(None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn mutations_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(FileStorage::in_dir(dir.path()));
        store.login(user("ada"), AuthTokens::new("a1", "r1"));
        store.set_loading(true);
        store.set_error(Some("transient".into()));

        let restored = SessionStore::new(FileStorage::in_dir(dir.path()));
        let session = restored.snapshot();
        assert_eq!(session.user, Some(user("ada")));
        assert_eq!(session.tokens, Some(AuthTokens::new("a1", "r1")));
        assert!(session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(session.error, None);
    }

    #[test]
    fn logout_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(FileStorage::in_dir(dir.path()));
        store.login(user("ada"), AuthTokens::new("a1", "r1"));
        store.logout();

        let restored = SessionStore::new(FileStorage::in_dir(dir.path()));
        assert_eq!(restored.snapshot(), Session::default());
    }

    #[test]
    fn restore_trusts_the_user_over_the_flag() {
        let storage = MemoryStorage::new();
        storage
            .save(&PersistedSession {
                user: None,
                tokens: Some(AuthTokens::new("a1", "r1")),
                is_authenticated: true,
            })
            .unwrap();

        let store = SessionStore::new(storage);
        assert!(!store.is_authenticated());
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn unreadable_storage_starts_logged_out() {
        struct Broken;
        impl SessionStorage for Broken {
            fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
                Err(StorageError::Io(std::io::Error::other("disk on fire")))
            }
            fn save(&self, _: &PersistedSession) -> Result<(), StorageError> {
                Err(StorageError::Io(std::io::Error::other("disk on fire")))
            }
        }

        let store = SessionStore::new(Broken);
        assert_eq!(store.snapshot(), Session::default());

        // in-memory state still changes when the write fails
        store.login(user("ada"), AuthTokens::new("a1", "r1"));
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn subscribers_see_every_mutation() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();

        store.login(user("ada"), AuthTokens::new("a1", "r1"));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated);

        store.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated);
    }
}
