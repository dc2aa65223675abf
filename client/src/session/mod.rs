//! Login session state and its durable storage.
//!
//! [`SessionStore`] is the single source of truth for who is logged in and with
//! which tokens. It is shared by handle between the HTTP client, the services
//! and any UI that wants to observe changes.

mod storage;
mod store;

pub use storage::{
    FileStorage, MemoryStorage, PersistedSession, SessionStorage, StorageError, STORAGE_KEY,
};
pub use store::{Session, SessionStore};
