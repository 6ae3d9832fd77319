//! Per-client server-side state keyed by an id carried in a cookie.
//!
//! A [`Session`] pairs an id with a lazily loaded mapping of values and the
//! [`SessionStore`] that persists it. Data is only read from the store on the
//! first access and only written back by an explicit [`Session::save`]; a
//! request that never touches its session costs nothing.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

pub mod store;

pub use store::SessionStore;

/// The mapping a session persists. Values are free-form JSON so any
/// serializable shape round-trips through every store.
pub type SessionData = IndexMap<String, Value>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The store does not support this operation (persistence or
    /// enumeration). Surfaced to the caller, never retried.
    #[error("operation not supported by this session store")]
    Unsupported,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("corrupt session data: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    store: SessionStore,
    /// `None` until the first access pulls data out of the store.
    data: Option<SessionData>,
}

impl Session {
    /// Wraps an existing id, typically taken from the session cookie.
    pub fn new(id: &str, store: SessionStore) -> Self {
        Self {
            id: id.to_string(),
            store,
            data: None,
        }
    }

    /// Starts a fresh session under a generated id. The id is hex-only, so
    /// it is already safe as a file name.
    pub fn generate(store: SessionStore) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self::new(&id, store)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Whether the backing data has been pulled from the store yet.
    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    fn data_mut(&mut self) -> Result<&mut SessionData, SessionError> {
        if self.data.is_none() {
            self.data = Some(self.store.load(&self.id)?);
        }
        // Filled above.
        Ok(self.data.as_mut().unwrap())
    }

    /// Forces a (re)load from the store, replacing any unsaved changes.
    pub fn load(&mut self) -> Result<(), SessionError> {
        self.data = Some(self.store.load(&self.id)?);
        Ok(())
    }

    pub fn get(&mut self, key: &str) -> Result<Option<&Value>, SessionError> {
        Ok(self.data_mut()?.get(key))
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), SessionError> {
        self.data_mut()?.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.data_mut()?.shift_remove(key))
    }

    /// Enumerates `(key, value)` pairs, loading on demand. Fails with
    /// [`SessionError::Unsupported`] when the store cannot enumerate.
    pub fn iter(&mut self) -> Result<impl Iterator<Item = (&String, &Value)>, SessionError> {
        if self.data.is_none() {
            self.data = Some(self.store.entries(&self.id)?);
        }
        Ok(self.data.as_ref().unwrap().iter())
    }

    /// Persists the current data. Loads first if nothing was touched, so a
    /// save on a fresh session writes an empty record rather than panicking.
    pub fn save(&mut self) -> Result<(), SessionError> {
        if self.data.is_none() {
            self.data = Some(self.store.load(&self.id)?);
        }
        self.store.save(&self.id, self.data.as_ref().unwrap())
    }

    /// Drops the stored record and clears the in-memory data.
    pub fn destroy(&mut self) -> Result<(), SessionError> {
        self.store.delete(&self.id)?;
        self.data = Some(SessionData::new());
        Ok(())
    }
}
