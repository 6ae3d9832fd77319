//! Session storage variants.
//!
//! A [`SessionStore`] is one of a fixed set of storage strategies, chosen
//! when the request is constructed:
//!
//! - [`SessionStore::Null`] keeps nothing. Loads yield an empty mapping and
//!   anything that would persist or enumerate fails with
//!   [`SessionError::Unsupported`]. Useful as a read-only/disabled mode.
//! - [`SessionStore::Memory`] keeps sessions in a process-wide map. Entries
//!   live until explicitly deleted; there is no eviction and no TTL. The map
//!   itself is guarded by a mutex, but a load-mutate-save cycle spanning one
//!   request is not a transaction: two requests hitting the same id can lose
//!   writes. Accepted limitation of this store.
//! - [`SessionStore::File`] writes one JSON file per session id under a
//!   configured directory. I/O errors surface unchanged, with no retry.
//!
//! File names are derived from the session id reduced to its alphanumeric
//! characters. Ids come from client cookies, so using them verbatim would
//! open the directory to path traversal; the sanitization is a correctness
//! requirement, not cosmetics.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::sessions::{SessionData, SessionError};

/// Process-wide backing map for [`SessionStore::Memory`], shared across all
/// requests served by this process.
static MEMORY: Lazy<Mutex<HashMap<String, SessionData>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStore {
    #[default]
    Null,
    Memory,
    File {
        dir: PathBuf,
    },
}

/// Reduces a client-supplied session id to a safe file name stem.
fn sanitize_id(id: &str) -> String {
    id.chars().filter(char::is_ascii_alphanumeric).collect()
}

impl SessionStore {
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        SessionStore::File { dir: dir.into() }
    }

    /// Loads the data stored under `id`. A backend with no record for `id`
    /// yields an empty mapping, not an error.
    pub fn load(&self, id: &str) -> Result<SessionData, SessionError> {
        match self {
            SessionStore::Null => Ok(SessionData::new()),
            SessionStore::Memory => {
                let store = MEMORY.lock().unwrap();
                Ok(store.get(id).cloned().unwrap_or_default())
            }
            SessionStore::File { dir } => {
                let content = match fs::read_to_string(Self::session_path(dir, id)?) {
                    Ok(content) => content,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {
                        return Ok(SessionData::new());
                    }
                    Err(err) => return Err(err.into()),
                };
                Ok(serde_json::from_str(&content)?)
            }
        }
    }

    /// Persists `data` under `id`, overwriting any previous record.
    pub fn save(&self, id: &str, data: &SessionData) -> Result<(), SessionError> {
        match self {
            SessionStore::Null => Err(SessionError::Unsupported),
            SessionStore::Memory => {
                let mut store = MEMORY.lock().unwrap();
                store.insert(id.to_string(), data.clone());
                Ok(())
            }
            SessionStore::File { dir } => {
                fs::create_dir_all(dir)?;
                let serialized = serde_json::to_string(data)?;
                fs::write(Self::session_path(dir, id)?, serialized)?;
                Ok(())
            }
        }
    }

    /// Removes the record stored under `id`, if any.
    pub fn delete(&self, id: &str) -> Result<(), SessionError> {
        match self {
            SessionStore::Null => Err(SessionError::Unsupported),
            SessionStore::Memory => {
                let mut store = MEMORY.lock().unwrap();
                store.remove(id);
                Ok(())
            }
            SessionStore::File { dir } => {
                match fs::remove_file(Self::session_path(dir, id)?) {
                    Ok(()) => Ok(()),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
        }
    }

    /// Loads the entries under `id` for enumeration. A store that cannot
    /// enumerate fails with [`SessionError::Unsupported`].
    pub fn entries(&self, id: &str) -> Result<SessionData, SessionError> {
        match self {
            SessionStore::Null => Err(SessionError::Unsupported),
            _ => self.load(id),
        }
    }

    fn session_path(dir: &Path, id: &str) -> Result<PathBuf, SessionError> {
        let stem = sanitize_id(id);
        if stem.is_empty() {
            return Err(SessionError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "session id has no safe characters",
            )));
        }
        Ok(dir.join(format!("{}.json", stem)))
    }
}
