//! Session records stored in the key-value store.

use crate::{Cache, CacheError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Session record as written to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    /// The session ID.
    pub id: SessionId,
    /// User-defined session data.
    pub data: T,
    /// Incremented on every write.
    pub version: u64,
    /// When the session was first written (Unix timestamp).
    pub created_at: u64,
    /// When the session was last written (Unix timestamp).
    pub updated_at: u64,
}

/// Typed session records on top of a [`Cache`].
///
/// # Example
///
/// ```rust,ignore
/// use cart_kv::{Session, SessionId};
///
/// let session = Session::<CartSession>::new()?;
/// let id = SessionId::from("abc123");
///
/// session.set(&id, &CartSession::default())?;
/// let data = session.get(&id)?;
/// ```
pub struct Session<T> {
    cache: Cache,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Session<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a session manager using the default store.
    pub fn new() -> Result<Self, CacheError> {
        Ok(Self::with_cache(Cache::open_default()?))
    }

    /// Create a session manager using a named store.
    pub fn with_store(name: &str) -> Result<Self, CacheError> {
        Ok(Self::with_cache(Cache::open(name)?))
    }

    /// Create a session manager over an already opened store.
    pub fn with_cache(cache: Cache) -> Self {
        Self {
            cache,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Get session data if it exists.
    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.get_versioned(id)?.map(|s| s.data))
    }

    /// Get the full session record including version and timestamps.
    pub fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        self.cache.get::<SessionData<T>>(&session_key(id))
    }

    /// Write session data, bumping the version and keeping the creation time.
    pub fn set(&self, id: &SessionId, data: T) -> Result<u64, CacheError> {
        let key = session_key(id);
        let now = current_timestamp();
        let (version, created_at) = match self.cache.get::<SessionData<T>>(&key)? {
            Some(existing) => (existing.version + 1, existing.created_at),
            None => (1, now),
        };

        let record = SessionData {
            id: id.clone(),
            data,
            version,
            created_at,
            updated_at: now,
        };
        self.cache.set(&key, &record)?;
        Ok(version)
    }

    /// Delete a session.
    pub fn delete(&self, id: &SessionId) -> Result<(), CacheError> {
        self.cache.delete(&session_key(id))
    }

    /// Check if a session exists.
    pub fn exists(&self, id: &SessionId) -> Result<bool, CacheError> {
        self.cache.exists(&session_key(id))
    }
}

fn session_key(id: &SessionId) -> String {
    crate::cache_key!("session", id)
}

fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
