pub mod file;

pub use file::{FileTokenStorage, MemoryTokenStorage};

use std::sync::Arc;

pub const TOKEN_KEY: &str = "token";

/// Durable key-value persistence for the session.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Sole owner of the bearer token. Storage failures degrade to an
/// unauthenticated session instead of erroring.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStorage::default()))
    }

    pub fn load(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "session storage unavailable; treating as signed out");
                None
            }
        }
    }

    pub fn set(&self, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            self.clear();
            return;
        }
        if let Err(err) = self.storage.set(TOKEN_KEY, token) {
            tracing::warn!(error = %format!("{err:#}"), "failed to persist session token");
        }
    }

    pub fn clear(&self) {
        if let Err(err) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %format!("{err:#}"), "failed to erase session token");
        }
    }

    pub fn session(&self) -> Session {
        Session { token: self.load() }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
