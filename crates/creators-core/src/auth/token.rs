//! Bearer token sources for the API client.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::session::{read_session_file, SESSION_FILE};

/// Supplies the bearer token attached to each request. Consulted once per
/// request; `None` means the request goes out unauthenticated.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// A fixed token, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the token from the persisted session file on every call, so a
/// login or logout in another process is picked up immediately.
///
/// Expired tokens are still returned; the server is the one to reject them.
#[derive(Debug, Clone)]
pub struct PersistedToken {
    path: PathBuf,
}

impl PersistedToken {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            path: cache_dir.join(SESSION_FILE),
        }
    }
}

impl TokenSource for PersistedToken {
    fn access_token(&self) -> Option<String> {
        match read_session_file(&self.path) {
            Ok(Some(data)) => Some(data.access_token),
            Ok(None) => {
                debug!(path = %self.path.display(), "No session file, sending unauthenticated request");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }
}
