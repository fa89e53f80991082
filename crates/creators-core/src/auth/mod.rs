//! Authentication module for managing the dev-login session.
//!
//! This module provides:
//! - `Session`: the persisted dev-login session with expiry and roles
//! - `TokenSource`: where the API client reads its bearer token from
//!
//! Sessions are persisted to `session.json` in the cache directory and
//! re-read by `PersistedToken` on every request.

pub mod session;
pub mod token;

pub use session::{Session, SessionData};
pub use token::{PersistedToken, StaticToken, TokenSource};
