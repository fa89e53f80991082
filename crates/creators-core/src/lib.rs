//! Core library for the creators dashboard.
//!
//! Provides the typed REST client for the Profile, Platform, User and
//! Identity domains, the persisted dev-login session, client configuration
//! and the dashboard's navigation guard.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiResult, Resource};
pub use config::Config;
