//! REST API client module for the creators dashboard API.
//!
//! This module provides the `ApiClient` for listing, reading, creating and
//! updating Profiles, Platforms, Users and Identities.
//!
//! The API uses bearer token authentication; tokens are minted by the
//! dev-login endpoint and read from a `TokenSource` on every request.

pub mod client;
pub mod error;
pub mod resource;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use resource::Resource;
