//! Data models for the dashboard domains.
//!
//! This module contains the wire types exchanged with the dashboard API:
//!
//! - `Entity`: shared record shape of the Profile, Platform and User domains
//! - `Breadcrumb`: audit stamp attached to create/update events
//! - `Identity`: read-only record of the Identity domain
//! - `Page`, `ListQuery`: cursor-paginated list results and their filters
//! - Auth types: `DevLoginRequest`, `DevLoginResponse`, `ConfigResponse`

pub mod auth;
pub mod breadcrumb;
pub mod entity;
pub mod identity;
pub mod page;

pub use auth::{ConfigResponse, DevLoginRequest, DevLoginResponse, TokenInfo};
pub use breadcrumb::Breadcrumb;
pub use entity::{CreatedId, Entity, EntityInput, EntityUpdate, Platform, Profile, Status, User};
pub use identity::Identity;
pub use page::{ListQuery, Page, SortOrder};
