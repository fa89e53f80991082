//! Dashboard navigation.
//!
//! The route table mirrors the pages of the dashboard. `before_each`
//! decides, for a requested path, whether navigation is allowed or must be
//! redirected to the login page or to the default page.

pub mod guard;
pub mod routes;

pub use guard::{before_each, page_title, AuthState, Navigation};
pub use routes::{path_only, resolve, Resolved, Route, RouteName, ROUTES};
