use super::routes::{path_only, resolve, RouteName};

/// Title shown on the login page
const LOGIN_TITLE: &str = "Creators Dashboard Login";

/// Title shown everywhere else
const DEFAULT_TITLE: &str = "Profile";

/// What the guard needs to know about the current user.
pub trait AuthState {
    fn is_authenticated(&self) -> bool;
    fn has_role(&self, role: &str) -> bool;
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    /// Send the user to the login page, then back to `redirect`
    Login { redirect: String },
    /// The user lacks the role the page requires
    Redirect(RouteName),
}

/// Decide whether navigation to `full_path` may proceed.
pub fn before_each(full_path: &str, auth: &impl AuthState) -> Navigation {
    let resolved = resolve(full_path);
    let Some(route) = resolved.route else {
        return Navigation::Allow;
    };

    if route.requires_auth && !auth.is_authenticated() {
        return Navigation::Login {
            redirect: resolved.full_path,
        };
    }

    if let Some(role) = route.requires_role {
        if !auth.has_role(role) {
            return Navigation::Redirect(RouteName::Profiles);
        }
    }

    Navigation::Allow
}

/// Title for a page. Query and fragment are ignored.
pub fn page_title(full_path: &str) -> &'static str {
    if path_only(full_path) == "/login" {
        LOGIN_TITLE
    } else {
        DEFAULT_TITLE
    }
}
