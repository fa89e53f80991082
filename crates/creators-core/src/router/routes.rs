use std::fmt;

/// Named pages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Login,
    Profiles,
    ProfileNew,
    ProfileEdit,
    Platforms,
    PlatformNew,
    PlatformEdit,
    Users,
    UserNew,
    UserEdit,
    Identitys,
    IdentityView,
    Admin,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Login => "Login",
            RouteName::Profiles => "Profiles",
            RouteName::ProfileNew => "ProfileNew",
            RouteName::ProfileEdit => "ProfileEdit",
            RouteName::Platforms => "Platforms",
            RouteName::PlatformNew => "PlatformNew",
            RouteName::PlatformEdit => "PlatformEdit",
            RouteName::Users => "Users",
            RouteName::UserNew => "UserNew",
            RouteName::UserEdit => "UserEdit",
            RouteName::Identitys => "Identitys",
            RouteName::IdentityView => "IdentityView",
            RouteName::Admin => "Admin",
        }
    }

    /// Pattern of the route registered under this name
    pub fn pattern(&self) -> &'static str {
        ROUTES
            .iter()
            .find(|r| r.name == *self)
            .map(|r| r.pattern)
            .unwrap_or("/")
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub name: RouteName,
    pub requires_auth: bool,
    pub requires_role: Option<&'static str>,
}

const fn page(pattern: &'static str, name: RouteName) -> Route {
    Route {
        pattern,
        name,
        requires_auth: true,
        requires_role: None,
    }
}

/// Where `/` sends the user
pub const ROOT_REDIRECT: &str = "/profiles";

pub const ROUTES: &[Route] = &[
    Route {
        pattern: "/login",
        name: RouteName::Login,
        requires_auth: false,
        requires_role: None,
    },
    page("/profiles", RouteName::Profiles),
    page("/profiles/new", RouteName::ProfileNew),
    page("/profiles/:id", RouteName::ProfileEdit),
    page("/platforms", RouteName::Platforms),
    page("/platforms/new", RouteName::PlatformNew),
    page("/platforms/:id", RouteName::PlatformEdit),
    page("/users", RouteName::Users),
    page("/users/new", RouteName::UserNew),
    page("/users/:id", RouteName::UserEdit),
    page("/identitys", RouteName::Identitys),
    page("/identitys/:id", RouteName::IdentityView),
    Route {
        pattern: "/admin",
        name: RouteName::Admin,
        requires_auth: true,
        requires_role: Some("admin"),
    },
];

/// A path matched against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Path after the root redirect, with query and fragment preserved
    pub full_path: String,
    pub route: Option<&'static Route>,
    pub params: Vec<(&'static str, String)>,
}

impl Resolved {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_route(route: &'static Route, parts: &[&str]) -> Option<Vec<(&'static str, String)>> {
    let pattern = segments(route.pattern);
    if pattern.len() != parts.len() {
        return None;
    }
    let mut params = Vec::new();
    for (expected, actual) in pattern.iter().zip(parts) {
        if let Some(name) = expected.strip_prefix(':') {
            params.push((name, actual.to_string()));
        } else if !expected.eq_ignore_ascii_case(actual) {
            return None;
        }
    }
    Some(params)
}

/// The path part of a full path, without `?query` or `#fragment`
pub fn path_only(full_path: &str) -> &str {
    full_path.split(['?', '#']).next().unwrap_or_default()
}

/// Resolve a path (optionally carrying `?query` or `#fragment`).
/// Literal segments match case-insensitively and take precedence over
/// parameters.
pub fn resolve(full_path: &str) -> Resolved {
    let path = path_only(full_path);
    let parts = segments(path);

    if parts.is_empty() {
        // Query and fragment survive the redirect
        let suffix = &full_path[path.len()..];
        return resolve(&format!("{}{}", ROOT_REDIRECT, suffix));
    }

    let best = ROUTES
        .iter()
        .filter_map(|route| match_route(route, &parts).map(|params| (route, params)))
        .min_by_key(|(_, params)| params.len());

    match best {
        Some((route, params)) => Resolved {
            full_path: full_path.to_string(),
            route: Some(route),
            params,
        },
        None => Resolved {
            full_path: full_path.to_string(),
            route: None,
            params: Vec::new(),
        },
    }
}
