use std::fmt;
use std::str::FromStr;

/// The API collections the dashboard manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Profile,
    Platform,
    User,
    Identity,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Profile,
        Resource::Platform,
        Resource::User,
        Resource::Identity,
    ];

    /// Path segment under `/api`
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Profile => "profile",
            Resource::Platform => "platform",
            Resource::User => "user",
            Resource::Identity => "identity",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Resource::Profile => "Profiles",
            Resource::Platform => "Platforms",
            Resource::User => "Users",
            Resource::Identity => "Identities",
        }
    }

    /// Identities are consumed, never created or edited, by the dashboard
    pub fn is_read_only(&self) -> bool {
        matches!(self, Resource::Identity)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let singular = match lower.strip_suffix("ies") {
            Some(stem) => format!("{}y", stem),
            None => lower.trim_end_matches('s').to_string(),
        };
        Resource::ALL
            .into_iter()
            .find(|r| r.path() == singular)
            .ok_or_else(|| format!("unknown domain '{}'", s))
    }
}
