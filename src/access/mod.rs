pub mod gate;
pub mod perms;
pub mod resolver;

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

/// Sections every restricted or unknown role keeps as a safe default.
pub const RESTRICTED_SECTIONS: [&str; 5] =
    ["splits", "analytics", "accounting", "profile", "banking"];

/// Sections unioned into any server-provided list for the restricted
/// role, even when the server omits them.
pub const RESTRICTED_FLOOR_SECTIONS: [&str; 2] = ["profile", "banking"];

/// Coarse user category. Parsed from whatever casing the server or the
/// token uses; the canonical form is lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    SuperAdmin,
    ArtistManager,
    Distributor,
    RoyaltyShare,
    Unknown(String),
}

impl Role {
    pub fn parse(s: &str) -> Self {
        let canon = s.trim().to_lowercase();
        match canon.as_str() {
            "admin" => Role::Admin,
            "super-admin" | "super admin" | "superadmin" | "super_admin" => Role::SuperAdmin,
            "artist/manager" | "artist manager" | "artist-manager" | "artist_manager" => {
                Role::ArtistManager
            }
            "distributor" => Role::Distributor,
            "royalty share" | "royalty-share" | "royalty_share" | "royaltyshare" => {
                Role::RoyaltyShare
            }
            _ => Role::Unknown(canon),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
            Role::ArtistManager => "artist/manager",
            Role::Distributor => "distributor",
            Role::RoyaltyShare => "royalty share",
            Role::Unknown(s) => s,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    /// Roles granted every section without consulting the server list.
    pub fn has_full_access(&self) -> bool {
        matches!(
            self,
            Role::Admin | Role::SuperAdmin | Role::ArtistManager | Role::Distributor
        )
    }

    /// Fixed role to section-set table, used when no server list is
    /// available.
    pub fn default_scope(&self) -> AccessScope {
        if self.has_full_access() {
            AccessScope::All
        } else {
            AccessScope::sections(RESTRICTED_SECTIONS)
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Allowed-sections value: either everything or a concrete set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    All,
    Sections(HashSet<String>),
}

impl AccessScope {
    pub fn sections<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AccessScope::Sections(
            names
                .into_iter()
                .map(|name| name.as_ref().trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    pub fn empty() -> Self {
        AccessScope::Sections(HashSet::new())
    }

    pub fn permits(&self, section: &str) -> bool {
        match self {
            AccessScope::All => true,
            AccessScope::Sections(sections) => {
                sections.contains(&section.trim().to_lowercase())
            }
        }
    }
}

impl Serialize for AccessScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AccessScope::All => serializer.serialize_str("*"),
            AccessScope::Sections(sections) => {
                let mut sorted: Vec<&String> = sections.iter().collect();
                sorted.sort();
                serializer.collect_seq(sorted)
            }
        }
    }
}

/// Where the current decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionSource {
    JwtBootstrap,
    ServerAuthoritative,
    ProfileFallback,
}

/// Resolved role state for one mount. `trace` accumulates every
/// fallback taken on the way, for logs and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct RoleDecision {
    pub role: Role,
    pub scope: AccessScope,
    pub source: DecisionSource,
    pub loaded: bool,
    pub trace: Vec<String>,
}

impl RoleDecision {
    /// Terminal decision for a session without a token: everything is
    /// denied and no further fetches are attempted.
    pub fn unauthenticated() -> Self {
        Self {
            role: Role::Unknown(String::new()),
            scope: AccessScope::empty(),
            source: DecisionSource::JwtBootstrap,
            loaded: true,
            trace: vec![String::from("no token, session is anonymous")],
        }
    }
}
