use serde::{Deserialize, Serialize};

/// One entry of the portal's routing table, supplied by the layout
/// shell. Consumed by the gates, never produced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub path: String,

    /// Display name, doubles as the section name for scope checks.
    pub name: String,

    #[serde(default)]
    pub permission_keys: Vec<String>,

    #[serde(default)]
    pub requires_admin: bool,

    #[serde(default)]
    pub hidden: bool,
}

impl RouteDescriptor {
    pub fn new(path: &str, name: &str) -> Self {
        Self {
            path: String::from(path),
            name: String::from(name),
            permission_keys: Vec::new(),
            requires_admin: false,
            hidden: false,
        }
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permission_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn admin_only(mut self) -> Self {
        self.requires_admin = true;
        self
    }

    /// Canonical section name used against the allow-list.
    pub fn section(&self) -> String {
        self.name.trim().to_lowercase()
    }
}
