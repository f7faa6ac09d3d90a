use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Authoritative role and section allow-list for the current session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionsResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub role: String,

    #[serde(default, rename = "allowedSections")]
    pub allowed_sections: Vec<String>,

    #[serde(default, rename = "allowedRoutes")]
    pub allowed_routes: Vec<String>,

    #[serde(default, rename = "homeRoute")]
    pub home_route: Option<String>,
}

/// Fine-grained permission map keyed by capability strings such as
/// `release.create`. The map itself stays optional: some deployments
/// answer 200 without one, which is not the same as an empty map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPermissionsResponse {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub permissions: Option<HashMap<String, bool>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub permissions: HashMap<String, bool>,
}
