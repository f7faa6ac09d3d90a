use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub project_name: Option<String>,
}
