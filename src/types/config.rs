use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteConfigResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub config: Option<WebsiteConfig>,
}

/// Public website configuration. Older deployments expose the api base
/// under different field names, so every known alias is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebsiteConfig {
    #[serde(default, rename = "apiBase")]
    pub api_base: Option<String>,

    #[serde(default)]
    pub backend: Option<String>,

    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default)]
    pub api: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,
}

impl WebsiteConfig {
    /// First populated api-base alias, in fixed precedence order.
    pub fn api_candidate(&self) -> Option<&str> {
        [&self.api_base, &self.backend, &self.api_url, &self.api]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.trim().is_empty())
    }
}
