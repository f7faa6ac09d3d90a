pub mod config;
pub mod factory;
pub mod resolve;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Result};
use log::debug;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::types::config::{WebsiteConfig, WebsiteConfigResponse};
use crate::types::maintenance::MaintenancePagesResponse;
use crate::types::profile::{Profile, ProfileResponse};
use crate::types::rbac::{PermissionsResponse, SectionsResponse, UserPermissionsResponse};

const MIME_JSON: &str = "application/json";

/// Portal api client. Holds the resolved base url and the bearer token,
/// and exposes one typed call per endpoint the gating pipeline consumes.
#[derive(Debug, Clone)]
pub struct Client {
    base: String,
    http: reqwest::Client,
    token: Option<String>,
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Network error: {0}")]
    Network(#[from] anyhow::Error),

    #[error("Server error: code {code}, {message}")]
    Status { code: u16, message: String },

    #[error("Server returned invalid json: {0:?}")]
    InvalidJson(String),

    #[error("Server rejected request: {0}")]
    Api(String),
}

impl Client {
    pub fn new(base: &str, timeout_secs: u64) -> Result<Self> {
        let base = base.trim_end_matches('/');
        let parsed = match Url::parse(base) {
            Ok(url) => url,
            Err(_) => bail!("invalid api base '{base}'"),
        };
        match parsed.scheme() {
            "http" | "https" => {}
            _ => bail!(
                "invalid api base scheme, expect 'http' or 'https', not '{}'",
                parsed.scheme()
            ),
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| anyhow::anyhow!("build http client: {err}"))?;

        Ok(Self {
            base: base.to_string(),
            http,
            token: None,
        })
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Public website config, primary path with one fallback path.
    pub async fn website_config(&self) -> Result<WebsiteConfig, RequestError> {
        let resp = match self
            .get_json::<WebsiteConfigResponse>("api/website/config")
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                debug!("Primary website config path failed: {err:#}, trying fallback path");
                self.get_json::<WebsiteConfigResponse>("website/config")
                    .await?
            }
        };

        if !resp.success {
            return Err(RequestError::Api(String::from(
                "website config request was not successful",
            )));
        }
        Ok(resp.config.unwrap_or_default())
    }

    pub async fn profile_me(&self) -> Result<Profile, RequestError> {
        let resp: ProfileResponse = self.get_json("api/auth/profile/me").await?;
        if !resp.success {
            return Err(RequestError::Api(String::from(
                "profile request was not successful",
            )));
        }
        match resp.profile {
            Some(profile) => Ok(profile),
            None => Err(RequestError::Api(String::from(
                "profile response has no profile",
            ))),
        }
    }

    pub async fn rbac_sections(&self) -> Result<SectionsResponse, RequestError> {
        let resp: SectionsResponse = self.get_json("api/rbac/sections").await?;
        if !resp.success {
            return Err(RequestError::Api(String::from(
                "rbac sections request was not successful",
            )));
        }
        Ok(resp)
    }

    /// Fine-grained permission map scoped to the requested keys.
    pub async fn permissions_me(
        &self,
        keys: &[String],
    ) -> Result<UserPermissionsResponse, RequestError> {
        let path = if keys.is_empty() {
            String::from("api/permissions/me")
        } else {
            format!("api/permissions/me?keys={}", keys.join(","))
        };
        self.get_json(&path).await
    }

    /// Coarse permission map, primary endpoint with one fallback endpoint.
    pub async fn auth_permissions(&self) -> Result<HashMap<String, bool>, RequestError> {
        let resp = match self
            .get_json::<PermissionsResponse>("api/auth/permissions")
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                debug!("Primary permissions path failed: {err:#}, trying fallback path");
                self.get_json::<PermissionsResponse>("api/permissions")
                    .await?
            }
        };

        if !resp.success {
            return Err(RequestError::Api(String::from(
                "permissions request was not successful",
            )));
        }
        Ok(resp.permissions)
    }

    pub async fn maintenance_pages(&self) -> Result<HashMap<String, bool>, RequestError> {
        let resp: MaintenancePagesResponse =
            self.get_json("api/system/maintenance-pages").await?;
        Ok(resp.pages)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let url = format!("{}/{}", self.base, path);
        let mut req = self
            .http
            .request(Method::GET, &url)
            .header("Accept", MIME_JSON);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(err) => return Err(RequestError::Network(err.into())),
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(err) => return Err(RequestError::Network(err.into())),
        };

        if !status.is_success() {
            return Err(RequestError::Status {
                code: status.as_u16(),
                message: body,
            });
        }

        match serde_json::from_str(&body) {
            Ok(data) => Ok(data),
            Err(_) => Err(RequestError::InvalidJson(body)),
        }
    }
}
