use anyhow::Result;
use log::info;

use crate::config::{CommonConfig, PathSet};
use crate::session::SessionStore;

use super::config::ClientConfig;
use super::resolve::resolve_api_base;
use super::Client;

pub struct ClientFactory {
    cfg: ClientConfig,
}

impl ClientFactory {
    pub fn new(cfg: ClientConfig) -> Self {
        Self { cfg }
    }

    pub fn load(ps: &PathSet) -> Result<Self> {
        let cfg = ps.load_config("client", ClientConfig::default)?;
        Ok(Self { cfg })
    }

    pub async fn build_client(&self) -> Result<Client> {
        let resolved = resolve_api_base(&self.cfg).await;
        info!(
            "Using api base '{}' (source {:?})",
            resolved.base, resolved.source
        );
        Client::new(&resolved.base, self.cfg.timeout_secs)
    }

    pub async fn build_client_with_session(&self, session: &SessionStore) -> Result<Client> {
        let mut client = self.build_client().await?;
        if let Some(token) = session.token() {
            client.set_token(token);
        }
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }
}
