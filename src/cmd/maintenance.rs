use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;

use crate::cancel::CancelToken;
use crate::client::factory::ClientFactory;
use crate::display::display_json;
use crate::maintenance::MaintenanceStore;

use super::{ConfigArgs, RunCommand};

/// Show the maintenance flags, optionally refreshing the mirror first.
#[derive(Args)]
pub struct MaintenanceArgs {
    /// Show only this page's flag.
    pub page: Option<String>,

    /// Fetch the live map from the server before showing.
    #[arg(long)]
    pub refresh: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for MaintenanceArgs {
    async fn run(&self) -> Result<()> {
        let ps = self.config.build_path_set()?;
        let factory = ClientFactory::load(&ps)?;
        let store = MaintenanceStore::new(factory.config().build_storage()?);

        if self.refresh {
            let client = factory.build_client().await?;
            store.refresh(&client, &CancelToken::new()).await?;
        }

        match &self.page {
            Some(page) => display_json(store.is_on(page)),
            None => {
                // Stable ordering for operators diffing outputs
                let map: BTreeMap<String, bool> = store.cached().into_iter().collect();
                display_json(map)
            }
        }
    }
}
