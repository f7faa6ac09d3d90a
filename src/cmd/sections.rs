use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use log::info;

use crate::access::resolver::{Resolution, RoleResolver};
use crate::cancel::CancelToken;
use crate::client::factory::ClientFactory;
use crate::display::display_json;
use crate::session::SessionStore;

use super::{ConfigArgs, RunCommand};

/// Resolve the current role and allowed sections and print them.
#[derive(Args)]
pub struct SectionsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for SectionsArgs {
    async fn run(&self) -> Result<()> {
        let ps = self.config.build_path_set()?;
        let factory = ClientFactory::load(&ps)?;
        let session = SessionStore::new(factory.config().build_storage()?);
        let client = factory.build_client_with_session(&session).await?;

        let mut resolver = RoleResolver::new(&client, &session);
        match resolver.resolve(&CancelToken::new()).await? {
            Resolution::Decided(decision) => display_json(decision),
            Resolution::ForcedLogout {
                jwt_role,
                server_role,
            } => {
                info!(
                    "Session ended, role changed server-side ('{jwt_role}' -> '{server_role}'), sign in again"
                );
                Ok(())
            }
            Resolution::Cancelled => Ok(()),
        }
    }
}
