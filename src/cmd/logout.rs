use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use log::info;

use crate::client::factory::ClientFactory;
use crate::session::{LogoutReason, SessionStore};

use super::{ConfigArgs, RunCommand};

/// Clear the local session.
#[derive(Args)]
pub struct LogoutArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for LogoutArgs {
    async fn run(&self) -> Result<()> {
        let ps = self.config.build_path_set()?;
        let factory = ClientFactory::load(&ps)?;
        let session = SessionStore::new(factory.config().build_storage()?);

        if session.token().is_none() {
            info!("No active session");
            return Ok(());
        }

        session.clear_with_reason(LogoutReason::UserRequest)?;
        info!("Session cleared");
        Ok(())
    }
}
