use anyhow::Result;
use async_trait::async_trait;
use clap::Args;

use crate::access::gate::Gate;
use crate::cancel::CancelToken;
use crate::client::factory::ClientFactory;
use crate::display::display_json;
use crate::route::RouteDescriptor;
use crate::session::SessionStore;

use super::{ConfigArgs, RunCommand};

/// Evaluate the authorization gate for a route and print the decision.
#[derive(Args)]
pub struct CheckArgs {
    /// Route path to evaluate, e.g. "/splits".
    pub path: String,

    /// Display name of the page. Defaults to the last path segment.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Comma-separated permission keys the page requires.
    #[arg(short, long)]
    pub keys: Option<String>,

    /// The page requires an admin role.
    #[arg(long)]
    pub admin_only: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for CheckArgs {
    async fn run(&self) -> Result<()> {
        let ps = self.config.build_path_set()?;
        let factory = ClientFactory::load(&ps)?;
        let session = SessionStore::new(factory.config().build_storage()?);
        let client = factory.build_client_with_session(&session).await?;

        let name = match &self.name {
            Some(name) => name.clone(),
            None => self
                .path
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .unwrap_or(&self.path)
                .to_string(),
        };
        let mut route = RouteDescriptor::new(&self.path, &name);
        if let Some(keys) = &self.keys {
            route = route.with_keys(
                keys.split(',')
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(String::from),
            );
        }
        if self.admin_only {
            route = route.admin_only();
        }

        let gate = Gate::new(&client, &session, factory.config().home_page.clone());
        let outcome = gate.evaluate(&route, &CancelToken::new()).await?;
        display_json(outcome)
    }
}
