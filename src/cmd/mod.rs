mod check;
mod config;
mod logout;
mod maintenance;
mod sections;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use crate::config::PathSet;

#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    /// Log level, one of: error, warn, info, debug.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub commands: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Check(check::CheckArgs),
    Sections(sections::SectionsArgs),
    Maintenance(maintenance::MaintenanceArgs),
    Config(config::ShowConfigArgs),
    Logout(logout::LogoutArgs),
}

impl App {
    pub async fn run(&self) -> Result<()> {
        match &self.commands {
            Commands::Check(args) => args.run().await,
            Commands::Sections(args) => args.run().await,
            Commands::Maintenance(args) => args.run().await,
            Commands::Config(args) => args.run().await,
            Commands::Logout(args) => args.run().await,
        }
    }
}

#[async_trait]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

/// Config location flags shared by every subcommand.
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration directory.
    #[arg(long)]
    pub config_dir: Option<String>,

    /// Data directory holding the persisted client state.
    #[arg(long)]
    pub data_dir: Option<String>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(self.config_dir.clone(), self.data_dir.clone())
    }
}
