//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod publish;
mod versions;

pub use publish::PublishArgs;
pub use versions::VersionsArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Record the running build against the stage's environment
    Publish(PublishArgs),
    /// Show the latest build of every pipeline in every environment
    Versions(VersionsArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Publish(args) => publish::handle_publish(args, config).await,
        Commands::Versions(args) => versions::handle_versions(args, config).await,
    }
}
