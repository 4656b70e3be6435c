//! Waypoint CLI
//!
//! Records which build each pipeline deployed to each environment, and shows
//! the resulting version matrix.
//!
//! `publish` is meant to run as a step of a deployment job: everything it
//! needs is read from the variables the agent exports. `versions` runs
//! anywhere with a token that can read the store.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Pipeline version tracking across environments", long_about = None)]
struct Cli {
    /// Organization URL
    #[arg(long, env = "SYSTEM_COLLECTIONURI")]
    org_url: String,

    /// Bearer token (System.AccessToken or a personal access token)
    #[arg(long, env = "SYSTEM_ACCESSTOKEN", hide_env_values = true)]
    token: String,

    /// Extension data service URL; derived from the organization URL when unset
    #[arg(long, env = "WAYPOINT_STORE_URL")]
    store_url: Option<String>,

    /// Publisher of the extension whose document store holds the metadata
    #[arg(long, env = "WAYPOINT_PUBLISHER")]
    publisher: String,

    /// Id of the extension whose document store holds the metadata
    #[arg(long, env = "WAYPOINT_EXTENSION_ID", default_value = "waypoint")]
    extension_id: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the table on stdout stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waypoint=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        organization_url: cli.org_url,
        token: cli.token,
        store_url: cli.store_url,
        publisher: cli.publisher,
        extension_id: cli.extension_id,
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
