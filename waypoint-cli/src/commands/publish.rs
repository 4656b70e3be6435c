//! Publish command
//!
//! Runs inside a deployment job. The build and stage identity come from the
//! variables the agent exports, so a pipeline step only needs the token and
//! the extension settings.

use anyhow::Result;
use clap::Args;
use colored::*;
use tracing::{debug, warn};
use waypoint_client::{DocumentStore, InMemoryDocumentStore};
use waypoint_metadata::{MetadataError, MetadataWriter, PublishContext, PublishOutcome};

use crate::config::Config;

/// Arguments of `waypoint publish`
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Project id
    #[arg(long, env = "SYSTEM_TEAMPROJECTID")]
    project_id: String,

    /// Pipeline definition id
    #[arg(long, env = "SYSTEM_DEFINITIONID")]
    definition_id: u32,

    /// Build id
    #[arg(long, env = "BUILD_BUILDID")]
    build_id: u64,

    /// Build number (e.g., "20240501.2")
    #[arg(long, env = "BUILD_BUILDNUMBER")]
    build_number: String,

    /// Stage name, only used in logs
    #[arg(long, env = "SYSTEM_STAGENAME")]
    stage_name: String,

    /// Environment the stage deploys to; nothing is written without it
    #[arg(long, env = "ENVIRONMENT_ID")]
    environment_id: Option<u32>,

    /// Resource within the environment
    #[arg(long, env = "ENVIRONMENT_RESOURCEID")]
    resource_id: Option<u32>,

    /// Write to a process-local store instead of the extension data service
    #[arg(long)]
    dry_run: bool,
}

impl PublishArgs {
    fn context(&self) -> PublishContext {
        PublishContext {
            project_id: self.project_id.clone(),
            definition_id: self.definition_id,
            build_id: self.build_id,
            build_number: self.build_number.clone(),
            stage_name: self.stage_name.clone(),
            environment_id: self.environment_id,
            resource_id: self.resource_id,
        }
    }
}

/// Handle `waypoint publish`
pub async fn handle_publish(args: PublishArgs, config: &Config) -> Result<()> {
    let context = args.context();
    debug!("Publish context: {:?} (dry run: {})", context, args.dry_run);

    let outcome = if args.dry_run {
        publish(InMemoryDocumentStore::new(), &context).await?
    } else {
        publish(config.store()?, &context).await?
    };

    print_outcome(&context, &outcome, args.dry_run);

    Ok(())
}

async fn publish<S: DocumentStore>(store: S, context: &PublishContext) -> Result<PublishOutcome> {
    MetadataWriter::new(store)
        .publish(context)
        .await
        .map_err(|e| publish_error(e, context))
}

fn publish_error(error: MetadataError, context: &PublishContext) -> anyhow::Error {
    let message = format!(
        "Failed to publish build {} of pipeline {} for stage '{}'",
        context.build_number, context.definition_id, context.stage_name
    );
    if error.is_conflict() {
        warn!("Another stage kept updating the same environment; re-run this stage to record its build");
        anyhow::Error::new(error).context(format!("{} (concurrent update, re-run the stage)", message))
    } else {
        anyhow::Error::new(error).context(message)
    }
}

fn print_outcome(context: &PublishContext, outcome: &PublishOutcome, dry_run: bool) {
    match outcome {
        PublishOutcome::Skipped => {
            println!(
                "{}",
                format!(
                    "Stage '{}' does not target an environment, nothing published.",
                    context.stage_name
                )
                .yellow()
            );
        }
        PublishOutcome::Published(document) => {
            let heading = if dry_run {
                "✓ Build recorded (dry run, nothing was sent)"
            } else {
                "✓ Build recorded successfully!"
            };
            println!("{}", heading.green().bold());
            println!("  Environment:  {}", document.id.cyan());
            println!("  Build:        {}", document.build_number.bold());
            println!("  Build ID:     {}", document.build_id.to_string().dimmed());
            if let Some(resource_id) = document.resource_id {
                println!("  Resource ID:  {}", resource_id.to_string().dimmed());
            }
            if let Some(etag) = document.etag {
                println!("  Version:      {}", etag.to_string().dimmed());
            }
        }
    }
}
