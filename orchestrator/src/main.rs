//! `build-indexes` binary
//!
//! Resolves credentials from the environment, wires the real gateway into the
//! orchestrator and prints progress lines as they arrive.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::signal;

use gateway::{RealIndexGateway, Settings};
use orchestrator::{
    BuildIndexRequest, BuildOrchestrator, BuildOutcome, Cancellation, ProgressReporter,
    WorkflowConfig,
};
use shared::logging;

const COMPONENT: &str = "build-indexes";

/// Build deferred indexes on a Capella cluster
#[derive(Parser, Debug)]
#[command(name = "build-indexes")]
#[command(about = "Builds deferred Capella indexes once they are ready")]
pub struct Args {
    #[arg(long)]
    pub organization_id: String,

    #[arg(long)]
    pub project_id: String,

    #[arg(long)]
    pub cluster_id: String,

    #[arg(long)]
    pub bucket: String,

    /// Scope name (defaults to `_default`)
    #[arg(long)]
    pub scope: Option<String>,

    /// Collection name (defaults to `_default`)
    #[arg(long)]
    pub collection: Option<String>,

    /// Index to build; repeat for several indexes
    #[arg(long = "index", required = true)]
    pub indexes: Vec<String>,

    /// API host, overrides CAPELLA_HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Abort the whole invocation after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Delay between re-polls of an index scheduled for creation
    #[arg(long, default_value = "5000")]
    pub poll_interval_ms: u64,

    /// Give up waiting on a scheduled index after this many seconds
    #[arg(long, default_value = "600")]
    pub max_wait_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Args {
    fn request(&self) -> BuildIndexRequest {
        let mut request = BuildIndexRequest::new(
            &self.organization_id,
            &self.project_id,
            &self.cluster_id,
            &self.bucket,
        )
        .with_indexes(self.indexes.iter().cloned());
        request.scope_name = self.scope.clone();
        request.collection_name = self.collection.clone();
        request
    }

    fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing_with_level(Some(&args.log_level));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logging::log_error(COMPONENT, "Index build", &format!("{err:#}"));
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    logging::log_startup(COMPONENT, "deferred index build");

    let mut settings = Settings::from_env().context("failed to load Capella settings")?;
    if let Some(host) = &args.host {
        settings.host = host.clone();
    }
    let config = settings
        .into_config()
        .context("invalid gateway configuration")?;
    let gateway = RealIndexGateway::new(config).context("failed to create index gateway")?;
    let orchestrator = BuildOrchestrator::new(gateway, args.workflow_config());

    let (cancel_handle, mut cancel) = Cancellation::new();
    if let Some(secs) = args.timeout_secs {
        cancel = cancel.with_deadline(Duration::from_secs(secs));
    }
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Received Ctrl+C, cancelling");
                cancel_handle.cancel();
            }
            Err(err) => logging::log_error(COMPONENT, "Signal handling", &err),
        }
    });

    let (progress, mut events) = ProgressReporter::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            eprintln!("{event}");
        }
    });

    let result = orchestrator.run(args.request(), &progress, &cancel).await;
    // Close the channel so the printer drains and exits
    drop(progress);
    let _ = printer.await;

    let outcome = result.context("index build workflow failed")?;
    logging::log_progress(
        COMPONENT,
        "Build",
        &format!("{} submitted, {} skipped", outcome.built.len(), outcome.skipped.len()),
    );
    print_outcome(&outcome, args.json)?;
    logging::log_success(COMPONENT, "Index build workflow finished");
    Ok(())
}

fn print_outcome(outcome: &BuildOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(outcome).context("failed to render outcome")?;
        println!("{rendered}");
        return Ok(());
    }

    if outcome.nothing_to_build() {
        println!("No indexes submitted for build");
    } else {
        println!("Submitted for build: {}", outcome.built.join(", "));
    }
    for skipped in &outcome.skipped {
        println!("Skipped {} ({})", skipped.name, skipped.status);
    }
    Ok(())
}
