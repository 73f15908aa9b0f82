// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "caravel")]
#[command(about = "Deployment orchestrator for managed container services")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output (CI mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// JSON lines output
    #[arg(long, global = true)]
    pub json: bool,

    /// Never prompt; missing secrets become fatal
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Target selection shared by every subcommand. All values are optional
/// and fall back to documented defaults.
#[derive(Args)]
pub struct TargetArgs {
    /// Service name (default: app)
    pub service: Option<String>,

    /// Platform region (default: us-east-1)
    pub region: Option<String>,

    /// Power tier: nano|micro|small|medium|large|xlarge (default: micro)
    pub power: Option<String>,

    /// Deployment environment tag (default: production)
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Node count (default: 1)
    #[arg(long)]
    pub scale: Option<u32>,
}

/// Polling knobs shared by the converging subcommands.
#[derive(Args)]
pub struct PollArgs {
    /// Maximum state-poll attempts before giving up
    #[arg(long, default_value_t = 20)]
    pub attempts: u32,

    /// Seconds between state polls
    #[arg(long, default_value_t = 15)]
    pub interval: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision, publish both images, and roll out the full service
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        poll: PollArgs,

        /// Build context for the web image
        #[arg(long, default_value = "web")]
        web_context: PathBuf,

        /// Build context for the worker image
        #[arg(long, default_value = "worker")]
        worker_context: PathBuf,

        /// Skip the post-rollout endpoint probe
        #[arg(long)]
        no_probe: bool,
    },

    /// Ensure the hosting service exists and is ready
    Provision {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Build and publish the two container images
    Publish {
        #[command(flatten)]
        target: TargetArgs,

        /// Build context for the web image
        #[arg(long, default_value = "web")]
        web_context: PathBuf,

        /// Build context for the worker image
        #[arg(long, default_value = "worker")]
        worker_context: PathBuf,
    },

    /// Re-deploy from the most recently published images
    Redeploy {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Show service and latest deployment state
    Status {
        #[command(flatten)]
        target: TargetArgs,
    },
}
