// ABOUTME: Entry point for the caravel CLI application.
// ABOUTME: Parses arguments and dispatches to the pipeline stages.

mod cli;

use std::time::Duration;

use clap::Parser;
use cli::{Cli, Commands, PollArgs, TargetArgs};
use tracing_subscriber::EnvFilter;

use caravel::config::{DeploymentTarget, Secrets};
use caravel::error::{Error, Result};
use caravel::output::{Output, OutputMode};
use caravel::pipeline::{self, Outcome, PipelineOptions};
use caravel::platform::{AwsCli, DockerCli, RolloutOps, StackOps};
use caravel::preflight::{self, Confirm, DenyAll, PreflightError, REDEPLOY_TOOLS, StdinConfirm};
use caravel::publish::{BuildContexts, Publisher};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);
    output.start_timer();

    let non_interactive = cli.non_interactive;
    if let Err(e) = run(cli, non_interactive, &output).await {
        output.error(&format!("[{} stage] {e}", e.stage()));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, non_interactive: bool, output: &Output) -> Result<()> {
    let prompt: &dyn Confirm = if non_interactive {
        &DenyAll
    } else {
        &StdinConfirm
    };

    match cli.command {
        Commands::Deploy {
            target,
            poll,
            web_context,
            worker_context,
            no_probe,
        } => {
            let target = resolve_target(&target)?;
            let secrets = Secrets::from_env();

            let mut opts = PipelineOptions {
                contexts: BuildContexts {
                    web: web_context,
                    worker: worker_context,
                },
                probe_endpoint: !no_probe,
                ..PipelineOptions::default()
            };
            apply_poll_args(&mut opts, &poll);

            let platform = AwsCli::new(target.region.clone());
            let builder = connect_runtime()?;

            let outcome =
                pipeline::deploy(&platform, &builder, prompt, &target, secrets, &opts, output)
                    .await?;
            report(output, &target, outcome);
            Ok(())
        }
        Commands::Provision { target } => {
            let target = resolve_target(&target)?;
            preflight::check_tools(&["aws"]).map_err(Error::from)?;

            let platform = AwsCli::new(target.region.clone());
            let opts = PipelineOptions::default();
            let (state, warnings) = pipeline::provision(&platform, &target, &opts).await?;

            for warning in &warnings {
                output.warn(&warning.message);
            }
            output.success(&format!("Service {} is {}", target.service, state.as_str()));
            Ok(())
        }
        Commands::Publish {
            target,
            web_context,
            worker_context,
        } => {
            let target = resolve_target(&target)?;
            preflight::check_tools(&["aws", "docker"]).map_err(Error::from)?;

            let platform = AwsCli::new(target.region.clone());
            let builder = connect_runtime()?;
            preflight::check_runtime(&builder).await.map_err(Error::from)?;

            let contexts = BuildContexts {
                web: web_context,
                worker: worker_context,
            };
            let publisher = Publisher::new(&platform, &builder);
            let (web, worker) = publisher.publish_all(&target.service, &contexts).await?;

            output.success(&format!(
                "Published web → {} and worker → {}",
                web.reference(),
                worker.reference()
            ));
            Ok(())
        }
        Commands::Redeploy { target, poll } => {
            let target = resolve_target(&target)?;
            let secrets = Secrets::from_env();

            let mut opts = PipelineOptions {
                tools: REDEPLOY_TOOLS.iter().map(ToString::to_string).collect(),
                ..PipelineOptions::default()
            };
            apply_poll_args(&mut opts, &poll);

            let platform = AwsCli::new(target.region.clone());
            let outcome =
                pipeline::redeploy(&platform, prompt, &target, secrets, &opts, output).await?;
            report(output, &target, outcome);
            Ok(())
        }
        Commands::Status { target } => {
            let target = resolve_target(&target)?;
            preflight::check_tools(&["aws"]).map_err(Error::from)?;

            let platform = AwsCli::new(target.region.clone());
            let state = platform.service_state(&target.service).await?;
            let deployment = platform.deployment_state(&target.service).await?;
            let url = platform.public_url(&target.service).await?;

            println!("Service:    {} ({})", target.service, target.region);
            println!("State:      {}", state.as_str());
            println!(
                "Deployment: {}",
                deployment.as_deref().unwrap_or("(none yet)")
            );
            if let Some(url) = url {
                println!("URL:        {url}");
            }
            Ok(())
        }
    }
}

fn resolve_target(args: &TargetArgs) -> Result<DeploymentTarget> {
    DeploymentTarget::resolve(
        args.service.as_deref(),
        args.environment.as_deref(),
        args.region.as_deref(),
        args.power.as_deref(),
        args.scale,
    )
    .map_err(Error::from)
}

fn apply_poll_args(opts: &mut PipelineOptions, poll: &PollArgs) {
    opts.poll_budget = poll.attempts;
    opts.poll_interval = Duration::from_secs(poll.interval);
}

fn connect_runtime() -> Result<DockerCli> {
    DockerCli::connect()
        .map_err(|e| PreflightError::RuntimeUnreachable(e.to_string()))
        .map_err(Error::from)
}

fn report(output: &Output, target: &DeploymentTarget, outcome: Outcome) {
    for warning in &outcome.warnings {
        output.warn(&warning.message);
    }
    match &outcome.url {
        Some(url) => output.success(&format!("✓ Deployed {}, serving at {url}", target.service)),
        None => output.success(&format!(
            "✓ Deployed {}, public URL not assigned yet",
            target.service
        )),
    }
}
