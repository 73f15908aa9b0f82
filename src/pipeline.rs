// ABOUTME: Orchestrator controller: sequences the pipeline stages fail-fast.
// ABOUTME: Holds no state beyond the values passed forward between stages.

use std::time::Duration;

use crate::config::{DeploymentTarget, Secrets};
use crate::converge::Poller;
use crate::descriptor::{self, HealthCheckSpec};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::output::Output;
use crate::platform::{
    BuildOps, EndpointProbe, RegistryOps, RolloutOps, ServiceState, StackOps,
};
use crate::preflight::{self, Confirm, PreflightError, PreflightReport, REQUIRED_TOOLS};
use crate::provision::{Provisioner, StackDescriptor};
use crate::publish::{BuildContexts, Publisher, resolve_published};
use crate::types::ContainerLabel;

/// Tunables for one pipeline run. The attempt budgets bound both polling
/// loops; there is no retry across runs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub tools: Vec<String>,
    pub contexts: BuildContexts,
    pub health_check: HealthCheckSpec,
    pub ready_interval: Duration,
    pub ready_budget: u32,
    pub poll_interval: Duration,
    pub poll_budget: u32,
    pub probe_endpoint: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tools: REQUIRED_TOOLS.iter().map(ToString::to_string).collect(),
            contexts: BuildContexts::default(),
            health_check: HealthCheckSpec::standard(),
            ready_interval: Duration::from_secs(10),
            ready_budget: 30,
            poll_interval: Duration::from_secs(15),
            poll_budget: 20,
            probe_endpoint: true,
        }
    }
}

/// Result of a successful run: the public URL (once assigned) plus every
/// non-fatal warning collected along the way.
#[derive(Debug)]
pub struct Outcome {
    pub url: Option<String>,
    pub warnings: Vec<Warning>,
}

/// Full pipeline: preflight, provision, publish, compose, converge.
/// Any fatal error short-circuits; nothing remote happens before the
/// preflight gate passes or is explicitly overridden.
pub async fn deploy<P, B, C>(
    platform: &P,
    builder: &B,
    prompt: &C,
    target: &DeploymentTarget,
    secrets: Secrets,
    opts: &PipelineOptions,
    output: &Output,
) -> Result<Outcome>
where
    P: StackOps + RegistryOps + RolloutOps + EndpointProbe,
    B: BuildOps,
    C: Confirm + ?Sized,
{
    let mut diagnostics = Diagnostics::default();
    let mut secrets = secrets;

    output.progress("→ Running preflight checks...");
    let tools: Vec<&str> = opts.tools.iter().map(String::as_str).collect();
    let report = preflight::run_checks(builder, &tools, &secrets).await?;
    gate_secrets(report, &mut secrets, prompt, output)?;

    output.progress(&format!(
        "→ Reconciling service {} ({}, {})...",
        target.service, target.power, target.region
    ));
    let stack = StackDescriptor::for_target(target);
    let provisioner = Provisioner::new(platform, opts.ready_interval, opts.ready_budget);
    let state = provisioner.reconcile(&stack, &mut diagnostics).await?;
    output.progress(&format!("  service is {}", state.as_str()));

    output.progress("→ Publishing container images...");
    let publisher = Publisher::new(platform, builder);
    let (web, worker) = publisher.publish_all(&target.service, &opts.contexts).await?;
    output.progress(&format!(
        "  web    → {}\n  worker → {}",
        web.reference(),
        worker.reference()
    ));

    let descriptor = descriptor::compose(&web, &worker, &secrets, opts.health_check.clone())?;

    output.progress("→ Submitting deployment and waiting for convergence...");
    let poller = Poller::new(platform, opts.poll_interval, opts.poll_budget);
    poller
        .submit_and_wait(&target.service, &target.region, &descriptor)
        .await?;

    finish(platform, target, opts, output, diagnostics).await
}

/// Re-deploy from already-published references: compose the same bit-exact
/// descriptor and converge, without provisioning or building anything.
pub async fn redeploy<P, C>(
    platform: &P,
    prompt: &C,
    target: &DeploymentTarget,
    secrets: Secrets,
    opts: &PipelineOptions,
    output: &Output,
) -> Result<Outcome>
where
    P: RegistryOps + RolloutOps + EndpointProbe,
    C: Confirm + ?Sized,
{
    let diagnostics = Diagnostics::default();
    let mut secrets = secrets;

    let tools: Vec<&str> = opts.tools.iter().map(String::as_str).collect();
    preflight::check_tools(&tools)?;
    let report = PreflightReport {
        missing_secrets: secrets.missing(),
    };
    gate_secrets(report, &mut secrets, prompt, output)?;

    output.progress("→ Resolving published images...");
    let web = resolve_published(platform, &target.service, ContainerLabel::Web).await?;
    let worker = resolve_published(platform, &target.service, ContainerLabel::Worker).await?;

    let descriptor = descriptor::compose(&web, &worker, &secrets, opts.health_check.clone())?;

    output.progress("→ Submitting deployment and waiting for convergence...");
    let poller = Poller::new(platform, opts.poll_interval, opts.poll_budget);
    poller
        .submit_and_wait(&target.service, &target.region, &descriptor)
        .await?;

    finish(platform, target, opts, output, diagnostics).await
}

/// Provision only: reconcile the stack and report the observed state.
pub async fn provision<P: StackOps>(
    platform: &P,
    target: &DeploymentTarget,
    opts: &PipelineOptions,
) -> Result<(ServiceState, Vec<Warning>)> {
    let mut diagnostics = Diagnostics::default();
    let stack = StackDescriptor::for_target(target);
    let provisioner = Provisioner::new(platform, opts.ready_interval, opts.ready_budget);
    let state = provisioner.reconcile(&stack, &mut diagnostics).await?;
    Ok((state, diagnostics.into_warnings()))
}

fn gate_secrets<C: Confirm + ?Sized>(
    report: PreflightReport,
    secrets: &mut Secrets,
    prompt: &C,
    output: &Output,
) -> std::result::Result<(), PreflightError> {
    if report.missing_secrets.is_empty() {
        return Ok(());
    }

    for name in &report.missing_secrets {
        output.warn(&format!("required secret {name} is not set"));
    }

    if prompt.confirm("Continue with placeholder values for the missing secrets?") {
        secrets.fill_placeholders();
        Ok(())
    } else {
        Err(PreflightError::MissingSecret(
            report.missing_secrets[0].to_string(),
        ))
    }
}

/// Shared tail: look up the public URL and optionally probe it. Probe
/// failure is a warning; a freshly converged endpoint may not serve yet.
async fn finish<P: RolloutOps + EndpointProbe>(
    platform: &P,
    target: &DeploymentTarget,
    opts: &PipelineOptions,
    output: &Output,
    mut diagnostics: Diagnostics,
) -> Result<Outcome> {
    let url = match platform.public_url(&target.service).await {
        Ok(url) => url,
        Err(e) => {
            diagnostics.warn(Warning::endpoint_probe(format!(
                "could not fetch public URL: {e}"
            )));
            None
        }
    };

    if opts.probe_endpoint {
        if let Some(url) = &url {
            match platform.probe(url).await {
                Ok(code) if opts.health_check.success_codes.contains(code) => {
                    output.progress(&format!("  endpoint healthy ({code})"));
                }
                Ok(code) => diagnostics.warn(Warning::endpoint_probe(format!(
                    "endpoint {url} returned {code}"
                ))),
                Err(e) => diagnostics.warn(Warning::endpoint_probe(format!(
                    "endpoint probe failed: {e}"
                ))),
            }
        }
    }

    Ok(Outcome {
        url,
        warnings: diagnostics.into_warnings(),
    })
}
