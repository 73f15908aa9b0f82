// ABOUTME: Preflight validator: tools, runtime reachability, secret presence.
// ABOUTME: The only gate where operator confirmation can unblock a later step.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::config::Secrets;
use crate::platform::{BuildOps, PlatformError};

/// External binaries the full pipeline shells out to.
pub const REQUIRED_TOOLS: &[&str] = &["aws", "docker", "curl"];

/// Tools a re-deploy needs; no local image work is involved.
pub const REDEPLOY_TOOLS: &[&str] = &["aws", "curl"];

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("required tool not found on PATH: {0}")]
    MissingTool(String),

    #[error("container runtime unreachable: {0}")]
    RuntimeUnreachable(String),

    #[error("missing required secret: {0}")]
    MissingSecret(String),
}

/// Outcome of the checks that passed; missing secrets are reported rather
/// than raised so the caller can offer the placeholder override.
#[derive(Debug)]
pub struct PreflightReport {
    pub missing_secrets: Vec<&'static str>,
}

/// Locate a binary on the execution PATH.
pub fn find_tool(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

pub fn check_tools(tools: &[&str]) -> Result<(), PreflightError> {
    for tool in tools {
        if find_tool(tool).is_none() {
            return Err(PreflightError::MissingTool((*tool).to_string()));
        }
    }
    Ok(())
}

pub async fn check_runtime<B: BuildOps>(builder: &B) -> Result<(), PreflightError> {
    builder
        .ping()
        .await
        .map_err(|e: PlatformError| PreflightError::RuntimeUnreachable(e.to_string()))
}

/// Run every check. Missing tools and an unreachable runtime are hard
/// failures; missing secrets come back in the report for the operator gate.
pub async fn run_checks<B: BuildOps>(
    builder: &B,
    tools: &[&str],
    secrets: &Secrets,
) -> Result<PreflightReport, PreflightError> {
    check_tools(tools)?;
    check_runtime(builder).await?;
    Ok(PreflightReport {
        missing_secrets: secrets.missing(),
    })
}

/// Operator confirmation seam. The pipeline asks exactly once, before any
/// irreversible remote call.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive confirmation on stdin.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Refuses every prompt; used with `--non-interactive`.
pub struct DenyAll;

impl Confirm for DenyAll {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
