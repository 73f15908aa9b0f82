// ABOUTME: Local image builder backed by the docker CLI and daemon socket.
// ABOUTME: Builds via subprocess (BuildKit), verifies via the bollard API.

use std::path::Path;

use async_trait::async_trait;
use bollard::Docker;
use tokio::process::Command;
use tracing::debug;

use super::BuildOps;
use super::error::PlatformError;

/// Local container runtime client. Image builds shell out to `docker build`
/// (the registry push tooling requires the docker binary anyway); inspection
/// and liveness go through the daemon API.
pub struct DockerCli {
    client: Docker,
}

impl DockerCli {
    pub fn connect() -> Result<Self, PlatformError> {
        let client =
            Docker::connect_with_local_defaults().map_err(|e| PlatformError::Runtime {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BuildOps for DockerCli {
    async fn ping(&self) -> Result<(), PlatformError> {
        self.client
            .ping()
            .await
            .map_err(|e| PlatformError::Runtime {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn build_image(&self, context: &Path, tag: &str) -> Result<(), PlatformError> {
        let command = format!("docker build -t {tag} {}", context.display());
        debug!(%command, "building image");

        // Build output streams to the operator's terminal.
        let status = Command::new("docker")
            .arg("build")
            .arg("-t")
            .arg(tag)
            .arg(context)
            .status()
            .await
            .map_err(|source| PlatformError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PlatformError::CommandFailed {
                command,
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    async fn image_exists(&self, tag: &str) -> Result<bool, PlatformError> {
        match self.client.inspect_image(tag).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(PlatformError::Runtime {
                message: format!("failed to inspect {tag}: {e}"),
            }),
        }
    }
}
