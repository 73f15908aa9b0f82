// ABOUTME: Hosting platform adapter driving the aws CLI.
// ABOUTME: Wraps lightsail subcommands and parses their JSON output.

use std::io::Write;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::descriptor::DeploymentDescriptor;
use crate::provision::StackDescriptor;
use crate::types::{ContainerLabel, ServiceName};

use super::error::PlatformError;
use super::types::{RegistryImage, ServiceState};
use super::{EndpointProbe, RegistryOps, RolloutOps, StackOps};

/// Error substrings the platform uses to report a missing service.
const NOT_FOUND_MARKERS: &[&str] = &["NotFoundException", "DoesNotExist"];

/// Platform client invoking the `aws` CLI, pinned to one region.
pub struct AwsCli {
    region: String,
}

impl AwsCli {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Run one aws subcommand, returning stdout on success.
    async fn run(&self, args: &[&str]) -> Result<String, PlatformError> {
        let command = format!("aws {}", args.join(" "));
        debug!(%command, "invoking platform CLI");

        let output = Command::new("aws")
            .args(args)
            .args(["--region", &self.region, "--output", "json"])
            .output()
            .await
            .map_err(|source| PlatformError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PlatformError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn parse<T: serde::de::DeserializeOwned>(
        command: &str,
        stdout: &str,
    ) -> Result<T, PlatformError> {
        serde_json::from_str(stdout).map_err(|source| PlatformError::Json {
            command: command.to_string(),
            source,
        })
    }
}

fn is_not_found(err: &PlatformError) -> bool {
    match err {
        PlatformError::CommandFailed { stderr, .. } => {
            NOT_FOUND_MARKERS.iter().any(|m| stderr.contains(m))
        }
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
struct GetServicesResponse {
    #[serde(rename = "containerServices")]
    container_services: Vec<ServiceSummary>,
}

#[derive(Debug, Deserialize)]
struct ServiceSummary {
    state: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetImagesResponse {
    #[serde(rename = "containerImages")]
    container_images: Vec<ImageSummary>,
}

#[derive(Debug, Deserialize)]
struct ImageSummary {
    image: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GetDeploymentsResponse {
    deployments: Vec<DeploymentSummary>,
}

#[derive(Debug, Deserialize)]
struct DeploymentSummary {
    state: String,
}

fn first_service(command: &str, stdout: &str) -> Result<ServiceSummary, PlatformError> {
    let response: GetServicesResponse = AwsCli::parse(command, stdout)?;
    response
        .container_services
        .into_iter()
        .next()
        .ok_or_else(|| PlatformError::Malformed {
            command: command.to_string(),
            message: "no container services in response".to_string(),
        })
}

fn parse_registry_images(command: &str, stdout: &str) -> Result<Vec<RegistryImage>, PlatformError> {
    let response: GetImagesResponse = AwsCli::parse(command, stdout)?;
    Ok(response
        .container_images
        .into_iter()
        .map(|i| RegistryImage {
            reference: i.image,
            created_at: i.created_at,
        })
        .collect())
}

/// State of the newest deployment; entries are reported newest first.
fn parse_latest_deployment_state(
    command: &str,
    stdout: &str,
) -> Result<Option<String>, PlatformError> {
    let response: GetDeploymentsResponse = AwsCli::parse(command, stdout)?;
    Ok(response.deployments.into_iter().next().map(|d| d.state))
}

#[async_trait]
impl StackOps for AwsCli {
    async fn stack_exists(&self, service: &ServiceName) -> Result<bool, PlatformError> {
        let result = self
            .run(&[
                "lightsail",
                "get-container-services",
                "--service-name",
                service.as_str(),
            ])
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(ref e) if is_not_found(e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn submit_stack(&self, stack: &StackDescriptor) -> Result<(), PlatformError> {
        // The CLI splits create and update into separate verbs; both take the
        // same declarative parameter set, so the split stays inside this
        // adapter and callers see a single convergent submission.
        let exists = self.stack_exists(&stack.service).await?;
        let verb = if exists {
            "update-container-service"
        } else {
            "create-container-service"
        };

        let mut args: Vec<String> = vec![
            "lightsail".to_string(),
            verb.to_string(),
            "--service-name".to_string(),
            stack.service.to_string(),
        ];
        for (name, value) in &stack.parameters {
            args.push(format!("--{name}"));
            args.push(value.clone());
        }
        if !exists && !stack.tags.is_empty() {
            args.push("--tags".to_string());
            for (key, value) in &stack.tags {
                args.push(format!("key={key},value={value}"));
            }
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&arg_refs).await?;
        Ok(())
    }

    async fn service_state(&self, service: &ServiceName) -> Result<ServiceState, PlatformError> {
        let command = "aws lightsail get-container-services";
        let stdout = self
            .run(&[
                "lightsail",
                "get-container-services",
                "--service-name",
                service.as_str(),
            ])
            .await?;

        let summary = first_service(command, &stdout)?;
        Ok(ServiceState::new(summary.state))
    }
}

#[async_trait]
impl RegistryOps for AwsCli {
    async fn push_image(
        &self,
        service: &ServiceName,
        label: ContainerLabel,
        local_tag: &str,
    ) -> Result<(), PlatformError> {
        // Push output is human-oriented text; the canonical reference is
        // resolved separately through the registry listing.
        self.run(&[
            "lightsail",
            "push-container-image",
            "--service-name",
            service.as_str(),
            "--label",
            label.as_str(),
            "--image",
            local_tag,
        ])
        .await?;
        Ok(())
    }

    async fn registry_images(
        &self,
        service: &ServiceName,
    ) -> Result<Vec<RegistryImage>, PlatformError> {
        let command = "aws lightsail get-container-images";
        let stdout = self
            .run(&[
                "lightsail",
                "get-container-images",
                "--service-name",
                service.as_str(),
            ])
            .await?;

        parse_registry_images(command, &stdout)
    }
}

#[async_trait]
impl RolloutOps for AwsCli {
    async fn submit_deployment(
        &self,
        service: &ServiceName,
        descriptor: &DeploymentDescriptor,
    ) -> Result<(), PlatformError> {
        let command = "aws lightsail create-container-service-deployment";

        // The submission wraps the descriptor with the service name; the
        // descriptor itself stays the bit-exact contract.
        let mut payload =
            serde_json::to_value(descriptor).map_err(|source| PlatformError::Json {
                command: command.to_string(),
                source,
            })?;
        payload["serviceName"] = serde_json::Value::String(service.to_string());

        let mut file = tempfile::NamedTempFile::new()
            .map_err(|source| PlatformError::DescriptorFile { source })?;
        file.write_all(payload.to_string().as_bytes())
            .map_err(|source| PlatformError::DescriptorFile { source })?;
        file.flush()
            .map_err(|source| PlatformError::DescriptorFile { source })?;

        let input = format!("file://{}", file.path().display());
        self.run(&[
            "lightsail",
            "create-container-service-deployment",
            "--cli-input-json",
            &input,
        ])
        .await?;
        Ok(())
    }

    async fn deployment_state(
        &self,
        service: &ServiceName,
    ) -> Result<Option<String>, PlatformError> {
        let command = "aws lightsail get-container-service-deployments";
        let stdout = self
            .run(&[
                "lightsail",
                "get-container-service-deployments",
                "--service-name",
                service.as_str(),
            ])
            .await?;

        parse_latest_deployment_state(command, &stdout)
    }

    async fn public_url(&self, service: &ServiceName) -> Result<Option<String>, PlatformError> {
        let command = "aws lightsail get-container-services";
        let stdout = self
            .run(&[
                "lightsail",
                "get-container-services",
                "--service-name",
                service.as_str(),
            ])
            .await?;

        Ok(first_service(command, &stdout)?.url)
    }
}

#[async_trait]
impl EndpointProbe for AwsCli {
    async fn probe(&self, url: &str) -> Result<u16, PlatformError> {
        let command = format!("curl {url}");
        let output = Command::new("curl")
            .args(["-sS", "-o", "/dev/null", "-w", "%{http_code}", "--max-time", "10", url])
            .output()
            .await
            .map_err(|source| PlatformError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PlatformError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let code = String::from_utf8_lossy(&output.stdout);
        code.trim()
            .parse()
            .map_err(|_| PlatformError::Malformed {
                command,
                message: format!("not a status code: {code}"),
            })
    }
}
