// ABOUTME: Infrastructure provisioner: one reconcile path for create and update.
// ABOUTME: Validates the stack template, submits declaratively, polls readiness.

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::config::DeploymentTarget;
use crate::diagnostics::{Diagnostics, Warning};
use crate::platform::{PlatformError, ServiceState, StackOps};
use crate::types::ServiceName;

/// Declarative infrastructure templates this orchestrator knows how to
/// submit. Each template names the parameters it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackTemplate {
    ContainerService,
}

impl StackTemplate {
    pub fn id(self) -> &'static str {
        match self {
            StackTemplate::ContainerService => "container-service",
        }
    }

    pub fn required_parameters(self) -> &'static [&'static str] {
        match self {
            StackTemplate::ContainerService => &["power", "scale"],
        }
    }
}

/// Infrastructure template plus resolved parameters and tags. Created per
/// run and discarded once the stack reaches a ready state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDescriptor {
    pub service: ServiceName,
    pub template: StackTemplate,
    pub parameters: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

impl StackDescriptor {
    pub fn for_target(target: &DeploymentTarget) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("power".to_string(), target.power.as_str().to_string());
        parameters.insert("scale".to_string(), target.scale.to_string());

        let mut tags = BTreeMap::new();
        tags.insert("environment".to_string(), target.environment.clone());
        tags.insert("managed-by".to_string(), "caravel".to_string());

        Self {
            service: target.service.clone(),
            template: StackTemplate::ContainerService,
            parameters,
            tags,
        }
    }

    /// Check the parameters against the template before any submission.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        for name in self.template.required_parameters() {
            let present = self
                .parameters
                .get(*name)
                .is_some_and(|v| !v.is_empty());
            if !present {
                return Err(ProvisionError::TemplateInvalid {
                    template: self.template.id(),
                    parameter: (*name).to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("template `{template}` invalid: missing parameter `{parameter}`")]
    TemplateInvalid {
        template: &'static str,
        parameter: String,
    },

    #[error("stack submission rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Ensures the hosting service exists and observes it reaching readiness.
///
/// Readiness-poll exhaustion is a warning, not an error: descriptor
/// submission re-checks readiness implicitly through its own platform calls.
pub struct Provisioner<'a, P: StackOps> {
    platform: &'a P,
    interval: Duration,
    budget: u32,
}

impl<'a, P: StackOps> Provisioner<'a, P> {
    pub fn new(platform: &'a P, interval: Duration, budget: u32) -> Self {
        Self {
            platform,
            interval,
            budget,
        }
    }

    /// Single create-or-update path: validate, submit declaratively, poll.
    /// On return the service exists; the returned state is the last one
    /// observed and may not be ready (see `Diagnostics`).
    pub async fn reconcile(
        &self,
        stack: &StackDescriptor,
        diagnostics: &mut Diagnostics,
    ) -> Result<ServiceState, ProvisionError> {
        stack.validate()?;

        // Absence is the create trigger, not an error.
        let exists = self.platform.stack_exists(&stack.service).await?;
        info!(
            service = %stack.service,
            template = stack.template.id(),
            exists,
            "submitting stack"
        );

        // Only an explicit platform refusal is a rejection; spawn and
        // transport failures stay platform errors.
        self.platform.submit_stack(stack).await.map_err(|e| match e {
            e @ PlatformError::CommandFailed { .. } => ProvisionError::Rejected(e.to_string()),
            other => ProvisionError::Platform(other),
        })?;

        let mut last = ServiceState::new("UNKNOWN");
        for attempt in 1..=self.budget {
            last = self.platform.service_state(&stack.service).await?;
            info!(attempt, state = last.as_str(), "service state");
            if last.is_ready() {
                return Ok(last);
            }
            if attempt < self.budget {
                tokio::time::sleep(self.interval).await;
            }
        }

        diagnostics.warn(Warning::ready_timeout(format!(
            "service {} still {} after {} attempts; continuing",
            stack.service,
            last.as_str(),
            self.budget
        )));
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PowerTier;

    fn target() -> DeploymentTarget {
        DeploymentTarget {
            service: ServiceName::new("app").unwrap(),
            environment: "production".to_string(),
            region: "us-east-1".to_string(),
            power: PowerTier::Micro,
            scale: 1,
        }
    }

    #[test]
    fn descriptor_carries_template_parameters() {
        let stack = StackDescriptor::for_target(&target());
        assert_eq!(stack.parameters.get("power").map(String::as_str), Some("micro"));
        assert_eq!(stack.parameters.get("scale").map(String::as_str), Some("1"));
        assert!(stack.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_parameter() {
        let mut stack = StackDescriptor::for_target(&target());
        stack.parameters.remove("power");

        let err = stack.validate().unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::TemplateInvalid { parameter, .. } if parameter == "power"
        ));
    }

    #[test]
    fn validate_rejects_empty_parameter() {
        let mut stack = StackDescriptor::for_target(&target());
        stack.parameters.insert("scale".to_string(), String::new());
        assert!(stack.validate().is_err());
    }
}
