// ABOUTME: Convergence poller over deployment state, driven by a pure transition fn.
// ABOUTME: Terminal states are RUNNING and FAILED; everything else is still converging.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::descriptor::DeploymentDescriptor;
use crate::platform::{PlatformError, RolloutOps};
use crate::types::ServiceName;

pub const STATE_RUNNING: &str = "RUNNING";
pub const STATE_FAILED: &str = "FAILED";

/// Classified deployment state. Only the two terminal values matter; any
/// other raw state is carried verbatim as "still converging".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloutState {
    Running,
    Failed,
    Converging(String),
}

impl RolloutState {
    pub fn classify(raw: &str) -> Self {
        match raw {
            STATE_RUNNING => RolloutState::Running,
            STATE_FAILED => RolloutState::Failed,
            other => RolloutState::Converging(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RolloutState::Running => STATE_RUNNING,
            RolloutState::Failed => STATE_FAILED,
            RolloutState::Converging(raw) => raw,
        }
    }
}

/// Decision after one observation. Pure so the state machine is testable
/// without real delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Succeed,
    Fail,
    Continue,
    TimeOut,
}

/// Transition function for attempt `attempt` of `budget`. Terminal states
/// win over the budget: a failure on attempt k never waits out the rest.
pub fn advance(attempt: u32, budget: u32, observed: &RolloutState) -> Step {
    match observed {
        RolloutState::Running => Step::Succeed,
        RolloutState::Failed => Step::Fail,
        RolloutState::Converging(_) => {
            if attempt >= budget {
                Step::TimeOut
            } else {
                Step::Continue
            }
        }
    }
}

/// One polled snapshot during rollout. Ephemeral; lives only inside the
/// poller and its logs.
#[derive(Debug, Clone)]
pub struct ConvergenceAttempt {
    pub index: u32,
    pub observed: RolloutState,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ConvergeError {
    #[error("deployment failed (state {state}); run `{diagnostic}` for logs")]
    DeploymentFailed { state: String, diagnostic: String },

    #[error(
        "deployment did not reach a terminal state within {attempts} attempts; run `{diagnostic}` to inspect"
    )]
    Timeout { attempts: u32, diagnostic: String },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Submits the descriptor and polls on a fixed interval until a terminal
/// state or the attempt budget. No rollback on failure: the platform's
/// prior running revision keeps serving traffic.
pub struct Poller<'a, P: RolloutOps> {
    platform: &'a P,
    interval: Duration,
    budget: u32,
}

impl<'a, P: RolloutOps> Poller<'a, P> {
    pub fn new(platform: &'a P, interval: Duration, budget: u32) -> Self {
        Self {
            platform,
            interval,
            budget,
        }
    }

    pub async fn submit_and_wait(
        &self,
        service: &ServiceName,
        region: &str,
        descriptor: &DeploymentDescriptor,
    ) -> Result<(), ConvergeError> {
        self.platform.submit_deployment(service, descriptor).await?;
        info!(%service, "deployment submitted");

        for attempt in 1..=self.budget {
            let raw = self
                .platform
                .deployment_state(service)
                .await?
                .unwrap_or_else(|| "UNKNOWN".to_string());

            let snapshot = ConvergenceAttempt {
                index: attempt,
                observed: RolloutState::classify(&raw),
                at: Utc::now(),
            };
            info!(
                attempt = snapshot.index,
                state = snapshot.observed.as_str(),
                "deployment state"
            );

            match advance(attempt, self.budget, &snapshot.observed) {
                Step::Succeed => return Ok(()),
                Step::Fail => {
                    return Err(ConvergeError::DeploymentFailed {
                        state: raw,
                        diagnostic: log_command(service, region),
                    });
                }
                Step::Continue => tokio::time::sleep(self.interval).await,
                Step::TimeOut => break,
            }
        }

        Err(ConvergeError::Timeout {
            attempts: self.budget,
            diagnostic: deployments_command(service, region),
        })
    }
}

/// Command the operator can run to fetch container logs.
pub fn log_command(service: &ServiceName, region: &str) -> String {
    format!(
        "aws lightsail get-container-log --service-name {service} --container-name web --region {region}"
    )
}

/// Command the operator can run to inspect deployment history.
pub fn deployments_command(service: &ServiceName, region: &str) -> String {
    format!(
        "aws lightsail get-container-service-deployments --service-name {service} --region {region}"
    )
}
