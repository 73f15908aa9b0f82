// ABOUTME: Deployment descriptor types and the pure composition step.
// ABOUTME: The serialized shape is a bit-exact contract shared with re-deploy tooling.

use std::collections::BTreeMap;
use std::fmt;

use nonempty::NonEmpty;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::Secrets;
use crate::types::{ContainerLabel, PublishedImage};

/// Port the web container listens on; the public endpoint fronts it.
pub const WEB_PORT: u16 = 8000;

/// Default health check for the public endpoint.
pub const HEALTH_CHECK_PATH: &str = "/api/start";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("health check interval ({interval}s) must exceed timeout ({timeout}s)")]
    IntervalNotAboveTimeout { interval: u32, timeout: u32 },

    #[error("invalid success-code spec: {0}")]
    InvalidSuccessCodes(String),

    #[error("public endpoint references unknown container: {0}")]
    UnknownEndpointContainer(String),

    #[error("expected the {expected} image, got {got}")]
    LabelMismatch {
        expected: ContainerLabel,
        got: ContainerLabel,
    },
}

/// Inclusive HTTP status-code range; a single code is a degenerate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRange {
    lo: u16,
    hi: u16,
}

impl StatusRange {
    fn parse(spec: &str) -> Result<Self, ComposeError> {
        let invalid = || ComposeError::InvalidSuccessCodes(spec.to_string());

        let (lo, hi) = match spec.split_once('-') {
            Some((lo, hi)) => (
                lo.parse().map_err(|_| invalid())?,
                hi.parse().map_err(|_| invalid())?,
            ),
            None => {
                let code: u16 = spec.parse().map_err(|_| invalid())?;
                (code, code)
            }
        };
        if lo > hi {
            return Err(invalid());
        }
        Ok(Self { lo, hi })
    }

    pub fn contains(self, code: u16) -> bool {
        (self.lo..=self.hi).contains(&code)
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{}", self.lo)
        } else {
            write!(f, "{}-{}", self.lo, self.hi)
        }
    }
}

/// Non-empty set of accepted status-code ranges, rendered on the wire as a
/// comma-joined string like `200-299,202`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessCodes(NonEmpty<StatusRange>);

impl SuccessCodes {
    pub fn parse(spec: &str) -> Result<Self, ComposeError> {
        let mut ranges = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(ComposeError::InvalidSuccessCodes(spec.to_string()));
            }
            ranges.push(StatusRange::parse(part)?);
        }
        NonEmpty::from_vec(ranges)
            .map(Self)
            .ok_or_else(|| ComposeError::InvalidSuccessCodes(spec.to_string()))
    }

    pub fn contains(&self, code: u16) -> bool {
        self.0.iter().any(|r| r.contains(code))
    }
}

impl fmt::Display for SuccessCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(","))
    }
}

impl Serialize for SuccessCodes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SuccessCodes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spec = String::deserialize(deserializer)?;
        SuccessCodes::parse(&spec).map_err(serde::de::Error::custom)
    }
}

/// Liveness contract for the public endpoint. The interval must exceed the
/// timeout so probes never overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckSpec {
    pub path: String,
    #[serde(rename = "intervalSeconds")]
    pub interval_seconds: u32,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: u32,
    #[serde(rename = "successCodes")]
    pub success_codes: SuccessCodes,
}

impl HealthCheckSpec {
    pub fn new(
        path: impl Into<String>,
        interval_seconds: u32,
        timeout_seconds: u32,
        success_codes: SuccessCodes,
    ) -> Result<Self, ComposeError> {
        if interval_seconds <= timeout_seconds {
            return Err(ComposeError::IntervalNotAboveTimeout {
                interval: interval_seconds,
                timeout: timeout_seconds,
            });
        }
        Ok(Self {
            path: path.into(),
            interval_seconds,
            timeout_seconds,
            success_codes,
        })
    }

    /// The stock health check: `/api/start`, 30s interval, 5s timeout,
    /// accepting `200-299,202`.
    pub fn standard() -> Self {
        Self {
            path: HEALTH_CHECK_PATH.to_string(),
            interval_seconds: 30,
            timeout_seconds: 5,
            success_codes: SuccessCodes(NonEmpty {
                head: StatusRange { lo: 200, hi: 299 },
                tail: vec![StatusRange { lo: 202, hi: 202 }],
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "HTTPS")]
    Https,
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
}

/// One container entry: published image, exposed ports, environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub image: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ports: BTreeMap<String, Protocol>,
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicEndpointSpec {
    #[serde(rename = "containerName")]
    pub container_name: String,
    #[serde(rename = "containerPort")]
    pub container_port: u16,
    #[serde(rename = "healthCheck")]
    pub health_check: HealthCheckSpec,
}

/// Desired running configuration submitted to the hosting platform. Built
/// fresh each run from just-resolved references; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentDescriptor {
    pub containers: BTreeMap<String, ContainerSpec>,
    #[serde(rename = "publicEndpoint")]
    pub public_endpoint: PublicEndpointSpec,
}

/// Pure composition of the deployment descriptor. No remote calls. Both
/// containers receive the identical secret set; the public endpoint always
/// fronts the web container on its configured port.
pub fn compose(
    web: &PublishedImage,
    worker: &PublishedImage,
    secrets: &Secrets,
    health_check: HealthCheckSpec,
) -> Result<DeploymentDescriptor, ComposeError> {
    expect_label(web, ContainerLabel::Web)?;
    expect_label(worker, ContainerLabel::Worker)?;

    let environment = secrets.as_map().clone();

    let mut containers = BTreeMap::new();
    containers.insert(
        ContainerLabel::Web.as_str().to_string(),
        ContainerSpec {
            image: web.reference().to_string(),
            ports: BTreeMap::from([(WEB_PORT.to_string(), Protocol::Http)]),
            environment: environment.clone(),
        },
    );
    containers.insert(
        ContainerLabel::Worker.as_str().to_string(),
        ContainerSpec {
            image: worker.reference().to_string(),
            ports: BTreeMap::new(),
            environment,
        },
    );

    let descriptor = DeploymentDescriptor {
        containers,
        public_endpoint: PublicEndpointSpec {
            container_name: ContainerLabel::Web.as_str().to_string(),
            container_port: WEB_PORT,
            health_check,
        },
    };

    // Contract check; cannot fire with the fixed wiring above.
    let endpoint = &descriptor.public_endpoint.container_name;
    if !descriptor.containers.contains_key(endpoint) {
        return Err(ComposeError::UnknownEndpointContainer(endpoint.clone()));
    }
    Ok(descriptor)
}

fn expect_label(image: &PublishedImage, expected: ContainerLabel) -> Result<(), ComposeError> {
    if image.label() != expected {
        return Err(ComposeError::LabelMismatch {
            expected,
            got: image.label(),
        });
    }
    Ok(())
}
