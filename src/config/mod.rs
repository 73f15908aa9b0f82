// ABOUTME: Deployment target resolution from positional arguments.
// ABOUTME: Validates service name, region, power tier, and scale up front.

mod power;
mod secrets;

pub use power::PowerTier;
pub use secrets::{PLACEHOLDER, REQUIRED_SECRETS, Secrets};

use thiserror::Error;

use crate::types::{ServiceName, ServiceNameError};

pub const DEFAULT_SERVICE: &str = "app";
pub const DEFAULT_ENVIRONMENT: &str = "production";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_POWER: &str = "micro";
pub const DEFAULT_SCALE: u32 = 1;

/// Largest node count the hosting platform accepts for one service.
pub const MAX_SCALE: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown power tier: {0}")]
    UnknownPowerTier(String),

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("invalid service name: {0}")]
    InvalidServiceName(#[from] ServiceNameError),

    #[error("scale must be between 1 and {MAX_SCALE}, got {0}")]
    InvalidScale(u32),
}

/// Identity of one deployment run. Resolved once from arguments and
/// defaults, then read-only for the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub service: ServiceName,
    pub environment: String,
    pub region: String,
    pub power: PowerTier,
    pub scale: u32,
}

impl DeploymentTarget {
    pub fn resolve(
        service: Option<&str>,
        environment: Option<&str>,
        region: Option<&str>,
        power: Option<&str>,
        scale: Option<u32>,
    ) -> Result<Self, ConfigError> {
        let service = ServiceName::new(service.unwrap_or(DEFAULT_SERVICE))?;
        let environment = environment.unwrap_or(DEFAULT_ENVIRONMENT).to_string();

        let region = region.unwrap_or(DEFAULT_REGION);
        validate_region(region)?;

        let power = PowerTier::parse(power.unwrap_or(DEFAULT_POWER))?;

        let scale = scale.unwrap_or(DEFAULT_SCALE);
        if scale == 0 || scale > MAX_SCALE {
            return Err(ConfigError::InvalidScale(scale));
        }

        Ok(Self {
            service,
            environment,
            region: region.to_string(),
            power,
            scale,
        })
    }
}

/// Syntactic region check: lowercase segments joined by hyphens with a
/// trailing numeric suffix, e.g. `us-east-1`.
fn validate_region(region: &str) -> Result<(), ConfigError> {
    let segments: Vec<&str> = region.split('-').collect();

    let well_formed = segments.len() >= 3
        && segments[..segments.len() - 1]
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase()))
        && segments
            .last()
            .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()));

    if well_formed {
        Ok(())
    } else {
        Err(ConfigError::InvalidRegion(region.to_string()))
    }
}
