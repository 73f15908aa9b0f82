// ABOUTME: Power tier of the hosted container service.
// ABOUTME: Parses the platform's fixed tier names, rejecting unknown values.

use std::fmt;

/// Compute tier allocated to each service node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTier {
    Nano,
    Micro,
    Small,
    Medium,
    Large,
    Xlarge,
}

impl PowerTier {
    pub fn parse(value: &str) -> Result<Self, super::ConfigError> {
        match value {
            "nano" => Ok(PowerTier::Nano),
            "micro" => Ok(PowerTier::Micro),
            "small" => Ok(PowerTier::Small),
            "medium" => Ok(PowerTier::Medium),
            "large" => Ok(PowerTier::Large),
            "xlarge" => Ok(PowerTier::Xlarge),
            other => Err(super::ConfigError::UnknownPowerTier(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerTier::Nano => "nano",
            PowerTier::Micro => "micro",
            PowerTier::Small => "small",
            PowerTier::Medium => "medium",
            PowerTier::Large => "large",
            PowerTier::Xlarge => "xlarge",
        }
    }
}

impl fmt::Display for PowerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
