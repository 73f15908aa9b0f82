// ABOUTME: Application-wide error type mapping each pipeline stage's failures.
// ABOUTME: Every variant is fatal; warnings travel through Diagnostics instead.

use thiserror::Error;

use crate::config::ConfigError;
use crate::converge::ConvergeError;
use crate::descriptor::ComposeError;
use crate::platform::PlatformError;
use crate::preflight::PreflightError;
use crate::provision::ProvisionError;
use crate::publish::PublishError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Converge(#[from] ConvergeError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl Error {
    /// Name of the pipeline stage that failed, for operator-facing output.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Preflight(_) => "preflight",
            Error::Provision(_) => "provision",
            Error::Publish(_) => "publish",
            Error::Compose(_) => "compose",
            Error::Converge(_) => "converge",
            Error::Platform(_) => "platform",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
