// ABOUTME: Composable capability traits for the hosting platform and local builder.
// ABOUTME: Defines StackOps, RegistryOps, RolloutOps, EndpointProbe, BuildOps.

mod aws;
mod docker;
mod error;
mod types;

pub use aws::AwsCli;
pub use docker::DockerCli;
pub use error::{PlatformError, PlatformErrorKind};
pub use types::{READY_STATES, RegistryImage, ServiceState};

use std::path::Path;

use async_trait::async_trait;

use crate::descriptor::DeploymentDescriptor;
use crate::provision::StackDescriptor;
use crate::types::{ContainerLabel, ServiceName};

/// Infrastructure operations: existence, declarative submission, state.
#[async_trait]
pub trait StackOps: Send + Sync {
    /// Whether the named service already exists. Absence is not an error.
    async fn stack_exists(&self, service: &ServiceName) -> Result<bool, PlatformError>;

    /// Declarative, convergent submission: the platform applies whatever
    /// change the descriptor implies; resubmitting an unchanged descriptor
    /// is a no-op.
    async fn submit_stack(&self, stack: &StackDescriptor) -> Result<(), PlatformError>;

    /// Current raw state of the hosting service.
    async fn service_state(&self, service: &ServiceName) -> Result<ServiceState, PlatformError>;
}

/// Image registry operations scoped to one service.
#[async_trait]
pub trait RegistryOps: Send + Sync {
    /// Push a locally built image under a stable label. The canonical
    /// reference is not returned here; resolve it via `registry_images`.
    async fn push_image(
        &self,
        service: &ServiceName,
        label: ContainerLabel,
        local_tag: &str,
    ) -> Result<(), PlatformError>;

    /// All registry entries for the service, newest first or not; callers
    /// order by `created_at`.
    async fn registry_images(
        &self,
        service: &ServiceName,
    ) -> Result<Vec<RegistryImage>, PlatformError>;
}

/// Deployment submission and status polling.
#[async_trait]
pub trait RolloutOps: Send + Sync {
    async fn submit_deployment(
        &self,
        service: &ServiceName,
        descriptor: &DeploymentDescriptor,
    ) -> Result<(), PlatformError>;

    /// Raw state of the most recent deployment, `None` when the service has
    /// never been deployed.
    async fn deployment_state(
        &self,
        service: &ServiceName,
    ) -> Result<Option<String>, PlatformError>;

    /// Public HTTPS endpoint of the service, once assigned.
    async fn public_url(&self, service: &ServiceName) -> Result<Option<String>, PlatformError>;
}

/// One-shot HTTP probe of a public endpoint, returning the status code.
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<u16, PlatformError>;
}

/// Local image build and runtime reachability.
#[async_trait]
pub trait BuildOps: Send + Sync {
    /// Liveness of the local container runtime.
    async fn ping(&self) -> Result<(), PlatformError>;

    /// Build `tag` from the given build context directory.
    async fn build_image(&self, context: &Path, tag: &str) -> Result<(), PlatformError>;

    /// Whether the tag exists in the local image store.
    async fn image_exists(&self, tag: &str) -> Result<bool, PlatformError>;
}
