// ABOUTME: In-memory platform and builder fakes with scripted states.
// ABOUTME: Record every call so tests can assert ordering and call counts.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::Mutex;

use caravel::descriptor::DeploymentDescriptor;
use caravel::platform::{
    BuildOps, EndpointProbe, PlatformError, RegistryImage, RegistryOps, RolloutOps, ServiceState,
    StackOps,
};
use caravel::provision::StackDescriptor;
use caravel::types::{ContainerLabel, ServiceName};

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    StackExists(String),
    SubmitStack(String),
    ServiceState(String),
    PushImage { service: String, label: String },
    RegistryImages(String),
    SubmitDeployment(String),
    DeploymentState(String),
    PublicUrl(String),
    Probe(String),
}

/// Scripted hosting platform: state queries pop from queues and fall back
/// to a ready/running answer once the script runs out.
pub struct FakePlatform {
    pub calls: Mutex<Vec<Call>>,
    pub submitted: Mutex<Vec<DeploymentDescriptor>>,
    pub url: Option<String>,
    pub probe_status: u16,
    pub reject_submission: bool,
    /// Make stack submission fail as if the platform CLI were not installed.
    pub submit_spawn_error: bool,
    /// Accept pushes without recording them in the registry; simulates the
    /// window where a push has not yet materialized.
    pub drop_pushes: bool,
    existing: Mutex<BTreeSet<String>>,
    created: Mutex<BTreeMap<String, u32>>,
    service_states: Mutex<VecDeque<String>>,
    deployment_states: Mutex<VecDeque<String>>,
    registry: Mutex<Vec<RegistryImage>>,
    push_counter: Mutex<i64>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            url: Some("https://app.example.test/".to_string()),
            probe_status: 200,
            reject_submission: false,
            submit_spawn_error: false,
            drop_pushes: false,
            existing: Mutex::new(BTreeSet::new()),
            created: Mutex::new(BTreeMap::new()),
            service_states: Mutex::new(VecDeque::new()),
            deployment_states: Mutex::new(VecDeque::new()),
            registry: Mutex::new(Vec::new()),
            push_counter: Mutex::new(0),
        }
    }

    /// Pretend the service already exists before the run.
    pub fn with_existing_service(self, name: &str) -> Self {
        self.existing.lock().insert(name.to_string());
        self
    }

    /// Script the next service states, oldest first.
    pub fn queue_service_states(&self, states: &[&str]) {
        self.service_states
            .lock()
            .extend(states.iter().map(ToString::to_string));
    }

    /// Script the next deployment states, oldest first.
    pub fn queue_deployment_states(&self, states: &[&str]) {
        self.deployment_states
            .lock()
            .extend(states.iter().map(ToString::to_string));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn created_count(&self, service: &str) -> u32 {
        self.created.lock().get(service).copied().unwrap_or(0)
    }

    pub fn deployment_state_queries(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::DeploymentState(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl StackOps for FakePlatform {
    async fn stack_exists(&self, service: &ServiceName) -> Result<bool, PlatformError> {
        self.record(Call::StackExists(service.to_string()));
        Ok(self.existing.lock().contains(service.as_str()))
    }

    async fn submit_stack(&self, stack: &StackDescriptor) -> Result<(), PlatformError> {
        self.record(Call::SubmitStack(stack.service.to_string()));
        if self.submit_spawn_error {
            return Err(PlatformError::Spawn {
                command: "aws lightsail create-container-service".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "No such file or directory",
                ),
            });
        }
        if self.reject_submission {
            return Err(PlatformError::CommandFailed {
                command: "aws lightsail create-container-service".to_string(),
                status: "exit status: 254".to_string(),
                stderr: "InvalidInputException: power tier not available".to_string(),
            });
        }

        // Convergent submission: creating is only observable the first time.
        let mut existing = self.existing.lock();
        if existing.insert(stack.service.to_string()) {
            *self
                .created
                .lock()
                .entry(stack.service.to_string())
                .or_insert(0) += 1;
        }
        Ok(())
    }

    async fn service_state(&self, service: &ServiceName) -> Result<ServiceState, PlatformError> {
        self.record(Call::ServiceState(service.to_string()));
        let raw = self
            .service_states
            .lock()
            .pop_front()
            .unwrap_or_else(|| "ACTIVE".to_string());
        Ok(ServiceState::new(raw))
    }
}

#[async_trait]
impl RegistryOps for FakePlatform {
    async fn push_image(
        &self,
        service: &ServiceName,
        label: ContainerLabel,
        _local_tag: &str,
    ) -> Result<(), PlatformError> {
        self.record(Call::PushImage {
            service: service.to_string(),
            label: label.as_str().to_string(),
        });
        if self.drop_pushes {
            return Ok(());
        }

        let mut counter = self.push_counter.lock();
        *counter += 1;
        self.registry.lock().push(RegistryImage {
            reference: format!(":{service}.{label}.{counter}"),
            created_at: Utc::now() + ChronoDuration::seconds(*counter),
        });
        Ok(())
    }

    async fn registry_images(
        &self,
        service: &ServiceName,
    ) -> Result<Vec<RegistryImage>, PlatformError> {
        self.record(Call::RegistryImages(service.to_string()));
        Ok(self.registry.lock().clone())
    }
}

#[async_trait]
impl RolloutOps for FakePlatform {
    async fn submit_deployment(
        &self,
        service: &ServiceName,
        descriptor: &DeploymentDescriptor,
    ) -> Result<(), PlatformError> {
        self.record(Call::SubmitDeployment(service.to_string()));
        self.submitted.lock().push(descriptor.clone());
        Ok(())
    }

    async fn deployment_state(
        &self,
        service: &ServiceName,
    ) -> Result<Option<String>, PlatformError> {
        self.record(Call::DeploymentState(service.to_string()));
        let raw = self
            .deployment_states
            .lock()
            .pop_front()
            .unwrap_or_else(|| "RUNNING".to_string());
        Ok(Some(raw))
    }

    async fn public_url(&self, service: &ServiceName) -> Result<Option<String>, PlatformError> {
        self.record(Call::PublicUrl(service.to_string()));
        Ok(self.url.clone())
    }
}

#[async_trait]
impl EndpointProbe for FakePlatform {
    async fn probe(&self, url: &str) -> Result<u16, PlatformError> {
        self.record(Call::Probe(url.to_string()));
        Ok(self.probe_status)
    }
}

/// One recorded local-builder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildCall {
    Ping,
    Build { context: PathBuf, tag: String },
    Exists(String),
}

/// Local builder fake; builds always "exist" afterwards unless configured
/// otherwise.
#[derive(Default)]
pub struct FakeBuilder {
    pub calls: Mutex<Vec<BuildCall>>,
    pub fail_build: bool,
    pub missing_after_build: bool,
}

impl FakeBuilder {
    pub fn calls(&self) -> Vec<BuildCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl BuildOps for FakeBuilder {
    async fn ping(&self) -> Result<(), PlatformError> {
        self.calls.lock().push(BuildCall::Ping);
        Ok(())
    }

    async fn build_image(&self, context: &Path, tag: &str) -> Result<(), PlatformError> {
        self.calls.lock().push(BuildCall::Build {
            context: context.to_path_buf(),
            tag: tag.to_string(),
        });
        if self.fail_build {
            return Err(PlatformError::CommandFailed {
                command: format!("docker build -t {tag} {}", context.display()),
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    async fn image_exists(&self, tag: &str) -> Result<bool, PlatformError> {
        self.calls.lock().push(BuildCall::Exists(tag.to_string()));
        Ok(!self.missing_after_build)
    }
}
