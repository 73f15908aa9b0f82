// ABOUTME: Platform-reported state and registry snapshot types.
// ABOUTME: Raw states are kept verbatim for logging; readiness is a view on top.

use chrono::{DateTime, Utc};

/// States in which the hosting service accepts deployment submissions.
pub const READY_STATES: &[&str] = &["ACTIVE", "RUNNING"];

/// Raw service state as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceState(String);

impl ServiceState {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_ready(&self) -> bool {
        READY_STATES.contains(&self.0.as_str())
    }
}

/// One image entry in the platform registry for a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryImage {
    /// Canonical deployable reference, e.g. `:app.web.4`.
    pub reference: String,
    pub created_at: DateTime<Utc>,
}
