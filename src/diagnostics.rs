// ABOUTME: Diagnostics accumulator for non-fatal warnings during a pipeline run.
// ABOUTME: Collects warnings that shouldn't abort the deployment but must reach the operator.

/// Collects non-fatal warnings during pipeline operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Consume the accumulator, yielding the collected warnings.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during a pipeline run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The service never reported a ready state within the poll budget.
    pub fn ready_timeout(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ReadyTimeout,
            message: message.into(),
        }
    }

    /// The public endpoint probe failed or returned a non-success code.
    pub fn endpoint_probe(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::EndpointProbe,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Readiness polling exhausted its attempt budget; later steps re-check
    /// readiness implicitly through their own calls.
    ReadyTimeout,
    /// Endpoint probe after a successful rollout did not confirm health.
    EndpointProbe,
}
