// ABOUTME: Platform adapter errors with SNAFU pattern.
// ABOUTME: Unifies subprocess, parsing, and runtime-socket failures.

use snafu::Snafu;

/// Failure talking to the hosting platform CLI or the local container
/// runtime.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PlatformError {
    #[snafu(display("failed to spawn `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` exited with {status}: {stderr}"))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[snafu(display("unexpected output from `{command}`: {message}"))]
    Malformed { command: String, message: String },

    #[snafu(display("invalid JSON from `{command}`: {source}"))]
    Json {
        command: String,
        source: serde_json::Error,
    },

    #[snafu(display("failed to stage descriptor file: {source}"))]
    DescriptorFile { source: std::io::Error },

    #[snafu(display("container runtime error: {message}"))]
    Runtime { message: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// The external binary could not be started.
    Spawn,
    /// The external binary ran and reported failure.
    CommandFailed,
    /// Output did not match the expected shape.
    Malformed,
    /// Local filesystem failure staging CLI input.
    LocalIo,
    /// Local container runtime (daemon socket) failure.
    Runtime,
}

impl PlatformError {
    pub fn kind(&self) -> PlatformErrorKind {
        match self {
            PlatformError::Spawn { .. } => PlatformErrorKind::Spawn,
            PlatformError::CommandFailed { .. } => PlatformErrorKind::CommandFailed,
            PlatformError::Malformed { .. } | PlatformError::Json { .. } => {
                PlatformErrorKind::Malformed
            }
            PlatformError::DescriptorFile { .. } => PlatformErrorKind::LocalIo,
            PlatformError::Runtime { .. } => PlatformErrorKind::Runtime,
        }
    }
}
