// ABOUTME: Image identity types for the publish step.
// ABOUTME: A built image becomes a published image exactly once, never the reverse.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::service_name::ServiceName;

/// Logical container labels of the deployed service. The public endpoint
/// always fronts the web container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerLabel {
    Web,
    Worker,
}

impl ContainerLabel {
    pub const ALL: [ContainerLabel; 2] = [ContainerLabel::Web, ContainerLabel::Worker];

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerLabel::Web => "web",
            ContainerLabel::Worker => "worker",
        }
    }
}

impl fmt::Display for ContainerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry-resolved reference for a pushed image. Only produced by
/// resolving the registry after a push; never constructed from a local tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedRef(String);

impl PublishedRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublishedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A locally built image, tagged deterministically per service and label.
/// Images are not content-versioned; the registry tracks push recency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltImage {
    label: ContainerLabel,
    tag: String,
}

impl BuiltImage {
    pub fn new(service: &ServiceName, label: ContainerLabel) -> Self {
        Self {
            label,
            tag: format!("{}-{}:latest", service, label),
        }
    }

    pub fn label(&self) -> ContainerLabel {
        self.label
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Consume the built image once its registry reference is known.
    pub fn into_published(self, reference: PublishedRef) -> PublishedImage {
        PublishedImage {
            label: self.label,
            tag: self.tag,
            reference,
        }
    }
}

/// A published image: local tag plus the immutable registry reference the
/// deployment descriptor must use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedImage {
    label: ContainerLabel,
    tag: String,
    reference: PublishedRef,
}

impl PublishedImage {
    pub fn label(&self) -> ContainerLabel {
        self.label
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn reference(&self) -> &PublishedRef {
        &self.reference
    }
}
