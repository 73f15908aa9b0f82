// ABOUTME: Image publisher: build, push, and resolve the registry reference.
// ABOUTME: References are resolved from the registry, never guessed client-side.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::platform::{BuildOps, PlatformError, RegistryImage, RegistryOps};
use crate::types::{BuiltImage, ContainerLabel, PublishedImage, PublishedRef, ServiceName};

/// Local build context directories for the two containers.
#[derive(Debug, Clone)]
pub struct BuildContexts {
    pub web: PathBuf,
    pub worker: PathBuf,
}

impl Default for BuildContexts {
    fn default() -> Self {
        Self {
            web: PathBuf::from("web"),
            worker: PathBuf::from("worker"),
        }
    }
}

impl BuildContexts {
    fn for_label(&self, label: ContainerLabel) -> &PathBuf {
        match label {
            ContainerLabel::Web => &self.web,
            ContainerLabel::Worker => &self.worker,
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("build failed for {label}: {message}")]
    Build { label: ContainerLabel, message: String },

    #[error("built image not found in local store: {tag}")]
    ImageMissing { tag: String },

    #[error("push failed for {label}: {message}")]
    Push { label: ContainerLabel, message: String },

    #[error("no registry entry found for {label} after push")]
    ResolutionFailed { label: ContainerLabel },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Builds and publishes the two container images, yielding the immutable
/// references deployment composition requires.
pub struct Publisher<'a, P: RegistryOps, B: BuildOps> {
    platform: &'a P,
    builder: &'a B,
}

impl<'a, P: RegistryOps, B: BuildOps> Publisher<'a, P, B> {
    pub fn new(platform: &'a P, builder: &'a B) -> Self {
        Self { platform, builder }
    }

    pub async fn publish_all(
        &self,
        service: &ServiceName,
        contexts: &BuildContexts,
    ) -> Result<(PublishedImage, PublishedImage), PublishError> {
        let [web, worker] = ContainerLabel::ALL;
        let web = self.publish_one(service, web, contexts).await?;
        let worker = self.publish_one(service, worker, contexts).await?;
        Ok((web, worker))
    }

    async fn publish_one(
        &self,
        service: &ServiceName,
        label: ContainerLabel,
        contexts: &BuildContexts,
    ) -> Result<PublishedImage, PublishError> {
        let built = BuiltImage::new(service, label);
        let context = contexts.for_label(label);

        self.builder
            .build_image(context, built.tag())
            .await
            .map_err(|e| PublishError::Build {
                label,
                message: e.to_string(),
            })?;

        if !self.builder.image_exists(built.tag()).await? {
            return Err(PublishError::ImageMissing {
                tag: built.tag().to_string(),
            });
        }

        self.platform
            .push_image(service, label, built.tag())
            .await
            .map_err(|e| PublishError::Push {
                label,
                message: e.to_string(),
            })?;

        // The push call does not return the canonical reference, so resolve
        // it from the registry listing.
        let images = self.platform.registry_images(service).await?;
        let reference = resolve_latest(&images, service, label)
            .ok_or(PublishError::ResolutionFailed { label })?;

        info!(%label, reference = reference.as_str(), "resolved published image");
        Ok(built.into_published(reference))
    }
}

/// Resolve an already-published reference without building or pushing.
/// Used by re-deploys, which must see the same registry the publisher wrote.
pub async fn resolve_published<P: RegistryOps>(
    platform: &P,
    service: &ServiceName,
    label: ContainerLabel,
) -> Result<PublishedImage, PublishError> {
    let images = platform.registry_images(service).await?;
    let reference = resolve_latest(&images, service, label)
        .ok_or(PublishError::ResolutionFailed { label })?;
    Ok(BuiltImage::new(service, label).into_published(reference))
}

/// Pick the single most recent registry entry for the label. References
/// carry the shape `:<service>.<label>.<n>`.
fn resolve_latest(
    images: &[RegistryImage],
    service: &ServiceName,
    label: ContainerLabel,
) -> Option<PublishedRef> {
    let needle = format!(":{}.{}.", service, label);
    images
        .iter()
        .filter(|i| i.reference.starts_with(&needle))
        .max_by_key(|i| i.created_at)
        .map(|i| PublishedRef::new(i.reference.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn image(reference: &str, day: u32) -> RegistryImage {
        RegistryImage {
            reference: reference.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn resolves_most_recent_match_for_label() {
        let service = ServiceName::new("app").unwrap();
        let images = vec![
            image(":app.web.1", 1),
            image(":app.web.3", 9),
            image(":app.web.2", 4),
            image(":app.worker.5", 10),
        ];

        let resolved = resolve_latest(&images, &service, ContainerLabel::Web).unwrap();
        assert_eq!(resolved.as_str(), ":app.web.3");
    }

    #[test]
    fn no_match_for_label_resolves_none() {
        let service = ServiceName::new("app").unwrap();
        let images = vec![image(":app.web.1", 1)];
        assert!(resolve_latest(&images, &service, ContainerLabel::Worker).is_none());
    }

    #[test]
    fn other_services_do_not_match() {
        let service = ServiceName::new("app").unwrap();
        let images = vec![image(":other.web.9", 9)];
        assert!(resolve_latest(&images, &service, ContainerLabel::Web).is_none());
    }
}
