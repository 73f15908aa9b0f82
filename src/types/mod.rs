// ABOUTME: Validated domain types shared across the pipeline.
// ABOUTME: Service names and image identities with parse-time invariants.

mod image;
mod service_name;

pub use image::{BuiltImage, ContainerLabel, PublishedImage, PublishedRef};
pub use service_name::{ServiceName, ServiceNameError};
