// ABOUTME: Shared helpers for integration tests.
// ABOUTME: Provides the fake platform/builder and common fixtures.

pub mod fake_platform;

#[allow(unused_imports)]
pub use fake_platform::{BuildCall, Call, FakeBuilder, FakePlatform};

use std::collections::BTreeMap;

use caravel::config::{DeploymentTarget, PowerTier, Secrets};
use caravel::preflight::Confirm;
use caravel::types::ServiceName;

/// Accepts every prompt; the override-happy counterpart to `DenyAll`.
pub struct AcceptAll;

impl Confirm for AcceptAll {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[allow(dead_code)]
pub fn target() -> DeploymentTarget {
    DeploymentTarget {
        service: ServiceName::new("app").unwrap(),
        environment: "production".to_string(),
        region: "us-east-1".to_string(),
        power: PowerTier::Micro,
        scale: 1,
    }
}

/// A complete secret set, as a healthy environment would provide.
#[allow(dead_code)]
pub fn full_secrets() -> Secrets {
    let mut map = BTreeMap::new();
    map.insert("OPENAI_API_KEY".to_string(), "sk-test".to_string());
    map.insert("APP_SECRET_KEY".to_string(), "app-secret".to_string());
    map.insert("REDIS_URL".to_string(), "redis://cache:6379".to_string());
    Secrets::from_map(map)
}
