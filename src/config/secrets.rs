// ABOUTME: Runtime secrets injected into both deployed containers.
// ABOUTME: Read from the process environment exactly once at pipeline entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Secret names every deployment requires: the model API key, the
/// application secret key, and the cache connection string.
pub const REQUIRED_SECRETS: &[&str] = &["OPENAI_API_KEY", "APP_SECRET_KEY", "REDIS_URL"];

/// Value substituted when the operator chooses to continue without a
/// required secret.
pub const PLACEHOLDER: &str = "placeholder";

/// Ordered mapping of secret name to value. Built once per invocation;
/// components receive it by value and never read the environment directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secrets(BTreeMap<String, String>);

impl Secrets {
    /// Read the required secrets from the process environment. Absent
    /// variables are simply not included; preflight decides what that means.
    pub fn from_env() -> Self {
        let mut map = BTreeMap::new();
        for name in REQUIRED_SECRETS {
            if let Ok(value) = std::env::var(name) {
                map.insert((*name).to_string(), value);
            }
        }
        Self(map)
    }

    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required secret names that are absent or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        REQUIRED_SECRETS
            .iter()
            .filter(|name| self.get(name).is_none_or(str::is_empty))
            .copied()
            .collect()
    }

    /// Fill every missing required secret with the placeholder value.
    /// Only reachable through the explicit preflight override.
    pub fn fill_placeholders(&mut self) {
        for name in self.missing() {
            self.0.insert(name.to_string(), PLACEHOLDER.to_string());
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}
