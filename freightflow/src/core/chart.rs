//! Chart descriptors and chart subscriptions.

use serde::{Deserialize, Serialize};

/// A chart subscription declared by a Stage.
///
/// An empty `semver_constraint` accepts any version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSubscription {
    /// URL of the chart registry.
    #[serde(rename = "registryURL")]
    pub registry_url: String,
    /// Name of the chart.
    pub name: String,
    /// Version constraint, empty for any.
    #[serde(default)]
    pub semver_constraint: String,
}

impl ChartSubscription {
    /// Creates a subscription that accepts any version.
    #[must_use]
    pub fn new(registry_url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into(),
            name: name.into(),
            semver_constraint: String::new(),
        }
    }

    /// Sets the version constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.semver_constraint = constraint.into();
        self
    }
}

/// A resolved chart: the version chosen, not merely the constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    /// URL of the chart registry.
    #[serde(rename = "registryURL")]
    pub registry_url: String,
    /// Name of the chart.
    pub name: String,
    /// Resolved version.
    pub version: String,
}

impl Chart {
    /// Creates a new resolved chart.
    #[must_use]
    pub fn new(
        registry_url: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            registry_url: registry_url.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}
