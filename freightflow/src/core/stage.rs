//! Stages, their subscriptions and their status.

use serde::{Deserialize, Serialize};

use super::{Chart, ChartSubscription, Freight};

/// A named, namespaced pipeline node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stage {
    /// Stage name, unique within its namespace.
    pub name: String,
    /// Namespace the Stage lives in.
    pub namespace: String,
    /// Declared configuration.
    #[serde(default)]
    pub spec: StageSpec,
    /// Observed state.
    #[serde(default)]
    pub status: StageStatus,
}

impl Stage {
    /// Creates a Stage with no subscriptions and an empty status.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            spec: StageSpec::default(),
            status: StageStatus::default(),
        }
    }

    /// Returns true if this Stage subscribes to the named upstream Stage.
    ///
    /// A Stage without a subscription block subscribes to nothing.
    #[must_use]
    pub fn subscribes_to(&self, upstream: &str) -> bool {
        self.spec
            .subscriptions
            .as_ref()
            .is_some_and(|subs| subs.upstream_stages.iter().any(|s| s.name == upstream))
    }

    /// Returns the chart subscriptions declared by this Stage.
    #[must_use]
    pub fn chart_subscriptions(&self) -> &[ChartSubscription] {
        self.spec
            .subscriptions
            .as_ref()
            .map(|subs| subs.charts.as_slice())
            .unwrap_or_default()
    }
}

/// Declared configuration of a Stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageSpec {
    /// What the Stage consumes from, if anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Subscriptions>,
}

/// Upstream Stages and chart registries a Stage consumes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriptions {
    /// Upstream Stages.
    #[serde(default)]
    pub upstream_stages: Vec<StageSubscription>,
    /// Chart registries.
    #[serde(default)]
    pub charts: Vec<ChartSubscription>,
}

/// A subscription to an upstream Stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StageSubscription {
    /// Name of the upstream Stage in the same namespace.
    pub name: String,
}

impl StageSubscription {
    /// Creates a subscription to the named Stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Observed state of a Stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageStatus {
    /// Freight promoted into this Stage.
    #[serde(default)]
    pub history: Vec<Freight>,
    /// Freight this Stage may currently promote.
    #[serde(default)]
    pub available_freight: Vec<Freight>,
    /// Newest chart versions matching the Stage's chart subscriptions.
    #[serde(default)]
    pub latest_charts: Vec<Chart>,
    /// Last reconciliation error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
