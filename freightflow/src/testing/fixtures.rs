//! Builders for test Stages.

use crate::core::{ChartSubscription, Freight, Stage, StageSubscription, Subscriptions};

/// Builds a [`Stage`] step by step.
#[derive(Debug, Clone)]
pub struct StageBuilder {
    stage: Stage,
}

impl StageBuilder {
    /// Starts a Stage with no subscriptions and an empty status.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            stage: Stage::new(namespace, name),
        }
    }

    fn subscriptions(&mut self) -> &mut Subscriptions {
        self.stage
            .spec
            .subscriptions
            .get_or_insert_with(Subscriptions::default)
    }

    /// Subscribes to an upstream Stage.
    #[must_use]
    pub fn upstream(mut self, name: impl Into<String>) -> Self {
        self.subscriptions()
            .upstream_stages
            .push(StageSubscription::new(name));
        self
    }

    /// Subscribes to a chart.
    #[must_use]
    pub fn chart(mut self, subscription: ChartSubscription) -> Self {
        self.subscriptions().charts.push(subscription);
        self
    }

    /// Appends Freight to the history.
    #[must_use]
    pub fn history(mut self, freight: Freight) -> Self {
        self.stage.status.history.push(freight);
        self
    }

    /// Appends Freight to the available list.
    #[must_use]
    pub fn available(mut self, freight: Freight) -> Self {
        self.stage.status.available_freight.push(freight);
        self
    }

    /// Returns the built Stage.
    #[must_use]
    pub fn build(self) -> Stage {
        self.stage
    }
}
