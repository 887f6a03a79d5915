//! List-then-filter subscriber resolution.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{list_error, SubscriberResolver};
use crate::core::Stage;
use crate::errors::PromotionError;
use crate::ports::ResourceStore;

/// Lists the namespace on every call and keeps the Stages that subscribe to
/// the target.
#[derive(Clone)]
pub struct ScanSubscriberResolver {
    store: Arc<dyn ResourceStore>,
}

impl ScanSubscriberResolver {
    /// Creates a resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for ScanSubscriberResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSubscriberResolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl SubscriberResolver for ScanSubscriberResolver {
    async fn find_subscribers(&self, stage: &Stage) -> Result<Vec<Stage>, PromotionError> {
        let all = self
            .store
            .list_stages(&stage.namespace)
            .await
            .map_err(|e| list_error(&stage.namespace, e))?;

        let subscribers: Vec<Stage> = all
            .into_iter()
            .filter(|candidate| candidate.subscribes_to(&stage.name))
            .collect();

        debug!(
            namespace = %stage.namespace,
            stage = %stage.name,
            subscribers = subscribers.len(),
            "Resolved subscribers"
        );
        Ok(subscribers)
    }
}
