//! Keeps a Stage's `latest_charts` status current.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::ChartResolver;
use crate::core::{Chart, Stage, StageStatus};
use crate::errors::PromotionError;
use crate::events::{event_types, EventSink, NoOpEventSink};
use crate::ports::ResourceStore;

/// Resolves a Stage's chart subscriptions and writes the result to its status.
pub struct ChartRefresher {
    store: Arc<dyn ResourceStore>,
    resolver: ChartResolver,
    events: Arc<dyn EventSink>,
}

impl ChartRefresher {
    /// Creates a refresher writing to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>, resolver: ChartResolver) -> Self {
        Self {
            store,
            resolver,
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Refreshes the chart status of one Stage and returns the resolved charts.
    ///
    /// On a resolution failure the previous `latest_charts` are kept, the
    /// failure is recorded in `status.error`, and the resolution error is
    /// returned even if recording it fails.
    pub async fn refresh_stage(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<Chart>, PromotionError> {
        let stage = self
            .store
            .get_stage(namespace, name)
            .await
            .map_err(|e| PromotionError::internal(format!("error getting Stage {name:?}"), e))?
            .ok_or_else(|| {
                PromotionError::not_found(format!(
                    "Stage {name:?} not found in namespace {namespace:?}"
                ))
            })?;

        match self
            .resolver
            .get_latest_charts(namespace, stage.chart_subscriptions())
            .await
        {
            Ok(charts) => {
                let mut status = stage.status.clone();
                status.latest_charts.clone_from(&charts);
                status.error = None;
                self.write_status(&stage, &status).await?;
                info!(namespace, stage = name, charts = charts.len(), "Refreshed latest charts");
                Ok(charts)
            }
            Err(err) => {
                error!(namespace, stage = name, error = %err, "Chart refresh failed");
                let mut status = stage.status.clone();
                status.error = Some(err.to_string());
                self.events.try_emit(
                    event_types::CHARTS_REFRESH_FAILED,
                    Some(serde_json::json!({
                        "namespace": namespace,
                        "stage": name,
                        "error": err.to_string(),
                    })),
                );
                if let Err(write_err) = self.write_status(&stage, &status).await {
                    // The resolution failure is what callers act on.
                    warn!(namespace, stage = name, error = %write_err, "Could not record chart refresh failure");
                }
                Err(err)
            }
        }
    }

    async fn write_status(
        &self,
        stage: &Stage,
        status: &StageStatus,
    ) -> Result<(), PromotionError> {
        self.store
            .update_stage_status(&stage.namespace, &stage.name, status)
            .await
            .map_err(|e| {
                PromotionError::internal(
                    format!("error updating status of Stage {:?}", stage.name),
                    e,
                )
            })
    }
}

impl std::fmt::Debug for ChartRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartRefresher")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
