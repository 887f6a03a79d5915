//! Latest-version resolution for a Stage's chart subscriptions.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ChartConfig;
use crate::core::{Chart, ChartSubscription};
use crate::errors::PromotionError;
use crate::events::{event_types, EventSink, NoOpEventSink};
use crate::ports::{CredentialProvider, VersionLookup};

/// Resolves chart subscriptions to concrete versions.
///
/// Unlike promotion fan-out this path is all-or-nothing: the first failing
/// subscription, in subscription order, fails the whole call.
pub struct ChartResolver {
    credentials: Arc<dyn CredentialProvider>,
    versions: Arc<dyn VersionLookup>,
    events: Arc<dyn EventSink>,
    config: ChartConfig,
}

impl ChartResolver {
    /// Creates a resolver over the given collaborators.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialProvider>, versions: Arc<dyn VersionLookup>) -> Self {
        Self {
            credentials,
            versions,
            events: Arc::new(NoOpEventSink),
            config: ChartConfig::default(),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Sets the chart configuration.
    #[must_use]
    pub fn with_config(mut self, config: ChartConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves every subscription, returning charts in subscription order.
    pub async fn get_latest_charts(
        &self,
        namespace: &str,
        subscriptions: &[ChartSubscription],
    ) -> Result<Vec<Chart>, PromotionError> {
        let charts: Vec<Chart> = stream::iter(subscriptions)
            .map(|sub| async move {
                let version = self
                    .get_latest_chart(
                        namespace,
                        &sub.registry_url,
                        &sub.name,
                        &sub.semver_constraint,
                    )
                    .await?;
                Ok::<_, PromotionError>(Chart::new(&sub.registry_url, &sub.name, version))
            })
            .buffered(self.config.max_concurrency.max(1))
            .try_collect()
            .await?;

        info!(namespace, charts = charts.len(), "Resolved chart subscriptions");
        self.events.try_emit(
            event_types::CHARTS_RESOLVED,
            Some(serde_json::json!({
                "namespace": namespace,
                "charts": charts,
            })),
        );
        Ok(charts)
    }

    /// Resolves the newest version of one chart satisfying `constraint`.
    ///
    /// Missing credentials mean the registry is treated as public.
    pub async fn get_latest_chart(
        &self,
        namespace: &str,
        registry_url: &str,
        name: &str,
        constraint: &str,
    ) -> Result<String, PromotionError> {
        let credentials = self
            .credentials
            .get(namespace, self.config.credential_type, registry_url)
            .await
            .map_err(|e| {
                PromotionError::internal(
                    format!("error obtaining credentials for chart registry {registry_url:?}"),
                    e,
                )
            })?;
        if credentials.is_none() {
            debug!(registry_url, "No credentials found; treating chart registry as public");
        }

        let version = self
            .versions
            .latest_version(registry_url, name, constraint, credentials.as_ref())
            .await
            .map_err(|e| {
                PromotionError::internal(
                    format!("error searching for latest version of chart {name:?}"),
                    e,
                )
            })?;

        match version {
            Some(version) if !version.is_empty() => {
                debug!(registry_url, chart = name, %version, "Resolved chart version");
                Ok(version)
            }
            _ => Err(PromotionError::not_found(format!(
                "found no suitable version of chart {name:?}"
            ))),
        }
    }
}

impl std::fmt::Debug for ChartResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
