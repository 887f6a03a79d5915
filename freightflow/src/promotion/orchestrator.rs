//! The promote-subscribers use case.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::outcome::{PromoteSubscribersOutcome, SubscriberAttempt};
use crate::cancellation::CancellationToken;
use crate::config::FanOutConfig;
use crate::core::{Promotion, Stage};
use crate::errors::PromotionError;
use crate::events::{event_types, EventSink, NoOpEventSink};
use crate::observability::SpanTimer;
use crate::ports::ResourceStore;
use crate::qualification::validate_freight_exists;
use crate::subscribers::{ScanSubscriberResolver, SubscriberResolver};

/// A request to promote Freight from a Stage into all of its subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoteSubscribersRequest {
    /// Project (and namespace) of the source Stage.
    pub project: String,
    /// Name of the source Stage.
    pub stage: String,
    /// Identifier of the Freight to promote.
    pub freight: String,
}

impl PromoteSubscribersRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        stage: impl Into<String>,
        freight: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            stage: stage.into(),
            freight: freight.into(),
        }
    }

    /// Checks that the project and Stage are named.
    pub fn validate(&self) -> Result<(), PromotionError> {
        if self.project.is_empty() {
            return Err(PromotionError::invalid_argument("project should not be empty"));
        }
        if self.stage.is_empty() {
            return Err(PromotionError::invalid_argument("stage should not be empty"));
        }
        Ok(())
    }
}

/// Creates Promotions for every subscriber of a Stage.
///
/// Collaborators are injected at construction; the orchestrator holds no
/// state between calls, so concurrent calls are independent. Calls for the
/// same source Stage are not serialized and repeated calls create duplicate
/// Promotions.
pub struct PromotionOrchestrator {
    store: Arc<dyn ResourceStore>,
    subscribers: Arc<dyn SubscriberResolver>,
    events: Arc<dyn EventSink>,
    config: FanOutConfig,
}

impl PromotionOrchestrator {
    /// Creates an orchestrator that resolves subscribers by scanning `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        let subscribers = Arc::new(ScanSubscriberResolver::new(Arc::clone(&store)));
        Self {
            store,
            subscribers,
            events: Arc::new(NoOpEventSink),
            config: FanOutConfig::default(),
        }
    }

    /// Replaces the subscriber resolver.
    #[must_use]
    pub fn with_subscriber_resolver(mut self, resolver: Arc<dyn SubscriberResolver>) -> Self {
        self.subscribers = resolver;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Sets the fan-out configuration.
    #[must_use]
    pub fn with_config(mut self, config: FanOutConfig) -> Self {
        self.config = config;
        self
    }

    /// Promotes `request.freight` into every subscriber of `request.stage`.
    ///
    /// See [`promote_subscribers_with_token`](Self::promote_subscribers_with_token).
    pub async fn promote_subscribers(
        &self,
        request: &PromoteSubscribersRequest,
    ) -> Result<PromoteSubscribersOutcome, PromotionError> {
        self.promote_subscribers_with_token(request, &CancellationToken::new())
            .await
    }

    /// Promotes `request.freight` into every subscriber of `request.stage`,
    /// stopping before any subscriber not yet started once `cancel` fires.
    ///
    /// `Err` means nothing was attempted: the request was malformed, the
    /// project or Stage does not exist, the Freight is absent from the Stage's
    /// history or unqualified, subscribers could not be listed, or there are
    /// none. Once subscribers are known the call returns `Ok` with the created
    /// Promotions and the failures of the rest, including subscribers skipped
    /// by cancellation. Created Promotions are never retracted.
    pub async fn promote_subscribers_with_token(
        &self,
        request: &PromoteSubscribersRequest,
        cancel: &CancellationToken,
    ) -> Result<PromoteSubscribersOutcome, PromotionError> {
        request.validate()?;
        if let Some(reason) = cancel.reason() {
            return Err(PromotionError::cancelled(reason));
        }

        self.validate_project(&request.project).await?;
        let stage = self.get_stage(&request.project, &request.stage).await?;

        let freight = validate_freight_exists(&request.freight, &stage.status.history)?;
        if !freight.qualified {
            return Err(PromotionError::invalid_argument(format!(
                "cannot promote unqualified freight {:?}",
                freight.id
            )));
        }

        let subscribers = self.subscribers.find_subscribers(&stage).await?;
        if subscribers.is_empty() {
            return Err(PromotionError::not_found(format!(
                "Stage {:?} has no subscribers",
                request.stage
            )));
        }

        let timer = SpanTimer::start("promote_subscribers");
        let attempts: Vec<SubscriberAttempt> = stream::iter(&subscribers)
            .map(|subscriber| self.promote_subscriber(subscriber, &request.freight, cancel))
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut outcome = PromoteSubscribersOutcome::default();
        for attempt in attempts {
            outcome.record(attempt);
        }

        info!(
            operation = timer.name(),
            project = %request.project,
            stage = %request.stage,
            freight = %request.freight,
            subscribers = subscribers.len(),
            created = outcome.promotions.len(),
            failed = outcome.errors.len(),
            duration_ms = timer.elapsed_ms(),
            "Promoted subscribers"
        );
        Ok(outcome)
    }

    async fn validate_project(&self, project: &str) -> Result<(), PromotionError> {
        let namespace = self
            .store
            .get_namespace(project)
            .await
            .map_err(|e| PromotionError::internal(format!("error getting project {project:?}"), e))?;

        match namespace {
            None => Err(PromotionError::not_found(format!(
                "project {project:?} not found"
            ))),
            Some(ns) if !ns.project => Err(PromotionError::invalid_argument(format!(
                "namespace {project:?} is not a project"
            ))),
            Some(_) => Ok(()),
        }
    }

    async fn get_stage(&self, project: &str, name: &str) -> Result<Stage, PromotionError> {
        self.store
            .get_stage(project, name)
            .await
            .map_err(|e| PromotionError::internal(format!("error getting Stage {name:?}"), e))?
            .ok_or_else(|| {
                PromotionError::not_found(format!(
                    "Stage {name:?} not found in project {project:?}"
                ))
            })
    }

    async fn promote_subscriber(
        &self,
        subscriber: &Stage,
        freight: &str,
        cancel: &CancellationToken,
    ) -> SubscriberAttempt {
        if let Some(reason) = cancel.reason() {
            debug!(subscriber = %subscriber.name, %reason, "Skipping subscriber after cancellation");
            return SubscriberAttempt {
                stage: subscriber.name.clone(),
                freight_available: true,
                result: Err(PromotionError::cancelled(format!(
                    "Promotion for Stage {:?} not attempted: {reason}",
                    subscriber.name
                ))),
            };
        }

        // Freight in our history should already be available downstream; a
        // mismatch is reported but does not block the Promotion.
        let freight_available =
            validate_freight_exists(freight, &subscriber.status.available_freight).is_ok();
        if !freight_available {
            warn!(
                freight = %freight,
                subscriber = %subscriber.name,
                "Freight does not appear in available Freight of subscriber"
            );
            self.events.try_emit(
                event_types::FREIGHT_UNAVAILABLE,
                Some(serde_json::json!({
                    "namespace": subscriber.namespace,
                    "stage": subscriber.name,
                    "freight": freight,
                })),
            );
        }

        let promotion = Promotion::new(subscriber, freight);
        let result = match self.store.create_promotion(&promotion).await {
            Ok(()) => {
                debug!(promotion = %promotion.name, subscriber = %subscriber.name, "Created Promotion");
                self.events.try_emit(
                    event_types::PROMOTION_CREATED,
                    Some(serde_json::json!({
                        "namespace": promotion.namespace,
                        "stage": promotion.stage,
                        "freight": promotion.freight,
                        "promotion": promotion.name,
                    })),
                );
                Ok(promotion.to_view())
            }
            Err(source) => {
                let err = PromotionError::internal(
                    format!("error creating Promotion for Stage {:?}", subscriber.name),
                    source,
                );
                warn!(subscriber = %subscriber.name, error = %err, "Promotion creation failed");
                self.events.try_emit(
                    event_types::PROMOTION_CREATE_FAILED,
                    Some(serde_json::json!({
                        "namespace": subscriber.namespace,
                        "stage": subscriber.name,
                        "freight": freight,
                        "error": err.to_string(),
                    })),
                );
                Err(err)
            }
        };

        SubscriberAttempt {
            stage: subscriber.name.clone(),
            freight_available,
            result,
        }
    }
}

impl std::fmt::Debug for PromotionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromotionOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Freight, Namespace};
    use crate::errors::ErrorKind;
    use crate::testing::{assert_error_kind, InMemoryResourceStore, StageBuilder};
    use tokio_test::{assert_err, assert_ok};

    fn store_with_source(history: Freight) -> InMemoryResourceStore {
        InMemoryResourceStore::new()
            .with_project("proj")
            .with_stage(StageBuilder::new("proj", "checkout").history(history).build())
            .with_stage(
                StageBuilder::new("proj", "staging")
                    .upstream("checkout")
                    .available(Freight::qualified("f1"))
                    .build(),
            )
    }

    async fn promote(
        store: InMemoryResourceStore,
        request: PromoteSubscribersRequest,
    ) -> Result<PromoteSubscribersOutcome, PromotionError> {
        PromotionOrchestrator::new(Arc::new(store))
            .promote_subscribers(&request)
            .await
    }

    #[test]
    fn test_request_validation() {
        assert_ok!(PromoteSubscribersRequest::new("proj", "checkout", "f1").validate());

        let err = assert_err!(PromoteSubscribersRequest::new("", "checkout", "f1").validate());
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("project"));

        let err = assert_err!(PromoteSubscribersRequest::new("proj", "", "f1").validate());
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("stage"));
    }

    #[tokio::test]
    async fn test_empty_project_rejected() {
        let result = promote(
            store_with_source(Freight::qualified("f1")),
            PromoteSubscribersRequest::new("", "checkout", "f1"),
        )
        .await;
        assert_error_kind(&result, ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_missing_project() {
        let result = promote(
            store_with_source(Freight::qualified("f1")),
            PromoteSubscribersRequest::new("nope", "checkout", "f1"),
        )
        .await;
        assert_error_kind(&result, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_namespace_that_is_not_a_project() {
        let store = store_with_source(Freight::qualified("f1"))
            .with_namespace(Namespace::new("kube-system"));
        let result = promote(
            store,
            PromoteSubscribersRequest::new("kube-system", "checkout", "f1"),
        )
        .await;
        assert_error_kind(&result, ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_missing_stage() {
        let result = promote(
            store_with_source(Freight::qualified("f1")),
            PromoteSubscribersRequest::new("proj", "ghost", "f1"),
        )
        .await;
        assert_error_kind(&result, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_unqualified_freight_rejected() {
        let store = Arc::new(store_with_source(Freight::new("f1")));
        let result = PromotionOrchestrator::new(store.clone())
            .promote_subscribers(&PromoteSubscribersRequest::new("proj", "checkout", "f1"))
            .await;

        assert_error_kind(&result, ErrorKind::InvalidArgument);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot promote unqualified freight \"f1\""));
        assert!(store.promotions().is_empty());
    }

    #[tokio::test]
    async fn test_freight_absent_from_history() {
        let store = Arc::new(store_with_source(Freight::qualified("f1")));
        let result = PromotionOrchestrator::new(store.clone())
            .promote_subscribers(&PromoteSubscribersRequest::new("proj", "checkout", "f9"))
            .await;

        assert_error_kind(&result, ErrorKind::NotFound);
        assert!(store.promotions().is_empty());
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let store = InMemoryResourceStore::new()
            .with_project("proj")
            .with_stage(
                StageBuilder::new("proj", "prod")
                    .history(Freight::qualified("f1"))
                    .build(),
            );
        let result = promote(store, PromoteSubscribersRequest::new("proj", "prod", "f1")).await;

        assert_error_kind(&result, ErrorKind::NotFound);
        assert!(result.unwrap_err().to_string().contains("has no subscribers"));
    }

    #[tokio::test]
    async fn test_subscriber_listing_failure() {
        let store = store_with_source(Freight::qualified("f1"));
        store.fail_list("proj", "etcd timeout");
        let result = promote(store, PromoteSubscribersRequest::new("proj", "checkout", "f1")).await;

        assert_error_kind(&result, ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let store = Arc::new(store_with_source(Freight::qualified("f1")));
        let token = CancellationToken::new();
        token.cancel("shutdown");

        let result = PromotionOrchestrator::new(store.clone())
            .promote_subscribers_with_token(
                &PromoteSubscribersRequest::new("proj", "checkout", "f1"),
                &token,
            )
            .await;

        assert_error_kind(&result, ErrorKind::Cancelled);
        assert!(store.promotions().is_empty());
    }

    #[tokio::test]
    async fn test_successful_promotion_is_stored() {
        let store = Arc::new(store_with_source(Freight::qualified("f1")));
        let outcome = PromotionOrchestrator::new(store.clone())
            .promote_subscribers(&PromoteSubscribersRequest::new("proj", "checkout", "f1"))
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.promotions.len(), 1);

        let stored = store.promotions();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].stage, "staging");
        assert_eq!(stored[0].freight, "f1");
        assert_eq!(stored[0].name, outcome.promotions[0].name);
    }
}
