//! Cached, per-namespace inversion of the subscription graph.

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{list_error, SubscriberResolver};
use crate::core::Stage;
use crate::errors::PromotionError;
use crate::ports::ResourceStore;

/// Upstream Stage name to the names of the Stages subscribed to it.
type SubscriberIndex = HashMap<String, Vec<String>>;

struct IndexEntry {
    index: Arc<SubscriberIndex>,
    built_at: Instant,
}

/// Resolves subscribers from a per-namespace index built from one listing.
///
/// Each namespace is listed at most once per `ttl`; writers that change
/// subscriptions call [`invalidate`](Self::invalidate) to force a rebuild
/// sooner. Only names are cached: candidates are re-read on every call and
/// dropped if they no longer exist or no longer subscribe, so returned
/// Stages always carry current status. A Stage that starts subscribing is
/// only seen after the next rebuild.
pub struct IndexedSubscriberResolver {
    store: Arc<dyn ResourceStore>,
    entries: DashMap<String, IndexEntry>,
    ttl: Duration,
}

impl IndexedSubscriberResolver {
    /// Creates a resolver over `store` whose indexes expire after `ttl`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>, ttl: Duration) -> Self {
        Self {
            store,
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Drops the cached index of one namespace.
    pub fn invalidate(&self, namespace: &str) {
        self.entries.remove(namespace);
    }

    /// Drops every cached index.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Returns the number of namespaces currently indexed.
    #[must_use]
    pub fn indexed_namespaces(&self) -> usize {
        self.entries.len()
    }

    fn cached(&self, namespace: &str) -> Option<Arc<SubscriberIndex>> {
        if let Some(entry) = self.entries.get(namespace) {
            if entry.built_at.elapsed() < self.ttl {
                return Some(Arc::clone(&entry.index));
            }
            drop(entry);
            self.entries.remove(namespace);
        }
        None
    }

    async fn build(&self, namespace: &str) -> Result<Arc<SubscriberIndex>, PromotionError> {
        let stages = self
            .store
            .list_stages(namespace)
            .await
            .map_err(|e| list_error(namespace, e))?;

        let mut index = SubscriberIndex::new();
        for stage in stages {
            let Some(subs) = stage.spec.subscriptions.as_ref() else {
                continue;
            };
            let mut upstreams: Vec<&str> =
                subs.upstream_stages.iter().map(|u| u.name.as_str()).collect();
            upstreams.sort_unstable();
            upstreams.dedup();
            for upstream in upstreams {
                index
                    .entry(upstream.to_string())
                    .or_default()
                    .push(stage.name.clone());
            }
        }

        debug!(namespace = %namespace, upstreams = index.len(), "Built subscriber index");
        let index = Arc::new(index);
        self.entries.insert(
            namespace.to_string(),
            IndexEntry {
                index: Arc::clone(&index),
                built_at: Instant::now(),
            },
        );
        Ok(index)
    }

    async fn current_stage(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Stage>, PromotionError> {
        self.store
            .get_stage(namespace, name)
            .await
            .map_err(|e| PromotionError::internal(format!("error getting Stage {name:?}"), e))
    }
}

impl std::fmt::Debug for IndexedSubscriberResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedSubscriberResolver")
            .field("indexed_namespaces", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SubscriberResolver for IndexedSubscriberResolver {
    async fn find_subscribers(&self, stage: &Stage) -> Result<Vec<Stage>, PromotionError> {
        let index = match self.cached(&stage.namespace) {
            Some(index) => index,
            None => self.build(&stage.namespace).await?,
        };
        let Some(candidates) = index.get(&stage.name) else {
            return Ok(Vec::new());
        };

        let current = try_join_all(
            candidates
                .iter()
                .map(|name| self.current_stage(&stage.namespace, name)),
        )
        .await?;
        Ok(current
            .into_iter()
            .flatten()
            .filter(|candidate| candidate.subscribes_to(&stage.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Freight;
    use crate::subscribers::ScanSubscriberResolver;
    use crate::testing::{InMemoryResourceStore, StageBuilder};

    fn store() -> Arc<InMemoryResourceStore> {
        Arc::new(
            InMemoryResourceStore::new()
                .with_stage(StageBuilder::new("proj", "checkout").build())
                .with_stage(StageBuilder::new("proj", "staging").upstream("checkout").build())
                .with_stage(
                    StageBuilder::new("proj", "canary")
                        .upstream("checkout")
                        .upstream("staging")
                        .build(),
                )
                .with_stage(StageBuilder::new("proj", "prod").upstream("staging").build()),
        )
    }

    fn sorted_names(stages: Vec<Stage>) -> Vec<String> {
        let mut names: Vec<String> = stages.into_iter().map(|s| s.name).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_matches_scan_resolver() {
        let store = store();
        let indexed = IndexedSubscriberResolver::new(store.clone(), Duration::from_secs(60));
        let scan = ScanSubscriberResolver::new(store.clone());

        for name in ["checkout", "staging", "canary", "prod"] {
            let stage = StageBuilder::new("proj", name).build();
            assert_eq!(
                sorted_names(indexed.find_subscribers(&stage).await.unwrap()),
                sorted_names(scan.find_subscribers(&stage).await.unwrap()),
                "mismatch for {name}"
            );
        }
    }

    #[tokio::test]
    async fn test_lists_namespace_once() {
        let store = store();
        let indexed = IndexedSubscriberResolver::new(store.clone(), Duration::from_secs(60));

        let checkout = StageBuilder::new("proj", "checkout").build();
        let staging = StageBuilder::new("proj", "staging").build();
        indexed.find_subscribers(&checkout).await.unwrap();
        indexed.find_subscribers(&staging).await.unwrap();

        assert_eq!(store.list_calls(), 1);
        assert_eq!(indexed.indexed_namespaces(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild() {
        let store = store();
        let indexed = IndexedSubscriberResolver::new(store.clone(), Duration::from_secs(60));
        let checkout = StageBuilder::new("proj", "checkout").build();

        assert_eq!(indexed.find_subscribers(&checkout).await.unwrap().len(), 2);

        store.put_stage(StageBuilder::new("proj", "qa").upstream("checkout").build());
        assert_eq!(indexed.find_subscribers(&checkout).await.unwrap().len(), 2);

        indexed.invalidate("proj");
        assert_eq!(indexed.find_subscribers(&checkout).await.unwrap().len(), 3);
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_returns_current_subscriber_state() {
        let store = store();
        let indexed = IndexedSubscriberResolver::new(store.clone(), Duration::from_secs(60));
        let checkout = StageBuilder::new("proj", "checkout").build();
        assert_eq!(indexed.find_subscribers(&checkout).await.unwrap().len(), 2);

        store.put_stage(StageBuilder::new("proj", "staging").build());
        store.put_stage(
            StageBuilder::new("proj", "canary")
                .upstream("checkout")
                .upstream("staging")
                .available(Freight::qualified("f1"))
                .build(),
        );

        let subscribers = indexed.find_subscribers(&checkout).await.unwrap();
        assert_eq!(sorted_names(subscribers.clone()), vec!["canary"]);
        assert_eq!(subscribers[0].status.available_freight[0].id, "f1");
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_deleted_subscriber_dropped() {
        let store = store();
        let indexed = IndexedSubscriberResolver::new(store.clone(), Duration::from_secs(60));
        let staging = StageBuilder::new("proj", "staging").build();
        assert_eq!(indexed.find_subscribers(&staging).await.unwrap().len(), 2);

        store.remove_stage("proj", "prod");
        let subscribers = indexed.find_subscribers(&staging).await.unwrap();
        assert_eq!(sorted_names(subscribers), vec!["canary"]);
    }

    #[tokio::test]
    async fn test_expired_index_rebuilt() {
        let store = store();
        let indexed = IndexedSubscriberResolver::new(store.clone(), Duration::ZERO);
        let checkout = StageBuilder::new("proj", "checkout").build();

        indexed.find_subscribers(&checkout).await.unwrap();
        indexed.find_subscribers(&checkout).await.unwrap();

        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_list_failure_not_cached() {
        let store = store();
        store.fail_list("proj", "etcd timeout");
        let indexed = IndexedSubscriberResolver::new(store.clone(), Duration::from_secs(60));
        let checkout = StageBuilder::new("proj", "checkout").build();

        assert!(indexed.find_subscribers(&checkout).await.is_err());
        assert_eq!(indexed.indexed_namespaces(), 0);

        store.clear_failures();
        indexed.invalidate_all();
        assert_eq!(indexed.find_subscribers(&checkout).await.unwrap().len(), 2);
    }
}
