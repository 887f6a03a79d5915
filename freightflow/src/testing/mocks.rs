//! In-memory collaborators with failure injection.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::core::{Namespace, Promotion, Stage, StageStatus};
use crate::ports::{CredentialProvider, CredentialType, Credentials, ResourceStore, VersionLookup};

type StageKey = (String, String);

fn key(namespace: &str, name: &str) -> StageKey {
    (namespace.to_string(), name.to_string())
}

/// A [`ResourceStore`] backed by maps, with per-operation failure injection.
#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    namespaces: RwLock<BTreeMap<String, Namespace>>,
    stages: RwLock<BTreeMap<StageKey, Stage>>,
    promotions: RwLock<Vec<Promotion>>,
    list_failures: RwLock<HashMap<String, String>>,
    create_failures: RwLock<HashMap<StageKey, String>>,
    update_failures: RwLock<HashMap<StageKey, String>>,
    create_delay: Option<Duration>,
    list_calls: AtomicUsize,
    in_flight_creates: AtomicUsize,
    max_in_flight_creates: AtomicUsize,
}

impl InMemoryResourceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project namespace.
    #[must_use]
    pub fn with_project(self, name: impl Into<String>) -> Self {
        self.with_namespace(Namespace::project(name))
    }

    /// Adds a namespace.
    #[must_use]
    pub fn with_namespace(self, namespace: Namespace) -> Self {
        self.namespaces
            .write()
            .insert(namespace.name.clone(), namespace);
        self
    }

    /// Adds a Stage.
    #[must_use]
    pub fn with_stage(self, stage: Stage) -> Self {
        self.put_stage(stage);
        self
    }

    /// Makes every Promotion creation sleep first.
    #[must_use]
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    /// Inserts or replaces a Stage.
    pub fn put_stage(&self, stage: Stage) {
        self.stages
            .write()
            .insert(key(&stage.namespace, &stage.name), stage);
    }

    /// Deletes a Stage.
    pub fn remove_stage(&self, namespace: &str, name: &str) {
        self.stages.write().remove(&key(namespace, name));
    }

    /// Returns a copy of a stored Stage.
    #[must_use]
    pub fn stage(&self, namespace: &str, name: &str) -> Option<Stage> {
        self.stages.read().get(&key(namespace, name)).cloned()
    }

    /// Returns every Promotion created so far.
    #[must_use]
    pub fn promotions(&self) -> Vec<Promotion> {
        self.promotions.read().clone()
    }

    /// Returns how many times a namespace listing was requested.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Returns the highest number of creations observed running at once.
    #[must_use]
    pub fn max_in_flight_creates(&self) -> usize {
        self.max_in_flight_creates.load(Ordering::SeqCst)
    }

    /// Makes listing `namespace` fail with `message`.
    pub fn fail_list(&self, namespace: &str, message: impl Into<String>) {
        self.list_failures
            .write()
            .insert(namespace.to_string(), message.into());
    }

    /// Makes creating a Promotion for the given Stage fail with `message`.
    pub fn fail_create_for(&self, namespace: &str, stage: &str, message: impl Into<String>) {
        self.create_failures
            .write()
            .insert(key(namespace, stage), message.into());
    }

    /// Makes updating the given Stage's status fail with `message`.
    pub fn fail_status_update(&self, namespace: &str, stage: &str, message: impl Into<String>) {
        self.update_failures
            .write()
            .insert(key(namespace, stage), message.into());
    }

    /// Removes every injected failure.
    pub fn clear_failures(&self) {
        self.list_failures.write().clear();
        self.create_failures.write().clear();
        self.update_failures.write().clear();
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get_namespace(&self, name: &str) -> anyhow::Result<Option<Namespace>> {
        Ok(self.namespaces.read().get(name).cloned())
    }

    async fn get_stage(&self, namespace: &str, name: &str) -> anyhow::Result<Option<Stage>> {
        Ok(self.stage(namespace, name))
    }

    async fn list_stages(&self, namespace: &str) -> anyhow::Result<Vec<Stage>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.list_failures.read().get(namespace) {
            anyhow::bail!("{message}");
        }
        Ok(self
            .stages
            .read()
            .values()
            .filter(|s| s.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn create_promotion(&self, promotion: &Promotion) -> anyhow::Result<()> {
        let in_flight = self.in_flight_creates.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight_creates
            .fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .create_failures
            .read()
            .get(&key(&promotion.namespace, &promotion.stage))
            .cloned();
        let result = match failure {
            Some(message) => Err(anyhow::anyhow!(message)),
            None => {
                self.promotions.write().push(promotion.clone());
                Ok(())
            }
        };

        self.in_flight_creates.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn update_stage_status(
        &self,
        namespace: &str,
        name: &str,
        status: &StageStatus,
    ) -> anyhow::Result<()> {
        let key = key(namespace, name);
        if let Some(message) = self.update_failures.read().get(&key) {
            anyhow::bail!("{message}");
        }
        match self.stages.write().get_mut(&key) {
            Some(stage) => {
                stage.status = status.clone();
                Ok(())
            }
            None => anyhow::bail!("Stage {namespace}/{name} does not exist"),
        }
    }
}

/// A [`CredentialProvider`] serving fixed credentials.
#[derive(Debug, Default)]
pub struct StaticCredentialProvider {
    entries: HashMap<(String, CredentialType, String), Credentials>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl StaticCredentialProvider {
    /// Creates a provider with no credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider whose every lookup fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Stores credentials for a repository.
    #[must_use]
    pub fn with_credentials(
        mut self,
        namespace: impl Into<String>,
        credential_type: CredentialType,
        repo_url: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        self.entries
            .insert((namespace.into(), credential_type, repo_url.into()), credentials);
        self
    }

    /// Returns how many lookups were made.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn get(
        &self,
        namespace: &str,
        credential_type: CredentialType,
        repo_url: &str,
    ) -> anyhow::Result<Option<Credentials>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        Ok(self
            .entries
            .get(&(namespace.to_string(), credential_type, repo_url.to_string()))
            .cloned())
    }
}

/// A lookup recorded by [`StaticVersionLookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLookup {
    /// Registry queried.
    pub registry_url: String,
    /// Chart queried.
    pub chart: String,
    /// Constraint passed.
    pub constraint: String,
    /// Credentials passed, if any.
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone)]
enum Response {
    Version(String),
    Error(String),
}

/// A [`VersionLookup`] answering from a fixed table.
///
/// Charts without an entry resolve to no version.
#[derive(Debug, Default)]
pub struct StaticVersionLookup {
    responses: HashMap<(String, String), Response>,
    lookups: RwLock<Vec<RecordedLookup>>,
}

impl StaticVersionLookup {
    /// Creates an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `version` for a chart.
    #[must_use]
    pub fn with_version(
        mut self,
        registry_url: impl Into<String>,
        chart: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.responses.insert(
            (registry_url.into(), chart.into()),
            Response::Version(version.into()),
        );
        self
    }

    /// Fails lookups of a chart with `message`.
    #[must_use]
    pub fn with_error(
        mut self,
        registry_url: impl Into<String>,
        chart: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.responses.insert(
            (registry_url.into(), chart.into()),
            Response::Error(message.into()),
        );
        self
    }

    /// Returns every lookup made so far.
    #[must_use]
    pub fn lookups(&self) -> Vec<RecordedLookup> {
        self.lookups.read().clone()
    }
}

#[async_trait]
impl VersionLookup for StaticVersionLookup {
    async fn latest_version(
        &self,
        registry_url: &str,
        chart: &str,
        constraint: &str,
        credentials: Option<&Credentials>,
    ) -> anyhow::Result<Option<String>> {
        self.lookups.write().push(RecordedLookup {
            registry_url: registry_url.to_string(),
            chart: chart.to_string(),
            constraint: constraint.to_string(),
            credentials: credentials.cloned(),
        });

        match self
            .responses
            .get(&(registry_url.to_string(), chart.to_string()))
        {
            Some(Response::Version(version)) => Ok(Some(version.clone())),
            Some(Response::Error(message)) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StageBuilder;

    #[tokio::test]
    async fn test_store_lists_by_namespace() {
        let store = InMemoryResourceStore::new()
            .with_stage(StageBuilder::new("a", "one").build())
            .with_stage(StageBuilder::new("b", "two").build());

        let listed = store.list_stages("a").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_store_create_failure_injection() {
        let store = InMemoryResourceStore::new();
        store.fail_create_for("proj", "canary", "quota exceeded");

        let canary = StageBuilder::new("proj", "canary").build();
        let staging = StageBuilder::new("proj", "staging").build();

        let err = store
            .create_promotion(&Promotion::new(&canary, "f1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
        store
            .create_promotion(&Promotion::new(&staging, "f1"))
            .await
            .unwrap();
        assert_eq!(store.promotions().len(), 1);
    }

    #[tokio::test]
    async fn test_store_update_missing_stage_fails() {
        let store = InMemoryResourceStore::new();
        assert!(store
            .update_stage_status("proj", "ghost", &StageStatus::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_static_credentials() {
        let provider = StaticCredentialProvider::new().with_credentials(
            "proj",
            CredentialType::Helm,
            "oci://registry",
            Credentials::new("robot", "token"),
        );

        let found = provider
            .get("proj", CredentialType::Helm, "oci://registry")
            .await
            .unwrap();
        assert_eq!(found.unwrap().username, "robot");

        let missing = provider
            .get("proj", CredentialType::Git, "oci://registry")
            .await
            .unwrap();
        assert!(missing.is_none());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_static_version_lookup() {
        let lookup = StaticVersionLookup::new()
            .with_version("fake-url", "fake-chart", "1.0.0")
            .with_error("fake-url", "broken", "registry returned 500");

        assert_eq!(
            lookup
                .latest_version("fake-url", "fake-chart", "", None)
                .await
                .unwrap(),
            Some("1.0.0".to_string())
        );
        assert!(lookup
            .latest_version("fake-url", "broken", "", None)
            .await
            .is_err());
        assert!(lookup
            .latest_version("fake-url", "unknown", "", None)
            .await
            .unwrap()
            .is_none());
        assert_eq!(lookup.lookups().len(), 3);
    }
}
