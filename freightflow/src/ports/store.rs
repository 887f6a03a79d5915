//! Resource store port.

use async_trait::async_trait;

use crate::core::{Namespace, Promotion, Stage, StageStatus};

/// Read and write access to namespaced pipeline resources.
///
/// Absence is reported as `Ok(None)`; `Err` is reserved for failures of the
/// store itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetches a namespace by name.
    async fn get_namespace(&self, name: &str) -> anyhow::Result<Option<Namespace>>;

    /// Fetches a Stage by namespace and name.
    async fn get_stage(&self, namespace: &str, name: &str) -> anyhow::Result<Option<Stage>>;

    /// Lists every Stage in a namespace, in no particular order.
    async fn list_stages(&self, namespace: &str) -> anyhow::Result<Vec<Stage>>;

    /// Persists a new Promotion.
    async fn create_promotion(&self, promotion: &Promotion) -> anyhow::Result<()>;

    /// Replaces the status of a Stage.
    async fn update_stage_status(
        &self,
        namespace: &str,
        name: &str,
        status: &StageStatus,
    ) -> anyhow::Result<()>;
}
