//! Version lookup port.

use async_trait::async_trait;

use super::Credentials;

/// Finds the newest version of a chart satisfying a constraint.
#[async_trait]
pub trait VersionLookup: Send + Sync {
    /// Returns the newest version of `chart` in `registry_url` that satisfies
    /// `constraint` (empty for any), or `None` when nothing qualifies.
    async fn latest_version(
        &self,
        registry_url: &str,
        chart: &str,
        constraint: &str,
        credentials: Option<&Credentials>,
    ) -> anyhow::Result<Option<String>>;
}
