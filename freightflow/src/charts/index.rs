//! In-memory chart registry index with semver constraint matching.

use async_trait::async_trait;
use semver::{Version, VersionReq};
use std::collections::HashMap;
use thiserror::Error;

use crate::ports::{Credentials, VersionLookup};

/// Failures of a registry lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No registry is known at this URL.
    #[error("chart registry {0:?} is unreachable")]
    Unreachable(String),
    /// The registry is private and no credentials were supplied.
    #[error("chart registry {0:?} requires credentials")]
    Unauthorized(String),
    /// The version constraint could not be parsed.
    #[error("invalid version constraint {constraint:?}: {reason}")]
    InvalidConstraint {
        /// The constraint as given.
        constraint: String,
        /// Parser message.
        reason: String,
    },
}

#[derive(Debug, Default, Clone)]
struct Registry {
    private: bool,
    charts: HashMap<String, Vec<String>>,
}

/// A [`VersionLookup`] over a fixed set of registries.
///
/// Published versions that are not valid semver are ignored. Pre-releases are
/// only matched by constraints that name a pre-release of the same version.
#[derive(Debug, Default, Clone)]
pub struct SemverIndexLookup {
    registries: HashMap<String, Registry>,
}

impl SemverIndexLookup {
    /// Creates an index with no registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a public registry with no charts.
    #[must_use]
    pub fn with_registry(mut self, registry_url: impl Into<String>) -> Self {
        self.registries.entry(registry_url.into()).or_default();
        self
    }

    /// Adds a registry that rejects anonymous lookups.
    #[must_use]
    pub fn with_private_registry(mut self, registry_url: impl Into<String>) -> Self {
        self.registries.entry(registry_url.into()).or_default().private = true;
        self
    }

    /// Publishes versions of a chart, creating a public registry if needed.
    #[must_use]
    pub fn with_chart<I, S>(
        mut self,
        registry_url: impl Into<String>,
        chart: impl Into<String>,
        versions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registries
            .entry(registry_url.into())
            .or_default()
            .charts
            .entry(chart.into())
            .or_default()
            .extend(versions.into_iter().map(Into::into));
        self
    }

    /// Returns the newest published version of `chart` matching `constraint`.
    pub fn find_latest(
        &self,
        registry_url: &str,
        chart: &str,
        constraint: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Option<Version>, RegistryError> {
        let registry = self
            .registries
            .get(registry_url)
            .ok_or_else(|| RegistryError::Unreachable(registry_url.to_string()))?;
        if registry.private && credentials.is_none() {
            return Err(RegistryError::Unauthorized(registry_url.to_string()));
        }

        let req = parse_constraint(constraint)?;
        let Some(published) = registry.charts.get(chart) else {
            return Ok(None);
        };

        Ok(published
            .iter()
            .filter_map(|v| Version::parse(v).ok())
            .filter(|v| req.matches(v))
            .max())
    }
}

fn parse_constraint(constraint: &str) -> Result<VersionReq, RegistryError> {
    let trimmed = constraint.trim();
    if trimmed.is_empty() {
        return Ok(VersionReq::STAR);
    }
    VersionReq::parse(trimmed).map_err(|e| RegistryError::InvalidConstraint {
        constraint: constraint.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl VersionLookup for SemverIndexLookup {
    async fn latest_version(
        &self,
        registry_url: &str,
        chart: &str,
        constraint: &str,
        credentials: Option<&Credentials>,
    ) -> anyhow::Result<Option<String>> {
        let latest = self.find_latest(registry_url, chart, constraint, credentials)?;
        Ok(latest.map(|v| v.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index() -> SemverIndexLookup {
        SemverIndexLookup::new()
            .with_chart(
                "oci://public",
                "podinfo",
                ["6.0.0", "6.1.3", "6.10.0", "7.0.0-rc.1", "not-a-version", "5.9.9"],
            )
            .with_private_registry("oci://private")
            .with_chart("oci://private", "internal", ["1.2.3"])
    }

    #[test]
    fn test_highest_version_without_constraint() {
        let latest = index().find_latest("oci://public", "podinfo", "", None).unwrap();
        assert_eq!(latest, Some(Version::new(6, 10, 0)));
    }

    #[test]
    fn test_constraint_limits_version() {
        let latest = index()
            .find_latest("oci://public", "podinfo", "~6.1", None)
            .unwrap();
        assert_eq!(latest, Some(Version::new(6, 1, 3)));

        let latest = index()
            .find_latest("oci://public", "podinfo", "<6.0.0", None)
            .unwrap();
        assert_eq!(latest, Some(Version::new(5, 9, 9)));
    }

    #[test]
    fn test_prerelease_needs_explicit_constraint() {
        let latest = index()
            .find_latest("oci://public", "podinfo", ">=7.0.0-rc.0", None)
            .unwrap();
        assert_eq!(latest, Some(Version::parse("7.0.0-rc.1").unwrap()));
    }

    #[test]
    fn test_nothing_matches() {
        let latest = index()
            .find_latest("oci://public", "podinfo", ">=8", None)
            .unwrap();
        assert!(latest.is_none());
        assert!(index()
            .find_latest("oci://public", "missing", "", None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unknown_registry_is_unreachable() {
        let err = index().find_latest("oci://nowhere", "podinfo", "", None).unwrap_err();
        assert_eq!(err, RegistryError::Unreachable("oci://nowhere".to_string()));
    }

    #[test]
    fn test_private_registry_requires_credentials() {
        let err = index()
            .find_latest("oci://private", "internal", "", None)
            .unwrap_err();
        assert_eq!(err, RegistryError::Unauthorized("oci://private".to_string()));

        let creds = Credentials::new("robot", "token");
        let latest = index()
            .find_latest("oci://private", "internal", "", Some(&creds))
            .unwrap();
        assert_eq!(latest, Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_invalid_constraint() {
        let err = index()
            .find_latest("oci://public", "podinfo", "not a constraint", None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidConstraint { .. }));
    }

    #[tokio::test]
    async fn test_version_lookup_port() {
        let lookup = index();
        let version = lookup
            .latest_version("oci://public", "podinfo", "^6", None)
            .await
            .unwrap();
        assert_eq!(version.as_deref(), Some("6.10.0"));

        let err = lookup
            .latest_version("oci://private", "internal", "", None)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<RegistryError>().is_some());
    }
}
