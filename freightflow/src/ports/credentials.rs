//! Credential provider port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of repository a credential is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    /// Git repositories.
    Git,
    /// Chart registries.
    #[default]
    Helm,
    /// Container image registries.
    Image,
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Helm => write!(f, "helm"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Credentials for a repository.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password or token.
    pub password: String,
}

impl Credentials {
    /// Creates new credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Looks up credentials scoped to a namespace, type and repository URL.
///
/// `Ok(None)` means no credentials are stored, which callers treat as a
/// public repository. Only a provider failure is an `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Fetches credentials for a repository.
    async fn get(
        &self,
        namespace: &str,
        credential_type: CredentialType,
        repo_url: &str,
    ) -> anyhow::Result<Option<Credentials>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("robot", "s3cr3t");
        let debug = format!("{creds:?}");
        assert!(debug.contains("robot"));
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn test_credential_type_display() {
        assert_eq!(CredentialType::Helm.to_string(), "helm");
        assert_eq!(CredentialType::default(), CredentialType::Helm);
    }
}
