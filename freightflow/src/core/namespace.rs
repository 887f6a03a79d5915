//! Namespaces and projects.

use serde::{Deserialize, Serialize};

/// A namespace in the resource store.
///
/// A project is a namespace flagged as one; Stages of a project live in the
/// namespace of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace name.
    pub name: String,
    /// Whether the namespace is a project.
    #[serde(default)]
    pub project: bool,
}

impl Namespace {
    /// Creates a namespace that is not a project.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: false,
        }
    }

    /// Creates a project namespace.
    #[must_use]
    pub fn project(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: true,
        }
    }
}
