//! Error types for freightflow.
//!
//! Every operation reports one of a small set of error kinds so that the
//! request layer in front of this crate can map failures onto its own status
//! codes. Failures of external collaborators are carried as `anyhow::Error`
//! causes behind a human-readable context prefix naming the failed step.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Classification of a [`PromotionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input or a semantically disallowed request.
    InvalidArgument,
    /// A referenced entity does not exist.
    NotFound,
    /// An external collaborator failed.
    Internal,
    /// Several independent failures joined together.
    Aggregate,
    /// The operation was cancelled or its deadline passed.
    Cancelled,
}

impl ErrorKind {
    /// Returns the snake_case name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Aggregate => "aggregate",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for promotion and chart resolution operations.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// Missing or malformed input, or a disallowed request.
    #[error("{0}")]
    InvalidArgument(String),

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An external collaborator failed.
    #[error("{context}: {source}")]
    Internal {
        /// Which step failed.
        context: String,
        /// The underlying cause.
        #[source]
        source: anyhow::Error,
    },

    /// Independent per-item failures.
    #[error("{0}")]
    Aggregate(#[from] MultiError),

    /// The operation was cancelled before this step ran.
    #[error("operation cancelled: {0}")]
    Cancelled(String),
}

impl PromotionError {
    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Wraps a collaborator failure with the step that produced it.
    #[must_use]
    pub fn internal(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled(reason.into())
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Aggregate(_) => ErrorKind::Aggregate,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("kind".to_string(), serde_json::json!(self.kind().as_str()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));

        match self {
            Self::Internal { context, .. } => {
                map.insert("context".to_string(), serde_json::json!(context));
            }
            Self::Aggregate(errors) => {
                let members: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| serde_json::json!(e.to_dict()))
                    .collect();
                map.insert("errors".to_string(), serde_json::Value::Array(members));
            }
            _ => {}
        }

        map
    }
}

/// A union of independent failures.
///
/// Used where one failure must not abort a batch: each failed item is pushed
/// and the caller inspects the union alongside whatever succeeded. Member
/// order carries no meaning.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<PromotionError>,
}

impl MultiError {
    /// Creates an empty multi-error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failure.
    pub fn push(&mut self, error: PromotionError) {
        match error {
            PromotionError::Aggregate(inner) => self.errors.extend(inner.errors),
            other => self.errors.push(other),
        }
    }

    /// Returns the union of two multi-errors.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.errors.extend(other.errors);
        self
    }

    /// Returns true if no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over the recorded failures.
    pub fn iter(&self) -> std::slice::Iter<'_, PromotionError> {
        self.errors.iter()
    }

    /// Returns `None` when empty, otherwise the multi-error itself.
    #[must_use]
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Returns `Ok(())` when empty, otherwise an aggregate error.
    pub fn into_result(self) -> Result<(), PromotionError> {
        match self.into_option() {
            None => Ok(()),
            Some(errors) => Err(PromotionError::Aggregate(errors)),
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}

impl Extend<PromotionError> for MultiError {
    fn extend<T: IntoIterator<Item = PromotionError>>(&mut self, iter: T) {
        for error in iter {
            self.push(error);
        }
    }
}

impl FromIterator<PromotionError> for MultiError {
    fn from_iter<T: IntoIterator<Item = PromotionError>>(iter: T) -> Self {
        let mut errors = Self::new();
        errors.extend(iter);
        errors
    }
}

impl IntoIterator for MultiError {
    type Item = PromotionError;
    type IntoIter = std::vec::IntoIter<PromotionError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a PromotionError;
    type IntoIter = std::slice::Iter<'a, PromotionError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("error reading configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A value is outside its allowed range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The logging subscriber could not be installed.
    #[error("error initializing logging: {0}")]
    Logging(String),
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
