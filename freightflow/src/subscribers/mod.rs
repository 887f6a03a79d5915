//! Subscriber resolution: which Stages consume from a given Stage.
//!
//! Resolution is a single upstream-to-downstream hop within one namespace.
//! The scanning resolver is the default; the indexed resolver caches the
//! inverted subscription graph per namespace and returns the same sets.

mod indexed;
mod scan;

use async_trait::async_trait;

use crate::core::Stage;
use crate::errors::PromotionError;

pub use indexed::IndexedSubscriberResolver;
pub use scan::ScanSubscriberResolver;

/// Resolves the direct subscribers of a Stage.
#[async_trait]
pub trait SubscriberResolver: Send + Sync {
    /// Returns every Stage in `stage.namespace` that subscribes to `stage`.
    ///
    /// Order is unspecified. An empty list is not an error.
    async fn find_subscribers(&self, stage: &Stage) -> Result<Vec<Stage>, PromotionError>;
}

pub(crate) fn list_error(namespace: &str, source: anyhow::Error) -> PromotionError {
    PromotionError::internal(
        format!("error listing Stages in namespace {namespace:?}"),
        source,
    )
}
