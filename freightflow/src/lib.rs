//! # Freightflow
//!
//! Promotion propagation for multi-stage delivery pipelines.
//!
//! When a bundle of artifacts ("Freight") lands in a pipeline Stage, every
//! downstream Stage that subscribes to it should receive a Promotion. This
//! crate provides:
//!
//! - **Freight qualification**: locate Freight in a Stage's history and refuse
//!   to promote anything unqualified
//! - **Subscriber resolution**: find the Stages that consume from a Stage,
//!   either by scanning or through a cached inverted index
//! - **Promotion fan-out**: create one Promotion per subscriber, isolating
//!   per-subscriber failures and returning partial results
//! - **Chart resolution**: resolve chart subscriptions to the newest version
//!   allowed by their constraint, failing fast on the first problem
//!
//! Storage, credentials and registry access are injected through the traits
//! in [`ports`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use freightflow::prelude::*;
//!
//! let orchestrator = PromotionOrchestrator::new(store)
//!     .with_config(FanOutConfig::default().with_max_concurrency(4));
//!
//! let outcome = orchestrator
//!     .promote_subscribers(&PromoteSubscribersRequest::new("proj", "checkout", "f1"))
//!     .await?;
//! let (promotions, errors) = outcome.into_parts();
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod charts;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod ports;
pub mod promotion;
pub mod qualification;
pub mod subscribers;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::charts::{ChartRefresher, ChartResolver, SemverIndexLookup};
    pub use crate::config::{ChartConfig, FanOutConfig, FreightflowConfig, LoggingConfig};
    pub use crate::core::{
        Chart, ChartSubscription, Freight, Namespace, Promotion, PromotionView, Stage,
        StageStatus,
    };
    pub use crate::errors::{ErrorKind, MultiError, PromotionError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::ports::{CredentialProvider, CredentialType, Credentials, ResourceStore, VersionLookup};
    pub use crate::promotion::{
        PromoteSubscribersOutcome, PromoteSubscribersRequest, PromotionOrchestrator,
    };
    pub use crate::qualification::validate_freight_exists;
    pub use crate::subscribers::{
        IndexedSubscriberResolver, ScanSubscriberResolver, SubscriberResolver,
    };
}
