//! Event sinks for promotion and chart resolution observability.
//!
//! Sinks are injected into the orchestrator and resolvers; nothing here is
//! process-global.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};

/// Event type names emitted by freightflow.
pub mod event_types {
    /// Freight is absent from a subscriber's available Freight.
    pub const FREIGHT_UNAVAILABLE: &str = "promotion.freight_unavailable";
    /// A Promotion was created for a subscriber.
    pub const PROMOTION_CREATED: &str = "promotion.created";
    /// Creating a Promotion for a subscriber failed.
    pub const PROMOTION_CREATE_FAILED: &str = "promotion.create_failed";
    /// Chart subscriptions were resolved.
    pub const CHARTS_RESOLVED: &str = "charts.resolved";
    /// Refreshing a Stage's charts failed.
    pub const CHARTS_REFRESH_FAILED: &str = "charts.refresh_failed";
}
