//! Core domain model types for freightflow.
//!
//! This module contains the already-deserialized objects the promotion and
//! chart resolution logic operates on:
//! - Freight and its qualification flag
//! - Stages with their subscriptions and status
//! - Promotions and their external-facing view
//! - Charts and chart subscriptions

mod chart;
mod freight;
mod namespace;
mod promotion;
mod stage;

pub use chart::{Chart, ChartSubscription};
pub use freight::Freight;
pub use namespace::Namespace;
pub use promotion::{Promotion, PromotionView};
pub use stage::{Stage, StageSpec, StageStatus, StageSubscription, Subscriptions};
