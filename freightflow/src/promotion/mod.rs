//! Promotion fan-out: one Promotion per subscriber of a Stage.
//!
//! The request is validated up front and fails as a whole; once subscribers
//! are known, each one is promoted independently and failures are collected
//! rather than aborting the batch.

mod orchestrator;
mod outcome;

pub use orchestrator::{PromoteSubscribersRequest, PromotionOrchestrator};
pub use outcome::PromoteSubscribersOutcome;
