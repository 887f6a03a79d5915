//! Utility functions for identifier generation and timestamp handling.

mod ids;
pub mod timestamps;

pub use ids::generate_uuid_v7;
pub use timestamps::{format_rfc3339, now_utc, Timestamp};
