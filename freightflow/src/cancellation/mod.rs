//! Cooperative cancellation for request-scoped operations.

mod token;

pub use token::CancellationToken;
