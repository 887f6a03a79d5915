//! Identifier generation.

use uuid::Uuid;

/// Generates a new UUID v7.
///
/// v7 identifiers sort by creation time, so generated resource names sort in
/// the order they were built.
#[must_use]
pub fn generate_uuid_v7() -> Uuid {
    Uuid::now_v7()
}
