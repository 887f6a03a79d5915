//! Testing utilities for code built on freightflow.
//!
//! This module provides:
//! - In-memory collaborators with failure injection
//! - Builders for Stages and Freight
//! - Assertions over fan-out outcomes and errors

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_error_kind, assert_promoted_to};
pub use fixtures::StageBuilder;
pub use mocks::{
    InMemoryResourceStore, RecordedLookup, StaticCredentialProvider, StaticVersionLookup,
};
