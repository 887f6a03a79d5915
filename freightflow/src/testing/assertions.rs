//! Assertions for fan-out outcomes and errors.

use crate::errors::{ErrorKind, PromotionError};
use crate::promotion::PromoteSubscribersOutcome;

/// Asserts that Promotions were created for exactly `stages`, in any order.
pub fn assert_promoted_to(outcome: &PromoteSubscribersOutcome, stages: &[&str]) {
    let mut actual: Vec<&str> = outcome.promotions.iter().map(|p| p.stage.as_str()).collect();
    let mut expected = stages.to_vec();
    actual.sort_unstable();
    expected.sort_unstable();
    assert_eq!(
        actual, expected,
        "Expected Promotions for {expected:?}, got {actual:?}"
    );
}

/// Asserts that a result failed with the expected kind.
pub fn assert_error_kind<T: std::fmt::Debug>(result: &Result<T, PromotionError>, expected: ErrorKind) {
    match result {
        Ok(value) => panic!("Expected {expected} error, got Ok({value:?})"),
        Err(err) => assert_eq!(
            err.kind(),
            expected,
            "Expected {expected} error, got {}: {err}",
            err.kind()
        ),
    }
}
