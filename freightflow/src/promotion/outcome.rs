//! Result of a promotion fan-out.

use crate::core::PromotionView;
use crate::errors::{MultiError, PromotionError};

/// What happened to one subscriber during fan-out.
#[derive(Debug)]
pub(crate) struct SubscriberAttempt {
    pub stage: String,
    pub freight_available: bool,
    pub result: Result<PromotionView, PromotionError>,
}

/// Promotions created by a fan-out together with every per-subscriber failure.
///
/// Both fields may be non-empty at once: partial success is a normal outcome
/// and callers must look at both.
#[derive(Debug, Default)]
pub struct PromoteSubscribersOutcome {
    /// Promotions that were created, in no particular order.
    pub promotions: Vec<PromotionView>,
    /// Failures of individual subscribers.
    pub errors: MultiError,
    /// Subscribers whose available Freight lacked the promoted Freight.
    pub availability_warnings: Vec<String>,
}

impl PromoteSubscribersOutcome {
    pub(crate) fn record(&mut self, attempt: SubscriberAttempt) {
        if !attempt.freight_available {
            self.availability_warnings.push(attempt.stage);
        }
        match attempt.result {
            Ok(view) => self.promotions.push(view),
            Err(err) => self.errors.push(err),
        }
    }

    /// Returns true if every subscriber received a Promotion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if some, but not all, subscribers received a Promotion.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.promotions.is_empty() && !self.errors.is_empty()
    }

    /// Returns the number of subscribers attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.promotions.len() + self.errors.len()
    }

    /// Splits into the created Promotions and the joined failures, if any.
    #[must_use]
    pub fn into_parts(self) -> (Vec<PromotionView>, Option<MultiError>) {
        (self.promotions, self.errors.into_option())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Promotion, Stage};

    fn created(stage: &str) -> SubscriberAttempt {
        let stage = Stage::new("proj", stage);
        SubscriberAttempt {
            stage: stage.name.clone(),
            freight_available: true,
            result: Ok(Promotion::new(&stage, "f1").to_view()),
        }
    }

    fn failed(stage: &str) -> SubscriberAttempt {
        SubscriberAttempt {
            stage: stage.to_string(),
            freight_available: true,
            result: Err(PromotionError::internal(
                format!("error creating Promotion for Stage {stage:?}"),
                anyhow::anyhow!("conflict"),
            )),
        }
    }

    #[test]
    fn test_complete_outcome() {
        let mut outcome = PromoteSubscribersOutcome::default();
        outcome.record(created("staging"));
        outcome.record(created("canary"));

        assert!(outcome.is_complete());
        assert!(!outcome.is_partial());
        let (promotions, errors) = outcome.into_parts();
        assert_eq!(promotions.len(), 2);
        assert!(errors.is_none());
    }

    #[test]
    fn test_partial_outcome() {
        let mut outcome = PromoteSubscribersOutcome::default();
        outcome.record(created("staging"));
        outcome.record(failed("canary"));

        assert!(outcome.is_partial());
        assert_eq!(outcome.attempted(), 2);
        let (promotions, errors) = outcome.into_parts();
        assert_eq!(promotions.len(), 1);
        assert!(errors.unwrap().to_string().contains("\"canary\""));
    }

    #[test]
    fn test_availability_warning_recorded_alongside_success() {
        let mut attempt = created("canary");
        attempt.freight_available = false;

        let mut outcome = PromoteSubscribersOutcome::default();
        outcome.record(attempt);

        assert_eq!(outcome.availability_warnings, vec!["canary"]);
        assert_eq!(outcome.promotions.len(), 1);
        assert!(outcome.is_complete());
    }
}
