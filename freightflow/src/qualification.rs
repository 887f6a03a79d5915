//! Freight lookup against a Stage's history or available Freight.

use crate::core::Freight;
use crate::errors::PromotionError;

/// Finds the Freight with identifier `freight_id` in `candidates`.
///
/// Only exact identifier matches count. The returned entry carries its own
/// `qualified` flag; deciding what an unqualified match means is left to the
/// caller.
///
/// # Errors
///
/// Returns [`PromotionError::NotFound`] when no candidate matches.
///
/// # Examples
///
/// ```
/// use freightflow::core::Freight;
/// use freightflow::qualification::validate_freight_exists;
///
/// let history = vec![Freight::qualified("f1"), Freight::new("f2")];
/// assert!(validate_freight_exists("f1", &history).unwrap().qualified);
/// assert!(validate_freight_exists("f3", &history).is_err());
/// ```
pub fn validate_freight_exists<'a>(
    freight_id: &str,
    candidates: &'a [Freight],
) -> Result<&'a Freight, PromotionError> {
    candidates
        .iter()
        .find(|f| f.id == freight_id)
        .ok_or_else(|| PromotionError::not_found(format!("Freight {freight_id:?} not found")))
}
