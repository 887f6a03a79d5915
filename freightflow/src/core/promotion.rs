//! Promotions and their external-facing view.

use serde::{Deserialize, Serialize};

use super::Stage;
use crate::utils::{format_rfc3339, generate_uuid_v7, now_utc, Timestamp};

/// Number of Freight id characters carried in a generated Promotion name.
const FREIGHT_NAME_PREFIX_LEN: usize = 7;

/// A request to move a specific Freight into a specific Stage.
///
/// Only creation happens here; the Promotion's subsequent lifecycle belongs to
/// whoever reconciles it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    /// Generated, unique name.
    pub name: String,
    /// Namespace of the target Stage.
    pub namespace: String,
    /// Name of the target Stage.
    pub stage: String,
    /// Identifier of the Freight to promote.
    pub freight: String,
    /// When the Promotion was built.
    pub created_at: Timestamp,
}

impl Promotion {
    /// Builds a Promotion of `freight` into `stage`.
    #[must_use]
    pub fn new(stage: &Stage, freight: &str) -> Self {
        let short_freight: String = freight.chars().take(FREIGHT_NAME_PREFIX_LEN).collect();
        Self {
            name: format!(
                "{}.{}.{}",
                stage.name,
                generate_uuid_v7().simple(),
                short_freight
            ),
            namespace: stage.namespace.clone(),
            stage: stage.name.clone(),
            freight: freight.to_string(),
            created_at: now_utc(),
        }
    }

    /// Returns the external-facing projection.
    #[must_use]
    pub fn to_view(&self) -> PromotionView {
        PromotionView::from(self)
    }
}

/// The external-facing projection of a created Promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionView {
    /// Promotion name.
    pub name: String,
    /// Namespace of the target Stage.
    pub namespace: String,
    /// Target Stage.
    pub stage: String,
    /// Promoted Freight.
    pub freight: String,
    /// Creation time, RFC 3339.
    pub created_at: String,
}

impl From<&Promotion> for PromotionView {
    fn from(promotion: &Promotion) -> Self {
        Self {
            name: promotion.name.clone(),
            namespace: promotion.namespace.clone(),
            stage: promotion.stage.clone(),
            freight: promotion.freight.clone(),
            created_at: format_rfc3339(&promotion.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_promotion_targets_stage() {
        let stage = Stage::new("proj", "staging");
        let promo = Promotion::new(&stage, "9f2c1a7be4d0");

        assert_eq!(promo.namespace, "proj");
        assert_eq!(promo.stage, "staging");
        assert_eq!(promo.freight, "9f2c1a7be4d0");
        assert!(promo.name.starts_with("staging."));
        assert!(promo.name.ends_with(".9f2c1a7"));
    }

    #[test]
    fn test_promotion_names_are_unique() {
        let stage = Stage::new("proj", "staging");
        let a = Promotion::new(&stage, "f1");
        let b = Promotion::new(&stage, "f1");
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn test_short_freight_id() {
        let stage = Stage::new("proj", "staging");
        let promo = Promotion::new(&stage, "f1");
        assert!(promo.name.ends_with(".f1"));
    }

    #[test]
    fn test_view_projection() {
        let stage = Stage::new("proj", "staging");
        let promo = Promotion::new(&stage, "f1");
        let view = promo.to_view();

        assert_eq!(view.name, promo.name);
        assert_eq!(view.stage, "staging");
        assert_eq!(view.freight, "f1");
        assert!(view.created_at.contains('T'));

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("createdAt").is_some());
    }
}
