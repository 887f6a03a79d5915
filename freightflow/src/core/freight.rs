//! Freight references as they appear in Stage history and available lists.

use serde::{Deserialize, Serialize};

use super::Chart;

/// An identified bundle of artifact versions.
///
/// `qualified` is set externally once verification passes; it is only read
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freight {
    /// Stable, content-derived identifier.
    pub id: String,
    /// Whether the Freight may be promoted onward.
    #[serde(default)]
    pub qualified: bool,
    /// Charts carried by this Freight.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<Chart>,
}

impl Freight {
    /// Creates an unqualified Freight reference.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            qualified: false,
            charts: Vec::new(),
        }
    }

    /// Creates a qualified Freight reference.
    #[must_use]
    pub fn qualified(id: impl Into<String>) -> Self {
        Self {
            qualified: true,
            ..Self::new(id)
        }
    }

    /// Adds a chart.
    #[must_use]
    pub fn with_chart(mut self, chart: Chart) -> Self {
        self.charts.push(chart);
        self
    }
}
