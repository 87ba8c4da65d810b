use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Alert severity ladder. Ordering matters: decisions only ever move up
/// this sequence as displacement estimates grow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    None,
    Watch,
    Advisory,
    Warning,
    Emergency,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::None => "none",
            AlertLevel::Watch => "watch",
            AlertLevel::Advisory => "advisory",
            AlertLevel::Warning => "warning",
            AlertLevel::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final decision of one forecast run.
///
/// Consumed by the external distribution collaborator; the `message` field
/// is plain text ready for direct delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDecision {
    pub id: Uuid,
    pub alert_level: AlertLevel,
    pub should_trigger: bool,
    pub confidence: f64,
    pub affected_states: Vec<String>,
    /// Estimated displacement per unit. BTreeMap keeps serialized output
    /// stable for downstream diffing.
    pub estimated_displacement: BTreeMap<String, f64>,
    pub recommended_actions: Vec<String>,
    pub recipients: Vec<String>,
    pub message: String,
}
