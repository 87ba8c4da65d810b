use tracing::info;

use crate::error::ForecastError;
use crate::models::AlertDecision;

/// Delivery of a triggered alert to its recipients.
///
/// The engine only decides; delivery (email, SMS, webhook) belongs to an
/// external collaborator implementing this trait. The default
/// implementation logs and does nothing else.
pub trait AlertDistributor: Send + Sync {
    fn distribute(&self, decision: &AlertDecision) -> Result<(), ForecastError>;
}

/// Log-only distributor used when no delivery channel is wired up.
#[derive(Debug, Clone, Default)]
pub struct LogDistributor;

impl AlertDistributor for LogDistributor {
    fn distribute(&self, decision: &AlertDecision) -> Result<(), ForecastError> {
        info!(
            level = %decision.alert_level,
            recipients = decision.recipients.len(),
            confidence = decision.confidence,
            "Alert distribution (log only)"
        );
        Ok(())
    }
}
