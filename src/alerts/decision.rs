use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::config::{AlertSettings, DisplacementAlertLevels};
use crate::models::{
    AlertDecision, AlertLevel, ConfidenceLevel, ForecastMetrics, HazardContext,
};
use crate::utils::math;

/// Converts the final displacement distribution and forecast metrics into
/// an alert decision.
///
/// The two severe tiers trigger on the 90th percentile (conservative
/// upper-tail test); the two lower tiers trigger on the mean so early
/// warnings are not driven by tail outliers.
#[derive(Debug, Clone)]
pub struct AlertDecisionEngine {
    thresholds: DisplacementAlertLevels,
    settings: AlertSettings,
}

impl AlertDecisionEngine {
    pub fn new(thresholds: DisplacementAlertLevels, settings: AlertSettings) -> Self {
        Self { thresholds, settings }
    }

    pub fn generate(
        &self,
        samples: &[f64],
        metrics: &ForecastMetrics,
        contexts: &HashMap<String, HazardContext>,
    ) -> AlertDecision {
        let mean_disp = math::mean(samples);
        let p90_disp = math::percentile(samples, 90.0);

        let alert_level = self.determine_level(mean_disp, p90_disp);

        let should_trigger = matches!(alert_level, AlertLevel::Warning | AlertLevel::Emergency)
            && matches!(
                metrics.confidence_level,
                ConfidenceLevel::High | ConfidenceLevel::Medium
            );

        let confidence = alert_confidence(samples, metrics.quality_score);

        let mut affected_states: Vec<String> = contexts.keys().cloned().collect();
        affected_states.sort();

        let estimated_displacement: BTreeMap<String, f64> = affected_states
            .iter()
            .map(|state| (state.clone(), mean_disp / affected_states.len().max(1) as f64))
            .collect();

        let recommended_actions =
            self.recommendations(alert_level, mean_disp, &affected_states);
        let recipients = self.recipients(alert_level);
        let message = self.render_message(
            alert_level,
            mean_disp,
            p90_disp,
            &affected_states,
            &recommended_actions,
            metrics,
        );

        info!(
            level = %alert_level,
            should_trigger,
            confidence,
            mean = mean_disp,
            p90 = p90_disp,
            "Generated alert decision"
        );

        AlertDecision {
            id: uuid::Uuid::new_v4(),
            alert_level,
            should_trigger,
            confidence,
            affected_states,
            estimated_displacement,
            recommended_actions,
            recipients,
            message,
        }
    }

    fn determine_level(&self, mean_disp: f64, p90_disp: f64) -> AlertLevel {
        if p90_disp >= self.thresholds.emergency {
            AlertLevel::Emergency
        } else if p90_disp >= self.thresholds.warning {
            AlertLevel::Warning
        } else if mean_disp >= self.thresholds.advisory {
            AlertLevel::Advisory
        } else if mean_disp >= self.thresholds.watch {
            AlertLevel::Watch
        } else {
            AlertLevel::None
        }
    }

    fn recommendations(
        &self,
        level: AlertLevel,
        displacement: f64,
        states: &[String],
    ) -> Vec<String> {
        let mut actions: Vec<String> = match level {
            AlertLevel::None => Vec::new(),
            AlertLevel::Watch => vec![
                "Monitor situation closely".to_string(),
                "Alert state emergency management agencies".to_string(),
                "Review and update contingency plans".to_string(),
                "Prepare early warning messages".to_string(),
            ],
            AlertLevel::Advisory => vec![
                "Activate early warning systems".to_string(),
                "Pre-position emergency supplies".to_string(),
                "Brief response teams".to_string(),
                "Coordinate with humanitarian partners".to_string(),
                "Prepare evacuation routes".to_string(),
            ],
            AlertLevel::Warning => vec![
                "Issue public warning announcements".to_string(),
                "Begin evacuation of high-risk areas".to_string(),
                "Activate emergency operations centers".to_string(),
                "Deploy response teams to affected states".to_string(),
                "Open temporary shelters".to_string(),
                format!("Prepare for {} displaced persons", format_count(displacement)),
            ],
            AlertLevel::Emergency => vec![
                "IMMEDIATE: Full emergency response activation".to_string(),
                "Mass evacuation of affected areas".to_string(),
                "Request national/international assistance".to_string(),
                "Deploy all available resources".to_string(),
                "Establish emergency coordination mechanisms".to_string(),
                format!(
                    "CRITICAL: Prepare for {}+ displaced persons",
                    format_count(displacement)
                ),
            ],
        };

        if level != AlertLevel::None {
            if states.len() <= 3 {
                actions.push(format!("Focus on: {}", states.join(", ")));
            } else {
                actions.push(format!(
                    "Affecting {} states - coordinate multi-state response",
                    states.len()
                ));
            }
        }

        actions
    }

    fn recipients(&self, level: AlertLevel) -> Vec<String> {
        self.settings
            .recipients
            .get(&level)
            .cloned()
            .unwrap_or_else(|| vec![self.settings.default_recipient.clone()])
    }

    fn render_message(
        &self,
        level: AlertLevel,
        mean_disp: f64,
        p90_disp: f64,
        states: &[String],
        actions: &[String],
        metrics: &ForecastMetrics,
    ) -> String {
        let timestamp = metrics.timestamp.format("%Y-%m-%d %H:%M UTC");

        let mut message = format!(
            "========================================\n\
             DISPLACEMENT FORECAST ALERT\n\
             {} - {}\n\
             ========================================\n\n\
             FORECAST SUMMARY:\n\
             - Expected Displacement: {} people\n\
             - 90% Confidence Upper Bound: {} people\n\
             - Affected States: {}\n\n\
             RECOMMENDED ACTIONS:\n",
            level.as_str().to_uppercase(),
            timestamp,
            format_count(mean_disp),
            format_count(p90_disp),
            states.join(", "),
        );
        for (i, action) in actions.iter().enumerate() {
            message.push_str(&format!("{}. {}\n", i + 1, action));
        }
        message.push_str(&format!(
            "\nALERT LEVEL: {}\n\nThis is an automated forecast generated by forecast {}.\n\
             ========================================\n",
            level.as_str().to_uppercase(),
            metrics.forecast_id,
        ));
        message
    }
}

/// Confidence starts from the quality score and is nudged by the shape of
/// the sample distribution: tight distributions gain, wide ones lose.
fn alert_confidence(samples: &[f64], quality_score: f64) -> f64 {
    let cv = math::coefficient_of_variation(samples);
    let mut confidence = quality_score;
    if cv < 0.3 {
        confidence *= 1.1;
    } else if cv > 0.8 {
        confidence *= 0.8;
    }
    confidence.min(1.0)
}

/// Comma-grouped whole-number rendering, e.g. 60000 -> "60,000".
fn format_count(value: f64) -> String {
    let whole = value.round().max(0.0) as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
