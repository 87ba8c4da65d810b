use serde::{Deserialize, Serialize};

use crate::models::HazardType;
use crate::utils::math;

/// Compiled intensity-to-impact curve for one hazard in one context.
///
/// Three parallel sequences over the same ascending intensity grid. Built
/// once per (context, compounding, vulnerability) triple and read-only
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactCurve {
    pub hazard_type: HazardType,
    /// `<hazard>_adaptive_<state>`, mirrors the naming of the source data.
    pub name: String,
    pub intensity_unit: String,
    pub intensity: Vec<f64>,
    /// Share of exposed population displaced at each intensity, in [0, 0.95].
    pub displacement_fraction: Vec<f64>,
    /// Share of the unit's area affected at each intensity, in [0.1, 1.0].
    pub affected_area_fraction: Vec<f64>,
}

impl ImpactCurve {
    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }

    /// Displacement fraction at an arbitrary intensity, linearly
    /// interpolated on the grid.
    pub fn displacement_at(&self, intensity: f64) -> f64 {
        math::interp(intensity, &self.intensity, &self.displacement_fraction)
    }

    /// Affected-area fraction at an arbitrary intensity.
    pub fn affected_area_at(&self, intensity: f64) -> f64 {
        math::interp(intensity, &self.intensity, &self.affected_area_fraction)
    }

    /// Evaluate the curve at each event intensity of a hazard series,
    /// producing the per-event impact fraction the combiner consumes.
    pub fn evaluate(&self, event_intensities: &[f64]) -> Vec<f64> {
        event_intensities
            .iter()
            .map(|&x| self.displacement_at(x))
            .collect()
    }
}
