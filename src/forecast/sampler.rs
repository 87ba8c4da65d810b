use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};

use crate::config::SamplingSettings;
use crate::utils::math;

/// Monte-Carlo displacement draws for one unit, with the variance
/// decomposition the metrics stage reports.
#[derive(Debug, Clone)]
pub struct EnsembleSamples {
    pub displacement: Vec<f64>,
    pub hazard_uncertainty_pct: f64,
    pub exposure_uncertainty_pct: f64,
    pub vulnerability_uncertainty_pct: f64,
}

/// Draws displacement samples from the combined per-event impact series.
///
/// Pure function of its inputs and the seed: each draw picks an ensemble
/// event uniformly and applies multiplicative lognormal vulnerability
/// noise. No shared mutable state, so callers may run one sampler per
/// unit in parallel.
#[derive(Debug, Clone)]
pub struct EnsembleSampler {
    settings: SamplingSettings,
}

impl EnsembleSampler {
    pub fn new(settings: SamplingSettings) -> Self {
        Self { settings }
    }

    /// `event_impacts` and `event_area_fractions` are parallel per-event
    /// series; `exposure_total` is the unit's exposed population.
    pub fn sample(
        &self,
        event_impacts: &[f64],
        event_area_fractions: &[f64],
        exposure_total: f64,
    ) -> EnsembleSamples {
        let n_events = event_impacts.len().min(event_area_fractions.len());
        if n_events == 0 {
            return EnsembleSamples {
                displacement: Vec::new(),
                hazard_uncertainty_pct: 0.0,
                exposure_uncertainty_pct: 0.0,
                vulnerability_uncertainty_pct: 0.0,
            };
        }

        let mut rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let sigma = self.settings.vulnerability_sigma;
        // mu = -sigma^2/2 keeps the noise multiplier mean at 1.0.
        let noise = if sigma > 0.0 {
            LogNormal::new(-sigma * sigma / 2.0, sigma).ok()
        } else {
            None
        };

        let per_event: Vec<f64> = (0..n_events)
            .map(|i| exposure_total * event_impacts[i] * event_area_fractions[i])
            .collect();

        // Noise cannot displace more people than are exposed.
        let displacement: Vec<f64> = (0..self.settings.n_samples)
            .map(|_| {
                let event = rng.gen_range(0..n_events);
                let multiplier = noise.as_ref().map(|d| d.sample(&mut rng)).unwrap_or(1.0);
                (per_event[event] * multiplier).min(exposure_total)
            })
            .collect();

        let (hazard_pct, exposure_pct, vulnerability_pct) =
            self.decompose_uncertainty(&per_event, sigma);

        EnsembleSamples {
            displacement,
            hazard_uncertainty_pct: hazard_pct,
            exposure_uncertainty_pct: exposure_pct,
            vulnerability_uncertainty_pct: vulnerability_pct,
        }
    }

    /// Split total variance into hazard (between-event spread),
    /// vulnerability (noise) and a configured exposure share.
    fn decompose_uncertainty(&self, per_event: &[f64], sigma: f64) -> (f64, f64, f64) {
        let exposure_pct = self.settings.exposure_uncertainty_pct.clamp(0.0, 100.0);
        let remaining = 100.0 - exposure_pct;

        let event_std = math::std_deviation(per_event);
        let hazard_var = event_std * event_std;
        let mean_event = math::mean(per_event);
        // Relative variance of a lognormal with unit mean.
        let vulnerability_var = mean_event * mean_event * ((sigma * sigma).exp() - 1.0);

        let total = hazard_var + vulnerability_var;
        if total == 0.0 {
            return (remaining / 2.0, exposure_pct, remaining / 2.0);
        }
        (
            remaining * hazard_var / total,
            exposure_pct,
            remaining * vulnerability_var / total,
        )
    }
}
