use serde::{Deserialize, Serialize};

/// Standardization statistics fitted on the training table.
///
/// Stored alongside the regressor so inference standardizes features with
/// the same statistics training saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl FeatureScaler {
    /// Fit column means and standard deviations. Zero-variance columns get
    /// a unit divisor so transform stays finite.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let n_features = rows.first().map(|r| r.len()).unwrap_or(0);
        let n = rows.len().max(1) as f64;

        let mut mean = vec![0.0; n_features];
        for row in rows {
            for (m, &v) in mean.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }

        let mut std = vec![0.0; n_features];
        for row in rows {
            for ((s, &m), &v) in std.iter_mut().zip(mean.iter()).zip(row.iter()) {
                *s += (v - m) * (v - m);
            }
        }
        for s in std.iter_mut() {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Self { mean, std }
    }

    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(self.std.iter()))
            .map(|(&v, (&m, &s))| (v - m) / s)
            .collect()
    }

    pub fn transform_rows(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}
