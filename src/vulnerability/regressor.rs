// Gradient-boosted regression tree ensemble for vulnerability prediction
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Hyperparameters for ensemble training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// Fraction of rows drawn (without replacement) per boosting round.
    pub subsample: f64,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        TrainingParams {
            n_estimators: 200,
            max_depth: 5,
            learning_rate: 0.05,
            subsample: 0.8,
            min_samples_split: 4,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, features: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if features[*feature] <= *threshold {
                    left.predict(features)
                } else {
                    right.predict(features)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegressionTree {
    root: TreeNode,
}

impl RegressionTree {
    /// Fit a depth-limited least-squares tree to (rows, targets),
    /// accumulating per-feature squared-error gains into `importances`.
    fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        max_depth: usize,
        min_samples_split: usize,
        importances: &mut [f64],
    ) -> Self {
        let root = build_node(rows, targets, indices, max_depth, min_samples_split, importances);
        RegressionTree { root }
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.root.predict(features)
    }
}

fn mean_of(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

fn sse_of(targets: &[f64], indices: &[usize]) -> f64 {
    let m = mean_of(targets, indices);
    indices.iter().map(|&i| (targets[i] - m) * (targets[i] - m)).sum()
}

/// Candidate thresholds for a feature: midpoints between distinct sorted
/// values, thinned to at most 32 to bound split-search cost.
fn candidate_thresholds(rows: &[Vec<f64>], indices: &[usize], feature: usize) -> Vec<f64> {
    let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feature]).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup();
    if values.len() < 2 {
        return Vec::new();
    }
    let midpoints: Vec<f64> = values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    if midpoints.len() <= 32 {
        return midpoints;
    }
    let stride = midpoints.len() as f64 / 32.0;
    (0..32)
        .map(|k| midpoints[(k as f64 * stride) as usize])
        .collect()
}

fn build_node(
    rows: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    depth_left: usize,
    min_samples_split: usize,
    importances: &mut [f64],
) -> TreeNode {
    if depth_left == 0 || indices.len() < min_samples_split {
        return TreeNode::Leaf {
            value: mean_of(targets, indices),
        };
    }

    let parent_sse = sse_of(targets, indices);
    if parent_sse <= f64::EPSILON {
        return TreeNode::Leaf {
            value: mean_of(targets, indices),
        };
    }

    let n_features = rows[indices[0]].len();
    let mut best: Option<(usize, f64, f64, Vec<usize>, Vec<usize>)> = None;

    for feature in 0..n_features {
        for threshold in candidate_thresholds(rows, indices, feature) {
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| rows[i][feature] <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let gain = parent_sse - sse_of(targets, &left) - sse_of(targets, &right);
            let improved = match &best {
                Some((_, _, best_gain, _, _)) => gain > *best_gain,
                None => gain > 0.0,
            };
            if improved {
                best = Some((feature, threshold, gain, left, right));
            }
        }
    }

    match best {
        Some((feature, threshold, gain, left, right)) => {
            importances[feature] += gain;
            TreeNode::Split {
                feature,
                threshold,
                left: Box::new(build_node(
                    rows,
                    targets,
                    &left,
                    depth_left - 1,
                    min_samples_split,
                    importances,
                )),
                right: Box::new(build_node(
                    rows,
                    targets,
                    &right,
                    depth_left - 1,
                    min_samples_split,
                    importances,
                )),
            }
        }
        None => TreeNode::Leaf {
            value: mean_of(targets, indices),
        },
    }
}

/// Gradient-boosted ensemble of least-squares regression trees.
///
/// Trained offline; at forecast time it is shared read-only across units,
/// so prediction takes `&self` and touches no interior state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    base_prediction: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
    /// Normalized squared-error gain per feature, summing to 1.
    feature_importances: Vec<f64>,
}

impl GradientBoostedRegressor {
    pub fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        params: &TrainingParams,
    ) -> Result<Self, ForecastError> {
        if rows.is_empty() || rows.len() != targets.len() {
            return Err(ForecastError::Training {
                message: format!(
                    "training table shape invalid: {} rows, {} targets",
                    rows.len(),
                    targets.len()
                ),
            });
        }

        let n = rows.len();
        let base_prediction = targets.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![base_prediction; n];
        let mut residuals = vec![0.0; n];
        let mut importances = vec![0.0; rows[0].len()];
        let mut trees = Vec::with_capacity(params.n_estimators);

        let mut rng = StdRng::seed_from_u64(params.seed);
        let subsample_size = ((n as f64 * params.subsample).round() as usize).clamp(1, n);
        let mut all_indices: Vec<usize> = (0..n).collect();

        for _ in 0..params.n_estimators {
            for i in 0..n {
                residuals[i] = targets[i] - predictions[i];
            }

            all_indices.shuffle(&mut rng);
            let round_indices = &all_indices[..subsample_size];

            let tree = RegressionTree::fit(
                rows,
                &residuals,
                round_indices,
                params.max_depth,
                params.min_samples_split,
                &mut importances,
            );

            for i in 0..n {
                predictions[i] += params.learning_rate * tree.predict(&rows[i]);
            }
            trees.push(tree);
        }

        let total_gain: f64 = importances.iter().sum();
        if total_gain > 0.0 {
            for imp in importances.iter_mut() {
                *imp /= total_gain;
            }
        }

        Ok(GradientBoostedRegressor {
            base_prediction,
            learning_rate: params.learning_rate,
            trees,
            feature_importances: importances,
        })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        self.base_prediction + self.learning_rate * boost
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic_table(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64 / n as f64, ((i * 7) % n) as f64 / n as f64])
            .collect();
        let targets: Vec<f64> = rows.iter().map(|r| 2.0 * r[0] * r[0] + 0.5).collect();
        (rows, targets)
    }

    #[test]
    fn test_fit_reduces_error_below_baseline() {
        let (rows, targets) = quadratic_table(120);
        let params = TrainingParams {
            n_estimators: 50,
            ..TrainingParams::default()
        };
        let model = GradientBoostedRegressor::fit(&rows, &targets, &params).unwrap();

        let baseline = targets.iter().sum::<f64>() / targets.len() as f64;
        let baseline_sse: f64 = targets.iter().map(|t| (t - baseline).powi(2)).sum();
        let model_sse: f64 = rows
            .iter()
            .zip(targets.iter())
            .map(|(r, t)| (t - model.predict(r)).powi(2))
            .sum();

        assert!(model_sse < baseline_sse * 0.2);
    }

    #[test]
    fn test_importances_normalized_and_informative() {
        let (rows, targets) = quadratic_table(120);
        let params = TrainingParams {
            n_estimators: 30,
            ..TrainingParams::default()
        };
        let model = GradientBoostedRegressor::fit(&rows, &targets, &params).unwrap();

        let sum: f64 = model.feature_importances().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // Feature 0 drives the target; feature 1 is noise.
        assert!(model.feature_importances()[0] > model.feature_importances()[1]);
    }

    #[test]
    fn test_fit_is_deterministic_for_fixed_seed() {
        let (rows, targets) = quadratic_table(60);
        let params = TrainingParams {
            n_estimators: 10,
            ..TrainingParams::default()
        };
        let a = GradientBoostedRegressor::fit(&rows, &targets, &params).unwrap();
        let b = GradientBoostedRegressor::fit(&rows, &targets, &params).unwrap();
        assert_eq!(a.predict(&rows[3]), b.predict(&rows[3]));
    }

    #[test]
    fn test_fit_rejects_empty_table() {
        let err = GradientBoostedRegressor::fit(&[], &[], &TrainingParams::default());
        assert!(err.is_err());
    }
}
