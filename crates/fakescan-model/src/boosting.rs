//! Binary log-loss gradient boosting over shallow regression trees.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::tree::{mean_target, RegressionTree, TreeParams};
use crate::{sigmoid, BaseLearner, Features};

#[derive(Debug, Clone)]
pub(crate) struct GradientBoosting {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    /// Fits `n_stages` trees of depth `max_depth` to the log-loss gradient.
    ///
    /// The initial raw score is the log-odds of the class prior; each leaf
    /// holds a single Newton step `sum(residual) / sum(p * (1 - p))`.
    /// `y` must contain both classes.
    pub(crate) fn fit(
        x: &[Features],
        y: &[f64],
        n_stages: usize,
        learning_rate: f64,
        max_depth: usize,
        seed: u64,
    ) -> Self {
        let n = x.len();
        let all: Vec<usize> = (0..n).collect();
        let prior = mean_target(y, &all).clamp(1e-12, 1.0 - 1e-12);
        let init = (prior / (1.0 - prior)).ln();

        let params = TreeParams {
            max_depth: Some(max_depth),
            min_samples_split: 2,
            max_features: None,
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut raw = vec![init; n];
        let mut trees = Vec::with_capacity(n_stages);

        for _ in 0..n_stages {
            let prob: Vec<f64> = raw.iter().map(|&f| sigmoid(f)).collect();
            let residual: Vec<f64> = y.iter().zip(&prob).map(|(t, p)| t - p).collect();

            let tree = RegressionTree::fit(x, &residual, all.clone(), params, &mut rng, |idx| {
                newton_step(idx, &residual, &prob)
            });
            for (score, row) in raw.iter_mut().zip(x) {
                *score += learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Self {
            init,
            learning_rate,
            trees,
        }
    }

    fn raw_score(&self, x: &Features) -> f64 {
        self.init
            + self.learning_rate * self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }
}

fn newton_step(idx: &[usize], residual: &[f64], prob: &[f64]) -> f64 {
    let numerator: f64 = idx.iter().map(|&i| residual[i]).sum();
    let denominator: f64 = idx.iter().map(|&i| prob[i] * (1.0 - prob[i])).sum();
    if denominator.abs() < 1e-150 {
        0.0
    } else {
        numerator / denominator
    }
}

impl BaseLearner for GradientBoosting {
    fn name(&self) -> &'static str {
        "gradient_boosting"
    }

    fn predict_proba(&self, x: &Features) -> [f64; 2] {
        let fake = sigmoid(self.raw_score(x));
        [1.0 - fake, fake]
    }
}
