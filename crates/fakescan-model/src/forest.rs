//! Bagged tree ensemble (random forest).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::tree::{mean_target, RegressionTree, TreeParams};
use crate::{BaseLearner, Features, N_FEATURES};

#[derive(Debug, Clone)]
pub(crate) struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fits `n_estimators` fully grown trees, each on a bootstrap resample and
    /// drawing `sqrt(n_features)` candidate features per split.
    ///
    /// Tree `t` uses the seed `seed + t`, so the forest is reproducible.
    pub(crate) fn fit(x: &[Features], y: &[f64], n_estimators: usize, seed: u64) -> Self {
        let n = x.len();
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let max_features = ((N_FEATURES as f64).sqrt() as usize).max(1);
        let params = TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: Some(max_features),
        };

        let trees = (0..n_estimators)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                RegressionTree::fit(x, y, bootstrap, params, &mut rng, |idx| {
                    mean_target(y, idx)
                })
            })
            .collect();

        Self { trees }
    }
}

impl BaseLearner for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    #[allow(clippy::cast_precision_loss)]
    fn predict_proba(&self, x: &Features) -> [f64; 2] {
        if self.trees.is_empty() {
            return [0.5, 0.5];
        }
        let fake = self.trees.iter().map(|t| t.predict(x)).sum::<f64>() / self.trees.len() as f64;
        [1.0 - fake, fake]
    }
}
