//! L2-regularised logistic regression fitted with Newton's method.

use crate::{sigmoid, BaseLearner, Features, N_FEATURES};

/// Weights plus intercept.
const N_PARAMS: usize = N_FEATURES + 1;
const TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone)]
pub(crate) struct LogisticRegression {
    weights: Features,
    intercept: f64,
}

impl LogisticRegression {
    /// Minimises `sum(log_loss) + ||w||^2 / (2C)`; the intercept is not
    /// penalised. Stops after `max_iter` Newton steps or once the step is
    /// below tolerance.
    pub(crate) fn fit(x: &[Features], y: &[f64], c: f64, max_iter: usize) -> Self {
        let mut beta = [0.0; N_PARAMS];

        for iteration in 0..max_iter {
            let mut grad = [0.0; N_PARAMS];
            let mut hess = [[0.0; N_PARAMS]; N_PARAMS];

            for (row, &target) in x.iter().zip(y) {
                let design = with_bias(row);
                let z: f64 = design.iter().zip(&beta).map(|(a, b)| a * b).sum();
                let p = sigmoid(z);
                let weight = p * (1.0 - p);
                for j in 0..N_PARAMS {
                    grad[j] += (p - target) * design[j];
                    for k in 0..N_PARAMS {
                        hess[j][k] += weight * design[j] * design[k];
                    }
                }
            }
            for j in 0..N_FEATURES {
                grad[j] += beta[j] / c;
                hess[j][j] += 1.0 / c;
            }

            let Some(step) = solve(hess, grad) else {
                tracing::warn!(iteration, "logistic regression hessian is singular; stopping");
                break;
            };
            for (b, s) in beta.iter_mut().zip(step) {
                *b -= s;
            }
            if step.iter().all(|s| s.abs() < TOLERANCE) {
                break;
            }
        }

        let mut weights = [0.0; N_FEATURES];
        weights.copy_from_slice(&beta[..N_FEATURES]);
        Self {
            weights,
            intercept: beta[N_FEATURES],
        }
    }
}

impl BaseLearner for LogisticRegression {
    fn name(&self) -> &'static str {
        "logistic_regression"
    }

    fn predict_proba(&self, x: &Features) -> [f64; 2] {
        let z = self.intercept + self.weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>();
        let fake = sigmoid(z);
        [1.0 - fake, fake]
    }
}

fn with_bias(row: &Features) -> [f64; N_PARAMS] {
    let mut out = [1.0; N_PARAMS];
    out[..N_FEATURES].copy_from_slice(row);
    out
}

/// Solves `a * x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: [[f64; N_PARAMS]; N_PARAMS], mut b: [f64; N_PARAMS]) -> Option<[f64; N_PARAMS]> {
    for col in 0..N_PARAMS {
        let pivot = (col..N_PARAMS).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-300 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..N_PARAMS {
            let factor = a[row][col] / a[col][col];
            for k in col..N_PARAMS {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; N_PARAMS];
    for row in (0..N_PARAMS).rev() {
        let tail: f64 = (row + 1..N_PARAMS).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
