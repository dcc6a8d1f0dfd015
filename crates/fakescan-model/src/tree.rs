//! CART regression tree shared by the forest and the boosting ensemble.
//!
//! Splits minimise the summed squared error of the children. On 0/1 class
//! targets this is the same criterion as Gini impurity, so the random forest
//! grows its classification trees with it directly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{Features, N_FEATURES};

const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split; `None` means all, in column order.
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grows a tree over `indices` (duplicates act as sample weights).
    ///
    /// `leaf_value` computes the prediction stored in each terminal node from
    /// the sample indices that reached it.
    pub(crate) fn fit<L>(
        x: &[Features],
        y: &[f64],
        indices: Vec<usize>,
        params: TreeParams,
        rng: &mut StdRng,
        leaf_value: L,
    ) -> Self
    where
        L: Fn(&[usize]) -> f64,
    {
        let mut nodes = vec![Node::Leaf(0.0)];
        let mut pending = vec![(0_usize, indices, 0_usize)];
        let mut feature_order: Vec<usize> = (0..N_FEATURES).collect();
        let max_features = params.max_features.unwrap_or(N_FEATURES).clamp(1, N_FEATURES);

        while let Some((slot, idx, depth)) = pending.pop() {
            let can_split = idx.len() >= params.min_samples_split.max(2)
                && params.max_depth.is_none_or(|limit| depth < limit);

            let split = if can_split {
                if params.max_features.is_some() {
                    feature_order.shuffle(rng);
                }
                best_split(x, y, &idx, &feature_order, max_features)
            } else {
                None
            };

            match split {
                Some(split) => {
                    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
                        .into_iter()
                        .partition(|&i| x[i][split.feature] <= split.threshold);
                    let left = nodes.len();
                    nodes.push(Node::Leaf(0.0));
                    let right = nodes.len();
                    nodes.push(Node::Leaf(0.0));
                    nodes[slot] = Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    };
                    pending.push((right, right_idx, depth + 1));
                    pending.push((left, left_idx, depth + 1));
                }
                None => nodes[slot] = Node::Leaf(leaf_value(&idx)),
            }
        }

        Self { nodes }
    }

    pub(crate) fn predict(&self, x: &Features) -> f64 {
        let mut at = 0;
        loop {
            match self.nodes[at] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => at = if x[feature] <= threshold { left } else { right },
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Mean target over `idx`; the leaf value for class-probability trees.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_target(y: &[f64], idx: &[usize]) -> f64 {
    if idx.is_empty() {
        return 0.0;
    }
    idx.iter().map(|&i| y[i]).sum::<f64>() / idx.len() as f64
}

/// Finds the best split among `order`, inspecting at least `max_features`
/// non-constant features and continuing past that until a valid split exists.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn best_split(
    x: &[Features],
    y: &[f64],
    idx: &[usize],
    order: &[usize],
    max_features: usize,
) -> Option<Split> {
    let n = idx.len() as f64;
    let (sum, sum_sq) = idx
        .iter()
        .fold((0.0, 0.0), |(s, sq), &i| (s + y[i], sq + y[i] * y[i]));
    let parent_sse = sum_sq - sum * sum / n;
    if parent_sse <= MIN_GAIN {
        return None;
    }

    let mut best: Option<Split> = None;
    let mut sorted = idx.to_vec();
    let mut visited = 0;

    for &feature in order {
        if visited >= max_features && best.is_some() {
            break;
        }

        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
        let lowest = x[sorted[0]][feature];
        let highest = x[sorted[sorted.len() - 1]][feature];
        if lowest == highest {
            continue;
        }
        visited += 1;

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 0..sorted.len() - 1 {
            let i = sorted[k];
            left_sum += y[i];
            left_sq += y[i] * y[i];

            let value = x[i][feature];
            let next = x[sorted[k + 1]][feature];
            if value == next {
                continue;
            }

            let n_left = (k + 1) as f64;
            let n_right = n - n_left;
            let right_sum = sum - left_sum;
            let right_sq = sum_sq - left_sq;
            let child_sse =
                (left_sq - left_sum * left_sum / n_left) + (right_sq - right_sum * right_sum / n_right);
            let gain = parent_sse - child_sse;

            if gain > MIN_GAIN && best.as_ref().is_none_or(|b| gain > b.gain) {
                let mid = value + (next - value) / 2.0;
                let threshold = if mid >= next { value } else { mid };
                best = Some(Split {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}
