//! Min-max feature scaling.

use crate::{Features, N_FEATURES};

/// Per-feature min-max scaler, fitted once on the training corpus.
///
/// A constant feature keeps a unit scale, so it maps to `x - min`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MinMaxScaler {
    min: Features,
    scale: Features,
}

impl MinMaxScaler {
    /// Fits the scaler. `rows` must be non-empty.
    pub(crate) fn fit<'a>(rows: impl IntoIterator<Item = &'a Features>) -> Self {
        let mut min = [f64::INFINITY; N_FEATURES];
        let mut max = [f64::NEG_INFINITY; N_FEATURES];
        for row in rows {
            for (j, &v) in row.iter().enumerate() {
                min[j] = min[j].min(v);
                max[j] = max[j].max(v);
            }
        }

        let mut scale = [1.0; N_FEATURES];
        for j in 0..N_FEATURES {
            let range = max[j] - min[j];
            if range.is_finite() && range > 0.0 {
                scale[j] = range;
            }
            if !min[j].is_finite() {
                min[j] = 0.0;
            }
        }
        Self { min, scale }
    }

    pub(crate) fn transform(&self, x: &Features) -> Features {
        let mut out = [0.0; N_FEATURES];
        for j in 0..N_FEATURES {
            out[j] = (x[j] - self.min[j]) / self.scale[j];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_training_range_onto_unit_interval() {
        let rows = [[0.0, 10.0, 5.0, 1.0], [100.0, 20.0, 5.0, 3.0]];
        let scaler = MinMaxScaler::fit(&rows);
        assert_eq!(scaler.transform(&rows[0]), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(scaler.transform(&rows[1]), [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(scaler.transform(&[50.0, 15.0, 5.0, 2.0]), [0.5, 0.5, 0.0, 0.5]);
    }

    #[test]
    fn values_outside_training_range_are_not_clipped() {
        let rows = [[0.0; 4], [10.0; 4]];
        let scaler = MinMaxScaler::fit(&rows);
        assert_eq!(scaler.transform(&[20.0; 4]), [2.0; 4]);
    }

    #[test]
    fn constant_feature_keeps_unit_scale() {
        let rows = [[7.0, 1.0, 1.0, 1.0], [7.0, 2.0, 2.0, 2.0]];
        let scaler = MinMaxScaler::fit(&rows);
        assert_eq!(scaler.transform(&[9.0, 1.0, 1.0, 1.0])[0], 2.0);
    }
}
