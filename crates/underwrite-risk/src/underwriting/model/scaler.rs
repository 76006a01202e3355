use serde::{Deserialize, Serialize};

use crate::underwriting::scoring::ScoringError;

/// Per-feature standardization `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on row-major samples using the population standard deviation.
    /// Constant columns get a scale of 1 so they pass through centred.
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }

        let count = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (total, value) in mean.iter_mut().zip(row) {
                *total += value;
            }
        }
        for total in &mut mean {
            *total /= count;
        }

        let mut scale = vec![0.0; width];
        for row in rows {
            for ((acc, value), centre) in scale.iter_mut().zip(row).zip(&mean) {
                *acc += (value - centre).powi(2);
            }
        }
        for acc in &mut scale {
            let std = (*acc / count).sqrt();
            *acc = if std > 0.0 { std } else { 1.0 };
        }

        Some(Self { mean, scale })
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.scale.iter().any(|scale| !scale.is_finite() || *scale == 0.0)
            || self.mean.iter().any(|mean| !mean.is_finite())
        {
            return Err("scaler parameters must be finite with non-zero scale".to_string());
        }
        Ok(())
    }

    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScoringError> {
        if features.len() != self.len() {
            return Err(ScoringError::FeatureCount {
                expected: self.len(),
                found: features.len(),
            });
        }

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_centres_and_scales_columns() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let scaler = StandardScaler::fit(&rows).expect("fits");

        assert_eq!(scaler.mean, vec![2.0, 10.0]);
        assert_eq!(scaler.scale, vec![1.0, 1.0]);
        assert_eq!(
            scaler.transform(&[3.0, 12.0]).expect("transforms"),
            vec![1.0, 2.0]
        );
    }

    #[test]
    fn fit_rejects_ragged_or_empty_input() {
        assert!(StandardScaler::fit(&[]).is_none());
        assert!(StandardScaler::fit(&[vec![1.0], vec![1.0, 2.0]]).is_none());
    }

    #[test]
    fn transform_checks_width() {
        let scaler = StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        assert!(matches!(
            scaler.transform(&[1.0]),
            Err(ScoringError::FeatureCount {
                expected: 3,
                found: 1
            })
        ));
    }

    #[test]
    fn validate_flags_zero_scale() {
        let scaler = StandardScaler {
            mean: vec![0.0],
            scale: vec![0.0],
        };
        assert!(scaler.validate().is_err());
    }
}
