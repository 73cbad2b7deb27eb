//! Numeric standardizer.
//!
//! Learns a per-column mean and population standard deviation, then maps
//! `x` to `(x - mean) / std`. A column with zero spread maps every value to
//! 0.0 instead of dividing by zero.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};

/// Number of standardized numeric columns: runtime, vote average
pub const NUMERIC_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl StandardScaler {
    /// Fit column statistics over all samples.
    ///
    /// Accumulates in f64 so large catalogs don't drift.
    pub fn fit(samples: &[[f32; NUMERIC_COLUMNS]]) -> Result<Self> {
        if samples.is_empty() {
            return Err(RecommendError::InsufficientData(
                "cannot fit a scaler on zero rows".to_string(),
            ));
        }

        let n = samples.len() as f64;
        let mut mean = Vec::with_capacity(NUMERIC_COLUMNS);
        let mut std = Vec::with_capacity(NUMERIC_COLUMNS);

        for col in 0..NUMERIC_COLUMNS {
            let col_mean = samples.iter().map(|s| s[col] as f64).sum::<f64>() / n;
            let variance = samples
                .iter()
                .map(|s| {
                    let d = s[col] as f64 - col_mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            mean.push(col_mean as f32);
            std.push(variance.sqrt() as f32);
        }

        Ok(Self { mean, std })
    }

    /// Build a scaler from known parameters
    pub fn from_params(mean: [f32; NUMERIC_COLUMNS], std: [f32; NUMERIC_COLUMNS]) -> Self {
        Self {
            mean: mean.to_vec(),
            std: std.to_vec(),
        }
    }

    pub fn transform(&self, sample: [f32; NUMERIC_COLUMNS]) -> [f32; NUMERIC_COLUMNS] {
        let mut out = [0.0; NUMERIC_COLUMNS];
        for (col, value) in sample.into_iter().enumerate() {
            let std = self.std[col];
            out[col] = if std > 0.0 {
                (value - self.mean[col]) / std
            } else {
                0.0
            };
        }
        out
    }

    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    pub fn std(&self) -> &[f32] {
        &self.std
    }

    /// A deserialized scaler must carry one finite parameter pair per column
    pub(crate) fn check(&self) -> Result<()> {
        let well_formed = self.mean.len() == NUMERIC_COLUMNS
            && self.std.len() == NUMERIC_COLUMNS
            && self.mean.iter().chain(&self.std).all(|v| v.is_finite())
            && self.std.iter().all(|&s| s >= 0.0);
        if well_formed {
            Ok(())
        } else {
            Err(RecommendError::EncoderMismatch {
                expected: format!("{} finite scaler columns", NUMERIC_COLUMNS),
                found: format!("mean={:?} std={:?}", self.mean, self.std),
            })
        }
    }
}
