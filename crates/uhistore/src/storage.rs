//! Bin storage and per-bin accumulators.
//!
//! Storage is a flat vector with one accumulator per bin, flow bins
//! included, flattened row-major (last axis varies fastest).

use crate::types::StorageKind;

/// Sum of weights and sum of squared weights.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedSum {
    pub value: f64,
    pub variance: f64,
}

impl WeightedSum {
    pub fn fill(&mut self, weight: f64) {
        self.value += weight;
        self.variance += weight * weight;
    }
}

/// Count, running mean and sample variance of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mean {
    pub count: f64,
    pub value: f64,
    pub variance: f64,
}

impl Mean {
    /// Add `sample` with weight `weight` (Welford update).
    pub fn fill(&mut self, weight: f64, sample: f64) {
        let mut m2 = if self.count > 1.0 {
            self.variance * (self.count - 1.0)
        } else {
            0.0
        };
        self.count += weight;
        let delta = sample - self.value;
        self.value += weight * delta / self.count;
        m2 += weight * delta * (sample - self.value);
        self.variance = if self.count > 1.0 {
            m2 / (self.count - 1.0)
        } else {
            0.0
        };
    }
}

/// Weighted count, weighted mean and weighted sample variance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedMean {
    pub sum_of_weights: f64,
    pub sum_of_weights_squared: f64,
    pub value: f64,
    pub variance: f64,
}

impl WeightedMean {
    fn effective_denominator(&self) -> f64 {
        if self.sum_of_weights == 0.0 {
            0.0
        } else {
            self.sum_of_weights - self.sum_of_weights_squared / self.sum_of_weights
        }
    }

    pub fn fill(&mut self, weight: f64, sample: f64) {
        let denom = self.effective_denominator();
        let mut m2 = if denom > 0.0 { self.variance * denom } else { 0.0 };
        self.sum_of_weights += weight;
        self.sum_of_weights_squared += weight * weight;
        let delta = sample - self.value;
        self.value += weight * delta / self.sum_of_weights;
        m2 += weight * delta * (sample - self.value);
        let denom = self.effective_denominator();
        self.variance = if denom > 0.0 { m2 / denom } else { 0.0 };
    }
}

/// Per-bin storage of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    Int(Vec<i64>),
    Double(Vec<f64>),
    Weight(Vec<WeightedSum>),
    Mean(Vec<Mean>),
    WeightedMean(Vec<WeightedMean>),
}

impl Storage {
    /// `len` empty bins of the given kind.
    pub fn zeroed(kind: StorageKind, len: usize) -> Self {
        match kind {
            StorageKind::Int => Storage::Int(vec![0; len]),
            StorageKind::Double => Storage::Double(vec![0.0; len]),
            StorageKind::Weighted => Storage::Weight(vec![WeightedSum::default(); len]),
            StorageKind::Mean => Storage::Mean(vec![Mean::default(); len]),
            StorageKind::WeightedMean => {
                Storage::WeightedMean(vec![WeightedMean::default(); len])
            }
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            Storage::Int(_) => StorageKind::Int,
            Storage::Double(_) => StorageKind::Double,
            Storage::Weight(_) => StorageKind::Weighted,
            Storage::Mean(_) => StorageKind::Mean,
            Storage::WeightedMean(_) => StorageKind::WeightedMean,
        }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        match self {
            Storage::Int(v) => v.len(),
            Storage::Double(v) => v.len(),
            Storage::Weight(v) => v.len(),
            Storage::Mean(v) => v.len(),
            Storage::WeightedMean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bin values: counts, sums of weights, or means.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Storage::Int(v) => v.iter().map(|&c| c as f64).collect(),
            Storage::Double(v) => v.clone(),
            Storage::Weight(v) => v.iter().map(|b| b.value).collect(),
            Storage::Mean(v) => v.iter().map(|b| b.value).collect(),
            Storage::WeightedMean(v) => v.iter().map(|b| b.value).collect(),
        }
    }

    /// Per-bin variances, for storages that track them.
    pub fn variances(&self) -> Option<Vec<f64>> {
        match self {
            Storage::Int(_) | Storage::Double(_) => None,
            Storage::Weight(v) => Some(v.iter().map(|b| b.variance).collect()),
            Storage::Mean(v) => Some(v.iter().map(|b| b.variance).collect()),
            Storage::WeightedMean(v) => Some(v.iter().map(|b| b.variance).collect()),
        }
    }

    /// Per-bin sample counts of a mean storage.
    pub fn counts(&self) -> Option<Vec<f64>> {
        match self {
            Storage::Mean(v) => Some(v.iter().map(|b| b.count).collect()),
            _ => None,
        }
    }

    pub fn sum_of_weights(&self) -> Option<Vec<f64>> {
        match self {
            Storage::WeightedMean(v) => Some(v.iter().map(|b| b.sum_of_weights).collect()),
            _ => None,
        }
    }

    pub fn sum_of_weights_squared(&self) -> Option<Vec<f64>> {
        match self {
            Storage::WeightedMean(v) => {
                Some(v.iter().map(|b| b.sum_of_weights_squared).collect())
            }
            _ => None,
        }
    }
}

/// Stack `(values, variances)` into weighted-sum accumulators.
pub fn stack_weighted(values: &[f64], variances: &[f64]) -> Vec<WeightedSum> {
    values
        .iter()
        .zip(variances)
        .map(|(&value, &variance)| WeightedSum { value, variance })
        .collect()
}

/// Stack `(counts, values, variances)` into mean accumulators.
pub fn stack_mean(counts: &[f64], values: &[f64], variances: &[f64]) -> Vec<Mean> {
    counts
        .iter()
        .zip(values)
        .zip(variances)
        .map(|((&count, &value), &variance)| Mean {
            count,
            value,
            variance,
        })
        .collect()
}

/// Stack `(sum_of_weights, sum_of_weights_squared, values, variances)` into
/// weighted-mean accumulators.
pub fn stack_weighted_mean(
    sum_of_weights: &[f64],
    sum_of_weights_squared: &[f64],
    values: &[f64],
    variances: &[f64],
) -> Vec<WeightedMean> {
    sum_of_weights
        .iter()
        .zip(sum_of_weights_squared)
        .zip(values)
        .zip(variances)
        .map(|(((&sw, &sw2), &value), &variance)| WeightedMean {
            sum_of_weights: sw,
            sum_of_weights_squared: sw2,
            value,
            variance,
        })
        .collect()
}
