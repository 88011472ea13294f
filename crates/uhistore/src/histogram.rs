//! Histograms: axes, bin storage and metadata.

use std::collections::BTreeMap;

use crate::axis::{Axis, AxisValue};
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::types::StorageKind;

/// Scalar metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Str(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::Int(v)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Float(v)
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        MetaValue::Bool(v)
    }
}

/// Key-ordered metadata mapping.
pub type Metadata = BTreeMap<String, MetaValue>;

pub static EMPTY_METADATA: Metadata = BTreeMap::new();

/// Number of bins spanned by `axes`, flow bins included; `None` on overflow.
pub fn grid_size(axes: &[Axis]) -> Option<usize> {
    axes.iter().try_fold(1usize, |acc, axis| acc.checked_mul(axis.extent()))
}

/// A multi-dimensional histogram.
///
/// The storage holds one accumulator per bin of the grid spanned by the axes,
/// flow bins included, flattened row-major.
///
/// ```
/// use uhistore::{Histogram, RegularAxis, StorageKind};
///
/// let axes = vec![RegularAxis::new(10, 0.0, 10.0).into()];
/// let mut h = Histogram::new(axes, StorageKind::Int).unwrap();
/// h.fill(&[0.5.into()]);
/// assert_eq!(h.shape(), vec![12]);
/// assert_eq!(h.values()[1], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    axes: Vec<Axis>,
    storage: Storage,
    metadata: Option<Metadata>,
}

impl Histogram {
    /// Empty histogram with zeroed storage of the given kind.
    ///
    /// Fails with [`Error::GridOverflow`] when the bin count does not fit
    /// in `usize`.
    pub fn new(axes: Vec<Axis>, kind: StorageKind) -> Result<Self> {
        let size = grid_size(&axes).ok_or(Error::GridOverflow {
            path: String::new(),
        })?;
        Ok(Self {
            axes,
            storage: Storage::zeroed(kind, size),
            metadata: None,
        })
    }

    /// Assemble a histogram from already populated storage.
    pub fn from_parts(
        axes: Vec<Axis>,
        storage: Storage,
        metadata: Option<Metadata>,
    ) -> Result<Self> {
        let expected = grid_size(&axes).ok_or(Error::GridOverflow {
            path: String::new(),
        })?;
        if storage.len() != expected {
            return Err(Error::ShapeMismatch {
                path: String::new(),
                expected,
                found: storage.len(),
            });
        }
        Ok(Self {
            axes,
            storage,
            metadata,
        })
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.storage.kind()
    }

    /// Histogram metadata; empty when there is none.
    pub fn metadata(&self) -> &Metadata {
        self.metadata.as_ref().unwrap_or(&EMPTY_METADATA)
    }

    pub fn metadata_opt(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: Option<Metadata>) {
        self.metadata = metadata;
    }

    /// Per-axis extents, flow bins included.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::extent).collect()
    }

    /// Total number of bins.
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    /// Bin values in storage order, flow bins included. Along an axis with
    /// an underflow bin, index 0 is that underflow bin.
    pub fn values(&self) -> Vec<f64> {
        self.storage.values()
    }

    pub fn variances(&self) -> Option<Vec<f64>> {
        self.storage.variances()
    }

    pub fn counts(&self) -> Option<Vec<f64>> {
        self.storage.counts()
    }

    /// Bin values, with flow bins only when `flow` is set.
    ///
    /// `values_flow(false)[0]` is the first regular bin.
    pub fn values_flow(&self, flow: bool) -> Vec<f64> {
        self.project(flow, self.values())
    }

    pub fn variances_flow(&self, flow: bool) -> Option<Vec<f64>> {
        self.variances().map(|v| self.project(flow, v))
    }

    pub fn counts_flow(&self, flow: bool) -> Option<Vec<f64>> {
        self.counts().map(|v| self.project(flow, v))
    }

    fn project(&self, flow: bool, all: Vec<f64>) -> Vec<f64> {
        if flow {
            return all;
        }
        self.inner_indices().into_iter().map(|i| all[i]).collect()
    }

    /// Flat indices of the bins that are not flow bins, in storage order.
    fn inner_indices(&self) -> Vec<usize> {
        let spans: Vec<(usize, usize, usize)> = self
            .axes
            .iter()
            .map(|a| {
                let lo = usize::from(a.traits().underflow);
                (a.extent(), lo, lo + a.bins())
            })
            .collect();
        (0..self.size())
            .filter(|&flat| {
                let mut rest = flat;
                spans.iter().rev().all(|&(extent, lo, hi)| {
                    let i = rest % extent;
                    rest /= extent;
                    (lo..hi).contains(&i)
                })
            })
            .collect()
    }

    fn flat_index(&self, coords: &[AxisValue]) -> Option<usize> {
        if coords.len() != self.axes.len() {
            return None;
        }
        let mut flat = 0;
        for (axis, value) in self.axes.iter().zip(coords) {
            flat = flat * axis.extent() + axis.index(value)?;
        }
        Some(flat)
    }

    /// Count one entry. Returns `false` when the coordinates fall outside
    /// every bin.
    pub fn fill(&mut self, coords: &[AxisValue]) -> bool {
        self.fill_weighted(coords, 1.0)
    }

    /// Add `weight` to the bin at `coords`.
    ///
    /// Integer storage adds the weight truncated to an integer. Mean storages
    /// treat the entry as a sample of value zero.
    pub fn fill_weighted(&mut self, coords: &[AxisValue], weight: f64) -> bool {
        let Some(i) = self.flat_index(coords) else {
            return false;
        };
        match &mut self.storage {
            Storage::Int(v) => v[i] += weight as i64,
            Storage::Double(v) => v[i] += weight,
            Storage::Weight(v) => v[i].fill(weight),
            Storage::Mean(v) => v[i].fill(weight, 0.0),
            Storage::WeightedMean(v) => v[i].fill(weight, 0.0),
        }
        true
    }

    /// Add a weighted `sample` to the bin at `coords`.
    ///
    /// Counting storages ignore the sample and add the weight.
    pub fn fill_sample(&mut self, coords: &[AxisValue], weight: f64, sample: f64) -> bool {
        let Some(i) = self.flat_index(coords) else {
            return false;
        };
        match &mut self.storage {
            Storage::Mean(v) => v[i].fill(weight, sample),
            Storage::WeightedMean(v) => v[i].fill(weight, sample),
            Storage::Int(v) => v[i] += weight as i64,
            Storage::Double(v) => v[i] += weight,
            Storage::Weight(v) => v[i].fill(weight),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{BooleanAxis, RegularAxis, StrCategoryAxis};

    #[test]
    fn new_allocates_full_grid() {
        let h = Histogram::new(
            vec![
                RegularAxis::new(3, 0.0, 3.0).into(),
                BooleanAxis::new().into(),
            ],
            StorageKind::Double,
        ).unwrap();
        assert_eq!(h.shape(), vec![5, 2]);
        assert_eq!(h.size(), 10);
        assert!(h.metadata().is_empty());
        assert!(h.metadata_opt().is_none());
    }

    #[test]
    fn fill_is_row_major() {
        let mut h = Histogram::new(
            vec![
                StrCategoryAxis::new(["a", "b"]).with_flow(false).into(),
                BooleanAxis::new().into(),
            ],
            StorageKind::Int,
        ).unwrap();
        assert!(h.fill(&["b".into(), true.into()]));
        assert!(h.fill(&["a".into(), true.into()]));
        assert!(!h.fill(&["c".into(), true.into()]));
        assert!(!h.fill(&["a".into()]));
        assert_eq!(h.values(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn weighted_fill_tracks_variance() {
        let mut h = Histogram::new(
            vec![RegularAxis::new(10, 0.0, 10.0).into()],
            StorageKind::Weighted,
        ).unwrap();
        for x in [0.3, 0.3, 0.4, 1.2] {
            h.fill(&[x.into()]);
        }
        let values = h.values();
        let variances = h.variances().unwrap();
        assert_eq!((values[1], variances[1]), (3.0, 3.0));
        assert_eq!((values[2], variances[2]), (1.0, 1.0));
    }

    #[test]
    fn from_parts_checks_length() {
        let axes: Vec<Axis> = vec![RegularAxis::new(2, 0.0, 1.0).into()];
        let err = Histogram::from_parts(axes.clone(), Storage::Double(vec![0.0; 3]), None)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 4, found: 3, .. }));
        assert!(Histogram::from_parts(axes, Storage::Double(vec![0.0; 4]), None).is_ok());
    }

    #[test]
    fn overflowing_grid_is_rejected() {
        let wide: Axis = RegularAxis::new(usize::MAX / 2, 0.0, 1.0).into();
        assert_eq!(grid_size(&[wide.clone()]), Some(usize::MAX / 2 + 2));
        let err = Histogram::new(vec![wide.clone(), wide], StorageKind::Int).unwrap_err();
        assert!(matches!(err, Error::GridOverflow { .. }));
    }

    #[test]
    fn flow_views_skip_flow_bins() {
        let mut h = Histogram::new(
            vec![
                RegularAxis::new(2, 0.0, 2.0).into(),
                StrCategoryAxis::new(["a", "b"]).into(),
            ],
            StorageKind::Weighted,
        )
        .unwrap();
        h.fill(&[0.5.into(), "a".into()]);
        h.fill_weighted(&[1.5.into(), "b".into()], 2.0);
        h.fill(&[(-1.0).into(), "a".into()]);
        h.fill(&[0.5.into(), "z".into()]);

        assert_eq!(h.values_flow(true), h.values());
        assert_eq!(h.values_flow(false), vec![1.0, 0.0, 0.0, 2.0]);
        assert_eq!(h.variances_flow(false).unwrap(), vec![1.0, 0.0, 0.0, 4.0]);
        assert!(h.counts_flow(false).is_none());
    }

    #[test]
    fn zero_axes_is_a_single_bin() {
        let mut h = Histogram::new(Vec::new(), StorageKind::Int).unwrap();
        assert_eq!(h.size(), 1);
        assert!(h.fill(&[]));
        assert_eq!(h.values(), vec![1.0]);
    }
}
