//! Histogram axes.
//!
//! Each axis maps a coordinate to a bin index. Bin indices returned by
//! [`Axis::index`] are storage indices: when an axis has an underflow bin it
//! occupies index 0 and the regular bins start at 1.

use crate::histogram::{Metadata, EMPTY_METADATA};
use crate::types::AxisKind;

/// Evenly spaced bins over `[lower, upper)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularAxis {
    pub bins: usize,
    pub lower: f64,
    pub upper: f64,
    pub underflow: bool,
    pub overflow: bool,
    pub circular: bool,
    pub metadata: Option<Metadata>,
}

impl RegularAxis {
    /// `bins` bins between `lower` and `upper` with both flow bins enabled.
    pub fn new(bins: usize, lower: f64, upper: f64) -> Self {
        Self {
            bins,
            lower,
            upper,
            underflow: true,
            overflow: true,
            circular: false,
            metadata: None,
        }
    }

    pub fn with_flow(mut self, underflow: bool, overflow: bool) -> Self {
        self.underflow = underflow;
        self.overflow = overflow;
        self
    }

    /// Wrap coordinates around the range.
    pub fn circular(mut self) -> Self {
        self.circular = true;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The `bins + 1` bin edges.
    pub fn edges(&self) -> Vec<f64> {
        let width = (self.upper - self.lower) / self.bins as f64;
        (0..=self.bins)
            .map(|i| self.lower + width * i as f64)
            .collect()
    }

    fn bin_of(&self, x: f64) -> Option<usize> {
        let span = self.upper - self.lower;
        let mut t = (x - self.lower) / span;
        if self.circular && t.is_finite() {
            // values just below `lower` round up to 1.0 once wrapped
            t = (t - t.floor()).min(1.0 - f64::EPSILON);
        }
        if t.is_nan() {
            return None;
        }
        if t < 0.0 {
            return self.underflow.then_some(0);
        }
        if t >= 1.0 {
            return self.overflow.then_some(self.bins + usize::from(self.underflow));
        }
        if self.bins == 0 {
            return None;
        }
        let bin = ((t * self.bins as f64) as usize).min(self.bins.saturating_sub(1));
        Some(bin + usize::from(self.underflow))
    }
}

/// Bins with explicitly listed, increasing edges.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableAxis {
    pub edges: Vec<f64>,
    pub underflow: bool,
    pub overflow: bool,
    pub circular: bool,
    pub metadata: Option<Metadata>,
}

impl VariableAxis {
    pub fn new(edges: Vec<f64>) -> Self {
        Self {
            edges,
            underflow: true,
            overflow: true,
            circular: false,
            metadata: None,
        }
    }

    pub fn with_flow(mut self, underflow: bool, overflow: bool) -> Self {
        self.underflow = underflow;
        self.overflow = overflow;
        self
    }

    pub fn circular(mut self) -> Self {
        self.circular = true;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    fn bin_of(&self, x: f64) -> Option<usize> {
        let (first, last) = match (self.edges.first(), self.edges.last()) {
            (Some(&f), Some(&l)) if self.edges.len() >= 2 => (f, l),
            _ => return None,
        };
        let mut x = x;
        if self.circular && x.is_finite() {
            let span = last - first;
            x = first + (x - first).rem_euclid(span);
            if x >= last {
                return Some(self.bins() - 1 + usize::from(self.underflow));
            }
        }
        if x.is_nan() {
            return None;
        }
        let u = usize::from(self.underflow);
        if x < first {
            return self.underflow.then_some(0);
        }
        if x >= last {
            return self.overflow.then_some(self.bins() + u);
        }
        let bin = self.edges.partition_point(|&e| e <= x) - 1;
        Some(bin + u)
    }
}

/// Two bins: false and true. No flow bins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BooleanAxis {
    pub metadata: Option<Metadata>,
}

impl BooleanAxis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One bin per listed integer; `flow` adds a bin for unlisted values.
#[derive(Debug, Clone, PartialEq)]
pub struct IntCategoryAxis {
    pub categories: Vec<i64>,
    pub flow: bool,
    pub metadata: Option<Metadata>,
}

impl IntCategoryAxis {
    pub fn new(categories: Vec<i64>) -> Self {
        Self {
            categories,
            flow: true,
            metadata: None,
        }
    }

    pub fn with_flow(mut self, flow: bool) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One bin per listed string; `flow` adds a bin for unlisted values.
#[derive(Debug, Clone, PartialEq)]
pub struct StrCategoryAxis {
    pub categories: Vec<String>,
    pub flow: bool,
    pub metadata: Option<Metadata>,
}

impl StrCategoryAxis {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            flow: true,
            metadata: None,
        }
    }

    pub fn with_flow(mut self, flow: bool) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Unit-width integer bins over `[start, stop)`.
///
/// The container schema has no spelling for this axis; histograms using it
/// cannot be written.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerAxis {
    pub start: i64,
    pub stop: i64,
    pub underflow: bool,
    pub overflow: bool,
    pub circular: bool,
    pub metadata: Option<Metadata>,
}

impl IntegerAxis {
    pub fn new(start: i64, stop: i64) -> Self {
        Self {
            start,
            stop,
            underflow: true,
            overflow: true,
            circular: false,
            metadata: None,
        }
    }

    fn bins(&self) -> usize {
        usize::try_from(self.stop.saturating_sub(self.start)).unwrap_or(0)
    }

    fn bin_of(&self, v: i64) -> Option<usize> {
        let n = self.bins() as i64;
        let mut off = v.saturating_sub(self.start);
        if self.circular && n > 0 {
            off = off.rem_euclid(n);
        }
        let u = usize::from(self.underflow);
        if off < 0 {
            return self.underflow.then_some(0);
        }
        if off >= n {
            return self.overflow.then_some(self.bins() + u);
        }
        Some(off as usize + u)
    }
}

/// Axis traits as reported by the histogram library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Traits {
    pub underflow: bool,
    pub overflow: bool,
    pub circular: bool,
    pub continuous: bool,
    pub ordered: bool,
}

/// A coordinate to be binned.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValue {
    Number(f64),
    Int(i64),
    Bool(bool),
    Str(String),
}

impl From<f64> for AxisValue {
    fn from(v: f64) -> Self {
        AxisValue::Number(v)
    }
}

impl From<i64> for AxisValue {
    fn from(v: i64) -> Self {
        AxisValue::Int(v)
    }
}

impl From<bool> for AxisValue {
    fn from(v: bool) -> Self {
        AxisValue::Bool(v)
    }
}

impl From<&str> for AxisValue {
    fn from(v: &str) -> Self {
        AxisValue::Str(v.to_string())
    }
}

impl AxisValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            AxisValue::Number(v) => Some(*v),
            AxisValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// One dimension of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub enum Axis {
    Regular(RegularAxis),
    Variable(VariableAxis),
    Boolean(BooleanAxis),
    IntCategory(IntCategoryAxis),
    StrCategory(StrCategoryAxis),
    Integer(IntegerAxis),
}

impl Axis {
    /// Histogram library type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Axis::Regular(_) => AxisKind::Regular.type_name(),
            Axis::Variable(_) => AxisKind::Variable.type_name(),
            Axis::Boolean(_) => AxisKind::Boolean.type_name(),
            Axis::IntCategory(_) => AxisKind::IntCategory.type_name(),
            Axis::StrCategory(_) => AxisKind::StrCategory.type_name(),
            Axis::Integer(_) => "Integer",
        }
    }

    /// Number of bins, flow bins excluded.
    pub fn bins(&self) -> usize {
        match self {
            Axis::Regular(a) => a.bins,
            Axis::Variable(a) => a.bins(),
            Axis::Boolean(_) => 2,
            Axis::IntCategory(a) => a.categories.len(),
            Axis::StrCategory(a) => a.categories.len(),
            Axis::Integer(a) => a.bins(),
        }
    }

    /// Number of bins including active flow bins; the axis' storage extent.
    pub fn extent(&self) -> usize {
        let t = self.traits();
        self.bins().saturating_add(usize::from(t.underflow) + usize::from(t.overflow))
    }

    pub fn traits(&self) -> Traits {
        match self {
            Axis::Regular(a) => Traits {
                underflow: a.underflow,
                overflow: a.overflow,
                circular: a.circular,
                continuous: true,
                ordered: true,
            },
            Axis::Variable(a) => Traits {
                underflow: a.underflow,
                overflow: a.overflow,
                circular: a.circular,
                continuous: true,
                ordered: true,
            },
            Axis::Boolean(_) => Traits {
                ordered: true,
                ..Traits::default()
            },
            Axis::IntCategory(a) => Traits {
                overflow: a.flow,
                ..Traits::default()
            },
            Axis::StrCategory(a) => Traits {
                overflow: a.flow,
                ..Traits::default()
            },
            Axis::Integer(a) => Traits {
                underflow: a.underflow,
                overflow: a.overflow,
                circular: a.circular,
                continuous: false,
                ordered: true,
            },
        }
    }

    /// Axis metadata; empty when the axis has none.
    pub fn metadata(&self) -> &Metadata {
        self.metadata_opt().unwrap_or(&EMPTY_METADATA)
    }

    /// Axis metadata, distinguishing "none" from "empty".
    pub fn metadata_opt(&self) -> Option<&Metadata> {
        match self {
            Axis::Regular(a) => a.metadata.as_ref(),
            Axis::Variable(a) => a.metadata.as_ref(),
            Axis::Boolean(a) => a.metadata.as_ref(),
            Axis::IntCategory(a) => a.metadata.as_ref(),
            Axis::StrCategory(a) => a.metadata.as_ref(),
            Axis::Integer(a) => a.metadata.as_ref(),
        }
    }

    pub fn set_metadata(&mut self, metadata: Option<Metadata>) {
        let slot = match self {
            Axis::Regular(a) => &mut a.metadata,
            Axis::Variable(a) => &mut a.metadata,
            Axis::Boolean(a) => &mut a.metadata,
            Axis::IntCategory(a) => &mut a.metadata,
            Axis::StrCategory(a) => &mut a.metadata,
            Axis::Integer(a) => &mut a.metadata,
        };
        *slot = metadata;
    }

    /// Bin centers, flow bins excluded. Categorical bins are centered on
    /// their ordinal position.
    pub fn centers(&self) -> Vec<f64> {
        match self {
            Axis::Regular(a) => a.edges().windows(2).map(|w| 0.5 * (w[0] + w[1])).collect(),
            Axis::Variable(a) => a.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect(),
            Axis::Integer(a) => (0..a.bins()).map(|i| a.start as f64 + i as f64 + 0.5).collect(),
            _ => (0..self.bins()).map(|i| i as f64 + 0.5).collect(),
        }
    }

    /// Storage index of `value` along this axis, or `None` when it falls
    /// outside every bin or has the wrong type for this axis.
    pub fn index(&self, value: &AxisValue) -> Option<usize> {
        match self {
            Axis::Regular(a) => a.bin_of(value.as_number()?),
            Axis::Variable(a) => a.bin_of(value.as_number()?),
            Axis::Integer(a) => match value {
                AxisValue::Int(v) => a.bin_of(*v),
                AxisValue::Number(x) if x.is_finite() => a.bin_of(x.floor() as i64),
                _ => None,
            },
            Axis::Boolean(_) => match value {
                AxisValue::Bool(b) => Some(usize::from(*b)),
                AxisValue::Int(v) => Some(usize::from(*v != 0)),
                AxisValue::Number(x) if !x.is_nan() => Some(usize::from(*x != 0.0)),
                _ => None,
            },
            Axis::IntCategory(a) => {
                let AxisValue::Int(v) = value else {
                    return None;
                };
                match a.categories.iter().position(|c| c == v) {
                    Some(i) => Some(i),
                    None => a.flow.then_some(a.categories.len()),
                }
            }
            Axis::StrCategory(a) => {
                let AxisValue::Str(s) = value else {
                    return None;
                };
                match a.categories.iter().position(|c| c == s) {
                    Some(i) => Some(i),
                    None => a.flow.then_some(a.categories.len()),
                }
            }
        }
    }
}

impl From<RegularAxis> for Axis {
    fn from(a: RegularAxis) -> Self {
        Axis::Regular(a)
    }
}

impl From<VariableAxis> for Axis {
    fn from(a: VariableAxis) -> Self {
        Axis::Variable(a)
    }
}

impl From<BooleanAxis> for Axis {
    fn from(a: BooleanAxis) -> Self {
        Axis::Boolean(a)
    }
}

impl From<IntCategoryAxis> for Axis {
    fn from(a: IntCategoryAxis) -> Self {
        Axis::IntCategory(a)
    }
}

impl From<StrCategoryAxis> for Axis {
    fn from(a: StrCategoryAxis) -> Self {
        Axis::StrCategory(a)
    }
}

impl From<IntegerAxis> for Axis {
    fn from(a: IntegerAxis) -> Self {
        Axis::Integer(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_extent_counts_flow_bins() {
        let a = Axis::from(RegularAxis::new(10, 0.0, 10.0));
        assert_eq!(a.bins(), 10);
        assert_eq!(a.extent(), 12);
        let a = Axis::from(RegularAxis::new(10, 0.0, 10.0).with_flow(false, true));
        assert_eq!(a.extent(), 11);
    }

    #[test]
    fn regular_index_with_underflow_offset() {
        let a = Axis::from(RegularAxis::new(10, 0.0, 10.0));
        assert_eq!(a.index(&(-0.5).into()), Some(0));
        assert_eq!(a.index(&0.3.into()), Some(1));
        assert_eq!(a.index(&1.2.into()), Some(2));
        assert_eq!(a.index(&9.99.into()), Some(10));
        assert_eq!(a.index(&10.0.into()), Some(11));
        assert_eq!(a.index(&f64::NAN.into()), None);
    }

    #[test]
    fn regular_without_flow_drops_out_of_range() {
        let a = Axis::from(RegularAxis::new(4, 0.0, 1.0).with_flow(false, false));
        assert_eq!(a.index(&(-1.0).into()), None);
        assert_eq!(a.index(&0.0.into()), Some(0));
        assert_eq!(a.index(&2.0.into()), None);
    }

    #[test]
    fn circular_regular_wraps() {
        let a = Axis::from(RegularAxis::new(4, 0.0, 4.0).with_flow(false, false).circular());
        assert_eq!(a.index(&5.5.into()), Some(1));
        assert_eq!(a.index(&(-0.5).into()), Some(3));
    }

    #[test]
    fn circular_values_just_below_range_land_in_last_bin() {
        let a = Axis::from(RegularAxis::new(4, 0.0, 4.0).with_flow(false, false).circular());
        assert_eq!(a.index(&(-1e-17).into()), Some(3));
        assert_eq!(a.index(&(-4.0).into()), Some(0));

        let v = Axis::from(
            VariableAxis::new(vec![0.0, 1.0, 5.0, 10.0])
                .with_flow(false, false)
                .circular(),
        );
        assert_eq!(v.index(&(-1e-17).into()), Some(2));
        assert_eq!(v.index(&(-9.5).into()), Some(0));
        assert_eq!(v.index(&10.0.into()), Some(0));
    }

    #[test]
    fn variable_index() {
        let a = Axis::from(VariableAxis::new(vec![0.0, 1.0, 5.0, 10.0]));
        assert_eq!(a.extent(), 5);
        assert_eq!(a.index(&(-1.0).into()), Some(0));
        assert_eq!(a.index(&0.0.into()), Some(1));
        assert_eq!(a.index(&4.9.into()), Some(2));
        assert_eq!(a.index(&5.0.into()), Some(3));
        assert_eq!(a.index(&10.0.into()), Some(4));
        assert_eq!(a.centers(), vec![0.5, 3.0, 7.5]);
    }

    #[test]
    fn boolean_has_two_bins_no_flow() {
        let a = Axis::from(BooleanAxis::new());
        assert_eq!(a.extent(), 2);
        assert_eq!(a.index(&true.into()), Some(1));
        assert_eq!(a.index(&false.into()), Some(0));
        assert_eq!(a.index(&"yes".into()), None);
    }

    #[test]
    fn categories_with_and_without_flow() {
        let a = Axis::from(IntCategoryAxis::new(vec![3, 1, 4]));
        assert_eq!(a.extent(), 4);
        assert_eq!(a.index(&AxisValue::Int(1)), Some(1));
        assert_eq!(a.index(&AxisValue::Int(9)), Some(3));

        let s = Axis::from(StrCategoryAxis::new(["a", "b"]).with_flow(false));
        assert_eq!(s.extent(), 2);
        assert_eq!(s.index(&"b".into()), Some(1));
        assert_eq!(s.index(&"z".into()), None);
    }

    #[test]
    fn integer_axis_index() {
        let a = Axis::from(IntegerAxis::new(-2, 3));
        assert_eq!(a.bins(), 5);
        assert_eq!(a.index(&AxisValue::Int(-3)), Some(0));
        assert_eq!(a.index(&AxisValue::Int(-2)), Some(1));
        assert_eq!(a.index(&2.7.into()), Some(5));
        assert_eq!(a.index(&AxisValue::Int(3)), Some(6));
    }

    #[test]
    fn metadata_absent_reads_as_empty() {
        let mut a = Axis::from(BooleanAxis::new());
        assert!(a.metadata().is_empty());
        assert!(a.metadata_opt().is_none());
        a.set_metadata(Some(Metadata::new()));
        assert!(a.metadata_opt().is_some());
    }

    #[test]
    fn regular_centers() {
        let a = Axis::from(RegularAxis::new(4, 0.0, 2.0));
        assert_eq!(a.centers(), vec![0.25, 0.75, 1.25, 1.75]);
    }
}
