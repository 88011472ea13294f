//! Axis and storage kind taxonomy.
//!
//! Each kind has two spellings: the histogram library's type name
//! (`"Regular"`, `"Weight"`, ...) and the canonical spelling written to the
//! container's `type` attribute (`"regular"`, `"weighted_storage"`, ...).

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Axis kinds representable in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    Regular,
    Variable,
    Boolean,
    IntCategory,
    StrCategory,
}

impl AxisKind {
    pub const ALL: [AxisKind; 5] = [
        AxisKind::Regular,
        AxisKind::Variable,
        AxisKind::Boolean,
        AxisKind::IntCategory,
        AxisKind::StrCategory,
    ];

    /// Canonical container spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            AxisKind::Regular => "regular",
            AxisKind::Variable => "variable",
            AxisKind::Boolean => "boolean",
            AxisKind::IntCategory => "category_int",
            AxisKind::StrCategory => "category_str",
        }
    }

    /// Histogram library type name.
    pub fn type_name(self) -> &'static str {
        match self {
            AxisKind::Regular => "Regular",
            AxisKind::Variable => "Variable",
            AxisKind::Boolean => "Boolean",
            AxisKind::IntCategory => "IntCategory",
            AxisKind::StrCategory => "StrCategory",
        }
    }

    /// Human-readable text for the `description` attribute.
    pub fn description(self) -> &'static str {
        match self {
            AxisKind::Regular => "An evenly spaced set of bins between a lower and an upper bound",
            AxisKind::Variable => "A set of bins with explicitly listed edges",
            AxisKind::Boolean => "A two-bin axis for false and true",
            AxisKind::IntCategory => "A set of integer category labels, one bin each",
            AxisKind::StrCategory => "A set of string category labels, one bin each",
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AxisKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| unknown(s))
    }
}

/// Storage kinds representable in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Int,
    Double,
    Weighted,
    Mean,
    WeightedMean,
}

impl StorageKind {
    pub const ALL: [StorageKind; 5] = [
        StorageKind::Int,
        StorageKind::Double,
        StorageKind::Weighted,
        StorageKind::Mean,
        StorageKind::WeightedMean,
    ];

    /// Canonical container spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::Int => "int_storage",
            StorageKind::Double => "double_storage",
            StorageKind::Weighted => "weighted_storage",
            StorageKind::Mean => "mean_storage",
            StorageKind::WeightedMean => "weighted_mean_storage",
        }
    }

    /// Histogram library type name.
    pub fn type_name(self) -> &'static str {
        match self {
            StorageKind::Int => "Int64",
            StorageKind::Double => "Double",
            StorageKind::Weighted => "Weight",
            StorageKind::Mean => "Mean",
            StorageKind::WeightedMean => "WeightedMean",
        }
    }

    /// Human-readable text for the `description` attribute.
    pub fn description(self) -> &'static str {
        match self {
            StorageKind::Int => "Integer bin counts",
            StorageKind::Double => "Floating-point bin counts",
            StorageKind::Weighted => "Sum of weights and sum of squared weights per bin",
            StorageKind::Mean => "Count, mean and variance of a sample per bin",
            StorageKind::WeightedMean => {
                "Sum of weights, sum of squared weights, weighted mean and variance per bin"
            }
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StorageKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| unknown(s))
    }
}

fn unknown(name: &str) -> Error {
    Error::UnknownVariant {
        name: name.to_string(),
        path: String::new(),
    }
}

/// Map a histogram library axis type name to its kind.
pub fn axis_kind_of(type_name: &str) -> Result<AxisKind> {
    AxisKind::ALL
        .into_iter()
        .find(|k| k.type_name() == type_name)
        .ok_or_else(|| unknown(type_name))
}

/// Map an axis kind to the histogram library type name.
pub fn axis_type_name_of(kind: AxisKind) -> &'static str {
    kind.type_name()
}

/// Map a histogram library storage type name to its kind.
pub fn storage_kind_of(type_name: &str) -> Result<StorageKind> {
    StorageKind::ALL
        .into_iter()
        .find(|k| k.type_name() == type_name)
        .ok_or_else(|| unknown(type_name))
}

/// Map a storage kind to the histogram library type name.
pub fn storage_type_name_of(kind: StorageKind) -> &'static str {
    kind.type_name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_names_map_both_ways() {
        for kind in AxisKind::ALL {
            assert_eq!(axis_kind_of(axis_type_name_of(kind)).unwrap(), kind);
            assert_eq!(kind.as_str().parse::<AxisKind>().unwrap(), kind);
        }
    }

    #[test]
    fn storage_names_map_both_ways() {
        for kind in StorageKind::ALL {
            assert_eq!(storage_kind_of(storage_type_name_of(kind)).unwrap(), kind);
            assert_eq!(kind.as_str().parse::<StorageKind>().unwrap(), kind);
        }
    }

    #[test]
    fn canonical_spellings() {
        assert_eq!(AxisKind::StrCategory.as_str(), "category_str");
        assert_eq!(AxisKind::IntCategory.as_str(), "category_int");
        assert_eq!(StorageKind::WeightedMean.as_str(), "weighted_mean_storage");
    }

    #[test]
    fn unknown_names_fail() {
        assert!(matches!(
            axis_kind_of("Integer"),
            Err(Error::UnknownVariant { name, .. }) if name == "Integer"
        ));
        assert!(matches!(
            storage_kind_of("Unlimited"),
            Err(Error::UnknownVariant { .. })
        ));
        assert!("Regular".parse::<AxisKind>().is_err());
        assert!("weighted".parse::<StorageKind>().is_err());
    }
}
