//! Storage records.
//!
//! The storage group carries `type` and `description` attributes, the bin
//! values in the `data` dataset and, depending on the kind, `variances`,
//! `counts`, `sum_of_weights` and `sum_of_weights_squared`. Every dataset is
//! shaped like the bin grid, flow bins included.

use uhistore_format::{AttrValue, DataArray};

use crate::axis::Axis;
use crate::error::{Error, Result};
use crate::fields;
use crate::histogram::grid_size;
use crate::storage::{self, Storage};
use crate::store::Store;
use crate::types::StorageKind;

const DATA: &str = "data";
const VARIANCES: &str = "variances";
const COUNTS: &str = "counts";
const SUM_OF_WEIGHTS: &str = "sum_of_weights";
const SUM_OF_WEIGHTS_SQUARED: &str = "sum_of_weights_squared";

/// Write `storage` into `node` with datasets shaped by `shape`.
pub fn encode_storage<S: Store>(
    store: &mut S,
    node: S::Node,
    storage: &Storage,
    shape: &[usize],
) -> Result<()> {
    let kind = storage.kind();
    store.set_attr(node, "type", AttrValue::from(kind.as_str()));
    store.set_attr(node, "description", AttrValue::from(kind.description()));

    let dims: Vec<u64> = shape.iter().map(|&n| n as u64).collect();
    let data = match storage {
        Storage::Int(v) => DataArray::I64(v.clone()),
        _ => DataArray::F64(storage.values()),
    };
    store.write_array(node, DATA, data, &dims)?;

    let extras: [(&str, Option<Vec<f64>>); 4] = [
        (VARIANCES, storage.variances()),
        (COUNTS, storage.counts()),
        (SUM_OF_WEIGHTS, storage.sum_of_weights()),
        (SUM_OF_WEIGHTS_SQUARED, storage.sum_of_weights_squared()),
    ];
    for (name, values) in extras {
        if let Some(values) = values {
            store.write_array(node, name, DataArray::F64(values), &dims)?;
        }
    }
    tracing::debug!(kind = %kind, bins = storage.len(), "encoded storage");
    Ok(())
}

fn check_len<S: Store>(
    store: &S,
    node: S::Node,
    name: &str,
    len: usize,
    expected: usize,
) -> Result<()> {
    if len == expected {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            path: store.child_path(node, name),
            expected,
            found: len,
        })
    }
}

fn float_dataset<'a, S: Store>(
    store: &'a S,
    node: S::Node,
    name: &str,
    expected: usize,
) -> Result<&'a [f64]> {
    let values = fields::f64_array(store, node, name)?;
    check_len(store, node, name, values.len(), expected)?;
    Ok(values)
}

/// Rebuild the storage at `node` for a histogram with the given axes.
pub fn decode_storage<S: Store>(store: &S, node: S::Node, axes: &[Axis]) -> Result<Storage> {
    let type_name = fields::str_attr(store, node, "type")?;
    let kind: StorageKind = type_name.parse().map_err(|_| Error::UnknownVariant {
        name: type_name.to_string(),
        path: store.path(node),
    })?;
    let size = grid_size(axes).ok_or_else(|| Error::GridOverflow {
        path: store.path(node),
    })?;

    let storage = match kind {
        StorageKind::Int => match fields::array(store, node, DATA)? {
            DataArray::I64(v) => {
                check_len(store, node, DATA, v.len(), size)?;
                Storage::Int(v.clone())
            }
            _ => {
                return Err(Error::InvalidField {
                    field: DATA.to_string(),
                    path: store.path(node),
                    expected: "integer dataset",
                })
            }
        },
        StorageKind::Double => Storage::Double(float_dataset(store, node, DATA, size)?.to_vec()),
        StorageKind::Weighted => {
            let values = float_dataset(store, node, DATA, size)?;
            let variances = float_dataset(store, node, VARIANCES, size)?;
            Storage::Weight(storage::stack_weighted(values, variances))
        }
        StorageKind::Mean => {
            let values = float_dataset(store, node, DATA, size)?;
            let variances = float_dataset(store, node, VARIANCES, size)?;
            let counts = float_dataset(store, node, COUNTS, size)?;
            Storage::Mean(storage::stack_mean(counts, values, variances))
        }
        StorageKind::WeightedMean => {
            let values = float_dataset(store, node, DATA, size)?;
            let variances = float_dataset(store, node, VARIANCES, size)?;
            let sw = float_dataset(store, node, SUM_OF_WEIGHTS, size)?;
            let sw2 = float_dataset(store, node, SUM_OF_WEIGHTS_SQUARED, size)?;
            Storage::WeightedMean(storage::stack_weighted_mean(sw, sw2, values, variances))
        }
    };
    tracing::debug!(kind = %kind, bins = size, path = %store.path(node), "decoded storage");
    Ok(storage)
}
