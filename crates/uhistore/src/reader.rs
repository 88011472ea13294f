//! Reading histograms back from a store.

use std::collections::HashMap;

use crate::axis_codec::decode_axis;
use crate::error::{Error, Result};
use crate::fields;
use crate::histogram::Histogram;
use crate::storage_codec::decode_storage;
use crate::store::Store;
use crate::writer::{AXES, ITEMS, STORAGE};

fn required_group<S: Store>(store: &S, parent: S::Node, name: &str) -> Result<S::Node> {
    store.group(parent, name).ok_or_else(|| Error::MissingField {
        field: name.to_string(),
        path: store.path(parent),
    })
}

/// Read the histogram stored in the group `node`.
pub fn read_histogram<S: Store>(store: &S, node: S::Node) -> Result<Histogram> {
    let _span = tracing::debug_span!("read_histogram", path = %store.path(node)).entered();
    let metadata = fields::read_metadata(store, node)?;

    let axes_group = required_group(store, node, AXES)?;
    let refs = store
        .read_refs(axes_group, ITEMS)?
        .ok_or_else(|| Error::MissingField {
            field: ITEMS.to_string(),
            path: store.path(axes_group),
        })?;
    let axes = refs
        .into_iter()
        .map(|r| decode_axis(store, store.resolve(r)?))
        .collect::<Result<Vec<_>>>()?;

    let storage_group = required_group(store, node, STORAGE)?;
    let storage = decode_storage(store, storage_group, &axes)?;
    let hist = Histogram::from_parts(axes, storage, metadata).map_err(|e| match e {
        Error::ShapeMismatch { expected, found, .. } => Error::ShapeMismatch {
            path: store.path(storage_group),
            expected,
            found,
        },
        other => other,
    })?;
    tracing::debug!(axes = hist.axes().len(), kind = %hist.storage_kind(), "read histogram");
    Ok(hist)
}

/// Read every histogram stored under the store root, keyed by group name.
pub fn read_histograms<S: Store>(store: &S) -> Result<HashMap<String, Histogram>> {
    let root = store.root();
    store
        .group_names(root)
        .into_iter()
        .map(|name| {
            let node = required_group(store, root, &name)?;
            Ok((name, read_histogram(store, node)?))
        })
        .collect()
}
