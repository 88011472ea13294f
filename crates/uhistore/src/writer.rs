//! Writing histograms into a store.

use std::collections::HashMap;

use crate::axis_codec::encode_axis;
use crate::error::Result;
use crate::fields;
use crate::histogram::Histogram;
use crate::storage_codec::encode_storage;
use crate::store::Store;

pub(crate) const AXES: &str = "axes";
pub(crate) const ITEMS: &str = "items";
pub(crate) const REF_STORAGE: &str = "ref_storage";
pub(crate) const STORAGE: &str = "storage";

/// Write one histogram as the group `name` under `parent`.
///
/// Layout: `metadata` (only when the histogram has metadata), `ref_storage`
/// holding one group per axis, `axes/items` referencing those groups in axis
/// order, and `storage`.
pub fn write_histogram<S: Store>(
    store: &mut S,
    parent: S::Node,
    name: &str,
    hist: &Histogram,
) -> Result<()> {
    let _span = tracing::debug_span!("write_histogram", name).entered();
    let node = store.create_group(parent, name)?;

    if let Some(metadata) = hist.metadata_opt() {
        fields::write_metadata(store, node, metadata)?;
    }

    let ref_storage = store.create_group(node, REF_STORAGE)?;
    let refs = hist
        .axes()
        .iter()
        .enumerate()
        .map(|(i, axis)| encode_axis(store, ref_storage, axis, i))
        .collect::<Result<Vec<_>>>()?;
    let axes = store.create_group(node, AXES)?;
    store.write_refs(axes, ITEMS, refs)?;

    let storage = store.create_group(node, STORAGE)?;
    encode_storage(store, storage, hist.storage(), &hist.shape())?;
    tracing::debug!(axes = hist.axes().len(), kind = %hist.storage_kind(), "wrote histogram");
    Ok(())
}

/// Write every histogram under the store root, in name order.
pub fn write_histograms<S: Store>(store: &mut S, hists: &HashMap<String, Histogram>) -> Result<()> {
    let mut names: Vec<&String> = hists.keys().collect();
    names.sort();
    let root = store.root();
    for name in names {
        write_histogram(store, root, name, &hists[name])?;
    }
    Ok(())
}
