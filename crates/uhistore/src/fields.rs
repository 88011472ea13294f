//! Typed attribute and dataset access with path-carrying errors.

use uhistore_format::{AttrValue, DataArray};

use crate::error::{Error, Result};
use crate::histogram::{MetaValue, Metadata};
use crate::store::Store;

pub(crate) const METADATA: &str = "metadata";

fn missing<S: Store>(store: &S, node: S::Node, field: &str) -> Error {
    Error::MissingField {
        field: field.to_string(),
        path: store.path(node),
    }
}

fn invalid<S: Store>(store: &S, node: S::Node, field: &str, expected: &'static str) -> Error {
    Error::InvalidField {
        field: field.to_string(),
        path: store.path(node),
        expected,
    }
}

pub(crate) fn attr<'a, S: Store>(
    store: &'a S,
    node: S::Node,
    field: &str,
) -> Result<&'a AttrValue> {
    store.attr(node, field).ok_or_else(|| missing(store, node, field))
}

pub(crate) fn str_attr<'a, S: Store>(store: &'a S, node: S::Node, field: &str) -> Result<&'a str> {
    attr(store, node, field)?
        .as_str()
        .ok_or_else(|| invalid(store, node, field, "string"))
}

pub(crate) fn f64_attr<S: Store>(store: &S, node: S::Node, field: &str) -> Result<f64> {
    attr(store, node, field)?
        .as_f64()
        .ok_or_else(|| invalid(store, node, field, "number"))
}

pub(crate) fn bool_attr<S: Store>(store: &S, node: S::Node, field: &str) -> Result<bool> {
    attr(store, node, field)?
        .as_bool()
        .ok_or_else(|| invalid(store, node, field, "boolean"))
}

pub(crate) fn usize_attr<S: Store>(store: &S, node: S::Node, field: &str) -> Result<usize> {
    attr(store, node, field)?
        .as_u64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| invalid(store, node, field, "non-negative integer"))
}

pub(crate) fn array<'a, S: Store>(
    store: &'a S,
    node: S::Node,
    field: &str,
) -> Result<&'a DataArray> {
    store
        .read_array(node, field)
        .ok_or_else(|| missing(store, node, field))
}

pub(crate) fn f64_array<'a, S: Store>(
    store: &'a S,
    node: S::Node,
    field: &str,
) -> Result<&'a [f64]> {
    match array(store, node, field)? {
        DataArray::F64(v) => Ok(v),
        _ => Err(invalid(store, node, field, "float dataset")),
    }
}

/// Write `metadata` as the attributes of a `metadata` child group.
pub(crate) fn write_metadata<S: Store>(
    store: &mut S,
    parent: S::Node,
    metadata: &Metadata,
) -> Result<()> {
    let group = store.create_group(parent, METADATA)?;
    for (key, value) in metadata {
        let value = match value {
            MetaValue::Str(s) => AttrValue::String(s.clone()),
            MetaValue::Int(i) => AttrValue::I64(*i),
            MetaValue::Float(f) => AttrValue::F64(*f),
            MetaValue::Bool(b) => AttrValue::Bool(*b),
        };
        store.set_attr(group, key, value);
    }
    Ok(())
}

/// Read the `metadata` child group of `parent`; `None` when it is absent.
pub(crate) fn read_metadata<S: Store>(store: &S, parent: S::Node) -> Result<Option<Metadata>> {
    let Some(group) = store.group(parent, METADATA) else {
        return Ok(None);
    };
    let mut metadata = Metadata::new();
    for (key, value) in store.attrs(group) {
        let value = match value {
            AttrValue::String(s) => MetaValue::Str(s.clone()),
            AttrValue::I64(i) => MetaValue::Int(*i),
            AttrValue::U64(u) => match i64::try_from(*u) {
                Ok(i) => MetaValue::Int(i),
                Err(_) => MetaValue::Float(*u as f64),
            },
            AttrValue::F64(f) => MetaValue::Float(*f),
            AttrValue::Bool(b) => MetaValue::Bool(*b),
            _ => return Err(invalid(store, group, key, "scalar")),
        };
        metadata.insert(key.clone(), value);
    }
    Ok(Some(metadata))
}
