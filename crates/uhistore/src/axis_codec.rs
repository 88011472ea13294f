//! Axis records.
//!
//! Each axis is written as its own group `axis_{i}` carrying `type` and
//! `description` attributes plus the fields of its kind:
//!
//! | type           | attributes                                     | datasets     |
//! |----------------|------------------------------------------------|--------------|
//! | `regular`      | bins, lower, upper, underflow, overflow, circular | |
//! | `variable`     | underflow, overflow, circular                  | `edges`      |
//! | `boolean`      |                                                |              |
//! | `category_int` | flow                                           | `categories` |
//! | `category_str` | flow                                           | `categories` |
//!
//! Axis metadata lives in an optional `metadata` child group.

use uhistore_format::{AttrValue, DataArray};

use crate::axis::{Axis, BooleanAxis, IntCategoryAxis, RegularAxis, StrCategoryAxis, VariableAxis};
use crate::error::{Error, Result};
use crate::fields;
use crate::store::Store;
use crate::types::AxisKind;

const EDGES: &str = "edges";
const CATEGORIES: &str = "categories";

fn axis_kind(axis: &Axis) -> Result<AxisKind> {
    Ok(match axis {
        Axis::Regular(_) => AxisKind::Regular,
        Axis::Variable(_) => AxisKind::Variable,
        Axis::Boolean(_) => AxisKind::Boolean,
        Axis::IntCategory(_) => AxisKind::IntCategory,
        Axis::StrCategory(_) => AxisKind::StrCategory,
        Axis::Integer(_) => return Err(Error::UnsupportedAxisKind(axis.type_name().to_string())),
    })
}

fn write_flow<S: Store>(
    store: &mut S,
    node: S::Node,
    underflow: bool,
    overflow: bool,
    circular: bool,
) {
    store.set_attr(node, "underflow", AttrValue::Bool(underflow));
    store.set_attr(node, "overflow", AttrValue::Bool(overflow));
    store.set_attr(node, "circular", AttrValue::Bool(circular));
}

/// Write `axis` as `axis_{index}` under `parent` and return a reference to
/// the new node.
pub fn encode_axis<S: Store>(
    store: &mut S,
    parent: S::Node,
    axis: &Axis,
    index: usize,
) -> Result<S::Ref> {
    let kind = axis_kind(axis)?;
    let node = store.create_group(parent, &format!("axis_{index}"))?;
    store.set_attr(node, "type", AttrValue::from(kind.as_str()));
    store.set_attr(node, "description", AttrValue::from(kind.description()));

    match axis {
        Axis::Regular(a) => {
            store.set_attr(node, "bins", AttrValue::U64(a.bins as u64));
            store.set_attr(node, "lower", AttrValue::F64(a.lower));
            store.set_attr(node, "upper", AttrValue::F64(a.upper));
            write_flow(store, node, a.underflow, a.overflow, a.circular);
        }
        Axis::Variable(a) => {
            let shape = [a.edges.len() as u64];
            store.write_array(node, EDGES, DataArray::F64(a.edges.clone()), &shape)?;
            write_flow(store, node, a.underflow, a.overflow, a.circular);
        }
        Axis::Boolean(_) => {}
        Axis::IntCategory(a) => {
            let shape = [a.categories.len() as u64];
            store.write_array(node, CATEGORIES, DataArray::I64(a.categories.clone()), &shape)?;
            store.set_attr(node, "flow", AttrValue::Bool(a.flow));
        }
        Axis::StrCategory(a) => {
            let shape = [a.categories.len() as u64];
            store.write_array(node, CATEGORIES, DataArray::Str(a.categories.clone()), &shape)?;
            store.set_attr(node, "flow", AttrValue::Bool(a.flow));
        }
        Axis::Integer(_) => unreachable!("rejected by axis_kind"),
    }

    if let Some(metadata) = axis.metadata_opt() {
        fields::write_metadata(store, node, metadata)?;
    }
    tracing::debug!(index, kind = %kind, bins = axis.bins(), "encoded axis");
    Ok(store.reference(node))
}

/// Rebuild an axis from the record stored at `node`.
pub fn decode_axis<S: Store>(store: &S, node: S::Node) -> Result<Axis> {
    let type_name = fields::str_attr(store, node, "type")?;
    let kind: AxisKind = type_name.parse().map_err(|_| Error::UnknownVariant {
        name: type_name.to_string(),
        path: store.path(node),
    })?;
    let metadata = fields::read_metadata(store, node)?;

    let mut axis = match kind {
        AxisKind::Regular => Axis::Regular(RegularAxis {
            bins: fields::usize_attr(store, node, "bins")?,
            lower: fields::f64_attr(store, node, "lower")?,
            upper: fields::f64_attr(store, node, "upper")?,
            underflow: fields::bool_attr(store, node, "underflow")?,
            overflow: fields::bool_attr(store, node, "overflow")?,
            circular: fields::bool_attr(store, node, "circular")?,
            metadata: None,
        }),
        AxisKind::Variable => Axis::Variable(VariableAxis {
            edges: fields::f64_array(store, node, EDGES)?.to_vec(),
            underflow: fields::bool_attr(store, node, "underflow")?,
            overflow: fields::bool_attr(store, node, "overflow")?,
            circular: fields::bool_attr(store, node, "circular")?,
            metadata: None,
        }),
        AxisKind::Boolean => Axis::Boolean(BooleanAxis::new()),
        AxisKind::IntCategory => {
            let categories = match fields::array(store, node, CATEGORIES)? {
                DataArray::I64(v) => v.clone(),
                _ => return Err(invalid_categories(store, node, "integer dataset")),
            };
            Axis::IntCategory(IntCategoryAxis {
                categories,
                flow: fields::bool_attr(store, node, "flow")?,
                metadata: None,
            })
        }
        AxisKind::StrCategory => {
            let categories = match fields::array(store, node, CATEGORIES)? {
                DataArray::Str(v) => v.clone(),
                _ => return Err(invalid_categories(store, node, "string dataset")),
            };
            Axis::StrCategory(StrCategoryAxis {
                categories,
                flow: fields::bool_attr(store, node, "flow")?,
                metadata: None,
            })
        }
    };
    axis.set_metadata(metadata);
    tracing::debug!(kind = %kind, bins = axis.bins(), path = %store.path(node), "decoded axis");
    Ok(axis)
}

fn invalid_categories<S: Store>(store: &S, node: S::Node, expected: &'static str) -> Error {
    Error::InvalidField {
        field: CATEGORIES.to_string(),
        path: store.path(node),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::IntegerAxis;
    use crate::histogram::Metadata;
    use uhistore_format::Container;

    fn round_trip(axis: Axis) -> Axis {
        let mut c = Container::new();
        let root = c.root();
        let r = encode_axis(&mut c, root, &axis, 0).unwrap();
        let node = c.resolve(r).unwrap();
        decode_axis(&c, node).unwrap()
    }

    #[test]
    fn every_kind_round_trips() {
        let mut m = Metadata::new();
        m.insert("label".into(), "eta".into());
        let axes: Vec<Axis> = vec![
            RegularAxis::new(10, 0.0, 10.0).into(),
            RegularAxis::new(4, -1.0, 1.0).with_flow(false, true).circular().into(),
            VariableAxis::new(vec![0.0, 0.5, 2.0]).with_metadata(m.clone()).into(),
            BooleanAxis::new().into(),
            IntCategoryAxis::new(vec![5, -3, 8]).with_flow(false).into(),
            StrCategoryAxis::new(["mu", "e"]).with_metadata(m).into(),
        ];
        for axis in axes {
            assert_eq!(round_trip(axis.clone()), axis);
        }
    }

    #[test]
    fn layout_of_regular_axis() {
        let mut c = Container::new();
        let root = c.root();
        encode_axis(&mut c, root, &RegularAxis::new(3, 0.0, 1.0).into(), 2).unwrap();
        let node = c.lookup("/axis_2").unwrap();
        assert_eq!(c.attr(node, "type"), Some(&AttrValue::from("regular")));
        assert_eq!(c.attr(node, "bins"), Some(&AttrValue::U64(3)));
        assert!(c.attr(node, "description").is_some());
        assert!(c.lookup("/axis_2/metadata").is_none());
    }

    #[test]
    fn string_categories_decode_as_strings() {
        let axis = round_trip(StrCategoryAxis::new(["a", "b", "c"]).into());
        assert!(matches!(axis, Axis::StrCategory(ref a) if a.categories == ["a", "b", "c"]));
    }

    #[test]
    fn integer_axis_is_unsupported() {
        let mut c = Container::new();
        let root = c.root();
        let err = encode_axis(&mut c, root, &IntegerAxis::new(0, 4).into(), 0).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAxisKind(name) if name == "Integer"));
        assert!(c.group_names(root).is_empty());
    }

    #[test]
    fn unknown_type_fails() {
        let mut c = Container::new();
        let node = c.create_group(c.root(), "axis_0").unwrap();
        c.set_attr(node, "type", AttrValue::from("integer"));
        let err = decode_axis(&c, node).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownVariant { name, path } if name == "integer" && path == "/axis_0"
        ));
    }

    #[test]
    fn missing_field_names_it() {
        let mut c = Container::new();
        let node = c.create_group(c.root(), "axis_0").unwrap();
        c.set_attr(node, "type", AttrValue::from("variable"));
        let err = decode_axis(&c, node).unwrap_err();
        assert!(matches!(err, Error::MissingField { field, .. } if field == "edges"));
    }
}
