//! Node store abstraction used by the codecs.
//!
//! The codecs only need a handful of node operations: groups, scalar
//! attributes, array datasets and opaque references. [`Store`] names them so
//! the codecs can target any hierarchical backend; [`Container`] is the
//! built-in implementation.

use uhistore_format::{AttrValue, Container, DataArray, NodeId, ObjectRef};

use crate::error::{Error, Result};

/// A hierarchical node store.
pub trait Store {
    /// Handle to a node.
    type Node: Copy;
    /// Opaque reference to a node, storable inside a reference dataset.
    type Ref: Copy;

    fn root(&self) -> Self::Node;

    /// Create a child group.
    fn create_group(&mut self, parent: Self::Node, name: &str) -> Result<Self::Node>;

    /// Look up a child group by name.
    fn group(&self, parent: Self::Node, name: &str) -> Option<Self::Node>;

    /// Names of the child groups, in creation order.
    fn group_names(&self, parent: Self::Node) -> Vec<String>;

    fn set_attr(&mut self, node: Self::Node, name: &str, value: AttrValue);

    fn attr(&self, node: Self::Node, name: &str) -> Option<&AttrValue>;

    /// All attributes in insertion order.
    fn attrs(&self, node: Self::Node) -> &[(String, AttrValue)];

    /// Create an array dataset under `parent`.
    fn write_array(
        &mut self,
        parent: Self::Node,
        name: &str,
        data: DataArray,
        shape: &[u64],
    ) -> Result<()>;

    /// Payload of the dataset `name` under `parent`.
    fn read_array(&self, parent: Self::Node, name: &str) -> Option<&DataArray>;

    /// Create a one-dimensional dataset of references.
    fn write_refs(&mut self, parent: Self::Node, name: &str, refs: Vec<Self::Ref>) -> Result<()>;

    /// Read a reference dataset. `Ok(None)` when it does not exist.
    fn read_refs(&self, parent: Self::Node, name: &str) -> Result<Option<Vec<Self::Ref>>>;

    fn reference(&self, node: Self::Node) -> Self::Ref;

    fn resolve(&self, r: Self::Ref) -> Result<Self::Node>;

    /// Absolute path of a node, for error reporting.
    fn path(&self, node: Self::Node) -> String;

    /// Absolute path of a (possibly missing) child of `parent`.
    fn child_path(&self, parent: Self::Node, name: &str) -> String {
        let base = self.path(parent);
        if base.ends_with('/') {
            format!("{base}{name}")
        } else {
            format!("{base}/{name}")
        }
    }
}

impl Store for Container {
    type Node = NodeId;
    type Ref = ObjectRef;

    fn root(&self) -> NodeId {
        Container::root(self)
    }

    fn create_group(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        Ok(Container::create_group(self, parent, name)?)
    }

    fn group(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.child(parent, name).filter(|&n| self.is_group(n))
    }

    fn group_names(&self, parent: NodeId) -> Vec<String> {
        Container::group_names(self, parent)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: AttrValue) {
        Container::set_attr(self, node, name, value)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&AttrValue> {
        Container::attr(self, node, name)
    }

    fn attrs(&self, node: NodeId) -> &[(String, AttrValue)] {
        Container::attrs(self, node)
    }

    fn write_array(
        &mut self,
        parent: NodeId,
        name: &str,
        data: DataArray,
        shape: &[u64],
    ) -> Result<()> {
        self.create_dataset(parent, name, data, shape)?;
        Ok(())
    }

    fn read_array(&self, parent: NodeId, name: &str) -> Option<&DataArray> {
        self.child(parent, name)
            .and_then(|n| self.dataset(n))
            .map(|ds| &ds.data)
    }

    fn write_refs(&mut self, parent: NodeId, name: &str, refs: Vec<ObjectRef>) -> Result<()> {
        let shape = [refs.len() as u64];
        self.create_dataset(parent, name, DataArray::Ref(refs), &shape)?;
        Ok(())
    }

    fn read_refs(&self, parent: NodeId, name: &str) -> Result<Option<Vec<ObjectRef>>> {
        match Store::read_array(self, parent, name) {
            None => Ok(None),
            Some(DataArray::Ref(refs)) => Ok(Some(refs.clone())),
            Some(_) => Err(Error::InvalidField {
                field: name.to_string(),
                path: Store::child_path(self, parent, name),
                expected: "reference dataset",
            }),
        }
    }

    fn reference(&self, node: NodeId) -> ObjectRef {
        Container::reference(self, node)
    }

    fn resolve(&self, r: ObjectRef) -> Result<NodeId> {
        Ok(Container::resolve(self, r)?)
    }

    fn path(&self, node: NodeId) -> String {
        Container::path(self, node)
    }
}
