//! In-memory container: an arena of group and dataset nodes.
//!
//! Nodes are appended to a flat arena and never removed, so a node's arena
//! index is a stable address for the lifetime of the container. Groups keep
//! their children in creation order. Object references are arena addresses,
//! which lets a dataset point at a node stored anywhere else in the tree.

use crate::error::FormatError;
use crate::value::{AttrValue, DataArray, ObjectRef};

/// Handle to a node inside one [`Container`].
///
/// Only valid for the container that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A typed, shaped array stored under a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Dimensions; their product equals `data.len()`.
    pub shape: Vec<u64>,
    /// Flat row-major payload.
    pub data: DataArray,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Group { children: Vec<NodeId> },
    Dataset(Dataset),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) attrs: Vec<(String, AttrValue)>,
    pub(crate) kind: NodeKind,
}

/// Number of elements a shape holds; `u64::MAX` when the product overflows.
pub(crate) fn element_count(shape: &[u64]) -> u64 {
    shape
        .iter()
        .try_fold(1u64, |acc, &d| acc.checked_mul(d))
        .unwrap_or(u64::MAX)
}

/// A hierarchical container of groups, datasets and attributes.
///
/// # Example
///
/// ```
/// use uhistore_format::{AttrValue, Container, DataArray};
///
/// let mut c = Container::new();
/// let g = c.create_group(c.root(), "run").unwrap();
/// c.set_attr(g, "id", AttrValue::I64(42));
/// c.create_dataset(g, "x", DataArray::F64(vec![1.0, 2.0]), &[2]).unwrap();
/// assert_eq!(c.path(g), "/run");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub(crate) nodes: Vec<Node>,
}

impl Container {
    /// Create an empty container holding only the root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                attrs: Vec::new(),
                kind: NodeKind::Group {
                    children: Vec::new(),
                },
            }],
        }
    }

    /// The root group.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Create a child group under `parent`.
    pub fn create_group(&mut self, parent: NodeId, name: &str) -> Result<NodeId, FormatError> {
        self.insert_child(
            parent,
            name,
            NodeKind::Group {
                children: Vec::new(),
            },
        )
    }

    /// Create a dataset under `parent`.
    ///
    /// The product of `shape` must equal the number of elements in `data`.
    pub fn create_dataset(
        &mut self,
        parent: NodeId,
        name: &str,
        data: DataArray,
        shape: &[u64],
    ) -> Result<NodeId, FormatError> {
        let expected = element_count(shape);
        if expected != data.len() as u64 {
            return Err(FormatError::ShapeMismatch {
                path: self.child_path(parent, name),
                expected,
                found: data.len() as u64,
            });
        }
        self.insert_child(
            parent,
            name,
            NodeKind::Dataset(Dataset {
                shape: shape.to_vec(),
                data,
            }),
        )
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, FormatError> {
        if !self.is_group(parent) {
            return Err(FormatError::NotAGroup(self.path(parent)));
        }
        if self.child(parent, name).is_some() {
            return Err(FormatError::DuplicateName(self.child_path(parent, name)));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(parent),
            attrs: Vec::new(),
            kind,
        });
        if let NodeKind::Group { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        Ok(id)
    }

    /// Append a node decoded from a file. The parent has already been
    /// validated to precede it; sibling names are checked here.
    pub(crate) fn push_decoded(&mut self, node: Node) -> Result<NodeId, FormatError> {
        if let Some(p) = node.parent {
            if self.child(p, &node.name).is_some() {
                return Err(FormatError::DuplicateName(self.child_path(p, &node.name)));
            }
        }
        let id = NodeId(self.nodes.len());
        let parent = node.parent;
        self.nodes.push(node);
        if let Some(p) = parent {
            if let NodeKind::Group { children } = &mut self.nodes[p.0].kind {
                children.push(id);
            }
        }
        Ok(id)
    }

    /// Set an attribute, replacing any existing attribute with that name.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: AttrValue) {
        let attrs = &mut self.nodes[node.0].attrs;
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => attrs.push((name.to_string(), value)),
        }
    }

    /// Look up an attribute by name.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&AttrValue> {
        self.node(node)
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// All attributes of a node in insertion order.
    pub fn attrs(&self, node: NodeId) -> &[(String, AttrValue)] {
        &self.node(node).attrs
    }

    pub fn is_group(&self, node: NodeId) -> bool {
        matches!(self.node(node).kind, NodeKind::Group { .. })
    }

    /// The dataset stored at `node`, if it is one.
    pub fn dataset(&self, node: NodeId) -> Option<&Dataset> {
        match &self.node(node).kind {
            NodeKind::Dataset(ds) => Some(ds),
            NodeKind::Group { .. } => None,
        }
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        match &self.node(node).kind {
            NodeKind::Group { children } => children,
            NodeKind::Dataset(_) => &[],
        }
    }

    /// Look up a direct child by name.
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.node(c).name == name)
    }

    /// Names of child groups, in creation order.
    pub fn group_names(&self, parent: NodeId) -> Vec<String> {
        self.children(parent)
            .iter()
            .filter(|&&c| self.is_group(c))
            .map(|&c| self.node(c).name.clone())
            .collect()
    }

    /// Names of child datasets, in creation order.
    pub fn dataset_names(&self, parent: NodeId) -> Vec<String> {
        self.children(parent)
            .iter()
            .filter(|&&c| !self.is_group(c))
            .map(|&c| self.node(c).name.clone())
            .collect()
    }

    /// Produce a reference to `node`.
    pub fn reference(&self, node: NodeId) -> ObjectRef {
        ObjectRef(node.0 as u64)
    }

    /// Resolve a reference produced by this container.
    pub fn resolve(&self, r: ObjectRef) -> Result<NodeId, FormatError> {
        usize::try_from(r.0)
            .ok()
            .filter(|&i| i < self.nodes.len())
            .map(NodeId)
            .ok_or(FormatError::DanglingReference(r.0))
    }

    /// Absolute slash-separated path of a node.
    pub fn path(&self, node: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(node);
        while let Some(id) = cur {
            let n = self.node(id);
            if n.parent.is_some() {
                parts.push(n.name.as_str());
            }
            cur = n.parent;
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    fn child_path(&self, parent: NodeId, name: &str) -> String {
        let base = self.path(parent);
        if base == "/" {
            format!("/{name}")
        } else {
            format!("{base}/{name}")
        }
    }

    /// Resolve an absolute or root-relative path.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self.root(), |node, part| self.child(node, part))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
