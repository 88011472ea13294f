//! Attribute and dataset value types.

use std::fmt;

/// Opaque reference to a node of the container that produced it.
///
/// A reference is only meaningful inside its own container; resolving it
/// anywhere else is either an error or names an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(pub(crate) u64);

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ref {:#x}>", self.0)
    }
}

/// Attribute value: a scalar or a short homogeneous array.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    F64(f64),
    I64(i64),
    U64(u64),
    Bool(bool),
    String(String),
    F64Array(Vec<f64>),
    I64Array(Vec<i64>),
    StringArray(Vec<String>),
}

impl AttrValue {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::F64(_) => "f64",
            AttrValue::I64(_) => "i64",
            AttrValue::U64(_) => "u64",
            AttrValue::Bool(_) => "bool",
            AttrValue::String(_) => "string",
            AttrValue::F64Array(_) => "f64[]",
            AttrValue::I64Array(_) => "i64[]",
            AttrValue::StringArray(_) => "string[]",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::F64(v) => Some(*v),
            AttrValue::I64(v) => Some(*v as f64),
            AttrValue::U64(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Non-negative integer view.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttrValue::U64(v) => Some(*v),
            AttrValue::I64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::I64(v) => Some(*v),
            AttrValue::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::F64(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::I64(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

/// Dataset payload. Elements are stored flat in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum DataArray {
    F64(Vec<f64>),
    I64(Vec<i64>),
    Str(Vec<String>),
    Ref(Vec<ObjectRef>),
}

impl DataArray {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            DataArray::F64(v) => v.len(),
            DataArray::I64(v) => v.len(),
            DataArray::Str(v) => v.len(),
            DataArray::Ref(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataArray::F64(_) => "f64",
            DataArray::I64(_) => "i64",
            DataArray::Str(_) => "string",
            DataArray::Ref(_) => "reference",
        }
    }
}
