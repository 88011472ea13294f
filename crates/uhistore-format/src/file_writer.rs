//! Container serialization.
//!
//! Body layout, one record per node in arena order:
//!
//! ```text
//! parent      u64   (u64::MAX for the root)
//! name        u32 length + UTF-8 bytes
//! kind        u8    (0 = group, 1 = dataset)
//! attr count  u32, then per attribute: name, value tag u8, value
//! dataset only:
//!   rank      u32, then rank x u64 dims
//!   element   u8 tag, u64 element count
//!   encoding  u8 (0 = raw, 1 = zlib), u64 stored length, stored bytes
//! ```

use std::io::Write;
use std::path::Path;

use crate::checksum::lookup3;
use crate::container::{Container, Node, NodeKind};
use crate::error::FormatError;
use crate::props::FileCreateProps;
use crate::superblock::{Superblock, FLAG_CHECKSUM, FLAG_DEFLATE, VERSION};
use crate::value::{AttrValue, DataArray};

pub(crate) const NO_PARENT: u64 = u64::MAX;

pub(crate) const KIND_GROUP: u8 = 0;
pub(crate) const KIND_DATASET: u8 = 1;

pub(crate) const ATTR_F64: u8 = 0;
pub(crate) const ATTR_I64: u8 = 1;
pub(crate) const ATTR_U64: u8 = 2;
pub(crate) const ATTR_BOOL: u8 = 3;
pub(crate) const ATTR_STRING: u8 = 4;
pub(crate) const ATTR_F64_ARRAY: u8 = 5;
pub(crate) const ATTR_I64_ARRAY: u8 = 6;
pub(crate) const ATTR_STRING_ARRAY: u8 = 7;

pub(crate) const ELEM_F64: u8 = 0;
pub(crate) const ELEM_I64: u8 = 1;
pub(crate) const ELEM_STR: u8 = 2;
pub(crate) const ELEM_REF: u8 = 3;

pub(crate) const ENC_RAW: u8 = 0;
pub(crate) const ENC_ZLIB: u8 = 1;

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Length prefix for a u32 field; longer inputs cannot be represented.
fn len_u32(len: usize, what: &'static str) -> Result<u32, FormatError> {
    u32::try_from(len).map_err(|_| FormatError::TooLarge { what, len })
}

fn put_str(buf: &mut Vec<u8>, s: &str) -> Result<(), FormatError> {
    put_u32(buf, len_u32(s.len(), "string")?);
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn encode_attr(buf: &mut Vec<u8>, value: &AttrValue) -> Result<(), FormatError> {
    match value {
        AttrValue::F64(v) => {
            buf.push(ATTR_F64);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        AttrValue::I64(v) => {
            buf.push(ATTR_I64);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        AttrValue::U64(v) => {
            buf.push(ATTR_U64);
            put_u64(buf, *v);
        }
        AttrValue::Bool(v) => {
            buf.push(ATTR_BOOL);
            buf.push(u8::from(*v));
        }
        AttrValue::String(s) => {
            buf.push(ATTR_STRING);
            put_str(buf, s)?;
        }
        AttrValue::F64Array(vals) => {
            buf.push(ATTR_F64_ARRAY);
            put_u64(buf, vals.len() as u64);
            for v in vals {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        AttrValue::I64Array(vals) => {
            buf.push(ATTR_I64_ARRAY);
            put_u64(buf, vals.len() as u64);
            for v in vals {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        AttrValue::StringArray(vals) => {
            buf.push(ATTR_STRING_ARRAY);
            put_u64(buf, vals.len() as u64);
            for s in vals {
                put_str(buf, s)?;
            }
        }
    }
    Ok(())
}

/// Raw element bytes of a payload plus its element tag.
fn payload_bytes(data: &DataArray) -> Result<(u8, Vec<u8>), FormatError> {
    let mut b = Vec::new();
    let tag = match data {
        DataArray::F64(vals) => {
            b.reserve(vals.len() * 8);
            for v in vals {
                b.extend_from_slice(&v.to_le_bytes());
            }
            ELEM_F64
        }
        DataArray::I64(vals) => {
            b.reserve(vals.len() * 8);
            for v in vals {
                b.extend_from_slice(&v.to_le_bytes());
            }
            ELEM_I64
        }
        DataArray::Str(vals) => {
            for s in vals {
                put_str(&mut b, s)?;
            }
            ELEM_STR
        }
        DataArray::Ref(refs) => {
            b.reserve(refs.len() * 8);
            for r in refs {
                put_u64(&mut b, r.0);
            }
            ELEM_REF
        }
    };
    Ok((tag, b))
}

fn encode_node(
    buf: &mut Vec<u8>,
    node: &Node,
    deflate_level: Option<u32>,
) -> Result<(), FormatError> {
    put_u64(buf, node.parent.map_or(NO_PARENT, |p| p.0 as u64));
    put_str(buf, &node.name)?;
    match &node.kind {
        NodeKind::Group { .. } => buf.push(KIND_GROUP),
        NodeKind::Dataset(_) => buf.push(KIND_DATASET),
    }

    put_u32(buf, len_u32(node.attrs.len(), "attribute count")?);
    for (name, value) in &node.attrs {
        put_str(buf, name)?;
        encode_attr(buf, value)?;
    }

    if let NodeKind::Dataset(ds) = &node.kind {
        put_u32(buf, len_u32(ds.shape.len(), "dataset rank")?);
        for &d in &ds.shape {
            put_u64(buf, d);
        }
        let (tag, raw) = payload_bytes(&ds.data)?;
        buf.push(tag);
        put_u64(buf, ds.data.len() as u64);
        match deflate_level {
            Some(level) => {
                let packed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, level as u8);
                buf.push(ENC_ZLIB);
                put_u64(buf, packed.len() as u64);
                buf.extend_from_slice(&packed);
            }
            None => {
                buf.push(ENC_RAW);
                put_u64(buf, raw.len() as u64);
                buf.extend_from_slice(&raw);
            }
        }
    }
    Ok(())
}

impl Container {
    /// Serialize the container to bytes.
    ///
    /// Fails with [`FormatError::TooLarge`] when a string, attribute list or
    /// dataset rank does not fit its length field.
    pub fn to_bytes(&self, props: &FileCreateProps) -> Result<Vec<u8>, FormatError> {
        let mut body = Vec::new();
        for node in &self.nodes {
            encode_node(&mut body, node, props.deflate_level)?;
        }

        let mut flags = 0;
        if props.checksum {
            flags |= FLAG_CHECKSUM;
        }
        if props.deflate_level.is_some() {
            flags |= FLAG_DEFLATE;
        }
        let sb = Superblock {
            version: VERSION,
            flags,
            node_count: self.nodes.len() as u64,
            body_len: body.len() as u64,
        };

        let mut out = Vec::with_capacity(32 + body.len() + 4);
        out.extend_from_slice(&sb.encode());
        out.extend_from_slice(&body);
        if props.checksum {
            out.extend_from_slice(&lookup3(&body).to_le_bytes());
        }
        Ok(out)
    }

    /// Serialize and write the container to `path`, replacing any existing
    /// file. The file handle is closed before this returns, on success or
    /// failure.
    pub fn write_to<P: AsRef<Path>>(
        &self,
        path: P,
        props: &FileCreateProps,
    ) -> Result<(), FormatError> {
        let bytes = self.to_bytes(props)?;
        let mut file = std::fs::File::create(path.as_ref())?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        tracing::trace!(
            path = %path.as_ref().display(),
            bytes = bytes.len(),
            nodes = self.nodes.len(),
            "container written"
        );
        Ok(())
    }
}
