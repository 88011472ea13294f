//! Container parsing. See [`crate::file_writer`] for the body layout.

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum::lookup3;
use crate::container::{element_count, Container, Dataset, Node, NodeId, NodeKind};
use crate::error::FormatError;
use crate::file_writer::{
    ATTR_BOOL, ATTR_F64, ATTR_F64_ARRAY, ATTR_I64, ATTR_I64_ARRAY, ATTR_STRING,
    ATTR_STRING_ARRAY, ATTR_U64, ELEM_F64, ELEM_I64, ELEM_REF, ELEM_STR, ENC_RAW, ENC_ZLIB,
    KIND_DATASET, KIND_GROUP, NO_PARENT,
};
use crate::props::FileAccessProps;
use crate::superblock::{ensure_len, Superblock, SUPERBLOCK_SIZE};
use crate::value::{AttrValue, DataArray, ObjectRef};

/// Bounds-checked little-endian cursor over a byte slice.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        let end = self.pos.checked_add(n).ok_or(FormatError::UnexpectedEof {
            expected: usize::MAX,
            available: self.data.len(),
        })?;
        ensure_len(self.data, end)?;
        let s = &self.data[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    fn u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, FormatError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn u64(&mut self) -> Result<u64, FormatError> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    fn i64(&mut self) -> Result<i64, FormatError> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    fn f64(&mut self) -> Result<f64, FormatError> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    fn string(&mut self) -> Result<String, FormatError> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| FormatError::InvalidUtf8)
    }

    /// Read a u64 element count, capping the pre-allocation hint by the
    /// bytes actually left so corrupt counts cannot force huge allocations.
    fn count(&mut self, min_elem_size: usize) -> Result<(usize, usize), FormatError> {
        let n = self.u64()?;
        let n = usize::try_from(n).map_err(|_| FormatError::UnexpectedEof {
            expected: usize::MAX,
            available: self.data.len(),
        })?;
        Ok((n, n.min(self.remaining() / min_elem_size.max(1))))
    }
}

fn decode_attr(cur: &mut Cursor<'_>) -> Result<AttrValue, FormatError> {
    let tag = cur.u8()?;
    Ok(match tag {
        ATTR_F64 => AttrValue::F64(cur.f64()?),
        ATTR_I64 => AttrValue::I64(cur.i64()?),
        ATTR_U64 => AttrValue::U64(cur.u64()?),
        ATTR_BOOL => AttrValue::Bool(cur.u8()? != 0),
        ATTR_STRING => AttrValue::String(cur.string()?),
        ATTR_F64_ARRAY => {
            let (n, cap) = cur.count(8)?;
            let mut v = Vec::with_capacity(cap);
            for _ in 0..n {
                v.push(cur.f64()?);
            }
            AttrValue::F64Array(v)
        }
        ATTR_I64_ARRAY => {
            let (n, cap) = cur.count(8)?;
            let mut v = Vec::with_capacity(cap);
            for _ in 0..n {
                v.push(cur.i64()?);
            }
            AttrValue::I64Array(v)
        }
        ATTR_STRING_ARRAY => {
            let (n, cap) = cur.count(4)?;
            let mut v = Vec::with_capacity(cap);
            for _ in 0..n {
                v.push(cur.string()?);
            }
            AttrValue::StringArray(v)
        }
        tag => {
            return Err(FormatError::InvalidTag {
                what: "attribute",
                tag,
            })
        }
    })
}

fn decode_elements(
    tag: u8,
    count: usize,
    raw: &[u8],
    node_count: u64,
) -> Result<DataArray, FormatError> {
    let mut cur = Cursor::new(raw);
    let cap = count.min(raw.len() / 4 + 1);
    let data = match tag {
        ELEM_F64 => {
            let mut v = Vec::with_capacity(cap);
            for _ in 0..count {
                v.push(cur.f64()?);
            }
            DataArray::F64(v)
        }
        ELEM_I64 => {
            let mut v = Vec::with_capacity(cap);
            for _ in 0..count {
                v.push(cur.i64()?);
            }
            DataArray::I64(v)
        }
        ELEM_STR => {
            let mut v = Vec::with_capacity(cap);
            for _ in 0..count {
                v.push(cur.string()?);
            }
            DataArray::Str(v)
        }
        ELEM_REF => {
            let mut v = Vec::with_capacity(cap);
            for _ in 0..count {
                let addr = cur.u64()?;
                if addr >= node_count {
                    return Err(FormatError::DanglingReference(addr));
                }
                v.push(ObjectRef(addr));
            }
            DataArray::Ref(v)
        }
        tag => {
            return Err(FormatError::InvalidTag {
                what: "dataset element",
                tag,
            })
        }
    };
    Ok(data)
}

fn decode_dataset(
    cur: &mut Cursor<'_>,
    node_count: u64,
    path: &dyn Fn() -> String,
) -> Result<Dataset, FormatError> {
    let rank = cur.u32()? as usize;
    let mut shape = Vec::with_capacity(rank.min(cur.remaining() / 8));
    for _ in 0..rank {
        shape.push(cur.u64()?);
    }

    let tag = cur.u8()?;
    let (count, _) = cur.count(1)?;
    let encoding = cur.u8()?;
    let stored_len = cur.u64()? as usize;
    let stored = cur.take(stored_len)?;

    let data = match encoding {
        ENC_RAW => decode_elements(tag, count, stored, node_count)?,
        ENC_ZLIB => {
            let raw = miniz_oxide::inflate::decompress_to_vec_zlib(stored)
                .map_err(|e| FormatError::Compression(format!("{e:?}")))?;
            decode_elements(tag, count, &raw, node_count)?
        }
        tag => {
            return Err(FormatError::InvalidTag {
                what: "payload encoding",
                tag,
            })
        }
    };

    let expected = element_count(&shape);
    if expected != data.len() as u64 {
        return Err(FormatError::ShapeMismatch {
            path: path(),
            expected,
            found: data.len() as u64,
        });
    }
    Ok(Dataset { shape, data })
}

impl Container {
    /// Parse a container from bytes.
    pub fn from_bytes(data: &[u8], props: &FileAccessProps) -> Result<Self, FormatError> {
        let sb = Superblock::parse(data, props.verify_checksum)?;

        let body_len = usize::try_from(sb.body_len).map_err(|_| FormatError::UnexpectedEof {
            expected: usize::MAX,
            available: data.len(),
        })?;
        let body_end = SUPERBLOCK_SIZE
            .checked_add(body_len)
            .ok_or(FormatError::UnexpectedEof {
                expected: usize::MAX,
                available: data.len(),
            })?;
        ensure_len(data, body_end)?;
        let body = &data[SUPERBLOCK_SIZE..body_end];

        if props.verify_checksum && sb.has_checksum() {
            ensure_len(data, body_end + 4)?;
            let expected = LittleEndian::read_u32(&data[body_end..body_end + 4]);
            let computed = lookup3(body);
            if expected != computed {
                return Err(FormatError::ChecksumMismatch { expected, computed });
            }
        }

        let mut cur = Cursor::new(body);
        let mut container = Container { nodes: Vec::new() };

        for index in 0..sb.node_count {
            let parent = cur.u64()?;
            let name = cur.string()?;
            let kind_tag = cur.u8()?;

            let parent = match (index, parent) {
                (0, NO_PARENT) => None,
                (i, p) if i > 0 && p < i && container.is_group(NodeId(p as usize)) => {
                    Some(NodeId(p as usize))
                }
                (i, p) => {
                    return Err(FormatError::InvalidParent { node: i, parent: p });
                }
            };

            let attr_count = cur.u32()?;
            let mut attrs = Vec::new();
            for _ in 0..attr_count {
                let attr_name = cur.string()?;
                attrs.push((attr_name, decode_attr(&mut cur)?));
            }

            let kind = match kind_tag {
                KIND_GROUP => NodeKind::Group {
                    children: Vec::new(),
                },
                KIND_DATASET => {
                    let path = || match parent {
                        Some(p) => format!("{}/{}", container.path(p).trim_end_matches('/'), name),
                        None => "/".to_string(),
                    };
                    NodeKind::Dataset(decode_dataset(&mut cur, sb.node_count, &path)?)
                }
                tag => {
                    return Err(FormatError::InvalidTag {
                        what: "node kind",
                        tag,
                    })
                }
            };

            container.push_decoded(Node {
                name,
                parent,
                attrs,
                kind,
            })?;
        }

        if container.nodes.is_empty() || !container.is_group(container.root()) {
            return Err(FormatError::InvalidParent {
                node: 0,
                parent: NO_PARENT,
            });
        }
        Ok(container)
    }

    /// Read and parse the container file at `path`.
    ///
    /// The whole file is read and the handle released before parsing.
    pub fn open<P: AsRef<Path>>(path: P, props: &FileAccessProps) -> Result<Self, FormatError> {
        let bytes = std::fs::read(path.as_ref())?;
        tracing::trace!(
            path = %path.as_ref().display(),
            bytes = bytes.len(),
            "container read"
        );
        Self::from_bytes(&bytes, props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::FileCreateProps;

    fn populated() -> Container {
        let mut c = Container::new();
        c.set_attr(c.root(), "creator", AttrValue::from("tests"));
        let h = c.create_group(c.root(), "h").unwrap();
        let axis = c.create_group(h, "axis_0").unwrap();
        c.set_attr(axis, "type", AttrValue::from("regular"));
        c.set_attr(axis, "bins", AttrValue::U64(10));
        c.set_attr(axis, "lower", AttrValue::F64(-1.5));
        c.set_attr(axis, "underflow", AttrValue::Bool(true));
        c.set_attr(axis, "ids", AttrValue::I64Array(vec![-1, 2]));
        c.set_attr(axis, "w", AttrValue::F64Array(vec![0.5]));
        c.set_attr(axis, "tags", AttrValue::StringArray(vec!["a".into(), "é".into()]));
        c.create_dataset(h, "grid", DataArray::F64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), &[2, 3])
            .unwrap();
        c.create_dataset(h, "cats", DataArray::Str(vec!["x".into(), "yy".into()]), &[2])
            .unwrap();
        c.create_dataset(h, "ints", DataArray::I64(vec![i64::MIN, 0, i64::MAX]), &[3])
            .unwrap();
        let r = c.reference(axis);
        c.create_dataset(h, "items", DataArray::Ref(vec![r]), &[1]).unwrap();
        c
    }

    #[test]
    fn bytes_roundtrip_preserves_tree() {
        let c = populated();
        let bytes = c.to_bytes(&FileCreateProps::default()).unwrap();
        let back = Container::from_bytes(&bytes, &FileAccessProps::default()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn deflated_roundtrip() {
        let c = populated();
        let bytes = c.to_bytes(&FileCreateProps::new().deflate(9)).unwrap();
        let back = Container::from_bytes(&bytes, &FileAccessProps::default()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn references_survive_roundtrip() {
        let c = populated();
        let bytes = c.to_bytes(&FileCreateProps::default()).unwrap();
        let back = Container::from_bytes(&bytes, &FileAccessProps::default()).unwrap();
        let items = back.lookup("/h/items").unwrap();
        let DataArray::Ref(refs) = &back.dataset(items).unwrap().data else {
            panic!("expected reference dataset");
        };
        let target = back.resolve(refs[0]).unwrap();
        assert_eq!(back.path(target), "/h/axis_0");
    }

    #[test]
    fn body_corruption_detected() {
        let c = populated();
        let mut bytes = c.to_bytes(&FileCreateProps::default()).unwrap();
        let mid = SUPERBLOCK_SIZE + 20;
        bytes[mid] ^= 0x55;
        assert!(matches!(
            Container::from_bytes(&bytes, &FileAccessProps::default()),
            Err(FormatError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn truncated_body_is_eof() {
        let c = populated();
        let bytes = c.to_bytes(&FileCreateProps::default()).unwrap();
        let cut = &bytes[..bytes.len() - 40];
        assert!(matches!(
            Container::from_bytes(cut, &FileAccessProps::new().skip_checksum()),
            Err(FormatError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn not_a_container() {
        assert!(matches!(
            Container::from_bytes(b"plain text, not a container", &FileAccessProps::default()),
            Err(FormatError::SignatureNotFound)
        ));
    }

    #[test]
    fn dangling_reference_rejected() {
        let mut c = Container::new();
        c.create_dataset(c.root(), "items", DataArray::Ref(vec![ObjectRef(77)]), &[1])
            .unwrap();
        let bytes = c.to_bytes(&FileCreateProps::default()).unwrap();
        assert!(matches!(
            Container::from_bytes(&bytes, &FileAccessProps::default()),
            Err(FormatError::DanglingReference(77))
        ));
    }

    #[test]
    fn duplicate_sibling_names_rejected() {
        let mut c = Container::new();
        c.create_group(c.root(), "h").unwrap();
        let other = c.create_group(c.root(), "g").unwrap();
        c.nodes[other.0].name = "h".to_string();
        let bytes = c.to_bytes(&FileCreateProps::default()).unwrap();
        assert!(matches!(
            Container::from_bytes(&bytes, &FileAccessProps::default()),
            Err(FormatError::DuplicateName(path)) if path == "/h"
        ));
    }
}
