//! Hierarchical container format.
//!
//! A container is a tree of groups and datasets. Every node can carry typed
//! attributes, datasets hold flat typed arrays with a shape, and object
//! references let one dataset point at nodes stored elsewhere in the tree.
//! The whole tree is serialized into a single checksummed file.
//!
//! # Example
//!
//! ```no_run
//! use uhistore_format::{AttrValue, Container, DataArray, FileAccessProps, FileCreateProps};
//!
//! let mut c = Container::new();
//! let g = c.create_group(c.root(), "sensors").unwrap();
//! c.set_attr(g, "location", AttrValue::from("lab"));
//! c.create_dataset(g, "temperature", DataArray::F64(vec![22.5, 23.1]), &[2]).unwrap();
//! c.write_to("out.uhs", &FileCreateProps::default()).unwrap();
//!
//! let back = Container::open("out.uhs", &FileAccessProps::default()).unwrap();
//! assert_eq!(back.group_names(back.root()), vec!["sensors"]);
//! ```

pub mod checksum;
pub mod container;
pub mod error;
pub mod file_reader;
pub mod file_writer;
pub mod props;
pub mod superblock;
pub mod value;

pub use container::{Container, Dataset, NodeId};
pub use error::FormatError;
pub use props::{FileAccessProps, FileCreateProps};
pub use value::{AttrValue, DataArray, ObjectRef};
