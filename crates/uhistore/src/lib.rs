//! Histogram serialization into hierarchical containers.
//!
//! A collection of named histograms is written into a [`Container`], one
//! top-level group per histogram:
//!
//! ```text
//! /H/metadata                 attributes; omitted when H has no metadata
//! /H/axes/items               references to the axis groups, in axis order
//! /H/ref_storage/axis_{i}     one group per axis
//! /H/storage                  type, description, data and per-kind extras
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use uhistore::{Histogram, RegularAxis, StorageKind};
//!
//! let axes = vec![RegularAxis::new(10, 0.0, 10.0).into()];
//! let mut h = Histogram::new(axes, StorageKind::Weighted).unwrap();
//! for x in [0.3, 0.3, 0.4, 1.2] {
//!     h.fill(&[x.into()]);
//! }
//! let hists = HashMap::from([("pt".to_string(), h)]);
//! uhistore::write("hists.uhs", &hists).unwrap();
//!
//! let back = uhistore::read("hists.uhs").unwrap();
//! assert_eq!(back["pt"], hists["pt"]);
//! ```

use std::collections::HashMap;
use std::path::Path;

pub mod axis;
pub mod axis_codec;
pub mod error;
mod fields;
pub mod histogram;
pub mod reader;
pub mod storage;
pub mod storage_codec;
pub mod store;
pub mod types;
pub mod writer;

pub use axis::{
    Axis, AxisValue, BooleanAxis, IntCategoryAxis, IntegerAxis, RegularAxis, StrCategoryAxis,
    Traits, VariableAxis,
};
pub use error::{Error, Result};
pub use histogram::{Histogram, MetaValue, Metadata};
pub use storage::{Mean, Storage, WeightedMean, WeightedSum};
pub use store::Store;
pub use types::{
    axis_kind_of, axis_type_name_of, storage_kind_of, storage_type_name_of, AxisKind, StorageKind,
};
pub use uhistore_format::{
    AttrValue, Container, DataArray, FileAccessProps, FileCreateProps, FormatError, ObjectRef,
};

/// Write histograms into an in-memory container.
pub fn write_container(
    container: &mut Container,
    hists: &HashMap<String, Histogram>,
) -> Result<()> {
    writer::write_histograms(container, hists)
}

/// Read every histogram from an open container.
pub fn read_container(container: &Container) -> Result<HashMap<String, Histogram>> {
    reader::read_histograms(container)
}

/// Write histograms to a new container file at `path`, replacing any
/// existing file, and return the written container.
pub fn write<P: AsRef<Path>>(path: P, hists: &HashMap<String, Histogram>) -> Result<Container> {
    write_with(path, hists, &FileCreateProps::default())
}

pub fn write_with<P: AsRef<Path>>(
    path: P,
    hists: &HashMap<String, Histogram>,
    props: &FileCreateProps,
) -> Result<Container> {
    let mut container = Container::new();
    write_container(&mut container, hists)?;
    container.write_to(path, props)?;
    tracing::debug!(histograms = hists.len(), "wrote container");
    Ok(container)
}

/// Read every histogram from the container file at `path`.
pub fn read<P: AsRef<Path>>(path: P) -> Result<HashMap<String, Histogram>> {
    read_with(path, &FileAccessProps::default())
}

pub fn read_with<P: AsRef<Path>>(
    path: P,
    props: &FileAccessProps,
) -> Result<HashMap<String, Histogram>> {
    let container = Container::open(path, props)?;
    let hists = read_container(&container)?;
    tracing::debug!(histograms = hists.len(), "read container");
    Ok(hists)
}
