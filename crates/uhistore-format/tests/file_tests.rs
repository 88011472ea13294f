//! On-disk tests for the container format.

use uhistore_format::{
    AttrValue, Container, DataArray, FileAccessProps, FileCreateProps, FormatError,
};

fn make_tree() -> Container {
    let mut c = Container::new();
    let run = c.create_group(c.root(), "run").unwrap();
    c.set_attr(run, "id", AttrValue::I64(42));
    c.set_attr(run, "label", AttrValue::from("calibration"));
    let nested = c.create_group(run, "nested").unwrap();
    c.create_dataset(nested, "grid", DataArray::F64((0..12).map(f64::from).collect()), &[3, 4])
        .unwrap();
    let target = c.reference(nested);
    c.create_dataset(run, "links", DataArray::Ref(vec![target, target]), &[2])
        .unwrap();
    c
}

#[test]
fn write_then_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.uhs");

    let c = make_tree();
    c.write_to(&path, &FileCreateProps::default()).unwrap();
    let back = Container::open(&path, &FileAccessProps::default()).unwrap();

    assert_eq!(back, c);
    let grid = back.lookup("/run/nested/grid").unwrap();
    let ds = back.dataset(grid).unwrap();
    assert_eq!(ds.shape, vec![3, 4]);
    assert_eq!(back.attr(back.lookup("/run").unwrap(), "id"), Some(&AttrValue::I64(42)));
}

#[test]
fn compressed_file_is_smaller_and_equal() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("raw.uhs");
    let packed_path = dir.path().join("packed.uhs");

    let mut c = Container::new();
    c.create_dataset(c.root(), "flat", DataArray::F64(vec![1.0; 10_000]), &[100, 100])
        .unwrap();
    c.write_to(&raw_path, &FileCreateProps::default()).unwrap();
    c.write_to(&packed_path, &FileCreateProps::new().deflate(6)).unwrap();

    let raw_len = std::fs::metadata(&raw_path).unwrap().len();
    let packed_len = std::fs::metadata(&packed_path).unwrap().len();
    assert!(packed_len < raw_len);

    let back = Container::open(&packed_path, &FileAccessProps::default()).unwrap();
    assert_eq!(back, c);
}

#[test]
fn overwrite_replaces_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("over.uhs");

    make_tree().write_to(&path, &FileCreateProps::default()).unwrap();
    let empty = Container::new();
    empty.write_to(&path, &FileCreateProps::default()).unwrap();

    let back = Container::open(&path, &FileAccessProps::default()).unwrap();
    assert!(back.group_names(back.root()).is_empty());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Container::open(dir.path().join("nope.uhs"), &FileAccessProps::default())
        .unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
}

#[test]
fn unchecksummed_file_opens_with_verification_on() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.uhs");
    let c = make_tree();
    c.write_to(&path, &FileCreateProps::new().without_checksum()).unwrap();
    assert_eq!(Container::open(&path, &FileAccessProps::default()).unwrap(), c);
}
