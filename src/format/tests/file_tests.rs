//! Filesystem round-trips for images and the metadata file.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tempfile::TempDir;

use crate::format::{
    FormatError, ImageRecord, display_name_for, load_image, output_path_for, read_records,
    save_image, write_records,
};
use crate::model::{Color, Vertex};

fn sample_records() -> Vec<ImageRecord> {
    vec![
        ImageRecord::new("images/a.png", Color::new(85, 0, 0))
            .with_rectangle(Vertex::new(10, 10), Vertex::new(50, 40)),
        ImageRecord::new("images/b.png", Color::new(85, 0, 0)),
    ]
}

#[test]
fn test_write_then_read_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("output.json");

    let records = sample_records();
    write_records(&records, &path).unwrap();

    assert_eq!(read_records(&path).unwrap(), records);
}

#[test]
fn test_write_records_replaces_existing_file_without_leftovers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("output.json");
    std::fs::write(&path, "stale").unwrap();

    write_records(&sample_records(), &path).unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "temporary file should have been renamed");
    assert_eq!(read_records(&path).unwrap().len(), 2);
}

#[test]
fn test_write_records_creates_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("output.json");
    write_records(&[], &path).unwrap();
    assert_eq!(read_records(&path).unwrap(), Vec::new());
}

#[test]
fn test_read_records_missing_file() {
    let err = read_records(Path::new("/nonexistent/output.json")).unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
}

#[test]
fn test_image_round_trip_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pixels.png");

    let mut pixels = RgbImage::new(3, 2);
    pixels.put_pixel(2, 1, image::Rgb([1, 2, 3]));
    save_image(&pixels, &path).unwrap();

    assert_eq!(load_image(&path).unwrap(), pixels);
}

#[test]
fn test_load_image_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"not an image").unwrap();

    match load_image(&path) {
        Err(FormatError::Image { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected image error, got {other:?}"),
    }
}

#[test]
fn test_display_name_strips_folder_and_extension() {
    assert_eq!(display_name_for(Path::new("resources/images/cat.jpg")), "cat");
    assert_eq!(display_name_for(Path::new("noext")), "noext");
}

#[test]
fn test_output_path_keeps_file_name() {
    let out = output_path_for(Path::new("in/cat.jpg"), Path::new("out")).unwrap();
    assert_eq!(out, PathBuf::from("out/cat.jpg"));

    assert!(matches!(
        output_path_for(Path::new("/"), Path::new("out")),
        Err(FormatError::MissingFileName { .. })
    ));
}
