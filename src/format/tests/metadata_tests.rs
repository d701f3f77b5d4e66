//! Tests for the metadata projections and the JSON record layout.

use std::path::PathBuf;

use image::RgbImage;
use serde_json::json;

use crate::format::{ImageRecord, Metadata, RectangleMetadata, VertexEntry};
use crate::model::{Color, Vertex};

const DARK_RED: Color = Color::new(85, 0, 0);

fn metadata_with_two_rectangles() -> Metadata {
    Metadata {
        original_file_path: PathBuf::from("images/photo1.jpg"),
        display_name: "photo1".to_string(),
        pixels: RgbImage::new(4, 4),
        rectangles: vec![
            RectangleMetadata {
                vertices: [VertexEntry { x: 10, y: 10 }, VertexEntry { x: 50, y: 40 }],
                color: DARK_RED,
            },
            RectangleMetadata {
                vertices: [VertexEntry { x: 7, y: 3 }, VertexEntry { x: 1, y: 2 }],
                color: DARK_RED,
            },
        ],
    }
}

#[test]
fn test_record_json_layout() {
    let record = metadata_with_two_rectangles().to_record(DARK_RED);
    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(
        value,
        json!({
            "image": "images/photo1.jpg",
            "coordinates": [
                [{"x": 10, "y": 10}, {"x": 50, "y": 40}],
                [{"x": 7, "y": 3}, {"x": 1, "y": 2}]
            ],
            "rectangle_color": "#550000"
        })
    );
}

#[test]
fn test_record_without_rectangles_has_empty_coordinates() {
    let record = ImageRecord::new("a.jpg", Color::BLACK);
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["coordinates"], json!([]));
    assert_eq!(value["rectangle_color"], json!("#000000"));
}

#[test]
fn test_record_parses_from_json() {
    let json = r##"[
        {
            "image": "resources/images/cat.jpg",
            "coordinates": [[{"x": 1, "y": 2}, {"x": 3, "y": 4}]],
            "rectangle_color": "#00ff00"
        }
    ]"##;

    let records: Vec<ImageRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].image, PathBuf::from("resources/images/cat.jpg"));
    assert_eq!(records[0].rectangle_color, Color::new(0, 255, 0));

    let rects: Vec<_> = records[0].rectangles().collect();
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0].vertices(), &[Vertex::new(1, 2), Vertex::new(3, 4)]);
    assert_eq!(rects[0].color(), Color::new(0, 255, 0));
}

#[test]
fn test_record_rejects_bad_colour() {
    let json = r#"{"image": "a.jpg", "coordinates": [], "rectangle_color": "red"}"#;
    assert!(serde_json::from_str::<ImageRecord>(json).is_err());
}

#[test]
fn test_record_rejects_single_vertex_pair() {
    let json = r##"{"image": "a.jpg", "coordinates": [[{"x": 1, "y": 2}]], "rectangle_color": "#000000"}"##;
    assert!(serde_json::from_str::<ImageRecord>(json).is_err());
}

#[test]
fn test_with_rectangle_builder() {
    let record = ImageRecord::new("a.jpg", DARK_RED)
        .with_rectangle(Vertex::new(1, 1), Vertex::new(2, 2))
        .with_rectangle(Vertex::new(3, 3), Vertex::new(4, 4));
    assert_eq!(record.coordinates.len(), 2);
    assert_eq!(record.coordinates[1][0], VertexEntry { x: 3, y: 3 });
}
