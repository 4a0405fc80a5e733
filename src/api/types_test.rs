#![allow(clippy::float_cmp)]

use super::*;

// =============================================================================
// parse_project
// =============================================================================

#[test]
fn parse_project_reads_images_in_order() {
    let json = r#"{
        "id": "p1",
        "name": "Streets",
        "images": [
            {"id": "i1", "file_path": "a.jpg", "filename": "a.jpg"},
            {"id": "i2", "file_path": "b.png", "filename": "b.png"}
        ]
    }"#;
    let project = parse_project(json).unwrap();
    assert_eq!(project.id, "p1");
    assert_eq!(project.name, "Streets");
    let ids: Vec<&str> = project.images.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["i1", "i2"]);
    assert_eq!(project.images[1].file_path, "b.png");
}

#[test]
fn parse_project_missing_images_is_empty() {
    let project = parse_project(r#"{"id": "p1", "name": "Empty"}"#).unwrap();
    assert!(project.images.is_empty());
}

#[test]
fn parse_project_images_not_a_list_is_empty() {
    let project = parse_project(r#"{"images": {"id": "i1"}}"#).unwrap();
    assert!(project.images.is_empty());
    assert!(project.id.is_empty());
}

#[test]
fn parse_project_numeric_id_is_stringified() {
    let project = parse_project(r#"{"id": 7, "images": []}"#).unwrap();
    assert_eq!(project.id, "7");
}

#[test]
fn parse_project_skips_malformed_images() {
    let project = parse_project(r#"{"images": [{"id": "i1"}, 42, "x", {"id": "i2", "file_path": "b.jpg"}]}"#).unwrap();
    assert_eq!(project.images.len(), 2);
    assert_eq!(project.images[0].file_path, "");
}

#[test]
fn parse_project_invalid_json_errors() {
    assert!(matches!(parse_project("{not json"), Err(ApiError::Parse(_))));
}

// =============================================================================
// parse_annotations
// =============================================================================

#[test]
fn parse_annotations_reads_wire_shape() {
    let json = r#"[{"id": "a1", "x": 10, "y": 10.5, "width": 50, "height": 40, "label": "car"}]"#;
    let list = parse_annotations(json).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "a1");
    assert_eq!((list[0].x, list[0].y, list[0].width, list[0].height), (10.0, 10.5, 50.0, 40.0));
    assert_eq!(list[0].label, "car");
}

#[test]
fn parse_annotations_non_array_is_empty() {
    assert!(parse_annotations(r#"{"detail": "Not Found"}"#).unwrap().is_empty());
    assert!(parse_annotations("null").unwrap().is_empty());
}

#[test]
fn parse_annotations_skips_malformed_entries() {
    let json = r#"[
        {"id": "a1", "x": 1, "y": 2, "width": 3, "height": 4, "label": "ok"},
        {"id": "a2", "x": "left"},
        {"id": "a3", "x": 1, "y": 2, "width": 3, "height": 4, "label": "ok"}
    ]"#;
    let ids: Vec<String> = parse_annotations(json).unwrap().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, ["a1", "a3"]);
}

// =============================================================================
// parse_classes
// =============================================================================

#[test]
fn parse_classes_reads_list() {
    assert_eq!(parse_classes(r#"{"classes": ["car", "dog"]}"#).unwrap(), ["car", "dog"]);
}

#[test]
fn parse_classes_missing_or_wrong_type_is_empty() {
    assert!(parse_classes("{}").unwrap().is_empty());
    assert!(parse_classes(r#"{"classes": "car"}"#).unwrap().is_empty());
}

#[test]
fn parse_classes_drops_non_strings() {
    assert_eq!(parse_classes(r#"{"classes": ["car", 3, null, "bus"]}"#).unwrap(), ["car", "bus"]);
}

// =============================================================================
// ApiError
// =============================================================================

#[test]
fn status_error_message_includes_code() {
    let err = ApiError::Status { status: 500, body: "boom".into() };
    assert_eq!(err.to_string(), "remote returned status 500");
}
