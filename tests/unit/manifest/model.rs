use serde_json::json;

use super::*;

const SAMPLE: &str = r#"{
    "camera_model": "OPENCV",
    "fl_x": 1000.0,
    "frames": [
        {
            "file_path": "images/frame_00001.jpg",
            "transform_matrix": [[1, 0], [0, 1]],
            "mask_path": "masks/frame_00001.png",
            "colmap_im_id": 1
        },
        {
            "colmap_im_id": 2,
            "file_path": "images/frame_00002.jpg"
        }
    ],
    "ply_file_path": "sparse_pc.ply"
}"#;

#[test]
fn parse_reads_paths_and_keeps_other_fields() {
    let m = Manifest::from_json_str(SAMPLE).unwrap();
    assert_eq!(m.len(), 2);
    assert_eq!(m.frames()[0].file_path(), Some("images/frame_00001.jpg"));
    assert_eq!(m.frames()[0].mask_path(), Some("masks/frame_00001.png"));
    assert_eq!(m.frames()[1].mask_path(), None);
    assert_eq!(m.frames()[1].fields()["colmap_im_id"], json!(2));
    assert_eq!(m.extra("camera_model"), Some(&json!("OPENCV")));
    assert_eq!(m.extra("frames"), None);
}

#[test]
fn rewrite_preserves_key_order() {
    let mut m = Manifest::from_json_str(SAMPLE).unwrap();
    m.frame_mut(0).unwrap().set_mask_path("generated_masks/generated_mask_0.jpeg");
    m.frame_mut(1).unwrap().set_mask_path("empty_masks/empty_mask_4x2.jpeg");

    let value = serde_json::Value::from(m);
    let top: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(top, ["camera_model", "fl_x", "frames", "ply_file_path"]);

    let f0: Vec<&str> = value["frames"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(f0, ["file_path", "transform_matrix", "mask_path", "colmap_im_id"]);
    assert_eq!(
        value["frames"][0]["mask_path"],
        json!("generated_masks/generated_mask_0.jpeg")
    );

    let f1: Vec<&str> = value["frames"][1]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(f1, ["colmap_im_id", "file_path", "mask_path"]);
}

#[test]
fn pretty_output_uses_four_space_indent_and_reparses() {
    let m = Manifest::from_json_str(SAMPLE).unwrap();
    let text = m.to_json_pretty().unwrap();
    assert!(text.contains("\n    \"camera_model\""));
    assert_eq!(Manifest::from_json_str(&text).unwrap(), m);
}

#[test]
fn malformed_documents_are_parse_errors() {
    for bad in [
        "not json",
        "[]",
        r#"{"fl_x": 1}"#,
        r#"{"frames": {}}"#,
        r#"{"frames": [1, 2]}"#,
    ] {
        let err = Manifest::from_json_str(bad).unwrap_err();
        assert!(matches!(err, NerfmaskError::Parse(_)), "{bad}: {err}");
    }
}

#[test]
fn frame_without_file_path_still_parses() {
    let m = Manifest::from_json_str(r#"{"frames": [{"mask_path": "m.png"}]}"#).unwrap();
    assert_eq!(m.frames()[0].file_path(), None);
}

#[test]
fn repoint_masks_leaves_source_untouched() {
    let m = Manifest::from_json_str(SAMPLE).unwrap();
    let mut paths = BTreeMap::new();
    paths.insert(0, "backup_masks/mask_0.png".to_string());
    paths.insert(7, "backup_masks/mask_7.png".to_string());

    let backup = repoint_masks(&m, &paths);
    assert_eq!(backup.frames()[0].mask_path(), Some("backup_masks/mask_0.png"));
    assert_eq!(backup.frames()[1].mask_path(), None);
    assert_eq!(m.frames()[0].mask_path(), Some("masks/frame_00001.png"));
    assert_eq!(backup.frames()[0].fields()["colmap_im_id"], json!(1));
}

#[test]
fn new_manifest_serializes_frames() {
    let m = Manifest::new(vec![
        FrameRecord::new("a.png").with_field("w", json!(4)),
        FrameRecord::new("b.png"),
    ]);
    let value = serde_json::Value::from(m);
    assert_eq!(
        value,
        json!({"frames": [{"file_path": "a.png", "w": 4}, {"file_path": "b.png"}]})
    );
}
