use std::path::PathBuf;

use super::*;
use crate::element::props::{EncodedImageProps, RegionProps};

#[test]
fn normalize_rel_path_accepts_relative_forms() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
}

#[test]
fn normalize_rel_path_rejects_escapes() {
    for bad in ["/etc/passwd", "", "../x.png", "a/../../x.png", "./"] {
        let err = normalize_rel_path(bad).unwrap_err();
        assert!(matches!(err, CanopyError::Validation(_)), "{bad}");
    }
}

#[test]
fn resolve_sources_loads_nested_images() {
    let dir = PathBuf::from("target").join("scene_sources");
    std::fs::create_dir_all(dir.join("img")).unwrap();
    std::fs::write(dir.join("img").join("dot.bin"), [1u8, 2, 3]).unwrap();

    let mut node = SceneNode::new(RegionProps::default()).child(SceneNode::new(
        EncodedImageProps {
            source: Some("img/dot.bin".to_owned()),
            ..EncodedImageProps::default()
        },
    ));
    node.resolve_sources(&dir).unwrap();

    let Props::EncodedImage(p) = &node.children[0].props else {
        panic!("expected encoded-image props");
    };
    assert_eq!(p.bytes, vec![1, 2, 3]);
}

#[test]
fn resolve_sources_reports_missing_files() {
    let mut node = SceneNode::new(EncodedImageProps {
        source: Some("missing/none.png".to_owned()),
        ..EncodedImageProps::default()
    });
    let err = node
        .resolve_sources(&PathBuf::from("target").join("scene_sources_missing"))
        .unwrap_err();
    assert!(err.to_string().contains("read image source"));
}

#[test]
fn resolve_sources_keeps_inline_bytes() {
    let mut node = SceneNode::new(EncodedImageProps {
        bytes: vec![9],
        source: Some("/absolute.png".to_owned()),
        ..EncodedImageProps::default()
    });
    node.resolve_sources(&PathBuf::from(".")).unwrap();
    let Props::EncodedImage(p) = &node.props else {
        panic!("expected encoded-image props");
    };
    assert_eq!(p.bytes, vec![9]);
}
