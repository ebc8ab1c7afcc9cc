use super::*;
use crate::element::props::{EncodedImageProps, LayerProps, LineProps, RegionProps};
use crate::foundation::color::Color;

#[test]
fn parses_nested_json() {
    let json = r##"[
        { "type": "region", "clear": "#ff0000", "children": [
            { "type": "line", "x1": 0, "y1": 1, "x2": 10, "y2": 11,
              "paint": { "color": [0, 0, 255], "strokeWidth": 2 } },
            { "type": "layer", "width": 20, "height": 10, "dx": 5, "children": [
                { "type": "region", "rotate": { "degree": 45, "px": 10, "py": 5 } }
            ] }
        ] }
    ]"##;
    let nodes = SceneNode::list_from_json(json).unwrap();
    assert_eq!(nodes.len(), 1);
    let root = &nodes[0];
    assert_eq!(root.tag(), ElementTag::Region);
    assert_eq!(root.count(), 4);

    let Props::Region(r) = &root.props else {
        panic!("expected region props");
    };
    assert_eq!(r.clear, Some(Color::rgb(255, 0, 0)));

    let Props::Line(l) = &root.children[0].props else {
        panic!("expected line props");
    };
    assert_eq!((l.x2, l.y2), (10.0, 11.0));
    let paint = l.paint.unwrap();
    assert_eq!(paint.color, Some(Color::rgb(0, 0, 255)));
    assert_eq!(paint.stroke_width, Some(2.0));

    let Props::Layer(layer) = &root.children[1].props else {
        panic!("expected layer props");
    };
    assert_eq!((layer.width, layer.height, layer.dx, layer.dy), (20, 10, 5.0, 0.0));
    root.validate().unwrap();
}

#[test]
fn unknown_type_is_rejected() {
    let err = SceneNode::list_from_json(r#"[{ "type": "ck-canvas" }]"#).unwrap_err();
    assert!(matches!(err, CanopyError::Validation(_)));
}

#[test]
fn builders_match_json() {
    let built = SceneNode::new(RegionProps::default()).with_children([
        SceneNode::new(LineProps::default()),
        SceneNode::new(LineProps {
            x2: 3.0,
            ..LineProps::default()
        }),
    ]);
    let json = serde_json::to_string(&[built.clone()]).unwrap();
    assert_eq!(SceneNode::list_from_json(&json).unwrap(), vec![built]);
}

#[test]
fn leaves_cannot_have_children() {
    let node = SceneNode::new(LineProps::default()).child(SceneNode::new(LineProps::default()));
    let err = node.validate().unwrap_err();
    assert!(err.to_string().contains("line cannot have children"));
}

#[test]
fn layers_need_a_size() {
    let node = SceneNode::new(RegionProps::default()).child(SceneNode::new(LayerProps {
        width: 0,
        height: 10,
        ..LayerProps::default()
    }));
    let err = node.validate().unwrap_err();
    assert!(err.to_string().contains("layer size must be non-zero"));
}

#[test]
fn images_need_bytes_or_a_source() {
    let err = SceneNode::new(EncodedImageProps::default())
        .validate()
        .unwrap_err();
    assert!(matches!(err, CanopyError::Validation(_)));
}
