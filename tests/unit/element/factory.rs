use super::*;
use crate::element::props::{LineProps, ParagraphProps, RegionProps};
use crate::engine::ParagraphStyle;

#[test]
fn creates_each_tag_from_its_string_form() {
    let node = create_element("region", RegionProps::default().into()).unwrap();
    assert_eq!(node.tag(), ElementTag::Region);
    assert!(!node.is_released());
    assert!(node.children().unwrap().is_empty());

    let node = create_element("line", LineProps::default().into()).unwrap();
    assert_eq!(node.tag(), ElementTag::Line);

    let node = create_element(
        "paragraph",
        ParagraphProps {
            text: "hi".to_owned(),
            layout: 100.0,
            x: 0.0,
            y: 0.0,
            style: ParagraphStyle::default(),
            font_context: None,
        }
        .into(),
    )
    .unwrap();
    assert_eq!(node.tag(), ElementTag::Paragraph);
}

#[test]
fn unrecognized_tag_is_structural() {
    let err = create_element("ck-text", RegionProps::default().into()).unwrap_err();
    assert!(matches!(err, CanopyError::Structural(_)));
    assert!(err.to_string().contains("unrecognized element type \"ck-text\""));
}

#[test]
fn mismatched_props_are_structural() {
    let err = create_from_tag(ElementTag::Layer, LineProps::default().into()).unwrap_err();
    assert!(err.to_string().contains("cannot create layer from line props"));
}

#[test]
fn ids_are_unique() {
    let a = create_element("region", RegionProps::default().into()).unwrap();
    let b = create_element("region", RegionProps::default().into()).unwrap();
    assert_ne!(a.id(), b.id());
    assert!(!Node::ptr_eq(&a, &b));
}
