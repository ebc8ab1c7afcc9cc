use super::*;
use crate::element::props::{LayerProps, LineProps, ParagraphProps, RegionProps};
use crate::engine::ParagraphStyle;
use crate::engine::recording::{EngineCall, HandleKind, RecordingEngine};

fn bridge() -> HostBridge<RecordingEngine> {
    HostBridge::new(Context::new(RecordingEngine::new(), &[]).unwrap())
}

fn paragraph(text: &str) -> Props {
    ParagraphProps {
        text: text.to_owned(),
        layout: 200.0,
        x: 0.0,
        y: 0.0,
        style: ParagraphStyle::default(),
        font_context: None,
    }
    .into()
}

#[test]
fn bare_text_is_rejected() {
    let b = bridge();
    let err = b
        .create_text_instance("hello", &HostContext::default())
        .unwrap_err();
    assert!(matches!(err, CanopyError::Structural(_)));
    assert!(err.to_string().contains("\"hello\" must be wrapped in a paragraph"));
    assert!(b.should_set_text_content(ElementTag::Paragraph));
    assert!(!b.should_set_text_content(ElementTag::Region));
}

#[test]
fn paragraphs_pick_up_the_host_font_context() {
    let mut b = bridge();
    let root = b.make_root(10, 10).unwrap();
    let host = b.root_context(&root);
    assert_eq!(host, b.child_context(&host, ElementTag::Region));

    let node = b.create_instance("paragraph", paragraph("a"), &host).unwrap();
    let Props::Paragraph(p) = node.props().unwrap() else {
        panic!("expected paragraph props");
    };
    assert_eq!(p.font_context, b.default_fonts());

    // A replacement without its own context inherits the old one.
    let extra = b.register_fonts(&[b"other".to_vec()]).unwrap();
    let mut props = paragraph("b");
    if let Props::Paragraph(p) = &mut props {
        p.font_context = Some(extra);
    }
    let own = b.create_instance("paragraph", props, &host).unwrap();
    let cloned = b.clone_instance(&own, paragraph("c"), false).unwrap();
    let Props::Paragraph(p) = cloned.props().unwrap() else {
        panic!("expected paragraph props");
    };
    assert_eq!(p.font_context, Some(extra));
    b.release_root(root);
}

#[test]
fn clone_shares_or_drops_children() {
    let b = bridge();
    let host = HostContext::default();
    let region = b
        .create_instance("region", RegionProps::default().into(), &host)
        .unwrap();
    b.append_initial_child(
        &region,
        b.create_instance("line", LineProps::default().into(), &host)
            .unwrap(),
    )
    .unwrap();

    let kept = b
        .clone_instance(&region, RegionProps::default().into(), true)
        .unwrap();
    assert!(ChildList::ptr_eq(
        &kept.children().unwrap(),
        &region.children().unwrap()
    ));
    assert!(!Node::ptr_eq(&kept, &region));

    let fresh = b
        .clone_instance(&region, RegionProps::default().into(), false)
        .unwrap();
    assert!(fresh.children().unwrap().is_empty());
    assert_eq!(region.children().unwrap().len(), 1);
}

#[test]
fn clone_rejects_props_of_another_tag() {
    let b = bridge();
    let region = b
        .create_instance("region", RegionProps::default().into(), &HostContext::default())
        .unwrap();
    let err = b
        .clone_instance(&region, LineProps::default().into(), false)
        .unwrap_err();
    assert!(err.to_string().contains("cannot create region from line props"));
}

#[test]
fn clone_of_a_released_element_is_fatal() {
    let mut b = bridge();
    let host = HostContext::default();
    let region = b
        .create_instance("region", RegionProps::default().into(), &host)
        .unwrap();
    b.append_initial_child(
        &region,
        b.create_instance("line", LineProps::default().into(), &host)
            .unwrap(),
    )
    .unwrap();
    region.release(b.engine_mut());

    for keep_children in [true, false] {
        let err = b
            .clone_instance(&region, RegionProps::default().into(), keep_children)
            .unwrap_err();
        assert!(matches!(err, CanopyError::Released(_)));
        assert!(err.is_fatal());
    }
}

#[test]
fn replacing_with_an_empty_set_releases_everything() {
    let mut b = bridge();
    let mut root = b.make_root(40, 40).unwrap();
    let host = b.root_context(&root);

    let region = b
        .create_instance("region", RegionProps::default().into(), &host)
        .unwrap();
    let line = b
        .create_instance("line", LineProps::default().into(), &host)
        .unwrap();
    b.append_initial_child(&region, line.clone()).unwrap();
    let mut set = b.create_child_set();
    b.append_child_to_set(&mut set, region.clone());
    b.replace_container_children(&mut root, set);
    b.commit_root(&mut root).unwrap();
    assert_eq!(b.engine().live(HandleKind::Paint), 1);

    let empty = b.create_child_set();
    b.replace_container_children(&mut root, empty);
    assert!(region.is_released());
    assert!(line.is_released());
    assert_eq!(b.engine().live(HandleKind::Paint), 0);
    assert!(root.children().is_empty());

    let stats = b.commit_root(&mut root).unwrap();
    assert_eq!(stats.rendered, 0);
    assert_eq!(stats.commit, 2);
    b.release_root(root);
    assert!(b.engine().violations().is_empty());
}

#[test]
fn replacing_keeps_elements_shared_with_the_incoming_set() {
    let mut b = bridge();
    let mut root = b.make_root(40, 40).unwrap();
    let host = b.root_context(&root);

    let region = b
        .create_instance("region", RegionProps::default().into(), &host)
        .unwrap();
    let line = b
        .create_instance("line", LineProps::default().into(), &host)
        .unwrap();
    b.append_initial_child(&region, line.clone()).unwrap();
    b.replace_container_children(&mut root, [region.clone()].into_iter().collect());
    b.commit_root(&mut root).unwrap();

    let next = b
        .clone_instance(&region, RegionProps::default().into(), true)
        .unwrap();
    b.replace_container_children(&mut root, [next.clone()].into_iter().collect());
    assert!(region.is_released());
    assert!(!line.is_released());

    b.commit_root(&mut root).unwrap();
    b.release_root(root);
    assert!(line.is_released());
    assert!(b.engine().violations().is_empty());
}

#[test]
fn replace_children_on_a_nested_container() {
    let mut b = bridge();
    let host = HostContext::default();
    let region = b
        .create_instance("region", RegionProps::default().into(), &host)
        .unwrap();
    let old = b
        .create_instance("line", LineProps::default().into(), &host)
        .unwrap();
    b.append_initial_child(&region, old.clone()).unwrap();

    let new = b
        .create_instance("line", LineProps::default().into(), &host)
        .unwrap();
    b.replace_children(&region, [new.clone()].into_iter().collect())
        .unwrap();
    assert!(old.is_released());
    assert!(!new.is_released());
    assert!(Node::ptr_eq(region.children().unwrap().get(0).unwrap(), &new));

    let leaf = b
        .create_instance("line", LineProps::default().into(), &host)
        .unwrap();
    assert!(b.replace_children(&leaf, ChildList::new()).is_err());
}

#[test]
fn commit_renders_root_children_as_regions() {
    let mut b = bridge();
    let mut root = b.make_root(40, 40).unwrap();
    let host = b.root_context(&root);

    let layer = b
        .create_instance(
            "layer",
            LayerProps {
                width: 10,
                height: 10,
                ..LayerProps::default()
            }
            .into(),
            &host,
        )
        .unwrap();
    b.replace_container_children(&mut root, [layer].into_iter().collect());
    let err = b.commit_root(&mut root).unwrap_err();
    assert!(err.to_string().contains("expected region parent for layer"));
    assert_eq!(root.commits(), 0);

    b.release_root(root);
    assert!(b.engine().violations().is_empty());
}

#[test]
fn commit_flushes_the_root_surface_last() {
    let mut b = bridge();
    let mut root = b.make_root(40, 40).unwrap();
    let host = b.root_context(&root);
    let region = b
        .create_instance("region", RegionProps::default().into(), &host)
        .unwrap();
    b.replace_container_children(&mut root, [region].into_iter().collect());

    let stats = b.commit_root(&mut root).unwrap();
    assert_eq!(stats.commit, 1);
    assert_eq!(stats.rendered, 1);
    let surface = root.surface().unwrap();
    assert_eq!(
        b.engine().calls().last(),
        Some(&EngineCall::Flush { surface })
    );
    b.release_root(root);
}

#[test]
fn shutdown_releases_font_contexts() {
    let mut b = bridge();
    b.register_fonts(&[]).unwrap();
    let root = b.make_root(4, 4).unwrap();
    b.release_root(root);
    let engine = b.shutdown();
    assert_eq!(engine.live(HandleKind::FontContext), 0);
    assert_eq!(engine.live(HandleKind::Surface), 0);
    assert!(engine.violations().is_empty());
}
