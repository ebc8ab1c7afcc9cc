use super::*;
use crate::bridge::Context;
use crate::element::ChildList;
use crate::element::props::{LayerProps, LineProps, Paint, RegionProps};
use crate::engine::recording::{EngineCall, HandleKind, RecordingEngine};
use crate::foundation::color::Color;

fn bridge() -> HostBridge<RecordingEngine> {
    HostBridge::new(Context::new(RecordingEngine::new(), &[]).unwrap())
}

fn line(x2: f64) -> SceneNode {
    SceneNode::new(LineProps {
        x2,
        y2: 10.0,
        ..LineProps::default()
    })
}

fn region(children: Vec<SceneNode>) -> SceneNode {
    SceneNode::new(RegionProps::default()).with_children(children)
}

#[test]
fn first_render_creates_everything() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    let stats = render(&mut b, &[region(vec![line(1.0), line(2.0)])], &mut target, None).unwrap();
    assert_eq!(
        stats,
        CommitStats {
            commit: 1,
            rendered: 3,
            created: 3,
            cloned: 0,
            reused: 0,
        }
    );
    assert_eq!(b.engine().draw_calls().len(), 2);
    target.release(&mut b);
    assert!(b.engine().violations().is_empty());
}

#[test]
fn identical_render_reuses_every_instance() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    let tree = [region(vec![line(1.0)])];
    render(&mut b, &tree, &mut target, None).unwrap();
    let before = target.elements();

    let stats = render(&mut b, &tree, &mut target, None).unwrap();
    assert_eq!((stats.commit, stats.reused, stats.created, stats.cloned), (2, 2, 0, 0));
    let after = target.elements();
    assert!(Node::ptr_eq(&before[0], &after[0]));
    target.release(&mut b);
}

#[test]
fn changed_props_clone_and_keep_children() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    render(&mut b, &[region(vec![line(1.0)])], &mut target, None).unwrap();
    let old = target.elements().remove(0);
    let old_children = old.children().unwrap();

    let next = SceneNode::new(RegionProps {
        clear: Some(Color::WHITE),
        rotate: None,
    })
    .child(line(1.0));
    let stats = render(&mut b, &[next], &mut target, None).unwrap();
    assert_eq!((stats.cloned, stats.reused), (1, 1));

    let new = target.elements().remove(0);
    assert!(!Node::ptr_eq(&old, &new));
    assert!(old.is_released());
    assert!(ChildList::ptr_eq(&new.children().unwrap(), &old_children));
    assert!(!new.children().unwrap().get(0).unwrap().is_released());
    target.release(&mut b);
    assert!(b.engine().violations().is_empty());
}

#[test]
fn changed_leaf_rebuilds_its_parent() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    render(&mut b, &[region(vec![line(1.0), line(2.0)])], &mut target, None).unwrap();
    let old_children = target.elements()[0].children().unwrap();

    let stats = render(&mut b, &[region(vec![line(1.0), line(5.0)])], &mut target, None).unwrap();
    assert_eq!((stats.cloned, stats.reused, stats.created), (2, 1, 0));

    let new_children = target.elements()[0].children().unwrap();
    assert!(Node::ptr_eq(
        old_children.get(0).unwrap(),
        new_children.get(0).unwrap()
    ));
    assert!(old_children.get(1).unwrap().is_released());
    assert!(!old_children.get(0).unwrap().is_released());
    assert_eq!(b.engine().live(HandleKind::Paint), 2);
    target.release(&mut b);
    assert_eq!(b.engine().live(HandleKind::Paint), 0);
    assert!(b.engine().violations().is_empty());
}

#[test]
fn tag_change_creates_a_new_instance() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    render(&mut b, &[region(vec![line(1.0)])], &mut target, None).unwrap();
    let old_line = target.elements()[0].children().unwrap().get(0).unwrap().clone();

    let layer = SceneNode::new(LayerProps {
        width: 10,
        height: 10,
        ..LayerProps::default()
    })
    .child(region(vec![]));
    let stats = render(&mut b, &[region(vec![layer])], &mut target, None).unwrap();
    assert_eq!((stats.created, stats.cloned), (2, 1));
    assert!(old_line.is_released());
    target.release(&mut b);
    assert!(b.engine().violations().is_empty());
}

#[test]
fn shrinking_the_tree_releases_the_tail() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    render(&mut b, &[region(vec![line(1.0)]), region(vec![])], &mut target, None).unwrap();
    let second = target.elements().remove(1);

    render(&mut b, &[region(vec![line(1.0)])], &mut target, None).unwrap();
    assert!(second.is_released());
    assert_eq!(target.root().children().len(), 1);

    render(&mut b, &[], &mut target, None).unwrap();
    assert_eq!(b.engine().live(HandleKind::Paint), 0);
    target.release(&mut b);
    assert!(b.engine().violations().is_empty());
}

#[test]
fn equal_props_on_fresh_elements_draw_identically() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    let styled = || {
        SceneNode::new(LineProps {
            x2: 9.0,
            paint: Some(Paint {
                color: Some(Color::rgb(1, 2, 3)),
                ..Paint::default()
            }),
            ..LineProps::default()
        })
    };
    render(&mut b, &[region(vec![styled(), styled()])], &mut target, None).unwrap();

    let descs: Vec<_> = b
        .engine()
        .calls()
        .iter()
        .filter_map(|c| match c {
            EngineCall::MakePaint { desc, .. } => Some(*desc),
            _ => None,
        })
        .collect();
    assert_eq!(descs.len(), 2);
    assert_eq!(descs[0], descs[1]);
    target.release(&mut b);
}

#[test]
fn callback_runs_after_flush() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    let mut seen = Vec::new();
    let mut cb = |s: &CommitStats| seen.push(s.commit);
    render(&mut b, &[region(vec![])], &mut target, Some(&mut cb)).unwrap();
    render(&mut b, &[region(vec![])], &mut target, Some(&mut cb)).unwrap();
    assert_eq!(seen, vec![1, 2]);
    assert!(matches!(
        b.engine().calls().last(),
        Some(EngineCall::Flush { .. })
    ));
    target.release(&mut b);
}

#[test]
fn invalid_description_commits_nothing() {
    let mut b = bridge();
    let mut target = RenderTarget::new(&mut b, 50, 50).unwrap();
    let bad = line(1.0).child(line(2.0));
    assert!(render(&mut b, &[region(vec![bad])], &mut target, None).is_err());
    assert_eq!(target.root().commits(), 0);
    assert!(target.elements().is_empty());
    target.release(&mut b);
}
