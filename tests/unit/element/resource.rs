use super::*;
use crate::engine::PaintDesc;
use crate::engine::recording::{HandleKind, RecordingEngine};
use crate::foundation::error::CanopyError;

#[test]
fn recreate_releases_previous_handle_first() {
    let mut engine = RecordingEngine::new();
    let mut owned = Owned::<PaintHandle>::empty();

    let first = owned
        .recreate(&mut engine, |e| Ok(e.make_paint(&PaintDesc::default())))
        .unwrap();
    let second = owned
        .recreate(&mut engine, |e| Ok(e.make_paint(&PaintDesc::default())))
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(owned.get(), Some(second));
    assert_eq!(engine.created(HandleKind::Paint), 2);
    assert_eq!(engine.deleted(HandleKind::Paint), 1);

    assert!(owned.release(&mut engine));
    assert!(!owned.release(&mut engine));
    assert_eq!(engine.deleted(HandleKind::Paint), 2);
    assert!(engine.violations().is_empty());
}

#[test]
fn failed_recreate_leaves_owner_empty() {
    let mut engine = RecordingEngine::new().with_max_surface_dim(4);
    let mut owned = Owned::<SurfaceHandle>::empty();
    owned
        .recreate(&mut engine, |e| e.make_surface(4, 4))
        .unwrap();
    let err = owned
        .recreate(&mut engine, |e| e.make_surface(40, 4))
        .unwrap_err();
    assert!(matches!(err, CanopyError::Resource(_)));
    assert_eq!(owned.get(), None);
    assert_eq!(engine.live(HandleKind::Surface), 0);
}

#[test]
fn get_or_create_keeps_existing_handle() {
    let mut engine = RecordingEngine::new();
    let mut owned = Owned::<SurfaceHandle>::empty();
    let a = owned
        .get_or_create(&mut engine, |e| e.make_surface(2, 2))
        .unwrap();
    let b = owned
        .get_or_create(&mut engine, |e| e.make_surface(2, 2))
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(engine.created(HandleKind::Surface), 1);
    owned.release(&mut engine);
}

#[test]
fn transient_is_released_on_error_path() {
    let mut engine = RecordingEngine::new();
    let surface = engine.make_surface(2, 2).unwrap();
    let image = engine.snapshot(surface).unwrap();

    let out: CanopyResult<()> = with_transient(&mut engine, image, |_, _| {
        Err(CanopyError::resource("boom"))
    });
    assert!(out.is_err());
    assert_eq!(engine.live(HandleKind::Image), 0);
}
