use super::*;
use crate::engine::recording::RecordingEngine;

fn recording() -> CanopyResult<DynEngine> {
    Ok(Box::new(RecordingEngine::new()))
}

#[test]
fn bridge_is_unreachable_before_startup() {
    let mut rt = Runtime::new();
    assert!(!rt.is_ready());
    let err = rt.bridge().err().unwrap();
    assert!(matches!(err, CanopyError::NotInitialized(_)));

    rt.load_engine(recording).unwrap();
    assert!(!rt.is_ready());
    let err = rt.bridge().err().unwrap();
    assert!(err.to_string().contains("default font is not loaded"));
}

#[test]
fn font_before_engine_is_not_initialized() {
    let mut rt = Runtime::new();
    let err = rt.load_default_font(FontSource::Empty).unwrap_err();
    assert!(matches!(err, CanopyError::NotInitialized(_)));
    assert!(!rt.is_ready());
}

#[test]
fn phases_complete_in_order() {
    let mut rt = Runtime::new();
    rt.load_engine(recording).unwrap();
    rt.load_default_font(FontSource::Empty).unwrap();
    assert!(rt.is_ready());
    assert!(rt.bridge().unwrap().default_fonts().is_some());

    assert!(rt.load_engine(recording).is_err());
    assert!(rt.load_default_font(FontSource::Empty).is_err());
}

#[test]
fn failed_engine_load_stays_unloaded() {
    let mut rt = Runtime::new();
    let err = rt
        .load_engine(|| Err(CanopyError::resource("no engine")))
        .unwrap_err();
    assert!(matches!(err, CanopyError::Resource(_)));
    rt.load_engine(recording).unwrap();
}

#[test]
fn missing_font_file_keeps_the_engine() {
    let mut rt = Runtime::new();
    rt.load_engine(recording).unwrap();
    let err = rt
        .load_default_font(FontSource::Path("does/not/exist.ttf".into()))
        .unwrap_err();
    assert!(err.to_string().contains("read font file"));
    assert!(!rt.is_ready());

    rt.load_default_font(FontSource::Empty).unwrap();
    assert!(rt.is_ready());
}

#[test]
fn init_runs_both_phases() {
    let bridge = init(recording, FontSource::Bytes(b"font".to_vec())).unwrap();
    assert!(bridge.default_fonts().is_some());
}
