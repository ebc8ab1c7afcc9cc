use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CanopyError::structural("x")
            .to_string()
            .contains("structural error:")
    );
    assert!(
        CanopyError::released("x")
            .to_string()
            .contains("already released:")
    );
    assert!(
        CanopyError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        CanopyError::not_initialized("x")
            .to_string()
            .contains("not initialized:")
    );
    assert!(
        CanopyError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn fatal_classification() {
    assert!(CanopyError::structural("x").is_fatal());
    assert!(CanopyError::released("x").is_fatal());
    assert!(CanopyError::not_initialized("x").is_fatal());
    assert!(!CanopyError::resource("x").is_fatal());
    assert!(!CanopyError::validation("x").is_fatal());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CanopyError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
