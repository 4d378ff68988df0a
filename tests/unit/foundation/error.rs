use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        NerfmaskError::not_found("x")
            .to_string()
            .contains("not found:")
    );
    assert!(NerfmaskError::parse("x").to_string().contains("parse error:"));
    assert!(
        NerfmaskError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert_eq!(
        NerfmaskError::out_of_bounds(-1, 3).to_string(),
        "index out of bounds: -1 (framecount 3)"
    );
    assert_eq!(
        NerfmaskError::NoMaskAvailable { index: 2 }.to_string(),
        "no mask available for frame 2"
    );
}

#[test]
fn io_preserves_context_chain() {
    let base = std::io::Error::other("boom");
    let err = NerfmaskError::from(anyhow::Error::new(base).context("copy mask"));
    let msg = err.to_string();
    assert!(msg.starts_with("io error: copy mask"));
    assert!(msg.contains("boom"));
}
