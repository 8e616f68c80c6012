use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::render("x").to_string().contains("render error:"));
    assert!(
        ReelError::synthesis("x")
            .to_string()
            .contains("synthesis error:")
    );
    assert!(
        ReelError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(ReelError::Io("x".into()).to_string().contains("io error:"));
    assert!(
        ReelError::from(serde_json::from_str::<u8>("nope").unwrap_err())
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn kind_matches_variant() {
    assert_eq!(ReelError::validation("x").kind(), ErrorKind::Validation);
    assert_eq!(ReelError::encoding("x").kind(), ErrorKind::Encoding);
    assert_eq!(ReelError::cancelled("x").kind(), ErrorKind::Cancelled);
    assert_eq!(
        ReelError::Other(anyhow::anyhow!("x")).kind(),
        ErrorKind::Other
    );
}

#[test]
fn io_at_names_the_path() {
    let err = ReelError::io_at(
        "write frame",
        std::path::Path::new("/tmp/f.png"),
        std::io::Error::other("disk full"),
    );
    let msg = err.to_string();
    assert!(msg.contains("/tmp/f.png"));
    assert!(msg.contains("disk full"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
