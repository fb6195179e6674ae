use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TesseraError::disposed("fill_rect")
            .to_string()
            .contains("disposed error:")
    );
    assert!(
        TesseraError::unsupported("blur", StorageMode::Mega)
            .to_string()
            .contains("unsupported error: blur is not supported for mega-surface bitmaps")
    );
    assert!(TesseraError::format("x").to_string().contains("format error:"));
    assert!(
        TesseraError::precondition("x")
            .to_string()
            .contains("precondition error:")
    );
    assert_eq!(
        TesseraError::storage(9000, 2, StorageCause::ExceedsMaxDimension).to_string(),
        "storage error: 9000x2 surface exceeds max texture dimension"
    );
}

#[test]
fn oversized_is_only_the_dimension_cause() {
    assert!(TesseraError::storage(1, 1, StorageCause::ExceedsMaxDimension).is_oversized());
    assert!(!TesseraError::storage(1, 1, StorageCause::OutOfMemory).is_oversized());
    assert!(!TesseraError::format("x").is_oversized());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TesseraError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
