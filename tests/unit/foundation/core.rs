use super::*;

#[test]
fn resolution_key_is_width_by_height() {
    let r = Resolution::new(1000, 800);
    assert_eq!(r.key(), "1000x800");
    assert_eq!(r.to_string(), "1000x800");
}

#[test]
fn checked_index_rejects_negative_and_past_end() {
    assert_eq!(checked_index(0, 3).unwrap(), 0);
    assert_eq!(checked_index(2, 3).unwrap(), 2);
    assert!(matches!(
        checked_index(-1, 3),
        Err(NerfmaskError::OutOfBounds {
            index: -1,
            framecount: 3
        })
    ));
    assert!(matches!(
        checked_index(3, 3),
        Err(NerfmaskError::OutOfBounds { index: 3, .. })
    ));
    assert!(checked_index(0, 0).is_err());
}

#[test]
fn of_image_missing_file_is_not_found() {
    let err = Resolution::of_image(Path::new("/definitely/not/here.png")).unwrap_err();
    assert!(matches!(err, NerfmaskError::NotFound(_)));
}
