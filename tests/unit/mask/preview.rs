use super::*;

#[test]
fn threshold_splits_tint_and_transparent() {
    let mask = GrayImage::from_raw(4, 1, vec![0, 127, 128, 255]).unwrap();
    let out = render_overlay(&mask, PreviewStyle::default());
    assert_eq!(out.get_pixel(0, 0).0, [0, 0, 255, 255]);
    assert_eq!(out.get_pixel(1, 0).0, [0, 0, 255, 255]);
    assert_eq!(out.get_pixel(2, 0).0, [0, 0, 0, 0]);
    assert_eq!(out.get_pixel(3, 0).0, [0, 0, 0, 0]);
}

#[test]
fn custom_style_is_honored() {
    let mask = GrayImage::from_raw(2, 1, vec![10, 60]).unwrap();
    let style = PreviewStyle {
        threshold: 50,
        tint: Rgba8([255, 0, 0, 255]),
    };
    let out = render_overlay(&mask, style);
    assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(1, 0).0, [0, 0, 0, 0]);
}

#[test]
fn overlay_png_decodes_back_to_rgba() {
    let tmp = std::env::temp_dir().join(format!(
        "nerfmask_preview_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("mask.png");
    GrayImage::from_raw(2, 2, vec![0, 255, 255, 0])
        .unwrap()
        .save(&path)
        .unwrap();

    let png = overlay_png(&path, PreviewStyle::default()).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 255, 255]);
    assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 0, 0]);
    assert_eq!(decoded.get_pixel(1, 1).0, [0, 0, 255, 255]);
    std::fs::remove_dir_all(&tmp).ok();
}
