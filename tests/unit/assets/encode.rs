use super::*;

#[test]
fn format_from_extension() {
    assert_eq!(SaveFormat::from_path(Path::new("a.PNG")), SaveFormat::Png);
    assert_eq!(SaveFormat::from_path(Path::new("a.jpeg")), SaveFormat::Jpeg);
    assert_eq!(SaveFormat::from_path(Path::new("a.jpg")), SaveFormat::Jpeg);
    assert_eq!(SaveFormat::from_path(Path::new("a.tga")), SaveFormat::Bmp);
    assert_eq!(SaveFormat::from_path(Path::new("noext")), SaveFormat::Bmp);
}

#[test]
fn round_trips_through_files() {
    let dir = std::env::temp_dir().join(format!("tessera_encode_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let pixels = [10u8, 20, 30, 255].repeat(4);

    for name in ["out.png", "out.bmp"] {
        let path = dir.join(name);
        encode_image(&path, 2, 2, &pixels).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.into_raw(), pixels, "{name}");
    }

    let jpg = dir.join("out.jpg");
    encode_image(&jpg, 2, 2, &pixels).unwrap();
    assert_eq!(image::open(&jpg).unwrap().width(), 2);

    assert!(encode_image(&dir.join("bad.png"), 3, 3, &pixels).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
