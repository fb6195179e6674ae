use super::*;

fn dot() -> PixelBuffer {
    let mut b = PixelBuffer::new(1, 1);
    b.put_pixel(0, 0, [255, 255, 255, 255]);
    b
}

#[test]
fn fixup_replaces_line_breaks() {
    assert_eq!(fixup_text("a\r\nb").as_deref(), Some("a  b"));
    assert_eq!(fixup_text(""), None);
    assert_eq!(fixup_text(" "), None);
    assert_eq!(fixup_text("\n"), None);
    assert_eq!(fixup_text("  ").as_deref(), Some("  "));
}

#[test]
fn shadow_grows_by_one_and_is_black_under_glyph() {
    let out = apply_shadow(&dot(), [255, 0, 0, 255]);
    assert_eq!((out.width, out.height), (2, 2));
    assert_eq!(out.pixel(0, 0), Some([255, 0, 0, 255]));
    // Pure shadow pixel: co1 = 0, so rgb is black.
    assert_eq!(out.pixel(1, 1), Some([0, 0, 0, 255]));
    assert_eq!(out.pixel(1, 0), Some([0, 0, 0, 0]));
}

#[test]
fn outline_surrounds_glyph() {
    let out = apply_outline(&dot(), Color::new(0.0, 0.0, 255.0, 10.0), 1);
    assert_eq!((out.width, out.height), (3, 3));
    assert_eq!(out.pixel(1, 1), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(0, 1), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(1, 0), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(0, 0), Some([0, 0, 255, 255]));
}

#[test]
fn zero_outline_is_identity() {
    assert_eq!(apply_outline(&dot(), Color::black(), 0), dot());
}

#[test]
fn threshold_is_binary() {
    let mut b = PixelBuffer::new(2, 1);
    b.put_pixel(0, 0, [1, 1, 1, 127]);
    b.put_pixel(1, 0, [1, 1, 1, 128]);
    threshold_alpha(&mut b);
    assert_eq!(b.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(b.pixel(1, 0).unwrap()[3], 255);
}
