use super::*;

fn surface(w: u32, h: u32) -> Surface {
    Surface::from_parts(SurfaceId(1), w, h, vec![0; byte_len(w, h)])
}

#[test]
fn fill_rect_clips_to_bounds() {
    let mut s = surface(4, 4);
    s.fill_rect(IntRect::new(2, 2, 10, 10), [9, 8, 7, 6]);
    assert_eq!(s.pixel(3, 3), Some([9, 8, 7, 6]));
    assert_eq!(s.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(4, 0), None);

    s.fill_rect(IntRect::new(-5, -5, 2, 2), [1, 1, 1, 1]);
    assert!(s.pixels()[..4].iter().all(|&b| b == 0));
}

#[test]
fn negative_rect_fills_normalized_area() {
    let mut s = surface(4, 4);
    s.fill_rect(IntRect::new(2, 2, -2, -2), [5, 5, 5, 5]);
    assert_eq!(s.pixel(0, 0), Some([5, 5, 5, 5]));
    assert_eq!(s.pixel(1, 1), Some([5, 5, 5, 5]));
    assert_eq!(s.pixel(2, 2), Some([0, 0, 0, 0]));
}

#[test]
fn clamped_reads_stick_to_edges() {
    let mut s = surface(2, 1);
    s.put_pixel(0, 0, [1, 0, 0, 255]);
    s.put_pixel(1, 0, [2, 0, 0, 255]);
    let v = s.view();
    assert_eq!(v.clamped(-3, 0)[0], 1);
    assert_eq!(v.clamped(7, 4)[0], 2);
}

#[test]
fn crop_copies_subrect() {
    let mut b = PixelBuffer::new(3, 3);
    b.put_pixel(1, 1, [7, 7, 7, 7]);
    let c = b.crop(IntRect::new(1, 1, 5, 5));
    assert_eq!((c.width, c.height), (2, 2));
    assert_eq!(c.pixel(0, 0), Some([7, 7, 7, 7]));
    assert!(PixelBuffer::from_pixels(2, 2, vec![0; 15]).is_none());
}

#[test]
fn write_region_clips() {
    let mut s = surface(3, 3);
    let mut src = PixelBuffer::new(2, 2);
    src.put_pixel(0, 0, [1, 1, 1, 1]);
    src.put_pixel(1, 1, [2, 2, 2, 2]);
    s.write_region(2, 2, &src.view());
    assert_eq!(s.pixel(2, 2), Some([1, 1, 1, 1]));
    s.write_region(-1, -1, &src.view());
    assert_eq!(s.pixel(0, 0), Some([2, 2, 2, 2]));
}
