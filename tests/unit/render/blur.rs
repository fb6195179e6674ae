use super::*;

fn blur(src: &[u8], w: u32, h: u32, radius: u32) -> Vec<u8> {
    let mut tmp = vec![0u8; src.len()];
    let mut out = vec![0u8; src.len()];
    box_blur_rgba8(src, &mut tmp, &mut out, w, h, radius).unwrap();
    out
}

#[test]
fn kernel_sums_to_one() {
    for r in 1..5 {
        assert_eq!(box_kernel_q16(r).iter().sum::<u32>(), 65536);
    }
}

#[test]
fn radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur(&src, 1, 2, 0), src);
}

#[test]
fn constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    assert_eq!(blur(&src, w, h, 1), src);
}

#[test]
fn single_pixel_spreads_to_3x3() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);
    let out = blur(&src, w, h, 1);

    let at = |x: u32, y: u32| out[((y * w + x) * 4 + 3) as usize];
    assert!(at(2, 2) > 0);
    assert!(at(1, 1) > 0);
    assert!(at(3, 3) > 0);
    assert_eq!(at(0, 0), 0);
    assert_eq!(at(4, 2), 0);
    assert!(at(2, 2) < 255);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let src = vec![0u8; 16];
    let mut tmp = vec![0u8; 16];
    let mut out = vec![0u8; 12];
    assert!(box_blur_rgba8(&src, &mut tmp, &mut out, 2, 2, 1).is_err());
}
