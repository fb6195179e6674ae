use super::*;

#[test]
fn opaque_source_replaces() {
    assert_eq!(over_straight([1, 2, 3, 4], [9, 9, 9, 255], 1.0), [9, 9, 9, 255]);
}

#[test]
fn zero_opacity_or_alpha_keeps_destination() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over_straight(dst, [255, 255, 255, 255], 0.0), dst);
    assert_eq!(over_straight(dst, [255, 255, 255, 0], 1.0), dst);
}

#[test]
fn half_over_transparent_keeps_source_colour() {
    // co2 is zero over a transparent destination, so rgb comes from the source alone.
    let out = over_straight([0, 0, 0, 0], [200, 100, 50, 255], 0.5);
    assert_eq!(out, [200, 100, 50, 128]);
}

#[test]
fn half_over_opaque_mixes() {
    let out = over_straight([0, 0, 0, 255], [200, 100, 50, 255], 0.5);
    assert_eq!(out, [100, 50, 25, 255]);
}

#[test]
fn over_in_place_checks_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    over_in_place(&mut dst, &[1, 2, 3, 255, 0, 0, 0, 0], 1.0).unwrap();
    assert_eq!(dst, vec![1, 2, 3, 255, 0, 0, 0, 0]);
}

#[test]
fn unpremultiply_restores_straight() {
    let mut px = vec![64, 32, 0, 128, 10, 10, 10, 0, 1, 2, 3, 255];
    unpremultiply_in_place(&mut px);
    assert_eq!(&px[..4], &[128, 64, 0, 128]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..], &[1, 2, 3, 255]);
}
