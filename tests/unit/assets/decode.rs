use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn gif_bytes(frames: &[[u8; 4]], delay_ms: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = image::codecs::gif::GifEncoder::new(&mut buf);
        for px in frames {
            let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(*px));
            let frame = image::Frame::from_parts(
                img,
                0,
                0,
                image::Delay::from_numer_denom_ms(delay_ms, 1),
            );
            enc.encode_frame(frame).unwrap();
        }
    }
    buf
}

#[test]
fn decode_png_keeps_straight_alpha() {
    let bytes = png_bytes(1, 1, [100, 50, 200, 128]);
    let img = decode_image(&bytes, Some("png")).unwrap();
    assert_eq!((img.width, img.height), (1, 1));
    assert_eq!(img.frames, vec![vec![100, 50, 200, 128]]);
    assert!(!img.is_animated());
    assert_eq!(img.fps_hint(), None);
}

#[test]
fn decode_gif_yields_every_frame() {
    let bytes = gif_bytes(&[[255, 0, 0, 255], [0, 0, 255, 255], [0, 255, 0, 255]], 100);
    assert!(is_gif(&bytes));
    let img = decode_image(&bytes, None).unwrap();
    assert_eq!((img.width, img.height), (2, 2));
    assert_eq!(img.frames.len(), 3);
    assert!(img.is_animated());
    assert_eq!(&img.frames[1][..4], &[0, 0, 255, 255]);
    assert_eq!(img.delays_ms, vec![100, 100, 100]);
    assert_eq!(img.fps_hint(), Some(10.0));
}

#[test]
fn garbage_is_a_format_error() {
    let err = decode_image(b"definitely not an image", Some("png")).unwrap_err();
    assert!(err.to_string().contains("format error:"));
}

#[test]
fn probe_reads_header_dimensions() {
    let bytes = png_bytes(7, 3, [0, 0, 0, 0]);
    assert_eq!(probe_dimensions(&bytes).unwrap(), (7, 3));
}
