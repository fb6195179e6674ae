use super::*;
use crate::assets::source::MemoryAssetSource;
use crate::config::Config;
use crate::foundation::core::{Color, IntRect};
use crate::foundation::error::StorageMode;

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

fn hires_config() -> Config {
    Config {
        enable_hires: true,
        texture_scaling_factor: 2.0,
        ..Config::default()
    }
}

#[test]
fn blank_bitmaps_reject_empty_sizes() {
    let mut ctx = GraphicsContext::new(Config::default()).expect("context");
    assert!(matches!(
        ctx.create_bitmap(0, 4),
        Err(TesseraError::Precondition(_))
    ));
    let id = ctx.create_bitmap(3, 5).expect("bitmap");
    assert_eq!(ctx.rect(id).expect("rect"), IntRect::sized(3, 5));
    assert_eq!(ctx.storage_mode(id).expect("mode"), StorageMode::Single);
    assert!(ctx.get_raw(id).expect("raw").iter().all(|&b| b == 0));
}

#[test]
fn hires_feature_creates_a_scaled_mirror() {
    let mut ctx = GraphicsContext::new(hires_config()).expect("context");
    let id = ctx.create_bitmap(10, 6).expect("bitmap");
    let hires = ctx.hires(id).expect("hires").expect("mirror");
    assert_eq!(ctx.width(hires).expect("w"), 20);
    assert_eq!(ctx.height(hires).expect("h"), 12);
    assert_eq!(ctx.lores(hires).expect("lores"), Some(id));
    assert_eq!(ctx.live_bitmaps(), 2);
}

#[test]
fn load_picks_up_hires_companion() {
    let assets = MemoryAssetSource::new()
        .with("a.png", png(4, 4, [255, 0, 0, 255]))
        .and_then(|a| a.with("Hires/a.png", png(8, 8, [0, 255, 0, 255])))
        .expect("assets");
    let mut ctx = GraphicsContext::builder(hires_config())
        .assets(assets)
        .build()
        .expect("context");

    let id = ctx.load_bitmap("a.png").expect("load");
    let hires = ctx.hires(id).expect("hires").expect("mirror");
    assert_eq!(ctx.width(hires).expect("w"), 8);
    assert_eq!(&ctx.get_raw(id).expect("raw")[..4], &[255, 0, 0, 255]);
    assert!(ctx.touches_tainted(id, IntRect::sized(1, 1)).expect("taint"));
}

#[test]
fn failed_load_leaves_no_hires_behind() {
    let assets = MemoryAssetSource::new()
        .with("Hires/b.png", png(8, 8, [0, 0, 255, 255]))
        .expect("assets");
    let mut ctx = GraphicsContext::builder(hires_config())
        .assets(assets)
        .build()
        .expect("context");

    assert!(ctx.load_bitmap("b.png").is_err());
    assert_eq!(ctx.live_bitmaps(), 0);
    assert_eq!(ctx.pool_stats().live_bytes, 0);
}

#[test]
fn oversized_images_become_mega_surfaces() {
    let assets = MemoryAssetSource::new()
        .with("wide.png", png(16, 4, [1, 2, 3, 255]))
        .expect("assets");
    let config = Config {
        max_texture_size: 8,
        ..Config::default()
    };
    let mut ctx = GraphicsContext::builder(config)
        .assets(assets)
        .build()
        .expect("context");

    let id = ctx.load_bitmap("wide.png").expect("load");
    assert_eq!(ctx.storage_mode(id).expect("mode"), StorageMode::Mega);
    assert_eq!(ctx.get_raw(id).expect("raw").len(), 16 * 4 * 4);
    assert!(matches!(
        ctx.fill_rect(id, IntRect::sized(1, 1), Color::white()),
        Err(TesseraError::UnsupportedForMode { .. })
    ));
    assert!(matches!(
        ctx.create_bitmap(16, 4),
        Err(TesseraError::StorageExhausted { .. })
    ));
}

#[test]
fn pixel_wraps_check_the_byte_length() {
    let mut ctx = GraphicsContext::new(Config::default()).expect("context");
    assert!(matches!(
        ctx.bitmap_from_pixels(2, 2, vec![0; 15]),
        Err(TesseraError::Format(_))
    ));
    let id = ctx
        .bitmap_from_pixels(2, 1, vec![9, 9, 9, 9, 0, 0, 0, 0])
        .expect("wrap");
    assert_eq!(ctx.get_raw(id).expect("raw"), vec![9, 9, 9, 9, 0, 0, 0, 0]);
}

#[test]
fn copies_are_independent() {
    let mut ctx = GraphicsContext::new(Config::default()).expect("context");
    let src = ctx.create_bitmap(2, 2).expect("bitmap");
    ctx.fill_rect(src, IntRect::sized(2, 2), Color::white())
        .expect("fill");
    let copy = ctx.copy_bitmap(src, FrameSelect::All).expect("copy");
    ctx.clear(src).expect("clear");

    assert!(ctx.get_raw(copy).expect("raw").iter().all(|&b| b == 255));
    assert!(matches!(
        ctx.copy_bitmap(src, FrameSelect::Current),
        Err(TesseraError::UnsupportedForMode { .. })
    ));
}

#[test]
fn surface_wraps_take_an_optional_mirror() {
    let mut ctx = GraphicsContext::new(Config::default()).expect("context");
    let lores = ctx.request_surface(3, 3).expect("surface");
    let hires = ctx.request_surface(6, 6).expect("surface");
    let id = ctx.bitmap_from_surface(lores, Some(hires)).expect("wrap");
    let mirror = ctx.hires(id).expect("hires").expect("mirror");
    assert_eq!(ctx.width(mirror).expect("w"), 6);
}

#[test]
fn disposing_either_side_of_a_mirror_disposes_both() {
    let mut ctx = GraphicsContext::new(hires_config()).expect("context");

    let a = ctx.create_bitmap(4, 4).expect("bitmap");
    let ah = ctx.hires(a).expect("hires").expect("mirror");
    ctx.dispose(a).expect("dispose");
    assert!(ctx.is_disposed(a));
    assert!(ctx.is_disposed(ah));

    let b = ctx.create_bitmap(4, 4).expect("bitmap");
    let bh = ctx.hires(b).expect("hires").expect("mirror");
    ctx.dispose(bh).expect("dispose");
    assert!(ctx.is_disposed(bh));
    assert!(ctx.is_disposed(b));

    ctx.dispose(b).expect("second dispose");
    assert_eq!(ctx.live_bitmaps(), 0);
    assert_eq!(ctx.pool_stats().live_bytes, 0);
}

#[test]
fn external_owner_keeps_the_hires_mirror_alive() {
    let mut ctx = GraphicsContext::new(hires_config()).expect("context");
    let id = ctx.create_bitmap(2, 2).expect("bitmap");
    let hires = ctx.hires(id).expect("hires").expect("mirror");
    ctx.assume_external_owner(id).expect("owner");

    ctx.destroy(id).expect("destroy");
    assert!(ctx.is_disposed(id));
    assert!(!ctx.is_disposed(hires));
    assert_eq!(ctx.lores(hires).expect("lores"), None);
    assert_eq!(ctx.live_bitmaps(), 1);
    assert_eq!(ctx.pool_stats().live_bytes, 4 * 4 * 4);

    ctx.dispose(hires).expect("dispose mirror");
    assert_eq!(ctx.live_bitmaps(), 0);
}

#[test]
fn owned_hires_mirror_goes_with_its_bitmap() {
    let mut ctx = GraphicsContext::new(hires_config()).expect("context");
    let id = ctx.create_bitmap(2, 2).expect("bitmap");
    let hires = ctx.hires(id).expect("hires").expect("mirror");

    ctx.destroy(id).expect("destroy");
    assert!(ctx.is_disposed(hires));
    assert_eq!(ctx.live_bitmaps(), 0);
    assert_eq!(ctx.pool_stats().live_bytes, 0);

    let next = ctx.create_bitmap(2, 2).expect("bitmap");
    assert!(next.index == id.index || next.index == hires.index);
    assert!(ctx.is_disposed(id));
}
