use super::*;
use crate::config::Config;

fn ctx() -> GraphicsContext {
    GraphicsContext::new(Config::default()).expect("context")
}

fn hires_ctx() -> GraphicsContext {
    GraphicsContext::new(Config {
        enable_hires: true,
        texture_scaling_factor: 2.0,
        ..Config::default()
    })
    .expect("context")
}

#[test]
fn fills_taint_and_clears_untaint() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(8, 8).expect("bitmap");
    let area = IntRect::new(2, 2, 3, 3);
    assert!(!ctx.touches_tainted(id, area).expect("taint"));

    ctx.fill_rect(id, area, Color::new(10.0, 20.0, 30.0, 255.0))
        .expect("fill");
    assert!(ctx.touches_tainted(id, IntRect::new(4, 4, 4, 4)).expect("taint"));
    assert!(!ctx.touches_tainted(id, IntRect::new(5, 5, 3, 3)).expect("taint"));
    assert_eq!(
        ctx.get_pixel(id, 3, 3).expect("pixel").to_rgba8(),
        [10, 20, 30, 255]
    );

    ctx.fill_rect(id, area, Color::new(255.0, 255.0, 255.0, 0.0))
        .expect("clear fill");
    assert!(!ctx.touches_tainted(id, area).expect("taint"));
    assert_eq!(
        ctx.get_pixel(id, 3, 3).expect("pixel").to_rgba8(),
        [255, 255, 255, 0]
    );
}

#[test]
fn clear_rect_and_clear_reset_pixels() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(4, 4).expect("bitmap");
    ctx.fill_rect(id, IntRect::sized(4, 4), Color::white())
        .expect("fill");
    ctx.clear_rect(id, IntRect::sized(2, 4)).expect("clear rect");
    assert!(!ctx.touches_tainted(id, IntRect::sized(2, 4)).expect("taint"));
    assert_eq!(ctx.get_pixel(id, 0, 0).expect("pixel").to_rgba8(), [0, 0, 0, 0]);
    assert_eq!(
        ctx.get_pixel(id, 3, 0).expect("pixel").to_rgba8(),
        [255, 255, 255, 255]
    );

    ctx.clear(id).expect("clear");
    assert!(!ctx.touches_tainted(id, IntRect::sized(4, 4)).expect("taint"));
    assert!(ctx.get_raw(id).expect("raw").iter().all(|&b| b == 0));
}

#[test]
fn horizontal_gradient_runs_left_to_right() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(4, 1).expect("bitmap");
    ctx.gradient_fill_rect(
        id,
        IntRect::sized(4, 1),
        Color::new(0.0, 0.0, 0.0, 255.0),
        Color::new(255.0, 0.0, 0.0, 255.0),
        false,
    )
    .expect("gradient");
    let reds: Vec<u8> = (0..4)
        .map(|x| ctx.get_pixel(id, x, 0).expect("pixel").to_rgba8()[0])
        .collect();
    assert!(reds.windows(2).all(|w| w[0] < w[1]), "{reds:?}");
    assert!(reds[0] < 64 && reds[3] > 191, "{reds:?}");
}

#[test]
fn vertical_gradient_runs_top_to_bottom() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(1, 2).expect("bitmap");
    ctx.gradient_fill_rect(
        id,
        IntRect::sized(1, 2),
        Color::white(),
        Color::black(),
        true,
    )
    .expect("gradient");
    let top = ctx.get_pixel(id, 0, 0).expect("pixel").to_rgba8();
    let bottom = ctx.get_pixel(id, 0, 1).expect("pixel").to_rgba8();
    assert!(top[0] > bottom[0]);
}

#[test]
fn out_of_range_reads_are_transparent() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(2, 2).expect("bitmap");
    ctx.fill_rect(id, IntRect::sized(2, 2), Color::white())
        .expect("fill");
    assert_eq!(ctx.get_pixel(id, -1, 0).expect("pixel"), Color::transparent());
    assert_eq!(ctx.get_pixel(id, 2, 0).expect("pixel"), Color::transparent());
}

#[test]
fn set_pixel_patches_the_cache() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(3, 3).expect("bitmap");
    ctx.get_pixel(id, 0, 0).expect("populate");
    assert!(ctx.state(id, "test").expect("state").cache.is_populated());

    ctx.set_pixel(id, 1, 1, Color::new(1.0, 2.0, 3.0, 4.0))
        .expect("set");
    assert!(ctx.state(id, "test").expect("state").cache.is_populated());
    assert_eq!(ctx.get_pixel(id, 1, 1).expect("pixel").to_rgba8(), [1, 2, 3, 4]);
    assert!(ctx.touches_tainted(id, IntRect::new(1, 1, 1, 1)).expect("taint"));

    ctx.fill_rect(id, IntRect::sized(1, 1), Color::white())
        .expect("fill");
    assert!(!ctx.state(id, "test").expect("state").cache.is_populated());
}

#[test]
fn hires_set_pixel_fills_the_matching_block() {
    let mut ctx = hires_ctx();
    let id = ctx.create_bitmap(100, 100).expect("bitmap");
    let hires = ctx.hires(id).expect("hires").expect("mirror");
    let red = Color::new(255.0, 0.0, 0.0, 255.0);
    ctx.set_pixel(id, 10, 10, red).expect("set");

    let raw = ctx.get_raw(hires).expect("raw");
    let at = |x: usize, y: usize| {
        let i = (y * 200 + x) * 4;
        [raw[i], raw[i + 1], raw[i + 2], raw[i + 3]]
    };
    for (x, y) in [(20, 20), (21, 20), (20, 21), (21, 21)] {
        assert_eq!(at(x, y), [255, 0, 0, 255]);
    }
    assert_eq!(at(22, 20), [0, 0, 0, 0]);
    assert_eq!(at(19, 19), [0, 0, 0, 0]);
}

#[test]
fn hires_get_pixel_averages_opaque_colour() {
    let mut ctx = hires_ctx();
    let id = ctx.create_bitmap(4, 4).expect("bitmap");
    let hires = ctx.hires(id).expect("hires").expect("mirror");
    ctx.set_pixel(hires, 0, 0, Color::new(200.0, 100.0, 0.0, 255.0))
        .expect("set");
    ctx.set_pixel(hires, 1, 0, Color::new(100.0, 0.0, 0.0, 255.0))
        .expect("set");

    let c = ctx.get_pixel(id, 0, 0).expect("pixel");
    assert_eq!(c.to_rgba8(), [150, 50, 0, 127]);
}

#[test]
fn raw_round_trip_and_size_check() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(3, 2).expect("bitmap");
    ctx.gradient_fill_rect(id, IntRect::sized(3, 2), Color::white(), Color::black(), false)
        .expect("gradient");
    let before = ctx.get_raw(id).expect("raw");
    ctx.replace_raw(id, &before).expect("replace");
    assert_eq!(ctx.get_raw(id).expect("raw"), before);

    let err = ctx.replace_raw(id, &before[..before.len() - 1]).err();
    assert!(matches!(err, Some(TesseraError::Format(_))));
    assert_eq!(ctx.get_raw(id).expect("raw"), before);
}

#[test]
fn replace_raw_upscales_into_the_mirror() {
    let mut ctx = hires_ctx();
    let id = ctx.create_bitmap(2, 1).expect("bitmap");
    let hires = ctx.hires(id).expect("hires").expect("mirror");
    ctx.replace_raw(id, &[255, 0, 0, 255, 0, 0, 255, 255])
        .expect("replace");

    let raw = ctx.get_raw(hires).expect("raw");
    assert_eq!(raw.len(), 4 * 2 * 4);
    assert_eq!(&raw[0..4], &[255, 0, 0, 255]);
    assert_eq!(&raw[4..8], &[255, 0, 0, 255]);
    assert_eq!(&raw[8..12], &[0, 0, 255, 255]);
    assert_eq!(&raw[16..20], &[255, 0, 0, 255]);
}

#[test]
fn pixel_ops_reject_animations() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(2, 2).expect("bitmap");
    ctx.add_frame(id, id, None).expect("frame");
    assert!(matches!(
        ctx.set_pixel(id, 0, 0, Color::white()),
        Err(TesseraError::UnsupportedForMode { .. })
    ));
    assert!(matches!(
        ctx.gradient_fill_rect(id, IntRect::sized(1, 1), Color::white(), Color::black(), true),
        Err(TesseraError::UnsupportedForMode { .. })
    ));
}

#[test]
fn save_writes_an_image_file() {
    let mut ctx = ctx();
    let id = ctx.create_bitmap(2, 2).expect("bitmap");
    ctx.fill_rect(id, IntRect::sized(2, 2), Color::new(0.0, 128.0, 0.0, 255.0))
        .expect("fill");
    let dir = std::env::temp_dir().join(format!("tessera-save-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("dir");
    let path = dir.join("out.png");
    ctx.save_to_file(id, &path).expect("save");

    let img = image::open(&path).expect("decode").to_rgba8();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 1).0, [0, 128, 0, 255]);
    let _ = std::fs::remove_dir_all(&dir);
}
