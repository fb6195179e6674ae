use super::*;

fn playing(fps: f32, last_frame: i32, play_time: f64, looping: bool) -> AnimationTimer {
    AnimationTimer {
        playing: true,
        needs_reset: false,
        looping,
        fps,
        last_frame,
        start_time: 0.0,
        play_time,
    }
}

#[test]
fn frame_index_follows_elapsed_time() {
    // 10 fps, 4 frames, 0.35s in: frame 3.
    let t = playing(10.0, 0, 0.35, true);
    assert_eq!(t.raw_index(), 3);
    assert_eq!(t.current_index(4), 3);

    let t = playing(10.0, 0, 0.55, true);
    assert_eq!(t.current_index(4), 1);

    let t = playing(10.0, 0, 0.55, false);
    assert_eq!(t.current_index(4), 3);
    assert!(!t.is_playing(4));
    assert!(playing(10.0, 0, 0.35, false).is_playing(4));
}

#[test]
fn zero_fps_freezes_on_last_frame() {
    let t = playing(0.0, 2, 100.0, true);
    assert_eq!(t.raw_index(), 2);
    assert_eq!(t.current_index(4), 2);
}

#[test]
fn pending_reset_shows_last_frame() {
    let mut t = playing(10.0, 1, 5.0, true);
    t.needs_reset = true;
    assert_eq!(t.current_index(4), 1);
    t.update(42.0);
    assert!(!t.needs_reset);
    assert_eq!(t.start_time, 42.0);
    assert_eq!(t.play_time, 0.0);
    t.update(42.2);
    assert_eq!(t.current_index(4), 3);
}

#[test]
fn stop_pins_current_frame() {
    let mut t = playing(10.0, 0, 0.25, true);
    t.stop(4);
    assert!(!t.playing);
    assert_eq!(t.last_frame, 2);
    assert_eq!(t.current_index(4), 2);
    // Stopped timers ignore updates.
    t.update(99.0);
    assert_eq!(t.current_index(4), 2);
}

#[test]
fn seek_stores_up_to_count_and_resolves_in_range() {
    let mut t = AnimationTimer::default();
    t.seek(10, 4);
    assert_eq!(t.last_frame, 4);
    assert_eq!(t.current_index(4), 0);
    t.looping = false;
    assert_eq!(t.current_index(4), 3);
    t.seek(-3, 4);
    assert_eq!(t.last_frame, 0);
}

#[test]
fn rate_and_looping_set_on_a_still_bitmap_survive_add_frame() {
    let config = crate::config::Config::default();
    let fallback = config.frame_rate;
    let mut ctx = GraphicsContext::new(config).expect("context");
    let id = ctx.create_bitmap(2, 2).expect("bitmap");
    ctx.set_animation_fps(id, 12.0).expect("fps");
    ctx.set_looping(id, false).expect("looping");
    assert_eq!(ctx.animation_fps(id).expect("fps"), 12.0);
    assert!(matches!(
        ctx.play(id),
        Err(TesseraError::UnsupportedForMode { .. })
    ));

    ctx.add_frame(id, id, None).expect("frame");
    assert_eq!(ctx.animation_fps(id).expect("fps"), 12.0);
    assert!(!ctx.looping(id).expect("looping"));

    let plain = ctx.create_bitmap(2, 2).expect("bitmap");
    ctx.add_frame(plain, plain, None).expect("frame");
    assert_eq!(ctx.animation_fps(plain).expect("fps"), fallback);
    assert!(ctx.looping(plain).expect("looping"));
}
