use super::*;
use crate::render::surface::SurfaceId;

fn surface(w: u32, h: u32) -> Surface {
    Surface::from_parts(SurfaceId(1), w, h, vec![0; (w * h * 4) as usize])
}

fn checker(w: u32, h: u32) -> PixelBuffer {
    let mut b = PixelBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            b.put_pixel(x, y, [v, v, v, 255]);
        }
    }
    b
}

fn pipeline(up: SmoothScaling, down: SmoothScaling, native: bool) -> BlitPipeline {
    let config = Config {
        smooth_scaling: up,
        smooth_scaling_down: down,
        ..Config::default()
    };
    BlitPipeline::new(
        &config,
        DeviceCaps {
            max_texture_size: 1024,
            native_blit: native,
        },
    )
}

#[test]
fn classification_follows_effective_extents() {
    assert_eq!(classify_scale((10, 10), (10, 10)), ScaleClass::SameScale);
    assert_eq!(classify_scale((10, 10), (-10, 10)), ScaleClass::SameScale);
    assert_eq!(classify_scale((10, 10), (5, 5)), ScaleClass::DownScale);
    assert_eq!(classify_scale((10, 10), (5, 10)), ScaleClass::UpScale);
    assert_eq!(classify_scale((10, 10), (20, 5)), ScaleClass::UpScale);
}

#[test]
fn native_path_needs_fixed_function_methods() {
    let p = pipeline(SmoothScaling::Bilinear, SmoothScaling::Nearest, true);
    assert!(p.has_native_blit());
    assert_eq!(p.path(ScaleClass::UpScale), BlitPath::Native);

    let p = pipeline(SmoothScaling::Bicubic, SmoothScaling::Nearest, true);
    assert!(!p.has_native_blit());
    assert_eq!(
        p.path(ScaleClass::UpScale),
        BlitPath::Shader(SmoothScaling::Bicubic)
    );
    assert_eq!(
        p.path(ScaleClass::SameScale),
        BlitPath::Shader(SmoothScaling::Nearest)
    );
    assert_eq!(
        p.path(ScaleClass::DownScale),
        BlitPath::Shader(SmoothScaling::Nearest)
    );

    let p = pipeline(SmoothScaling::Nearest, SmoothScaling::Nearest, false);
    assert!(!p.has_native_blit());
}

#[test]
fn same_scale_copy_is_exact_even_when_smooth() {
    let src = checker(4, 4);
    let mut dst = surface(4, 4);
    for native in [true, false] {
        let p = pipeline(SmoothScaling::Bilinear, SmoothScaling::Lanczos3, native);
        let mut pass = p.begin(BlitTarget::surface(&mut dst), ScaleClass::SameScale);
        pass.source(BlitSource::new(src.view()));
        pass.rectangle(IntRect::sized(4, 4), IntRect::sized(4, 4), true);
        pass.end();
        assert_eq!(dst.pixels(), src.pixels.as_slice());
    }
}

#[test]
fn nearest_upscale_duplicates_pixels() {
    let src = checker(2, 2);
    let mut dst = surface(4, 4);
    let p = pipeline(SmoothScaling::Nearest, SmoothScaling::Nearest, true);
    let mut pass = p.begin(BlitTarget::surface(&mut dst), ScaleClass::UpScale);
    pass.source(BlitSource::new(src.view()));
    pass.rectangle(IntRect::sized(2, 2), IntRect::sized(4, 4), false);
    pass.end();
    assert_eq!(dst.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(dst.pixel(1, 1), Some([255, 255, 255, 255]));
    assert_eq!(dst.pixel(2, 0), Some([0, 0, 0, 255]));
    assert_eq!(dst.pixel(3, 3), Some([255, 255, 255, 255]));
}

#[test]
fn negative_destination_mirrors() {
    let mut src = PixelBuffer::new(2, 1);
    src.put_pixel(0, 0, [1, 0, 0, 255]);
    src.put_pixel(1, 0, [2, 0, 0, 255]);
    let mut dst = surface(2, 1);
    let p = pipeline(SmoothScaling::Nearest, SmoothScaling::Nearest, true);
    let mut pass = p.begin(BlitTarget::surface(&mut dst), ScaleClass::SameScale);
    pass.source(BlitSource::new(src.view()));
    pass.rectangle(IntRect::sized(2, 1), IntRect::new(2, 0, -2, 1), false);
    pass.end();
    assert_eq!(dst.pixel(0, 0).unwrap()[0], 2);
    assert_eq!(dst.pixel(1, 0).unwrap()[0], 1);
}

#[test]
fn hires_source_is_addressed_in_lores_coordinates() {
    // 4x4 hires source standing in for a 2x2 lores image.
    let mut hires = PixelBuffer::new(4, 4);
    for y in 2..4 {
        for x in 2..4 {
            hires.put_pixel(x, y, [7, 7, 7, 255]);
        }
    }
    let source = BlitSource::new(hires.view()).with_lores(2, 2);
    assert_eq!(source.effective(IntRect::new(1, 1, 1, 1)), (2, 2));

    let mut dst = surface(1, 1);
    let p = pipeline(SmoothScaling::Nearest, SmoothScaling::Nearest, true);
    let class = classify_scale(source.effective(IntRect::new(1, 1, 1, 1)), (1, 1));
    assert_eq!(class, ScaleClass::DownScale);
    let mut pass = p.begin(BlitTarget::surface(&mut dst), class);
    pass.source(source);
    pass.rectangle(IntRect::new(1, 1, 1, 1), IntRect::sized(1, 1), false);
    pass.end();
    assert_eq!(dst.pixel(0, 0), Some([7, 7, 7, 255]));
}

#[test]
fn composite_blends_and_clips() {
    let mut src = PixelBuffer::new(2, 2);
    for y in 0..2 {
        for x in 0..2 {
            src.put_pixel(x, y, [200, 100, 50, 255]);
        }
    }
    let mut dst = surface(2, 2);
    dst.fill_rect(IntRect::sized(2, 2), [0, 0, 0, 255]);
    let mut target = BlitTarget::surface(&mut dst);
    composite_rectangle(
        &mut target,
        BlitSource::new(src.view()),
        IntRect::sized(2, 2),
        IntRect::new(1, 1, 2, 2),
        0.5,
        false,
    );
    assert_eq!(dst.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(dst.pixel(1, 1), Some([100, 50, 25, 255]));
}

#[test]
fn resample_scales_into_buffer() {
    let src = checker(2, 2);
    let out = resample(&src.view(), IntRect::sized(2, 2), 4, 2, Filter::Nearest);
    assert_eq!((out.width, out.height), (4, 2));
    assert_eq!(out.pixel(1, 0), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(2, 0), Some([0, 0, 0, 255]));
}

#[test]
fn scale_rect_keeps_edges_adjacent() {
    let a = scale_rect(IntRect::new(0, 0, 3, 3), (10, 10), (6, 6));
    let b = scale_rect(IntRect::new(3, 0, 3, 3), (10, 10), (6, 6));
    assert_eq!(a.right(), b.x);
    assert_eq!(b.right(), 10);
}
