use stillglow::{
    Canvas, FrameIndex, FrameRange, InMemorySink, RenderThreading, Scene, SceneConfig,
    SourceImage, SparklePool, render_to_sink,
    sparkle::{RAY_COUNT, Sparkle},
};

fn black_source(size: u32) -> SourceImage {
    SourceImage::from_rgb8(size, size, vec![0u8; (size * size * 3) as usize]).unwrap()
}

fn base_config(size: u32) -> SceneConfig {
    SceneConfig {
        canvas: Canvas {
            width: size,
            height: size,
        },
        seed: 42,
        ..Default::default()
    }
}

fn center_sparkle() -> Sparkle {
    Sparkle {
        x: 256,
        y: 256,
        life: 20,
        start: 0,
        size: 8,
        rotation_speed: 0.0,
        initial_rotation: 0.0,
        max_brightness: 255,
        ray_lengths: [8.0; RAY_COUNT],
        ray_widths: [1.0; RAY_COUNT],
    }
}

fn px(frame: &stillglow::FrameRgb, x: u32, y: u32) -> [u8; 3] {
    let i = ((y * frame.width + x) * 3) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2]]
}

#[test]
fn single_sparkle_rays_peak_at_half_life() {
    let pool = SparklePool::from_sparkles(vec![center_sparkle()]).unwrap();
    let scene = Scene::with_pool(black_source(512), base_config(512), pool).unwrap();

    // At frame 10 (half of life 20) the envelope is at full brightness and the rays are unrotated,
    // so the axes through the center carry 255 on an otherwise black frame.
    let frame = scene.render_frame(FrameIndex(10)).unwrap();
    assert_eq!(px(&frame, 256, 256), [255, 255, 255]);
    assert_eq!(px(&frame, 260, 256), [255, 255, 255]);
    assert_eq!(px(&frame, 252, 256), [255, 255, 255]);
    assert_eq!(px(&frame, 256, 260), [255, 255, 255]);
    assert_eq!(px(&frame, 256, 252), [255, 255, 255]);
    // Far corner stays black.
    assert_eq!(px(&frame, 10, 10), [0, 0, 0]);
}

#[test]
fn expired_sparkle_leaves_base_frame_untouched() {
    let pool = SparklePool::from_sparkles(vec![center_sparkle()]).unwrap();
    let with_sparkle = Scene::with_pool(black_source(512), base_config(512), pool).unwrap();
    let without = Scene::with_pool(
        black_source(512),
        base_config(512),
        SparklePool::default(),
    )
    .unwrap();

    // Frame 25 is past the sparkle's life; the frames must be byte-identical.
    let a = with_sparkle.render_frame(FrameIndex(25)).unwrap();
    let b = without.render_frame(FrameIndex(25)).unwrap();
    assert_eq!(a.data, b.data);

    // While active they differ.
    let a = with_sparkle.render_frame(FrameIndex(10)).unwrap();
    let b = without.render_frame(FrameIndex(10)).unwrap();
    assert_ne!(a.data, b.data);
}

#[test]
fn overlapping_sparkles_saturate_and_never_darken() {
    let mut second = center_sparkle();
    second.initial_rotation = 22.5;
    let both = SparklePool::from_sparkles(vec![center_sparkle(), second]).unwrap();
    let one = SparklePool::from_sparkles(vec![center_sparkle()]).unwrap();

    let frame_both = Scene::with_pool(black_source(512), base_config(512), both)
        .unwrap()
        .render_frame(FrameIndex(10))
        .unwrap();
    let frame_one = Scene::with_pool(black_source(512), base_config(512), one)
        .unwrap()
        .render_frame(FrameIndex(10))
        .unwrap();

    // The second overlay saturates at the shared center and can only brighten elsewhere.
    assert_eq!(px(&frame_both, 256, 256), [255, 255, 255]);
    for (a, b) in frame_both.data.iter().zip(&frame_one.data) {
        assert!(a >= b);
    }
    assert_ne!(frame_both.data, frame_one.data);
}

#[test]
fn sink_receives_every_frame_of_the_range() {
    let cfg = SceneConfig {
        duration_secs: 2.0,
        fps: 15,
        sparkles: stillglow::SparkleConfig {
            count: 6,
            ..Default::default()
        },
        ..base_config(64)
    };
    let scene = Scene::new(black_source(64), cfg).unwrap();

    let mut sink = InMemorySink::new();
    render_to_sink(
        &scene,
        FrameRange::new(FrameIndex(0), FrameIndex(30)).unwrap(),
        &mut sink,
        &RenderThreading::default(),
    )
    .unwrap();

    assert_eq!(sink.frames().len(), 30);
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!((frame.width, frame.height), (64, 64));
        assert_eq!(frame.data.len(), 64 * 64 * 3);
    }
}
