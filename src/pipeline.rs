use rand::SeedableRng as _;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::{
    composite::add_overlay_in_place,
    compositor::compose_base_frame,
    config::SceneConfig,
    core::{FrameIndex, FrameRange, FrameRgb},
    encode_ffmpeg::{EncodeConfig, FfmpegEncoder},
    error::{StillglowError, StillglowResult},
    motion,
    sink::{FrameSink, SinkConfig},
    source::SourceImage,
    sparkle::SparklePool,
    starburst::draw_starburst,
};

/// A fully validated render: the decoded source still, the configuration, and the sparkle pool.
///
/// Everything inside is immutable once constructed, so any frame can be synthesized from its
/// index alone, in any order.
pub struct Scene {
    source: SourceImage,
    config: SceneConfig,
    pool: SparklePool,
    total_frames: u64,
}

impl Scene {
    /// Validate `config` and build the sparkle pool from its seed.
    pub fn new(source: SourceImage, config: SceneConfig) -> StillglowResult<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let pool = SparklePool::generate(
            &config.sparkles,
            config.canvas,
            config.total_frames(),
            &mut rng,
        )?;
        Self::with_pool(source, config, pool)
    }

    /// Build a scene around an explicit, already validated sparkle pool.
    pub fn with_pool(
        source: SourceImage,
        config: SceneConfig,
        pool: SparklePool,
    ) -> StillglowResult<Self> {
        config.validate()?;
        Ok(Self {
            total_frames: config.total_frames(),
            source,
            config,
            pool,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// The full render range `[0, total_frames)`.
    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.total_frames),
        }
    }

    /// Synthesize one frame: schedule the transform, compose the base frame, then draw and
    /// additively blend every sparkle active at this index.
    #[tracing::instrument(skip(self), fields(frame = frame.0))]
    pub fn render_frame(&self, frame: FrameIndex) -> StillglowResult<FrameRgb> {
        let f = frame.0;
        let zoom = motion::zoom_factor(&self.config.motion, f, self.total_frames);
        let v_off = motion::vertical_offset(&self.config.motion, f, self.total_frames);
        let mut out = compose_base_frame(&self.source, zoom, v_off, self.config.canvas);

        if !self.pool.is_empty() {
            let (w, h) = (self.config.canvas.width, self.config.canvas.height);
            let mut overlay = vec![0f32; (w as usize) * (h as usize)];
            for sparkle in self.pool.sparkles() {
                if !sparkle.is_active(f, self.total_frames) {
                    continue;
                }
                let brightness = sparkle.brightness_at(f, self.total_frames);
                let rotation = sparkle.rotation_at(f, self.total_frames);
                overlay.fill(0.0);
                draw_starburst(&mut overlay, w, h, sparkle, brightness, rotation)?;
                add_overlay_in_place(&mut out.data, &overlay)?;
            }
        }

        Ok(out)
    }
}

/// Threading and chunking controls for multi-frame rendering.
#[derive(Clone, Debug)]
pub struct RenderThreading {
    /// Enable parallel rendering when `true`.
    pub parallel: bool,
    /// Chunk size in frames for batched scheduling.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Render `range` and hand every frame to `sink` in strictly increasing index order.
///
/// With `threading.parallel`, frames inside a chunk are synthesized concurrently; delivery to the
/// sink stays sequential and ordered either way. The first sink failure aborts the render.
pub fn render_to_sink(
    scene: &Scene,
    range: FrameRange,
    sink: &mut dyn FrameSink,
    threading: &RenderThreading,
) -> StillglowResult<()> {
    if range.is_empty() {
        return Err(StillglowError::validation("render range must be non-empty"));
    }

    sink.begin(SinkConfig {
        width: scene.config.canvas.width,
        height: scene.config.canvas.height,
        fps: scene.config.fps,
    })?;

    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };
    let chunk_size = normalized_chunk_size(threading.chunk_size);

    tracing::info!(
        frames = range.len_frames(),
        parallel = threading.parallel,
        "rendering frame range"
    );

    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = (chunk_start + chunk_size).min(range.end.0);

        let frames: Vec<FrameRgb> = match &pool {
            Some(pool) => pool.install(|| {
                (chunk_start..chunk_end)
                    .into_par_iter()
                    .map(|f| scene.render_frame(FrameIndex(f)))
                    .collect::<StillglowResult<Vec<_>>>()
            })?,
            None => (chunk_start..chunk_end)
                .map(|f| scene.render_frame(FrameIndex(f)))
                .collect::<StillglowResult<Vec<_>>>()?,
        };

        for (i, frame) in frames.iter().enumerate() {
            sink.push_frame(FrameIndex(chunk_start + i as u64), frame)?;
        }
        chunk_start = chunk_end;
    }

    sink.end()
}

/// Render the whole scene to an MP4 by piping frames to the system `ffmpeg` binary.
///
/// `ffmpeg` must be installed and on `PATH`; this is checked up front.
pub fn render_to_mp4(
    scene: &Scene,
    out_path: impl Into<std::path::PathBuf>,
    overwrite: bool,
    threading: &RenderThreading,
) -> StillglowResult<()> {
    let cfg = EncodeConfig {
        width: scene.config.canvas.width,
        height: scene.config.canvas.height,
        fps: scene.config.fps,
        out_path: out_path.into(),
        overwrite,
    };
    let mut encoder = FfmpegEncoder::new(cfg)?;
    render_to_sink(scene, scene.frame_range(), &mut encoder, threading)
}

fn build_thread_pool(threads: Option<usize>) -> StillglowResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StillglowError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StillglowError::encode(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 { 1 } else { chunk_size as u64 }
}
