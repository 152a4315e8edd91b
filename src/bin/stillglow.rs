use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use stillglow::{
    Canvas, FrameIndex, MotionConfig, RenderThreading, Scene, SceneConfig, SparkleConfig,
    load_source_image, render_to_mp4,
};

#[derive(Parser, Debug)]
#[command(name = "stillglow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SceneOpts {
    /// Output width in pixels.
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Duration in seconds.
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Zoom oscillations over the full render.
    #[arg(long, default_value_t = 3.0)]
    zoom_cycles: f64,

    /// Peak zoom above 1.0 (0.05 = up to 5% in).
    #[arg(long, default_value_t = 0.05)]
    zoom_strength: f64,

    /// Vertical pan travel in pixels.
    #[arg(long, default_value_t = 100.0)]
    move_amplitude: f64,

    /// Vertical pan oscillations over the full render.
    #[arg(long, default_value_t = 2.0)]
    move_cycles: f64,

    /// Number of sparkles in the pool.
    #[arg(long, default_value_t = 50)]
    sparkles: u32,

    /// Minimum sparkle size (max ray length) in pixels.
    #[arg(long, default_value_t = 4)]
    sparkle_size_min: u32,

    /// Maximum sparkle size in pixels.
    #[arg(long, default_value_t = 8)]
    sparkle_size_max: u32,

    /// Peak sparkle brightness (0-255).
    #[arg(long, default_value_t = 255)]
    sparkle_brightness: u8,

    /// Minimum sparkle lifetime in frames.
    #[arg(long, default_value_t = 15)]
    sparkle_life_min: u32,

    /// Maximum sparkle lifetime in frames.
    #[arg(long, default_value_t = 30)]
    sparkle_life_max: u32,

    /// Seed for sparkle placement and geometry; equal seeds reproduce the render exactly.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Disable the sparkle overlay entirely.
    #[arg(long, default_value_t = false)]
    no_sparkles: bool,
}

impl SceneOpts {
    fn to_config(&self) -> SceneConfig {
        SceneConfig {
            canvas: Canvas {
                width: self.width,
                height: self.height,
            },
            duration_secs: self.duration,
            fps: self.fps,
            seed: self.seed,
            motion: MotionConfig {
                zoom_cycles: self.zoom_cycles,
                zoom_strength: self.zoom_strength,
                move_amplitude: self.move_amplitude,
                move_cycles: self.move_cycles,
            },
            sparkles: SparkleConfig {
                count: if self.no_sparkles { 0 } else { self.sparkles },
                size_min: self.sparkle_size_min,
                size_max: self.sparkle_size_max,
                max_brightness: self.sparkle_brightness,
                life_min: self.sparkle_life_min,
                life_max: self.sparkle_life_max,
            },
        }
    }
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Input still image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    scene: SceneOpts,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input still image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size in frames.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    #[command(flatten)]
    scene: SceneOpts,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let source = load_source_image(&args.in_path)?;
    let scene = Scene::new(source, args.scene.to_config())?;
    let frame = scene.render_frame(FrameIndex(args.frame))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let source = load_source_image(&args.in_path)?;
    let scene = Scene::new(source, args.scene.to_config())?;
    let threading = RenderThreading {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
    };

    render_to_mp4(&scene, &args.out, args.overwrite, &threading)?;
    eprintln!(
        "wrote {} ({} frames at {} fps)",
        args.out.display(),
        scene.total_frames(),
        scene.config().fps
    );
    Ok(())
}
