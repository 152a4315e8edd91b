//! Stillglow animates a single still image into a fixed-length video: a slow triangular-wave
//! zoom with a sinusoidal vertical pan, optionally overlaid with a pool of rotating, fading
//! sparkles that are additively blended onto each frame.
//!
//! Frames are synthesized on the CPU as a pure function of the frame index and streamed, in
//! order, into a [`FrameSink`] such as the ffmpeg-backed MP4 encoder.
#![forbid(unsafe_code)]

pub mod composite;
pub mod compositor;
pub mod config;
pub mod core;
pub mod encode_ffmpeg;
pub mod error;
pub mod motion;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod sparkle;
pub mod starburst;

pub use crate::config::{MotionConfig, SceneConfig, SparkleConfig};
pub use crate::core::{Canvas, FrameIndex, FrameRange, FrameRgb};
pub use crate::encode_ffmpeg::{EncodeConfig, FfmpegEncoder};
pub use crate::error::{StillglowError, StillglowResult};
pub use crate::pipeline::{RenderThreading, Scene, render_to_mp4, render_to_sink};
pub use crate::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::source::{SourceImage, load_source_image};
pub use crate::sparkle::{Sparkle, SparklePool};
