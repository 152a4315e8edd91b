use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    core::{FrameIndex, FrameRgb},
    error::{StillglowError, StillglowResult},
    sink::{FrameSink, SinkConfig},
};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn validate(&self) -> StillglowResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StillglowError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(StillglowError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // With the default settings we target yuv420p output for maximum compatibility.
            return Err(StillglowError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> StillglowResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// MP4 frame sink backed by the system `ffmpeg` binary.
///
/// Raw `rgb24` frames are piped over stdin; ffmpeg handles x264 encoding and muxing. The child is
/// spawned in `begin` and reaped in `end`, which surfaces its stderr on a non-zero exit.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> StillglowResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(StillglowError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(StillglowError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        Ok(Self {
            cfg,
            child: None,
            stdin: None,
        })
    }

    fn spawn(&mut self) -> StillglowResult<()> {
        // We intentionally use the system `ffmpeg` binary rather than `ffmpeg-next` to avoid
        // native FFmpeg dev header/lib requirements.
        let cfg = &self.cfg;
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        tracing::debug!(out = %cfg.out_path.display(), "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            StillglowError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StillglowError::encode("failed to open ffmpeg stdin (unexpected)"))?;

        self.child = Some(child);
        self.stdin = Some(stdin);
        Ok(())
    }
}

impl FrameSink for FfmpegEncoder {
    fn begin(&mut self, cfg: SinkConfig) -> StillglowResult<()> {
        if cfg.width != self.cfg.width || cfg.height != self.cfg.height || cfg.fps != self.cfg.fps {
            return Err(StillglowError::validation(format!(
                "sink config {}x{}@{} does not match encoder config {}x{}@{}",
                cfg.width, cfg.height, cfg.fps, self.cfg.width, self.cfg.height, self.cfg.fps
            )));
        }
        if self.child.is_some() {
            return Err(StillglowError::encode("ffmpeg encoder already started"));
        }
        self.spawn()
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRgb) -> StillglowResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(StillglowError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != (self.cfg.width as usize) * (self.cfg.height as usize) * 3 {
            return Err(StillglowError::validation(
                "frame.data size mismatch with width*height*3",
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StillglowError::encode(
                "ffmpeg encoder is not started or already finalized",
            ));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            StillglowError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn end(&mut self) -> StillglowResult<()> {
        drop(self.stdin.take());

        let Some(child) = self.child.take() else {
            return Err(StillglowError::encode("ffmpeg encoder was never started"));
        };

        let output = child.wait_with_output().map_err(|e| {
            StillglowError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StillglowError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
