use crate::{
    core::Canvas,
    error::{StillglowError, StillglowResult},
};

/// Zoom and pan motion parameters.
///
/// The zoom is a triangular wave completing `zoom_cycles` periods over the render, oscillating
/// between `1` and `1 + zoom_strength`. The vertical pan is sinusoidal with `move_cycles` periods
/// and `move_amplitude` pixels of travel.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct MotionConfig {
    pub zoom_cycles: f64,
    pub zoom_strength: f64,
    pub move_amplitude: f64,
    pub move_cycles: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            zoom_cycles: 3.0,
            zoom_strength: 0.05,
            move_amplitude: 100.0,
            move_cycles: 2.0,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> StillglowResult<()> {
        for (name, v) in [
            ("zoom_cycles", self.zoom_cycles),
            ("zoom_strength", self.zoom_strength),
            ("move_amplitude", self.move_amplitude),
            ("move_cycles", self.move_cycles),
        ] {
            if !v.is_finite() {
                return Err(StillglowError::validation(format!(
                    "motion {name} must be finite"
                )));
            }
        }
        if self.zoom_cycles < 0.0 || self.move_cycles < 0.0 {
            return Err(StillglowError::validation(
                "motion cycle counts must be >= 0",
            ));
        }
        if self.zoom_strength < 0.0 {
            return Err(StillglowError::validation("zoom_strength must be >= 0"));
        }
        Ok(())
    }
}

/// Sparkle pool parameters.
///
/// `count == 0` disables the overlay entirely. Sizes and lifetimes are inclusive integer ranges,
/// drawn per sparkle at pool construction.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SparkleConfig {
    pub count: u32,
    pub size_min: u32,
    pub size_max: u32,
    pub max_brightness: u8,
    pub life_min: u32,
    pub life_max: u32,
}

impl Default for SparkleConfig {
    fn default() -> Self {
        Self {
            count: 50,
            size_min: 4,
            size_max: 8,
            max_brightness: 255,
            life_min: 15,
            life_max: 30,
        }
    }
}

impl SparkleConfig {
    pub fn validate(&self) -> StillglowResult<()> {
        if self.size_min == 0 {
            return Err(StillglowError::validation("sparkle size_min must be > 0"));
        }
        if self.life_min == 0 {
            return Err(StillglowError::validation("sparkle life_min must be > 0"));
        }
        if self.size_min > self.size_max {
            return Err(StillglowError::validation(
                "sparkle size_min must be <= size_max",
            ));
        }
        if self.life_min > self.life_max {
            return Err(StillglowError::validation(
                "sparkle life_min must be <= life_max",
            ));
        }
        Ok(())
    }
}

/// Full configuration for one render: output geometry, timing, motion, sparkles, and the seed
/// driving every randomized decision.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneConfig {
    pub canvas: Canvas,
    pub duration_secs: f64,
    pub fps: u32,
    pub seed: u64,
    pub motion: MotionConfig,
    pub sparkles: SparkleConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 512,
                height: 512,
            },
            duration_secs: 10.0,
            fps: 30,
            seed: 0,
            motion: MotionConfig::default(),
            sparkles: SparkleConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Total number of frames in the render.
    pub fn total_frames(&self) -> u64 {
        (self.duration_secs * f64::from(self.fps)).floor().max(0.0) as u64
    }

    pub fn validate(&self) -> StillglowResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(StillglowError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(StillglowError::validation("duration_secs must be > 0"));
        }
        if self.fps == 0 {
            return Err(StillglowError::validation("fps must be non-zero"));
        }
        if self.total_frames() == 0 {
            return Err(StillglowError::validation(
                "duration_secs * fps must yield at least one frame",
            ));
        }
        self.motion.validate()?;
        self.sparkles.validate()?;
        Ok(())
    }
}
