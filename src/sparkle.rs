use rand::Rng;

use crate::{
    config::SparkleConfig,
    core::Canvas,
    error::{StillglowError, StillglowResult},
};

/// Rays per sparkle, spaced 45 degrees apart.
pub const RAY_COUNT: usize = 8;

/// One sparkle of the pool.
///
/// Everything here is fixed at pool construction: position, timing window, size, per-ray geometry,
/// rotation speed. There is no mutable per-frame state; rotation is recovered as a pure function
/// of the frame index (see [`Sparkle::rotation_at`]), which keeps frames independent of each other
/// and lets them render in parallel.
#[derive(Clone, Debug)]
pub struct Sparkle {
    /// Center x in canvas pixels.
    pub x: u32,
    /// Center y in canvas pixels.
    pub y: u32,
    /// Active window length in frames.
    pub life: u32,
    /// Frame index at which the window opens; `age` wraps modulo the render length, so a sparkle
    /// fires once per pass and refires with a fresh envelope if the render is looped past its end.
    pub start: u64,
    /// Maximum ray length in pixels.
    pub size: u32,
    /// Degrees per active frame; may be negative.
    pub rotation_speed: f64,
    /// Rotation before the first active frame, degrees.
    pub initial_rotation: f64,
    /// Peak brightness of the envelope.
    pub max_brightness: u8,
    /// Per-ray lengths in pixels, 70-100% of `size`.
    pub ray_lengths: [f64; RAY_COUNT],
    /// Per-ray stroke widths in pixels, 10-25% of `size`, at least 1.
    pub ray_widths: [f64; RAY_COUNT],
}

impl Sparkle {
    /// A degenerate sparkle never lights up or draws nothing; reject it up front instead of
    /// tolerating it silently.
    pub fn validate(&self) -> StillglowResult<()> {
        if self.life == 0 {
            return Err(StillglowError::validation("sparkle life must be > 0"));
        }
        if self.size == 0 {
            return Err(StillglowError::validation("sparkle size must be > 0"));
        }
        Ok(())
    }

    /// Age of the sparkle at `frame`, wrapping modulo `total_frames`.
    pub fn age(&self, frame: u64, total_frames: u64) -> u64 {
        let total = total_frames.max(1);
        ((frame % total) + total - (self.start % total)) % total
    }

    /// `true` when the sparkle is drawn at `frame`.
    pub fn is_active(&self, frame: u64, total_frames: u64) -> bool {
        self.age(frame, total_frames) < u64::from(self.life)
    }

    /// Triangular brightness envelope: ramps from 0 to `max_brightness` over the first half of
    /// `life`, back down over the second half, floored to whole units. Zero when inactive.
    pub fn brightness_at(&self, frame: u64, total_frames: u64) -> f64 {
        let age = self.age(frame, total_frames);
        let life = u64::from(self.life);
        if age >= life {
            return 0.0;
        }
        let age = age as f64;
        let life = life as f64;
        let half = life / 2.0;
        let max = f64::from(self.max_brightness);
        let b = if age < half {
            max * age / half
        } else {
            max * (life - age) / half
        };
        b.floor()
    }

    /// Rotation in degrees at `frame`, in `[0, 360)`.
    ///
    /// Rotation advances by `rotation_speed` on each active frame, in frame order, counting the
    /// current frame; inactive frames do not advance it. Computed from the cumulative count of
    /// active frames so far, so it needs no carried state.
    pub fn rotation_at(&self, frame: u64, total_frames: u64) -> f64 {
        let steps = self.active_frames_through(frame, total_frames);
        (self.initial_rotation + self.rotation_speed * steps as f64).rem_euclid(360.0)
    }

    /// Number of active frames in `[0, frame]`.
    fn active_frames_through(&self, frame: u64, total_frames: u64) -> u64 {
        let total = total_frames.max(1);
        let life = u64::from(self.life).min(total);
        let start = self.start % total;

        // The active window per pass is [start, main_end) plus, when it wraps past the end of the
        // pass, [0, wrapped_end).
        let main_end = (start + life).min(total);
        let wrapped_end = (start + life).saturating_sub(total);

        let full_passes = frame / total;
        let r = frame % total;

        let head = (r + 1).min(wrapped_end);
        let main = if r >= start {
            (r + 1).min(main_end) - start
        } else {
            0
        };

        full_passes * life + head + main
    }
}

/// The full set of sparkles, generated once before rendering and immutable afterwards.
#[derive(Clone, Debug, Default)]
pub struct SparklePool {
    sparkles: Vec<Sparkle>,
}

impl SparklePool {
    /// Validate and adopt an explicit set of sparkles.
    pub fn from_sparkles(sparkles: Vec<Sparkle>) -> StillglowResult<Self> {
        for s in &sparkles {
            s.validate()?;
        }
        Ok(Self { sparkles })
    }

    /// Generate `cfg.count` sparkles from `rng`.
    ///
    /// Positions are uniform over the canvas; lifetimes, start frames, sizes, rotation speeds and
    /// per-ray geometry are all drawn here, once, so a seeded `rng` makes the whole pool
    /// reproducible.
    pub fn generate(
        cfg: &SparkleConfig,
        canvas: Canvas,
        total_frames: u64,
        rng: &mut impl Rng,
    ) -> StillglowResult<Self> {
        cfg.validate()?;
        if total_frames == 0 {
            return Err(StillglowError::validation(
                "sparkle pool needs at least one frame",
            ));
        }

        let mut sparkles = Vec::with_capacity(cfg.count as usize);
        for _ in 0..cfg.count {
            let x = rng.gen_range(0..canvas.width);
            let y = rng.gen_range(0..canvas.height);
            let life = rng.gen_range(cfg.life_min..=cfg.life_max);
            let start = rng.gen_range(0..total_frames);
            let size = rng.gen_range(cfg.size_min..=cfg.size_max);
            let rotation_speed = rng.gen_range(-5.0..5.0);
            let initial_rotation = rng.gen_range(0.0..360.0);

            let mut ray_lengths = [0.0; RAY_COUNT];
            for len in &mut ray_lengths {
                *len = f64::from(size) * rng.gen_range(0.7..1.0);
            }
            let mut ray_widths = [0.0; RAY_COUNT];
            for width in &mut ray_widths {
                *width = (f64::from(size) * rng.gen_range(0.1..0.25)).floor().max(1.0);
            }

            sparkles.push(Sparkle {
                x,
                y,
                life,
                start,
                size,
                rotation_speed,
                initial_rotation,
                max_brightness: cfg.max_brightness,
                ray_lengths,
                ray_widths,
            });
        }

        Self::from_sparkles(sparkles)
    }

    pub fn sparkles(&self) -> &[Sparkle] {
        &self.sparkles
    }

    pub fn len(&self) -> usize {
        self.sparkles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparkles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    fn sparkle(start: u64, life: u32) -> Sparkle {
        Sparkle {
            x: 10,
            y: 10,
            life,
            start,
            size: 8,
            rotation_speed: 3.0,
            initial_rotation: 45.0,
            max_brightness: 255,
            ray_lengths: [6.0; RAY_COUNT],
            ray_widths: [1.0; RAY_COUNT],
        }
    }

    #[test]
    fn envelope_ramps_up_then_down() {
        let s = sparkle(0, 20);
        assert_eq!(s.brightness_at(0, 300), 0.0);
        assert_eq!(s.brightness_at(5, 300), 127.0);
        assert_eq!(s.brightness_at(10, 300), 255.0);
        assert_eq!(s.brightness_at(19, 300), 25.0);
        assert_eq!(s.brightness_at(20, 300), 0.0);
        assert!(!s.is_active(20, 300));
        assert!(!s.is_active(150, 300));
    }

    #[test]
    fn brightness_never_exceeds_max() {
        let s = sparkle(17, 23);
        for f in 0..600 {
            let b = s.brightness_at(f, 300);
            assert!((0.0..=255.0).contains(&b), "frame {f}: {b}");
        }
    }

    #[test]
    fn activity_window_wraps_across_pass_end() {
        let s = sparkle(290, 20);
        // Window covers frames 290..300 plus the wrapped head 0..10.
        assert!(s.is_active(295, 300));
        assert_eq!(s.age(295, 300), 5);
        assert!(s.is_active(5, 300));
        assert_eq!(s.age(5, 300), 15);
        assert!(!s.is_active(50, 300));
        assert!(!s.is_active(289, 300));
    }

    #[test]
    fn sparkle_refires_on_loop_extension() {
        let s = sparkle(10, 20);
        assert_eq!(s.age(310, 300), 0);
        assert!(s.is_active(310, 300));
        assert_eq!(s.brightness_at(320, 300), s.brightness_at(20, 300));
    }

    #[test]
    fn rotation_matches_sequential_accumulator() {
        let total = 120;
        let s = sparkle(100, 30);
        // Replay the carried-state form: advance before drawing on each active frame.
        let mut acc = s.initial_rotation;
        for f in 0..(2 * total) {
            if s.is_active(f, total) {
                acc = (acc + s.rotation_speed).rem_euclid(360.0);
                let got = s.rotation_at(f, total);
                assert!(
                    (got - acc).rem_euclid(360.0).min((acc - got).rem_euclid(360.0)) < 1e-6,
                    "frame {f}: got {got}, want {acc}"
                );
            }
        }
    }

    #[test]
    fn rotation_only_advances_on_active_frames() {
        let total = 100;
        let s = sparkle(40, 10);
        let before = s.rotation_at(39, total);
        assert_eq!(before, s.rotation_at(0, total));
        assert_ne!(s.rotation_at(40, total), before);
        // Frozen again once the window closes.
        assert_eq!(s.rotation_at(50, total), s.rotation_at(99, total));
    }

    #[test]
    fn validation_rejects_degenerate_sparkles() {
        let mut s = sparkle(0, 0);
        assert!(s.validate().is_err());
        s.life = 10;
        s.size = 0;
        assert!(s.validate().is_err());
        assert!(SparklePool::from_sparkles(vec![sparkle(0, 0)]).is_err());
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let cfg = SparkleConfig::default();
        let canvas = Canvas {
            width: 512,
            height: 512,
        };
        let a = SparklePool::generate(&cfg, canvas, 300, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = SparklePool::generate(&cfg, canvas, 300, &mut StdRng::seed_from_u64(7)).unwrap();
        let c = SparklePool::generate(&cfg, canvas, 300, &mut StdRng::seed_from_u64(8)).unwrap();

        assert_eq!(a.len(), 50);
        for (sa, sb) in a.sparkles().iter().zip(b.sparkles()) {
            assert_eq!((sa.x, sa.y, sa.start, sa.life, sa.size), (sb.x, sb.y, sb.start, sb.life, sb.size));
            assert_eq!(sa.ray_lengths, sb.ray_lengths);
            assert_eq!(sa.ray_widths, sb.ray_widths);
        }
        assert!(
            a.sparkles()
                .iter()
                .zip(c.sparkles())
                .any(|(sa, sc)| (sa.x, sa.y) != (sc.x, sc.y))
        );
    }

    #[test]
    fn generated_geometry_stays_in_configured_ranges() {
        let cfg = SparkleConfig::default();
        let canvas = Canvas {
            width: 64,
            height: 64,
        };
        let pool =
            SparklePool::generate(&cfg, canvas, 300, &mut StdRng::seed_from_u64(3)).unwrap();
        for s in pool.sparkles() {
            assert!(s.x < 64 && s.y < 64);
            assert!((cfg.size_min..=cfg.size_max).contains(&s.size));
            assert!((cfg.life_min..=cfg.life_max).contains(&s.life));
            assert!(s.start < 300);
            assert!(s.rotation_speed.abs() <= 5.0);
            for (&len, &width) in s.ray_lengths.iter().zip(&s.ray_widths) {
                let size = f64::from(s.size);
                assert!(len >= 0.7 * size && len <= size);
                assert!(width >= 1.0 && width <= (0.25 * size).max(1.0));
            }
        }
    }
}
