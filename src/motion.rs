use crate::config::MotionConfig;

/// Zoom factor for `frame`: a triangular wave oscillating between `1` and `1 + zoom_strength`,
/// completing `zoom_cycles` full periods over `total_frames`.
pub fn zoom_factor(cfg: &MotionConfig, frame: u64, total_frames: u64) -> f64 {
    let progress = (cfg.zoom_cycles * frame as f64) / total_frames as f64;
    let phase = progress.rem_euclid(1.0);
    1.0 + cfg.zoom_strength * (1.0 - 2.0 * (phase - 0.5).abs())
}

/// Vertical pan offset for `frame`: a sinusoid with `move_amplitude` pixels of travel and
/// `move_cycles` full periods over `total_frames`.
pub fn vertical_offset(cfg: &MotionConfig, frame: u64, total_frames: u64) -> f64 {
    let progress = (cfg.move_cycles * frame as f64) / total_frames as f64;
    cfg.move_amplitude * (std::f64::consts::TAU * progress).sin()
}
