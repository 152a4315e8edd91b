use crate::{
    error::{StillglowError, StillglowResult},
    sparkle::{RAY_COUNT, Sparkle},
};

/// Draw one sparkle into a single-channel overlay of `width x height` intensity values (0-255).
///
/// The overlay is expected zero-initialized by the caller; the sparkle is never painted directly
/// into the frame. Two elements:
///
/// - a radial glow: the ring at radius `r` (out to `size`) carries intensity
///   `brightness * (r / size) * 0.3`, evaluated per pixel by rounded distance;
/// - `RAY_COUNT` rays 45 degrees apart, rotated by `rotation_deg`, each with the length and
///   stroke width fixed at pool construction, drawn at full `brightness` with a half-pixel
///   anti-aliased edge.
///
/// Strokes keep the maximum coverage where they overlap the glow or each other.
pub fn draw_starburst(
    overlay: &mut [f32],
    width: u32,
    height: u32,
    sparkle: &Sparkle,
    brightness: f64,
    rotation_deg: f64,
) -> StillglowResult<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| StillglowError::validation("overlay size overflow"))?;
    if overlay.len() != expected {
        return Err(StillglowError::validation(
            "draw_starburst expects overlay matching width*height",
        ));
    }
    if brightness <= 0.0 {
        return Ok(());
    }

    let cx = f64::from(sparkle.x);
    let cy = f64::from(sparkle.y);
    let size = f64::from(sparkle.size);

    draw_glow(overlay, width, height, cx, cy, size, brightness);

    for ray in 0..RAY_COUNT {
        let angle = (ray as f64) * (360.0 / RAY_COUNT as f64) + rotation_deg;
        let (sin, cos) = angle.to_radians().sin_cos();
        draw_ray(
            overlay,
            width,
            height,
            cx,
            cy,
            cos,
            sin,
            sparkle.ray_lengths[ray],
            sparkle.ray_widths[ray],
            brightness,
        );
    }

    Ok(())
}

fn draw_glow(
    overlay: &mut [f32],
    width: u32,
    height: u32,
    cx: f64,
    cy: f64,
    size: f64,
    brightness: f64,
) {
    let (x0, x1, y0, y1) = clipped_bbox(width, height, cx - size, cx + size, cy - size, cy + size);
    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f64 - cx;
            let dy = py as f64 - cy;
            let ring = (dx * dx + dy * dy).sqrt().round();
            if ring < 1.0 || ring > size {
                continue;
            }
            let val = (brightness * (ring / size) * 0.3) as f32;
            let cell = &mut overlay[py * width as usize + px];
            *cell = cell.max(val);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_ray(
    overlay: &mut [f32],
    width: u32,
    height: u32,
    cx: f64,
    cy: f64,
    dir_x: f64,
    dir_y: f64,
    length: f64,
    stroke_width: f64,
    brightness: f64,
) {
    let ex = cx + length * dir_x;
    let ey = cy + length * dir_y;
    let half_w = stroke_width / 2.0;
    let margin = half_w + 1.0;

    let (x0, x1, y0, y1) = clipped_bbox(
        width,
        height,
        cx.min(ex) - margin,
        cx.max(ex) + margin,
        cy.min(ey) - margin,
        cy.max(ey) + margin,
    );

    for py in y0..y1 {
        for px in x0..x1 {
            let dist = dist_to_segment(px as f64, py as f64, cx, cy, dir_x, dir_y, length);
            let coverage = (half_w + 0.5 - dist).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let val = (brightness * coverage) as f32;
            let cell = &mut overlay[py * width as usize + px];
            *cell = cell.max(val);
        }
    }
}

/// Distance from `(px, py)` to the segment starting at `(cx, cy)` along the unit direction
/// `(dir_x, dir_y)` for `length` pixels.
fn dist_to_segment(px: f64, py: f64, cx: f64, cy: f64, dir_x: f64, dir_y: f64, length: f64) -> f64 {
    let rx = px - cx;
    let ry = py - cy;
    let t = (rx * dir_x + ry * dir_y).clamp(0.0, length);
    let nx = rx - t * dir_x;
    let ny = ry - t * dir_y;
    (nx * nx + ny * ny).sqrt()
}

fn clipped_bbox(
    width: u32,
    height: u32,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
) -> (usize, usize, usize, usize) {
    let x0 = min_x.floor().max(0.0) as usize;
    let y0 = min_y.floor().max(0.0) as usize;
    let x1 = ((max_x.ceil() + 1.0).max(0.0) as usize).min(width as usize);
    let y1 = ((max_y.ceil() + 1.0).max(0.0) as usize).min(height as usize);
    (x0, x1, y0, y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparkle_at(x: u32, y: u32) -> Sparkle {
        Sparkle {
            x,
            y,
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

    fn at(overlay: &[f32], width: u32, x: u32, y: u32) -> f32 {
        overlay[(y * width + x) as usize]
    }

    #[test]
    fn zero_brightness_draws_nothing() {
        let mut overlay = vec![0f32; 32 * 32];
        draw_starburst(&mut overlay, 32, 32, &sparkle_at(16, 16), 0.0, 0.0).unwrap();
        assert!(overlay.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rays_carry_full_brightness_through_center() {
        let mut overlay = vec![0f32; 64 * 64];
        draw_starburst(&mut overlay, 64, 64, &sparkle_at(32, 32), 255.0, 0.0).unwrap();
        // Unrotated rays run along the axes and diagonals.
        assert_eq!(at(&overlay, 64, 32, 32), 255.0);
        assert_eq!(at(&overlay, 64, 35, 32), 255.0);
        assert_eq!(at(&overlay, 64, 32, 29), 255.0);
        assert_eq!(at(&overlay, 64, 35, 35), 255.0);
    }

    #[test]
    fn glow_is_dimmer_than_rays_and_fades_inward() {
        let mut overlay = vec![0f32; 64 * 64];
        draw_starburst(&mut overlay, 64, 64, &sparkle_at(32, 32), 255.0, 0.0).unwrap();
        // Off-axis pixel between rays at radius ~6: glow only, 255 * (6/8) * 0.3.
        let (dx, dy) = (
            (6.0 * (22.5f64).to_radians().cos()).round() as i32,
            (6.0 * (22.5f64).to_radians().sin()).round() as i32,
        );
        let v = at(&overlay, 64, (32 + dx) as u32, (32 + dy) as u32);
        assert!(v > 0.0 && v < 80.0, "glow value {v}");
        // Glow brightens outward: ring 7 beats ring 3 (sampled between rays).
        let inner = at(&overlay, 64, 35, 33);
        let outer = at(&overlay, 64, 38, 35);
        assert!(outer > inner, "outer {outer} inner {inner}");
    }

    #[test]
    fn rotation_moves_the_rays() {
        let mut base = vec![0f32; 64 * 64];
        draw_starburst(&mut base, 64, 64, &sparkle_at(32, 32), 255.0, 0.0).unwrap();
        let mut rotated = vec![0f32; 64 * 64];
        draw_starburst(&mut rotated, 64, 64, &sparkle_at(32, 32), 255.0, 22.5).unwrap();
        assert_ne!(base, rotated);
        // The axis pixel loses full-ray coverage once rotated between ray directions.
        assert!(at(&rotated, 64, 38, 32) < 255.0);
    }

    #[test]
    fn drawing_clips_at_frame_edges() {
        let mut overlay = vec![0f32; 16 * 16];
        draw_starburst(&mut overlay, 16, 16, &sparkle_at(0, 0), 255.0, 10.0).unwrap();
        assert_eq!(at(&overlay, 16, 0, 0), 255.0);

        let mut overlay = vec![0f32; 16 * 16];
        draw_starburst(&mut overlay, 16, 16, &sparkle_at(15, 15), 255.0, 80.0).unwrap();
        assert!(overlay.iter().any(|&v| v > 0.0));
    }

    #[test]
    fn rejects_mismatched_overlay() {
        let mut overlay = vec![0f32; 10];
        assert!(draw_starburst(&mut overlay, 16, 16, &sparkle_at(8, 8), 255.0, 0.0).is_err());
    }
}
