use crate::{core::Canvas, core::FrameRgb, source::SourceImage};

/// Synthesize the base frame for one `(zoom, vertical_offset)` pair.
///
/// The source is virtually rescaled to `floor(iw*zoom) x floor(ih*zoom)` and a centered
/// `canvas`-sized viewport is sampled from it, shifted vertically by `vertical_offset`. Instead of
/// materializing the rescaled raster, every output pixel is mapped straight back into source space
/// and bilinearly sampled there; taps outside the source contribute black. The output is exactly
/// `canvas.width x canvas.height` for every zoom and pan, including pans that leave the source
/// entirely.
pub fn compose_base_frame(
    src: &SourceImage,
    zoom: f64,
    vertical_offset: f64,
    canvas: Canvas,
) -> FrameRgb {
    let (w, h) = (canvas.width, canvas.height);
    let (iw, ih) = (src.width(), src.height());

    let scaled_w = (f64::from(iw) * zoom).floor().max(1.0);
    let scaled_h = (f64::from(ih) * zoom).floor().max(1.0);

    // Fractional center-crop offsets in scaled space. Negative when the scaled image is smaller
    // than the canvas, which centers it on black.
    let x_start = (scaled_w - f64::from(w)) / 2.0;
    let y_start = (scaled_h - f64::from(h)) / 2.0;

    let sx_ratio = f64::from(iw) / scaled_w;
    let sy_ratio = f64::from(ih) / scaled_h;

    let mut out = FrameRgb::black(w, h);
    for py in 0..h {
        let v = f64::from(py) + y_start - vertical_offset;
        let sy = (v + 0.5) * sy_ratio - 0.5;
        let row = (py as usize) * (w as usize) * 3;
        for px in 0..w {
            let u = f64::from(px) + x_start;
            let sx = (u + 0.5) * sx_ratio - 0.5;
            let rgb = sample_bilinear(src, sx, sy);
            let idx = row + (px as usize) * 3;
            out.data[idx..idx + 3].copy_from_slice(&rgb);
        }
    }
    out
}

/// Bilinear sample at fractional source coordinates; taps outside the raster are black.
fn sample_bilinear(src: &SourceImage, sx: f64, sy: f64) -> [u8; 3] {
    let (iw, ih) = (i64::from(src.width()), i64::from(src.height()));

    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    if x0 < -1 || x0 >= iw || y0 < -1 || y0 >= ih {
        return [0, 0, 0];
    }

    let tap = |x: i64, y: i64| -> [f64; 3] {
        if x < 0 || x >= iw || y < 0 || y >= ih {
            return [0.0; 3];
        }
        let p = src.pixel(x as u32, y as u32);
        [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])]
    };

    let p00 = tap(x0, y0);
    let p10 = tap(x0 + 1, y0);
    let p01 = tap(x0, y0 + 1);
    let p11 = tap(x0 + 1, y0 + 1);

    let mut rgb = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        let v = top * (1.0 - fy) + bottom * fy;
        rgb[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    rgb
}
