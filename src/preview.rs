// Live-view look-alikes of the capture filters.
//
// The preview only has to look close enough while framing the shot, so it
// uses the familiar CSS-style operations (sepia, saturate, hue-rotate, ...)
// folded into a single color matrix, plus an optional light blur. The photo
// that is kept always goes through the filter module.

use crate::error::BoothResult;
use crate::filter::{ColorMatrix, FilterId, encode_channel};
use crate::raster;
use crate::types::FrameBuffer;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PreviewOp {
    Grayscale(f32),
    Sepia(f32),
    Saturate(f32),
    /// Degrees.
    HueRotate(f32),
    Brightness(f32),
    Contrast(f32),
    /// Box radius in pixels.
    Blur(usize),
}

impl PreviewOp {
    /// Color matrix for the op; `None` for spatial ops.
    pub fn matrix(self) -> Option<ColorMatrix> {
        let m = match self {
            PreviewOp::Grayscale(a) => {
                let k = 1.0 - a.clamp(0.0, 1.0);
                rows([
                    [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
                    [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
                    [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
                ])
            }
            PreviewOp::Sepia(a) => {
                let k = 1.0 - a.clamp(0.0, 1.0);
                rows([
                    [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
                    [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
                    [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
                ])
            }
            PreviewOp::Saturate(s) => rows([
                [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
            ]),
            PreviewOp::HueRotate(deg) => {
                let (s, c) = deg.to_radians().sin_cos();
                rows([
                    [
                        0.213 + c * 0.787 - s * 0.213,
                        0.715 - c * 0.715 - s * 0.715,
                        0.072 - c * 0.072 + s * 0.928,
                    ],
                    [
                        0.213 - c * 0.213 + s * 0.143,
                        0.715 + c * 0.285 + s * 0.140,
                        0.072 - c * 0.072 - s * 0.283,
                    ],
                    [
                        0.213 - c * 0.213 - s * 0.787,
                        0.715 - c * 0.715 + s * 0.715,
                        0.072 + c * 0.928 + s * 0.072,
                    ],
                ])
            }
            PreviewOp::Brightness(b) => ColorMatrix::scale(b, b, b),
            PreviewOp::Contrast(c) => {
                let o = 255.0 * (0.5 - 0.5 * c);
                ColorMatrix::scale_offset([c, c, c], [o, o, o])
            }
            PreviewOp::Blur(_) => return None,
        };
        Some(m)
    }
}

fn rows(rows: [[f32; 3]; 3]) -> ColorMatrix {
    ColorMatrix {
        rows,
        offset: [0.0; 3],
    }
}

/// Preview chain for `filter`. Filters without a live look-alike preview
/// unfiltered.
pub fn preview_ops(filter: FilterId) -> &'static [PreviewOp] {
    use PreviewOp::*;
    match filter {
        FilterId::Vintage => &[Sepia(0.5), Contrast(1.2), Brightness(0.9)],
        FilterId::Bw => &[Grayscale(1.0)],
        FilterId::Sepia => &[Sepia(1.0)],
        FilterId::Cool => &[HueRotate(180.0), Saturate(1.5)],
        FilterId::Warm => &[HueRotate(-20.0), Saturate(1.3), Brightness(1.1)],
        FilterId::Dreamy => &[Blur(1), Brightness(1.2), Saturate(0.8), Contrast(0.9)],
        _ => &[],
    }
}

/// Reusable scratch buffers for the per-frame preview.
#[derive(Default)]
pub struct LivePreview {
    tmp: Option<FrameBuffer>,
    blurred: Option<FrameBuffer>,
}

impl LivePreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the preview look for `filter` to `frame` in place.
    pub fn apply(&mut self, frame: &mut FrameBuffer, filter: FilterId) -> BoothResult<()> {
        let ops = preview_ops(filter);
        if ops.is_empty() {
            return Ok(());
        }

        let mut matrix: Option<ColorMatrix> = None;
        for op in ops {
            match (op, op.matrix()) {
                (PreviewOp::Blur(radius), _) => {
                    self.flush(frame, matrix.take());
                    self.blur(frame, *radius)?;
                }
                (_, Some(m)) => {
                    matrix = Some(match matrix {
                        Some(prev) => prev.then(&m),
                        None => m,
                    });
                }
                (_, None) => {}
            }
        }
        self.flush(frame, matrix);
        Ok(())
    }

    fn flush(&self, frame: &mut FrameBuffer, matrix: Option<ColorMatrix>) {
        let Some(m) = matrix else {
            return;
        };
        for px in frame.pixels.chunks_exact_mut(4) {
            let v = m.eval([px[0] as f32, px[1] as f32, px[2] as f32]);
            px[0] = encode_channel(v[0]);
            px[1] = encode_channel(v[1]);
            px[2] = encode_channel(v[2]);
        }
    }

    fn blur(&mut self, frame: &mut FrameBuffer, radius: usize) -> BoothResult<()> {
        let (w, h) = (frame.width, frame.height);
        let tmp = scratch(&mut self.tmp, w, h);
        let out = scratch(&mut self.blurred, w, h);
        raster::box_blur_rgba(frame, tmp, out, radius)?;
        std::mem::swap(&mut frame.pixels, &mut out.pixels);
        Ok(())
    }
}

fn scratch(slot: &mut Option<FrameBuffer>, w: usize, h: usize) -> &mut FrameBuffer {
    if slot.as_ref().is_none_or(|fb| fb.width != w || fb.height != h) {
        *slot = Some(FrameBuffer::new(w, h));
    }
    slot.get_or_insert_with(|| FrameBuffer::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_filters_preview_unchanged() {
        let mut preview = LivePreview::new();
        let src = FrameBuffer::filled(4, 4, [120, 80, 40, 255]);
        for filter in [FilterId::None, FilterId::Candy, FilterId::Ocean] {
            let mut fb = src.clone();
            preview.apply(&mut fb, filter).unwrap();
            assert_eq!(fb, src);
        }
    }

    #[test]
    fn grayscale_preview_is_neutral() {
        let mut preview = LivePreview::new();
        let mut fb = FrameBuffer::filled(2, 2, [200, 30, 90, 255]);
        preview.apply(&mut fb, FilterId::Bw).unwrap();
        let p = fb.pixel(0, 0);
        assert!(p[0].abs_diff(p[1]) <= 1 && p[1].abs_diff(p[2]) <= 1, "{p:?}");
    }

    #[test]
    fn full_sepia_matches_capture_sepia_on_midtones() {
        let mut preview = LivePreview::new();
        let mut live = FrameBuffer::filled(1, 1, [100, 110, 120, 255]);
        preview.apply(&mut live, FilterId::Sepia).unwrap();
        let mut shot = FrameBuffer::filled(1, 1, [100, 110, 120, 255]);
        crate::filter::apply(&mut shot, FilterId::Sepia);
        assert_eq!(live, shot);
    }

    #[test]
    fn dreamy_brightens_and_blurs() {
        let mut preview = LivePreview::new();
        let mut fb = FrameBuffer::filled(6, 6, [100, 100, 100, 255]);
        fb.put_pixel(3, 3, [250, 250, 250, 255]);
        preview.apply(&mut fb, FilterId::Dreamy).unwrap();
        assert!(fb.pixel(0, 0)[0] > 100);
        assert!(fb.pixel(2, 2)[0] > fb.pixel(0, 0)[0]);
        assert_eq!(fb.pixel(0, 0)[3], 255);
    }

    #[test]
    fn zero_hue_rotation_is_identity() {
        let m = PreviewOp::HueRotate(0.0).matrix().unwrap();
        let v = m.eval([10.0, 20.0, 30.0]);
        for (a, b) in v.iter().zip([10.0, 20.0, 30.0]) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
