// Capture-time color filters.
//
// Every filter is a short list of affine color stages evaluated by one
// per-pixel function. Between stages channels are clamped to `[0, 255]`; the
// last stage is rounded and clamped into a byte. Alpha is never touched.

use crate::types::FrameBuffer;

named_ids! {
    /// Named color transform applied when a photo is taken.
    pub enum FilterId {
        None => "none",
        Bw => "bw",
        Sepia => "sepia",
        Vintage => "vintage",
        Cool => "cool",
        Warm => "warm",
        Dreamy => "dreamy",
        Sunset => "sunset",
        Ocean => "ocean",
        Rose => "rose",
        Lavender => "lavender",
        Candy => "candy",
    }
}

impl Default for FilterId {
    fn default() -> Self {
        FilterId::None
    }
}

/// `out[c] = rows[c] · [r, g, b] + offset[c]`, channels in 0..=255 units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix {
    pub rows: [[f32; 3]; 3],
    pub offset: [f32; 3],
}

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix::scale_offset([1.0, 1.0, 1.0], [0.0; 3]);

    pub const fn scale_offset(scale: [f32; 3], offset: [f32; 3]) -> Self {
        Self {
            rows: [
                [scale[0], 0.0, 0.0],
                [0.0, scale[1], 0.0],
                [0.0, 0.0, scale[2]],
            ],
            offset,
        }
    }

    pub const fn scale(r: f32, g: f32, b: f32) -> Self {
        Self::scale_offset([r, g, b], [0.0; 3])
    }

    pub const fn offset(r: f32, g: f32, b: f32) -> Self {
        Self::scale_offset([1.0, 1.0, 1.0], [r, g, b])
    }

    /// Same coefficients feeding all three outputs.
    pub const fn luma(weights: [f32; 3]) -> Self {
        Self {
            rows: [weights, weights, weights],
            offset: [0.0; 3],
        }
    }

    #[inline]
    pub fn eval(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for (c, o) in out.iter_mut().enumerate() {
            let row = self.rows[c];
            *o = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2] + self.offset[c];
        }
        out
    }

    /// `self` followed by `next`, folded into one matrix (no clamping between).
    pub fn then(&self, next: &ColorMatrix) -> ColorMatrix {
        let mut rows = [[0.0f32; 3]; 3];
        let mut offset = [0.0f32; 3];
        for i in 0..3 {
            for j in 0..3 {
                rows[i][j] = (0..3).map(|k| next.rows[i][k] * self.rows[k][j]).sum();
            }
            offset[i] = (0..3)
                .map(|k| next.rows[i][k] * self.offset[k])
                .sum::<f32>()
                + next.offset[i];
        }
        ColorMatrix { rows, offset }
    }
}

const SEPIA: ColorMatrix = ColorMatrix {
    rows: [
        [0.393, 0.769, 0.189],
        [0.349, 0.686, 0.168],
        [0.272, 0.534, 0.131],
    ],
    offset: [0.0; 3],
};

const NO_STAGES: &[ColorMatrix] = &[];
const BW_STAGES: &[ColorMatrix] = &[ColorMatrix::luma([0.299, 0.587, 0.114])];
const SEPIA_STAGES: &[ColorMatrix] = &[SEPIA];
// Sepia is clamped at 255 before the tint; the tint itself may overshoot.
const VINTAGE_STAGES: &[ColorMatrix] = &[SEPIA, ColorMatrix::scale(1.1, 1.05, 0.9)];
const COOL_STAGES: &[ColorMatrix] = &[ColorMatrix::offset(-20.0, 0.0, 20.0)];
const WARM_STAGES: &[ColorMatrix] = &[ColorMatrix::offset(20.0, 10.0, -20.0)];
const DREAMY_STAGES: &[ColorMatrix] = &[ColorMatrix::scale(1.2, 1.1, 1.05)];
const SUNSET_STAGES: &[ColorMatrix] = &[ColorMatrix::scale(1.3, 0.95, 0.7)];
const OCEAN_STAGES: &[ColorMatrix] = &[ColorMatrix::scale(0.8, 1.1, 1.3)];
const ROSE_STAGES: &[ColorMatrix] =
    &[ColorMatrix::scale_offset([1.25, 0.95, 1.1], [20.0, 0.0, 0.0])];
const LAVENDER_STAGES: &[ColorMatrix] =
    &[ColorMatrix::scale_offset([1.15, 1.05, 1.25], [15.0, 0.0, 20.0])];
const CANDY_STAGES: &[ColorMatrix] =
    &[ColorMatrix::scale_offset([1.3, 1.2, 1.25], [25.0, 15.0, 20.0])];

/// Table entry for one filter. An empty stage list is the identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSpec {
    pub stages: &'static [ColorMatrix],
}

impl FilterSpec {
    pub fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }

    #[inline]
    pub fn eval_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut v = [rgb[0] as f32, rgb[1] as f32, rgb[2] as f32];
        let last = self.stages.len().saturating_sub(1);
        for (i, stage) in self.stages.iter().enumerate() {
            v = stage.eval(v);
            if i != last {
                for c in &mut v {
                    *c = c.clamp(0.0, 255.0);
                }
            }
        }
        [encode_channel(v[0]), encode_channel(v[1]), encode_channel(v[2])]
    }
}

impl FilterId {
    pub fn spec(self) -> FilterSpec {
        let stages = match self {
            FilterId::None => NO_STAGES,
            FilterId::Bw => BW_STAGES,
            FilterId::Sepia => SEPIA_STAGES,
            FilterId::Vintage => VINTAGE_STAGES,
            FilterId::Cool => COOL_STAGES,
            FilterId::Warm => WARM_STAGES,
            FilterId::Dreamy => DREAMY_STAGES,
            FilterId::Sunset => SUNSET_STAGES,
            FilterId::Ocean => OCEAN_STAGES,
            FilterId::Rose => ROSE_STAGES,
            FilterId::Lavender => LAVENDER_STAGES,
            FilterId::Candy => CANDY_STAGES,
        };
        FilterSpec { stages }
    }
}

/// Round to nearest and clamp into a byte, like a clamped canvas array.
#[inline]
pub fn encode_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Apply `filter` to every pixel of `frame` in place.
pub fn apply(frame: &mut FrameBuffer, filter: FilterId) {
    let spec = filter.spec();
    if spec.is_identity() {
        return;
    }
    for px in frame.pixels.chunks_exact_mut(4) {
        let out = spec.eval_pixel([px[0], px[1], px[2]]);
        px[..3].copy_from_slice(&out);
    }
    tracing::debug!(filter = %filter, width = frame.width, height = frame.height, "filter applied");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(filter: FilterId, rgba: [u8; 4]) -> [u8; 4] {
        let mut fb = FrameBuffer::filled(1, 1, rgba);
        apply(&mut fb, filter);
        fb.pixel(0, 0)
    }

    fn sample_grid() -> FrameBuffer {
        let mut pixels = Vec::new();
        for r in (0..=255).step_by(51) {
            for g in (0..=255).step_by(51) {
                for b in (0..=255).step_by(51) {
                    pixels.extend_from_slice(&[r as u8, g as u8, b as u8, (r ^ b) as u8]);
                }
            }
        }
        FrameBuffer::from_rgba(216, 1, pixels).unwrap()
    }

    #[test]
    fn none_is_identity() {
        let src = sample_grid();
        let mut fb = src.clone();
        apply(&mut fb, FilterId::None);
        assert_eq!(fb, src);
    }

    #[test]
    fn alpha_is_never_modified() {
        let src = sample_grid();
        for &filter in FilterId::ALL {
            let mut fb = src.clone();
            apply(&mut fb, filter);
            for (a, b) in fb.pixels.chunks_exact(4).zip(src.pixels.chunks_exact(4)) {
                assert_eq!(a[3], b[3], "{filter}");
            }
        }
    }

    #[test]
    fn bw_channels_are_equal() {
        let mut fb = sample_grid();
        apply(&mut fb, FilterId::Bw);
        for px in fb.pixels.chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
        assert_eq!(one(FilterId::Bw, [255, 255, 255, 255]), [255, 255, 255, 255]);
    }

    #[test]
    fn sepia_matches_reference_matrix() {
        // 0.393*100 + 0.769*150 + 0.189*200 = 192.45
        let out = one(FilterId::Sepia, [100, 150, 200, 255]);
        assert_eq!(out[0], 192);
        assert_eq!(one(FilterId::Sepia, [255, 255, 255, 7]), [255, 255, 239, 7]);
    }

    #[test]
    fn vintage_clamps_sepia_before_tint() {
        // sepia(white) = (255, 255, 238.9) then tint: 280.5 -> 255, 267.75 -> 255, 215.04
        assert_eq!(one(FilterId::Vintage, [255, 255, 255, 255]), [255, 255, 215, 255]);
    }

    #[test]
    fn offsets_saturate_at_both_ends() {
        assert_eq!(one(FilterId::Cool, [10, 50, 250, 255]), [0, 50, 255, 255]);
        assert_eq!(one(FilterId::Warm, [250, 100, 10, 255]), [255, 110, 0, 255]);
        assert_eq!(one(FilterId::Candy, [0, 0, 0, 255]), [25, 15, 20, 255]);
        assert_eq!(one(FilterId::Rose, [200, 100, 100, 255]), [255, 95, 110, 255]);
    }

    #[test]
    fn scales_follow_the_table() {
        assert_eq!(one(FilterId::Dreamy, [100, 100, 100, 255]), [120, 110, 105, 255]);
        assert_eq!(one(FilterId::Sunset, [100, 100, 100, 255]), [130, 95, 70, 255]);
        assert_eq!(one(FilterId::Ocean, [100, 100, 100, 255]), [80, 110, 130, 255]);
        assert_eq!(one(FilterId::Lavender, [100, 100, 100, 255]), [130, 105, 145, 255]);
    }

    #[test]
    fn then_folds_two_stages() {
        let a = ColorMatrix::offset(10.0, 0.0, 0.0);
        let b = ColorMatrix::scale(2.0, 1.0, 1.0);
        let folded = a.then(&b);
        assert_eq!(folded.eval([5.0, 1.0, 1.0]), [30.0, 1.0, 1.0]);
        assert_eq!(ColorMatrix::IDENTITY.then(&b), b);
    }
}
