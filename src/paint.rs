// Vector drawing on vello_cpu: gradient backgrounds, image paints clipped to
// a shape, stroked outlines and translucent panels. Frames stay straight-alpha
// RGBA; the pixmap in between is premultiplied.

use std::sync::Arc;

use kurbo::{BezPath, PathEl};
use vello_cpu::kurbo::{Affine, Join, Point, Rect, Stroke};
use vello_cpu::peniko::color::PremulRgba8;
use vello_cpu::peniko::{Color, Gradient, ImageSampler};
use vello_cpu::{Image, ImageSource, Pixmap, RenderContext};

use crate::error::{BoothError, BoothResult};
use crate::types::FrameBuffer;

/// One drawing surface. Record with the draw calls, then [`Painter::render`].
pub struct Painter {
    ctx: RenderContext,
    pixmap: Pixmap,
}

impl Painter {
    pub fn new(width: usize, height: usize) -> BoothResult<Self> {
        let (w, h) = surface_size(width, height)?;
        Ok(Self {
            ctx: RenderContext::new(w, h),
            pixmap: Pixmap::new(w, h),
        })
    }

    pub fn width(&self) -> usize {
        usize::from(self.ctx.width())
    }

    pub fn height(&self) -> usize {
        usize::from(self.ctx.height())
    }

    /// Drop everything recorded so far; the surface size is kept.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    /// Opaque top-to-bottom gradient over the whole surface.
    pub fn vertical_gradient(&mut self, top: [u8; 3], bottom: [u8; 3]) {
        let (w, h) = (self.width() as f64, self.height() as f64);
        let gradient = Gradient::new_linear((0.0, 0.0), (0.0, h)).with_stops([opaque(top), opaque(bottom)]);
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint_transform(Affine::IDENTITY);
        self.ctx.set_paint(gradient);
        self.ctx.fill_rect(&Rect::new(0.0, 0.0, w, h));
    }

    /// Solid rectangle; `rgba[3]` below 255 shades what is underneath.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rgba: [u8; 4]) {
        let [r, g, b, a] = rgba;
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint(Color::from_rgba8(r, g, b, a));
        self.ctx.fill_rect(&Rect::new(x, y, x + w, y + h));
    }

    /// Draw `image` with its top-left at (`x`, `y`). With a clip, only the
    /// part inside the path is kept, with anti-aliased edges.
    pub fn draw_image(&mut self, image: &FrameBuffer, x: f64, y: f64, clip: Option<&BezPath>) -> BoothResult<()> {
        let paint = image_paint(image)?;

        self.ctx.set_transform(Affine::IDENTITY);
        if let Some(path) = clip {
            self.ctx.push_clip_layer(&to_cpu_path(path));
        }
        self.ctx.set_transform(Affine::translate((x, y)));
        self.ctx.set_paint_transform(Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&Rect::new(0.0, 0.0, image.width as f64, image.height as f64));
        if clip.is_some() {
            self.ctx.pop_layer();
        }
        self.ctx.set_transform(Affine::IDENTITY);
        Ok(())
    }

    /// Stroke centered on `path`: half the width falls outside the shape.
    pub fn stroke(&mut self, path: &BezPath, width: f64, rgb: [u8; 3]) {
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_stroke(Stroke::new(width).with_join(Join::Miter));
        self.ctx.set_paint(opaque(rgb));
        self.ctx.stroke_path(&to_cpu_path(path));
    }

    /// Rasterize everything recorded since the last reset.
    pub fn render(&mut self) -> BoothResult<FrameBuffer> {
        let mut out = FrameBuffer::new(self.width(), self.height());
        self.render_into(&mut out)?;
        Ok(out)
    }

    /// Like [`Painter::render`], reusing `out`'s allocation.
    pub fn render_into(&mut self, out: &mut FrameBuffer) -> BoothResult<()> {
        if out.width != self.width() || out.height != self.height() {
            return Err(BoothError::validation("painter: output size mismatch"));
        }
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        for (dst, src) in out
            .pixels
            .chunks_exact_mut(4)
            .zip(self.pixmap.data_as_u8_slice().chunks_exact(4))
        {
            dst.copy_from_slice(&unpremultiply(src));
        }
        Ok(())
    }
}

fn surface_size(width: usize, height: usize) -> BoothResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| BoothError::validation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| BoothError::validation("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(BoothError::validation("surface has no pixels"));
    }
    Ok((w, h))
}

fn opaque([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

fn image_paint(image: &FrameBuffer) -> BoothResult<Image> {
    let (w, h) = surface_size(image.width, image.height)?;
    let mut may_have_opacities = false;
    let pixels = image
        .pixels
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            PremulRgba8::from_u8_array(premultiply(px))
        })
        .collect();
    let pixmap = Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(Image {
        image: ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: ImageSampler::default(),
    })
}

fn premultiply(px: &[u8]) -> [u8; 4] {
    let a = u16::from(px[3]);
    let mul = |c: u8| ((u16::from(c) * a + 127) / 255) as u8;
    [mul(px[0]), mul(px[1]), mul(px[2]), px[3]]
}

fn unpremultiply(px: &[u8]) -> [u8; 4] {
    let a = u16::from(px[3]);
    if a == 0 {
        return [0; 4];
    }
    let div = |c: u8| ((u16::from(c) * 255 + a / 2) / a).min(255) as u8;
    [div(px[0]), div(px[1]), div(px[2]), px[3]]
}

fn to_cpu_path(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let pt = |p: kurbo::Point| Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect as KRect, Shape};

    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        KRect::new(x0, y0, x1, y1).to_path(0.1)
    }

    #[test]
    fn clipped_image_keeps_inside_only() {
        let mut p = Painter::new(10, 10).unwrap();
        let img = FrameBuffer::filled(10, 10, [200, 40, 40, 255]);
        p.draw_image(&img, 0.0, 0.0, Some(&square(3.0, 3.0, 7.0, 7.0))).unwrap();
        let out = p.render().unwrap();
        assert_eq!(out.pixel(5, 5), [200, 40, 40, 255]);
        assert_eq!(out.pixel(1, 1), [0, 0, 0, 0]);
        assert_eq!(out.pixel(8, 8), [0, 0, 0, 0]);
        let covered = out.pixels.chunks_exact(4).filter(|px| px[3] == 255).count();
        assert_eq!(covered, 16);
    }

    #[test]
    fn image_lands_at_its_offset() {
        let mut p = Painter::new(6, 6).unwrap();
        p.fill_rect(0.0, 0.0, 6.0, 6.0, [0, 0, 0, 255]);
        p.draw_image(&FrameBuffer::filled(2, 2, [0, 255, 0, 255]), 3.0, 1.0, None).unwrap();
        let out = p.render().unwrap();
        assert_eq!(out.pixel(3, 1), [0, 255, 0, 255]);
        assert_eq!(out.pixel(4, 2), [0, 255, 0, 255]);
        assert_eq!(out.pixel(2, 1), [0, 0, 0, 255]);
        assert_eq!(out.pixel(3, 3), [0, 0, 0, 255]);
    }

    #[test]
    fn stroke_straddles_the_outline() {
        let mut p = Painter::new(40, 40).unwrap();
        p.stroke(&square(10.0, 10.0, 30.0, 30.0), 4.0, [0, 0, 255]);
        let out = p.render().unwrap();
        // edge at x = 10; pixels 8..12 are within the 4px stroke
        assert_eq!(out.pixel(8, 20), [0, 0, 255, 255]);
        assert_eq!(out.pixel(11, 20), [0, 0, 255, 255]);
        assert_eq!(out.pixel(20, 20)[3], 0);
        assert_eq!(out.pixel(2, 20)[3], 0);
    }

    #[test]
    fn gradient_runs_top_to_bottom() {
        let mut p = Painter::new(3, 100).unwrap();
        p.vertical_gradient([0, 100, 200], [200, 100, 0]);
        let out = p.render().unwrap();
        let (top, bottom) = (out.pixel(1, 0), out.pixel(1, 99));
        assert!(top[0] < 5 && top[2] > 195, "{top:?}");
        assert!(bottom[0] > 195 && bottom[2] < 5, "{bottom:?}");
        assert_eq!(top[3], 255);
        assert!(out.pixel(1, 50)[0] > 80 && out.pixel(1, 50)[0] < 120);
    }

    #[test]
    fn translucent_rect_shades() {
        let mut p = Painter::new(4, 4).unwrap();
        p.fill_rect(0.0, 0.0, 4.0, 4.0, [255, 255, 255, 255]);
        p.fill_rect(0.0, 0.0, 2.0, 4.0, [0, 0, 0, 128]);
        let out = p.render().unwrap();
        let shaded = out.pixel(1, 1);
        assert!(shaded[0] > 100 && shaded[0] < 155, "{shaded:?}");
        assert_eq!(shaded[3], 255);
        assert_eq!(out.pixel(3, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn reset_clears_recorded_work() {
        let mut p = Painter::new(2, 2).unwrap();
        p.fill_rect(0.0, 0.0, 2.0, 2.0, [9, 9, 9, 255]);
        p.reset();
        assert_eq!(p.render().unwrap(), FrameBuffer::new(2, 2));
    }

    #[test]
    fn oversized_surface_is_rejected() {
        assert!(Painter::new(70_000, 10).is_err());
        assert!(Painter::new(0, 10).is_err());
        let mut out = FrameBuffer::new(3, 3);
        assert!(Painter::new(2, 2).unwrap().render_into(&mut out).is_err());
    }
}
