// Pixel container shared by the filters, painter, composer and window.

use image::RgbaImage;

use crate::error::{BoothError, BoothResult};

/// Straight-alpha RGBA8 pixels, row-major, 4 bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>, // length = width * height * 4
}

impl FrameBuffer {
    /// Fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width * height * 4],
        }
    }

    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> BoothResult<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| BoothError::validation("frame size overflow"))?;
        if pixels.len() != expected {
            return Err(BoothError::validation(format!(
                "expected {expected} rgba bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_image(img: RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        Self {
            width: w as usize,
            height: h as usize,
            pixels: img.into_raw(),
        }
    }

    pub fn to_image(&self) -> BoothResult<RgbaImage> {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone())
            .ok_or_else(|| BoothError::validation("frame buffer does not match its dimensions"))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Write one pixel if (x,y) is inside bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Opaque rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, rgba: [u8; 4]) {
        for yy in y..y + h as i32 {
            for xx in x..x + w as i32 {
                self.put_pixel(xx, yy, rgba);
            }
        }
    }

    /// Pack into 0x00RRGGBB words for minifb, flattening alpha onto black.
    pub fn write_0rgb(&self, out: &mut Vec<u32>) {
        out.clear();
        out.reserve(self.width * self.height);
        for px in self.pixels.chunks_exact(4) {
            let a = px[3] as u32;
            let r = px[0] as u32 * a / 255;
            let g = px[1] as u32 * a / 255;
            let b = px[2] as u32 * a / 255;
            out.push((r << 16) | (g << 8) | b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_rejects_wrong_length() {
        assert!(FrameBuffer::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(FrameBuffer::from_rgba(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn put_pixel_ignores_out_of_bounds() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.put_pixel(-1, 0, [1, 2, 3, 4]);
        fb.put_pixel(2, 1, [1, 2, 3, 4]);
        fb.put_pixel(1, 1, [9, 8, 7, 255]);
        assert_eq!(fb.pixel(1, 1), [9, 8, 7, 255]);
        assert_eq!(fb.pixels.iter().filter(|&&b| b != 0).count(), 4);
    }

    #[test]
    fn write_0rgb_flattens_alpha() {
        let mut fb = FrameBuffer::filled(1, 2, [255, 128, 0, 255]);
        fb.put_pixel(0, 1, [255, 255, 255, 0]);
        let mut out = Vec::new();
        fb.write_0rgb(&mut out);
        assert_eq!(out, vec![0x00FF_8000, 0]);
    }

    #[test]
    fn image_round_trip_keeps_dimensions() {
        let fb = FrameBuffer::filled(3, 5, [10, 20, 30, 40]);
        let img = fb.to_image().unwrap();
        assert_eq!(img.dimensions(), (3, 5));
        assert_eq!(FrameBuffer::from_image(img), fb);
    }
}
