// Pixel-level helpers that stay off the vector path: cover/fit resampling
// and the box blur behind the live preview.

use image::imageops::{self, FilterType};

use crate::error::{BoothError, BoothResult};
use crate::types::FrameBuffer;

/// Scale `src` uniformly so it fully covers `w` x `h`, centered, cropping
/// whatever overflows. No distortion.
pub fn cover_resize(src: &FrameBuffer, w: u32, h: u32) -> BoothResult<FrameBuffer> {
    if src.is_empty() {
        return Err(BoothError::decode("cannot scale an empty image"));
    }
    let (sw, sh) = (src.width as f64, src.height as f64);
    let scale = (w as f64 / sw).max(h as f64 / sh);
    let scaled_w = ((sw * scale).round() as u32).max(w);
    let scaled_h = ((sh * scale).round() as u32).max(h);

    let img = src.to_image()?;
    let scaled = imageops::resize(&img, scaled_w, scaled_h, FilterType::Triangle);
    let x = (scaled_w - w) / 2;
    let y = (scaled_h - h) / 2;
    let cropped = imageops::crop_imm(&scaled, x, y, w, h).to_image();
    Ok(FrameBuffer::from_image(cropped))
}

/// Scale `src` uniformly to fit inside `max_w` x `max_h` (letterboxed by the
/// caller). Nearest-neighbour; used for on-screen previews only.
pub fn fit_nearest(src: &FrameBuffer, max_w: u32, max_h: u32) -> BoothResult<FrameBuffer> {
    if src.is_empty() {
        return Err(BoothError::decode("cannot scale an empty image"));
    }
    let scale = (max_w as f64 / src.width as f64).min(max_h as f64 / src.height as f64);
    let w = ((src.width as f64 * scale).round() as u32).max(1);
    let h = ((src.height as f64 * scale).round() as u32).max(1);
    let img = src.to_image()?;
    Ok(FrameBuffer::from_image(imageops::resize(
        &img,
        w,
        h,
        FilterType::Nearest,
    )))
}

/// Two-pass sliding-window box blur over RGBA. `tmp` and `dst` must match
/// `src` in size; edges are extended so borders do not darken.
pub fn box_blur_rgba(
    src: &FrameBuffer,
    tmp: &mut FrameBuffer,
    dst: &mut FrameBuffer,
    radius: usize,
) -> BoothResult<()> {
    if src.width != dst.width || src.height != dst.height {
        return Err(BoothError::validation("box_blur: size mismatch src/dst"));
    }
    if tmp.width != src.width || tmp.height != src.height {
        return Err(BoothError::validation("box_blur: size mismatch tmp"));
    }
    if src.is_empty() {
        return Ok(());
    }
    let (w, h) = (src.width, src.height);

    // Pass 1: rows, src -> tmp
    for y in 0..h {
        blur_line(&src.pixels, &mut tmp.pixels, y * w, 1, w, radius);
    }
    // Pass 2: columns, tmp -> dst
    for x in 0..w {
        blur_line(&tmp.pixels, &mut dst.pixels, x, w, h, radius);
    }
    Ok(())
}

/// Blur one line of `len` pixels starting at pixel `start`, `stride` pixels
/// apart.
fn blur_line(src: &[u8], dst: &mut [u8], start: usize, stride: usize, len: usize, radius: usize) {
    let r = radius as i64;
    let win = (2 * radius + 1) as u32;
    let last = len as i64 - 1;
    let at = |i: i64| (start + i.clamp(0, last) as usize * stride) * 4;

    // Window [-r, r] around 0 with the edge pixel repeated.
    let mut sum = [0u32; 4];
    for i in -r..=r {
        let p = at(i);
        for c in 0..4 {
            sum[c] += src[p + c] as u32;
        }
    }

    for i in 0..len as i64 {
        let out = at(i);
        for c in 0..4 {
            dst[out + c] = (sum[c] / win) as u8;
        }
        let sub = at(i - r);
        let add = at(i + r + 1);
        for c in 0..4 {
            sum[c] = sum[c] + src[add + c] as u32 - src[sub + c] as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_resize_fills_target_without_distortion() {
        // 4:1 source into a square: scale by height, crop the sides
        let mut src = FrameBuffer::filled(40, 10, [0, 0, 255, 255]);
        src.fill_rect(15, 0, 10, 10, [255, 0, 0, 255]);
        let out = cover_resize(&src, 20, 20).unwrap();
        assert_eq!((out.width, out.height), (20, 20));
        let center = out.pixel(10, 10);
        assert!(center[0] > 250 && center[2] < 5, "{center:?}");
    }

    #[test]
    fn fit_nearest_keeps_aspect() {
        let src = FrameBuffer::filled(200, 100, [1, 2, 3, 255]);
        let out = fit_nearest(&src, 50, 50).unwrap();
        assert_eq!((out.width, out.height), (50, 25));
    }

    #[test]
    fn box_blur_preserves_flat_images() {
        let src = FrameBuffer::filled(7, 5, [90, 40, 10, 255]);
        let mut tmp = FrameBuffer::new(7, 5);
        let mut dst = FrameBuffer::new(7, 5);
        box_blur_rgba(&src, &mut tmp, &mut dst, 2).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn box_blur_spreads_a_dot() {
        let mut src = FrameBuffer::filled(5, 5, [0, 0, 0, 255]);
        src.put_pixel(2, 2, [255, 255, 255, 255]);
        let mut tmp = FrameBuffer::new(5, 5);
        let mut dst = FrameBuffer::new(5, 5);
        box_blur_rgba(&src, &mut tmp, &mut dst, 1).unwrap();
        assert!(dst.pixel(1, 1)[0] > 0);
        assert!(dst.pixel(2, 2)[0] < 255);
        assert_eq!(dst.pixel(0, 0)[0], 0);
    }
}
