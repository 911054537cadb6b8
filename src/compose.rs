// Strip and polaroid rendering.
//
// The strip stacks every photo of a session into one tall PNG: a pastel
// gradient, one 400x400 cell per photo clipped to the photo's shape and
// outlined in its frame color, and a caption along the bottom edge.
//
// Photos reach the composer through a PhotoDecoder, which hands back a
// future per photo. Nothing is drawn until every one of those futures has
// resolved; a single failure aborts the whole strip.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use image::ImageFormat;

use crate::error::{BoothError, BoothResult};
use crate::font::{self, TextStyle};
use crate::paint::Painter;
use crate::palette::{self, POLAROID_CAPTION, STRIP_CAPTION};
use crate::raster;
use crate::session::{MAX_PHOTOS, PhotoRecord};
use crate::shape::ClipPath;
use crate::types::FrameBuffer;

pub const CELL_SIZE: u32 = 400;
pub const SPACING: u32 = 20;
pub const PADDING: u32 = 30;
pub const BORDER_WIDTH: f64 = 8.0;

pub const STRIP_FILE_NAME: &str = "meggu-birthday-polaroid-strip.png";
pub const DEFAULT_CAPTION: &str = "Happy Birthday Meggu! \u{1F382}\u{1F496}";
pub const DEFAULT_POLAROID_CAPTION: &str = "Happy Birthday Meggu!";

// 28 px tall at most, so the caption stays inside the bottom padding.
const STRIP_CAPTION_MAX_SCALE: usize = 4;
const STRIP_CAPTION_MARGIN: usize = 8;

const POLAROID_MARGIN: usize = 40;
const POLAROID_BOTTOM: usize = 100;
const POLAROID_CAPTION_SCALE: usize = 5;

/// Geometry of a strip holding `count` photos.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripLayout {
    count: usize,
}

impl StripLayout {
    pub fn new(count: usize) -> BoothResult<Self> {
        if count == 0 {
            return Err(BoothError::EmptyComposition);
        }
        Ok(Self { count })
    }

    pub fn width(&self) -> usize {
        (CELL_SIZE + 2 * PADDING) as usize
    }

    /// `400N + 20(N-1) + 60`
    pub fn height(&self) -> usize {
        let n = self.count as u32;
        (CELL_SIZE * n + SPACING * (n - 1) + 2 * PADDING) as usize
    }

    /// Top-left corner of cell `i`.
    pub fn cell_origin(&self, i: usize) -> (i32, i32) {
        let y = PADDING + i as u32 * (CELL_SIZE + SPACING);
        (PADDING as i32, y as i32)
    }

    pub fn cell_center(&self, i: usize) -> (f64, f64) {
        let (x, y) = self.cell_origin(i);
        let half = CELL_SIZE as f64 / 2.0;
        (x as f64 + half, y as f64 + half)
    }
}

/// Turns a stored photo back into pixels, asynchronously.
pub trait PhotoDecoder {
    fn decode<'a>(&'a self, photo: &'a PhotoRecord) -> BoxFuture<'a, BoothResult<FrameBuffer>>;
}

/// Photos already held as pixels; resolves immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct InMemoryDecoder;

impl PhotoDecoder for InMemoryDecoder {
    fn decode<'a>(&'a self, photo: &'a PhotoRecord) -> BoxFuture<'a, BoothResult<FrameBuffer>> {
        async move {
            if photo.image.is_empty() {
                return Err(BoothError::decode("photo has no pixels"));
            }
            Ok(photo.image.clone())
        }
        .boxed()
    }
}

/// A finished image and the name it is saved under.
#[derive(Clone, Debug)]
pub struct ExportImage {
    pub image: FrameBuffer,
    pub file_name: String,
}

impl ExportImage {
    pub fn encode_png(&self) -> BoothResult<Vec<u8>> {
        let img = self.image.to_image()?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Write into `dir` under [`ExportImage::file_name`].
    pub fn save_png(&self, dir: &Path) -> BoothResult<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, self.encode_png()?)?;
        tracing::info!(path = %path.display(), "image saved");
        Ok(path)
    }
}

pub struct StripComposer<D> {
    decoder: D,
    caption: String,
}

impl<D: PhotoDecoder> StripComposer<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            caption: DEFAULT_CAPTION.to_owned(),
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Render the strip for `photos`, in the order given.
    #[tracing::instrument(skip_all, fields(photos = photos.len()))]
    pub async fn compose(&self, photos: &[PhotoRecord]) -> BoothResult<ExportImage> {
        let layout = StripLayout::new(photos.len())?;

        // Every decode has to land before anything is drawn.
        let decoded = try_join_all(photos.iter().map(|p| self.decoder.decode(p)))
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "strip aborted"))?;

        let (w, h) = (layout.width(), layout.height());
        let mut painter = Painter::new(w, h)?;
        painter.vertical_gradient(palette::STRIP_GRADIENT_TOP, palette::STRIP_GRADIENT_BOTTOM);

        // Session order; a heart reaching above its cell is drawn over the
        // cell before it.
        for (i, (photo, pixels)) in photos.iter().zip(&decoded).enumerate() {
            let (ox, oy) = layout.cell_origin(i);
            let (cx, cy) = layout.cell_center(i);
            let clip = ClipPath::for_strip(photo.shape, cx, cy, CELL_SIZE as f64);

            let cell = raster::cover_resize(pixels, CELL_SIZE, CELL_SIZE)?;
            painter.draw_image(&cell, ox as f64, oy as f64, Some(clip.path()))?;
            painter.stroke(clip.path(), BORDER_WIDTH, photo.frame.rgb());
        }
        let mut canvas = painter.render()?;

        let [r, g, b] = STRIP_CAPTION;
        let scale = strip_caption_scale(&self.caption, w);
        let text_h = (font::GLYPH_HEIGHT * scale) as i32;
        font::draw_text_centered(
            &mut canvas,
            (w / 2) as i32,
            h as i32 - (PADDING as i32 - text_h) / 2,
            &self.caption,
            &TextStyle::new(scale, [r, g, b, 255]),
        );

        tracing::info!(width = w, height = h, "strip composed");
        Ok(ExportImage {
            image: canvas,
            file_name: STRIP_FILE_NAME.to_owned(),
        })
    }

    /// The strip followed by one polaroid per photo, for "save all".
    pub async fn export_all(
        &self,
        photos: &[PhotoRecord],
        polaroid_caption: &str,
    ) -> BoothResult<Vec<ExportImage>> {
        let mut out = Vec::with_capacity(photos.len() + 1);
        out.push(self.compose(photos).await?);
        for (i, photo) in photos.iter().enumerate() {
            out.push(render_polaroid(photo, i + 1, polaroid_caption)?);
        }
        Ok(out)
    }
}

/// Largest caption scale that fits the strip width and its bottom padding.
fn strip_caption_scale(caption: &str, strip_width: usize) -> usize {
    let room = strip_width.saturating_sub(2 * STRIP_CAPTION_MARGIN);
    font::fit_scale(caption, room, STRIP_CAPTION_MAX_SCALE)
}

/// Single photo on a frame-colored card with a caption under it.
pub fn render_polaroid(photo: &PhotoRecord, number: usize, caption: &str) -> BoothResult<ExportImage> {
    if photo.image.is_empty() {
        return Err(BoothError::decode("photo has no pixels"));
    }
    let (pw, ph) = (photo.image.width, photo.image.height);
    let (w, h) = (pw + 2 * POLAROID_MARGIN, ph + POLAROID_MARGIN + POLAROID_BOTTOM);

    let [r, g, b] = photo.frame.rgb();
    let mut painter = Painter::new(w, h)?;
    painter.fill_rect(0.0, 0.0, w as f64, h as f64, [r, g, b, 255]);
    let m = POLAROID_MARGIN as f64;
    painter.draw_image(&photo.image, m, m, None)?;
    let mut card = painter.render()?;

    let text = format!("Photo {number}/{MAX_PHOTOS} - {caption}");
    let [r, g, b] = POLAROID_CAPTION;
    let scale = font::fit_scale(&text, w.saturating_sub(2 * POLAROID_MARGIN), POLAROID_CAPTION_SCALE);
    font::draw_text_centered(
        &mut card,
        (w / 2) as i32,
        (ph + POLAROID_BOTTOM) as i32,
        &text,
        &TextStyle::new(scale, [r, g, b, 255]),
    );

    Ok(ExportImage {
        image: card,
        file_name: photo.file_name(number),
    })
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::filter::FilterId;
    use crate::palette::FrameColor;
    use crate::shape::ShapeId;

    fn photo(shape: ShapeId, frame: FrameColor, rgba: [u8; 4]) -> PhotoRecord {
        PhotoRecord {
            image: FrameBuffer::filled(64, 48, rgba),
            frame,
            shape,
            filter: FilterId::None,
            captured_at_ms: 7,
        }
    }

    #[test]
    fn layout_matches_cell_arithmetic() {
        assert!(matches!(StripLayout::new(0), Err(BoothError::EmptyComposition)));
        let one = StripLayout::new(1).unwrap();
        assert_eq!((one.width(), one.height()), (460, 460));
        let three = StripLayout::new(3).unwrap();
        assert_eq!(three.height(), 1300);
        assert_eq!(three.cell_origin(2), (30, 870));
        assert_eq!(three.cell_center(1), (230.0, 650.0));
    }

    #[test]
    fn square_cell_is_photo_then_border() {
        let composer = StripComposer::new(InMemoryDecoder);
        let photos = [photo(ShapeId::Square, FrameColor::StrawberryRed, [0, 0, 255, 255])];
        let strip = block_on(composer.compose(&photos)).unwrap();
        assert_eq!(strip.file_name, STRIP_FILE_NAME);
        assert_eq!((strip.image.width, strip.image.height), (460, 460));

        assert_eq!(strip.image.pixel(230, 230), [0, 0, 255, 255]);
        // border straddles the cell edge at x = 30
        assert_eq!(strip.image.pixel(30, 230), [0xff, 0x47, 0x57, 255]);
        // background gradient outside the border
        let bg = strip.image.pixel(5, 5);
        for (got, want) in bg.iter().zip(palette::STRIP_GRADIENT_TOP) {
            assert!(got.abs_diff(want) <= 3, "{bg:?}");
        }
        assert_eq!(bg[3], 255);
    }

    #[test]
    fn heart_cell_is_clipped_below_its_tip() {
        let composer = StripComposer::new(InMemoryDecoder);
        let photos = [photo(ShapeId::Heart, FrameColor::PastelMint, [0, 0, 0, 255])];
        let strip = block_on(composer.compose(&photos)).unwrap();
        // lobes are photo, the tip ends at y = 380, below it is background
        assert_eq!(strip.image.pixel(230, 150), [0, 0, 0, 255]);
        let below = strip.image.pixel(230, 410);
        assert!(below[0] > 200, "{below:?}");
        // the border follows the outline down to the tip
        let tip = strip.image.pixel(230, 377);
        assert!(tip[0] < 0xd0 && tip[1] > 0xe0, "{tip:?}");
    }

    #[test]
    fn circle_corners_show_background() {
        let composer = StripComposer::new(InMemoryDecoder);
        let photos = [photo(ShapeId::Circle, FrameColor::PastelBlue, [0, 0, 0, 255])];
        let strip = block_on(composer.compose(&photos)).unwrap();
        // cell corner lies outside the inscribed circle
        let corner = strip.image.pixel(40, 40);
        assert!(corner[0] > 240, "{corner:?}");
        assert_eq!(strip.image.pixel(230, 230), [0, 0, 0, 255]);
    }

    #[test]
    fn caption_is_drawn_near_the_bottom() {
        let composer = StripComposer::new(InMemoryDecoder).with_caption("HI");
        let photos = [photo(ShapeId::Square, FrameColor::PastelPink, [0, 0, 0, 255])];
        let strip = block_on(composer.compose(&photos)).unwrap();
        let [r, g, b] = STRIP_CAPTION;
        let h = strip.image.height;
        let found = (h - PADDING as usize..h)
            .any(|y| (200..260).any(|x| strip.image.pixel(x, y) == [r, g, b, 255]));
        assert!(found);
        // nothing in caption color above the padding
        let above = (h - 60..h - 34).any(|y| (0..460).any(|x| strip.image.pixel(x, y) == [r, g, b, 255]));
        assert!(!above);
    }

    #[test]
    fn caption_uses_the_largest_scale_that_fits() {
        assert_eq!(strip_caption_scale("HI", 460), 4);
        // 24 glyphs: 429 px wide at scale 3, 21 px tall
        assert_eq!(strip_caption_scale(DEFAULT_CAPTION, 460), 3);
        assert!(DEFAULT_CAPTION.ends_with("\u{1F382}\u{1F496}"));
    }

    #[test]
    fn failing_decode_aborts_the_strip() {
        let composer = StripComposer::new(InMemoryDecoder);
        let mut broken = photo(ShapeId::Heart, FrameColor::PastelMint, [1, 1, 1, 255]);
        broken.image = FrameBuffer::new(0, 0);
        let photos = [photo(ShapeId::Square, FrameColor::PastelMint, [1, 1, 1, 255]), broken];
        assert!(matches!(block_on(composer.compose(&photos)), Err(BoothError::Decode(_))));
    }

    #[test]
    fn polaroid_card_dimensions_and_frame() {
        let p = photo(ShapeId::Square, FrameColor::PastelPeach, [10, 20, 30, 255]);
        let card = render_polaroid(&p, 2, DEFAULT_POLAROID_CAPTION).unwrap();
        assert_eq!((card.image.width, card.image.height), (144, 188));
        assert_eq!(card.image.pixel(0, 0), [0xff, 0xda, 0xb9, 255]);
        assert_eq!(card.image.pixel(40, 40), [10, 20, 30, 255]);
        assert_eq!(card.file_name, "meggu-birthday-photo-2-7.png");
    }

    #[test]
    fn transparent_photo_pixels_show_the_card() {
        let p = photo(ShapeId::Circle, FrameColor::PastelPurple, [0, 0, 0, 0]);
        let card = render_polaroid(&p, 1, "x").unwrap();
        assert_eq!(card.image.pixel(50, 50), [0xdd, 0xa0, 0xdd, 255]);
    }

    #[test]
    fn export_all_is_strip_then_polaroids() {
        let composer = StripComposer::new(InMemoryDecoder);
        let photos = [
            photo(ShapeId::Square, FrameColor::PastelPink, [9, 9, 9, 255]),
            photo(ShapeId::Heart, FrameColor::PastelBlue, [9, 9, 9, 255]),
        ];
        let all = block_on(composer.export_all(&photos, DEFAULT_POLAROID_CAPTION)).unwrap();
        let names: Vec<_> = all.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(
            names,
            [STRIP_FILE_NAME, "meggu-birthday-photo-1-7.png", "meggu-birthday-photo-2-7.png"]
        );
    }

    #[test]
    fn png_encoding_has_signature() {
        let p = photo(ShapeId::Square, FrameColor::PastelPink, [9, 9, 9, 255]);
        let bytes = render_polaroid(&p, 1, "x").unwrap().encode_png().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
