// Captured photos and the countdown schedule.

use std::time::Duration;

use crate::error::{BoothError, BoothResult};
use crate::filter::{self, FilterId};
use crate::paint::Painter;
use crate::palette::FrameColor;
use crate::shape::{ClipPath, ShapeId};
use crate::types::FrameBuffer;

/// A session never holds more than this many photos.
pub const MAX_PHOTOS: usize = 3;

/// Share of the shorter frame side covered by the capture clip.
const CAPTURE_CLIP_RATIO: f64 = 0.9;

/// The current frame/shape/filter choice applied to the next capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Selection {
    pub frame: FrameColor,
    pub shape: ShapeId,
    pub filter: FilterId,
}

/// One developed snapshot. Immutable once captured.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoRecord {
    pub image: FrameBuffer,
    pub frame: FrameColor,
    pub shape: ShapeId,
    pub filter: FilterId,
    pub captured_at_ms: u64,
}

impl PhotoRecord {
    /// File name for the polaroid export of the photo in 1-based slot `index`.
    pub fn file_name(&self, index: usize) -> String {
        format!("meggu-birthday-photo-{index}-{}.png", self.captured_at_ms)
    }
}

/// Turn a raw camera frame into a photo: run the selected filter, then clip
/// it to the selected shape centered on the frame. Outside the shape the
/// photo is transparent; the edge is anti-aliased.
#[tracing::instrument(level = "debug", skip(raw), fields(width = raw.width, height = raw.height))]
pub fn develop(raw: &FrameBuffer, selection: &Selection, captured_at_ms: u64) -> BoothResult<PhotoRecord> {
    let mut filtered = raw.clone();
    filter::apply(&mut filtered, selection.filter);

    let (w, h) = (filtered.width, filtered.height);
    let size = CAPTURE_CLIP_RATIO * w.min(h) as f64;
    let clip = ClipPath::for_capture(selection.shape, w as f64 / 2.0, h as f64 / 2.0, size);
    let mut painter = Painter::new(w, h)?;
    painter.draw_image(&filtered, 0.0, 0.0, Some(clip.path()))?;

    Ok(PhotoRecord {
        image: painter.render()?,
        frame: selection.frame,
        shape: selection.shape,
        filter: selection.filter,
        captured_at_ms,
    })
}

/// Ordered photos of one booth session, at most [`MAX_PHOTOS`].
#[derive(Debug, Default)]
pub struct CaptureSession {
    photos: Vec<PhotoRecord>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            photos: Vec::with_capacity(MAX_PHOTOS),
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.photos.len() >= MAX_PHOTOS
    }

    pub fn remaining(&self) -> usize {
        MAX_PHOTOS.saturating_sub(self.photos.len())
    }

    /// Photos in capture order.
    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    /// Append a photo; returns its 1-based slot.
    pub fn push(&mut self, photo: PhotoRecord) -> BoothResult<usize> {
        if self.is_full() {
            return Err(BoothError::CaptureLimitExceeded { max: MAX_PHOTOS });
        }
        self.photos.push(photo);
        Ok(self.photos.len())
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }
}

/// What the countdown overlay shows at a given moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownPhase {
    Digit(u8),
    /// Blank pause between digits.
    Gap,
    Smile,
    /// Time to take the photo.
    Done,
}

const DIGIT_MS: u64 = 1000;
const GAP_MS: u64 = 200;
const SMILE_MS: u64 = 500;

/// 3, 2, 1, smile. Visual only; pixels are unaffected.
#[derive(Clone, Copy, Debug, Default)]
pub struct Countdown;

impl Countdown {
    pub const TOTAL: Duration = Duration::from_millis(3 * DIGIT_MS + 2 * GAP_MS + SMILE_MS);

    pub fn phase_at(elapsed: Duration) -> CountdownPhase {
        let mut t = elapsed.as_millis() as u64;
        for digit in [3u8, 2, 1] {
            if t < DIGIT_MS {
                return CountdownPhase::Digit(digit);
            }
            t -= DIGIT_MS;
            if digit == 1 {
                break;
            }
            if t < GAP_MS {
                return CountdownPhase::Gap;
            }
            t -= GAP_MS;
        }
        if t < SMILE_MS {
            CountdownPhase::Smile
        } else {
            CountdownPhase::Done
        }
    }

    pub fn is_done(elapsed: Duration) -> bool {
        elapsed >= Self::TOTAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: u64) -> PhotoRecord {
        PhotoRecord {
            image: FrameBuffer::filled(2, 2, [1, 2, 3, 255]),
            frame: FrameColor::default(),
            shape: ShapeId::Square,
            filter: FilterId::None,
            captured_at_ms: ts,
        }
    }

    #[test]
    fn session_rejects_a_fourth_photo() {
        let mut session = CaptureSession::new();
        for i in 1..=3 {
            assert_eq!(session.push(record(i)).unwrap(), i as usize);
        }
        assert!(session.is_full());
        assert_eq!(session.remaining(), 0);
        let err = session.push(record(4)).unwrap_err();
        assert!(matches!(err, BoothError::CaptureLimitExceeded { max: 3 }));
        assert_eq!(session.len(), 3);
        assert_eq!(session.photos()[2].captured_at_ms, 3);

        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.remaining(), 3);
    }

    #[test]
    fn polaroid_file_name_has_slot_and_timestamp() {
        assert_eq!(record(1712).file_name(2), "meggu-birthday-photo-2-1712.png");
    }

    #[test]
    fn countdown_schedule() {
        let at = |ms| Countdown::phase_at(Duration::from_millis(ms));
        assert_eq!(at(0), CountdownPhase::Digit(3));
        assert_eq!(at(999), CountdownPhase::Digit(3));
        assert_eq!(at(1100), CountdownPhase::Gap);
        assert_eq!(at(1300), CountdownPhase::Digit(2));
        assert_eq!(at(2500), CountdownPhase::Digit(1));
        assert_eq!(at(3500), CountdownPhase::Smile);
        assert_eq!(at(3900), CountdownPhase::Done);
        assert_eq!(Countdown::TOTAL, Duration::from_millis(3900));
        assert!(!Countdown::is_done(Duration::from_millis(3899)));
    }

    #[test]
    fn develop_clips_corners_and_keeps_center() {
        let raw = FrameBuffer::filled(100, 60, [200, 100, 50, 255]);
        let sel = Selection {
            frame: FrameColor::PastelMint,
            shape: ShapeId::Circle,
            filter: FilterId::Bw,
        };
        let photo = develop(&raw, &sel, 42).unwrap();
        assert_eq!(photo.frame, FrameColor::PastelMint);
        assert_eq!(photo.captured_at_ms, 42);
        let center = photo.image.pixel(50, 30);
        assert_eq!(center[3], 255);
        assert_eq!(center[0], center[1]);
        assert_eq!(photo.image.pixel(0, 0)[3], 0);
        assert_eq!(photo.image.pixel(99, 59)[3], 0);
        // circle diameter is 54 on a 60 px tall frame
        assert_eq!(photo.image.pixel(50, 1)[3], 0);
    }

    #[test]
    fn square_capture_leaves_a_margin() {
        let raw = FrameBuffer::filled(100, 100, [9, 9, 9, 255]);
        let photo = develop(&raw, &Selection::default(), 0).unwrap();
        assert_eq!(photo.image.pixel(2, 50)[3], 0);
        assert_eq!(photo.image.pixel(10, 50)[3], 255);
    }
}
