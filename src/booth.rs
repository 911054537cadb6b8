// Booth state machine: camera lifecycle, countdown, capture, reset.
//
// Nothing in here draws or opens a device by itself. The window loop feeds
// it `Instant`s and key presses, reads `state()` back, and renders whatever
// that says. Any `FrameSource` can stand in for the camera.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::error::{BoothError, BoothResult};
use crate::filter::FilterId;
use crate::palette::FrameColor;
use crate::session::{self, CaptureSession, Countdown, CountdownPhase, PhotoRecord, Selection};
use crate::shape::ShapeId;
use crate::types::FrameBuffer;

/// Something that produces camera frames.
pub trait FrameSource {
    /// Acquire the device. Calling it while running is a no-op.
    fn start(&mut self) -> BoothResult<()>;
    /// Release the device. Safe to call when already stopped.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Grab the most recent frame.
    fn grab(&mut self) -> BoothResult<FrameBuffer>;
}

/// What the UI should show. Derived from the session and countdown, never
/// stored separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoothState {
    AwaitingCapture,
    Counting,
    Full,
}

/// A photo was just added to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// 1-based slot of the new photo.
    pub index: usize,
    /// The session reached its limit and the camera was stopped.
    pub full: bool,
}

pub struct BoothController<S: FrameSource> {
    source: S,
    session: CaptureSession,
    selection: Selection,
    countdown_started: Option<Instant>,
}

impl<S: FrameSource> BoothController<S> {
    pub fn new(source: S, selection: Selection) -> Self {
        Self {
            source,
            session: CaptureSession::new(),
            selection,
            countdown_started: None,
        }
    }

    /// Acquire the camera. A failure is reported but leaves the booth usable.
    pub fn open(&mut self) -> BoothResult<()> {
        self.start_source()
    }

    pub fn state(&self) -> BoothState {
        if self.session.is_full() {
            BoothState::Full
        } else if self.countdown_started.is_some() {
            BoothState::Counting
        } else {
            BoothState::AwaitingCapture
        }
    }

    /// Begin the countdown for the next photo.
    pub fn request_capture(&mut self, now: Instant) -> BoothResult<()> {
        match self.state() {
            BoothState::Full => Err(BoothError::CaptureLimitExceeded {
                max: session::MAX_PHOTOS,
            }),
            BoothState::Counting => Err(BoothError::CaptureInProgress),
            BoothState::AwaitingCapture => {
                tracing::debug!(slot = self.session.len() + 1, "countdown started");
                self.countdown_started = Some(now);
                Ok(())
            }
        }
    }

    /// Current overlay phase, if counting.
    pub fn countdown_phase(&self, now: Instant) -> Option<CountdownPhase> {
        self.countdown_started
            .map(|start| Countdown::phase_at(now.saturating_duration_since(start)))
    }

    /// Time left before the snap, if counting.
    pub fn countdown_remaining(&self, now: Instant) -> Option<Duration> {
        self.countdown_started
            .map(|start| Countdown::TOTAL.saturating_sub(now.saturating_duration_since(start)))
    }

    /// Advance time. Takes the photo once the countdown has run out.
    ///
    /// A failed grab ends the countdown without a photo; the booth goes back
    /// to awaiting capture and the error is returned for display.
    pub fn tick(&mut self, now: Instant) -> BoothResult<Option<CaptureOutcome>> {
        let Some(start) = self.countdown_started else {
            return Ok(None);
        };
        if !Countdown::is_done(now.saturating_duration_since(start)) {
            return Ok(None);
        }
        self.countdown_started = None;
        self.snap().map(Some)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn snap(&mut self) -> BoothResult<CaptureOutcome> {
        let raw = self.source.grab().inspect_err(|err| {
            tracing::warn!(error = %err, "frame grab failed, capture cancelled");
        })?;
        let photo = session::develop(&raw, &self.selection, timestamp_ms())?;
        let index = self.session.push(photo)?;
        let full = self.session.is_full();
        tracing::info!(
            index,
            frame = %self.selection.frame,
            shape = %self.selection.shape,
            filter = %self.selection.filter,
            "photo captured"
        );
        if full {
            self.source.stop();
            tracing::info!("session full, camera stopped");
        }
        Ok(CaptureOutcome { index, full })
    }

    /// Drop every photo and bring the camera back.
    ///
    /// Capture is re-armed even when the camera cannot be restarted; the
    /// error is returned so the UI can say so.
    pub fn reset(&mut self) -> BoothResult<()> {
        self.countdown_started = None;
        self.session.clear();
        tracing::info!("session reset");
        self.start_source()
    }

    /// Release the camera and forget the photos.
    pub fn close(&mut self) {
        self.countdown_started = None;
        self.source.stop();
        self.session.clear();
        tracing::info!("booth closed");
    }

    fn start_source(&mut self) -> BoothResult<()> {
        if self.source.is_running() {
            return Ok(());
        }
        match self.source.start() {
            Ok(()) => {
                tracing::info!("camera started");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "camera unavailable");
                Err(err)
            }
        }
    }

    /// Latest live frame, unfiltered.
    pub fn preview_frame(&mut self) -> BoothResult<FrameBuffer> {
        if !self.source.is_running() {
            return Err(BoothError::device("camera is not running"));
        }
        self.source.grab()
    }

    /// Photos for the strip, in capture order.
    pub fn strip_photos(&self) -> BoothResult<&[PhotoRecord]> {
        if self.session.is_empty() {
            return Err(BoothError::EmptyComposition);
        }
        Ok(self.session.photos())
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn select_frame(&mut self, frame: FrameColor) {
        self.selection.frame = frame;
    }

    pub fn select_shape(&mut self, shape: ShapeId) {
        self.selection.shape = shape;
    }

    pub fn select_filter(&mut self, filter: FilterId) {
        self.selection.filter = filter;
    }

    pub fn cycle_frame(&mut self, forward: bool) -> FrameColor {
        let f = self.selection.frame;
        self.selection.frame = if forward { f.next() } else { f.prev() };
        self.selection.frame
    }

    pub fn cycle_shape(&mut self, forward: bool) -> ShapeId {
        let s = self.selection.shape;
        self.selection.shape = if forward { s.next() } else { s.prev() };
        self.selection.shape
    }

    pub fn cycle_filter(&mut self, forward: bool) -> FilterId {
        let f = self.selection.filter;
        self.selection.filter = if forward { f.next() } else { f.prev() };
        self.selection.filter
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
