// Interactive booth: live camera on the left, polaroid slots on the right,
// keyboard controls along the bottom. Once three photos are taken the camera
// is released and the finished strip takes over the left side.
//
// Everything is software-drawn into one RGBA canvas per frame and pushed to
// the window. Errors never end the loop; they become toasts.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::executor::block_on;

use crate::booth::{BoothController, BoothState, CaptureOutcome};
use crate::camera::CameraCapture;
use crate::compose::{InMemoryDecoder, StripComposer};
use crate::config::BoothConfig;
use crate::error::{BoothError, BoothResult};
use crate::font::{self, TextStyle};
use crate::fx::Sparkles;
use crate::paint::Painter;
use crate::palette;
use crate::preview::LivePreview;
use crate::raster;
use crate::session::{Countdown, CountdownPhase, MAX_PHOTOS};
use crate::shape::ClipPath;
use crate::types::FrameBuffer;
use crate::window::{BoothKey, BoothWindow};

const WIDTH: usize = 1000;
const HEIGHT: usize = 720;

const LIVE_X: i32 = 20;
const LIVE_Y: i32 = 70;
const LIVE_W: u32 = 640;
const LIVE_H: u32 = 480;
// Taller area used by the strip once the session is full.
const STRIP_AREA_H: u32 = 630;

const SLOT_X: i32 = 680;
const SLOT_Y: i32 = 70;
const SLOT_W: usize = 300;
const SLOT_H: usize = 180;
const SLOT_GAP: i32 = 10;

const TOAST_TIME: Duration = Duration::from_secs(2);
const OUTLINE_WIDTH: f64 = 3.0;
const SLOT_CAPTION: &str = "Happy Birthday Meggu! \u{1F496}";

const WHITE: [u8; 4] = [255, 255, 255, 255];
const INK: [u8; 4] = [90, 60, 80, 255];
const SHADOW: [u8; 4] = [0, 0, 0, 160];

struct Toast {
    text: String,
    until: Instant,
}

pub struct BoothApp {
    window: BoothWindow,
    booth: BoothController<CameraCapture>,
    composer: StripComposer<InMemoryDecoder>,
    preview: LivePreview,
    sparkles: Sparkles,
    canvas: FrameBuffer,
    toast: Option<Toast>,
    painter: Painter,
    strip_view: Option<FrameBuffer>,
    output_dir: PathBuf,
    polaroid_caption: String,
}

/// Open the window and run until it is closed.
pub fn run(cfg: &BoothConfig) -> BoothResult<()> {
    let mut app = BoothApp::new(cfg)?;
    app.run()
}

impl BoothApp {
    pub fn new(cfg: &BoothConfig) -> BoothResult<Self> {
        let window = BoothWindow::new("Photo Booth", WIDTH, HEIGHT)?;
        let booth = BoothController::new(CameraCapture::from_config(cfg), cfg.selection());
        let mut app = Self {
            window,
            booth,
            composer: StripComposer::new(InMemoryDecoder).with_caption(cfg.caption.clone()),
            preview: LivePreview::new(),
            sparkles: Sparkles::new(400),
            canvas: FrameBuffer::new(WIDTH, HEIGHT),
            toast: None,
            painter: Painter::new(WIDTH, HEIGHT)?,
            strip_view: None,
            output_dir: cfg.output_dir.clone(),
            polaroid_caption: cfg.polaroid_caption.clone(),
        };
        if let Err(e) = app.booth.open() {
            app.notify(format!("Camera access denied or unavailable ({e})"));
        }
        Ok(app)
    }

    pub fn run(&mut self) -> BoothResult<()> {
        let mut last_frame = Instant::now();
        let mut last_fps = Instant::now();
        let mut frames = 0u32;

        while self.window.is_open() {
            let now = Instant::now();
            let dt = (now - last_frame).as_secs_f32();
            last_frame = now;

            // 1) Keys. Close ends the loop right away.
            if !self.handle_keys(now) {
                break;
            }

            // 2) Countdown finished? Take the photo.
            match self.booth.tick(now) {
                Ok(Some(outcome)) => self.on_captured(outcome),
                Ok(None) => {}
                Err(e) => self.notify(e.to_string()),
            }

            // 3) Draw the frame and show it.
            self.render(now, dt);
            self.window.present(&self.canvas)?;

            frames += 1;
            if now.duration_since(last_fps) >= Duration::from_secs(1) {
                let fps = frames as f32 / now.duration_since(last_fps).as_secs_f32();
                tracing::debug!(fps = format_args!("{fps:.1}"), "render rate");
                frames = 0;
                last_fps = now;
            }
        }

        self.booth.close();
        Ok(())
    }

    fn handle_keys(&mut self, now: Instant) -> bool {
        let forward = !self.window.shift_down();
        for key in self.window.pressed() {
            match key {
                BoothKey::Close => {
                    self.booth.close();
                    return false;
                }
                BoothKey::Capture => {
                    if let Err(e) = self.booth.request_capture(now) {
                        self.notify(e.to_string());
                    }
                }
                BoothKey::Frame => {
                    let f = self.booth.cycle_frame(forward);
                    self.notify(format!("Frame: {f}"));
                }
                BoothKey::Shape => {
                    let s = self.booth.cycle_shape(forward);
                    self.notify(format!("Shape: {s}"));
                }
                BoothKey::Filter => {
                    let f = self.booth.cycle_filter(forward);
                    self.notify(format!("Filter: {f}"));
                }
                BoothKey::SaveStrip => {
                    let saved = self.save_strip();
                    self.report_save(saved);
                }
                BoothKey::SaveAll => {
                    let saved = self.save_all();
                    self.report_save(saved);
                }
                BoothKey::Reset => {
                    self.strip_view = None;
                    match self.booth.reset() {
                        Ok(()) => self.notify("Ready for new photos!"),
                        Err(e) => self.notify(format!("Camera access denied or unavailable ({e})")),
                    }
                }
            }
        }
        true
    }

    fn on_captured(&mut self, outcome: CaptureOutcome) {
        self.sparkles.burst(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, 15);
        if outcome.full {
            match self.build_strip_view() {
                Ok(view) => {
                    self.strip_view = Some(view);
                    self.notify("All 3 photos taken! S saves the strip");
                }
                Err(e) => self.notify(format!("Could not build the strip ({e})")),
            }
        } else {
            self.notify(format!("Photo {}/{MAX_PHOTOS}", outcome.index));
        }
    }

    fn build_strip_view(&self) -> BoothResult<FrameBuffer> {
        let photos = self.booth.strip_photos()?;
        let strip = block_on(self.composer.compose(photos))?;
        raster::fit_nearest(&strip.image, LIVE_W, STRIP_AREA_H)
    }

    fn save_strip(&self) -> BoothResult<usize> {
        let photos = self.booth.strip_photos()?;
        let strip = block_on(self.composer.compose(photos))?;
        strip.save_png(&self.output_dir)?;
        Ok(1)
    }

    fn save_all(&self) -> BoothResult<usize> {
        let photos = self.booth.strip_photos()?;
        let images = block_on(self.composer.export_all(photos, &self.polaroid_caption))?;
        for img in &images {
            img.save_png(&self.output_dir)?;
        }
        Ok(images.len())
    }

    fn report_save(&mut self, saved: BoothResult<usize>) {
        match saved {
            Ok(n) => {
                self.sparkles.burst(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, 15);
                self.notify(format!("Saved {n} image(s) to {}", self.output_dir.display()));
            }
            Err(BoothError::EmptyComposition) => self.notify("Take at least one photo first!"),
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.notify(format!("Save failed ({e})"));
            }
        }
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast {
            text: text.into(),
            until: Instant::now() + TOAST_TIME,
        });
    }

    /* ------------------------------ Drawing ------------------------------ */

    // Two passes per frame: shapes and images through the painter, then the
    // bitmap text and sparkles straight into the canvas.
    fn render(&mut self, now: Instant, dt: f32) {
        self.painter.reset();
        self.painter
            .vertical_gradient(palette::STRIP_GRADIENT_TOP, palette::STRIP_GRADIENT_BOTTOM);

        let state = self.booth.state();
        let live = match state {
            BoothState::Full => {
                self.paint_strip_view();
                true
            }
            _ => {
                let live = self.paint_live();
                if state == BoothState::Counting {
                    self.paint_countdown_bar(now);
                }
                self.paint_slots();
                self.paint_hud();
                live
            }
        };
        let toast = self.paint_toast(now);

        if let Err(e) = self.painter.render_into(&mut self.canvas) {
            tracing::warn!(error = %e, "frame render failed");
            return;
        }

        let title = TextStyle::new(3, rgba(palette::STRIP_CAPTION)).with_shadow(WHITE);
        font::draw_text_centered(&mut self.canvas, WIDTH as i32 / 2, 45, "PHOTO BOOTH \u{1F382}", &title);
        if state == BoothState::Full {
            self.label_full_help();
        } else {
            if !live {
                let style = TextStyle::new(3, WHITE);
                let cx = LIVE_X + LIVE_W as i32 / 2;
                font::draw_text_centered(&mut self.canvas, cx, LIVE_Y + 250, "NO CAMERA", &style);
            }
            if state == BoothState::Counting {
                self.label_countdown(now);
            }
            self.label_slots();
            self.label_hud();
        }

        self.sparkles.update_and_render(&mut self.canvas, dt);
        if let Some((x, y, scale)) = toast {
            if let Some(toast) = &self.toast {
                font::draw_text(&mut self.canvas, x + 16, y + 10, &toast.text, &TextStyle::new(scale, WHITE));
            }
        }
    }

    // Live preview plus the outline the capture clip will cut along.
    // False when there is no camera frame to show.
    fn paint_live(&mut self) -> bool {
        let Ok(frame) = self.booth.preview_frame() else {
            self.painter
                .fill_rect(LIVE_X as f64, LIVE_Y as f64, LIVE_W as f64, LIVE_H as f64, [40, 30, 40, 255]);
            return false;
        };
        let mut view = match raster::fit_nearest(&frame, LIVE_W, LIVE_H) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "preview scale failed");
                return false;
            }
        };
        let selection = self.booth.selection();
        if let Err(e) = self.preview.apply(&mut view, selection.filter) {
            tracing::warn!(error = %e, "preview filter failed");
        }

        let ox = LIVE_X + (LIVE_W as i32 - view.width as i32) / 2;
        let oy = LIVE_Y + (LIVE_H as i32 - view.height as i32) / 2;
        if let Err(e) = self.painter.draw_image(&view, ox as f64, oy as f64, None) {
            tracing::warn!(error = %e, "preview draw failed");
            return false;
        }

        let size = 0.9 * view.width.min(view.height) as f64;
        let cx = ox as f64 + view.width as f64 / 2.0;
        let cy = oy as f64 + view.height as f64 / 2.0;
        let clip = ClipPath::for_capture(selection.shape, cx, cy, size);
        self.painter.stroke(clip.path(), OUTLINE_WIDTH, selection.frame.rgb());
        true
    }

    // Shrinking bar under the live view while the countdown runs.
    fn paint_countdown_bar(&mut self, now: Instant) {
        let Some(left) = self.booth.countdown_remaining(now) else {
            return;
        };
        let share = left.as_secs_f64() / Countdown::TOTAL.as_secs_f64();
        let y = (LIVE_Y + LIVE_H as i32 - 8) as f64;
        self.painter.fill_rect(LIVE_X as f64, y, LIVE_W as f64, 8.0, SHADOW);
        self.painter
            .fill_rect(LIVE_X as f64, y, LIVE_W as f64 * share, 8.0, rgba(palette::STRIP_CAPTION));
    }

    fn label_countdown(&mut self, now: Instant) {
        let text = match self.booth.countdown_phase(now) {
            Some(CountdownPhase::Digit(d)) => d.to_string(),
            Some(CountdownPhase::Smile) => "\u{263A}".to_owned(),
            _ => return,
        };
        let style = TextStyle::new(16, WHITE).with_shadow(SHADOW);
        let cx = LIVE_X + LIVE_W as i32 / 2;
        let baseline = LIVE_Y + LIVE_H as i32 / 2 + 56;
        font::draw_text_centered(&mut self.canvas, cx, baseline, &text, &style);
    }

    fn slot_y(i: usize) -> i32 {
        SLOT_Y + i as i32 * (SLOT_H as i32 + SLOT_GAP)
    }

    fn paint_slots(&mut self) {
        for i in 0..MAX_PHOTOS {
            let (x, y) = (SLOT_X as f64, Self::slot_y(i) as f64);
            let Some(photo) = self.booth.session().photos().get(i) else {
                self.painter.fill_rect(x, y, SLOT_W as f64, SLOT_H as f64, WHITE);
                continue;
            };
            let [r, g, b] = photo.frame.rgb();
            self.painter.fill_rect(x, y, SLOT_W as f64, SLOT_H as f64, [r, g, b, 255]);
            self.painter
                .fill_rect(x + 10.0, y + 10.0, (SLOT_W - 20) as f64, (SLOT_H - 40) as f64, WHITE);
            let thumb = raster::fit_nearest(&photo.image, SLOT_W as u32 - 20, SLOT_H as u32 - 40);
            let drawn = thumb.and_then(|thumb| {
                let tx = x + (SLOT_W - thumb.width) as f64 / 2.0;
                let ty = y + 10.0 + (SLOT_H - 40 - thumb.height) as f64 / 2.0;
                self.painter.draw_image(&thumb, tx, ty, None)
            });
            if let Err(e) = drawn {
                tracing::warn!(error = %e, slot = i + 1, "thumbnail draw failed");
            }
        }
    }

    fn label_slots(&mut self) {
        let taken = self.booth.session().len();
        let cx = SLOT_X + SLOT_W as i32 / 2;
        for i in 0..MAX_PHOTOS {
            let y = Self::slot_y(i);
            if i < taken {
                let style = TextStyle::new(1, INK);
                font::draw_text_centered(&mut self.canvas, cx, y + SLOT_H as i32 - 10, SLOT_CAPTION, &style);
            } else {
                let style = TextStyle::new(2, [200, 180, 190, 255]);
                let label = format!("PHOTO {}", i + 1);
                font::draw_text_centered(&mut self.canvas, cx, y + SLOT_H as i32 / 2 + 7, &label, &style);
            }
        }
    }

    // One dot per photo slot, filled once taken.
    fn paint_hud(&mut self) {
        let taken = self.booth.session().len();
        for i in 0..MAX_PHOTOS {
            let x = (LIVE_X + 150 + i as i32 * 22) as f64;
            let color = if i < taken { rgba(palette::STRIP_CAPTION) } else { [230, 210, 220, 255] };
            self.painter.fill_rect(x, 640.0, 14.0, 14.0, color);
        }
    }

    fn label_hud(&mut self) {
        let sel = self.booth.selection();
        let style = TextStyle::new(2, INK);
        let line = format!("F {}  H {}  G {}", sel.frame, sel.shape, sel.filter);
        font::draw_text(&mut self.canvas, LIVE_X, 575, &line, &style);
        let keys = "SPACE snap  S strip  P all  R reset  ESC quit";
        font::draw_text(&mut self.canvas, LIVE_X, 605, keys, &style);
        let left = format!("{} LEFT", self.booth.session().remaining());
        font::draw_text(&mut self.canvas, LIVE_X, 640, &left, &style);
    }

    fn paint_strip_view(&mut self) {
        let Some(view) = &self.strip_view else {
            return;
        };
        let ox = LIVE_X + (LIVE_W as i32 - view.width as i32) / 2;
        let oy = LIVE_Y + (STRIP_AREA_H as i32 - view.height as i32) / 2;
        if let Err(e) = self.painter.draw_image(view, ox as f64, oy as f64, None) {
            tracing::warn!(error = %e, "strip preview draw failed");
        }
    }

    fn label_full_help(&mut self) {
        let style = TextStyle::new(2, INK);
        let lines = [
            "ALL 3 PHOTOS TAKEN!",
            "",
            "S  save strip",
            "P  save all",
            "R  start over",
            "ESC  quit",
        ];
        for (i, line) in lines.iter().enumerate() {
            font::draw_text(&mut self.canvas, SLOT_X, SLOT_Y + 20 + i as i32 * 30, line, &style);
        }
    }

    // Dark panel behind the toast; returns where its text goes.
    fn paint_toast(&mut self, now: Instant) -> Option<(i32, i32, usize)> {
        if self.toast.as_ref().is_some_and(|t| now >= t.until) {
            self.toast = None;
        }
        let toast = self.toast.as_ref()?;
        let scale = font::fit_scale(&toast.text, WIDTH - 80, 2);
        let w = (font::text_width(&toast.text, scale) + 32).min(WIDTH);
        let h = font::GLYPH_HEIGHT * scale + 20;
        let x = (WIDTH - w) as i32 / 2;
        let y = HEIGHT as i32 - h as i32 - 20;
        self.painter.fill_rect(x as f64, y as f64, w as f64, h as f64, [0, 0, 0, 204]);
        Some((x, y, scale))
    }
}

fn rgba([r, g, b]: [u8; 3]) -> [u8; 4] {
    [r, g, b, 255]
}
