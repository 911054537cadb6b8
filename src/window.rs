// The booth window: shows a composed frame and reports key presses.

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::{BoothError, BoothResult};
use crate::types::FrameBuffer;

/// Keys the booth reacts to, as single presses (no auto-repeat).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoothKey {
    Capture,
    Frame,
    Shape,
    Filter,
    SaveStrip,
    SaveAll,
    Reset,
    Close,
}

impl BoothKey {
    const ALL: [BoothKey; 8] = [
        BoothKey::Capture,
        BoothKey::Frame,
        BoothKey::Shape,
        BoothKey::Filter,
        BoothKey::SaveStrip,
        BoothKey::SaveAll,
        BoothKey::Reset,
        BoothKey::Close,
    ];

    fn key(self) -> Key {
        match self {
            BoothKey::Capture => Key::Space,
            BoothKey::Frame => Key::F,
            BoothKey::Shape => Key::H,
            BoothKey::Filter => Key::G,
            BoothKey::SaveStrip => Key::S,
            BoothKey::SaveAll => Key::P,
            BoothKey::Reset => Key::R,
            BoothKey::Close => Key::Escape,
        }
    }
}

pub struct BoothWindow {
    window: Window,
    width: usize,
    height: usize,
    // 0RGB staging buffer handed to minifb
    words: Vec<u32>,
}

impl BoothWindow {
    pub fn new(title: &str, width: usize, height: usize) -> BoothResult<Self> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| BoothError::window(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self {
            window,
            width,
            height,
            words: Vec::with_capacity(width * height),
        })
    }

    /// Push one frame to the screen. Also pumps window events.
    pub fn present(&mut self, frame: &FrameBuffer) -> BoothResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(BoothError::window(format!(
                "frame is {}x{}, window is {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        frame.write_0rgb(&mut self.words);
        self.window
            .update_with_buffer(&self.words, self.width, self.height)
            .map_err(|e| BoothError::window(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Booth keys pressed since the last frame.
    pub fn pressed(&self) -> Vec<BoothKey> {
        BoothKey::ALL
            .into_iter()
            .filter(|k| self.window.is_key_pressed(k.key(), KeyRepeat::No))
            .collect()
    }

    /// Shift held: cycle backwards.
    pub fn shift_down(&self) -> bool {
        self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift)
    }
}
