// Webcam photo booth: capture up to three snapshots, run them through a
// pixel filter and a clip shape, then composite a vertical polaroid strip.
//
// The capture state machine (BoothController) never touches a camera or
// window directly; it drives any FrameSource. The live camera and window
// live behind the `booth` feature.

#![forbid(unsafe_code)]

/// Closed set of named ids with stable kebab-case names shared by
/// `Display`, `FromStr` and serde.
macro_rules! named_ids {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Next id in declaration order, wrapping around.
            pub fn next(self) -> Self {
                Self::ALL[(self.position() + 1) % Self::ALL.len()]
            }

            pub fn prev(self) -> Self {
                Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
            }

            fn position(self) -> usize {
                Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::BoothError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::error::BoothError::validation(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

pub mod booth;
pub mod compose;
pub mod config;
pub mod error;
pub mod filter;
pub mod font;
pub mod fx;
pub mod paint;
pub mod palette;
pub mod preview;
pub mod raster;
pub mod session;
pub mod shape;
pub mod types;

#[cfg(feature = "booth")]
pub mod app;
#[cfg(feature = "booth")]
pub mod camera;
#[cfg(feature = "booth")]
pub mod window;

pub use booth::{BoothController, BoothState, CaptureOutcome, FrameSource};
pub use compose::{
    ExportImage, InMemoryDecoder, PhotoDecoder, STRIP_FILE_NAME, StripComposer, StripLayout,
    render_polaroid,
};
pub use config::BoothConfig;
pub use error::{BoothError, BoothResult};
pub use filter::{ColorMatrix, FilterId, FilterSpec};
pub use palette::FrameColor;
pub use session::{CaptureSession, Countdown, CountdownPhase, MAX_PHOTOS, PhotoRecord, Selection};
pub use shape::{ClipPath, ShapeId};
pub use types::FrameBuffer;
