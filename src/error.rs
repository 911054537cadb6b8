// One error type for the whole booth. Every variant says *where* things went
// wrong; the window turns them into toasts, the CLI wraps them in anyhow.

pub type BoothResult<T> = Result<T, BoothError>;

#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    /// Camera permission denied, no device, or the stream stopped delivering.
    #[error("camera unavailable: {0}")]
    DeviceAccess(String),

    #[error("you already captured {max} photos, save them or start over")]
    CaptureLimitExceeded { max: usize },

    #[error("a capture countdown is already running")]
    CaptureInProgress,

    #[error("no photos to save")]
    EmptyComposition,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("window error: {0}")]
    Window(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BoothError {
    pub fn device(msg: impl Into<String>) -> Self {
        Self::DeviceAccess(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn window(msg: impl Into<String>) -> Self {
        Self::Window(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
