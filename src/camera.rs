// Webcam capture through nokhwa.
// The device is only held between `start()` and `stop()`; the booth releases
// it as soon as the third photo is taken and grabs it again on reset.

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

use crate::booth::FrameSource;
use crate::config::BoothConfig;
use crate::error::{BoothError, BoothResult};
use crate::types::FrameBuffer;

pub struct CameraCapture {
    index: u32,
    width: u32,
    height: u32,
    fps: u32,
    cam: Option<Camera>,
}

impl CameraCapture {
    /// Nothing is opened yet; call [`FrameSource::start`].
    pub fn new(index: u32, width: u32, height: u32, fps: u32) -> Self {
        Self {
            index,
            width,
            height,
            fps,
            cam: None,
        }
    }

    pub fn from_config(cfg: &BoothConfig) -> Self {
        Self::new(cfg.camera_index, cfg.camera_width, cfg.camera_height, cfg.camera_fps)
    }

    fn open(&self) -> BoothResult<Camera> {
        // Ask for the closest match to the configured mode; the driver may
        // pick something else.
        let fmt = CameraFormat::new(
            Resolution::new(self.width, self.height),
            FrameFormat::MJPEG,
            self.fps,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(self.index), req)
            .map_err(|e| BoothError::device(format!("create camera {}: {e}", self.index)))?;
        cam.open_stream()
            .map_err(|e| BoothError::device(format!("open stream: {e}")))?;
        Ok(cam)
    }
}

impl FrameSource for CameraCapture {
    fn start(&mut self) -> BoothResult<()> {
        if self.cam.is_some() {
            return Ok(());
        }
        let cam = self.open()?;
        let res = cam.resolution();
        tracing::info!(
            index = self.index,
            width = res.width(),
            height = res.height(),
            "camera stream open"
        );
        self.cam = Some(cam);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut cam) = self.cam.take() {
            if let Err(e) = cam.stop_stream() {
                tracing::warn!(error = %e, "camera did not stop cleanly");
            }
        }
    }

    fn is_running(&self) -> bool {
        self.cam.is_some()
    }

    /// Blocks until the next frame arrives.
    fn grab(&mut self) -> BoothResult<FrameBuffer> {
        let cam = self
            .cam
            .as_mut()
            .ok_or_else(|| BoothError::device("camera is not running"))?;
        let frame = cam
            .frame()
            .map_err(|e| BoothError::device(format!("fetch frame: {e}")))?;
        let rgb = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| BoothError::device(format!("decode frame: {e}")))?;

        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        let mut rgba = Vec::with_capacity(w * h * 4);
        for px in rgb.into_raw().chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        FrameBuffer::from_rgba(w, h, rgba)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
