//! Local frame sources for ingestion.
//!
//! A [`FrameSource`] stands in for the webcam: it is opened once,
//! polled for a frame on every ingest tick, and closed on teardown.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::{Rgb, RgbImage};

/// Error text shown when the capture device cannot be opened.
pub const DEVICE_UNAVAILABLE: &str = "permission denied or webcam not found";

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("{DEVICE_UNAVAILABLE}: {0}")]
    DeviceUnavailable(String),

    #[error("frame source is not open")]
    NotOpen,

    #[error("could not decode frame: {0}")]
    Decode(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait FrameSource: Send {
    /// Acquire the device. Called once before the first capture.
    async fn open(&mut self) -> Result<(), CaptureError>;

    /// Grab the current frame. `Ok(None)` means no frame is ready yet
    /// and the tick should be skipped.
    async fn capture(&mut self) -> Result<Option<RgbImage>, CaptureError>;

    /// Release the device. Must be safe to call more than once.
    async fn close(&mut self);
}

// ---------------------------------------------------------------------------
// Test pattern
// ---------------------------------------------------------------------------

/// Synthetic moving gradient, useful without a camera attached.
#[derive(Debug, Clone)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    tick: u32,
    open: bool,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            tick: 0,
            open: false,
        }
    }

    fn render(&self) -> RgbImage {
        let shift = self.tick.wrapping_mul(4) % self.width;
        let bar = (self.tick.wrapping_mul(8)) % self.width;
        RgbImage::from_fn(self.width, self.height, |x, y| {
            if x.abs_diff(bar) < 6 {
                return Rgb([255, 255, 255]);
            }
            let r = (((x + shift) % self.width) * 255 / self.width) as u8;
            let g = (y * 255 / self.height) as u8;
            Rgb([r, g, 96])
        })
    }
}

impl Default for TestPatternSource {
    fn default() -> Self {
        Self::new(640, 360)
    }
}

#[async_trait]
impl FrameSource for TestPatternSource {
    async fn open(&mut self) -> Result<(), CaptureError> {
        self.open = true;
        self.tick = 0;
        Ok(())
    }

    async fn capture(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        if !self.open {
            return Err(CaptureError::NotOpen);
        }
        let frame = self.render();
        self.tick = self.tick.wrapping_add(1);
        Ok(Some(frame))
    }

    async fn close(&mut self) {
        self.open = false;
    }
}

// ---------------------------------------------------------------------------
// Image directory
// ---------------------------------------------------------------------------

/// Replays the images of a directory in file-name order, looping.
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            next: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"))
        .unwrap_or(false)
}

#[async_trait]
impl FrameSource for ImageSequenceSource {
    async fn open(&mut self) -> Result<(), CaptureError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "{}: {e}",
                    self.dir.display()
                )))
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_image_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(CaptureError::DeviceUnavailable(format!(
                "no images in {}",
                self.dir.display()
            )));
        }

        tracing::info!(dir = %self.dir.display(), count = files.len(), "Image source opened");
        self.files = files;
        self.next = 0;
        Ok(())
    }

    async fn capture(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        if self.files.is_empty() {
            return Err(CaptureError::NotOpen);
        }
        let path = self.files[self.next % self.files.len()].clone();
        self.next = (self.next + 1) % self.files.len();

        let decoded = tokio::task::spawn_blocking(move || image::open(path))
            .await
            .map_err(|e| CaptureError::Io(std::io::Error::other(e)))??;
        Ok(Some(decoded.to_rgb8()))
    }

    async fn close(&mut self) {
        self.files.clear();
        self.next = 0;
    }
}
