//! Vision: camera capture and remote image description

mod camera;
mod client;

use async_trait::async_trait;
use chrono::{DateTime, Local};

pub use camera::{Camera, CameraSettings};
pub use client::{DEFAULT_VISION_MODEL, VisionClient};

use crate::Result;
use crate::adapter::VisionAnalyzer;

/// A captured still image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub captured_at: DateTime<Local>,
}

impl Frame {
    /// Wrap JPEG bytes captured just now
    #[must_use]
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/jpeg",
            captured_at: Local::now(),
        }
    }
}

/// Live vision adapter: a camera plus a remote vision model
pub struct CameraVision {
    camera: Camera,
    client: VisionClient,
}

impl CameraVision {
    #[must_use]
    pub const fn new(camera: Camera, client: VisionClient) -> Self {
        Self { camera, client }
    }
}

#[async_trait]
impl VisionAnalyzer for CameraVision {
    async fn capture(&self) -> Result<Frame> {
        self.camera.capture().await
    }

    async fn describe(&self, frame: &Frame, prompt: &str) -> Result<String> {
        self.client.describe(frame, prompt).await
    }
}
