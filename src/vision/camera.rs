//! Still capture from a camera via ffmpeg

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use super::Frame;
use crate::{Error, Result};

/// Camera capture settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraSettings {
    /// ffmpeg input device (e.g. "/dev/video0")
    pub device: String,
    /// ffmpeg input format (e.g. "v4l2")
    pub input_format: String,
    /// Frames skipped while the sensor adjusts exposure
    pub warmup: Duration,
    /// Upper bound on one capture
    pub timeout: Duration,
    /// Keep a copy of each frame here
    pub capture_dir: Option<PathBuf>,
}

impl CameraSettings {
    /// Platform default input format and device
    #[must_use]
    pub fn platform_default() -> (&'static str, &'static str) {
        if cfg!(target_os = "macos") {
            ("avfoundation", "0")
        } else if cfg!(target_os = "windows") {
            ("dshow", "video=Integrated Camera")
        } else {
            ("v4l2", "/dev/video0")
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        let (input_format, device) = Self::platform_default();
        Self {
            device: device.to_string(),
            input_format: input_format.to_string(),
            warmup: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
            capture_dir: None,
        }
    }
}

/// Captures single frames by running ffmpeg against the camera
pub struct Camera {
    settings: CameraSettings,
}

impl Camera {
    #[must_use]
    pub const fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }

    /// Capture one JPEG frame
    ///
    /// The camera is opened for this call only; the temporary file is
    /// removed on every path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Device` if ffmpeg is missing, the camera cannot be
    /// opened, or the capture takes too long
    pub async fn capture(&self) -> Result<Frame> {
        let ffmpeg = which::which("ffmpeg")
            .map_err(|_| Error::Device("ffmpeg not found on PATH".to_string()))?;

        let dir = tempfile::tempdir()?;
        let out = dir.path().join("frame.jpg");

        let mut command = Command::new(&ffmpeg);
        command
            .args(["-hide_banner", "-loglevel", "error", "-f"])
            .arg(&self.settings.input_format);
        if self.settings.input_format == "avfoundation" {
            command.args(["-framerate", "30"]);
        }
        command
            .arg("-i")
            .arg(&self.settings.device)
            .arg("-ss")
            .arg(format!("{:.3}", self.settings.warmup.as_secs_f64()))
            .args(["-frames:v", "1", "-q:v", "2", "-y"])
            .arg(&out)
            .kill_on_drop(true);

        tracing::debug!(
            device = %self.settings.device,
            format = %self.settings.input_format,
            "capturing frame"
        );

        let output = tokio::time::timeout(self.settings.timeout, command.output())
            .await
            .map_err(|_| Error::Device("camera capture timed out".to_string()))?
            .map_err(|e| Error::Device(format!("failed to run ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Device(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(&out)
            .await
            .map_err(|e| Error::Device(format!("no frame written: {e}")))?;
        if bytes.is_empty() {
            return Err(Error::Device("camera produced an empty frame".to_string()));
        }

        let frame = Frame::jpeg(bytes);
        tracing::info!(bytes = frame.bytes.len(), "frame captured");

        if let Some(dir) = &self.settings.capture_dir {
            match keep_capture(dir, &frame).await {
                Ok(path) => tracing::debug!(path = %path.display(), "capture saved"),
                Err(e) => tracing::warn!(error = %e, "failed to save capture"),
            }
        }

        Ok(frame)
    }
}

/// Write `capture_YYYYmmdd_HHMMSS.jpg` into `dir`
async fn keep_capture(dir: &Path, frame: &Frame) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(capture_file_name(frame));
    tokio::fs::write(&path, &frame.bytes).await?;
    Ok(path)
}

fn capture_file_name(frame: &Frame) -> String {
    format!("capture_{}.jpg", frame.captured_at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_file_name() {
        let frame = Frame::jpeg(vec![1, 2, 3]);
        let name = capture_file_name(&frame);

        assert!(name.starts_with("capture_"));
        assert!(name.ends_with(".jpg"));
        // capture_ + 8 date digits + _ + 6 time digits + .jpg
        assert_eq!(name.len(), "capture_".len() + 15 + ".jpg".len());
    }

    #[tokio::test]
    async fn test_keep_capture_writes_frame() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("captures");
        let frame = Frame::jpeg(vec![0xFF, 0xD8, 0xFF]);

        let path = keep_capture(&target, &frame).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), frame.bytes);
    }
}
