//! TOML configuration file loading
//!
//! Supports `~/.config/magic-mirror/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::persona::PersonaOverrides;
use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct MirrorConfigFile {
    /// Ollama-compatible base URL (chat and vision)
    pub ollama_url: Option<String>,

    /// Speech service base URL (synthesis, and recognition unless overridden)
    pub speech_url: Option<String>,

    #[serde(default)]
    pub chat: ChatFileConfig,

    #[serde(default)]
    pub vision: VisionFileConfig,

    #[serde(default)]
    pub speech: SpeechFileConfig,

    #[serde(default)]
    pub listen: ListenFileConfig,

    #[serde(default)]
    pub camera: CameraFileConfig,

    #[serde(default)]
    pub keywords: KeywordsFileConfig,

    #[serde(default)]
    pub persona: PersonaOverrides,
}

/// Chat completion configuration
#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    /// Model name (e.g. "llama3")
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// How many history entries are sent with each request
    pub history_window: Option<usize>,
}

/// Image description configuration
#[derive(Debug, Default, Deserialize)]
pub struct VisionFileConfig {
    /// Vision-capable model name (e.g. "qwen3-vl:2b")
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Speech synthesis configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    pub model: Option<String>,
    pub voice: Option<String>,
    pub response_format: Option<String>,
    pub speed: Option<f32>,
    pub timeout_secs: Option<u64>,
    pub retry_timeout_secs: Option<u64>,
    pub retry_backoff_ms: Option<u64>,
}

/// Microphone and recognition configuration
#[derive(Debug, Default, Deserialize)]
pub struct ListenFileConfig {
    /// Seconds to wait for speech to start
    pub timeout_secs: Option<u64>,

    /// Longest phrase in seconds
    pub phrase_limit_secs: Option<u64>,

    /// Ambient noise calibration in seconds
    pub ambient_secs: Option<u64>,

    /// Full transcription endpoint URL
    pub stt_url: Option<String>,

    pub stt_model: Option<String>,

    pub stt_api_key: Option<String>,
}

/// Camera configuration
#[derive(Debug, Default, Deserialize)]
pub struct CameraFileConfig {
    /// ffmpeg input device (e.g. "/dev/video0" or "0")
    pub device: Option<String>,

    /// ffmpeg input format (e.g. "v4l2", "avfoundation")
    pub input_format: Option<String>,

    pub warmup_ms: Option<u64>,

    pub timeout_secs: Option<u64>,

    /// Keep a copy of every captured frame here
    pub capture_dir: Option<String>,
}

/// Routing keywords
#[derive(Debug, Default, Deserialize)]
pub struct KeywordsFileConfig {
    pub exit: Option<Vec<String>>,
    pub vision: Option<Vec<String>>,
    pub wake_phrase: Option<String>,
}

/// Load the TOML config file
///
/// With an explicit `path`, a missing or invalid file is an error. Without
/// one, the standard path is used and problems fall back to defaults.
///
/// # Errors
///
/// Returns error if an explicitly requested file cannot be read or parsed
pub fn load_config_file(path: Option<&Path>) -> Result<MirrorConfigFile> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        return Ok(config);
    }

    let Some(path) = config_file_path() else {
        return Ok(MirrorConfigFile::default());
    };

    if !path.exists() {
        return Ok(MirrorConfigFile::default());
    }

    let config = match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                MirrorConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            MirrorConfigFile::default()
        }
    };

    Ok(config)
}

/// Return the config file path: `~/.config/magic-mirror/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("magic-mirror").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let config: MirrorConfigFile = toml::from_str(
            r#"
            ollama_url = "http://mirror-box:11434"

            [speech]
            voice = "tara"
            speed = 1.2

            [keywords]
            exit = ["bye"]

            [persona]
            greeting = "Hello."
            "#,
        )
        .unwrap();

        assert_eq!(config.ollama_url.as_deref(), Some("http://mirror-box:11434"));
        assert!(config.speech_url.is_none());
        assert_eq!(config.speech.voice.as_deref(), Some("tara"));
        assert_eq!(config.speech.speed, Some(1.2));
        assert_eq!(config.keywords.exit, Some(vec!["bye".to_string()]));
        assert!(config.keywords.vision.is_none());
        assert_eq!(config.persona.greeting.as_deref(), Some("Hello."));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_file(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_explicit_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ollama_url = [").unwrap();
        assert!(matches!(load_config_file(Some(&path)), Err(Error::Toml(_))));
    }
}
