//! Configuration management for the magic mirror
//!
//! Values are layered env > TOML file > default. Only the two service base
//! URLs and a few model names have environment overrides.

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use self::file::MirrorConfigFile;
use crate::chat::DEFAULT_CHAT_MODEL;
use crate::persona::Persona;
use crate::session::{DEFAULT_HISTORY_WINDOW, Keywords, SessionOptions};
use crate::vision::{CameraSettings, DEFAULT_VISION_MODEL};
use crate::voice::{SynthesisTimeouts, VoiceSettings};
use crate::{Error, Result};

/// Default Ollama base URL
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default speech service base URL
pub const DEFAULT_SPEECH_URL: &str = "http://localhost:5005";

/// Magic mirror configuration
#[derive(Debug)]
pub struct Config {
    /// Ollama-compatible base URL, used for chat and vision
    pub ollama_url: String,

    /// Speech service base URL
    pub speech_url: String,

    pub chat: ChatConfig,
    pub vision: VisionConfig,
    pub speech: SpeechConfig,
    pub listen: ListenConfig,
    pub camera: CameraSettings,
    pub keywords: Keywords,
    pub persona: Persona,
}

/// Chat completion configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub timeout: Duration,
    pub history_window: usize,
}

/// Image description configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub model: String,
    pub timeout: Duration,
}

/// Speech synthesis configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub voice: VoiceSettings,
    pub timeouts: SynthesisTimeouts,
}

/// Microphone and recognition configuration
#[derive(Debug)]
pub struct ListenConfig {
    /// How long to wait for speech to start
    pub timeout: Duration,

    /// Longest recorded phrase
    pub phrase_limit: Duration,

    /// Ambient noise calibration
    pub ambient: Duration,

    /// Full transcription endpoint URL
    pub stt_url: String,

    pub stt_model: String,

    /// Bearer token for the transcription endpoint
    pub stt_api_key: Option<SecretString>,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file is unusable or a URL is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(path)?;
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a URL is invalid or a numeric value is out of range
    pub fn from_sources(
        fc: MirrorConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let ollama_url = validate_base_url(
            "ollama_url",
            &env("MIRROR_OLLAMA_URL")
                .or(fc.ollama_url)
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
        )?;
        let speech_url = validate_base_url(
            "speech_url",
            &env("MIRROR_SPEECH_URL")
                .or(fc.speech_url)
                .unwrap_or_else(|| DEFAULT_SPEECH_URL.to_string()),
        )?;

        let history_window = fc.chat.history_window.unwrap_or(DEFAULT_HISTORY_WINDOW);
        let chat = ChatConfig {
            model: env("MIRROR_CHAT_MODEL")
                .or(fc.chat.model)
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            timeout: secs(fc.chat.timeout_secs, 30),
            history_window,
        };

        let vision = VisionConfig {
            model: env("MIRROR_VISION_MODEL")
                .or(fc.vision.model)
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            timeout: secs(fc.vision.timeout_secs, 120),
        };

        let speed = fc.speech.speed.unwrap_or(1.0);
        if !(0.25..=4.0).contains(&speed) {
            return Err(Error::Config(format!(
                "speech.speed must be between 0.25 and 4.0, got {speed}"
            )));
        }
        let speech = SpeechConfig {
            voice: VoiceSettings {
                model: fc.speech.model.unwrap_or_else(|| "orpheus".to_string()),
                voice: fc.speech.voice.unwrap_or_else(|| "zac".to_string()),
                response_format: fc
                    .speech
                    .response_format
                    .unwrap_or_else(|| "wav".to_string()),
                speed,
            },
            timeouts: SynthesisTimeouts {
                request: secs(fc.speech.timeout_secs, 120),
                retry: secs(fc.speech.retry_timeout_secs, 180),
                backoff: Duration::from_millis(fc.speech.retry_backoff_ms.unwrap_or(2000)),
            },
        };

        let stt_url = match env("MIRROR_STT_URL").or(fc.listen.stt_url) {
            Some(url) => validate_base_url("listen.stt_url", &url)?,
            None => format!("{speech_url}/v1/audio/transcriptions"),
        };
        let listen = ListenConfig {
            timeout: secs(fc.listen.timeout_secs, 5),
            phrase_limit: secs(fc.listen.phrase_limit_secs, 10),
            ambient: secs(fc.listen.ambient_secs, 1),
            stt_url,
            stt_model: env("MIRROR_STT_MODEL")
                .or(fc.listen.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            stt_api_key: env("MIRROR_STT_API_KEY")
                .or(fc.listen.stt_api_key)
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
        };

        let defaults = CameraSettings::default();
        let camera = CameraSettings {
            device: env("MIRROR_CAMERA_DEVICE")
                .or(fc.camera.device)
                .unwrap_or(defaults.device),
            input_format: fc.camera.input_format.unwrap_or(defaults.input_format),
            warmup: fc
                .camera
                .warmup_ms
                .map_or(defaults.warmup, Duration::from_millis),
            timeout: fc
                .camera
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            capture_dir: fc.camera.capture_dir.map(PathBuf::from),
        };

        let default_keywords = Keywords::default();
        let keywords = Keywords {
            exit: fc.keywords.exit.unwrap_or(default_keywords.exit),
            vision: fc.keywords.vision.unwrap_or(default_keywords.vision),
            wake_phrase: fc.keywords.wake_phrase.or(default_keywords.wake_phrase),
        };
        if keywords.exit.iter().all(|k| k.trim().is_empty()) {
            return Err(Error::Config(
                "keywords.exit must contain at least one phrase".to_string(),
            ));
        }

        let persona = Persona::default().with_overrides(fc.persona);

        Ok(Self {
            ollama_url,
            speech_url,
            chat,
            vision,
            speech,
            listen,
            camera,
            keywords,
            persona,
        })
    }

    /// Turn-loop options derived from this configuration
    #[must_use]
    pub const fn session_options(&self) -> SessionOptions {
        SessionOptions {
            history_window: self.chat.history_window,
            listen_timeout: self.listen.timeout,
            phrase_limit: self.listen.phrase_limit,
        }
    }
}

/// Check a base URL and strip its trailing slash
fn validate_base_url(key: &str, value: &str) -> Result<String> {
    let parsed = url::Url::parse(value.trim())
        .map_err(|e| Error::Config(format!("{key} is not a valid URL ({value}): {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "{key} must use http or https, got {}",
            parsed.scheme()
        )));
    }

    Ok(value.trim().trim_end_matches('/').to_string())
}

fn secs(value: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(value.unwrap_or(default))
}
