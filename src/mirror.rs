//! Wires live adapters from configuration

use secrecy::{ExposeSecret, SecretString};

use crate::Result;
use crate::adapter::SpeechInput;
use crate::chat::ChatClient;
use crate::config::Config;
use crate::session::{IntentClassifier, Session};
use crate::vision::{Camera, CameraVision, VisionClient};
use crate::voice::{
    MicrophoneInput, STT_TIMEOUT, Speaker, SpeakerSink, SpeechToText, TextToSpeech,
};

/// A session backed by real devices and services
pub type LiveSession<I> = Session<I, CameraVision, ChatClient, Speaker<SpeakerSink>>;

/// Build a session around `input` using the configured services
///
/// # Errors
///
/// Returns error if an HTTP client cannot be built
pub fn live_session<I: SpeechInput>(config: &Config, input: I) -> Result<LiveSession<I>> {
    tracing::debug!(
        ollama_url = %config.ollama_url,
        speech_url = %config.speech_url,
        chat_model = %config.chat.model,
        vision_model = %config.vision.model,
        "building live session"
    );

    Ok(Session::new(
        input,
        camera_vision(config)?,
        chat_client(config)?,
        speaker(config),
        IntentClassifier::new(config.keywords.clone()),
        config.persona.clone(),
        config.session_options(),
    ))
}

/// Microphone input with remote transcription
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn microphone(config: &Config) -> Result<MicrophoneInput> {
    let api_key = config
        .listen
        .stt_api_key
        .as_ref()
        .map(|key| SecretString::from(key.expose_secret().to_owned()));

    let stt = SpeechToText::new(
        config.listen.stt_url.clone(),
        config.listen.stt_model.clone(),
        api_key,
        STT_TIMEOUT,
    )?;

    Ok(MicrophoneInput::new(stt, config.listen.ambient))
}

/// Camera plus vision model
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn camera_vision(config: &Config) -> Result<CameraVision> {
    let client = VisionClient::new(
        &config.ollama_url,
        config.vision.model.clone(),
        config.vision.timeout,
    )?;
    Ok(CameraVision::new(Camera::new(config.camera.clone()), client))
}

/// Chat client for the configured model
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn chat_client(config: &Config) -> Result<ChatClient> {
    ChatClient::new(&config.ollama_url, config.chat.model.clone(), config.chat.timeout)
}

/// Speaker playing through the default output device
#[must_use]
pub fn speaker(config: &Config) -> Speaker<SpeakerSink> {
    let tts = TextToSpeech::new(&config.speech_url, config.speech.voice.clone());
    Speaker::new(tts, SpeakerSink, config.speech.timeouts)
}
