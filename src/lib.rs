//! Magic Mirror - a voice-driven mirror persona
//!
//! This library provides the pieces of the mirror:
//! - Voice processing (microphone capture, utterance detection, STT, TTS, playback)
//! - Vision (camera still capture, remote image description)
//! - Chat completion against an Ollama-compatible server
//! - The session loop that ties them together
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Session                         │
//! │   listen → classify → vision | chat → speak         │
//! └──────┬──────────────┬──────────────┬────────────────┘
//!        │              │              │
//! ┌──────▼─────┐ ┌──────▼──────┐ ┌─────▼──────────────┐
//! │ Microphone │ │   Camera    │ │   Speaker          │
//! │ + STT      │ │ + Vision    │ │   TTS + playback   │
//! └────────────┘ └─────────────┘ └────────────────────┘
//!                       │
//!             ┌─────────▼─────────┐
//!             │  Ollama (chat +   │
//!             │  vision models)   │
//!             └───────────────────┘
//! ```

pub mod adapter;
pub mod chat;
pub mod config;
pub mod error;
pub mod mirror;
pub mod persona;
pub mod session;
pub mod vision;
pub mod voice;

pub use adapter::{
    AudioSink, ChatCompleter, Heard, SpeechInput, SpeechOutput, Utterance, VisionAnalyzer,
};
pub use chat::ChatClient;
pub use config::Config;
pub use error::{Error, Result};
pub use mirror::{LiveSession, live_session};
pub use persona::Persona;
pub use session::{
    ChatMessage, ChatOutcome, ConversationHistory, Intent, IntentClassifier, Keywords, Role,
    Session, SessionOptions, TurnOutcome, VisionOutcome,
};
pub use vision::{Camera, CameraSettings, CameraVision, Frame, VisionClient};
