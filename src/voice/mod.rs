//! Voice processing module
//!
//! Handles microphone capture, utterance detection, STT, TTS and playback.

mod capture;
mod detector;
mod listener;
mod playback;
mod speaker;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, record_utterance, samples_to_wav};
pub use detector::{
    DetectorState, ENERGY_FLOOR, UtteranceDetector, calculate_rms, threshold_from_ambient,
};
pub use listener::{MicrophoneInput, TypedInput};
pub use playback::{AudioClip, AudioPlayback, PLAYBACK_SAMPLE_RATE, SpeakerSink};
pub use speaker::{Speaker, SynthesisTimeouts};
pub use stt::{STT_TIMEOUT, SpeechToText};
pub use tts::{TextToSpeech, VoiceNameFilter, VoiceSettings};
