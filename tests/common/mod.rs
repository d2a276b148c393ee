//! Shared test utilities
//!
//! Fakes for every session adapter. Each fake records into a shared
//! [`Log`] so tests can assert on the exact order of events.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use magic_mirror::voice::{AudioClip, SAMPLE_RATE};
use magic_mirror::{
    AudioSink, ChatCompleter, ChatMessage, Error, Frame, Heard, IntentClassifier, Persona,
    Result, Session, SessionOptions, SpeechInput, SpeechOutput, Utterance, VisionAnalyzer,
};

/// Ordered record of what the fakes were asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Spoke(String),
    Captured,
    Described { prompt: String },
    Completed { messages: Vec<ChatMessage> },
}

/// Event log shared between fakes
#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<Vec<Event>>>);

impl Log {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// Everything spoken, in order
    pub fn spoken(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Spoke(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Message lists sent to the chat service, in order
    pub fn chat_requests(&self) -> Vec<Vec<ChatMessage>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Completed { messages } => Some(messages),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

/// Replays a fixed list of listen results, then reports the source closed
pub struct ScriptedInput {
    script: VecDeque<Heard>,
}

impl ScriptedInput {
    pub fn new(script: Vec<Heard>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// Each line becomes an utterance; empty strings become silence
    pub fn lines(lines: &[&str]) -> Self {
        Self::new(
            lines
                .iter()
                .map(|line| {
                    if line.is_empty() {
                        Heard::Nothing
                    } else {
                        Heard::Utterance(Utterance::now(*line))
                    }
                })
                .collect(),
        )
    }
}

#[async_trait]
impl SpeechInput for ScriptedInput {
    async fn listen(&mut self, _timeout: Duration, _phrase_limit: Duration) -> Heard {
        self.script.pop_front().unwrap_or(Heard::Closed)
    }
}

/// Records spoken text
pub struct RecordingSpeech {
    log: Log,
}

impl RecordingSpeech {
    pub fn new(log: Log) -> Self {
        Self { log }
    }
}

#[async_trait]
impl SpeechOutput for RecordingSpeech {
    async fn speak(&self, text: &str) {
        self.log.push(Event::Spoke(text.to_string()));
    }
}

/// How a fake vision adapter behaves
#[derive(Debug, Clone)]
pub enum VisionScript {
    Describe(String),
    NoCamera,
    AnalysisFails,
}

pub struct FakeVision {
    log: Log,
    script: VisionScript,
}

impl FakeVision {
    pub fn new(log: Log, script: VisionScript) -> Self {
        Self { log, script }
    }
}

#[async_trait]
impl VisionAnalyzer for FakeVision {
    async fn capture(&self) -> Result<Frame> {
        self.log.push(Event::Captured);
        match self.script {
            VisionScript::NoCamera => Err(Error::Device("no camera attached".to_string())),
            _ => Ok(Frame::jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9])),
        }
    }

    async fn describe(&self, _frame: &Frame, prompt: &str) -> Result<String> {
        self.log.push(Event::Described {
            prompt: prompt.to_string(),
        });
        match &self.script {
            VisionScript::Describe(text) => Ok(text.clone()),
            _ => Err(Error::Timeout("vision")),
        }
    }
}

/// Answers chat requests from a queue; an exhausted queue fails
pub struct FakeChat {
    log: Log,
    replies: Mutex<VecDeque<Result<String>>>,
}

impl FakeChat {
    pub fn new(log: Log, replies: Vec<Result<String>>) -> Self {
        Self {
            log,
            replies: Mutex::new(replies.into()),
        }
    }

    /// Replies "reply 1", "reply 2", ... forever
    pub fn numbered(log: Log, count: usize) -> Self {
        Self::new(log, (1..=count).map(|n| Ok(format!("reply {n}"))).collect())
    }
}

#[async_trait]
impl ChatCompleter for FakeChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.log.push(Event::Completed {
            messages: messages.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Timeout("chat")))
    }
}

/// Counts clips handed to it
#[derive(Debug, Clone, Default)]
pub struct CountingSink {
    played: Arc<Mutex<Vec<AudioClip>>>,
}

impl CountingSink {
    pub fn played(&self) -> usize {
        self.played.lock().unwrap().len()
    }

    pub fn clips(&self) -> Vec<AudioClip> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioSink for CountingSink {
    async fn play(&self, clip: AudioClip) -> Result<()> {
        self.played.lock().unwrap().push(clip);
        Ok(())
    }
}

pub type FakeSession = Session<ScriptedInput, FakeVision, FakeChat, RecordingSpeech>;

/// A session wired entirely to fakes
pub fn fake_session(
    log: &Log,
    input: ScriptedInput,
    vision: VisionScript,
    chat: FakeChat,
) -> FakeSession {
    Session::new(
        input,
        FakeVision::new(log.clone(), vision),
        chat,
        RecordingSpeech::new(log.clone()),
        IntentClassifier::default(),
        Persona::default(),
        SessionOptions::default(),
    )
}

/// Generate sine wave audio samples
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn sine(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn silence(duration_secs: f32) -> Vec<f32> {
    vec![0.0; (SAMPLE_RATE as f32 * duration_secs) as usize]
}
