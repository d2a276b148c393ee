//! Utterance segmentation
//!
//! Splits a microphone stream into a single spoken phrase using RMS energy.
//! All timing is counted in samples so the detector behaves the same no
//! matter how often it is fed.

use std::time::Duration;

use super::capture::SAMPLE_RATE;

/// Lowest energy threshold, used in a silent room
pub const ENERGY_FLOOR: f32 = 0.01;

/// Threshold multiplier over the measured ambient level
const AMBIENT_FACTOR: f32 = 2.5;

/// Energy is judged per frame of this many samples (50ms)
const FRAME_SAMPLES: usize = 800;

/// Minimum duration of speech to count as an utterance (0.3 seconds)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Silence after speech that ends the utterance (0.8 seconds)
const END_SILENCE_SAMPLES: usize = 12800;

/// State of the utterance detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// No speech yet
    Waiting,
    /// Speech started, accumulating
    Speaking,
    /// A full utterance is buffered
    Complete,
    /// Nobody spoke before the listen timeout
    TimedOut,
}

/// Detects one utterance in a stream of samples
#[derive(Debug)]
pub struct UtteranceDetector {
    threshold: f32,
    listen_limit: usize,
    phrase_limit: usize,
    state: DetectorState,
    waited: usize,
    silence: usize,
    speech: Vec<f32>,
}

impl UtteranceDetector {
    /// Create a detector
    ///
    /// `timeout` bounds the wait for speech to begin, `phrase_limit` bounds the
    /// recorded phrase.
    #[must_use]
    pub fn new(threshold: f32, timeout: Duration, phrase_limit: Duration) -> Self {
        Self {
            threshold: threshold.max(ENERGY_FLOOR),
            listen_limit: duration_to_samples(timeout),
            phrase_limit: duration_to_samples(phrase_limit).max(MIN_SPEECH_SAMPLES),
            state: DetectorState::Waiting,
            waited: 0,
            silence: 0,
            speech: Vec::new(),
        }
    }

    /// Feed captured samples and return the new state
    pub fn push(&mut self, samples: &[f32]) -> DetectorState {
        for frame in samples.chunks(FRAME_SAMPLES) {
            if matches!(
                self.state,
                DetectorState::Complete | DetectorState::TimedOut
            ) {
                break;
            }
            self.push_frame(frame);
        }
        self.state
    }

    fn push_frame(&mut self, frame: &[f32]) {
        let is_speech = calculate_rms(frame) > self.threshold;

        match self.state {
            DetectorState::Waiting => {
                if is_speech {
                    self.state = DetectorState::Speaking;
                    self.speech.extend_from_slice(frame);
                    self.silence = 0;
                    tracing::trace!("speech started");
                } else {
                    self.waited += frame.len();
                    if self.waited >= self.listen_limit {
                        self.state = DetectorState::TimedOut;
                    }
                }
            }
            DetectorState::Speaking => {
                self.speech.extend_from_slice(frame);

                if is_speech {
                    self.silence = 0;
                } else {
                    self.silence += frame.len();
                }

                if self.speech.len() >= self.phrase_limit {
                    self.speech.truncate(self.phrase_limit);
                    self.state = DetectorState::Complete;
                    tracing::debug!(samples = self.speech.len(), "phrase limit reached");
                } else if self.silence >= END_SILENCE_SAMPLES {
                    let voiced = self.speech.len() - self.silence;
                    if voiced >= MIN_SPEECH_SAMPLES {
                        self.state = DetectorState::Complete;
                        tracing::debug!(samples = self.speech.len(), "utterance complete");
                    } else {
                        // Click or cough: keep waiting, the time still counts
                        self.waited += self.speech.len();
                        self.speech.clear();
                        self.silence = 0;
                        self.state = if self.waited >= self.listen_limit {
                            DetectorState::TimedOut
                        } else {
                            DetectorState::Waiting
                        };
                    }
                }
            }
            DetectorState::Complete | DetectorState::TimedOut => {}
        }
    }

    /// Take the recorded utterance, clearing it
    pub fn take_speech(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.speech)
    }

    /// Get the recorded samples so far
    #[must_use]
    pub fn speech(&self) -> &[f32] {
        &self.speech
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }

    /// Energy threshold in use
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Derive a speech threshold from a sample of room noise
#[must_use]
pub fn threshold_from_ambient(ambient: &[f32]) -> f32 {
    (calculate_rms(ambient) * AMBIENT_FACTOR).max(ENERGY_FLOOR)
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn duration_to_samples(duration: Duration) -> usize {
    (duration.as_secs_f64() * f64::from(SAMPLE_RATE)) as usize
}
