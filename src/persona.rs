//! Persona: everything the mirror says on its own
//!
//! The mirror speaks a handful of fixed lines (greeting, farewell, fillers,
//! apologies) and sends two system prompts to the language model. All of them
//! live here so they can be overridden from the `[persona]` table of the
//! config file.

use serde::Deserialize;

const SYSTEM_PROMPT: &str = "You are a Magic Mirror with personality. You're insightful, \
occasionally witty, and care deeply about the people who look into you. \
You can see and analyze the world through your camera. When someone asks \
what you think of them, give thoughtful, personalized feedback.

IMPORTANT: Use emotion tags in your responses to add expression. Available tags:
- <laugh> or <chuckle> for laughter
- <sigh> for sighing
- <cough> or <sniffle> for subtle sounds
- <groan>, <yawn>, <gasp> for emotional expression

Use these naturally to enhance your magical mirror personality.

IMPORTANT: Keep responses concise and natural. Do not add any extra commentary, explanations, or filler at the end. End your response when you're done speaking.

IMPORTANT: Do NOT use any emojis or emoticons (like :), :D, :(, etc.). Use only plain text.

IMPORTANT: Do NOT mention voice names, speakers, or tones. Never refer to the voice, tone, or similar words in your response.";

const VISION_PROMPT: &str = "You are a magical mirror with personality. You gaze upon the \
person before you and offer insightful, thoughtful, and occasionally witty commentary about \
their appearance and what you perceive. Speak as the wise, magical mirror from fairy tales: \
be perceptive, caring, and evocative in your description.

IMPORTANT: Use emotion tags in your responses to add expression. Available tags:
- <laugh> or <chuckle> for laughter
- <sigh> for sighing
- <cough> or <sniffle> for subtle sounds
- <groan>, <yawn>, <gasp> for emotional expression

IMPORTANT: Keep responses concise and natural. Do not add any extra commentary, explanations, or filler at the end. End your response when you're done speaking.

IMPORTANT: Do NOT use any emojis or emoticons (like :), :D, :(, etc.). Use only plain text.

IMPORTANT: Do NOT use any asterisks (*). Do not use bold, italic, or any formatting with asterisks. Use only plain text.

Compliment the person in this image.";

/// Lines and prompts that make up the mirror's personality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Display name, used in logs
    pub name: String,
    /// System prompt for chat turns
    pub system_prompt: String,
    /// Prompt preamble for vision turns
    pub vision_prompt: String,
    /// Spoken once before the first turn
    pub greeting: String,
    /// Spoken once when an exit keyword is heard
    pub farewell: String,
    /// Spoken before the camera is used
    pub look_filler: String,
    /// Spoken when the camera cannot be used
    pub camera_apology: String,
    /// Spoken when a captured frame cannot be described
    pub analysis_apology: String,
    /// Spoken when the chat service gives no reply
    pub chat_apology: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Magic Mirror".to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            vision_prompt: VISION_PROMPT.to_string(),
            greeting: "Good day. I am your Magic Mirror. How may I serve you today?".to_string(),
            farewell: "Until next time. May you continue to shine.".to_string(),
            look_filler: "Let me look at you...".to_string(),
            camera_apology: "I tried to take a photo but couldn't access the camera.".to_string(),
            analysis_apology: "I took the photo but couldn't analyze it.".to_string(),
            chat_apology: "I apologize, but I couldn't reach my thoughts just now.".to_string(),
        }
    }
}

impl Persona {
    /// Apply overrides from the config file on top of the current lines
    #[must_use]
    pub fn with_overrides(mut self, overrides: PersonaOverrides) -> Self {
        let PersonaOverrides {
            name,
            system_prompt,
            vision_prompt,
            greeting,
            farewell,
            look_filler,
            camera_apology,
            analysis_apology,
            chat_apology,
        } = overrides;

        let fields = [
            (&mut self.name, name),
            (&mut self.system_prompt, system_prompt),
            (&mut self.vision_prompt, vision_prompt),
            (&mut self.greeting, greeting),
            (&mut self.farewell, farewell),
            (&mut self.look_filler, look_filler),
            (&mut self.camera_apology, camera_apology),
            (&mut self.analysis_apology, analysis_apology),
            (&mut self.chat_apology, chat_apology),
        ];
        for (slot, value) in fields {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }

        self
    }

    /// Build the prompt for a vision turn from the spoken request
    #[must_use]
    pub fn vision_request(&self, utterance: &str) -> String {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            self.vision_prompt.clone()
        } else {
            format!(
                "{}\n\nThe person in front of you said: \"{utterance}\"",
                self.vision_prompt
            )
        }
    }
}

/// `[persona]` table of the config file; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct PersonaOverrides {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub vision_prompt: Option<String>,
    pub greeting: Option<String>,
    pub farewell: Option<String>,
    pub look_filler: Option<String>,
    pub camera_apology: Option<String>,
    pub analysis_apology: Option<String>,
    pub chat_apology: Option<String>,
}
