use serde::{Deserialize, Serialize};

// Chat API request format
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ChatRequest {
    // kept loose so a non-string message is a validation error, not a parse error
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ChatRequest {
    /// The message text, if it is a string with something other than whitespace.
    pub fn message_text(&self) -> Option<&str> {
        match &self.message {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

// Chat API response format
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ChatReply {
    pub reply: String,
    pub mood: Mood,
    pub tone: Tone,
    pub resources: Vec<Resource>,
    pub action: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    Sad,
    Anxious,
    Angry,
    #[default]
    Neutral,
    Confused,
    Urgent,
}

impl Mood {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calm" => Some(Self::Calm),
            "sad" => Some(Self::Sad),
            "anxious" => Some(Self::Anxious),
            "angry" => Some(Self::Angry),
            "neutral" => Some(Self::Neutral),
            "confused" => Some(Self::Confused),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Calming,
    Encouraging,
    #[default]
    Informational,
    Reflective,
}

impl Tone {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calming" => Some(Self::Calming),
            "encouraging" => Some(Self::Encouraging),
            "informational" => Some(Self::Informational),
            "reflective" => Some(Self::Reflective),
            _ => None,
        }
    }
}
