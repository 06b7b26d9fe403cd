use serde::{ Serialize, Deserialize };
use chrono::Utc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: i64,
}

/// Follow-up conversation about one itinerary. Entries are only ever appended.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_exchange(&mut self, question: &str, answer: &str) {
        let timestamp = Utc::now().timestamp();
        self.messages.push(ChatMessage {
            speaker: Speaker::User,
            text: question.to_string(),
            timestamp,
        });
        self.messages.push(ChatMessage {
            speaker: Speaker::Assistant,
            text: answer.to_string(),
            timestamp,
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
