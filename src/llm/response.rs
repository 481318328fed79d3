use serde::{Deserialize, Serialize};

use super::error::LlmError;

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: Vec<RequestMessage<'a>>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct RequestMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> MessagesRequest<'a> {
    pub fn single_turn(model: &'a str, max_tokens: u32, system: &'a str, user: &'a str) -> Self {
        Self {
            model,
            max_tokens,
            system,
            messages: vec![RequestMessage {
                role: "user",
                content: user,
            }],
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl MessagesResponse {
    /// The first non-blank text block, trimmed.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            ContentBlock::Other => None,
        })
    }

    pub fn summary(&self) -> Result<String, LlmError> {
        self.first_text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }
}
