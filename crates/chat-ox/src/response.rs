use crate::{ChatError, Message, Role, Timestamp, Usage};
use serde::{Deserialize, Serialize};

/// Response from chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Unique identifier for the response
    #[serde(default)]
    pub id: String,

    /// Object type (usually "chat.completion")
    #[serde(default)]
    pub object: String,

    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,

    /// Model used for the completion
    #[serde(default)]
    pub model: String,

    /// List of completion choices
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// System fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
}

/// A completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Index of this choice
    #[serde(default)]
    pub index: u32,

    /// The completion message
    pub message: Message,

    /// Reason for stopping
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// Get the content of the first choice, if available
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }

    /// Get the first choice, if available
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }

    /// Text of the first choice
    ///
    /// A choice without content (e.g. a refusal or tool call) reads as an
    /// empty string; a response with no choices at all is an error.
    pub fn first_text(&self) -> Result<&str, ChatError> {
        self.first_choice()
            .map(|choice| choice.message.content.as_deref().unwrap_or_default())
            .ok_or(ChatError::EmptyChoices)
    }

    /// Get the finish reason of the first choice
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref())
    }
}

/// One server-sent chunk of a streamed completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: String,

    /// Object type (usually "chat.completion.chunk")
    #[serde(default)]
    pub object: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,

    #[serde(default)]
    pub model: String,

    /// Empty on the trailing usage chunk
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,

    /// Only present on the final chunk when `stream_options.include_usage` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Streaming choice delta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub index: u32,

    /// The partial message delta
    #[serde(default)]
    pub delta: MessageDelta,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Partial message for streaming
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
}

impl ChatCompletionChunk {
    /// Text fragment carried by the first choice
    pub fn delta_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref())
    }
}
