use serde::{Deserialize, Serialize};

/// Token accounting reported alongside a completion
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl TokenUsage {
    #[must_use]
    pub fn with_prompt_completion(prompt: u64, completion: u64) -> Self {
        Self {
            prompt_tokens: Some(prompt),
            completion_tokens: Some(completion),
            total_tokens: Some(prompt + completion),
        }
    }

    #[must_use]
    pub fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens.unwrap_or(0)
    }

    #[must_use]
    pub fn completion_tokens(&self) -> u64 {
        self.completion_tokens.unwrap_or(0)
    }

    /// Reported total, or prompt + completion when the provider omitted it
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
            .unwrap_or_else(|| self.prompt_tokens() + self.completion_tokens())
    }
}
