use chat_ox::{ChatClient, ChatError, ChatRequest, Model, StreamOptions, client::DEFAULT_BASE_URL};
use clap::Parser;

pub const DEFAULT_PROMPT: &str = "Say this is a test";
pub const DEFAULT_STREAM_PROMPT: &str = "Write a haiku about OpenAI.";
pub const DEFAULT_NAME: &str = "World";

/// Command line and environment configuration for a run
#[derive(Debug, Clone, Parser)]
#[command(name = "chat-ox-demo", version, about)]
pub struct Cli {
    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Model identifier for both requests
    #[arg(long, env = "CHAT_OX_MODEL", default_value = "gpt-5.2")]
    pub model: Model,

    /// Prompt for the blocking request
    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Prompt for the streaming request
    #[arg(long, default_value = DEFAULT_STREAM_PROMPT)]
    pub stream_prompt: String,

    /// Name substituted into the greeting
    #[arg(long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// Ask the provider for a trailing usage chunk on the stream
    #[arg(long)]
    pub include_usage: bool,
}

impl Cli {
    pub fn client(&self) -> Result<ChatClient, ChatError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ChatError::MissingApiKey)?;

        Ok(ChatClient::builder()
            .api_key(api_key)
            .base_url(self.base_url.as_str())
            .build())
    }

    pub fn completion_request(&self) -> ChatRequest {
        ChatRequest::builder()
            .model(self.model.clone())
            .user_message(self.prompt.as_str())
            .build()
    }

    pub fn stream_request(&self) -> ChatRequest {
        ChatRequest::builder()
            .model(self.model.clone())
            .user_message(self.stream_prompt.as_str())
            .maybe_stream_options(self.include_usage.then_some(StreamOptions { include_usage: true }))
            .build()
    }
}
