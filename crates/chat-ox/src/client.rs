use bon::Builder;
use chat_ox_common::BoxStream;
use std::time::Duration;

use crate::{
    ChatCompletionChunk, ChatError, ChatRequest, ChatResponse, ChatStream,
    internal::ChatRequestHelper,
    request::ChatRequestBuilder,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

fn default_user_agent() -> String {
    format!("chat-ox/{}", env!("CARGO_PKG_VERSION"))
}

fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Client for OpenAI-compatible chat completion endpoints
#[derive(Clone, Builder)]
pub struct ChatClient {
    /// API key for authentication
    #[builder(into)]
    api_key: String,

    /// Base URL for the API (allows for custom endpoints)
    #[builder(default = DEFAULT_BASE_URL.to_string(), into)]
    base_url: String,

    /// HTTP client for making requests
    #[builder(default = default_http_client())]
    http_client: reqwest::Client,

    #[builder(default = default_user_agent(), into)]
    user_agent: String,
}

impl ChatClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder().api_key(api_key).build()
    }

    /// Create a new client from `OPENAI_API_KEY`, honouring `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self, ChatError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ChatError::MissingApiKey)?;

        let client = Self::new(api_key);
        Ok(match std::env::var(BASE_URL_ENV) {
            Ok(base_url) if !base_url.trim().is_empty() => client.with_base_url(base_url),
            _ => client,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a chat request builder
    pub fn chat(&self) -> ChatRequestBuilder {
        ChatRequest::builder()
    }

    fn request_helper(&self) -> ChatRequestHelper {
        ChatRequestHelper::new(
            self.http_client.clone(),
            &self.base_url,
            &self.api_key,
            &self.user_agent,
        )
    }

    fn ensure_api_key(&self) -> Result<(), ChatError> {
        if self.api_key.trim().is_empty() {
            Err(ChatError::MissingApiKey)
        } else {
            Ok(())
        }
    }

    /// Send a chat request and wait for the whole response
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.ensure_api_key()?;
        tracing::debug!(model = %request.model, messages = request.messages.len(), "chat completion");

        let response = self.request_helper().send_chat_request(request).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens(),
                completion_tokens = usage.completion_tokens(),
                total_tokens = usage.total_tokens(),
                "chat completion usage"
            );
        }
        Ok(response)
    }

    /// Send a chat request and get a streaming response
    pub fn stream(
        &self,
        request: &ChatRequest,
    ) -> BoxStream<'static, Result<ChatCompletionChunk, ChatError>> {
        if let Err(err) = self.ensure_api_key() {
            return Box::pin(futures_util::stream::once(async move {
                Err::<ChatCompletionChunk, _>(err)
            }));
        }
        tracing::debug!(model = %request.model, messages = request.messages.len(), "streaming chat completion");

        self.request_helper().stream_chat_request(request)
    }

    /// Same as [`ChatClient::stream`], wrapped for pull-style consumption
    pub fn chat_stream(&self, request: &ChatRequest) -> ChatStream {
        ChatStream::new(self.stream(request))
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}
