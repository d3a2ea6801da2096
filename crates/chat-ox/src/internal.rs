use chat_ox_common::{
    AuthMethod, BoxStream, CommonRequestError, Endpoint, HttpMethod, RequestBuilder, RequestConfig,
};
use futures_util::StreamExt;

use crate::{ChatCompletionChunk, ChatError, ChatRequest, ChatResponse};

const CHAT_COMPLETIONS: &str = "chat/completions";

/// Chat endpoint calls on top of the shared RequestBuilder
pub(crate) struct ChatRequestHelper {
    request_builder: RequestBuilder,
}

impl ChatRequestHelper {
    pub(crate) fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        user_agent: &str,
    ) -> Self {
        let config = RequestConfig::new(base_url)
            .with_auth(AuthMethod::Bearer(api_key.to_string()))
            .with_user_agent(user_agent);

        Self {
            request_builder: RequestBuilder::new(client, config),
        }
    }

    pub(crate) async fn send_chat_request(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ChatError> {
        let endpoint = Endpoint::new(CHAT_COMPLETIONS, HttpMethod::Post);
        Ok(self
            .request_builder
            .request_json(&endpoint, Some(request))
            .await?)
    }

    pub(crate) fn stream_chat_request(
        &self,
        request: &ChatRequest,
    ) -> BoxStream<'static, Result<ChatCompletionChunk, ChatError>> {
        let endpoint = Endpoint::new(CHAT_COMPLETIONS, HttpMethod::Post);
        self.request_builder
            .stream(&endpoint, Some(request))
            .map(|item: Result<ChatCompletionChunk, CommonRequestError>| item.map_err(ChatError::from))
            .boxed()
    }
}
