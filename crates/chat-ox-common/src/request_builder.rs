use crate::{
    error::{self, CommonRequestError},
    streaming::SseParser,
};
use async_stream::try_stream;
use futures_util::stream::{self, BoxStream};
use reqwest::{Method, RequestBuilder as ReqwestRequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;

/// HTTP method for API endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Authentication method for API requests
#[derive(Clone)]
pub enum AuthMethod {
    /// Bearer token authentication (Authorization: Bearer <token>)
    Bearer(String),
    /// API key header (e.g., api-key: <key>)
    ApiKey { header_name: String, key: String },
    /// Query parameter authentication (e.g., ?key=<key>)
    QueryParam(String, String),
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer(***)"),
            Self::ApiKey { header_name, .. } => write!(f, "ApiKey({header_name}: ***)"),
            Self::QueryParam(name, _) => write!(f, "QueryParam({name}=***)"),
        }
    }
}

/// Represents an API endpoint with its configuration
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            extra_headers: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Configuration for request building
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub base_url: String,
    pub auth: Option<AuthMethod>,
    pub default_headers: HashMap<String, String>,
    pub user_agent: Option<String>,
}

impl RequestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: None,
            default_headers: HashMap::new(),
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Join the base URL and an endpoint path with exactly one slash
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Generic request builder that handles common HTTP patterns
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    /// Shared connection pool
    client: reqwest::Client,
    /// Base URL, auth and headers applied to every request
    config: RequestConfig,
}

impl RequestBuilder {
    pub fn new(client: reqwest::Client, config: RequestConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Build a reqwest RequestBuilder for the given endpoint
    pub fn build_request(&self, endpoint: &Endpoint) -> ReqwestRequestBuilder {
        let url = self.config.url_for(&endpoint.path);
        let mut req = self.client.request(endpoint.method.into(), &url);

        if let Some(ref auth) = self.config.auth {
            req = match auth {
                AuthMethod::Bearer(token) => req.bearer_auth(token),
                AuthMethod::ApiKey { header_name, key } => req.header(header_name, key),
                AuthMethod::QueryParam(param_name, value) => req.query(&[(param_name, value)]),
            };
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        if let Some(ref headers) = endpoint.extra_headers {
            for (key, value) in headers {
                req = req.header(key, value);
            }
        }

        if let Some(ref user_agent) = self.config.user_agent {
            req = req.header(reqwest::header::USER_AGENT, user_agent);
        }

        req
    }

    /// Execute a request with JSON body and return deserialized response
    pub async fn request_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<T, CommonRequestError> {
        let mut req = self.build_request(endpoint);

        if let Some(body) = body {
            let val = serde_json::to_value(body)?;
            tracing::trace!(path = %endpoint.path, payload = %val, "request body");
            req = req.json(&val);
        }

        tracing::debug!(method = ?endpoint.method, path = %endpoint.path, "sending request");
        let res = req.send().await?;
        Self::handle_response(res).await
    }

    /// Execute a streaming request
    ///
    /// The body must serialize to a JSON object; `"stream": true` is set on it
    /// before sending.
    pub fn stream<T, B>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> BoxStream<'static, Result<T, CommonRequestError>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        let payload = match body.map(serde_json::to_value).transpose() {
            Ok(Some(Value::Object(mut obj))) => {
                obj.insert("stream".to_string(), Value::Bool(true));
                Some(Value::Object(obj))
            }
            Ok(Some(other)) => {
                let err = CommonRequestError::InvalidEventData(format!(
                    "streaming body must be a JSON object, got {other}"
                ));
                return Box::pin(stream::once(async move { Err::<T, _>(err) }));
            }
            Ok(None) => None,
            Err(e) => {
                let err = CommonRequestError::from(e);
                return Box::pin(stream::once(async move { Err::<T, _>(err) }));
            }
        };

        let mut req = self.build_request(endpoint);
        if let Some(ref payload) = payload {
            tracing::trace!(path = %endpoint.path, payload = %payload, "stream body");
            req = req.json(payload);
        }
        let path = endpoint.path.clone();

        Box::pin(try_stream! {
            tracing::debug!(path = %path, "opening event stream");
            let response = req.send().await?;
            let status = response.status();

            if !status.is_success() {
                let bytes = response.bytes().await?;
                tracing::warn!(status = status.as_u16(), path = %path, "stream request rejected");
                Err(error::parse_error_response(status, &bytes))?;
            } else {
                let mut parser = SseParser::new(response);

                while let Some(event) = parser.next_event().await? {
                    yield event;
                }
                tracing::debug!(path = %path, "event stream finished");
            }
        })
    }

    /// Handle response and parse errors
    async fn handle_response<T: DeserializeOwned>(res: Response) -> Result<T, CommonRequestError> {
        let status = res.status();
        let bytes = res.bytes().await?;

        if status.is_success() {
            serde_json::from_slice::<T>(&bytes).map_err(|e| {
                CommonRequestError::UnexpectedResponse(format!(
                    "HTTP {} but failed to decode JSON: {}; body: {}",
                    status.as_u16(),
                    e,
                    String::from_utf8_lossy(&bytes)
                ))
            })
        } else {
            tracing::warn!(status = status.as_u16(), "request rejected");
            Err(error::parse_error_response(status, &bytes))
        }
    }
}
