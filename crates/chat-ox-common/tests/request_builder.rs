use chat_ox_common::{
    AuthMethod, CommonRequestError, Endpoint, HttpMethod, RequestBuilder, RequestConfig,
};
use futures_util::StreamExt;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

fn builder_for(server: &MockServer, auth: AuthMethod) -> RequestBuilder {
    let config = RequestConfig::new(format!("{}/v1/", server.uri()))
        .with_auth(auth)
        .with_user_agent("chat-ox-test");
    RequestBuilder::new(reqwest::Client::new(), config)
}

#[test]
fn test_endpoint_creation() {
    let endpoint = Endpoint::new("chat/completions", HttpMethod::Post);
    assert_eq!(endpoint.path, "chat/completions");
    assert_eq!(endpoint.method, HttpMethod::Post);
    assert!(endpoint.extra_headers.is_none());

    let endpoint = endpoint.with_header("openai-organization", "org-1");
    assert_eq!(
        endpoint.extra_headers.unwrap().get("openai-organization").map(String::as_str),
        Some("org-1")
    );
}

#[test]
fn test_url_joining_tolerates_slashes() {
    let config = RequestConfig::new("https://api.example.com/v1/");
    assert_eq!(
        config.url_for("/chat/completions"),
        "https://api.example.com/v1/chat/completions"
    );
    assert_eq!(
        RequestConfig::new("https://api.example.com/v1").url_for("models"),
        "https://api.example.com/v1/models"
    );
}

#[test]
fn test_auth_debug_hides_secrets() {
    let auth = AuthMethod::Bearer("sk-secret".to_string());
    assert!(!format!("{auth:?}").contains("sk-secret"));

    let auth = AuthMethod::ApiKey {
        header_name: "api-key".to_string(),
        key: "sk-secret".to_string(),
    };
    assert_eq!(format!("{auth:?}"), "ApiKey(api-key: ***)");
}

#[tokio::test]
async fn test_request_json_sends_bearer_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("user-agent", "chat-ox-test"))
        .and(body_partial_json(json!({"model": "gpt-5.2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let builder = builder_for(&server, AuthMethod::Bearer("sk-test".to_string()));
    let endpoint = Endpoint::new("/chat/completions", HttpMethod::Post);
    let value: Value = builder
        .request_json(&endpoint, Some(&json!({"model": "gpt-5.2"})))
        .await
        .unwrap();

    assert_eq!(value["ok"], true);
}

#[tokio::test]
async fn test_query_param_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(query_param("key", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let builder = builder_for(&server, AuthMethod::QueryParam("key".to_string(), "abc".to_string()));
    let value: Value = builder
        .request_json(&Endpoint::new("models", HttpMethod::Get), None::<&()>)
        .await
        .unwrap();

    assert!(value["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests", "code": "rate_limit_exceeded"}
        })))
        .mount(&server)
        .await;

    let builder = builder_for(&server, AuthMethod::Bearer("sk-test".to_string()));
    let err = builder
        .request_json::<Value, _>(
            &Endpoint::new("chat/completions", HttpMethod::Post),
            Some(&json!({})),
        )
        .await
        .unwrap_err();

    match err {
        CommonRequestError::Api { status, message, code, .. } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit reached");
            assert_eq!(code.as_deref(), Some("rate_limit_exceeded"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let builder = builder_for(&server, AuthMethod::Bearer("sk-test".to_string()));
    let err = builder
        .request_json::<Value, _>(
            &Endpoint::new("chat/completions", HttpMethod::Post),
            Some(&json!({})),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CommonRequestError::UnexpectedResponse(ref body) if body.contains("not json")));
}

#[tokio::test]
async fn test_stream_sets_stream_flag_and_yields_events() {
    let server = MockServer::start().await;
    let sse = "data: {\"n\":1}\n\n: ping\n\ndata: {\"n\":2}\n\ndata: [DONE]\n\n";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"stream": true, "model": "m"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let builder = builder_for(&server, AuthMethod::Bearer("sk-test".to_string()));
    let endpoint = Endpoint::new("chat/completions", HttpMethod::Post);
    let events: Vec<Value> = builder
        .stream(&endpoint, Some(&json!({"model": "m"})))
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(events, vec![json!({"n": 1}), json!({"n": 2})]);
}

#[tokio::test]
async fn test_stream_rejects_non_object_body() {
    let server = MockServer::start().await;
    let builder = builder_for(&server, AuthMethod::Bearer("sk-test".to_string()));
    let endpoint = Endpoint::new("chat/completions", HttpMethod::Post);

    let mut stream = builder.stream::<Value, _>(&endpoint, Some(&json!([1, 2])));
    let first = stream.next().await.unwrap();
    assert!(matches!(first, Err(CommonRequestError::InvalidEventData(_))));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_stream_error_status_ends_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let builder = builder_for(&server, AuthMethod::Bearer("sk-bad".to_string()));
    let endpoint = Endpoint::new("chat/completions", HttpMethod::Post);
    let mut stream = builder.stream::<Value, _>(&endpoint, Some(&json!({})));

    let first = stream.next().await.unwrap();
    assert_eq!(first.unwrap_err().status(), Some(401));
    assert!(stream.next().await.is_none());
}
