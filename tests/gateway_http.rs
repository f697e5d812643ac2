use meetink::config::{ClientConfig, GRAPHQL_TIMEOUT_VAR, GRAPHQL_URL_VAR};
use meetink::{ClientError, ConfessionsApi, Gateway, GraphqlClient};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server() -> (MockServer, GraphqlClient) {
    let mock_server = MockServer::start().await;
    let client = GraphqlClient::with_endpoint(format!("{}/graphql", mock_server.uri()));
    (mock_server, client)
}

#[tokio::test]
async fn posts_document_and_variables_as_json() {
    let (mock_server, client) = server().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"query": "query Q { hello }", "variables": {"x": 1}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"hello": "Hello World"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let data = client.request("query Q { hello }", Some(json!({"x": 1}))).await.unwrap();
    assert_eq!(data, json!({"hello": "Hello World"}));
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let (mock_server, client) = server().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let err = client.request("{ hello }", None).await.unwrap_err();
    match &err {
        ClientError::Transport { status, body } => {
            assert_eq!(*status, Some(503));
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "GraphQL request failed: 503 upstream down");
}

#[tokio::test]
async fn graphql_errors_are_concatenated() {
    let (mock_server, client) = server().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"errors": [{"message": "bad"}, {"message": "worse"}]})),
        )
        .mount(&mock_server)
        .await;

    let err = client.request("{ hello }", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(ref m) if m == "bad | worse"));
    assert_eq!(err.to_string(), "bad | worse");
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    // bind then release a port so nothing is listening on it
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let client = GraphqlClient::with_endpoint(format!("http://127.0.0.1:{port}/graphql"));
    let err = client.request("{ hello }", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { status: None, .. }));
}

#[tokio::test]
#[serial_test::serial]
async fn slow_backend_hits_configured_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"ok": true}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    std::env::set_var(GRAPHQL_URL_VAR, mock_server.uri());
    std::env::set_var(GRAPHQL_TIMEOUT_VAR, "1");
    let cfg = ClientConfig::from_env();
    std::env::remove_var(GRAPHQL_URL_VAR);
    std::env::remove_var(GRAPHQL_TIMEOUT_VAR);
    assert_eq!(cfg.timeout, Some(Duration::from_secs(1)));

    let err = GraphqlClient::with_config(&cfg).request("{ ok }", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { status: None, .. }), "got {err:?}");
}

#[tokio::test]
#[serial_test::serial]
async fn missing_endpoint_fails_fast() {
    std::env::remove_var(GRAPHQL_URL_VAR);
    let err = GraphqlClient::from_env().request("{ hello }", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Configuration(_)));

    std::env::set_var(GRAPHQL_URL_VAR, "  ");
    let err = GraphqlClient::from_env().request("{ hello }", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Configuration(_)));
    std::env::remove_var(GRAPHQL_URL_VAR);
}

#[tokio::test]
#[serial_test::serial]
async fn endpoint_is_read_at_call_time() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .mount(&mock_server)
        .await;

    std::env::remove_var(GRAPHQL_URL_VAR);
    let client = GraphqlClient::from_env();
    std::env::set_var(GRAPHQL_URL_VAR, mock_server.uri());
    let data = client.request("{ ok }", None).await.unwrap();
    assert_eq!(data["ok"], true);
    std::env::remove_var(GRAPHQL_URL_VAR);
}

#[tokio::test]
async fn typed_operations_decode_backend_payloads() {
    let (mock_server, client) = server().await;
    let confession = json!({
        "id": "65f0c0ffee", "content": "I still have my library book from first year",
        "category": "Secret", "likes": 12, "gender": "other",
        "anonymousName": "Velvet Wanderer", "avatarSeed": 1,
        "createdAt": "2025-03-01T10:00:00+00:00",
        "comments": [{
            "id": "c1", "content": "same", "gender": "female",
            "anonymousName": "Cosmic Wanderer", "avatarSeed": 0,
            "createdAt": "2025-03-01T11:00:00"
        }]
    });
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("confessionsByCategory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"confessionsByCategory": [confession]}})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("likeConfession"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"likeConfession": 13}})))
        .mount(&mock_server)
        .await;

    let api = ConfessionsApi::new(Arc::new(client));
    let list = api.confessions_by_category(meetink::models::CategoryFilter::Only(meetink::models::Category::Secret)).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].comments.len(), 1);
    assert_eq!(list[0].identity().avatar_url, "https://avatar.iran.liara.run/public/boy?username=1");
    assert_eq!(list[0].comments[0].identity().avatar_url, "https://avatar.iran.liara.run/public/girl?username=0");

    assert_eq!(api.like_confession("65f0c0ffee").await.unwrap(), 13);
}
