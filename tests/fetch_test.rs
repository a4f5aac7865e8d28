use quota_trend::fetch::{FetchConfig, MeteringClient};
use quota_trend::Error;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> FetchConfig {
    FetchConfig {
        endpoint: format!("{}/api/v1/gateway/limit", server.uri()),
        api_key: Some("test-key".to_string()),
        timeout_seconds: 5,
        ..FetchConfig::default()
    }
}

#[tokio::test]
async fn reads_points_from_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/gateway/limit"))
        .and(header("api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "success",
            "data": { "points": 4820 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reading = MeteringClient::new(&config(&server)).unwrap().fetch().await.unwrap();
    assert_eq!(reading.remaining, 4820);
    assert_eq!(reading.payload["msg"], "success");
}

#[tokio::test]
async fn minimal_payload_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "remaining": 12 })))
        .mount(&server)
        .await;

    let reading = MeteringClient::new(&config(&server)).unwrap().fetch().await.unwrap();
    assert_eq!(reading.remaining, 12);
}

#[tokio::test]
async fn missing_remaining_is_invalid_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "points": "lots" } })))
        .mount(&server)
        .await;

    let err = MeteringClient::new(&config(&server)).unwrap().fetch().await.unwrap_err();
    assert!(matches!(err, Error::InvalidSnapshot(_)));
}

#[tokio::test]
async fn non_json_body_is_invalid_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = MeteringClient::new(&config(&server)).unwrap().fetch().await.unwrap_err();
    assert!(matches!(err, Error::InvalidSnapshot(_)));
}

#[tokio::test]
async fn error_status_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = MeteringClient::new(&config(&server)).unwrap().fetch().await.unwrap_err();
    match err {
        Error::FetchStatus { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad key");
        }
        other => panic!("unexpected error: {other}"),
    }
}
