use campusctl::{ApiClient, ApiError, ClientConfig, Credentials, ErrorMode};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, error_mode: ErrorMode) -> ApiClient {
    let config = ClientConfig::new(server.uri()).with_error_mode(error_mode);
    ApiClient::new(config).expect("mock server URI should be a valid base")
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"username": "alice", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "abc123"})))
        .mount(server)
        .await;

    // Anything else is a bad password.
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(server)
        .await;
}

async fn mount_me_endpoint(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/me/"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "username": "alice",
            "school": {"name": "Northside High"}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_resolves_to_the_issued_body() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    let client = client_for(&server, ErrorMode::Passthrough);
    let credentials = Credentials::new("alice", "secret");
    let session = client.login(&credentials).await.expect("login should succeed");

    assert_eq!(session.access, "abc123");
    assert_eq!(serde_json::to_value(&session).unwrap(), json!({"access": "abc123"}));
}

#[tokio::test]
async fn login_keeps_refresh_token_and_extras() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a-1",
            "refresh": "r-1",
            "role": "teacher"
        })))
        .mount(&server)
        .await;

    let session = client_for(&server, ErrorMode::Passthrough)
        .login(&Credentials::new("bob", "hunter2"))
        .await
        .unwrap();
    assert_eq!(session.refresh.as_deref(), Some("r-1"));
    assert_eq!(session.extra.get("role"), Some(&json!("teacher")));
}

#[tokio::test]
async fn bad_credentials_pass_the_http_error_through() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    let error = client_for(&server, ErrorMode::Passthrough)
        .login(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();

    let ApiError::Http(ref inner) = error else {
        panic!("expected passthrough error, got {error:?}");
    };
    assert_eq!(inner.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(error.is_unauthorized());
}

#[tokio::test]
async fn bad_credentials_classify_as_unauthorized() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    let error = client_for(&server, ErrorMode::Classified)
        .login(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();

    match error {
        ApiError::Unauthorized { status, body } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body.contains("No active account"));
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn current_user_returns_profile_for_valid_token() {
    let server = MockServer::start().await;
    mount_me_endpoint(&server).await;

    let profile = client_for(&server, ErrorMode::Passthrough)
        .current_user("abc123")
        .await
        .expect("profile should load");

    assert_eq!(profile.get_str("username"), Some("alice"));
    assert_eq!(profile.get("school"), Some(&json!({"name": "Northside High"})));
}

#[tokio::test]
async fn expired_token_is_a_401_in_both_modes() {
    let server = MockServer::start().await;
    mount_me_endpoint(&server).await;

    for mode in [ErrorMode::Passthrough, ErrorMode::Classified] {
        let error = client_for(&server, mode)
            .current_user("expired")
            .await
            .unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED), "{mode:?}");
        assert!(error.is_unauthorized());
    }
}

#[tokio::test]
async fn authorization_header_is_exactly_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server, ErrorMode::Passthrough)
        .current_user("tok.en-value")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let authorization = requests[0]
        .headers
        .get("authorization")
        .expect("authorization header should be sent");
    assert_eq!(authorization.to_str().unwrap(), "Bearer tok.en-value");
}

#[tokio::test]
async fn login_sends_no_authorization_header() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    client_for(&server, ErrorMode::Passthrough)
        .login(&Credentials::new("alice", "secret"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn server_errors_classify_by_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, ErrorMode::Classified);

    let credentials = Credentials::new("alice", "secret");
    match client.login(&credentials).await.unwrap_err() {
        ApiError::Server { status, body } => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Server, got {other:?}"),
    }

    let error = client.current_user("abc123").await.unwrap_err();
    assert!(matches!(error, ApiError::Rejected { status, .. } if status == StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Grab a free port, then release it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let passthrough = ApiClient::new(ClientConfig::new(uri.as_str())).unwrap();
    let error = passthrough
        .login(&Credentials::new("alice", "secret"))
        .await
        .unwrap_err();
    assert!(matches!(error, ApiError::Http(_)), "got {error:?}");
    assert_eq!(error.status(), None);

    let classified =
        ApiClient::new(ClientConfig::new(uri.as_str()).with_error_mode(ErrorMode::Classified))
            .unwrap();
    let error = classified.current_user("abc123").await.unwrap_err();
    assert!(matches!(error, ApiError::Network(_)), "got {error:?}");
}

#[tokio::test]
async fn every_call_is_one_request_and_clones_share_nothing_else() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "abc123"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, ErrorMode::Passthrough);
    let other = client.clone();

    let credentials = Credentials::new("alice", "secret");
    let (first, second, third, fourth) = tokio::join!(
        client.login(&credentials),
        other.login(&credentials),
        client.current_user("abc123"),
        other.current_user("abc123"),
    );
    assert_eq!(first.unwrap().access, "abc123");
    assert_eq!(second.unwrap().access, "abc123");
    assert_eq!(third.unwrap(), fourth.unwrap());
}
