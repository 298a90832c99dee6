use accounts::config::Config;
use accounts::services::{JwtTokenIssuer, TokenIssuer};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-signing-secret";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.jwt_secret = TEST_SECRET.to_string();
    // Keep Argon2 cheap so the suite stays fast
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app_with_config(config: Config) -> Router {
    let state = accounts::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    accounts::api::router(state)
}

async fn spawn_app() -> Router {
    spawn_app_with_config(test_config()).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, body_json)
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "POST",
        "/users/register",
        serde_json::json!({ "username": username, "password": password }),
    )
    .await
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "POST",
        "/users/login",
        serde_json::json!({ "username": username, "password": password }),
    )
    .await
}

async fn rename(app: &Router, username: &str, new_username: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "PUT",
        &format!("/users/{username}"),
        serde_json::json!({ "newUsername": new_username }),
    )
    .await
}

#[tokio::test]
async fn test_account_lifecycle() {
    let app = spawn_app().await;

    let (status, body) = register(&app, "alice", "pw1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    let (status, body) = register(&app, "alice", "pw2").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    let (status, body) = login(&app, "alice", "pw1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, _) = login(&app, "alice", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = rename(&app, "alice", "alice2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User profile updated successfully");

    let (status, body) = login(&app, "alice2", "pw1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_token_carries_username_claim() {
    let app = spawn_app().await;
    register(&app, "carol", "hunter2").await;

    let (status, body) = login(&app, "carol", "hunter2").await;
    assert_eq!(status, StatusCode::OK);

    let issuer = JwtTokenIssuer::new(TEST_SECRET, 3600).unwrap();
    let claims = issuer.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.username, "carol");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = spawn_app().await;
    register(&app, "dave", "pw").await;

    let (wrong_status, wrong_body) = login(&app, "dave", "nope").await;
    let (unknown_status, unknown_body) = login(&app, "nobody", "pw").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid username or password");
}

#[tokio::test]
async fn test_old_username_stops_working_after_rename() {
    let app = spawn_app().await;
    register(&app, "erin", "pw").await;
    rename(&app, "erin", "erin2").await;

    let (status, _) = login(&app, "erin", "pw").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The old name is free again
    let (status, _) = register(&app, "erin", "other").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_rename_unknown_user_still_succeeds() {
    let app = spawn_app().await;

    let (status, _) = rename(&app, "ghost", "someone").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "someone", "anything").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rename_onto_existing_user_conflicts() {
    let app = spawn_app().await;
    register(&app, "frank", "pw-frank").await;
    register(&app, "grace", "pw-grace").await;

    let (status, body) = rename(&app, "frank", "grace").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    let (status, _) = login(&app, "frank", "pw-frank").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = login(&app, "grace", "pw-grace").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_fields_are_bad_requests() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/register",
        serde_json::json!({ "username": "heidi" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "password is required");

    let (status, _) = login(&app, "", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "PUT", "/users/heidi", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "newUsername is required");
}

#[tokio::test]
async fn test_concurrent_registrations_create_one_account() {
    // One connection serializes SQLite writes; the lookups can still all run
    // before the first insert, leaving the unique index to decide.
    let mut config = test_config();
    config.general.max_db_connections = 1;
    let app = spawn_app_with_config(config).await;

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move { register(&app, "ivan", &format!("pw-{i}")).await.0 })
        })
        .collect();

    let mut created = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => {}
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(created, 1);
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["status"], "ok");
}

#[tokio::test]
async fn test_app_state_requires_secret() {
    let mut config = test_config();
    config.security.jwt_secret = String::new();

    assert!(accounts::api::create_app_state(config, None).await.is_err());
}
