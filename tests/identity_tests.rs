use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use portal::{
    identity::{AuthError, DirectoryIdentityProvider, IdentityProvider, RemoteIdentityProvider},
    repository::RepositoryState,
    seed::{self, ENTERPRISE_ID, MEMBER_ID},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

fn seeded_repo() -> RepositoryState {
    Arc::new(seed::seeded_repository())
}

// --- Directory ---

#[tokio::test]
async fn test_directory_accepts_shared_password() {
    let provider = DirectoryIdentityProvider::new(seeded_repo(), seed::DEMO_PASSWORD);
    let user = provider
        .verify_credentials("ca@demo.com", "demo123")
        .await
        .unwrap();
    assert_eq!(user.id, MEMBER_ID);
}

#[tokio::test]
async fn test_directory_rejects_bad_credentials() {
    let provider = DirectoryIdentityProvider::new(seeded_repo(), seed::DEMO_PASSWORD);

    assert_eq!(
        provider.verify_credentials("ca@demo.com", "demo124").await,
        Err(AuthError::InvalidCredentials)
    );
    assert_eq!(
        provider.verify_credentials("ghost@demo.com", "demo123").await,
        Err(AuthError::InvalidCredentials)
    );
}

// --- Remote ---

// Stand-in for the external service: accepts any known address with password "remote-pass".
async fn token_endpoint(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some("anon-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "no api key" })));
    }
    if body["password"] != "remote-pass" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "access_token": "upstream",
            "user": { "id": "abc", "email": body["email"] }
        })),
    )
}

async fn spawn_identity_service(fail: bool) -> String {
    let router = if fail {
        Router::new().route(
            "/auth/v1/token",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        )
    } else {
        Router::new().route("/auth/v1/token", post(token_endpoint))
    };

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}/", port)
}

#[tokio::test]
async fn test_remote_maps_confirmed_email_to_local_user() {
    let base = spawn_identity_service(false).await;
    let provider = RemoteIdentityProvider::new(&base, Some("anon-key".to_string()), seeded_repo());

    let user = provider
        .verify_credentials("enterprise@demo.com", "remote-pass")
        .await
        .unwrap();

    assert_eq!(user.id, ENTERPRISE_ID);
}

#[tokio::test]
async fn test_remote_rejects_wrong_password() {
    let base = spawn_identity_service(false).await;
    let provider = RemoteIdentityProvider::new(&base, Some("anon-key".to_string()), seeded_repo());

    let result = provider.verify_credentials("ca@demo.com", "demo123").await;

    assert_eq!(result, Err(AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_remote_rejects_account_unknown_locally() {
    let base = spawn_identity_service(false).await;
    let provider = RemoteIdentityProvider::new(&base, Some("anon-key".to_string()), seeded_repo());

    let result = provider
        .verify_credentials("stranger@example.com", "remote-pass")
        .await;

    assert_eq!(result, Err(AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_remote_outage_is_not_a_credential_error() {
    let base = spawn_identity_service(true).await;
    let provider = RemoteIdentityProvider::new(&base, None, seeded_repo());

    let result = provider.verify_credentials("ca@demo.com", "x").await;

    assert!(matches!(result, Err(AuthError::Unavailable(_))));
}
