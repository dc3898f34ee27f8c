use portal::{
    AppConfig, AppState, create_router,
    models::{LoginResponse, Post, UserProfile},
    seed::{ADMIN_ID, MEMBER_ID},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    let config = AppConfig {
        dev_auth_bypass: true,
        ..AppConfig::default()
    };
    let state = AppState::with_seed_data(config);
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    async fn login(&self, email: &str) -> LoginResponse {
        let response = self
            .client
            .post(format!("{}/login", self.address))
            .json(&json!({ "email": email, "password": "demo123" }))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    async fn navigate(&self, token: Option<&str>, path: &str) -> Value {
        let mut request = self
            .client
            .get(format!("{}/navigate", self.address))
            .query(&[("path", path)]);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    async fn feed(&self, token: &str) -> Vec<Post> {
        let response = self
            .client
            .get(format!("{}/feed", self.address))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let doc: Value = response.json().await.unwrap();
    assert!(doc["paths"]["/navigate"].is_object());
    assert!(doc["paths"]["/admin/posts/{id}/approve"].is_object());
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = spawn_app().await;
    let response = app
        .client
        .post(format!("{}/login", app.address))
        .json(&json!({ "email": "ca@demo.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(
        body["error"]["message"],
        "Invalid credentials. Use demo emails with password: demo123"
    );
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let app = spawn_app().await;
    let login = app.login("Admin@Demo.com").await;
    assert_eq!(login.user.id, ADMIN_ID);
}

#[tokio::test]
async fn test_navigation_without_session_renders_login() {
    let app = spawn_app().await;
    let body = app.navigate(None, "/feed").await;
    assert_eq!(body["decision"]["outcome"], "render_login");
}

#[tokio::test]
async fn test_admin_navigating_to_network_is_denied() {
    let app = spawn_app().await;
    let login = app.login("admin@demo.com").await;

    let body = app.navigate(Some(&login.token), "/network").await;

    assert_eq!(body["decision"]["outcome"], "access_denied");
    assert_eq!(body["decision"]["required_role"], "ca");
    assert_eq!(body["decision"]["actual_role"], "admin");
    assert_eq!(body["message"], "Required role: ca | Your role: admin");
}

#[tokio::test]
async fn test_navigation_renders_allowed_and_unknown_pages() {
    let app = spawn_app().await;
    let login = app.login("enterprise@demo.com").await;

    let body = app.navigate(Some(&login.token), "/candidates").await;
    assert_eq!(body["decision"]["outcome"], "render_page");
    assert_eq!(body["decision"]["page"], "candidates");

    let body = app.navigate(Some(&login.token), "/does-not-exist").await;
    assert_eq!(body["decision"]["outcome"], "not_found");
}

#[tokio::test]
async fn test_member_post_is_hidden_until_approved() {
    let app = spawn_app().await;
    let member = app.login("ca@demo.com").await;
    let enterprise = app.login("enterprise@demo.com").await;
    let admin = app.login("admin@demo.com").await;

    let response = app
        .client
        .post(format!("{}/feed", app.address))
        .bearer_auth(&member.token)
        .json(&json!({ "content": "Hello network", "type": "post" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Post = response.json().await.unwrap();
    assert!(!created.is_approved);

    // Invisible to other roles, visible to the admin.
    assert!(app.feed(&enterprise.token).await.iter().all(|p| p.id != created.id));
    assert!(app.feed(&admin.token).await.iter().any(|p| p.id == created.id));

    let response = app
        .client
        .put(format!("{}/admin/posts/{}/approve", app.address, created.id))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let feed = app.feed(&enterprise.token).await;
    assert_eq!(feed[0].id, created.id);
}

#[tokio::test]
async fn test_enterprise_job_post_is_visible_immediately() {
    let app = spawn_app().await;
    let enterprise = app.login("enterprise@demo.com").await;
    let member = app.login("ca@demo.com").await;

    let response = app
        .client
        .post(format!("{}/feed", app.address))
        .bearer_auth(&enterprise.token)
        .json(&json!({
            "content": "We are hiring",
            "type": "job",
            "job": {
                "title": "Audit Manager",
                "location": "Pune",
                "description": "Lead audits",
                "requirements": "CA qualification\n\n5 years experience"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Post = response.json().await.unwrap();
    assert!(created.is_approved);
    let job = created.job.as_ref().unwrap();
    assert_eq!(job.company, "TechCorp India");
    assert_eq!(job.requirements.len(), 2);

    let feed = app.feed(&member.token).await;
    assert_eq!(feed[0].id, created.id);

    // The member applies from the feed card, then withdraws.
    let apply_url = format!("{}/feed/{}/apply", app.address, created.id);
    let first: Value = app
        .client
        .post(&apply_url)
        .bearer_auth(&member.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["applied"], true);
    let second: Value = app
        .client
        .post(&apply_url)
        .bearer_auth(&member.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["applied"], false);
    assert_eq!(second["applicant_count"], 0);
}

#[tokio::test]
async fn test_member_cannot_post_job_to_board() {
    let app = spawn_app().await;
    let member = app.login("ca@demo.com").await;

    let response = app
        .client
        .post(format!("{}/jobs", app.address))
        .bearer_auth(&member.token)
        .json(&json!({ "title": "X", "location": "Y", "description": "Z" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"]["message"],
        "Required role: enterprise | Your role: ca"
    );
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = spawn_app().await;
    let login = app.login("ca@demo.com").await;

    let me = app
        .client
        .get(format!("{}/me", app.address))
        .bearer_auth(&login.token)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 200);
    let profile: UserProfile = me.json().await.unwrap();
    assert_eq!(profile.user.id, MEMBER_ID);
    assert_eq!(profile.role_info.badge_label, "CA Member");

    let response = app
        .client
        .post(format!("{}/logout", app.address))
        .bearer_auth(&login.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = app
        .client
        .get(format!("{}/me", app.address))
        .bearer_auth(&login.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Navigation falls back to the login view.
    let body = app.navigate(Some(&login.token), "/feed").await;
    assert_eq!(body["decision"]["outcome"], "render_login");
}

#[tokio::test]
async fn test_authenticated_routes_reject_anonymous_callers() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/feed", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .get(format!("{}/admin/stats", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_admin_routes_forbid_other_roles() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/admin/users", app.address))
        .header("x-user-id", MEMBER_ID.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = app
        .client
        .get(format!("{}/admin/users", app.address))
        .header("x-user-id", ADMIN_ID.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let users: Vec<Value> = response.json().await.unwrap();
    assert_eq!(users.len(), 5);
}

#[tokio::test]
async fn test_admin_stats_count_live_sessions() {
    let app = spawn_app().await;
    let admin = app.login("admin@demo.com").await;
    app.login("ca@demo.com").await;

    let stats: Value = app
        .client
        .get(format!("{}/admin/stats", app.address))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["active_sessions"], 2);
    assert_eq!(stats["total_users"], 5);
    assert_eq!(stats["total_jobs"], 3);
}
