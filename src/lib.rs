use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod policy;
pub mod repository;
pub mod seed;
pub mod session;

// Routing by access tier (public, authenticated, admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use identity::{DirectoryIdentityProvider, IdentityState, RemoteIdentityProvider};
pub use repository::{InMemoryRepository, RepositoryState};
pub use session::{SessionState, SessionStore};

/// ApiDoc
///
/// OpenAPI document for the portal, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::logout, handlers::navigate, handlers::get_me,
        handlers::get_my_role, handlers::update_profile, handlers::get_feed,
        handlers::create_post, handlers::toggle_like, handlers::add_comment,
        handlers::apply_to_post_job, handlers::list_jobs, handlers::create_job,
        handlers::apply_to_job, handlers::get_job_stats, handlers::get_dashboard,
        handlers::get_admin_stats, handlers::list_users, handlers::list_pending_posts,
        handlers::approve_post, handlers::reject_post
    ),
    components(
        schemas(
            models::Role, models::User, models::Author, models::PostKind, models::Post,
            models::JobPost, models::Comment, models::LoginRequest, models::LoginResponse,
            models::CreatePostRequest, models::JobDetailsRequest, models::CreateCommentRequest,
            models::UpdateProfileRequest, models::LikeResponse, models::ApplicationResponse,
            models::NavItem, models::RoleInfo, models::UserProfile, models::DashboardKind,
            models::Dashboard, models::MemberDashboard, models::EnterpriseJobStats,
            models::AdminDashboardStats, models::NavigationResponse, policy::Page,
            policy::AccessDecision,
        )
    ),
    tags(
        (name = "portal", description = "Professional network portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The shared container for the portal's services and configuration, handed to every
/// handler. The session store lives here.
#[derive(Clone)]
pub struct AppState {
    /// Users, feed and job board.
    pub repo: RepositoryState,
    /// Credential verification.
    pub identity: IdentityState,
    /// Live login sessions.
    pub sessions: SessionState,
    pub config: AppConfig,
}

impl AppState {
    /// with_seed_data
    ///
    /// State backed by the seeded in-memory repository. Credentials are checked by the
    /// external identity service when `identity_url` is configured, otherwise against the
    /// seeded directory with the shared demo password.
    pub fn with_seed_data(config: AppConfig) -> Self {
        let repo = Arc::new(seed::seeded_repository()) as RepositoryState;
        let identity = match &config.identity_url {
            Some(url) => Arc::new(RemoteIdentityProvider::new(
                url,
                config.identity_api_key.clone(),
                repo.clone(),
            )) as IdentityState,
            None => Arc::new(DirectoryIdentityProvider::new(
                repo.clone(),
                seed::DEMO_PASSWORD,
            )) as IdentityState,
        };

        Self {
            repo,
            identity,
            sessions: Arc::new(SessionStore::new()),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated router. Extracting `AuthUser` rejects with 401 before the
/// handler runs when the request has no live session.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles all routers, applies the scoped auth layer and the global observability
/// layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin role is enforced inside each handler.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the request id so every log line of a request
/// can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
