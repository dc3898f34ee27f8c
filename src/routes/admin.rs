use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, put},
};

/// Admin Router Module
///
/// Moderation and oversight. Nested under `/admin`; every handler resolves the caller as
/// `AuthUser` and requires the 'admin' role before touching state, answering 403 with the
/// required and actual roles otherwise.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Users, posts, pending reviews, jobs, likes and live sessions.
        .route("/stats", get(handlers::get_admin_stats))
        // GET /admin/users
        .route("/users", get(handlers::list_users))
        // GET /admin/posts/pending
        // The moderation queue.
        .route("/posts/pending", get(handlers::list_pending_posts))
        // PUT /admin/posts/{id}/approve
        // pending -> approved. Idempotent.
        .route("/posts/{id}/approve", put(handlers::approve_post))
        // DELETE /admin/posts/{id}
        // pending -> deleted. Rejection removes the post for good.
        .route("/posts/{id}", delete(handlers::reject_post))
}
