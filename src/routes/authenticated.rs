use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Everything a signed-in member, enterprise or admin user does day to day. Role-specific
/// actions (posting jobs, applying) are checked inside the handlers against the
/// `AuthUser` resolved for the request.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Session & Profile ---
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::get_me))
        // Navigation items, badge and dashboard variant for the caller's role.
        .route("/me/role", get(handlers::get_my_role))
        .route("/profile", put(handlers::update_profile))
        .route("/dashboard", get(handlers::get_dashboard))
        // --- Feed ---
        // GET lists the caller's visible set; POST authors a post, job or announcement.
        .route("/feed", get(handlers::get_feed).post(handlers::create_post))
        .route("/feed/{id}/like", post(handlers::toggle_like))
        .route("/feed/{id}/comments", post(handlers::add_comment))
        // Toggle semantics, same as the job board.
        .route("/feed/{id}/apply", post(handlers::apply_to_post_job))
        // --- Job Board ---
        .route("/jobs", get(handlers::list_jobs).post(handlers::create_job))
        .route("/jobs/stats", get(handlers::get_job_stats))
        .route("/jobs/{id}/apply", post(handlers::apply_to_job))
}
