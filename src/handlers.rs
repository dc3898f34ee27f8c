use crate::{
    AppState,
    auth::{AuthUser, issue_token},
    error::{AppError, Result},
    models::{
        self, AdminDashboardStats, ApplicationResponse, Comment, CreateCommentRequest,
        CreatePostRequest, Dashboard, DashboardKind, EnterpriseJobStats, JobDetailsRequest,
        JobPost, LikeResponse, LoginRequest, LoginResponse, MemberDashboard, NavigationResponse,
        Post, PostKind, Role, RoleInfo, UpdateProfileRequest, User, UserProfile,
    },
    policy,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// NavigateQuery
///
/// The client-side path being navigated to, e.g. `/network`.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct NavigateQuery {
    pub path: String,
}

/// FeedFilter
///
/// Optional narrowing of the feed to a single post kind.
#[derive(Deserialize, Default, utoipa::IntoParams)]
pub struct FeedFilter {
    #[serde(rename = "type")]
    pub kind: Option<PostKind>,
}

// --- Shared Helpers ---

const MISSING_FIELDS: &str = "Please fill in all required fields";

// The caller's directory entry. A valid session whose user has vanished is treated as
// signed out.
async fn current_user(state: &AppState, user: &AuthUser) -> Result<User> {
    state
        .repo
        .get_user(user.id)
        .await
        .ok_or(AppError::Unauthorized)
}

// Fetches a post the caller is allowed to see. Hidden posts are reported as missing.
async fn visible_post(state: &AppState, user: &AuthUser, id: Uuid) -> Result<Post> {
    state
        .repo
        .get_post(id)
        .await
        .filter(|post| policy::can_view(user.role, post))
        .ok_or(AppError::NotFound("Post"))
}

/// Validates job form fields and builds the posting on behalf of `poster`.
/// Requirements are entered one per line; blank lines are dropped.
pub fn build_job(poster: &User, req: JobDetailsRequest) -> Result<JobPost> {
    let title = req.title.trim();
    let location = req.location.trim();
    let description = req.description.trim();
    if title.is_empty() || location.is_empty() || description.is_empty() {
        return Err(AppError::Validation(MISSING_FIELDS.to_string()));
    }

    Ok(JobPost {
        id: Uuid::new_v4(),
        title: title.to_string(),
        company: poster
            .company
            .clone()
            .unwrap_or_else(|| "Company".to_string()),
        location: location.to_string(),
        description: description.to_string(),
        requirements: req
            .requirements
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        posted_by: poster.name.clone(),
        poster_id: Some(poster.id),
        posted_at: Utc::now(),
        applicants: Vec::new(),
    })
}

/// Posting statistics for an enterprise user's own listings.
pub fn enterprise_stats(jobs: &[JobPost], poster_id: Uuid, now: DateTime<Utc>) -> EnterpriseJobStats {
    let week_ago = now - Duration::days(7);
    let own: Vec<&JobPost> = jobs
        .iter()
        .filter(|job| job.poster_id == Some(poster_id))
        .collect();

    EnterpriseJobStats {
        active_postings: own.len(),
        total_applicants: own.iter().map(|job| job.applicants.len()).sum(),
        posted_this_week: own.iter().filter(|job| job.posted_at > week_ago).count(),
    }
}

fn application_response(job: JobPost, user_id: Uuid) -> ApplicationResponse {
    ApplicationResponse {
        applied: job.has_applied(user_id),
        applicant_count: job.applicants.len(),
        job,
    }
}

// --- Session Handlers ---

/// login
///
/// [Public Route] Verifies credentials with the configured identity provider and opens a
/// session. On failure no session is created and the user must resubmit.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = match state
        .identity
        .verify_credentials(&payload.email, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(email = %payload.email, "login rejected: {}", e);
            return Err(e.into());
        }
    };

    let session = state
        .sessions
        .create(user.id, state.config.session_ttl_secs)
        .await;
    let token = issue_token(&state.config, &session)?;

    tracing::info!(user_id = %user.id, role = %user.role, "session opened");

    Ok(Json(LoginResponse {
        token,
        user,
        expires_at: session.expires_at,
    }))
}

/// logout
///
/// [Authenticated Route] Revokes the caller's session; the token stops working immediately.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(user: AuthUser, State(state): State<AppState>) -> StatusCode {
    if let Some(session_id) = user.session_id {
        state.sessions.revoke(session_id).await;
        tracing::info!(user_id = %user.id, "session closed");
    }
    StatusCode::NO_CONTENT
}

/// navigate
///
/// [Public Route] Route guard for the client. Answers which view to render for `path`
/// given the caller's session, re-evaluated on every navigation. An access-denied outcome
/// is a normal 200 response, not an error.
#[utoipa::path(
    get,
    path = "/navigate",
    params(NavigateQuery),
    responses((status = 200, description = "Navigation decision", body = NavigationResponse))
)]
pub async fn navigate(
    user: Option<AuthUser>,
    Query(query): Query<NavigateQuery>,
) -> Json<NavigationResponse> {
    let decision = policy::navigate(user.map(|u| u.role), &query.path);
    Json(NavigationResponse {
        message: decision.message(),
        path: query.path,
        decision,
    })
}

// --- Profile Handlers ---

/// get_me
///
/// [Authenticated Route] The signed-in user with their role descriptor.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> Result<Json<UserProfile>> {
    let record = current_user(&state, &user).await?;
    Ok(Json(UserProfile {
        role_info: RoleInfo::from(record.role.descriptor()),
        user: record,
    }))
}

/// get_my_role
///
/// [Authenticated Route] Navigation items, badge and dashboard variant for the caller's role.
#[utoipa::path(
    get,
    path = "/me/role",
    responses((status = 200, description = "Role descriptor", body = RoleInfo))
)]
pub async fn get_my_role(AuthUser { role, .. }: AuthUser) -> Json<RoleInfo> {
    Json(RoleInfo::from(role.descriptor()))
}

/// update_profile
///
/// [Authenticated Route] Partial update of the caller's own profile. A provided name must
/// not be blank; the role cannot be changed here or anywhere else.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 422, description = "Missing required field")
    )
)]
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    if payload.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let updated = state
        .repo
        .update_profile(user.id, payload)
        .await
        .ok_or(AppError::Unauthorized)?;

    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Json(UserProfile {
        role_info: RoleInfo::from(updated.role.descriptor()),
        user: updated,
    }))
}

// --- Feed Handlers ---

/// get_feed
///
/// [Authenticated Route] The posts visible to the caller, newest first. Administrators
/// also see posts awaiting review.
#[utoipa::path(
    get,
    path = "/feed",
    params(FeedFilter),
    responses((status = 200, description = "Visible posts", body = [Post]))
)]
pub async fn get_feed(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<FeedFilter>,
) -> Json<Vec<models::Post>> {
    let mut posts = policy::visible_posts(state.repo.list_posts().await, role);
    if let Some(kind) = filter.kind {
        posts.retain(|post| post.kind == kind);
    }
    Json(posts)
}

/// create_post
///
/// [Authenticated Route] Publishes a post, job or announcement.
///
/// Plain posts from members and enterprises start pending review. Jobs and announcements
/// are approved immediately. Jobs require enterprise or admin; announcements require admin.
#[utoipa::path(
    post,
    path = "/feed",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 403, description = "Role may not author this kind"),
        (status = 422, description = "Missing required field")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<models::Post>)> {
    policy::can_author(user.role, payload.kind)?;
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Post content cannot be empty".to_string()));
    }

    let author = current_user(&state, &user).await?;
    let job = match (payload.kind, payload.job) {
        (PostKind::Job, Some(details)) => Some(build_job(&author, details)?),
        (PostKind::Job, None) => {
            return Err(AppError::Validation("Job posts require job details".to_string()));
        }
        (_, Some(_)) => {
            return Err(AppError::Validation(
                "Only job posts may carry job details".to_string(),
            ));
        }
        (_, None) => None,
    };

    let is_approved = policy::initial_approval(payload.kind, user.role);
    let post = models::Post::new(
        author.author(),
        content.to_string(),
        payload.kind,
        job,
        payload.image.filter(|url| !url.trim().is_empty()),
        is_approved,
    )
    .ok_or_else(|| AppError::Internal("post kind and job details disagree".to_string()))?;

    let post = state.repo.insert_post(post).await;
    tracing::info!(
        post_id = %post.id,
        author_id = %user.id,
        kind = ?post.kind,
        approved = post.is_approved,
        "post created"
    );

    Ok((StatusCode::CREATED, Json(post)))
}

/// toggle_like
///
/// [Authenticated Route] Likes the post, or removes the caller's like if already present.
#[utoipa::path(
    post,
    path = "/feed/{id}/like",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Toggled", body = LikeResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn toggle_like(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<LikeResponse>> {
    visible_post(&state, &user, post_id).await?;
    let post = state
        .repo
        .toggle_like(post_id, user.id)
        .await
        .ok_or(AppError::NotFound("Post"))?;

    Ok(Json(LikeResponse {
        liked: post.is_liked_by(user.id),
        like_count: post.likes.len(),
    }))
}

/// add_comment
///
/// [Authenticated Route] Appends a comment to a visible post.
#[utoipa::path(
    post,
    path = "/feed/{id}/comments",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment Added", body = Comment),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Empty comment")
    )
)]
pub async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<models::Comment>)> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty".to_string()));
    }
    visible_post(&state, &user, post_id).await?;
    let author = current_user(&state, &user).await?;

    let comment = Comment {
        id: Uuid::new_v4(),
        author: author.author(),
        content: content.to_string(),
        created_at: Utc::now(),
    };
    let comment = state
        .repo
        .add_comment(post_id, comment)
        .await
        .ok_or(AppError::NotFound("Post"))?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// apply_to_post_job
///
/// [Authenticated Route] Applies to (or withdraws from) the job embedded in a feed post.
/// Same toggle semantics as the job board. Members only.
#[utoipa::path(
    post,
    path = "/feed/{id}/apply",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Toggled", body = ApplicationResponse),
        (status = 403, description = "Members only"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Not a job post")
    )
)]
pub async fn apply_to_post_job(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<ApplicationResponse>> {
    user.require(Role::Member)?;
    let post = visible_post(&state, &user, post_id).await?;
    if post.kind != PostKind::Job {
        return Err(AppError::Validation("Post is not a job posting".to_string()));
    }

    let job = state
        .repo
        .toggle_post_application(post_id, user.id)
        .await
        .ok_or(AppError::NotFound("Post"))?;

    let response = application_response(job, user.id);
    tracing::info!(post_id = %post_id, user_id = %user.id, applied = response.applied, "feed job application toggled");
    Ok(Json(response))
}

// --- Job Board Handlers ---

/// list_jobs
///
/// [Authenticated Route] Every job board listing, newest first.
#[utoipa::path(
    get,
    path = "/jobs",
    responses((status = 200, description = "Job listings", body = [JobPost]))
)]
pub async fn list_jobs(_user: AuthUser, State(state): State<AppState>) -> Json<Vec<JobPost>> {
    Json(state.repo.list_jobs().await)
}

/// create_job
///
/// [Authenticated Route] Posts a job board listing. Enterprise only. Title, location and
/// description are required; the company is taken from the poster's profile.
#[utoipa::path(
    post,
    path = "/jobs",
    request_body = JobDetailsRequest,
    responses(
        (status = 201, description = "Job Posted", body = JobPost),
        (status = 403, description = "Enterprise only"),
        (status = 422, description = "Missing required field")
    )
)]
pub async fn create_job(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<JobDetailsRequest>,
) -> Result<(StatusCode, Json<JobPost>)> {
    user.require(Role::Enterprise)?;
    let poster = current_user(&state, &user).await?;
    let job = state.repo.insert_job(build_job(&poster, payload)?).await;

    tracing::info!(job_id = %job.id, poster_id = %user.id, "job posted");
    Ok((StatusCode::CREATED, Json(job)))
}

/// apply_to_job
///
/// [Authenticated Route] Applies to a job board listing, or withdraws an existing
/// application. Members only.
#[utoipa::path(
    post,
    path = "/jobs/{id}/apply",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Toggled", body = ApplicationResponse),
        (status = 403, description = "Members only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn apply_to_job(
    user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApplicationResponse>> {
    user.require(Role::Member)?;
    let job = state
        .repo
        .toggle_job_application(job_id, user.id)
        .await
        .ok_or(AppError::NotFound("Job"))?;

    let response = application_response(job, user.id);
    tracing::info!(job_id = %job_id, user_id = %user.id, applied = response.applied, "job application toggled");
    Ok(Json(response))
}

/// get_job_stats
///
/// [Authenticated Route] Applicant and posting counters for the caller's own listings.
/// Enterprise only.
#[utoipa::path(
    get,
    path = "/jobs/stats",
    responses(
        (status = 200, description = "Stats", body = EnterpriseJobStats),
        (status = 403, description = "Enterprise only")
    )
)]
pub async fn get_job_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<EnterpriseJobStats>> {
    user.require(Role::Enterprise)?;
    let jobs = state.repo.list_jobs().await;
    Ok(Json(enterprise_stats(&jobs, user.id, Utc::now())))
}

// --- Dashboard ---

/// get_dashboard
///
/// [Authenticated Route] The dashboard variant selected by the caller's role descriptor,
/// computed from live state.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Dashboard", body = Dashboard))
)]
pub async fn get_dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Dashboard>> {
    let dashboard = match user.role.descriptor().dashboard {
        DashboardKind::Member => {
            let jobs = state.repo.list_jobs().await;
            let posts = state.repo.list_posts().await;
            let feed_applications = posts
                .iter()
                .filter_map(|post| post.job.as_ref())
                .filter(|job| job.has_applied(user.id))
                .count();

            Dashboard::Member(MemberDashboard {
                applications: jobs.iter().filter(|job| job.has_applied(user.id)).count()
                    + feed_applications,
                posts_authored: posts.iter().filter(|post| post.author.id == user.id).count(),
                recommended_jobs: jobs
                    .into_iter()
                    .filter(|job| !job.has_applied(user.id))
                    .take(3)
                    .collect(),
            })
        }
        DashboardKind::Enterprise => {
            let jobs = state.repo.list_jobs().await;
            Dashboard::Enterprise(enterprise_stats(&jobs, user.id, Utc::now()))
        }
        DashboardKind::Admin => Dashboard::Admin(admin_stats(&state).await),
    };
    Ok(Json(dashboard))
}

async fn admin_stats(state: &AppState) -> AdminDashboardStats {
    let mut stats = state.repo.get_stats().await;
    stats.active_sessions = state.sessions.active_count().await;
    stats
}

// --- Admin Handlers ---

/// get_admin_stats
///
/// [Admin Route] Moderation dashboard counters.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Stats", body = AdminDashboardStats),
        (status = 403, description = "Admin only")
    )
)]
pub async fn get_admin_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AdminDashboardStats>> {
    user.require(Role::Admin)?;
    Ok(Json(admin_stats(&state).await))
}

/// list_users
///
/// [Admin Route] Every account in the directory (User Management).
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_users(user: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    user.require(Role::Admin)?;
    Ok(Json(state.repo.list_users().await))
}

/// list_pending_posts
///
/// [Admin Route] The moderation queue: posts awaiting review, newest first.
#[utoipa::path(
    get,
    path = "/admin/posts/pending",
    responses(
        (status = 200, description = "Pending posts", body = [Post]),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_pending_posts(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<models::Post>>> {
    user.require(Role::Admin)?;
    let mut posts = state.repo.list_posts().await;
    posts.retain(|post| !post.is_approved);
    Ok(Json(posts))
}

/// approve_post
///
/// [Admin Route] Marks a post approved, making it visible to every role. Idempotent.
#[utoipa::path(
    put,
    path = "/admin/posts/{id}/approve",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Approved", body = Post),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn approve_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::Post>> {
    user.require(Role::Admin)?;
    let post = state
        .repo
        .approve_post(id)
        .await
        .ok_or(AppError::NotFound("Post"))?;

    tracing::info!(post_id = %id, admin_id = %user.id, "post approved");
    Ok(Json(post))
}

/// reject_post
///
/// [Admin Route] Rejects a post by deleting it permanently. Not reversible.
#[utoipa::path(
    delete,
    path = "/admin/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn reject_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    user.require(Role::Admin)?;
    if !state.repo.delete_post(id).await {
        return Err(AppError::NotFound("Post"));
    }

    tracing::info!(post_id = %id, admin_id = %user.id, "post rejected and removed");
    Ok(StatusCode::NO_CONTENT)
}
