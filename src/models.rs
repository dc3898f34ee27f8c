use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity ---

/// Role
///
/// The three actor classes of the portal. The member role keeps its historical wire name
/// `ca` (chartered accountant); `member` is accepted on input as an alias.
/// A user's role is fixed for the lifetime of their account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Role {
    #[serde(rename = "ca", alias = "member")]
    Member,
    #[serde(rename = "enterprise")]
    Enterprise,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "ca",
            Role::Enterprise => "enterprise",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User
///
/// The canonical identity record held by the in-memory directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile_image: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    // Only issued to members of the association.
    pub membership_number: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

impl User {
    /// Snapshot of the public identity fields, embedded in posts and comments.
    pub fn author(&self) -> Author {
        Author {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
            title: self.title.clone(),
            company: self.company.clone(),
            profile_image: self.profile_image.clone(),
        }
    }
}

/// Author
///
/// Denormalized author summary carried by feed content. Email and profile details stay
/// with the `User` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub title: Option<String>,
    pub company: Option<String>,
    pub profile_image: Option<String>,
}

// --- Feed ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PostKind {
    #[default]
    Post,
    Job,
    Announcement,
}

/// JobPost
///
/// A job opening, either listed on the job board or embedded in a `job` feed post.
/// `applicants` behaves as an insertion-ordered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct JobPost {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    /// Display name of the poster (person or team).
    pub posted_by: String,
    /// Seeded listings from external boards have no local poster account.
    pub poster_id: Option<Uuid>,
    #[ts(type = "string")]
    pub posted_at: DateTime<Utc>,
    pub applicants: Vec<Uuid>,
}

impl JobPost {
    pub fn has_applied(&self, user_id: Uuid) -> bool {
        self.applicants.contains(&user_id)
    }

    /// Adds the user to the applicant set, or withdraws them if already present.
    /// Returns whether the user is an applicant afterwards.
    pub fn toggle_applicant(&mut self, user_id: Uuid) -> bool {
        if self.has_applied(user_id) {
            self.applicants.retain(|id| *id != user_id);
            false
        } else {
            self.applicants.push(user_id);
            true
        }
    }
}

/// Comment
///
/// Append-only; owned by its post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub author: Author,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Post
///
/// A feed entry. A `job` post always carries `job`; other kinds never do. This is enforced
/// by `Post::new`, which is the only constructor used outside of seeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub author: Author,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    /// User ids; at most one entry per user.
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub job: Option<JobPost>,
    pub is_approved: bool,
}

impl Post {
    /// Builds a new post. Returns `None` when `kind` and `job` disagree.
    pub fn new(
        author: Author,
        content: String,
        kind: PostKind,
        job: Option<JobPost>,
        image: Option<String>,
        is_approved: bool,
    ) -> Option<Self> {
        if (kind == PostKind::Job) != job.is_some() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            author,
            content,
            created_at: Utc::now(),
            likes: Vec::new(),
            comments: Vec::new(),
            image,
            kind,
            job,
            is_approved,
        })
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    /// Flips the user's like. Returns whether the post is liked by the user afterwards.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        if self.is_liked_by(user_id) {
            self.likes.retain(|id| *id != user_id);
            false
        } else {
            self.likes.push(user_id);
            true
        }
    }
}

// --- Request Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "admin@demo.com")]
    pub email: String,
    #[schema(example = "demo123")]
    pub password: String,
}

/// JobDetailsRequest
///
/// Job form fields. `requirements` is free text with one requirement per line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct JobDetailsRequest {
    pub title: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default, rename = "type")]
    pub kind: PostKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobDetailsRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// UpdateProfileRequest
///
/// Partial update of the editable profile fields. The role is deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

// --- Responses ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ApplicationResponse {
    pub applied: bool,
    pub applicant_count: usize,
    pub job: JobPost,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavItem {
    pub path: String,
    pub label: String,
}

/// RoleInfo
///
/// Serialized form of the role descriptor handed to the client for navigation, badges and
/// the profile header.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RoleInfo {
    pub role: Role,
    pub navigation: Vec<NavItem>,
    pub badge_label: String,
    pub badge_variant: String,
    pub profile_title: String,
    pub profile_color: String,
    pub profile_description: String,
    pub dashboard: DashboardKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub user: User,
    pub role_info: RoleInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DashboardKind {
    Member,
    Enterprise,
    Admin,
}

/// AdminDashboardStats
///
/// Counters for the moderation dashboard (GET /admin/stats).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_users: usize,
    pub total_posts: usize,
    /// Posts with `is_approved = false`.
    pub pending_reviews: usize,
    pub total_jobs: usize,
    pub total_likes: usize,
    /// Filled in from the session store, not the repository.
    pub active_sessions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct EnterpriseJobStats {
    pub active_postings: usize,
    pub total_applicants: usize,
    pub posted_this_week: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MemberDashboard {
    pub applications: usize,
    pub recommended_jobs: Vec<JobPost>,
    pub posts_authored: usize,
}

/// Dashboard
///
/// One variant per `DashboardKind`, tagged as `variant` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "variant", rename_all = "snake_case")]
#[ts(export)]
pub enum Dashboard {
    Member(MemberDashboard),
    Enterprise(EnterpriseJobStats),
    Admin(AdminDashboardStats),
}

/// NavigationResponse
///
/// Route-guard outcome for a requested path (GET /navigate).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationResponse {
    pub path: String,
    pub decision: crate::policy::AccessDecision,
    /// Set for access-denied outcomes, e.g. "Required role: ca | Your role: admin".
    pub message: Option<String>,
}
