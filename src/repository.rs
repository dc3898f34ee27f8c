use crate::models::{
    AdminDashboardStats, Comment, JobPost, Post, UpdateProfileRequest, User,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository Trait
///
/// The contract for every state operation of the portal. Handlers only see this trait.
///
/// Each mutation completes under a single write guard.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    // Case-insensitive lookup used by the directory identity provider.
    async fn find_user_by_email(&self, email: &str) -> Option<User>;
    async fn list_users(&self) -> Vec<User>;
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Option<User>;

    // --- Feed ---
    // All posts, newest first, regardless of approval. Visibility is applied by the caller.
    async fn list_posts(&self) -> Vec<Post>;
    async fn get_post(&self, id: Uuid) -> Option<Post>;
    async fn insert_post(&self, post: Post) -> Post;
    // Returns the updated post, or None if it does not exist.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Option<Post>;
    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Option<Comment>;
    // Idempotent: approving an approved post leaves it unchanged.
    async fn approve_post(&self, id: Uuid) -> Option<Post>;
    // Permanent removal. Returns false if no post was removed.
    async fn delete_post(&self, id: Uuid) -> bool;
    // Toggles an application on the job embedded in a `job` post.
    async fn toggle_post_application(&self, post_id: Uuid, user_id: Uuid) -> Option<JobPost>;

    // --- Job Board ---
    // Newest first.
    async fn list_jobs(&self) -> Vec<JobPost>;
    async fn get_job(&self, id: Uuid) -> Option<JobPost>;
    async fn insert_job(&self, job: JobPost) -> JobPost;
    async fn toggle_job_application(&self, job_id: Uuid, user_id: Uuid) -> Option<JobPost>;

    async fn get_stats(&self) -> AdminDashboardStats;
}

/// RepositoryState
///
/// The shared handle to the state layer held by `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

#[derive(Default)]
struct Store {
    users: Vec<User>,
    // Kept newest first.
    posts: Vec<Post>,
    jobs: Vec<JobPost>,
}

/// InMemoryRepository
///
/// Process-lifetime implementation of `Repository`. Nothing is persisted; a restart
/// returns to the seed.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository holding the given collections. Posts and jobs are re-sorted newest
    /// first.
    pub fn with_data(users: Vec<User>, mut posts: Vec<Post>, mut jobs: Vec<JobPost>) -> Self {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Self {
            store: RwLock::new(Store { users, posts, jobs }),
        }
    }
}

fn apply_text(field: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *field = v.trim().to_string();
    }
}

// Empty strings clear optional profile fields.
fn apply_optional(field: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        let v = v.trim();
        *field = (!v.is_empty()).then(|| v.to_string());
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        let store = self.store.read().await;
        store.users.iter().find(|u| u.id == id).cloned()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let needle = email.trim().to_lowercase();
        let store = self.store.read().await;
        store
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == needle)
            .cloned()
    }

    async fn list_users(&self) -> Vec<User> {
        self.store.read().await.users.clone()
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Option<User> {
        let mut store = self.store.write().await;
        let user = store.users.iter_mut().find(|u| u.id == id)?;
        apply_text(&mut user.name, req.name);
        apply_optional(&mut user.title, req.title);
        apply_optional(&mut user.company, req.company);
        apply_optional(&mut user.location, req.location);
        apply_optional(&mut user.bio, req.bio);
        let updated = user.clone();

        // Keep the author snapshots on existing content in sync with the profile.
        let author = updated.author();
        for post in store.posts.iter_mut() {
            if post.author.id == id {
                post.author = author.clone();
            }
            for comment in post.comments.iter_mut().filter(|c| c.author.id == id) {
                comment.author = author.clone();
            }
        }
        Some(updated)
    }

    async fn list_posts(&self) -> Vec<Post> {
        self.store.read().await.posts.clone()
    }

    async fn get_post(&self, id: Uuid) -> Option<Post> {
        let store = self.store.read().await;
        store.posts.iter().find(|p| p.id == id).cloned()
    }

    async fn insert_post(&self, post: Post) -> Post {
        let mut store = self.store.write().await;
        store.posts.insert(0, post.clone());
        post
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Option<Post> {
        let mut store = self.store.write().await;
        let post = store.posts.iter_mut().find(|p| p.id == post_id)?;
        post.toggle_like(user_id);
        Some(post.clone())
    }

    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Option<Comment> {
        let mut store = self.store.write().await;
        let post = store.posts.iter_mut().find(|p| p.id == post_id)?;
        post.comments.push(comment.clone());
        Some(comment)
    }

    async fn approve_post(&self, id: Uuid) -> Option<Post> {
        let mut store = self.store.write().await;
        let post = store.posts.iter_mut().find(|p| p.id == id)?;
        post.is_approved = true;
        Some(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> bool {
        let mut store = self.store.write().await;
        let before = store.posts.len();
        store.posts.retain(|p| p.id != id);
        store.posts.len() < before
    }

    async fn toggle_post_application(&self, post_id: Uuid, user_id: Uuid) -> Option<JobPost> {
        let mut store = self.store.write().await;
        let job = store
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)?
            .job
            .as_mut()?;
        job.toggle_applicant(user_id);
        Some(job.clone())
    }

    async fn list_jobs(&self) -> Vec<JobPost> {
        self.store.read().await.jobs.clone()
    }

    async fn get_job(&self, id: Uuid) -> Option<JobPost> {
        let store = self.store.read().await;
        store.jobs.iter().find(|j| j.id == id).cloned()
    }

    async fn insert_job(&self, job: JobPost) -> JobPost {
        let mut store = self.store.write().await;
        store.jobs.insert(0, job.clone());
        job
    }

    async fn toggle_job_application(&self, job_id: Uuid, user_id: Uuid) -> Option<JobPost> {
        let mut store = self.store.write().await;
        let job = store.jobs.iter_mut().find(|j| j.id == job_id)?;
        job.toggle_applicant(user_id);
        Some(job.clone())
    }

    async fn get_stats(&self) -> AdminDashboardStats {
        let store = self.store.read().await;
        AdminDashboardStats {
            total_users: store.users.len(),
            total_posts: store.posts.len(),
            pending_reviews: store.posts.iter().filter(|p| !p.is_approved).count(),
            total_jobs: store.jobs.len(),
            total_likes: store.posts.iter().map(|p| p.likes.len()).sum(),
            active_sessions: 0,
        }
    }
}
