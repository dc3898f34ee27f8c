use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{DashboardKind, NavItem, Post, PostKind, Role, RoleInfo};

// --- Page Catalogue ---

/// Page
///
/// Every navigable page of the portal. Pages without a required role are open to any
/// signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Page {
    Login,
    Feed,
    Jobs,
    Dashboard,
    Profile,
    Admin,
    Network,
    Candidates,
    Users,
    Content,
}

impl Page {
    /// Resolves a URL path. Returns `None` for paths outside the catalogue.
    pub fn from_path(path: &str) -> Option<Page> {
        let trimmed = path.trim_end_matches('/');
        let page = match trimmed {
            "" | "/feed" => Page::Feed,
            "/login" => Page::Login,
            "/jobs" => Page::Jobs,
            "/dashboard" => Page::Dashboard,
            "/profile" => Page::Profile,
            "/admin" => Page::Admin,
            "/network" => Page::Network,
            "/candidates" => Page::Candidates,
            "/users" => Page::Users,
            "/content" => Page::Content,
            _ => return None,
        };
        Some(page)
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Page::Admin | Page::Users | Page::Content => Some(Role::Admin),
            Page::Network => Some(Role::Member),
            Page::Candidates => Some(Role::Enterprise),
            Page::Login | Page::Feed | Page::Jobs | Page::Dashboard | Page::Profile => None,
        }
    }
}

// --- Access Control ---

/// AccessDecision
///
/// What the renderer should show for a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum AccessDecision {
    RenderPage { page: Page },
    RenderLogin,
    AccessDenied { required_role: Role, actual_role: Role },
    /// The path is outside the page catalogue. Produced by `navigate`, never by `authorize`.
    NotFound,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::RenderPage { .. })
    }

    /// Text for the access-denied view; `None` for every other outcome.
    pub fn message(&self) -> Option<String> {
        match self {
            AccessDecision::AccessDenied {
                required_role,
                actual_role,
            } => Some(denial_message(*required_role, *actual_role)),
            _ => None,
        }
    }
}

/// Message shown on the access-denied view.
pub fn denial_message(required: Role, actual: Role) -> String {
    format!("Required role: {} | Your role: {}", required, actual)
}

/// authorize
///
/// Route guard. A pure function of the session's role (if any) and the requested page,
/// evaluated on every navigation:
/// - no session always yields the login view;
/// - a page without a required role renders for any session;
/// - a role mismatch yields access-denied carrying both roles.
pub fn authorize(session_role: Option<Role>, page: Page) -> AccessDecision {
    let Some(actual) = session_role else {
        return AccessDecision::RenderLogin;
    };
    check_role(actual, page.required_role())
        .map(|_| AccessDecision::RenderPage { page })
        .unwrap_or_else(|denied| denied)
}

/// Resolves a raw path and authorizes it. Unknown paths are reported as `NotFound`
/// whether or not a session exists.
pub fn navigate(session_role: Option<Role>, path: &str) -> AccessDecision {
    match Page::from_path(path) {
        Some(page) => authorize(session_role, page),
        None => AccessDecision::NotFound,
    }
}

/// The role check behind `authorize`, shared with API actions that are gated by role.
pub fn check_role(actual: Role, required: Option<Role>) -> Result<(), AccessDecision> {
    match required {
        Some(required_role) if required_role != actual => Err(AccessDecision::AccessDenied {
            required_role,
            actual_role: actual,
        }),
        _ => Ok(()),
    }
}

// --- Moderation & Visibility ---

/// Whether a viewer with `role` may see `post`.
pub fn can_view(role: Role, post: &Post) -> bool {
    role == Role::Admin || post.is_approved
}

/// visible_posts
///
/// Administrators see the whole collection; everyone else only approved posts.
/// Input order is preserved.
pub fn visible_posts(posts: Vec<Post>, role: Role) -> Vec<Post> {
    posts.into_iter().filter(|p| can_view(role, p)).collect()
}

/// Approval state of a freshly authored post. Jobs and announcements skip review; plain
/// posts are only pre-approved for administrators.
pub fn initial_approval(kind: PostKind, author_role: Role) -> bool {
    match kind {
        PostKind::Job | PostKind::Announcement => true,
        PostKind::Post => author_role == Role::Admin,
    }
}

/// Roles allowed to author each post kind. `None` means any role.
pub fn authoring_roles(kind: PostKind) -> Option<&'static [Role]> {
    match kind {
        PostKind::Post => None,
        PostKind::Job => Some(&[Role::Enterprise, Role::Admin]),
        PostKind::Announcement => Some(&[Role::Admin]),
    }
}

/// Checks whether `role` may author `kind`. On refusal, reports the first permitted role as
/// the required one.
pub fn can_author(role: Role, kind: PostKind) -> Result<(), AccessDecision> {
    match authoring_roles(kind) {
        Some(allowed) if !allowed.contains(&role) => Err(AccessDecision::AccessDenied {
            required_role: allowed[0],
            actual_role: role,
        }),
        _ => Ok(()),
    }
}

// --- Role Descriptor ---

/// RoleDescriptor
///
/// Everything role-dependent in the presentation layer, defined once per role.
#[derive(Debug)]
pub struct RoleDescriptor {
    pub role: Role,
    pub navigation: &'static [(&'static str, &'static str)],
    pub badge_label: &'static str,
    pub badge_variant: &'static str,
    pub profile_title: &'static str,
    pub profile_color: &'static str,
    pub profile_description: &'static str,
    pub dashboard: DashboardKind,
}

static MEMBER: RoleDescriptor = RoleDescriptor {
    role: Role::Member,
    navigation: &[("/feed", "Feed"), ("/jobs", "Jobs"), ("/network", "Network")],
    badge_label: "CA Member",
    badge_variant: "secondary",
    profile_title: "CA Member",
    profile_color: "bg-blue-500",
    profile_description: "Chartered Accountant",
    dashboard: DashboardKind::Member,
};

static ENTERPRISE: RoleDescriptor = RoleDescriptor {
    role: Role::Enterprise,
    navigation: &[
        ("/dashboard", "Dashboard"),
        ("/jobs", "Job Posts"),
        ("/candidates", "Candidates"),
    ],
    badge_label: "Enterprise",
    badge_variant: "outline",
    profile_title: "Enterprise User",
    profile_color: "bg-green-500",
    profile_description: "Corporate Professional",
    dashboard: DashboardKind::Enterprise,
};

static ADMIN: RoleDescriptor = RoleDescriptor {
    role: Role::Admin,
    navigation: &[
        ("/admin", "Dashboard"),
        ("/users", "User Management"),
        ("/content", "Content Moderation"),
    ],
    badge_label: "Admin",
    badge_variant: "destructive",
    profile_title: "ICAI Admin",
    profile_color: "bg-red-500",
    profile_description: "Portal Administrator",
    dashboard: DashboardKind::Admin,
};

impl Role {
    pub fn descriptor(&self) -> &'static RoleDescriptor {
        match self {
            Role::Member => &MEMBER,
            Role::Enterprise => &ENTERPRISE,
            Role::Admin => &ADMIN,
        }
    }
}

impl From<&RoleDescriptor> for RoleInfo {
    fn from(d: &RoleDescriptor) -> Self {
        RoleInfo {
            role: d.role,
            navigation: d
                .navigation
                .iter()
                .map(|(path, label)| NavItem {
                    path: path.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            badge_label: d.badge_label.to_string(),
            badge_variant: d.badge_variant.to_string(),
            profile_title: d.profile_title.to_string(),
            profile_color: d.profile_color.to_string(),
            profile_description: d.profile_description.to_string(),
            dashboard: d.dashboard,
        }
    }
}
