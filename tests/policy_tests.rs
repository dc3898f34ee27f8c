use portal::{
    models::{Author, Post, PostKind, Role},
    policy::{self, AccessDecision, Page},
};
use uuid::Uuid;

const ROLES: [Role; 3] = [Role::Member, Role::Enterprise, Role::Admin];
const PAGES: [Page; 10] = [
    Page::Login,
    Page::Feed,
    Page::Jobs,
    Page::Dashboard,
    Page::Profile,
    Page::Admin,
    Page::Network,
    Page::Candidates,
    Page::Users,
    Page::Content,
];

fn author(role: Role) -> Author {
    Author {
        id: Uuid::new_v4(),
        name: "Tester".to_string(),
        role,
        title: None,
        company: None,
        profile_image: None,
    }
}

fn post(is_approved: bool) -> Post {
    Post::new(
        author(Role::Member),
        "content".to_string(),
        PostKind::Post,
        None,
        None,
        is_approved,
    )
    .unwrap()
}

// --- authorize ---

#[test]
fn test_no_session_always_renders_login() {
    for page in PAGES {
        assert_eq!(policy::authorize(None, page), AccessDecision::RenderLogin);
    }
}

#[test]
fn test_open_pages_render_for_every_role() {
    for role in ROLES {
        for page in [Page::Feed, Page::Jobs, Page::Dashboard, Page::Profile] {
            assert_eq!(
                policy::authorize(Some(role), page),
                AccessDecision::RenderPage { page }
            );
        }
    }
}

#[test]
fn test_role_pages_render_only_for_their_role() {
    for role in ROLES {
        for page in PAGES {
            let Some(required) = page.required_role() else {
                continue;
            };
            let decision = policy::authorize(Some(role), page);
            if role == required {
                assert!(decision.is_allowed());
            } else {
                assert_eq!(
                    decision,
                    AccessDecision::AccessDenied {
                        required_role: required,
                        actual_role: role
                    }
                );
            }
        }
    }
}

#[test]
fn test_denial_message_names_both_roles() {
    let decision = policy::authorize(Some(Role::Admin), Page::Network);
    assert_eq!(
        decision.message().as_deref(),
        Some("Required role: ca | Your role: admin")
    );
    assert_eq!(
        policy::authorize(Some(Role::Member), Page::Candidates).message().as_deref(),
        Some("Required role: enterprise | Your role: ca")
    );
    assert_eq!(policy::authorize(Some(Role::Admin), Page::Users).message(), None);
}

// --- navigate ---

#[test]
fn test_navigate_resolves_paths() {
    assert_eq!(Page::from_path("/"), Some(Page::Feed));
    assert_eq!(Page::from_path("/feed/"), Some(Page::Feed));
    assert_eq!(Page::from_path("/content"), Some(Page::Content));
    assert_eq!(Page::from_path("/settings"), None);

    assert_eq!(
        policy::navigate(Some(Role::Enterprise), "/admin"),
        AccessDecision::AccessDenied {
            required_role: Role::Admin,
            actual_role: Role::Enterprise
        }
    );
    assert_eq!(policy::navigate(None, "/nowhere"), AccessDecision::NotFound);
    assert_eq!(policy::navigate(Some(Role::Admin), "/nowhere"), AccessDecision::NotFound);
}

// --- visibility ---

#[test]
fn test_admin_view_is_superset_of_every_view() {
    let posts = vec![post(true), post(false), post(true), post(false)];
    let admin_view = policy::visible_posts(posts.clone(), Role::Admin);
    assert_eq!(admin_view, posts);

    for role in [Role::Member, Role::Enterprise] {
        let view = policy::visible_posts(posts.clone(), role);
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|p| p.is_approved));
        assert!(view.iter().all(|p| admin_view.contains(p)));
    }
}

#[test]
fn test_visible_posts_preserves_order() {
    let posts = vec![post(true), post(false), post(true)];
    let ids: Vec<Uuid> = vec![posts[0].id, posts[2].id];
    let view = policy::visible_posts(posts, Role::Member);
    assert_eq!(view.iter().map(|p| p.id).collect::<Vec<_>>(), ids);
}

// --- authoring ---

#[test]
fn test_initial_approval_matrix() {
    for role in ROLES {
        assert!(policy::initial_approval(PostKind::Job, role));
        assert!(policy::initial_approval(PostKind::Announcement, role));
        assert_eq!(
            policy::initial_approval(PostKind::Post, role),
            role == Role::Admin
        );
    }
}

#[test]
fn test_can_author_matrix() {
    for role in ROLES {
        assert!(policy::can_author(role, PostKind::Post).is_ok());
    }
    assert!(policy::can_author(Role::Enterprise, PostKind::Job).is_ok());
    assert!(policy::can_author(Role::Admin, PostKind::Job).is_ok());
    assert_eq!(
        policy::can_author(Role::Member, PostKind::Job),
        Err(AccessDecision::AccessDenied {
            required_role: Role::Enterprise,
            actual_role: Role::Member
        })
    );
    assert!(policy::can_author(Role::Admin, PostKind::Announcement).is_ok());
    assert!(policy::can_author(Role::Enterprise, PostKind::Announcement).is_err());
}

// --- role descriptor ---

#[test]
fn test_descriptor_navigation_is_reachable() {
    // Every link a role is shown must render for that role.
    for role in ROLES {
        let descriptor = role.descriptor();
        assert_eq!(descriptor.role, role);
        for (path, _label) in descriptor.navigation {
            assert!(
                policy::navigate(Some(role), path).is_allowed(),
                "{} cannot open {}",
                role,
                path
            );
        }
    }
}
