//! Demo data loaded at startup: the three sign-in accounts, two additional feed authors,
//! a starter feed and the job board listings.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    models::{Comment, JobPost, Post, PostKind, Role, User},
    repository::InMemoryRepository,
};

pub const DEMO_PASSWORD: &str = "demo123";

pub const MEMBER_ID: Uuid = Uuid::from_u128(1);
pub const ENTERPRISE_ID: Uuid = Uuid::from_u128(2);
pub const ADMIN_ID: Uuid = Uuid::from_u128(3);
const ANJALI_ID: Uuid = Uuid::from_u128(4);
const TECHCORP_ID: Uuid = Uuid::from_u128(5);

fn avatar(seed: &str) -> Option<String> {
    Some(format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", seed))
}

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

/// The accounts that can sign in with `DEMO_PASSWORD`, plus the other feed authors.
pub fn demo_users() -> Vec<User> {
    vec![
        User {
            id: MEMBER_ID,
            name: "Priya Sharma".to_string(),
            email: "ca@demo.com".to_string(),
            role: Role::Member,
            profile_image: avatar("priya"),
            title: some("Senior Chartered Accountant"),
            company: some("Sharma & Associates"),
            membership_number: some("CA123456"),
            location: some("Mumbai, Maharashtra"),
            bio: some("Experienced CA specializing in taxation and audit. Member since 2015."),
        },
        User {
            id: ENTERPRISE_ID,
            name: "Rajesh Kumar".to_string(),
            email: "enterprise@demo.com".to_string(),
            role: Role::Enterprise,
            profile_image: avatar("rajesh"),
            title: some("HR Director"),
            company: some("TechCorp India"),
            membership_number: None,
            location: some("Bangalore, Karnataka"),
            bio: some(
                "Leading HR initiatives and talent acquisition for a growing tech company.",
            ),
        },
        User {
            id: ADMIN_ID,
            name: "Dr. Anjali Patel".to_string(),
            email: "admin@demo.com".to_string(),
            role: Role::Admin,
            profile_image: avatar("anjali"),
            title: some("ICAI Secretariat"),
            company: some("ICAI Head Office"),
            membership_number: None,
            location: some("New Delhi"),
            bio: some("Managing ICAI portal operations and member services."),
        },
        User {
            id: ANJALI_ID,
            name: "Anjali Mehta".to_string(),
            email: "anjali@example.com".to_string(),
            role: Role::Member,
            profile_image: avatar("anjali-mehta"),
            title: some("Tax Consultant"),
            company: some("Mehta & Associates"),
            membership_number: None,
            location: None,
            bio: None,
        },
        User {
            id: TECHCORP_ID,
            name: "TechCorp India".to_string(),
            email: "hr@techcorp.com".to_string(),
            role: Role::Enterprise,
            profile_image: avatar("techcorp"),
            title: some("HR Team"),
            company: some("TechCorp India"),
            membership_number: None,
            location: None,
            bio: None,
        },
    ]
}

fn demo_posts(users: &[User]) -> Vec<Post> {
    let now = Utc::now();
    let author = |id: Uuid| {
        users
            .iter()
            .find(|u| u.id == id)
            .map(User::author)
            .unwrap_or_else(|| users[0].author())
    };

    vec![
        Post {
            id: Uuid::from_u128(101),
            author: author(ANJALI_ID),
            content: "Just completed a complex GST audit for a multinational client. The new \
                      compliance requirements are challenging but manageable with proper \
                      planning. #GST #Audit #ICAI"
                .to_string(),
            created_at: now - Duration::hours(2),
            likes: vec![MEMBER_ID, ADMIN_ID],
            comments: vec![Comment {
                id: Uuid::from_u128(201),
                author: author(MEMBER_ID),
                content: "Great work! GST audits can be quite complex. Any specific \
                          challenges you faced?"
                    .to_string(),
                created_at: now - Duration::hours(1),
            }],
            image: None,
            kind: PostKind::Post,
            job: None,
            is_approved: true,
        },
        Post {
            id: Uuid::from_u128(102),
            author: author(TECHCORP_ID),
            content: "We're looking for experienced CAs to join our finance team in \
                      Bangalore. Excellent opportunity to work with cutting-edge fintech \
                      solutions. DM for details! #Hiring #CA #Fintech"
                .to_string(),
            created_at: now - Duration::hours(4),
            likes: vec![MEMBER_ID, ENTERPRISE_ID, TECHCORP_ID],
            comments: vec![],
            image: None,
            kind: PostKind::Post,
            job: None,
            is_approved: true,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn job(
    n: u128,
    title: &str,
    company: &str,
    location: &str,
    description: &str,
    requirements: &[&str],
    posted_by: &str,
    days_ago: i64,
    applicants: Vec<Uuid>,
) -> JobPost {
    JobPost {
        id: Uuid::from_u128(n),
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        description: description.to_string(),
        requirements: requirements.iter().map(|r| r.to_string()).collect(),
        posted_by: posted_by.to_string(),
        poster_id: None,
        posted_at: Utc::now() - Duration::days(days_ago),
        applicants,
    }
}

fn demo_jobs() -> Vec<JobPost> {
    vec![
        job(
            301,
            "Senior Tax Consultant",
            "KPMG India",
            "Mumbai, Maharashtra",
            "Looking for an experienced CA with expertise in direct and indirect taxation. \
             Must have 5+ years of experience in tax consulting.",
            &["CA qualification", "5+ years experience", "Tax expertise", "Client management"],
            "KPMG HR Team",
            2,
            vec![MEMBER_ID, ADMIN_ID],
        ),
        job(
            302,
            "Finance Manager - Fintech",
            "PayTech Solutions",
            "Bangalore, Karnataka",
            "Join our growing fintech startup as Finance Manager. Lead financial planning, \
             analysis, and compliance for innovative payment solutions.",
            &[
                "CA/CMA qualification",
                "3-5 years experience",
                "Fintech knowledge",
                "Financial modeling",
            ],
            "PayTech HR",
            5,
            vec![ENTERPRISE_ID],
        ),
        job(
            303,
            "Audit Senior Associate",
            "Deloitte India",
            "Delhi NCR",
            "Opportunity to work on large-scale audit engagements with multinational clients. \
             Growth-oriented role with excellent learning opportunities.",
            &[
                "CA qualification",
                "2-4 years audit experience",
                "Team leadership",
                "Client interaction",
            ],
            "Deloitte Talent Team",
            7,
            vec![],
        ),
    ]
}

/// A repository populated with the full demo data set.
pub fn seeded_repository() -> InMemoryRepository {
    let users = demo_users();
    let posts = demo_posts(&users);
    InMemoryRepository::with_data(users, posts, demo_jobs())
}
