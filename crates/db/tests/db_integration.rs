//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `peekhour_test`)
//!   `TEST_DB_PASSWORD` (default: `peekhour_test`)
//!   `TEST_DB_NAME` (default: `peekhour_test`)

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use peekhour_db::entities::{
    comment, department, department_member,
    pending_post::{self, PendingStatus},
    post::{self, MediaType},
    user,
};
use peekhour_db::repositories::{
    CommentRepository, DepartmentRepository, PendingPostRepository, PostRepository,
    ReviewDecision, UserRepository,
};
use peekhour_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

async fn seed_user(db: &TestDatabase, id: &str, username: &str) {
    UserRepository::new(db.shared())
        .create(user::ActiveModel {
            id: Set(id.to_string()),
            username: Set(username.to_string()),
            username_lower: Set(username.to_lowercase()),
            email: Set(format!("{username}@example.com")),
            token: Set(Some(format!("token-{id}"))),
            name: Set(None),
            avatar_url: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap();
}

async fn seed_post(db: &TestDatabase, id: &str, department_id: Option<&str>) {
    PostRepository::new(db.shared())
        .create(post::ActiveModel {
            id: Set(id.to_string()),
            user_id: Set("author".to_string()),
            department_id: Set(department_id.map(ToString::to_string)),
            content: Set(Some("hello".to_string())),
            media_url: Set(None),
            media_type: Set(MediaType::Text),
            location_name: Set(None),
            latitude: Set(None),
            longitude: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap();
}

async fn seed_comment(repo: &CommentRepository, id: &str, parent: Option<&str>, depth: i32) {
    repo.create(comment::ActiveModel {
        id: Set(id.to_string()),
        post_id: Set("post1".to_string()),
        user_id: Set("author".to_string()),
        parent_comment_id: Set(parent.map(ToString::to_string)),
        depth: Set(depth),
        content: Set(format!("comment {id}")),
        is_active: Set(true),
        edited_at: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_subtree_query_and_cascade_delete() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_user(&db, "author", "author").await;
    seed_post(&db, "post1", None).await;

    let comments = CommentRepository::new(db.shared());
    seed_comment(&comments, "a", None, 0).await;
    seed_comment(&comments, "b", Some("a"), 1).await;
    seed_comment(&comments, "c", Some("b"), 2).await;
    seed_comment(&comments, "d", Some("a"), 1).await;

    let subtree = comments.find_subtree("a", 5).await.unwrap();
    let ids: Vec<&str> = subtree.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), 4);
    assert!(ids.contains(&"c"));

    let counts = comments
        .count_children(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(counts.get("a"), Some(&2));
    assert_eq!(counts.get("b"), Some(&1));

    comments.delete("b").await.unwrap();
    assert!(comments.find_by_id("c").await.unwrap().is_none());
    assert!(comments.find_by_id("d").await.unwrap().is_some());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_depth_check_constraint() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_user(&db, "author", "author").await;
    seed_post(&db, "post1", None).await;

    let comments = CommentRepository::new(db.shared());
    seed_comment(&comments, "a", None, 0).await;

    let too_deep = comments
        .create(comment::ActiveModel {
            id: Set("z".to_string()),
            post_id: Set("post1".to_string()),
            user_id: Set("author".to_string()),
            parent_comment_id: Set(Some("a".to_string())),
            depth: Set(6),
            content: Set("too deep".to_string()),
            is_active: Set(true),
            edited_at: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await;
    assert!(too_deep.is_err());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_submit_and_review_round() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_user(&db, "author", "author").await;

    DepartmentRepository::new(db.shared())
        .create(
            department::ActiveModel {
                id: Set("dept1".to_string()),
                creator_id: Set("author".to_string()),
                name: Set("Mission District".to_string()),
                description: Set(None),
                rules: Set(None),
                require_post_approval: Set(true),
                members_count: Set(1),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            },
            department_member::ActiveModel {
                id: Set("m1".to_string()),
                department_id: Set("dept1".to_string()),
                user_id: Set("author".to_string()),
                is_banned: Set(false),
                banned_by: Set(None),
                joined_at: Set(Utc::now().into()),
            },
        )
        .await
        .unwrap();
    seed_post(&db, "post1", Some("dept1")).await;

    let pending_repo = PendingPostRepository::new(db.shared());
    let pending = pending_repo
        .submit(pending_post::ActiveModel {
            id: Set("pp1".to_string()),
            post_id: Set("post1".to_string()),
            department_id: Set("dept1".to_string()),
            submitted_by: Set("author".to_string()),
            status: Set(PendingStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            rejection_reason: Set(None),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let posts = PostRepository::new(db.shared());
    assert!(!posts.get_by_id("post1").await.unwrap().is_active);

    // Queued posts stay out of both feeds
    assert!(posts.find_recent(20, None).await.unwrap().is_empty());
    assert!(
        posts
            .find_by_department("dept1", 20, None)
            .await
            .unwrap()
            .is_empty()
    );

    let decision = ReviewDecision {
        status: PendingStatus::Approved,
        reviewed_by: "author".to_string(),
        rejection_reason: None,
    };
    assert!(
        pending_repo
            .review(pending.clone(), decision.clone())
            .await
            .unwrap()
            .is_some()
    );
    assert!(posts.get_by_id("post1").await.unwrap().is_active);

    let recent = posts.find_recent(20, None).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, "post1");
    let department_feed = posts.find_by_department("dept1", 20, None).await.unwrap();
    assert_eq!(department_feed.len(), 1);
    assert_eq!(department_feed[0].id, "post1");

    // A second review of the same row matches nothing
    assert!(pending_repo.review(pending, decision).await.unwrap().is_none());

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
