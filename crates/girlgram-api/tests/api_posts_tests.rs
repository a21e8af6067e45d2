//! Posts, likes, comments and circle membership through the HTTP surface.

use axum::http::StatusCode;
use serde_json::{Value, json};

mod common;

use common::send;

async fn create_post(app: &axum::Router, user: &str, content: &str, circle_id: i64) -> i64 {
    let (status, post) = send(
        app,
        "POST",
        "/api/posts",
        Some(user),
        Some(json!({ "content": content, "circleId": circle_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    post["id"].as_i64().unwrap()
}

fn find<'a>(feed: &'a Value, post_id: i64) -> &'a Value {
    feed.as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == post_id)
        .expect("post in feed")
}

#[tokio::test]
async fn created_post_appears_in_feed_unliked() {
    let (app, _) = common::create_test_app();

    let (status, post) = send(
        &app,
        "POST",
        "/api/posts",
        Some("alice"),
        Some(json!({ "content": "hi", "circleId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["authorId"], "alice");
    assert_eq!(post["circleId"], 1);
    let post_id = post["id"].as_i64().unwrap();

    let (status, feed) = send(&app, "GET", "/api/posts/feed", Some("bea"), None).await;
    assert_eq!(status, StatusCode::OK);
    let entry = find(&feed, post_id);
    assert_eq!(entry["isLiked"], false);
    assert_eq!(entry["likesCount"], 0);
    assert_eq!(entry["commentsCount"], 0);
    assert_eq!(entry["author"]["id"], "alice");
    assert_eq!(entry["circle"]["name"], "Study & School Life");

    send(&app, "POST", &format!("/api/posts/{post_id}/like"), Some("bea"), None).await;
    let (_, feed) = send(&app, "GET", "/api/posts/feed", Some("bea"), None).await;
    assert_eq!(find(&feed, post_id)["isLiked"], true);
}

#[tokio::test]
async fn author_is_taken_from_session_not_body() {
    let (app, _) = common::create_test_app();

    let (status, post) = send(
        &app,
        "POST",
        "/api/posts",
        Some("alice"),
        Some(json!({ "content": "hi", "circleId": 1, "authorId": "bea" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["authorId"], "alice");
}

#[tokio::test]
async fn invalid_post_bodies_are_rejected() {
    let (app, state) = common::create_test_app();

    for body in [
        json!({ "circleId": 1 }),
        json!({ "content": "   ", "circleId": 1 }),
        json!({ "content": "hi" }),
        json!({ "content": "hi", "circleId": "one" }),
        json!({ "content": "x".repeat(5001), "circleId": 1 }),
    ] {
        let (status, err) = send(&app, "POST", "/api/posts", Some("alice"), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], "Invalid post data");
        assert!(!err["errors"].as_array().unwrap().is_empty());
    }

    assert!(state.db.get_feed_posts("alice", 20).unwrap().is_empty());
}

#[tokio::test]
async fn like_then_unlike_leaves_count_unchanged() {
    let (app, _) = common::create_test_app();
    let post_id = create_post(&app, "alice", "hello", 2).await;
    send(&app, "POST", &format!("/api/posts/{post_id}/like"), Some("alice"), None).await;

    let uri = format!("/api/posts/{post_id}/like");
    let (status, _) = send(&app, "POST", &uri, Some("bea"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", &uri, Some("bea"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, feed) = send(&app, "GET", "/api/posts/feed", Some("bea"), None).await;
    assert_eq!(find(&feed, post_id)["likesCount"], 2);

    let (status, _) = send(&app, "DELETE", &uri, Some("bea"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, feed) = send(&app, "GET", "/api/posts/feed", Some("bea"), None).await;
    assert_eq!(find(&feed, post_id)["likesCount"], 1);
    assert_eq!(find(&feed, post_id)["isLiked"], false);
}

#[tokio::test]
async fn non_author_cannot_delete() {
    let (app, _) = common::create_test_app();
    let post_id = create_post(&app, "alice", "mine", 1).await;
    let uri = format!("/api/posts/{post_id}");

    let (status, err) = send(&app, "DELETE", &uri, Some("bea"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Post not found or unauthorized");

    let (_, feed) = send(&app, "GET", "/api/posts/feed", Some("alice"), None).await;
    assert_eq!(feed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, feed) = send(&app, "GET", "/api/posts/feed", Some("alice"), None).await;
    assert!(feed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn comments_are_validated_and_listed_newest_first() {
    let (app, _) = common::create_test_app();
    let post_id = create_post(&app, "alice", "discuss", 3).await;
    let uri = format!("/api/posts/{post_id}/comments");

    let (status, err) = send(&app, "POST", &uri, Some("bea"), Some(json!({ "content": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Invalid comment data");
    assert_eq!(err["errors"][0]["field"], "content");

    let (status, first) =
        send(&app, "POST", &uri, Some("bea"), Some(json!({ "content": "first!" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["postId"], post_id);
    assert_eq!(first["authorId"], "bea");
    send(&app, "POST", &uri, Some("alice"), Some(json!({ "content": "thanks" }))).await;

    let (status, comments) = send(&app, "GET", &uri, Some("bea"), None).await;
    assert_eq!(status, StatusCode::OK);
    let comments = comments.as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "thanks");
    assert_eq!(comments[0]["author"]["id"], "alice");
    assert_eq!(comments[1]["content"], "first!");

    let (_, feed) = send(&app, "GET", "/api/posts/feed", Some("bea"), None).await;
    assert_eq!(find(&feed, post_id)["commentsCount"], 2);
}

#[tokio::test]
async fn circle_and_user_feeds_are_filtered() {
    let (app, _) = common::create_test_app();
    let in_one = create_post(&app, "alice", "one", 1).await;
    let in_two = create_post(&app, "bea", "two", 2).await;
    create_post(&app, "alice", "one again", 1).await;

    let (_, circle_two) = send(&app, "GET", "/api/posts/circle/2", Some("alice"), None).await;
    let ids: Vec<i64> = circle_two.as_array().unwrap().iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![in_two]);

    let (_, by_alice) = send(&app, "GET", "/api/posts/user/alice", Some("bea"), None).await;
    let by_alice = by_alice.as_array().unwrap();
    assert_eq!(by_alice.len(), 2);
    assert_eq!(by_alice[1]["id"], in_one);

    let (_, limited) = send(&app, "GET", "/api/posts/feed?limit=1", Some("bea"), None).await;
    assert_eq!(limited.as_array().unwrap().len(), 1);

    let (_, fallback) = send(&app, "GET", "/api/posts/feed?limit=zero", Some("bea"), None).await;
    assert_eq!(fallback.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn join_and_leave_are_idempotent() {
    let (app, _) = common::create_test_app();

    for _ in 0..2 {
        let (status, ack) = send(&app, "POST", "/api/circles/4/join", Some("bea"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["message"], "Joined circle successfully");
    }

    let (_, mine) = send(&app, "GET", "/api/circles/user", Some("bea"), None).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["name"], "Style & Beauty");

    for _ in 0..2 {
        let (status, _) = send(&app, "DELETE", "/api/circles/4/leave", Some("bea"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, mine) = send(&app, "GET", "/api/circles/user", Some("bea"), None).await;
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn init_seeds_empty_database_once() {
    let (app, _) = common::create_unseeded_app();

    let (_, circles) = send(&app, "GET", "/api/circles", None, None).await;
    assert!(circles.as_array().unwrap().is_empty());

    let (status, ack) = send(&app, "GET", "/api/init", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["message"], "Initialized successfully");
    let (_, circles) = send(&app, "GET", "/api/circles", None, None).await;
    let names: Vec<&str> = circles
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 5);
    assert!(names.contains(&"Style & Beauty"));

    let (status, _) = send(&app, "GET", "/api/init", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, circles) = send(&app, "GET", "/api/circles", None, None).await;
    assert_eq!(circles.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn init_never_doubles_circles() {
    let (app, _) = common::create_test_app();

    for _ in 0..2 {
        let (status, ack) = send(&app, "GET", "/api/init", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["message"], "Initialized successfully");
    }

    let (_, circles) = send(&app, "GET", "/api/circles", None, None).await;
    assert_eq!(circles.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn non_numeric_ids_are_bad_requests() {
    let (app, _) = common::create_test_app();

    let requests = [
        ("GET", "/api/posts/circle/abc"),
        ("POST", "/api/circles/abc/join"),
        ("DELETE", "/api/circles/abc/leave"),
        ("DELETE", "/api/posts/abc"),
        ("POST", "/api/posts/abc/like"),
        ("GET", "/api/posts/abc/comments"),
    ];
    for (method, uri) in requests {
        let (status, err) = send(&app, method, uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(err["message"], "Invalid id", "{method} {uri}");
        assert_eq!(err["errors"][0]["field"], "id", "{method} {uri}");
    }
}

#[tokio::test]
async fn repeated_limit_uses_first_value() {
    let (app, _) = common::create_test_app();
    for i in 0..3 {
        create_post(&app, "alice", &format!("post {i}"), 1).await;
    }

    let (status, feed) =
        send(&app, "GET", "/api/posts/feed?limit=2&limit=7", Some("bea"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed.as_array().unwrap().len(), 2);

    let (status, feed) = send(&app, "GET", "/api/posts/circle/1?limit=", Some("bea"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn text_is_stored_exactly_as_sent() {
    let (app, _) = common::create_test_app();
    let poem = "  indented first line\n    and the second\n";
    let post_id = create_post(&app, "alice", poem, 5).await;

    let (_, feed) = send(&app, "GET", "/api/posts/feed", Some("bea"), None).await;
    assert_eq!(find(&feed, post_id)["content"], poem);

    let uri = format!("/api/posts/{post_id}/comments");
    let (status, comment) =
        send(&app, "POST", &uri, Some("bea"), Some(json!({ "content": " love it " }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["content"], " love it ");
    let (_, comments) = send(&app, "GET", &uri, Some("alice"), None).await;
    assert_eq!(comments[0]["content"], " love it ");
}
