mod common;

use blogdesk::{models::BlogStatus, BlogQueryParams, CreateBlogRequest, UpdateBlogRequest};
use common::{blog_request, email_for, spawn_app, spawn_app_with};
use reqwest::StatusCode;

fn public_query() -> BlogQueryParams {
    BlogQueryParams {
        page: 1,
        limit: 10,
        ..Default::default()
    }
}

#[tokio::test]
async fn new_blogs_are_pending_and_private_until_approved() {
    let app = spawn_app().await;
    let (author, user) = app.register("Ada").await;

    let blog = author.create_blog(&blog_request("Lifetimes")).await.unwrap().data;
    assert_eq!(blog.status, BlogStatus::Pending);
    assert_eq!(blog.author.id, user.id);
    assert_eq!(blog.cover_image, "default-cover.jpg");
    assert_eq!(blog.read_time, 1);
    assert_eq!(blog.tags, vec!["rust".to_string()]);

    let submitted = app.notifier.sent_to(&email_for("Ada"));
    assert!(submitted
        .iter()
        .any(|n| n.subject == "Blog Submitted Successfully"));

    let anonymous = app.client().get_blog(blog.id).await.unwrap_err();
    assert_eq!(anonymous.status(), Some(StatusCode::FORBIDDEN));
    let (stranger, _) = app.register("Eve").await;
    assert_eq!(
        stranger.get_blog(blog.id).await.unwrap_err().status(),
        Some(StatusCode::FORBIDDEN)
    );
    assert_eq!(author.get_blog(blog.id).await.unwrap().data.blog.id, blog.id);

    let listed = app.client().list_blogs(&public_query()).await.unwrap();
    assert_eq!(listed.total, 0);

    app.admin().await.approve_blog(blog.id).await.unwrap();
    let listed = app.client().list_blogs(&public_query()).await.unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.data[0].id, blog.id);
    assert_eq!(listed.data[0].status, BlogStatus::Published);
}

#[tokio::test]
async fn author_edit_of_published_blog_returns_it_to_review() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let blog = app.publish(&author, "Borrowing").await;

    let excerpt_only = author
        .update_blog(
            blog.id,
            &UpdateBlogRequest {
                excerpt: Some("A new excerpt".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .data;
    assert_eq!(excerpt_only.status, BlogStatus::Published);

    let retitled = author
        .update_blog(
            blog.id,
            &UpdateBlogRequest {
                title: Some("Borrowing, revisited".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .data;
    assert_eq!(retitled.status, BlogStatus::Pending);
    assert_eq!(retitled.title, "Borrowing, revisited");

    let listed = app.client().list_blogs(&public_query()).await.unwrap();
    assert!(listed.data.iter().all(|b| b.id != blog.id));
}

#[tokio::test]
async fn authors_cannot_touch_status_or_other_peoples_blogs() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let (other, _) = app.register("Eve").await;
    let blog = author.create_blog(&blog_request("Traits")).await.unwrap().data;

    let status = author
        .update_blog(
            blog.id,
            &UpdateBlogRequest {
                status: Some("published".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(status.status(), Some(StatusCode::BAD_REQUEST));
    let unchanged = author.get_blog(blog.id).await.unwrap().data.blog;
    assert_eq!(unchanged.status, BlogStatus::Pending);

    let foreign = other
        .update_blog(
            blog.id,
            &UpdateBlogRequest {
                title: Some("Mine now".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(foreign.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(
        other.delete_blog(blog.id).await.unwrap_err().status(),
        Some(StatusCode::FORBIDDEN)
    );
    assert_eq!(
        app.client()
            .create_blog(&blog_request("Anonymous"))
            .await
            .unwrap_err()
            .status(),
        Some(StatusCode::UNAUTHORIZED)
    );
}

#[tokio::test]
async fn author_update_with_unknown_keys_writes_nothing() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let blog = app.publish(&author, "Ownership").await;
    let http = reqwest::Client::new();
    let url = app.url(&format!("/api/blogs/{}", blog.id));

    let sneaky = http
        .put(&url)
        .bearer_auth(author.token().unwrap())
        .json(&serde_json::json!({ "title": "Sneaky", "views": 9999, "author": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(sneaky.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = sneaky.json().await.unwrap();
    assert_eq!(body["success"], false);

    let empty = http
        .put(&url)
        .bearer_auth(author.token().unwrap())
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let stored = author.get_blog(blog.id).await.unwrap().data.blog;
    assert_eq!(stored.title, "Ownership");
    assert_eq!(stored.status, BlogStatus::Published);
    assert_eq!(stored.author.id, blog.author.id);
}

#[tokio::test]
async fn blog_input_is_validated() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;

    let missing_title = author
        .create_blog(&CreateBlogRequest {
            title: "   ".to_string(),
            ..blog_request("x")
        })
        .await
        .unwrap_err();
    assert_eq!(missing_title.status(), Some(StatusCode::BAD_REQUEST));
    assert!(missing_title.to_string().contains("title"));

    let long_excerpt = author
        .create_blog(&CreateBlogRequest {
            excerpt: "x".repeat(201),
            ..blog_request("Long")
        })
        .await
        .unwrap_err();
    assert_eq!(long_excerpt.status(), Some(StatusCode::BAD_REQUEST));

    assert_eq!(
        app.client().get_blog(9999).await.unwrap_err().status(),
        Some(StatusCode::NOT_FOUND)
    );
}

#[tokio::test]
async fn like_then_unlike_restores_likes() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let (reader, reader_user) = app.register("Bob").await;
    let blog = app.publish(&author, "Closures").await;

    let liked = reader.like_blog(blog.id).await.unwrap();
    assert_eq!(liked.message.as_deref(), Some("Blog liked"));
    assert_eq!(liked.data.likes, vec![reader_user.id]);
    assert_eq!(liked.data.likes_count, 1);
    assert_eq!(
        author.blog_analytics(blog.id).await.unwrap().data.likes,
        1
    );

    let unliked = reader.like_blog(blog.id).await.unwrap();
    assert_eq!(unliked.message.as_deref(), Some("Blog unliked"));
    assert!(unliked.data.likes.is_empty());
    assert_eq!(
        author.blog_analytics(blog.id).await.unwrap().data.likes,
        0
    );

    assert_eq!(
        app.client().like_blog(blog.id).await.unwrap_err().status(),
        Some(StatusCode::UNAUTHORIZED)
    );
}

#[tokio::test]
async fn anonymous_reader_counts_once_per_window() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let blog = app.publish(&author, "Iterators").await;

    let reader = app.client().forwarded_for("203.0.113.7");
    let first = reader.get_blog(blog.id).await.unwrap().data.blog;
    assert_eq!(first.views, 1);
    let second = reader.get_blog(blog.id).await.unwrap().data.blog;
    assert_eq!(second.views, 1);

    let other = app.client().forwarded_for("198.51.100.2, 10.0.0.1");
    assert_eq!(other.get_blog(blog.id).await.unwrap().data.blog.views, 2);

    let analytics = author.blog_analytics(blog.id).await.unwrap().data;
    assert_eq!(analytics.views, 2);
    assert_eq!(analytics.views_history.len(), 2);
    assert!(analytics.views_history.iter().all(|entry| entry.count == 1));
}

#[tokio::test]
async fn expired_view_window_counts_the_reader_again() {
    let app = spawn_app_with(|config| config.view_window_hours = 0).await;
    let (author, _) = app.register("Ada").await;
    let blog = app.publish(&author, "Closures").await;

    let reader = app.client().forwarded_for("203.0.113.7");
    assert_eq!(reader.get_blog(blog.id).await.unwrap().data.blog.views, 1);
    assert_eq!(reader.get_blog(blog.id).await.unwrap().data.blog.views, 2);

    let analytics = author.blog_analytics(blog.id).await.unwrap().data;
    assert_eq!(analytics.views, 2);
    assert_eq!(analytics.views_history.len(), 2);
}

#[tokio::test]
async fn signed_in_reader_is_one_identity_across_addresses() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let blog = app.publish(&author, "Generics").await;
    let (reader, _) = app.register("Bob").await;

    let at_home = reader.clone().forwarded_for("192.0.2.1");
    let at_work = reader.forwarded_for("192.0.2.99");
    assert_eq!(at_home.get_blog(blog.id).await.unwrap().data.blog.views, 1);
    assert_eq!(at_work.get_blog(blog.id).await.unwrap().data.blog.views, 1);
}

#[tokio::test]
async fn comments_threads_and_notifications() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let (reader, reader_user) = app.register("Bob").await;
    let blog = app.publish(&author, "Async").await;
    let other_blog = app.publish(&author, "Await").await;

    let comment = reader
        .add_comment(blog.id, "  Great post  ", None)
        .await
        .unwrap()
        .data;
    assert_eq!(comment.content, "Great post");
    assert_eq!(comment.user.id, reader_user.id);
    assert_eq!(comment.parent, None);

    let reply = author
        .add_comment(blog.id, "Thanks!", Some(comment.id))
        .await
        .unwrap()
        .data;
    assert_eq!(reply.parent, Some(comment.id));

    let cross_blog = reader
        .add_comment(other_blog.id, "Wrong thread", Some(comment.id))
        .await
        .unwrap_err();
    assert_eq!(cross_blog.status(), Some(StatusCode::BAD_REQUEST));
    let missing_parent = reader
        .add_comment(blog.id, "Orphan", Some(424242))
        .await
        .unwrap_err();
    assert_eq!(missing_parent.status(), Some(StatusCode::NOT_FOUND));
    let empty = reader.add_comment(blog.id, "   ", None).await.unwrap_err();
    assert_eq!(empty.status(), Some(StatusCode::BAD_REQUEST));

    let comments = app.client().comments(blog.id).await.unwrap();
    assert_eq!(comments.count, 2);
    assert_eq!(comments.data[0].id, reply.id);

    let comment_notices: Vec<_> = app
        .notifier
        .sent_to(&email_for("Ada"))
        .into_iter()
        .filter(|n| n.subject == "New Comment on Your Blog")
        .collect();
    assert_eq!(comment_notices.len(), 1);
    assert!(comment_notices[0].body.contains("Bob"));

    let detail = app.client().get_blog(blog.id).await.unwrap().data;
    assert_eq!(detail.comments.len(), 2);
    assert_eq!(author.blog_analytics(blog.id).await.unwrap().data.comments, 2);
}

#[tokio::test]
async fn comment_likes_toggle() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let (reader, reader_user) = app.register("Bob").await;
    let blog = app.publish(&author, "Macros").await;
    let comment = author.add_comment(blog.id, "First", None).await.unwrap().data;

    let liked = reader.like_comment(comment.id).await.unwrap().data;
    assert_eq!(liked.likes, vec![reader_user.id]);
    let unliked = reader.like_comment(comment.id).await.unwrap().data;
    assert!(unliked.likes.is_empty());
    assert_eq!(
        reader.like_comment(999).await.unwrap_err().status(),
        Some(StatusCode::NOT_FOUND)
    );
}

#[tokio::test]
async fn deleting_a_blog_removes_its_comments() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let (reader, _) = app.register("Bob").await;
    let blog = app.publish(&author, "Pinning").await;
    let comment = reader.add_comment(blog.id, "Hmm", None).await.unwrap().data;
    reader.like_comment(comment.id).await.unwrap();
    reader.like_blog(blog.id).await.unwrap();
    app.client().get_blog(blog.id).await.unwrap();

    author.delete_blog(blog.id).await.unwrap();

    assert_eq!(
        app.client().comments(blog.id).await.unwrap_err().status(),
        Some(StatusCode::NOT_FOUND)
    );
    assert_eq!(
        reader.like_comment(comment.id).await.unwrap_err().status(),
        Some(StatusCode::NOT_FOUND)
    );
    assert!(reader.liked_blogs().await.unwrap().data.is_empty());
}

#[tokio::test]
async fn list_filters_combine_and_paginate() {
    let app = spawn_app().await;
    let (ada, ada_user) = app.register("Ada").await;
    let (bob, _) = app.register("Bob").await;
    let admin = app.admin().await;

    let mut ids = vec![];
    for (client, title, tags) in [
        (&ada, "Tokio internals", vec!["async", "rust"]),
        (&ada, "Sqlite tricks", vec!["database"]),
        (&bob, "Async cooking", vec!["async", "food"]),
    ] {
        let blog = client
            .create_blog(&CreateBlogRequest {
                tags: tags.into_iter().map(str::to_string).collect(),
                ..blog_request(title)
            })
            .await
            .unwrap()
            .data;
        admin.approve_blog(blog.id).await.unwrap();
        ids.push(blog.id);
    }

    let client = app.client();
    let by_tag = client
        .list_blogs(&BlogQueryParams {
            tag: Some("async".to_string()),
            ..public_query()
        })
        .await
        .unwrap();
    assert_eq!(by_tag.total, 2);

    let tag_and_author = client
        .list_blogs(&BlogQueryParams {
            tag: Some("async".to_string()),
            author: Some(ada_user.id),
            ..public_query()
        })
        .await
        .unwrap();
    assert_eq!(tag_and_author.total, 1);
    assert_eq!(tag_and_author.data[0].id, ids[0]);

    let search = client
        .list_blogs(&BlogQueryParams {
            search: Some("SQLITE".to_string()),
            ..public_query()
        })
        .await
        .unwrap();
    assert_eq!(search.total, 1);
    assert_eq!(search.data[0].id, ids[1]);

    let search_by_tag = client
        .list_blogs(&BlogQueryParams {
            search: Some("food".to_string()),
            ..public_query()
        })
        .await
        .unwrap();
    assert_eq!(search_by_tag.total, 1);

    let first_page = client
        .list_blogs(&BlogQueryParams {
            limit: 2,
            ..public_query()
        })
        .await
        .unwrap();
    assert_eq!(first_page.count, 2);
    assert_eq!(first_page.total, 3);
    assert!(first_page.pagination.next.is_some());
    assert!(first_page.pagination.prev.is_none());

    let second_page = client
        .list_blogs(&BlogQueryParams {
            page: 2,
            limit: 2,
            ..public_query()
        })
        .await
        .unwrap();
    assert_eq!(second_page.count, 1);
    assert!(second_page.pagination.next.is_none());
    assert!(second_page.pagination.prev.is_some());
}

#[tokio::test]
async fn search_wildcards_match_literally() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    app.publish(&author, "Plain title").await;
    let percent = app.publish(&author, "100% safe").await;

    let client = app.client();
    for (term, expected) in [("%", 1), ("_", 0), ("100%", 1)] {
        let found = client
            .list_blogs(&BlogQueryParams {
                search: Some(term.to_string()),
                ..public_query()
            })
            .await
            .unwrap();
        assert_eq!(found.total, expected, "search {term:?}");
        if expected == 1 {
            assert_eq!(found.data[0].id, percent.id);
        }
    }
}

#[tokio::test]
async fn huge_page_number_returns_an_empty_page() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    app.publish(&author, "Only one").await;

    let page = app
        .client()
        .list_blogs(&BlogQueryParams {
            page: 500_000_000,
            ..public_query()
        })
        .await
        .unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 1);
    assert!(page.pagination.next.is_none());
}

#[tokio::test]
async fn trending_orders_by_likes_then_views() {
    let app = spawn_app().await;
    let (author, _) = app.register("Ada").await;
    let (reader, _) = app.register("Bob").await;
    let quiet = app.publish(&author, "Quiet").await;
    let viewed = app.publish(&author, "Viewed").await;
    let liked = app.publish(&author, "Liked").await;

    reader.like_blog(liked.id).await.unwrap();
    app.client()
        .forwarded_for("203.0.113.50")
        .get_blog(viewed.id)
        .await
        .unwrap();

    let trending = app.client().trending_blogs(5).await.unwrap();
    let order: Vec<i64> = trending.data.iter().map(|b| b.id).collect();
    assert_eq!(order, vec![liked.id, viewed.id, quiet.id]);

    let top = app.client().trending_blogs(1).await.unwrap();
    assert_eq!(top.count, 1);
}
