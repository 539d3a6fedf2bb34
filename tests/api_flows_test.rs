//! Integration tests for the comment, subscription, and video endpoints.
//!
//! These run against a real PostgreSQL instance and are ignored by default;
//! set DATABASE_URL (or TEST_DATABASE_URL) and run with `--ignored`.

use actix_web::{test, web, App};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use vidtube_service::config::S3Config;
use vidtube_service::handlers;
use vidtube_service::middleware::USER_ID_HEADER;
use vidtube_service::services::MediaStore;

async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("TEST_DATABASE_URL or DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to apply migrations");

    pool
}

/// Media store pointed at nothing; only exercised on paths that must not
/// reach the object store.
async fn offline_media_store() -> MediaStore {
    MediaStore::new(&S3Config {
        bucket: "vidtube-test".to_string(),
        region: "us-east-1".to_string(),
        access_key_id: Some("test".to_string()),
        secret_access_key: Some("test".to_string()),
        endpoint: Some("http://127.0.0.1:1".to_string()),
        public_base_url: "http://127.0.0.1:1/vidtube-test".to_string(),
    })
    .await
}

const MULTIPART_BOUNDARY: &str = "vidtube-test-boundary";

/// multipart/form-data body holding only text fields.
fn multipart_text_body(fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; \
                 name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_content_type() -> (&'static str, String) {
    (
        "content-type",
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
    )
}

async fn seed_user(pool: &PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, username, full_name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(format!("user-{}", id.simple()))
        .bind("Test User")
        .execute(pool)
        .await
        .expect("seed user");
    id
}

async fn seed_video(pool: &PgPool, owner_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO videos (id, owner_id, title, description, video_url, video_key, \
         thumbnail_url, thumbnail_key, duration_seconds) \
         VALUES ($1, $2, 'clip', 'a clip', 'http://media/v.mp4', 'videos/v.mp4', \
         'http://media/t.jpg', 'thumbnails/t.jpg', 12.5)",
    )
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await
    .expect("seed video");
    id
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn toggle_subscription_twice_is_self_inverse() {
    let pool = test_pool().await;
    let subscriber = seed_user(&pool).await;
    let channel = seed_user(&pool).await;

    let app = test::init_service(
        App::new().app_data(web::Data::new(pool.clone())).route(
            "/channels/{channel_id}/subscription",
            web::post().to(handlers::toggle_subscription),
        ),
    )
    .await;

    let uri = format!("/channels/{}/subscription", channel);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header((USER_ID_HEADER, subscriber.to_string()))
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "subscribed");
    assert_eq!(body["success"], true);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header((USER_ID_HEADER, subscriber.to_string()))
            .to_request(),
    )
    .await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "unsubscribed");

    let remaining: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2",
    )
    .bind(subscriber)
    .bind(channel)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(remaining, 0);
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn comment_listing_respects_limit_and_video_scope() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    let video = seed_video(&pool, owner).await;
    let other_video = seed_video(&pool, owner).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .route(
                "/videos/{video_id}/comments",
                web::get().to(handlers::get_video_comments),
            )
            .route(
                "/videos/{video_id}/comments",
                web::post().to(handlers::add_comment),
            ),
    )
    .await;

    for i in 0..5 {
        let target = if i == 4 { other_video } else { video };
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/videos/{}/comments", target))
                .insert_header((USER_ID_HEADER, owner.to_string()))
                .set_json(serde_json::json!({"content": format!("comment {}", i)}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/videos/{}/comments?page=1&limit=3", video))
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;

    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(body["data"]["total"], 4);
    for item in items {
        assert_eq!(item["video_id"], video.to_string());
    }
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn empty_comment_is_rejected_and_not_stored() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    let video = seed_video(&pool, owner).await;

    let app = test::init_service(
        App::new().app_data(web::Data::new(pool.clone())).route(
            "/videos/{video_id}/comments",
            web::post().to(handlers::add_comment),
        ),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/videos/{}/comments", video))
            .insert_header((USER_ID_HEADER, owner.to_string()))
            .set_json(serde_json::json!({"content": "   "}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE video_id = $1")
        .bind(video)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn comment_update_changes_only_content() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    let video = seed_video(&pool, owner).await;

    let comment =
        vidtube_service::db::comment_repo::create_comment(&pool, video, owner, "before").await
            .unwrap();

    let app = test::init_service(
        App::new().app_data(web::Data::new(pool.clone())).route(
            "/comments/{comment_id}",
            web::patch().to(handlers::update_comment),
        ),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/comments/{}", comment.id))
            .set_json(serde_json::json!({"content": "after"}))
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;

    assert_eq!(body["data"]["content"], "after");
    assert_eq!(body["data"]["id"], comment.id.to_string());
    assert_eq!(body["data"]["video_id"], comment.video_id.to_string());
    assert_eq!(body["data"]["user_id"], comment.user_id.to_string());
    assert_eq!(
        body["data"]["created_at"],
        serde_json::to_value(comment.created_at).unwrap()
    );
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn metadata_update_preserves_unsupplied_fields() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    let video = seed_video(&pool, owner).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(offline_media_store().await))
            .route("/videos/{video_id}", web::patch().to(handlers::update_video)),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/videos/{}", video))
            .insert_header((USER_ID_HEADER, owner.to_string()))
            .insert_header(multipart_content_type())
            .set_payload(multipart_text_body(&[("title", "renamed clip")]))
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;

    assert_eq!(body["data"]["title"], "renamed clip");
    assert_eq!(body["data"]["description"], "a clip");
    assert_eq!(body["data"]["video_url"], "http://media/v.mp4");
    assert_eq!(body["data"]["thumbnail_url"], "http://media/t.jpg");
    assert_eq!(body["data"]["thumbnail_key"], "thumbnails/t.jpg");
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn update_without_fields_is_rejected() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    let video = seed_video(&pool, owner).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(offline_media_store().await))
            .route("/videos/{video_id}", web::patch().to(handlers::update_video)),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/videos/{}", video))
            .insert_header((USER_ID_HEADER, owner.to_string()))
            .insert_header(multipart_content_type())
            .set_payload(multipart_text_body(&[]))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let title: String = sqlx::query_scalar("SELECT title FROM videos WHERE id = $1")
        .bind(video)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(title, "clip");
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn non_owner_delete_is_forbidden_and_leaves_record() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    let stranger = seed_user(&pool).await;
    let video = seed_video(&pool, owner).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(offline_media_store().await))
            .route("/videos/{video_id}", web::delete().to(handlers::delete_video)),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/videos/{}", video))
            .insert_header((USER_ID_HEADER, stranger.to_string()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    let still_there: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
            .bind(video)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(still_there);
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn toggle_publish_twice_restores_original_flag() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    let video = seed_video(&pool, owner).await;

    let app = test::init_service(
        App::new().app_data(web::Data::new(pool.clone())).route(
            "/videos/{video_id}/toggle-publish",
            web::patch().to(handlers::toggle_publish_status),
        ),
    )
    .await;

    let original: bool = sqlx::query_scalar("SELECT is_published FROM videos WHERE id = $1")
        .bind(video)
        .fetch_one(&pool)
        .await
        .unwrap();

    for expected in [!original, original] {
        let resp = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/videos/{}/toggle-publish", video))
                .insert_header((USER_ID_HEADER, owner.to_string()))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["is_published"], expected);
    }
}

#[actix_web::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn video_listing_filters_sorts_and_rejects_bad_sort() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    seed_video(&pool, owner).await;
    seed_video(&pool, owner).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .route("/videos", web::get().to(handlers::list_videos)),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/videos?user_id={}&query=clip&sort_by=title&sort_type=asc&limit=1",
                owner
            ))
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["total"], 2);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/videos?sort_by=video_key")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
}
