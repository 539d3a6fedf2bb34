/// Data models for vidtube-service
///
/// This module defines structures for:
/// - Comment: comments attached to a video
/// - Subscription: (subscriber, channel) pairs
/// - Video: video metadata plus object-store locators
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Video database entity
///
/// `video_key` / `thumbnail_key` are the object-store keys kept so the remote
/// assets can be deleted together with the record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub video_key: String,
    pub thumbnail_url: String,
    pub thumbnail_key: String,
    pub duration_seconds: f64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscriber profile fields returned by the channel-subscribers join
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubscriberProfile {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Channel profile fields returned by the subscribed-channels join
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChannelProfile {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Request body for creating a comment
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Request body for updating a comment
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// Query parameters for the video listing endpoint
#[derive(Debug, Deserialize)]
pub struct VideoListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive substring matched over title and description
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Query parameters for comment listing
#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
