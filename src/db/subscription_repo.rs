use crate::models::{ChannelProfile, SubscriberProfile, Subscription};
use sqlx::PgPool;
use uuid::Uuid;

/// Idempotent create; returns the new row if one was inserted, `None` when the
/// (subscriber, channel) pair already exists. A single statement, so the
/// uniqueness invariant holds under concurrent togglers.
pub async fn insert_if_absent(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<Option<Subscription>, sqlx::Error> {
    let inserted = sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (subscriber_id, channel_id) DO NOTHING
        RETURNING id, subscriber_id, channel_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(subscriber_id)
    .bind(channel_id)
    .fetch_optional(pool)
    .await?;

    Ok(inserted)
}

/// Idempotent delete; returns true if a row was removed.
pub async fn delete_pair(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        DELETE FROM subscriptions
        WHERE subscriber_id = $1 AND channel_id = $2
        "#,
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

/// Profiles of everyone subscribed to the given channel
pub async fn list_channel_subscribers(
    pool: &PgPool,
    channel_id: Uuid,
) -> Result<Vec<SubscriberProfile>, sqlx::Error> {
    let subscribers = sqlx::query_as::<_, SubscriberProfile>(
        r#"
        SELECT u.id AS user_id, u.username, u.full_name, u.avatar_url
        FROM subscriptions s
        JOIN users u ON u.id = s.subscriber_id
        WHERE s.channel_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(channel_id)
    .fetch_all(pool)
    .await?;

    Ok(subscribers)
}

/// Profiles of every channel the given user subscribed to
pub async fn list_subscribed_channels(
    pool: &PgPool,
    subscriber_id: Uuid,
) -> Result<Vec<ChannelProfile>, sqlx::Error> {
    let channels = sqlx::query_as::<_, ChannelProfile>(
        r#"
        SELECT u.id AS user_id, u.username, u.avatar_url
        FROM subscriptions s
        JOIN users u ON u.id = s.channel_id
        WHERE s.subscriber_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(subscriber_id)
    .fetch_all(pool)
    .await?;

    Ok(channels)
}
