/// Subscription handlers - toggle plus the two profile-list joins
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::db::subscription_repo;
use crate::error::Result;
use crate::handlers::comments::parse_id;
use crate::middleware::UserId;
use crate::response::ApiResponse;

/// Toggle the caller's subscription to a channel.
///
/// No read-then-write: a conditional insert runs first, and only when the pair
/// already existed does the paired delete run. Each statement is atomic and
/// the unique (subscriber, channel) constraint holds under concurrent calls.
pub async fn toggle_subscription(
    pool: web::Data<PgPool>,
    channel_id: web::Path<String>,
    user: UserId,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&channel_id, "channel")?;

    if let Some(subscription) =
        subscription_repo::insert_if_absent(pool.get_ref(), user.0, channel_id).await?
    {
        tracing::debug!(subscriber = %user.0, channel = %channel_id, "subscribed");
        return Ok(HttpResponse::Ok().json(ApiResponse::ok(Some(subscription), "subscribed")));
    }

    // Already subscribed; a concurrent unsubscribe landing first makes the
    // delete a no-op, which reports the same final state.
    subscription_repo::delete_pair(pool.get_ref(), user.0, channel_id).await?;
    tracing::debug!(subscriber = %user.0, channel = %channel_id, "unsubscribed");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(None::<crate::models::Subscription>, "unsubscribed")))
}

/// List subscriber profiles of a channel
pub async fn get_channel_subscribers(
    pool: web::Data<PgPool>,
    channel_id: web::Path<String>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&channel_id, "channel")?;
    let subscribers = subscription_repo::list_channel_subscribers(pool.get_ref(), channel_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(subscribers, "subscribers fetched")))
}

/// List channel profiles a user has subscribed to
pub async fn get_subscribed_channels(
    pool: web::Data<PgPool>,
    subscriber_id: web::Path<String>,
) -> Result<HttpResponse> {
    let subscriber_id = parse_id(&subscriber_id, "subscriber")?;
    let channels =
        subscription_repo::list_subscribed_channels(pool.get_ref(), subscriber_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(channels, "subscribed channels fetched")))
}
