/// Comment handlers - HTTP endpoints for comment operations
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{comment_repo, video_repo};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{CommentListQuery, CreateCommentRequest, UpdateCommentRequest};
use crate::response::{ApiResponse, Page};

pub(crate) const DEFAULT_PAGE_LIMIT: i64 = 10;
pub(crate) const MAX_PAGE_LIMIT: i64 = 100;

/// Normalized (page, limit, offset) from optional query parameters.
///
/// The offset saturates rather than overflows, so an absurdly large page
/// number is a valid request that returns an empty page.
pub(crate) fn paginate(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    (page, limit, (page - 1).saturating_mul(limit))
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::ValidationError(format!("invalid {} id", what)))
}

/// Get a page of comments for a video
pub async fn get_video_comments(
    pool: web::Data<PgPool>,
    video_id: web::Path<String>,
    query: web::Query<CommentListQuery>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;

    if !video_repo::video_exists(pool.get_ref(), video_id).await? {
        return Err(AppError::NotFound("video not found".to_string()));
    }

    let (page, limit, offset) = paginate(query.page, query.limit);
    let items = comment_repo::get_comments_by_video(pool.get_ref(), video_id, limit, offset).await?;
    let total = comment_repo::count_comments_by_video(pool.get_ref(), video_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        Page {
            items,
            total,
            page,
            limit,
        },
        "comments fetched",
    )))
}

/// Add a comment to a video
pub async fn add_comment(
    pool: web::Data<PgPool>,
    video_id: web::Path<String>,
    user: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;

    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::ValidationError("comment content is required".to_string()));
    }

    if !video_repo::video_exists(pool.get_ref(), video_id).await? {
        return Err(AppError::NotFound("video not found".to_string()));
    }

    let comment = comment_repo::create_comment(pool.get_ref(), video_id, user.0, content).await?;
    tracing::debug!(comment_id = %comment.id, %video_id, "comment created");

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment, "comment added")))
}

/// Update a comment's content
pub async fn update_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<String>,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&comment_id, "comment")?;

    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::ValidationError("comment content is required".to_string()));
    }

    let comment = comment_repo::update_comment(pool.get_ref(), comment_id, content)
        .await?
        .ok_or_else(|| AppError::Internal("comment update affected no record".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment, "comment updated")))
}

/// Delete a comment
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<String>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&comment_id, "comment")?;

    if !comment_repo::delete_comment(pool.get_ref(), comment_id).await? {
        return Err(AppError::Internal("comment delete affected no record".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::Value::Null, "comment deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(paginate(None, None), (1, 10, 0));
        assert_eq!(paginate(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(paginate(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(paginate(Some(-5), Some(5000)), (1, MAX_PAGE_LIMIT, 0));
    }

    #[test]
    fn pagination_saturates_on_huge_page_numbers() {
        let (page, limit, offset) = paginate(Some(i64::MAX), Some(10));
        assert_eq!(page, i64::MAX);
        assert_eq!(limit, 10);
        assert_eq!(offset, i64::MAX);

        let (_, _, offset) = paginate(Some(i64::MAX - 1), None);
        assert!(offset >= 0);
    }

    #[test]
    fn id_parsing_reports_validation_error() {
        assert!(parse_id("b7a0e0c4-0000-0000-0000-000000000001", "video").is_ok());
        let err = parse_id("nope", "video").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
