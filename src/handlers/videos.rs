/// Video handlers - listing, publish, fetch, update, delete, publish toggle
use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{web, HttpResponse};
use bytes::Bytes;
use sqlx::PgPool;

use crate::db::video_repo::{self, VideoSort};
use crate::error::{AppError, Result};
use crate::handlers::comments::{paginate, parse_id};
use crate::middleware::UserId;
use crate::models::{Video, VideoListQuery};
use crate::response::{ApiResponse, Page};
use crate::services::media_store::{content_type_for, make_object_key};
use crate::services::MediaStore;

/// Multipart body for publishing a video
#[derive(Debug, MultipartForm)]
pub struct PublishVideoForm {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    /// Duration reported with the upload, in seconds
    pub duration_seconds: Option<Text<f64>>,
    pub video: Option<TempFile>,
    pub thumbnail: Option<TempFile>,
}

/// Multipart body for updating a video
#[derive(Debug, MultipartForm)]
pub struct UpdateVideoForm {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub thumbnail: Option<TempFile>,
}

/// Sort specification validated against the allow-listed columns, built fresh
/// per request.
pub(crate) fn parse_sort(sort_by: Option<&str>, sort_type: Option<&str>) -> Result<VideoSort> {
    let column = match sort_by {
        None => return default_direction(sort_type),
        Some("created_at") => "created_at",
        Some("updated_at") => "updated_at",
        Some("title") => "title",
        Some("duration") => "duration_seconds",
        Some(other) => {
            return Err(AppError::ValidationError(format!(
                "unsupported sort field: {}",
                other
            )))
        }
    };

    Ok(VideoSort {
        column,
        descending: parse_direction(sort_type)?,
    })
}

fn default_direction(sort_type: Option<&str>) -> Result<VideoSort> {
    Ok(VideoSort {
        descending: parse_direction(sort_type)?,
        ..VideoSort::default()
    })
}

fn parse_direction(sort_type: Option<&str>) -> Result<bool> {
    match sort_type.map(|s| s.to_ascii_lowercase()).as_deref() {
        None | Some("desc") => Ok(true),
        Some("asc") => Ok(false),
        Some(other) => Err(AppError::ValidationError(format!(
            "unsupported sort direction: {}",
            other
        ))),
    }
}

async fn read_upload(file: &TempFile) -> Result<Bytes> {
    let data = tokio::fs::read(file.file.path())
        .await
        .map_err(|e| AppError::Internal(format!("failed to read uploaded file: {}", e)))?;

    Ok(Bytes::from(data))
}

fn upload_name(file: &TempFile, fallback: &str) -> String {
    file.file_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// List videos with free-text filter, owner filter, sort, and pagination
pub async fn list_videos(
    pool: web::Data<PgPool>,
    query: web::Query<VideoListQuery>,
) -> Result<HttpResponse> {
    let sort = parse_sort(query.sort_by.as_deref(), query.sort_type.as_deref())?;
    let (page, limit, offset) = paginate(query.page, query.limit);
    let text = query
        .query
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let items =
        video_repo::list_videos(pool.get_ref(), text, query.user_id, sort, limit, offset).await?;
    let total = video_repo::count_videos(pool.get_ref(), text, query.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        Page {
            items,
            total,
            page,
            limit,
        },
        "videos fetched",
    )))
}

/// Publish a new video: store both media objects, then create the record.
///
/// Both uploads must succeed before the record exists. If a later step fails,
/// the objects already stored are deleted so nothing is left dangling.
pub async fn publish_video(
    pool: web::Data<PgPool>,
    store: web::Data<MediaStore>,
    user: UserId,
    form: MultipartForm<PublishVideoForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();

    let title = form
        .title
        .as_ref()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::ValidationError("title is required".to_string()))?
        .to_string();
    let description = form.description.as_ref().map(|d| d.0.clone());
    let duration_seconds = form.duration_seconds.map(|d| d.0).unwrap_or(0.0);
    if duration_seconds < 0.0 {
        return Err(AppError::ValidationError(
            "duration_seconds must not be negative".to_string(),
        ));
    }

    let video_file = form
        .video
        .as_ref()
        .ok_or_else(|| AppError::ValidationError("video file is required".to_string()))?;
    let thumbnail_file = form
        .thumbnail
        .as_ref()
        .ok_or_else(|| AppError::ValidationError("thumbnail file is required".to_string()))?;

    let video_name = upload_name(video_file, "video.mp4");
    let thumbnail_name = upload_name(thumbnail_file, "thumbnail.jpg");
    let video_key = make_object_key("videos", &video_name);
    let thumbnail_key = make_object_key("thumbnails", &thumbnail_name);

    let video_bytes = read_upload(video_file).await?;
    let thumbnail_bytes = read_upload(thumbnail_file).await?;

    let video_url = store
        .upload(&video_key, video_bytes, content_type_for(&video_name))
        .await?;

    let thumbnail_url = match store
        .upload(&thumbnail_key, thumbnail_bytes, content_type_for(&thumbnail_name))
        .await
    {
        Ok(url) => url,
        Err(err) => {
            // The record does not exist yet; undo the first upload.
            if let Err(cleanup) = store.delete(&video_key).await {
                tracing::warn!(key = %video_key, "orphaned video object after failed publish: {}", cleanup);
            }
            return Err(err);
        }
    };

    let created = video_repo::create_video(
        pool.get_ref(),
        user.0,
        &title,
        description.as_deref(),
        &video_url,
        &video_key,
        &thumbnail_url,
        &thumbnail_key,
        duration_seconds,
    )
    .await;

    let video = match created {
        Ok(video) => video,
        Err(err) => {
            for key in [&video_key, &thumbnail_key] {
                if let Err(cleanup) = store.delete(key).await {
                    tracing::warn!(%key, "orphaned media object after failed publish: {}", cleanup);
                }
            }
            return Err(err.into());
        }
    };

    tracing::info!(video_id = %video.id, owner = %user.0, "video published");
    Ok(HttpResponse::Created().json(ApiResponse::ok(video, "video published")))
}

/// Fetch a single video by id
pub async fn get_video_by_id(
    pool: web::Data<PgPool>,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;

    let video = video_repo::get_video_by_id(pool.get_ref(), video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(video, "video fetched")))
}

/// Update title/description and optionally replace the thumbnail.
///
/// A replacement thumbnail is stored before the row is touched, so the record
/// never points at a deleted object; the previous object is removed only after
/// the row update succeeds.
pub async fn update_video(
    pool: web::Data<PgPool>,
    store: web::Data<MediaStore>,
    video_id: web::Path<String>,
    user: UserId,
    form: MultipartForm<UpdateVideoForm>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;
    let form = form.into_inner();

    let title = form
        .title
        .as_ref()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty());
    let description = form.description.as_ref().map(|d| d.as_str());

    if title.is_none() && description.is_none() && form.thumbnail.is_none() {
        return Err(AppError::ValidationError("no update fields supplied".to_string()));
    }

    let existing = video_repo::get_video_by_id(pool.get_ref(), video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;

    if existing.owner_id != user.0 {
        return Err(AppError::Forbidden(
            "only the owner can update this video".to_string(),
        ));
    }

    let new_thumbnail = match form.thumbnail.as_ref() {
        Some(file) => {
            let name = upload_name(file, "thumbnail.jpg");
            let key = make_object_key("thumbnails", &name);
            let bytes = read_upload(file).await?;
            let url = store.upload(&key, bytes, content_type_for(&name)).await?;
            Some((url, key))
        }
        None => None,
    };

    let updated = video_repo::update_video(
        pool.get_ref(),
        video_id,
        title,
        description,
        new_thumbnail
            .as_ref()
            .map(|(url, key)| (url.as_str(), key.as_str())),
    )
    .await;

    let video = match updated {
        Ok(Some(video)) => video,
        Ok(None) => {
            // Row vanished between the fetch and the update.
            if let Some((_, key)) = &new_thumbnail {
                if let Err(cleanup) = store.delete(key).await {
                    tracing::warn!(%key, "orphaned thumbnail after failed update: {}", cleanup);
                }
            }
            return Err(AppError::NotFound("video not found".to_string()));
        }
        Err(err) => {
            if let Some((_, key)) = &new_thumbnail {
                if let Err(cleanup) = store.delete(key).await {
                    tracing::warn!(%key, "orphaned thumbnail after failed update: {}", cleanup);
                }
            }
            return Err(err.into());
        }
    };

    // The row now points at the new object; the old one is unreferenced.
    if new_thumbnail.is_some() {
        if let Err(err) = store.delete(&existing.thumbnail_key).await {
            tracing::warn!(key = %existing.thumbnail_key, "stale thumbnail cleanup failed: {}", err);
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(video, "video updated")))
}

/// Delete a video record, then clean up its media objects asynchronously.
pub async fn delete_video(
    pool: web::Data<PgPool>,
    store: web::Data<MediaStore>,
    video_id: web::Path<String>,
    user: UserId,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;

    let video = video_repo::get_video_by_id(pool.get_ref(), video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;

    if video.owner_id != user.0 {
        return Err(AppError::Forbidden(
            "only the owner can delete this video".to_string(),
        ));
    }

    // Row first: once it is gone no reader can reach the media URLs, and a
    // failed remote delete can never orphan the record.
    if !video_repo::delete_video(pool.get_ref(), video_id).await? {
        return Err(AppError::Internal("video delete affected no record".to_string()));
    }

    let store = store.get_ref().clone();
    let keys = [video.video_key.clone(), video.thumbnail_key.clone()];
    tokio::spawn(async move {
        for key in keys {
            delete_with_retry(&store, &key).await;
        }
    });

    tracing::info!(%video_id, owner = %user.0, "video deleted");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::Value::Null, "video deleted")))
}

async fn delete_with_retry(store: &MediaStore, key: &str) {
    const ATTEMPTS: u32 = 3;

    for attempt in 1..=ATTEMPTS {
        match store.delete(key).await {
            Ok(()) => return,
            Err(err) if attempt < ATTEMPTS => {
                tracing::warn!(%key, attempt, "media cleanup failed, retrying: {}", err);
                tokio::time::sleep(std::time::Duration::from_millis(200 * u64::from(attempt)))
                    .await;
            }
            Err(err) => {
                tracing::error!(%key, "media cleanup exhausted retries: {}", err);
            }
        }
    }
}

/// Flip the published flag for an owned video
pub async fn toggle_publish_status(
    pool: web::Data<PgPool>,
    video_id: web::Path<String>,
    user: UserId,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;

    let video = video_repo::get_video_by_id(pool.get_ref(), video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;

    if video.owner_id != user.0 {
        return Err(AppError::Forbidden(
            "only the owner can toggle this video".to_string(),
        ));
    }

    let video: Video = video_repo::toggle_publish(pool.get_ref(), video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(video, "publish status toggled")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_created_at_desc() {
        let sort = parse_sort(None, None).unwrap();
        assert_eq!(sort.column, "created_at");
        assert!(sort.descending);
    }

    #[test]
    fn sort_maps_duration_to_column_name() {
        let sort = parse_sort(Some("duration"), Some("asc")).unwrap();
        assert_eq!(sort.column, "duration_seconds");
        assert!(!sort.descending);
    }

    #[test]
    fn sort_direction_is_case_insensitive() {
        assert!(!parse_sort(Some("title"), Some("ASC")).unwrap().descending);
        assert!(parse_sort(Some("title"), Some("Desc")).unwrap().descending);
    }

    #[test]
    fn sort_rejects_unknown_field_and_direction() {
        assert!(matches!(
            parse_sort(Some("owner_id; DROP TABLE videos"), None),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            parse_sort(Some("title"), Some("sideways")),
            Err(AppError::ValidationError(_))
        ));
    }
}
