use crate::models::Video;
use sqlx::PgPool;
use uuid::Uuid;

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_url, video_key, \
     thumbnail_url, thumbnail_key, duration_seconds, is_published, created_at, updated_at";

/// Sort specification for the listing query. `column` is always one of the
/// allow-listed identifiers from `handlers::videos`, never caller input.
#[derive(Debug, Clone, Copy)]
pub struct VideoSort {
    pub column: &'static str,
    pub descending: bool,
}

impl Default for VideoSort {
    fn default() -> Self {
        Self {
            column: "created_at",
            descending: true,
        }
    }
}

fn like_pattern(text: &str) -> String {
    // Backslash is the default ILIKE escape character in Postgres.
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn build_filter(text: Option<&str>, owner_id: Option<Uuid>) -> (String, Vec<&'static str>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();
    let mut idx = 1;

    if text.is_some() {
        conditions.push(format!(
            "(title ILIKE ${idx} OR description ILIKE ${idx})"
        ));
        binds.push("text");
        idx += 1;
    }
    if owner_id.is_some() {
        conditions.push(format!("owner_id = ${idx}"));
        binds.push("owner");
    }

    let clause = if conditions.is_empty() {
        "TRUE".to_string()
    } else {
        conditions.join(" AND ")
    };

    (clause, binds)
}

/// List videos matching an optional free-text filter and owner filter.
pub async fn list_videos(
    pool: &PgPool,
    text: Option<&str>,
    owner_id: Option<Uuid>,
    sort: VideoSort,
    limit: i64,
    offset: i64,
) -> Result<Vec<Video>, sqlx::Error> {
    let (clause, binds) = build_filter(text, owner_id);
    let direction = if sort.descending { "DESC" } else { "ASC" };
    let limit_idx = binds.len() + 1;
    let offset_idx = binds.len() + 2;

    let sql = format!(
        "SELECT {VIDEO_COLUMNS} FROM videos WHERE {clause} \
         ORDER BY {} {} LIMIT ${} OFFSET ${}",
        sort.column, direction, limit_idx, offset_idx
    );

    let mut query = sqlx::query_as::<_, Video>(&sql);
    for bind in binds {
        query = match bind {
            "text" => query.bind(like_pattern(text.unwrap_or_default())),
            _ => query.bind(owner_id),
        };
    }

    query.bind(limit).bind(offset).fetch_all(pool).await
}

/// Count videos matching the same filter as `list_videos`.
pub async fn count_videos(
    pool: &PgPool,
    text: Option<&str>,
    owner_id: Option<Uuid>,
) -> Result<i64, sqlx::Error> {
    let (clause, binds) = build_filter(text, owner_id);
    let sql = format!("SELECT COUNT(*) FROM videos WHERE {clause}");

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for bind in binds {
        query = match bind {
            "text" => query.bind(like_pattern(text.unwrap_or_default())),
            _ => query.bind(owner_id),
        };
    }

    query.fetch_one(pool).await
}

/// Create a video record carrying both media locators and storage keys.
#[allow(clippy::too_many_arguments)]
pub async fn create_video(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
    description: Option<&str>,
    video_url: &str,
    video_key: &str,
    thumbnail_url: &str,
    thumbnail_key: &str,
    duration_seconds: f64,
) -> Result<Video, sqlx::Error> {
    let sql = format!(
        "INSERT INTO videos (id, owner_id, title, description, video_url, video_key, \
         thumbnail_url, thumbnail_key, duration_seconds) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {VIDEO_COLUMNS}"
    );

    sqlx::query_as::<_, Video>(&sql)
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(video_url)
        .bind(video_key)
        .bind(thumbnail_url)
        .bind(thumbnail_key)
        .bind(duration_seconds)
        .fetch_one(pool)
        .await
}

pub async fn get_video_by_id(pool: &PgPool, video_id: Uuid) -> Result<Option<Video>, sqlx::Error> {
    let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1");

    sqlx::query_as::<_, Video>(&sql)
        .bind(video_id)
        .fetch_optional(pool)
        .await
}

pub async fn video_exists(pool: &PgPool, video_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
        .bind(video_id)
        .fetch_one(pool)
        .await
}

/// Update metadata and/or the thumbnail locator pair. Only the supplied fields
/// are written; returns the updated row if one matched.
pub async fn update_video(
    pool: &PgPool,
    video_id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    thumbnail: Option<(&str, &str)>,
) -> Result<Option<Video>, sqlx::Error> {
    let mut set_clauses = Vec::new();
    let mut param_idx = 2;

    if title.is_some() {
        set_clauses.push(format!("title = ${param_idx}"));
        param_idx += 1;
    }
    if description.is_some() {
        set_clauses.push(format!("description = ${param_idx}"));
        param_idx += 1;
    }
    if thumbnail.is_some() {
        set_clauses.push(format!("thumbnail_url = ${param_idx}"));
        param_idx += 1;
        set_clauses.push(format!("thumbnail_key = ${param_idx}"));
    }

    if set_clauses.is_empty() {
        return get_video_by_id(pool, video_id).await;
    }

    set_clauses.push("updated_at = NOW()".to_string());

    let sql = format!(
        "UPDATE videos SET {} WHERE id = $1 RETURNING {VIDEO_COLUMNS}",
        set_clauses.join(", ")
    );

    let mut query = sqlx::query_as::<_, Video>(&sql).bind(video_id);
    if let Some(v) = title {
        query = query.bind(v);
    }
    if let Some(v) = description {
        query = query.bind(v);
    }
    if let Some((url, key)) = thumbnail {
        query = query.bind(url).bind(key);
    }

    query.fetch_optional(pool).await
}

/// Delete a video record; returns true if a row was removed.
pub async fn delete_video(pool: &PgPool, video_id: Uuid) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(video_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

/// Atomically flip the published flag; returns the updated row if one matched.
pub async fn toggle_publish(pool: &PgPool, video_id: Uuid) -> Result<Option<Video>, sqlx::Error> {
    let sql = format!(
        "UPDATE videos SET is_published = NOT is_published, updated_at = NOW() \
         WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
    );

    sqlx::query_as::<_, Video>(&sql)
        .bind(video_id)
        .fetch_optional(pool)
        .await
}
