/// Object-store client for uploaded media
///
/// Wraps the S3 SDK for the two asset kinds this service owns: video files and
/// thumbnails. Records in the `videos` table keep both the public URL and the
/// object key returned here, so assets can be deleted when the record goes.
use crate::config::S3Config;
use crate::error::{AppError, Result};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use uuid::Uuid;

#[derive(Clone)]
pub struct MediaStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl MediaStore {
    /// Build an S3 client from config. Explicit credentials and a custom
    /// endpoint (MinIO-style) are optional; otherwise the default AWS
    /// credential chain applies.
    pub async fn new(config: &S3Config) -> Self {
        use aws_sdk_s3::config::Region;

        let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            use aws_sdk_s3::config::Credentials;

            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "vidtube_service_s3",
            );
            builder = builder.credentials_provider(credentials);
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let aws_config = builder.load().await;

        Self {
            client: Client::new(&aws_config),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL for a stored object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Store a media object; returns the public URL for the key.
    pub async fn upload(&self, key: &str, body: Bytes, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            // Media objects are immutable, versioned by key
            .cache_control("max-age=31536000")
            .send()
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.contains("403") || error_msg.contains("Forbidden") {
                    AppError::StorageError(
                        "S3 auth failed (403): Check AWS credentials".to_string(),
                    )
                } else if error_msg.contains("NoSuchBucket") {
                    AppError::StorageError(format!("S3 bucket not found: {}", self.bucket))
                } else {
                    AppError::StorageError(format!("S3 upload failed: {}", e))
                }
            })?;

        Ok(self.public_url(key))
    }

    /// Delete a stored object by key.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("S3 delete failed: {}", e)))?;

        Ok(())
    }

    /// Startup probe: list one key to validate credentials and bucket access.
    pub async fn health_check(&self) -> Result<()> {
        match self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(1)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!("S3 connection validated (bucket: {})", self.bucket);
                Ok(())
            }
            Err(e) => Err(AppError::StorageError(format!(
                "S3 health check failed for bucket {}: {}",
                self.bucket, e
            ))),
        }
    }
}

/// Fresh object key under the given prefix, keeping the upload's extension.
pub fn make_object_key(prefix: &str, filename: &str) -> String {
    let asset_id = Uuid::new_v4();
    match filename.rsplit('.').next().filter(|ext| {
        !ext.is_empty() && ext.len() <= 8 && *ext != filename && ext.chars().all(char::is_alphanumeric)
    }) {
        Some(ext) => format!("{}/{}.{}", prefix, asset_id, ext.to_lowercase()),
        None => format!("{}/{}", prefix, asset_id),
    }
}

/// MIME type guessed from the uploaded filename's extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().map(|ext| ext.to_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_keep_lowercased_extension() {
        let key = make_object_key("videos", "My Clip.MP4");
        assert!(key.starts_with("videos/"));
        assert!(key.ends_with(".mp4"));

        let key = make_object_key("thumbnails", "noextension");
        assert!(key.starts_with("thumbnails/"));
        assert!(!key.contains('.'));
    }

    #[test]
    fn object_keys_are_unique_per_call() {
        assert_ne!(
            make_object_key("videos", "a.mp4"),
            make_object_key("videos", "a.mp4")
        );
    }

    #[test]
    fn content_type_matches_extension() {
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("cover.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("mystery.bin"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
