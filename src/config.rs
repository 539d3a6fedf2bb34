/// Configuration management for vidtube-service
///
/// Loads configuration from environment variables with sensible defaults.
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub s3: S3Config,
    pub upload: UploadConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, `*` for any
    pub allowed_origins: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible storage like MinIO
    pub endpoint: Option<String>,
    /// Base URL prefixed to object keys when building public media URLs
    pub public_base_url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UploadConfig {
    /// Hard cap on a single uploaded file part, in bytes
    pub max_file_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let bucket = std::env::var("S3_BUCKET").unwrap_or_else(|_| "vidtube-media".to_string());
        let endpoint = std::env::var("S3_ENDPOINT").ok();
        let public_base_url = match std::env::var("MEDIA_PUBLIC_BASE_URL") {
            Ok(value) => value,
            Err(_) => match &endpoint {
                Some(ep) => format!("{}/{}", ep.trim_end_matches('/'), bucket),
                None if app_env.eq_ignore_ascii_case("production") => {
                    return Err(
                        "MEDIA_PUBLIC_BASE_URL must be set in production".to_string()
                    )
                }
                None => format!("https://{}.s3.amazonaws.com", bucket),
            },
        };

        Ok(Config {
            app: AppConfig {
                host: std::env::var("VIDTUBE_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("VIDTUBE_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8084),
                env: app_env.clone(),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/vidtube".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            s3: S3Config {
                bucket,
                region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok(),
                secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
                endpoint,
                public_base_url,
            },
            upload: UploadConfig {
                max_file_bytes: std::env::var("UPLOAD_MAX_FILE_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(512 * 1024 * 1024),
            },
        })
    }
}
