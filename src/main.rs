/// vidtube-service - HTTP server
///
/// Wires config, the database pool, and the media store into the actix app
/// and registers the comment / subscription / video routes under /api/v1.
use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidtube_service::handlers;
use vidtube_service::services::MediaStore;
use vidtube_service::Config;

async fn health_summary(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "vidtube-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "vidtube-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

fn build_cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default();
    for origin in allowed_origins.split(',') {
        let origin = origin.trim();
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method().allow_any_header().max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting vidtube-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("failed to run migrations")?;

    tracing::info!("Connected to database, migrations applied");

    let media_store = MediaStore::new(&config.s3).await;
    if let Err(e) = media_store.health_check().await {
        tracing::warn!("media store not reachable at startup: {}", e);
    }

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let max_upload_bytes = config.upload.max_file_bytes;
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(media_store.clone()))
            .app_data(
                // Two file parts plus text fields fit a publish request
                MultipartFormConfig::default()
                    .total_limit(max_upload_bytes * 2 + 64 * 1024)
                    .memory_limit(4 * 1024 * 1024),
            )
            .wrap(build_cors(&config.cors.allowed_origins))
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/videos")
                            .route("", web::get().to(handlers::list_videos))
                            .route("", web::post().to(handlers::publish_video))
                            .route(
                                "/{video_id}/comments",
                                web::get().to(handlers::get_video_comments),
                            )
                            .route(
                                "/{video_id}/comments",
                                web::post().to(handlers::add_comment),
                            )
                            .route(
                                "/{video_id}/toggle-publish",
                                web::patch().to(handlers::toggle_publish_status),
                            )
                            .route("/{video_id}", web::get().to(handlers::get_video_by_id))
                            .route("/{video_id}", web::patch().to(handlers::update_video))
                            .route("/{video_id}", web::delete().to(handlers::delete_video)),
                    )
                    .service(
                        web::scope("/comments")
                            .route("/{comment_id}", web::patch().to(handlers::update_comment))
                            .route("/{comment_id}", web::delete().to(handlers::delete_comment)),
                    )
                    .service(
                        web::scope("/channels")
                            .route(
                                "/{channel_id}/subscription",
                                web::post().to(handlers::toggle_subscription),
                            )
                            .route(
                                "/{channel_id}/subscribers",
                                web::get().to(handlers::get_channel_subscribers),
                            ),
                    )
                    .service(web::scope("/users").route(
                        "/{subscriber_id}/subscriptions",
                        web::get().to(handlers::get_subscribed_channels),
                    )),
            )
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run();

    server.await.context("server terminated with error")
}
