/// Database access layer
///
/// Repositories are free functions over a `PgPool`, one module per collection.
pub mod comment_repo;
pub mod subscription_repo;
pub mod video_repo;
