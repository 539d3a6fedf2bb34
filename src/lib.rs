//! vidtube-service
//!
//! REST backend for the video-sharing surface: comments, subscriptions, and
//! videos over PostgreSQL, with uploaded media kept in an S3-compatible store.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
