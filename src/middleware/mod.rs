/// HTTP middleware
pub mod auth;

pub use auth::{UserId, USER_ID_HEADER};
