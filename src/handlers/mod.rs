/// HTTP request handlers
pub mod comments;
pub mod subscriptions;
pub mod videos;

pub use comments::*;
pub use subscriptions::*;
pub use videos::*;
