/// Caller identity extraction
///
/// Authentication itself happens upstream (gateway JWT middleware); by the
/// time a request reaches this service the verified caller id travels in the
/// `x-user-id` header. The extractor also honors a `UserId` already placed in
/// request extensions, which is how tests and embedding middleware inject it.
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<UserId>().copied() {
            return ready(Ok(user));
        }

        let parsed = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());

        ready(match parsed {
            Some(id) => Ok(UserId(id)),
            None => Err(AppError::Unauthorized(
                "missing or invalid caller identity".to_string(),
            )),
        })
    }
}
