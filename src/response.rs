/// Uniform response envelope returned by every handler.
use serde::Serialize;

/// `{ success, data, message }` wrapper. `success` is derived from the HTTP
/// status the handler chose; failures go through `AppError::error_response`
/// which emits the same shape with `success: false`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// Skip/limit page of records with the reported total.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}
