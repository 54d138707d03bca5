use crate::error::ApiError;

/// Any method other than POST on `/guess`
pub async fn guess_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("method not allowed")
}

/// Any method other than POST on `/add`
pub async fn add_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("POST required")
}

/// Paths with no route
pub async fn not_found() -> ApiError {
    ApiError::UnknownRoute
}
